//! Graphics state: the parameters `q`/`Q` save and restore.
//!
//! Per ISO 32000-1 Table 52, the text *state* parameters (font, sizing, spacing) are graphics
//! state, saved and restored by `q`/`Q` — unlike the text matrix and line matrix, which live only
//! inside a `BT`/`ET` block and are never affected by `q`/`Q` (see `text_state.rs`). Everything
//! else a full graphics state carries (CTM, color, line style, transparency) is out of scope for
//! a text-only extractor and is not represented here.

/// A 2D affine transformation matrix, used for the text and line matrices.
///
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component.
    pub a: f32,
    /// Rotation/skew component.
    pub b: f32,
    /// Rotation/skew component.
    pub c: f32,
    /// Vertical scaling component.
    pub d: f32,
    /// Horizontal translation.
    pub e: f32,
    /// Vertical translation.
    pub f: f32,
}

impl Matrix {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 }
    }

    /// A translation matrix.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: tx, f: ty }
    }

    /// Multiply this matrix with `other`; the result applies `other` first, then `self`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point by this matrix.
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// The subset of graphics state that affects how shown text decodes and spaces out.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Name of the font selected by the most recent `Tf`, looked up in the page's
    /// `/Resources/Font` dictionary.
    pub font_name: Option<String>,
    /// Font size set by `Tf`.
    pub font_size: f32,
    /// Character spacing (`Tc`).
    pub char_space: f32,
    /// Word spacing (`Tw`).
    pub word_space: f32,
    /// Horizontal scaling percentage (`Tz`).
    pub horizontal_scaling: f32,
    /// Leading (`TL`), used by `'`, `"`, and `T*`.
    pub leading: f32,
    /// Text rise (`Ts`).
    pub text_rise: f32,
    /// Text rendering mode (`Tr`).
    pub render_mode: u8,
}

impl GraphicsState {
    /// The PDF-defined initial values.
    pub fn new() -> Self {
        Self {
            font_name: None,
            font_size: 12.0,
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            text_rise: 0.0,
            render_mode: 0,
        }
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of graphics states, pushed/popped by `q`/`Q`.
#[derive(Debug, Clone)]
pub struct GraphicsStateStack {
    stack: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    /// A new stack holding a single default state.
    pub fn new() -> Self {
        Self { stack: vec![GraphicsState::new()] }
    }

    /// The current (top) state.
    pub fn current(&self) -> &GraphicsState {
        self.stack.last().expect("stack is never empty")
    }

    /// The current state, mutably.
    pub fn current_mut(&mut self) -> &mut GraphicsState {
        self.stack.last_mut().expect("stack is never empty")
    }

    /// `q`: push a copy of the current state.
    pub fn save(&mut self) {
        let state = self.current().clone();
        self.stack.push(state);
    }

    /// `Q`: pop the current state. A `Q` with no matching `q` is a no-op, matching how real-world
    /// producers occasionally emit unbalanced pairs.
    pub fn restore(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Current stack depth (always ≥ 1).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        Self::new()
    }
}
