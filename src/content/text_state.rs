//! Text object state: the text and line matrices, reset at every `BT`.
//!
//! Unlike `GraphicsState`, this is never saved or restored by `q`/`Q` — a content stream that
//! nests `BT`/`ET` inside `q`/`Q` still gets fresh matrices at each `BT`.

use super::graphics_state::Matrix;

/// Text matrix and line matrix, plus the bookkeeping the line-break heuristic needs.
#[derive(Debug, Clone, Copy)]
pub struct TextState {
    /// `Tm`: maps text space to user space.
    pub matrix: Matrix,
    /// `Tlm`: text matrix at the start of the current line, used by `Td`/`TD`/`T*`.
    pub line_matrix: Matrix,
    /// Vertical translation component of `matrix` the last time text was shown, for the
    /// line-break heuristic. `None` until the first show.
    last_shown_y: Option<f32>,
}

impl TextState {
    /// Reset to identity matrices, as `BT` requires.
    pub fn new() -> Self {
        Self { matrix: Matrix::identity(), line_matrix: Matrix::identity(), last_shown_y: None }
    }

    /// Set both matrices to `m` (the `Tm` operator).
    pub fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
        self.line_matrix = m;
    }

    /// Translate the line matrix by `(tx, ty)` in text space and make it the current matrix too
    /// (the `Td`/`TD` operators).
    pub fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = self.line_matrix.multiply(&Matrix::translation(tx, ty));
        self.matrix = self.line_matrix;
    }

    /// Whether the vertical translation of `matrix` has moved by more than `font_size` since the
    /// last shown string — the sole 2-D cue the interpreter honors for inserting a newline
    /// (§4.7's line-break heuristic).
    pub fn crossed_line_break(&self, font_size: f32) -> bool {
        match self.last_shown_y {
            Some(prev_y) => (self.matrix.f - prev_y).abs() > font_size.abs(),
            None => false,
        }
    }

    /// Record that text was just shown at the current matrix, for the next `crossed_line_break`
    /// check.
    pub fn mark_shown(&mut self) {
        self.last_shown_y = Some(self.matrix.f);
    }
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}
