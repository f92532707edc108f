//! Content-stream operators: the text-affecting subset the interpreter executes, plus a
//! classifier that routes every other legal PDF operator to a silent skip (§4.7).
//!
//! The interpreter does not need a full graphics-state machine (color, path construction,
//! clipping, XObjects) to extract text in emission order, but it does need to tell those
//! operators apart from a genuinely unrecognized byte sequence — only the latter is
//! `UnknownOperator` in strict mode.

use crate::object::Object;

/// One element of a `TJ` array operand: either a string to show or a horizontal displacement.
#[derive(Debug, Clone, PartialEq)]
pub enum TextArrayElement {
    /// A string to decode and emit.
    Show(Vec<u8>),
    /// A displacement in thousandths of a text-space unit.
    Adjust(f32),
}

/// The text-affecting operators this interpreter executes (§4.7's table, plus `q`/`Q`).
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `q`: push a copy of the graphics state.
    Save,
    /// `Q`: pop the graphics state.
    Restore,
    /// `BT`: begin a text object; resets `Tm`/`Tlm` to identity.
    BeginText,
    /// `ET`: end a text object.
    EndText,
    /// `Tf`: select a font by resource name and set its size.
    SetFont {
        /// Name looked up in the page's `/Resources/Font` dictionary.
        name: String,
        /// Font size in unscaled text-space units.
        size: f32,
    },
    /// `Tc`: character spacing.
    SetCharSpacing(f32),
    /// `Tw`: word spacing.
    SetWordSpacing(f32),
    /// `Tz`: horizontal scaling, as a percentage (100 = unscaled).
    SetHorizontalScaling(f32),
    /// `TL`: leading, used by `T*`/`'`/`"`.
    SetLeading(f32),
    /// `Ts`: text rise.
    SetTextRise(f32),
    /// `Tr`: text rendering mode.
    SetRenderMode(u8),
    /// `Td`: move to the start of the next line, offset by `(tx, ty)` from the current line.
    MoveText {
        /// Horizontal offset.
        tx: f32,
        /// Vertical offset.
        ty: f32,
    },
    /// `TD`: like `Td`, but also sets leading to `-ty`.
    MoveTextSetLeading {
        /// Horizontal offset.
        tx: f32,
        /// Vertical offset.
        ty: f32,
    },
    /// `Tm`: replace the text and line matrices outright.
    SetTextMatrix {
        /// Matrix component `a`.
        a: f32,
        /// Matrix component `b`.
        b: f32,
        /// Matrix component `c`.
        c: f32,
        /// Matrix component `d`.
        d: f32,
        /// Matrix component `e` (horizontal translation).
        e: f32,
        /// Matrix component `f` (vertical translation).
        f: f32,
    },
    /// `T*`: move to the next line using the current leading.
    NextLine,
    /// `Tj`: show a string.
    ShowText(Vec<u8>),
    /// `'`: move to the next line, then show a string.
    NextLineShowText(Vec<u8>),
    /// `"`: set word and character spacing, move to the next line, then show a string.
    SetSpacingNextLineShowText {
        /// Word spacing (`Tw`) to set first.
        word_space: f32,
        /// Character spacing (`Tc`) to set first.
        char_space: f32,
        /// The string to show.
        text: Vec<u8>,
    },
    /// `TJ`: show an array of strings interleaved with positioning adjustments.
    ShowTextArray(Vec<TextArrayElement>),
}

/// How a lexed content-stream keyword was classified.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorClass {
    /// A text-affecting operator the interpreter executes.
    Text(Operator),
    /// A legal PDF content-stream operator this interpreter has no use for (path construction,
    /// color, clipping, XObjects, marked content, compatibility). Operand stack is discarded.
    Skip,
    /// Not a recognized PDF content-stream operator at all.
    Unknown,
}

/// Every non-text PDF content-stream operator this interpreter deliberately ignores. Anything
/// not in this list and not a [`Operator`] keyword is genuinely unrecognized.
const SKIPPED_OPERATORS: &[&str] = &[
    // Graphics state
    "w", "J", "j", "M", "d", "ri", "i", "gs", "cm",
    // Color
    "CS", "cs", "SC", "SCN", "sc", "scn", "G", "g", "RG", "rg", "K", "k",
    // Path construction & painting
    "m", "l", "c", "v", "y", "h", "re", "S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "n",
    // Clipping
    "W", "W*",
    // XObjects & shading
    "Do", "sh",
    // Inline images
    "BI", "ID", "EI",
    // Marked content
    "MP", "DP", "BMC", "BDC", "EMC",
    // Compatibility
    "BX", "EX",
    // Type 3 glyph metrics
    "d0", "d1",
];

/// Classify a lexed operator keyword, consuming the operand stack accumulated since the
/// previous operator (§4.7 and §9's "single operator-dispatch function keyed by the operator's
/// byte sequence").
pub fn classify(keyword: &str, operands: &[Object]) -> OperatorClass {
    let real = |obj: &Object| obj.as_real().unwrap_or(0.0) as f32;
    let bytes = |obj: &Object| obj.as_bytes().map(|b| b.to_vec()).unwrap_or_default();

    let op = match keyword {
        "q" => Operator::Save,
        "Q" => Operator::Restore,
        "BT" => Operator::BeginText,
        "ET" => Operator::EndText,
        "Tf" if operands.len() >= 2 => Operator::SetFont {
            name: operands[0].as_name().unwrap_or("").to_string(),
            size: real(&operands[1]),
        },
        "Tc" if !operands.is_empty() => Operator::SetCharSpacing(real(&operands[0])),
        "Tw" if !operands.is_empty() => Operator::SetWordSpacing(real(&operands[0])),
        "Tz" if !operands.is_empty() => Operator::SetHorizontalScaling(real(&operands[0])),
        "TL" if !operands.is_empty() => Operator::SetLeading(real(&operands[0])),
        "Ts" if !operands.is_empty() => Operator::SetTextRise(real(&operands[0])),
        "Tr" if !operands.is_empty() => Operator::SetRenderMode(real(&operands[0]).clamp(0.0, 7.0) as u8),
        "Td" if operands.len() >= 2 => Operator::MoveText { tx: real(&operands[0]), ty: real(&operands[1]) },
        "TD" if operands.len() >= 2 => {
            Operator::MoveTextSetLeading { tx: real(&operands[0]), ty: real(&operands[1]) }
        },
        "Tm" if operands.len() >= 6 => Operator::SetTextMatrix {
            a: real(&operands[0]),
            b: real(&operands[1]),
            c: real(&operands[2]),
            d: real(&operands[3]),
            e: real(&operands[4]),
            f: real(&operands[5]),
        },
        "T*" => Operator::NextLine,
        "Tj" if !operands.is_empty() => Operator::ShowText(bytes(&operands[0])),
        "'" if !operands.is_empty() => Operator::NextLineShowText(bytes(&operands[0])),
        "\"" if operands.len() >= 3 => Operator::SetSpacingNextLineShowText {
            word_space: real(&operands[0]),
            char_space: real(&operands[1]),
            text: bytes(&operands[2]),
        },
        "TJ" if !operands.is_empty() => {
            let elements = match &operands[0] {
                Object::Array(items) => items
                    .iter()
                    .filter_map(|item| match item {
                        Object::String(b) | Object::HexString(b) => Some(TextArrayElement::Show(b.clone())),
                        Object::Integer(n) => Some(TextArrayElement::Adjust(*n as f32)),
                        Object::Real(r) => Some(TextArrayElement::Adjust(*r as f32)),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            Operator::ShowTextArray(elements)
        },
        _ if SKIPPED_OPERATORS.contains(&keyword) => return OperatorClass::Skip,
        _ => return OperatorClass::Unknown,
    };
    OperatorClass::Text(op)
}
