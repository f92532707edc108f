//! The content-stream interpreter: drives tokenized operators through graphics/text state and
//! emits decoded Unicode text in stream (emission) order (§4.7).
//!
//! This does not reconstruct a 2-D layout. The only positional cue honored is the line-break
//! heuristic in [`super::text_state::TextState::crossed_line_break`], plus the `TJ`
//! horizontal-displacement threshold for inserting inter-word spaces.

use std::collections::HashMap;

use crate::config::ExtractionOptions;
use crate::content::graphics_state::{GraphicsStateStack, Matrix};
use crate::content::operators::{classify, Operator, OperatorClass, TextArrayElement};
use crate::content::parser::{tokenize, ContentToken};
use crate::content::text_state::TextState;
use crate::error::{Error, Result};
use crate::fonts::Font;
use crate::object::Object;

/// Destination for decoded text, supplied by the caller so extraction never has to choose a
/// buffering strategy on their behalf (§6).
pub trait TextSink {
    /// Append a decoded chunk of text.
    fn write_str(&mut self, text: &str) -> Result<()>;
}

impl TextSink for String {
    fn write_str(&mut self, text: &str) -> Result<()> {
        self.push_str(text);
        Ok(())
    }
}

impl TextSink for Vec<u8> {
    fn write_str(&mut self, text: &str) -> Result<()> {
        self.extend_from_slice(text.as_bytes());
        Ok(())
    }
}

/// Run a page's content stream bytes through the interpreter, writing decoded text to `sink`.
///
/// `fonts` maps resource names (as they appear in `/Resources/Font`) to already-built [`Font`]s
/// for this page. A name absent from `fonts` is a missing font resource: permissive mode skips
/// the show operation silently (logged), strict mode returns [`Error::FontNotFound`].
pub fn run(
    data: &[u8],
    fonts: &HashMap<String, Font>,
    options: &ExtractionOptions,
    permissive: bool,
    sink: &mut dyn TextSink,
) -> Result<()> {
    let tokens = tokenize(data)?;
    let mut interpreter = Interpreter::new(options, permissive);
    let mut operands: Vec<Object> = Vec::new();

    for token in tokens {
        match token {
            ContentToken::Operand(obj) => operands.push(obj),
            ContentToken::Operator(keyword) => {
                match classify(&keyword, &operands) {
                    OperatorClass::Text(op) => interpreter.execute(op, fonts, sink)?,
                    OperatorClass::Skip => {},
                    OperatorClass::Unknown => {
                        if !permissive {
                            return Err(Error::UnknownOperator(keyword));
                        }
                        log::warn!("skipping unknown content-stream operator {keyword:?}");
                    },
                }
                operands.clear();
            },
        }
    }

    Ok(())
}

struct Interpreter<'a> {
    graphics: GraphicsStateStack,
    text: TextState,
    in_text_object: bool,
    options: &'a ExtractionOptions,
    permissive: bool,
    pending_space: bool,
}

impl<'a> Interpreter<'a> {
    fn new(options: &'a ExtractionOptions, permissive: bool) -> Self {
        Self {
            graphics: GraphicsStateStack::new(),
            text: TextState::new(),
            in_text_object: false,
            options,
            permissive,
            pending_space: false,
        }
    }

    fn execute(
        &mut self,
        op: Operator,
        fonts: &HashMap<String, Font>,
        sink: &mut dyn TextSink,
    ) -> Result<()> {
        match op {
            Operator::Save => self.graphics.save(),
            Operator::Restore => self.graphics.restore(),
            Operator::BeginText => {
                self.in_text_object = true;
                self.text = TextState::new();
                self.pending_space = false;
            },
            Operator::EndText => {
                self.in_text_object = false;
            },
            Operator::SetFont { name, size } => {
                self.graphics.current_mut().font_name = Some(name);
                self.graphics.current_mut().font_size = size;
            },
            Operator::SetCharSpacing(v) => self.graphics.current_mut().char_space = v,
            Operator::SetWordSpacing(v) => self.graphics.current_mut().word_space = v,
            Operator::SetHorizontalScaling(v) => self.graphics.current_mut().horizontal_scaling = v,
            Operator::SetLeading(v) => self.graphics.current_mut().leading = v,
            Operator::SetTextRise(v) => self.graphics.current_mut().text_rise = v,
            Operator::SetRenderMode(v) => self.graphics.current_mut().render_mode = v,
            Operator::MoveText { tx, ty } => self.text.translate_line(tx, ty),
            Operator::MoveTextSetLeading { tx, ty } => {
                self.graphics.current_mut().leading = -ty;
                self.text.translate_line(tx, ty);
            },
            Operator::SetTextMatrix { a, b, c, d, e, f } => {
                self.text.set_matrix(Matrix { a, b, c, d, e, f });
            },
            Operator::NextLine => {
                let leading = self.graphics.current().leading;
                self.text.translate_line(0.0, -leading);
            },
            Operator::ShowText(bytes) => self.show_text(&bytes, fonts, sink)?,
            Operator::NextLineShowText(bytes) => {
                let leading = self.graphics.current().leading;
                self.text.translate_line(0.0, -leading);
                self.show_text(&bytes, fonts, sink)?;
            },
            Operator::SetSpacingNextLineShowText { word_space, char_space, text } => {
                self.graphics.current_mut().word_space = word_space;
                self.graphics.current_mut().char_space = char_space;
                let leading = self.graphics.current().leading;
                self.text.translate_line(0.0, -leading);
                self.show_text(&text, fonts, sink)?;
            },
            Operator::ShowTextArray(elements) => {
                for element in elements {
                    match element {
                        TextArrayElement::Show(bytes) => self.show_text(&bytes, fonts, sink)?,
                        TextArrayElement::Adjust(amount) => {
                            if amount <= self.options.tj_space_threshold {
                                self.pending_space = true;
                            }
                        },
                    }
                }
            },
        }
        Ok(())
    }

    fn show_text(
        &mut self,
        bytes: &[u8],
        fonts: &HashMap<String, Font>,
        sink: &mut dyn TextSink,
    ) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        let font_size = self.graphics.current().font_size;
        if self.text.crossed_line_break(font_size) {
            sink.write_str("\n")?;
            self.pending_space = false;
        } else if self.pending_space {
            sink.write_str(" ")?;
            self.pending_space = false;
        }

        let font_name = self.graphics.current().font_name.clone();
        let decoded = match font_name.as_deref().and_then(|name| fonts.get(name)) {
            Some(font) => font.decode(bytes, self.permissive)?,
            None => {
                let name = font_name.unwrap_or_default();
                if self.permissive {
                    log::warn!("no font resource named {name:?}; substituting U+FFFD for shown text");
                    std::iter::repeat('\u{FFFD}').take(bytes.len()).collect()
                } else {
                    return Err(Error::FontNotFound(name));
                }
            },
        };

        sink.write_str(&decoded)?;
        self.text.mark_shown();
        Ok(())
    }
}
