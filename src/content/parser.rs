//! Tokenizer for content streams.
//!
//! Content streams share the same lexical grammar as the rest of the file (numbers, strings,
//! names, arrays, dicts) plus bare keywords that act as operators — there is no separate grammar
//! to hand-roll here. This reuses the file-level `lexer`/`parser` rather than a dedicated
//! combinator parser.

use crate::error::Result;
use crate::lexer::{self, Token};
use crate::object::Object;
use crate::parser::parse_object;
use crate::scan::is_whitespace;

/// One lexed unit of a content stream: an operand value, or an operator keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentToken {
    /// An operand pushed onto the stack awaiting the next operator.
    Operand(Object),
    /// An operator keyword, e.g. `"Tj"`, `"BT"`, `"re"`.
    Operator(String),
}

/// Maximum nesting depth for operand arrays/dicts within a content stream (inline-image
/// dictionaries and `TJ` arrays are the only nested structures that appear in practice).
const MAX_NESTING: usize = 32;

/// Tokenize a content stream into a flat sequence of operands and operators, in stream order.
///
/// Inline images (`BI`...`ID`...`EI`) are never executed (`BI` is a skipped operator), so the
/// binary payload between `ID` and `EI` is skipped over wholesale rather than lexed.
pub fn tokenize(data: &[u8]) -> Result<Vec<ContentToken>> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    loop {
        offset = lexer::skip_ws_and_comments(data, offset);
        if offset >= data.len() {
            break;
        }

        let Some((token, next)) = lexer::next_token(data, offset)? else {
            break;
        };

        match token {
            Token::Null => {
                tokens.push(ContentToken::Operand(Object::Null));
                offset = next;
            },
            Token::Bool(b) => {
                tokens.push(ContentToken::Operand(Object::Bool(b)));
                offset = next;
            },
            Token::Keyword(kw) if kw == "BI" => {
                tokens.push(ContentToken::Operator(kw));
                offset = skip_inline_image(data, next);
            },
            Token::Keyword(kw) => {
                tokens.push(ContentToken::Operator(kw));
                offset = next;
            },
            _ => {
                let (object, next) = parse_object(data, offset, MAX_NESTING)?;
                tokens.push(ContentToken::Operand(object));
                offset = next;
            },
        }
    }

    Ok(tokens)
}

/// Skip past an inline image's binary payload, starting just after the `ID` keyword's own token
/// (i.e. `offset` points at the one whitespace byte that separates `ID` from the raw data).
/// Looks for the next whitespace-delimited `EI`, which real content streams almost always honor
/// even though in principle binary data could coincidentally contain the bytes `EI`.
fn skip_inline_image(data: &[u8], mut offset: usize) -> usize {
    // There is no `ID` handling here directly: `tokenize` only special-cases `BI`, so scan
    // forward past the intervening `/Key value ... ID` dictionary first.
    while offset + 1 < data.len() && &data[offset..offset + 2] != b"ID" {
        offset += 1;
    }
    if offset + 1 < data.len() {
        offset += 2;
    }
    if offset < data.len() && is_whitespace(data[offset]) {
        offset += 1;
    }

    let start = offset;
    while offset + 1 < data.len() {
        if &data[offset..offset + 2] == b"EI"
            && (offset == start || is_whitespace(data[offset - 1]))
            && (offset + 2 >= data.len() || is_whitespace(data[offset + 2]))
        {
            return offset + 2;
        }
        offset += 1;
    }
    data.len()
}
