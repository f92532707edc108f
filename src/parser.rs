//! Recursive-descent object parser: turns [`crate::lexer::Token`]s into
//! [`crate::object::Object`] trees (§4.2).

use crate::error::{Error, Result};
use crate::lexer::{self, Token};
use crate::object::{Dict, Object, Reference};
use crate::scan::find_substring;

/// Parse one object starting at `offset`. Returns the object and the offset just past it.
///
/// This is the single recursive entry point: arrays and dictionaries recurse back into it for
/// every element/value, and the `N G R` reference lookahead is resolved here rather than in the
/// lexer, since it requires reading ahead by up to two further tokens.
pub fn parse_object(input: &[u8], offset: usize, max_nesting: usize) -> Result<(Object, usize)> {
    parse_object_at_depth(input, offset, max_nesting, 0)
}

fn parse_object_at_depth(
    input: &[u8],
    offset: usize,
    max_nesting: usize,
    depth: usize,
) -> Result<(Object, usize)> {
    if depth > max_nesting {
        return Err(Error::NestingTooDeep(max_nesting));
    }

    let (token, next) = lexer::next_token(input, offset)?.ok_or(Error::UnexpectedEof(offset))?;
    match token {
        Token::Null => Ok((Object::Null, next)),
        Token::Bool(b) => Ok((Object::Bool(b), next)),
        Token::Real(r) => Ok((Object::Real(r), next)),
        Token::LiteralString(s) => Ok((Object::String(s), next)),
        Token::HexString(s) => Ok((Object::HexString(s), next)),
        Token::Name(name) => Ok((Object::Name(name), next)),
        Token::ArrayStart => parse_array(input, next, max_nesting, depth + 1),
        Token::DictStart => parse_dict_or_stream(input, next, max_nesting, depth + 1),
        Token::Integer(i) => try_parse_reference(input, next, i),
        Token::ArrayEnd | Token::DictEnd => {
            Err(Error::UnexpectedToken { offset, reason: "unexpected closing delimiter".to_string() })
        },
        Token::Keyword(kw) => {
            Err(Error::UnexpectedToken { offset, reason: format!("unexpected keyword `{kw}`") })
        },
    }
}

/// After an unsigned integer, look ahead for `<uint> R` to disambiguate a bare integer from an
/// indirect reference (§4.2's "Numbers" rule).
fn try_parse_reference(input: &[u8], after_first: usize, first: i64) -> Result<(Object, usize)> {
    if first < 0 || first > u32::MAX as i64 {
        return Ok((Object::Integer(first), after_first));
    }

    let Some((Token::Integer(second), after_second)) = lexer::next_token(input, after_first)? else {
        return Ok((Object::Integer(first), after_first));
    };
    if !(0..=65535).contains(&second) {
        return Ok((Object::Integer(first), after_first));
    }

    match lexer::next_token(input, after_second)? {
        Some((Token::Keyword(kw), after_r)) if kw == "R" => {
            Ok((Object::Reference(Reference::new(first as u32, second as u16)), after_r))
        },
        _ => Ok((Object::Integer(first), after_first)),
    }
}

fn parse_array(
    input: &[u8],
    mut offset: usize,
    max_nesting: usize,
    depth: usize,
) -> Result<(Object, usize)> {
    let mut items = Vec::new();
    loop {
        let (token, peek_next) =
            lexer::next_token(input, offset)?.ok_or(Error::UnexpectedEof(offset))?;
        if token == Token::ArrayEnd {
            return Ok((Object::Array(items), peek_next));
        }
        let (item, next) = parse_object_at_depth(input, offset, max_nesting, depth)?;
        items.push(item);
        offset = next;
    }
}

fn parse_dict_or_stream(
    input: &[u8],
    mut offset: usize,
    max_nesting: usize,
    depth: usize,
) -> Result<(Object, usize)> {
    let mut dict = Dict::new();
    loop {
        let (token, peek_next) =
            lexer::next_token(input, offset)?.ok_or(Error::UnexpectedEof(offset))?;
        if token == Token::DictEnd {
            offset = peek_next;
            break;
        }
        let Token::Name(key) = token else {
            return Err(Error::InvalidDictionary {
                offset,
                reason: "dictionary key must be a name".to_string(),
            });
        };
        let (value, next) = parse_object_at_depth(input, peek_next, max_nesting, depth)?;
        dict.insert(key, value);
        offset = next;
    }

    // A dictionary immediately followed by `stream` and a single EOL is a stream object.
    let after_ws = lexer::skip_ws_and_comments(input, offset);
    if input[after_ws..].starts_with(b"stream") {
        let mut data_start = after_ws + "stream".len();
        if input.get(data_start) == Some(&b'\r') {
            data_start += 1;
        }
        if input.get(data_start) == Some(&b'\n') {
            data_start += 1;
        }
        let (data, stream_end) = parse_stream_data(input, data_start, &dict)?;
        return Ok((Object::Stream { dict, data: bytes::Bytes::from(data) }, stream_end));
    }

    Ok((Object::Dict(dict), offset))
}

/// Extract stream bytes: trust `/Length` when it resolves to a plausible in-bounds direct
/// integer, otherwise fall back to scanning forward for `endstream` (§4.2).
fn parse_stream_data(input: &[u8], data_start: usize, dict: &Dict) -> Result<(Vec<u8>, usize)> {
    if let Some(length) = dict.get("Length").and_then(Object::as_integer) {
        if length >= 0 {
            let length = length as usize;
            let data_end = data_start + length;
            if data_end <= input.len() {
                let after_data = skip_to_endstream(input, data_end);
                return Ok((input[data_start..data_end].to_vec(), after_data));
            }
        }
    }

    let relative = find_substring(&input[data_start..], b"endstream")
        .ok_or(Error::InvalidStream { offset: data_start, reason: "endstream not found".to_string() })?;
    let mut data_end = data_start + relative;
    // Trim a single trailing EOL the producer inserted before `endstream`.
    if data_end > data_start && input[data_end - 1] == b'\n' {
        data_end -= 1;
        if data_end > data_start && input[data_end - 1] == b'\r' {
            data_end -= 1;
        }
    } else if data_end > data_start && input[data_end - 1] == b'\r' {
        data_end -= 1;
    }
    let after_data = skip_to_endstream(input, data_start + relative);
    Ok((input[data_start..data_end].to_vec(), after_data))
}

fn skip_to_endstream(input: &[u8], mut offset: usize) -> usize {
    offset = lexer::skip_ws_and_comments(input, offset);
    if input[offset..].starts_with(b"endstream") {
        offset + "endstream".len()
    } else if let Some(relative) = find_substring(&input[offset..], b"endstream") {
        offset + relative + "endstream".len()
    } else {
        input.len()
    }
}

/// Parse the `N G obj ... endobj` envelope for an indirect object, returning the contained
/// object, its reference, and the offset just past `endobj`.
pub fn parse_indirect_object(
    input: &[u8],
    offset: usize,
    max_nesting: usize,
) -> Result<(Reference, Object, usize)> {
    let (num_tok, after_num) =
        lexer::next_token(input, offset)?.ok_or(Error::UnexpectedEof(offset))?;
    let Token::Integer(number) = num_tok else {
        return Err(Error::UnexpectedToken { offset, reason: "expected object number".to_string() });
    };
    let (gen_tok, after_gen) =
        lexer::next_token(input, after_num)?.ok_or(Error::UnexpectedEof(after_num))?;
    let Token::Integer(generation) = gen_tok else {
        return Err(Error::UnexpectedToken {
            offset: after_num,
            reason: "expected generation number".to_string(),
        });
    };
    let (obj_kw, after_obj_kw) =
        lexer::next_token(input, after_gen)?.ok_or(Error::UnexpectedEof(after_gen))?;
    if obj_kw != Token::Keyword("obj".to_string()) {
        return Err(Error::UnexpectedToken { offset: after_gen, reason: "expected `obj`".to_string() });
    }

    let (object, after_object) = parse_object_at_depth(input, after_obj_kw, max_nesting, 0)?;

    let after_endobj = lexer::skip_ws_and_comments(input, after_object);
    let end = if input[after_endobj..].starts_with(b"endobj") {
        after_endobj + "endobj".len()
    } else {
        // Permissive: some producers omit `endobj`; resynchronize on the object we already have.
        after_object
    };

    Ok((Reference::new(number as u32, generation as u16), object, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> Object {
        parse_object(input, 0, 100).unwrap().0
    }

    #[test]
    fn parses_scalars() {
        assert_eq!(parse(b"null"), Object::Null);
        assert_eq!(parse(b"true"), Object::Bool(true));
        assert_eq!(parse(b"42"), Object::Integer(42));
        assert_eq!(parse(b"3.14"), Object::Real(3.14));
    }

    #[test]
    fn parses_reference_with_lookahead() {
        assert_eq!(parse(b"4 0 R"), Object::Reference(Reference::new(4, 0)));
    }

    #[test]
    fn integer_not_followed_by_gen_r_stays_an_integer() {
        assert_eq!(parse(b"42"), Object::Integer(42));
        let (obj, _) = parse_object(b"42 43", 0, 100).unwrap();
        assert_eq!(obj, Object::Integer(42));
    }

    #[test]
    fn parses_array_of_mixed_types() {
        let obj = parse(b"[1 2.5 (hi) /Name]");
        let Object::Array(items) = obj else { panic!("expected array") };
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Object::Integer(1));
        assert_eq!(items[2], Object::String(b"hi".to_vec()));
    }

    #[test]
    fn parses_dictionary_first_key_wins() {
        let obj = parse(b"<< /Type /Page /Type /Pages >>");
        let dict = obj.as_dict().unwrap();
        assert_eq!(dict.get("Type").and_then(Object::as_name), Some("Page"));
    }

    #[test]
    fn non_name_dictionary_key_is_an_error() {
        let err = parse_object(b"<< 1 2 >>", 0, 100).unwrap_err();
        assert!(matches!(err, Error::InvalidDictionary { .. }));
    }

    #[test]
    fn parses_stream_with_explicit_length() {
        let input = b"<< /Length 5 >>\nstream\nHello\nendstream";
        let (obj, _) = parse_object(input, 0, 100).unwrap();
        let Object::Stream { data, .. } = obj else { panic!("expected stream") };
        assert_eq!(&data[..], b"Hello");
    }

    #[test]
    fn falls_back_to_endstream_scan_without_length() {
        let input = b"<< /Foo /Bar >>\nstream\nHello\nendstream";
        let (obj, _) = parse_object(input, 0, 100).unwrap();
        let Object::Stream { data, .. } = obj else { panic!("expected stream") };
        assert_eq!(&data[..], b"Hello");
    }

    #[test]
    fn nesting_beyond_limit_errors() {
        let mut input = String::new();
        for _ in 0..150 {
            input.push('[');
        }
        input.push_str("1");
        for _ in 0..150 {
            input.push(']');
        }
        let err = parse_object(input.as_bytes(), 0, 100).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep(_)));
    }

    #[test]
    fn parses_indirect_object_envelope() {
        let input = b"4 0 obj\n(Original Text)\nendobj";
        let (reference, object, end) = parse_indirect_object(input, 0, 100).unwrap();
        assert_eq!(reference, Reference::new(4, 0));
        assert_eq!(object, Object::String(b"Original Text".to_vec()));
        assert_eq!(end, input.len());
    }
}
