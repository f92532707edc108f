//! ToUnicode CMap parsing (§4.6).
//!
//! CMap streams map byte codes (most often 1 or 2 bytes) to Unicode code point sequences. This
//! is a tiny hand-written interpreter over the relevant subset of the CMap language —
//! `begincodespacerange`, `beginbfchar`, `beginbfrange`, `beginnotdefrange` — recognizing hex
//! tokens and bracketed arrays of hex tokens without pulling in a general-purpose PostScript
//! parser.

use crate::error::Result;
use std::collections::HashMap;

/// A parsed `begincodespacerange…endcodespacerange` entry: the byte length implied by a hex
/// token's digit count, and the `[low, high]` bounds within that byte length.
#[derive(Clone, Copy, Debug)]
struct CodespaceRange {
    byte_len: u8,
    low: u32,
    high: u32,
}

/// A character map from byte codes to Unicode strings.
///
/// Individual `bfchar` entries and expanded `bfrange`/`notdefrange` entries are all stored in a
/// single `HashMap`, since PDF ToUnicode CMaps rarely carry more than a few thousand distinct
/// codes and direct lookup is simplest and fast enough at that scale.
#[derive(Clone, Debug, Default)]
pub struct CMap {
    chars: HashMap<u32, String>,
    codespace_ranges: Vec<CodespaceRange>,
}

impl CMap {
    fn new() -> Self {
        CMap { chars: HashMap::new(), codespace_ranges: Vec::new() }
    }

    /// Look up the Unicode string mapped to a byte code.
    pub fn get(&self, code: &u32) -> Option<&String> {
        self.chars.get(code)
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    fn insert(&mut self, code: u32, unicode: String) {
        self.chars.insert(code, unicode);
    }

    /// The byte length (in bytes) of codes starting with `first_byte`, per the codespace ranges
    /// declared in this CMap. Falls back to `default` (2 for composite/Identity-H fonts, 1 for
    /// simple fonts) when no codespace range covers the byte, matching §4.6's greedy
    /// longest-match-over-the-codespace decoding contract.
    pub fn byte_length_for(&self, first_byte: u8, default: usize) -> usize {
        for range in &self.codespace_ranges {
            let shift = (range.byte_len as u32 - 1) * 8;
            let range_first_byte = (range.low >> shift) as u8;
            let range_first_byte_high = (range.high >> shift) as u8;
            if first_byte >= range_first_byte.min(range_first_byte_high)
                && first_byte <= range_first_byte.max(range_first_byte_high)
            {
                return range.byte_len as usize;
            }
        }
        default
    }
}

/// Parse a symbolic escape name like `space`, `tab`, `newline`, `carriage return`, used by some
/// producers in place of a hex destination.
fn parse_escape_sequence(token: &str) -> Option<String> {
    match token.trim().to_lowercase().as_str() {
        "space" => Some(" ".to_string()),
        "tab" => Some("\t".to_string()),
        "newline" => Some("\n".to_string()),
        "carriage return" => Some("\r".to_string()),
        _ => None,
    }
}

/// Decode a 32-bit value as a UTF-16 surrogate pair if it looks like one, else as a direct code
/// point. ToUnicode CMaps represent code points above `U+FFFF` as an 8-hex-digit surrogate pair.
fn decode_utf16_surrogate_pair(value: u32) -> Option<String> {
    let high = (value >> 16) as u16;
    let low = (value & 0xFFFF) as u16;
    if (0xD800..=0xDBFF).contains(&high) && (0xDC00..=0xDFFF).contains(&low) {
        let codepoint = 0x10000 + (((high & 0x3FF) as u32) << 10) + (low & 0x3FF) as u32;
        char::from_u32(codepoint).map(|ch| ch.to_string())
    } else {
        char::from_u32(value).map(|ch| ch.to_string())
    }
}

/// Decode a destination hex string into a Unicode string. Handles a single code point (≤4
/// digits), a UTF-16 surrogate pair or two-code-point ligature (exactly 8 digits), and longer
/// multi-code-point ligatures (split into 4-digit chunks).
fn decode_dst_hex(dst_hex: &str) -> Option<String> {
    if dst_hex.is_empty() {
        return None;
    }
    if dst_hex.len() <= 4 {
        let code = u32::from_str_radix(dst_hex, 16).ok()?;
        return char::from_u32(code).map(|c| c.to_string());
    }
    if dst_hex.len() == 8 {
        let combined = u32::from_str_radix(dst_hex, 16).ok()?;
        if let Some(decoded) = decode_utf16_surrogate_pair(combined) {
            return Some(decoded);
        }
    }
    let mut result = String::new();
    for chunk_start in (0..dst_hex.len()).step_by(4) {
        let chunk_end = (chunk_start + 4).min(dst_hex.len());
        if let Ok(code) = u32::from_str_radix(&dst_hex[chunk_start..chunk_end], 16) {
            if let Some(ch) = char::from_u32(code) {
                result.push(ch);
            }
        }
    }
    if result.is_empty() { None } else { Some(result) }
}

/// A token recognized inside a CMap section line.
enum CmapToken {
    Hex(String),
    Array(Vec<String>),
}

/// Split a line into its `<hex>` and `[<hex> <hex> …]` tokens, ignoring `%` comments.
/// Whitespace between angle-bracket pairs is a separator; whitespace inside one is stripped by
/// the caller before hex-decoding (escape-name destinations need the untouched text first).
fn tokenize_line(line: &str) -> Vec<CmapToken> {
    let mut tokens = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => break,
            b'<' => {
                if let Some(rel_end) = line[i..].find('>') {
                    let end = i + rel_end;
                    tokens.push(CmapToken::Hex(line[i + 1..end].trim().to_string()));
                    i = end + 1;
                } else {
                    break;
                }
            },
            b'[' => {
                if let Some(rel_end) = line[i..].find(']') {
                    let end = i + rel_end;
                    let inner = &line[i + 1..end];
                    let mut array = Vec::new();
                    let inner_bytes = inner.as_bytes();
                    let mut j = 0;
                    while j < inner_bytes.len() {
                        if inner_bytes[j] == b'<' {
                            if let Some(rel) = inner[j..].find('>') {
                                let e = j + rel;
                                array.push(inner[j + 1..e].trim().to_string());
                                j = e + 1;
                                continue;
                            }
                            break;
                        }
                        j += 1;
                    }
                    tokens.push(CmapToken::Array(array));
                    i = end + 1;
                } else {
                    break;
                }
            },
            _ => i += 1,
        }
    }
    tokens
}

fn hex_to_u32(raw: &str) -> Option<u32> {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    u32::from_str_radix(&stripped, 16).ok()
}

/// Parse a `<src> <dst>` bfchar line.
fn parse_bfchar_line(line: &str) -> Option<(u32, String)> {
    let tokens = tokenize_line(line);
    let mut hexes = tokens.into_iter().filter_map(|t| match t {
        CmapToken::Hex(h) => Some(h),
        CmapToken::Array(_) => None,
    });
    let src_raw = hexes.next()?;
    let dst_raw = hexes.next()?;

    let src = hex_to_u32(&src_raw)?;
    let dst = if let Some(escaped) = parse_escape_sequence(&dst_raw) {
        escaped
    } else {
        let dst_hex: String = dst_raw.chars().filter(|c| !c.is_whitespace()).collect();
        decode_dst_hex(&dst_hex)?
    };
    Some((src, dst))
}

/// Parse a `<start> <end> <dst>` or `<start> <end> [<dst0> <dst1> …]` bfrange line.
fn parse_bfrange_line(line: &str) -> Option<Vec<(u32, String)>> {
    let tokens = tokenize_line(line);
    let mut iter = tokens.into_iter();
    let start = match iter.next()? {
        CmapToken::Hex(h) => hex_to_u32(&h)?,
        CmapToken::Array(_) => return None,
    };
    let end = match iter.next()? {
        CmapToken::Hex(h) => hex_to_u32(&h)?,
        CmapToken::Array(_) => return None,
    };

    match iter.next()? {
        CmapToken::Array(dst_hexes) => {
            let range_size = (end.saturating_sub(start) + 1) as usize;
            if dst_hexes.len() != range_size {
                log::warn!(
                    "ToUnicode bfrange array size mismatch: expected {range_size} entries for range 0x{start:X}-0x{end:X}, got {}",
                    dst_hexes.len()
                );
            }
            let mut result = Vec::new();
            for (i, dst_hex) in dst_hexes.iter().take(range_size).enumerate() {
                let stripped: String = dst_hex.chars().filter(|c| !c.is_whitespace()).collect();
                if let Some(dst) = decode_dst_hex(&stripped) {
                    result.push((start + i as u32, dst));
                }
            }
            Some(result)
        },
        CmapToken::Hex(dst_start_raw) => {
            let dst_start = hex_to_u32(&dst_start_raw)?;
            let mut result = Vec::new();
            // Safety limit: a malformed range shouldn't make the interpreter allocate unbounded.
            // A full-BMP identity range (`<0000> <FFFF> <0000>`) is the common case and must not
            // be truncated, so the cap sits at the full Unicode scalar range, not an arbitrary
            // small constant.
            let range_size = end.saturating_sub(start).min(0x10_FFFF);
            for i in 0..=range_size {
                let src = start.wrapping_add(i);
                let dst_code = dst_start.wrapping_add(i);
                let unicode_string = if dst_code > 0xFFFF {
                    decode_utf16_surrogate_pair(dst_code)
                } else {
                    char::from_u32(dst_code).map(|c| c.to_string())
                };
                if let Some(s) = unicode_string {
                    result.push((src, s));
                }
            }
            Some(result)
        },
    }
}

/// Parse a `<start> <end> <dst>` notdefrange line: maps every code in the range to a single
/// fallback Unicode string.
fn parse_notdefrange_line(line: &str) -> Option<Vec<(u32, String)>> {
    let tokens = tokenize_line(line);
    let mut hexes = tokens.into_iter().filter_map(|t| match t {
        CmapToken::Hex(h) => Some(h),
        CmapToken::Array(_) => None,
    });
    let start = hex_to_u32(&hexes.next()?)?;
    let end = hex_to_u32(&hexes.next()?)?;
    let dst_raw = hexes.next()?;
    let dst = if let Some(escaped) = parse_escape_sequence(&dst_raw) {
        escaped
    } else {
        let stripped: String = dst_raw.chars().filter(|c| !c.is_whitespace()).collect();
        decode_dst_hex(&stripped)?
    };

    let range_size = end.saturating_sub(start).min(0x10_FFFF);
    let mut result = Vec::with_capacity((range_size + 1) as usize);
    for i in 0..=range_size {
        result.push((start.wrapping_add(i), dst.clone()));
    }
    Some(result)
}

/// Parse a `<low> <high>` codespacerange line; byte length is half the hex digit count.
fn parse_codespace_line(line: &str) -> Option<CodespaceRange> {
    let tokens = tokenize_line(line);
    let mut hexes = tokens.into_iter().filter_map(|t| match t {
        CmapToken::Hex(h) => Some(h),
        CmapToken::Array(_) => None,
    });
    let low_raw = hexes.next()?;
    let high_raw = hexes.next()?;
    let digit_count: usize = low_raw.chars().filter(|c| !c.is_whitespace()).count();
    let byte_len = (digit_count / 2).clamp(1, 4) as u8;
    Some(CodespaceRange { byte_len, low: hex_to_u32(&low_raw)?, high: hex_to_u32(&high_raw)? })
}

/// Extract the text between each `begin…`/`end…` marker pair, in order.
fn extract_sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut sections = Vec::new();
    let mut remaining = content;
    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        if let Some(end_pos) = after_begin.find(end) {
            sections.push(&after_begin[..end_pos]);
            remaining = &after_begin[end_pos + end.len()..];
        } else {
            break;
        }
    }
    sections
}

/// Parse a `/ToUnicode` CMap stream into a [`CMap`].
///
/// ```
/// use pdf_extract_core::fonts::cmap::parse_tounicode_cmap;
///
/// let cmap_data = b"beginbfchar\n<0041> <0041>\nendbfchar";
/// let cmap = parse_tounicode_cmap(cmap_data).unwrap();
/// assert_eq!(cmap.get(&0x41), Some(&"A".to_string()));
/// ```
pub fn parse_tounicode_cmap(data: &[u8]) -> Result<CMap> {
    let mut cmap = CMap::new();
    let content = String::from_utf8_lossy(data);

    for section in extract_sections(&content, "begincodespacerange", "endcodespacerange") {
        for line in section.lines() {
            if let Some(range) = parse_codespace_line(line) {
                log::trace!(
                    "ToUnicode codespacerange: {}-byte codes 0x{:X}-0x{:X}",
                    range.byte_len,
                    range.low,
                    range.high
                );
                cmap.codespace_ranges.push(range);
            }
        }
    }

    for section in extract_sections(&content, "beginbfchar", "endbfchar") {
        for line in section.lines() {
            if let Some((src, dst)) = parse_bfchar_line(line) {
                log::trace!("ToUnicode bfchar: 0x{src:02X} -> {dst:?}");
                cmap.insert(src, dst);
            }
        }
    }

    for section in extract_sections(&content, "beginbfrange", "endbfrange") {
        for line in section.lines() {
            if let Some(mappings) = parse_bfrange_line(line) {
                log::trace!("ToUnicode bfrange: {} mappings parsed", mappings.len());
                for (src, dst) in mappings {
                    cmap.insert(src, dst);
                }
            }
        }
    }

    for section in extract_sections(&content, "beginnotdefrange", "endnotdefrange") {
        for line in section.lines() {
            if let Some(mappings) = parse_notdefrange_line(line) {
                for (src, dst) in mappings {
                    cmap.chars.entry(src).or_insert(dst);
                }
            }
        }
    }

    Ok(cmap)
}
