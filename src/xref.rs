//! Cross-reference table resolution (§4.3).
//!
//! The xref table maps object numbers to byte offsets (or, for compressed objects, to a
//! containing object-stream number and an index within it). Supports both legacy xref tables
//! (PDF 1.0-1.4) and cross-reference streams (PDF 1.5+), including `/Prev`-chained incremental
//! updates.

use crate::config::ExtractionOptions;
use crate::error::{Error, Result};
use crate::object::{Dict, Object};
use crate::parser::parse_indirect_object;
use crate::scan::rfind_substring;
use std::collections::HashMap;

/// How an xref entry locates its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntryType {
    /// The object number is not in use (on the free list).
    Free,
    /// A plain indirect object at a byte offset.
    Uncompressed,
    /// An object packed inside an object stream.
    Compressed,
}

/// A single cross-reference table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Which kind of entry this is.
    pub entry_type: XRefEntryType,
    /// Byte offset (`Uncompressed`) or containing object-stream number (`Compressed`).
    pub offset: u64,
    /// Generation number (`Uncompressed`) or index within the object stream (`Compressed`).
    pub generation: u16,
}

impl XRefEntry {
    /// A free (unused) entry.
    pub fn free(next_free: u64, generation: u16) -> Self {
        Self { entry_type: XRefEntryType::Free, offset: next_free, generation }
    }

    /// An in-use entry at a direct byte offset.
    pub fn uncompressed(offset: u64, generation: u16) -> Self {
        Self { entry_type: XRefEntryType::Uncompressed, offset, generation }
    }

    /// An entry packed inside an object stream.
    pub fn compressed(stream_obj_num: u64, index_in_stream: u16) -> Self {
        Self { entry_type: XRefEntryType::Compressed, offset: stream_obj_num, generation: index_in_stream }
    }
}

/// The resolved cross-reference table: every object number's location, plus the document
/// trailer (taken from the newest xref section in the `/Prev` chain).
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: HashMap<u32, XRefEntry>,
    trailer: Option<Dict>,
}

impl CrossRefTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The trailer dictionary, if one has been recorded.
    pub fn trailer(&self) -> Option<&Dict> {
        self.trailer.as_ref()
    }

    /// Record or replace the trailer dictionary.
    pub fn set_trailer(&mut self, trailer: Dict) {
        self.trailer = Some(trailer);
    }

    /// Insert an entry. Callers merging an older `/Prev` section should use [`Self::merge_from`]
    /// instead, which preserves first-wins semantics.
    pub fn add_entry(&mut self, object_number: u32, entry: XRefEntry) {
        self.entries.insert(object_number, entry);
    }

    /// Look up an entry by object number.
    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number)
    }

    /// Whether an object number has an entry.
    pub fn contains(&self, object_number: u32) -> bool {
        self.entries.contains_key(&object_number)
    }

    /// Every object number this table knows about.
    pub fn all_object_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Merge in an older `/Prev` section: its entries only fill gaps, since a newer (already
    /// present) entry always shadows an incremental update's predecessor.
    pub fn merge_from(&mut self, other: CrossRefTable) {
        for (obj_num, entry) in other.entries {
            self.entries.entry(obj_num).or_insert(entry);
        }
        if self.trailer.is_none() {
            self.trailer = other.trailer;
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Find the `startxref` offset by scanning the last 1024 bytes of the document.
///
/// An incrementally-updated file can carry more than one `startxref` keyword (one per appended
/// update, plus the original); the entry point is always the *last* one in the file, so this
/// scans from the end of the trailing window rather than the start.
pub fn find_startxref_offset(input: &[u8]) -> Result<u64> {
    let window_start = input.len().saturating_sub(1024);
    let window = &input[window_start..];
    let relative = rfind_substring(window, b"startxref").ok_or(Error::StartXrefNotFound)?;
    let after_keyword = window_start + relative + "startxref".len();

    let mut offset = crate::lexer::skip_ws_and_comments(input, after_keyword);
    let start = offset;
    while offset < input.len() && input[offset].is_ascii_digit() {
        offset += 1;
    }
    if offset == start {
        return Err(Error::StartXrefNotFound);
    }
    std::str::from_utf8(&input[start..offset])
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(Error::StartXrefNotFound)
}

/// Parse the full cross-reference chain starting at `offset`, following `/Prev` pointers.
pub fn parse_xref_chain(input: &[u8], offset: u64, options: &ExtractionOptions) -> Result<CrossRefTable> {
    parse_xref_chain_at_depth(input, offset, options, 0)
}

fn parse_xref_chain_at_depth(
    input: &[u8],
    offset: u64,
    options: &ExtractionOptions,
    depth: usize,
) -> Result<CrossRefTable> {
    if depth > options.max_prev_chain {
        return Err(Error::InvalidXrefTable {
            offset: offset as usize,
            reason: format!("/Prev chain depth exceeded {}", options.max_prev_chain),
        });
    }

    if offset as usize >= input.len() {
        return Err(Error::InvalidXrefOffset(offset));
    }

    let mut xref = parse_one_xref_section(input, offset as usize, options)?;

    if let Some(prev_offset) = xref.trailer().and_then(|t| t.get("Prev")).and_then(Object::as_integer) {
        if prev_offset >= 0 {
            let prev_xref = parse_xref_chain_at_depth(input, prev_offset as u64, options, depth + 1)?;
            xref.merge_from(prev_xref);
        }
    }

    Ok(xref)
}

fn parse_one_xref_section(
    input: &[u8],
    offset: usize,
    options: &ExtractionOptions,
) -> Result<CrossRefTable> {
    let peek_offset = crate::lexer::skip_ws_and_comments(input, offset);
    if input[peek_offset..].starts_with(b"xref") {
        parse_traditional_xref(input, peek_offset)
    } else {
        parse_xref_stream(input, offset, options)
    }
}

/// Parse a legacy `xref` table: `xref`, subsection headers (`start count`), fixed-width 20-byte
/// entries, then `trailer` and the trailer dictionary.
fn parse_traditional_xref(input: &[u8], offset: usize) -> Result<CrossRefTable> {
    let mut xref = CrossRefTable::new();
    let mut cursor = offset + "xref".len();

    loop {
        cursor = crate::lexer::skip_ws_and_comments(input, cursor);
        if input[cursor..].starts_with(b"trailer") {
            cursor += "trailer".len();
            break;
        }
        if cursor >= input.len() {
            return Err(Error::InvalidXrefTable { offset, reason: "missing `trailer` keyword".to_string() });
        }

        let (start_obj, after_start) = read_uint(input, cursor)
            .ok_or(Error::InvalidXrefTable { offset: cursor, reason: "expected subsection start".to_string() })?;
        let after_ws = crate::lexer::skip_ws_and_comments(input, after_start);
        let (count, after_count) = read_uint(input, after_ws)
            .ok_or(Error::InvalidXrefTable { offset: after_ws, reason: "expected subsection count".to_string() })?;

        if count > 1_000_000 {
            return Err(Error::InvalidXrefTable {
                offset: cursor,
                reason: "xref subsection count exceeds limit".to_string(),
            });
        }

        cursor = crate::lexer::skip_ws_and_comments(input, after_count);
        for i in 0..count {
            if cursor + 20 > input.len() {
                return Err(Error::InvalidXrefTable { offset: cursor, reason: "truncated xref entry".to_string() });
            }
            let line = &input[cursor..cursor + 20];
            let entry = parse_xref_entry_line(line).unwrap_or_else(|| {
                log::warn!("malformed xref entry at object {}: {:?}", start_obj + i, String::from_utf8_lossy(line));
                XRefEntry::free(0, 65535)
            });
            xref.add_entry((start_obj + i) as u32, entry);
            cursor += 20;
        }
    }

    let trailer_start = crate::lexer::skip_ws_and_comments(input, cursor);
    let (trailer_obj, _end) = crate::parser::parse_object(input, trailer_start, 100)?;
    let trailer_dict = trailer_obj
        .as_dict()
        .cloned()
        .ok_or_else(|| Error::InvalidTrailer("trailer is not a dictionary".to_string()))?;
    xref.set_trailer(trailer_dict);

    Ok(xref)
}

/// Parse one fixed-width 20-byte xref entry: `oooooooooo ggggg n/f`.
fn parse_xref_entry_line(line: &[u8]) -> Option<XRefEntry> {
    let text = std::str::from_utf8(line).ok()?;
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }
    let offset: u64 = parts[0].parse().ok()?;
    let generation: u16 = parts[1].parse().ok()?;
    match parts[2].chars().next()? {
        'n' => Some(XRefEntry::uncompressed(offset, generation)),
        'f' => Some(XRefEntry::free(offset, generation)),
        _ => None,
    }
}

fn read_uint(input: &[u8], start: usize) -> Option<(u64, usize)> {
    let mut offset = start;
    while offset < input.len() && input[offset].is_ascii_digit() {
        offset += 1;
    }
    if offset == start {
        return None;
    }
    std::str::from_utf8(&input[start..offset]).ok()?.parse().ok().map(|v| (v, offset))
}

/// Parse a cross-reference stream: an indirect object whose Dict has `/Type /XRef`.
fn parse_xref_stream(input: &[u8], offset: usize, options: &ExtractionOptions) -> Result<CrossRefTable> {
    let (_reference, object, _end) = parse_indirect_object(input, offset, options.max_nesting)?;
    let Object::Stream { dict, .. } = &object else {
        return Err(Error::InvalidXrefStream("xref entry is not a stream object".to_string()));
    };

    if let Some(type_name) = dict.get("Type").and_then(Object::as_name) {
        if type_name != "XRef" {
            return Err(Error::InvalidXrefStream(format!("expected /Type /XRef, got /Type /{type_name}")));
        }
    }

    let w_array = dict
        .get("W")
        .and_then(Object::as_array)
        .ok_or_else(|| Error::InvalidXrefStream("missing /W array".to_string()))?;
    if w_array.len() != 3 {
        return Err(Error::InvalidXrefStream("invalid /W array length".to_string()));
    }
    let w1 = w_array[0].as_integer().ok_or_else(|| Error::InvalidXrefStream("invalid /W[0]".to_string()))? as usize;
    let w2 = w_array[1].as_integer().ok_or_else(|| Error::InvalidXrefStream("invalid /W[1]".to_string()))? as usize;
    let w3 = w_array[2].as_integer().ok_or_else(|| Error::InvalidXrefStream("invalid /W[2]".to_string()))? as usize;
    let entry_size = w1 + w2 + w3;
    if entry_size == 0 {
        return Err(Error::InvalidXrefStream("/W entries are all zero".to_string()));
    }

    let size = dict
        .get("Size")
        .and_then(Object::as_integer)
        .ok_or_else(|| Error::InvalidXrefStream("missing /Size".to_string()))? as u32;

    let index_ranges: Vec<(u32, u32)> = if let Some(index_array) = dict.get("Index").and_then(Object::as_array) {
        let mut ranges = Vec::new();
        for pair in index_array.chunks(2) {
            let [start, count] = pair else {
                return Err(Error::InvalidXrefStream("/Index has an odd number of entries".to_string()));
            };
            let start = start.as_integer().ok_or_else(|| Error::InvalidXrefStream("invalid /Index start".to_string()))?;
            let count = count.as_integer().ok_or_else(|| Error::InvalidXrefStream("invalid /Index count".to_string()))?;
            ranges.push((start as u32, count as u32));
        }
        ranges
    } else {
        vec![(0, size)]
    };

    let decoded_data = object.decode_stream_data(options)?;

    let mut xref = CrossRefTable::new();
    let mut data_pos = 0usize;
    for (start_obj, count) in index_ranges {
        for i in 0..count {
            if data_pos + entry_size > decoded_data.len() {
                return Err(Error::InvalidXrefStream("truncated xref stream data".to_string()));
            }
            let entry_data = &decoded_data[data_pos..data_pos + entry_size];
            data_pos += entry_size;

            let entry_type = if w1 > 0 { read_be(&entry_data[0..w1]) } else { 1 };
            let field2 = read_be(&entry_data[w1..w1 + w2]);
            let field3 = read_be(&entry_data[w1 + w2..w1 + w2 + w3]);

            let entry = match entry_type {
                0 => XRefEntry::free(field2, field3 as u16),
                1 => XRefEntry::uncompressed(field2, field3 as u16),
                2 => XRefEntry::compressed(field2, field3 as u16),
                other => {
                    return Err(Error::InvalidXrefStream(format!("invalid xref entry type: {other}")));
                },
            };
            xref.add_entry(start_obj + i, entry);
        }
    }

    xref.set_trailer(dict.clone());
    Ok(xref)
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}
