//! Font dictionary parsing and character-code-to-Unicode decoding (§4.6).
//!
//! A [`Font`] is built once per page (from the page's `/Resources/Font` dictionary) and then
//! consulted once per `Tj`/`TJ` operand to turn the raw bytes of a shown string into Unicode.
//! Two shapes cover everything the interpreter needs: [`Font::Simple`], one byte per character
//! code, and [`Font::Composite`], a variable-length (here: 1- or 2-byte) CID font.

use crate::config::ExtractionOptions;
use crate::error::{Error, Result};
use crate::fonts::cmap::{self, CMap};
use crate::fonts::encoding::EncodingTable;
use crate::object::{Dict, Object, Reference};

/// Resolves an indirect [`Reference`] to the [`Object`] it points at.
///
/// Font parsing needs to dereference `/Encoding`, `/ToUnicode`, and `/DescendantFonts` entries,
/// but owns no xref table of its own — the document façade supplies one of these, typically a
/// closure over its object cache. Blanket-implemented for any `FnMut(Reference) -> Result<Object>`
/// so callers can pass a closure directly.
pub trait ObjectResolver {
    /// Look up the object an indirect reference points at.
    fn resolve(&mut self, reference: Reference) -> Result<Object>;
}

impl<F: FnMut(Reference) -> Result<Object>> ObjectResolver for F {
    fn resolve(&mut self, reference: Reference) -> Result<Object> {
        self(reference)
    }
}

/// A font as the content-stream interpreter needs it: enough to turn shown-string bytes into
/// Unicode, nothing about glyph outlines, widths, or embedding.
#[derive(Debug, Clone)]
pub enum Font {
    /// A simple (single-byte) font: Type1, TrueType (simple), MMType1, Type3.
    Simple {
        /// Byte-code → Unicode table, built from `/BaseEncoding` plus `/Differences`.
        encoding: EncodingTable,
        /// `/ToUnicode`, when present, takes priority over `encoding` per code.
        to_unicode: Option<CMap>,
    },
    /// A composite (Type0) font. CID widths are parsed-but-discarded elsewhere; this crate only
    /// needs the CID → Unicode mapping.
    Composite {
        /// `/ToUnicode`, almost always present for text-bearing composite fonts. Its absence
        /// means every code decodes to the replacement character.
        to_unicode: Option<CMap>,
    },
}

impl Font {
    /// Build a [`Font`] from a `/Font` resource dictionary entry.
    ///
    /// `base_font` is only used for diagnostic log lines; `resolver` dereferences the indirect
    /// objects a font dictionary commonly points at (`/Encoding`, `/ToUnicode`,
    /// `/DescendantFonts`).
    pub fn from_dict(
        dict: &Dict,
        resolver: &mut dyn ObjectResolver,
        options: &ExtractionOptions,
    ) -> Result<Font> {
        let base_font = dict.get("BaseFont").and_then(Object::as_name).unwrap_or("Unknown");
        let subtype = dict.get("Subtype").and_then(Object::as_name).unwrap_or("");

        if subtype == "Type3" {
            log::warn!("font '{base_font}' is Type3; glyph procedures are not interpreted, only /Encoding and /ToUnicode");
        }

        if subtype == "Type0" {
            Self::composite_from_dict(dict, base_font, resolver, options)
        } else {
            Self::simple_from_dict(dict, base_font, resolver, options)
        }
    }

    fn simple_from_dict(
        dict: &Dict,
        base_font: &str,
        resolver: &mut dyn ObjectResolver,
        options: &ExtractionOptions,
    ) -> Result<Font> {
        let encoding = match dict.get("Encoding") {
            Some(enc_obj) => resolve_encoding(enc_obj, base_font, resolver)?,
            None => EncodingTable::standard(),
        };
        let to_unicode = parse_to_unicode(dict, base_font, resolver, options);
        Ok(Font::Simple { encoding, to_unicode })
    }

    fn composite_from_dict(
        dict: &Dict,
        base_font: &str,
        resolver: &mut dyn ObjectResolver,
        options: &ExtractionOptions,
    ) -> Result<Font> {
        validate_descendant_fonts(dict, base_font, resolver);

        let to_unicode = parse_to_unicode(dict, base_font, resolver, options);
        if to_unicode.is_none() {
            log::warn!(
                "font '{base_font}' is Type0 with no /ToUnicode CMap; every code will decode to U+FFFD"
            );
        }
        Ok(Font::Composite { to_unicode })
    }

    /// Decode a shown-string byte sequence (a `Tj`/`TJ` operand) to Unicode.
    ///
    /// Simple fonts consult `to_unicode` first, falling back to `encoding`, one byte at a time.
    /// Composite fonts greedy-match the codespace ranges declared in the `ToUnicode` CMap
    /// (defaulting to 2-byte codes, per `Identity-H`/`Identity-V`, when no CMap or no matching
    /// range is present).
    ///
    /// In permissive mode an unmapped code becomes `U+FFFD`; in strict mode it is
    /// [`Error::FontNotFound`].
    pub fn decode(&self, bytes: &[u8], permissive: bool) -> Result<String> {
        match self {
            Font::Simple { encoding, to_unicode } => {
                decode_simple(bytes, encoding, to_unicode.as_ref(), permissive)
            },
            Font::Composite { to_unicode } => decode_composite(bytes, to_unicode.as_ref(), permissive),
        }
    }
}

fn decode_simple(
    bytes: &[u8],
    encoding: &EncodingTable,
    to_unicode: Option<&CMap>,
    permissive: bool,
) -> Result<String> {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        if let Some(mapped) = to_unicode.and_then(|cmap| cmap.get(&(byte as u32))) {
            out.push_str(mapped);
            continue;
        }
        match encoding.decode(byte) {
            Some(ch) => out.push(ch),
            None if permissive => out.push('\u{FFFD}'),
            None => return Err(Error::FontNotFound(format!("no Unicode mapping for code {byte:#04x}"))),
        }
    }
    Ok(out)
}

fn decode_composite(bytes: &[u8], to_unicode: Option<&CMap>, permissive: bool) -> Result<String> {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let remaining = bytes.len() - i;
        let default_len = remaining.min(2);
        let len = to_unicode
            .map(|cmap| cmap.byte_length_for(bytes[i], default_len).clamp(1, remaining))
            .unwrap_or(default_len)
            .max(1);

        let mut code: u32 = 0;
        for &b in &bytes[i..i + len] {
            code = (code << 8) | b as u32;
        }

        match to_unicode.and_then(|cmap| cmap.get(&code)) {
            Some(mapped) => out.push_str(mapped),
            None if permissive => out.push('\u{FFFD}'),
            None => return Err(Error::FontNotFound(format!("no ToUnicode mapping for CID {code:#06x}"))),
        }
        i += len;
    }
    Ok(out)
}

/// Resolve `/Encoding`, following one indirect reference if present, then build the table.
fn resolve_encoding(
    enc_obj: &Object,
    base_font: &str,
    resolver: &mut dyn ObjectResolver,
) -> Result<EncodingTable> {
    let enc_obj = match enc_obj {
        Object::Reference(r) => resolver.resolve(*r)?,
        other => other.clone(),
    };
    match &enc_obj {
        Object::Name(name) => Ok(EncodingTable::predefined(name)),
        Object::Dict(dict) => {
            let mut table = dict
                .get("BaseEncoding")
                .and_then(Object::as_name)
                .map(EncodingTable::predefined)
                .unwrap_or_else(EncodingTable::standard);
            if let Some(Object::Array(differences)) = dict.get("Differences") {
                table.apply_differences(differences);
            }
            Ok(table)
        },
        other => {
            log::warn!(
                "font '{base_font}': /Encoding is a {}, expected Name or Dict; using StandardEncoding",
                other.type_name()
            );
            Ok(EncodingTable::standard())
        },
    }
}

/// Parse `/ToUnicode`, logging and returning `None` on anything short of success — a missing or
/// unparseable CMap degrades the font, it is never a fatal error on its own.
fn parse_to_unicode(
    dict: &Dict,
    base_font: &str,
    resolver: &mut dyn ObjectResolver,
    options: &ExtractionOptions,
) -> Option<CMap> {
    let entry = dict.get("ToUnicode")?;
    let stream = match entry {
        Object::Reference(r) => match resolver.resolve(*r) {
            Ok(obj) => obj,
            Err(err) => {
                log::warn!("font '{base_font}': failed to resolve /ToUnicode: {err}");
                return None;
            },
        },
        other => other.clone(),
    };

    let data = match stream.decode_stream_data(options) {
        Ok(data) => data,
        Err(err) => {
            log::warn!("font '{base_font}': failed to decode /ToUnicode stream: {err}");
            return None;
        },
    };

    match cmap::parse_tounicode_cmap(&data) {
        Ok(cmap) => Some(cmap),
        Err(err) => {
            log::warn!("font '{base_font}': failed to parse /ToUnicode CMap: {err}");
            None
        },
    }
}

/// `/DescendantFonts` is a one-element array holding a reference to the CIDFont dictionary.
/// Nothing in it is needed for text extraction (CID widths are out of scope), but a missing or
/// malformed entry is worth a log line since it usually means the font won't decode at all.
fn validate_descendant_fonts(dict: &Dict, base_font: &str, resolver: &mut dyn ObjectResolver) {
    let Some(Object::Array(descendants)) = dict.get("DescendantFonts") else {
        log::warn!("font '{base_font}': Type0 font is missing /DescendantFonts");
        return;
    };
    let Some(first) = descendants.first() else {
        log::warn!("font '{base_font}': /DescendantFonts array is empty");
        return;
    };
    let resolved = match first {
        Object::Reference(r) => resolver.resolve(*r),
        other => Ok(other.clone()),
    };
    match resolved {
        Ok(obj) if obj.as_dict().is_some() => {},
        Ok(obj) => log::warn!(
            "font '{base_font}': /DescendantFonts[0] is a {}, expected a Dict",
            obj.type_name()
        ),
        Err(err) => log::warn!("font '{base_font}': failed to resolve /DescendantFonts[0]: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeResolver(HashMap<Reference, Object>);

    impl ObjectResolver for FakeResolver {
        fn resolve(&mut self, reference: Reference) -> Result<Object> {
            self.0
                .get(&reference)
                .cloned()
                .ok_or(Error::InvalidReference(reference.number, reference.generation))
        }
    }

    fn dict(entries: Vec<(&str, Object)>) -> Dict {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn simple_font_with_no_encoding_uses_standard() {
        let mut resolver = FakeResolver(HashMap::new());
        let font_dict = dict(vec![
            ("Subtype", Object::Name("Type1".into())),
            ("BaseFont", Object::Name("Helvetica".into())),
        ]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let text = font.decode(b"A", true).unwrap();
        assert_eq!(text, "A");
    }

    #[test]
    fn simple_font_win_ansi_predefined() {
        let mut resolver = FakeResolver(HashMap::new());
        let font_dict = dict(vec![
            ("Subtype", Object::Name("TrueType".into())),
            ("Encoding", Object::Name("WinAnsiEncoding".into())),
        ]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let text = font.decode(&[0x80], true).unwrap();
        assert_eq!(text, "\u{20AC}");
    }

    #[test]
    fn simple_font_with_differences_dict_encoding() {
        let mut resolver = FakeResolver(HashMap::new());
        let encoding_dict = Object::Dict(dict(vec![
            ("BaseEncoding", Object::Name("WinAnsiEncoding".into())),
            (
                "Differences",
                Object::Array(vec![Object::Integer(65), Object::Name("bullet".into())]),
            ),
        ]));
        let font_dict = dict(vec![("Subtype", Object::Name("Type1".into())), ("Encoding", encoding_dict)]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let text = font.decode(&[65], true).unwrap();
        assert_eq!(text, "\u{2022}");
    }

    #[test]
    fn simple_font_to_unicode_overrides_encoding() {
        let tounicode_data = b"/CIDInit /ProcSet findresource begin\n1 begincodespacerange\n<00> <FF>\nendcodespacerange\n1 beginbfchar\n<41> <0058>\nendbfchar\nend".to_vec();
        let mut objects = HashMap::new();
        let stream_ref = Reference::new(10, 0);
        objects.insert(
            stream_ref,
            Object::Stream { dict: Dict::new(), data: bytes::Bytes::from(tounicode_data) },
        );
        let mut resolver = FakeResolver(objects);
        let font_dict = dict(vec![
            ("Subtype", Object::Name("Type1".into())),
            ("ToUnicode", Object::Reference(stream_ref)),
        ]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let text = font.decode(&[0x41], true).unwrap();
        assert_eq!(text, "X");
    }

    #[test]
    fn composite_font_decodes_two_byte_codes_via_identity_tounicode() {
        let tounicode_data = b"/CIDInit /ProcSet findresource begin\n1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n1 beginbfrange\n<0048> <004C> <0048>\nendbfrange\nend".to_vec();
        let stream_ref = Reference::new(11, 0);
        let mut objects = HashMap::new();
        objects.insert(
            stream_ref,
            Object::Stream { dict: Dict::new(), data: bytes::Bytes::from(tounicode_data) },
        );
        let descendant_ref = Reference::new(12, 0);
        objects.insert(
            descendant_ref,
            Object::Dict(dict(vec![("Subtype", Object::Name("CIDFontType2".into()))])),
        );
        let mut resolver = FakeResolver(objects);
        let font_dict = dict(vec![
            ("Subtype", Object::Name("Type0".into())),
            ("Encoding", Object::Name("Identity-H".into())),
            ("DescendantFonts", Object::Array(vec![Object::Reference(descendant_ref)])),
            ("ToUnicode", Object::Reference(stream_ref)),
        ]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let text = font.decode(&[0x00, 0x48], true).unwrap();
        assert_eq!(text, "H");
    }

    #[test]
    fn composite_font_without_tounicode_emits_replacement_char_in_permissive_mode() {
        let mut resolver = FakeResolver(HashMap::new());
        let font_dict = dict(vec![
            ("Subtype", Object::Name("Type0".into())),
            ("Encoding", Object::Name("Identity-H".into())),
        ]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let text = font.decode(&[0x00, 0x41], true).unwrap();
        assert_eq!(text, "\u{FFFD}");
    }

    #[test]
    fn composite_font_without_tounicode_errors_in_strict_mode() {
        let mut resolver = FakeResolver(HashMap::new());
        let font_dict = dict(vec![
            ("Subtype", Object::Name("Type0".into())),
            ("Encoding", Object::Name("Identity-H".into())),
        ]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let err = font.decode(&[0x00, 0x41], false).unwrap_err();
        assert!(matches!(err, Error::FontNotFound(_)));
    }

    #[test]
    fn simple_font_unmapped_code_errors_in_strict_mode() {
        let mut resolver = FakeResolver(HashMap::new());
        let encoding_dict = Object::Dict(dict(vec![("BaseEncoding", Object::Name("MacExpertEncoding".into()))]));
        let font_dict = dict(vec![("Subtype", Object::Name("Type1".into())), ("Encoding", encoding_dict)]);
        let font = Font::from_dict(&font_dict, &mut resolver, &ExtractionOptions::default()).unwrap();
        let err = font.decode(&[0x01], false).unwrap_err();
        assert!(matches!(err, Error::FontNotFound(_)));
    }

}
