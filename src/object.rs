//! PDF object types: the value representation every parser, resolver, and interpreter operates
//! on.

use crate::error::{Error, Result};

/// An ordered dictionary: `Vec<(name, Object)>` rather than a `HashMap`.
///
/// PDF dictionaries are unordered by spec, but this crate keeps insertion order and resolves
/// duplicate keys to the **first** occurrence, matching how a linear scan over the source bytes
/// would naturally behave and keeping lookup deterministic without requiring a second pass to
/// detect/drop duplicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dict(Vec<(String, Object)>);

impl Dict {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a key/value pair. If `key` is already present, the existing entry is left in place
    /// and the new value is discarded — first occurrence wins, per the PDF object model.
    pub fn insert(&mut self, key: String, value: Object) {
        if !self.0.iter().any(|(k, _)| k == &key) {
            self.0.push((key, value));
        }
    }

    /// Look up a value by key. Linear scan; dictionaries in a PDF are small (tens of entries).
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Object)> for Dict {
    fn from_iter<I: IntoIterator<Item = (String, Object)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// PDF object representation (§3 of the design notes).
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating-point real.
    Real(f64),
    /// Literal string (`( ... )`), already escape-decoded.
    String(Vec<u8>),
    /// Hex string (`< ... >`), already decoded to raw bytes. Kept distinct from `String` because
    /// the two syntaxes are never ambiguous in source and callers (e.g. composite-font content
    /// bytes) care which one produced a value.
    HexString(Vec<u8>),
    /// Name (`/...`), escape-decoded.
    Name(String),
    /// Ordered sequence of objects.
    Array(Vec<Object>),
    /// Ordered dictionary.
    Dict(Dict),
    /// A dictionary plus the raw (still filter-encoded) stream payload.
    Stream {
        /// The stream's dictionary (holds `/Length`, `/Filter`, `/DecodeParms`, etc).
        dict: Dict,
        /// Raw bytes between `stream` and `endstream`, before any filter is applied.
        data: bytes::Bytes,
    },
    /// Indirect reference (`N G R`).
    Reference(Reference),
}

/// Reference to an indirect object: `(object number, generation number)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Object number.
    pub number: u32,
    /// Generation number.
    pub generation: u16,
}

impl Reference {
    /// Construct a reference.
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

impl Object {
    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Bool(_) => "Bool",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::HexString(_) => "HexString",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dict(_) => "Dict",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Try to view as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to view as a real number. Integers coerce, since PDF numeric operands are frequently
    /// written as either one interchangeably.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(r) => Some(*r),
            Object::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to view as a name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to view as a dictionary. Works for both `Dict` and `Stream` objects, since a stream's
    /// dictionary carries the same entries a bare dictionary would.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dict(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to view as an array.
    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to view as a reference.
    pub fn as_reference(&self) -> Option<Reference> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to view as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to view as raw bytes, whichever string variant produced them.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) | Object::HexString(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is `Object::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Decode this stream's payload by applying its `/Filter` chain (§4.4).
    ///
    /// Returns the raw, already-decompressed bytes. Not applicable to non-stream objects.
    pub fn decode_stream_data(
        &self,
        options: &crate::config::ExtractionOptions,
    ) -> Result<Vec<u8>> {
        match self {
            Object::Stream { dict, data } => {
                let filters = dict.get("Filter").map(extract_filter_names).unwrap_or_default();
                if filters.is_empty() {
                    return Ok(data.to_vec());
                }
                let decode_params = extract_decode_params(dict.get("DecodeParms"));
                crate::decoders::decode_stream_with_params(
                    data,
                    &filters,
                    decode_params.as_ref(),
                    options,
                )
            },
            _ => Err(Error::InvalidStream {
                offset: 0,
                reason: format!("expected Stream, found {}", self.type_name()),
            }),
        }
    }
}

/// Extract filter names from a `/Filter` entry: a single Name, or an Array of Names.
pub(crate) fn extract_filter_names(filter_obj: &Object) -> Vec<String> {
    match filter_obj {
        Object::Name(name) => vec![name.clone()],
        Object::Array(arr) => arr.iter().filter_map(|obj| obj.as_name().map(str::to_string)).collect(),
        _ => vec![],
    }
}

/// Extract predictor parameters from a `/DecodeParms` entry: a single Dict, or an Array of them
/// (one per filter stage; only the first is honored, matching the common single-filter case this
/// crate's predictor support targets).
pub(crate) fn extract_decode_params(
    params_obj: Option<&Object>,
) -> Option<crate::decoders::predictor::DecodeParams> {
    let dict = match params_obj? {
        Object::Dict(d) => d,
        Object::Array(arr) => arr.iter().filter_map(Object::as_dict).next()?,
        _ => return None,
    };

    let predictor = dict.get("Predictor").and_then(Object::as_integer).unwrap_or(1);
    let columns = dict.get("Columns").and_then(Object::as_integer).unwrap_or(1) as usize;
    let colors = dict.get("Colors").and_then(Object::as_integer).unwrap_or(1) as usize;
    let bits_per_component =
        dict.get("BitsPerComponent").and_then(Object::as_integer).unwrap_or(8) as usize;

    Some(crate::decoders::predictor::DecodeParams { predictor, columns, colors, bits_per_component })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_first_occurrence_wins() {
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::Name("Page".to_string()));
        dict.insert("Type".to_string(), Object::Name("Pages".to_string()));
        assert_eq!(dict.get("Type").and_then(Object::as_name), Some("Page"));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn dict_preserves_insertion_order() {
        let mut dict = Dict::new();
        dict.insert("B".to_string(), Object::Integer(2));
        dict.insert("A".to_string(), Object::Integer(1));
        let keys: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn string_and_hex_string_are_distinct_variants() {
        let literal = Object::String(b"Hello".to_vec());
        let hex = Object::HexString(b"Hello".to_vec());
        assert_ne!(literal, hex);
        assert_eq!(literal.as_bytes(), hex.as_bytes());
    }

    #[test]
    fn reference_display_matches_r_notation() {
        let r = Reference::new(10, 0);
        assert_eq!(format!("{r}"), "10 0 R");
    }

    #[test]
    fn as_dict_works_for_stream_too() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(5));
        let obj = Object::Stream { dict, data: bytes::Bytes::from_static(b"Hello") };
        assert_eq!(obj.as_dict().unwrap().get("Length").and_then(Object::as_integer), Some(5));
    }

    #[test]
    fn decode_stream_no_filter_is_passthrough() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(5));
        let obj = Object::Stream { dict, data: bytes::Bytes::from_static(b"Hello") };
        let decoded = obj.decode_stream_data(&crate::config::ExtractionOptions::default()).unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn decode_stream_on_non_stream_errors() {
        let obj = Object::Integer(42);
        let err = obj.decode_stream_data(&crate::config::ExtractionOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidStream { .. }));
    }

    #[test]
    fn extract_filter_names_handles_array_and_single() {
        assert_eq!(
            extract_filter_names(&Object::Name("FlateDecode".to_string())),
            vec!["FlateDecode"]
        );
        assert_eq!(
            extract_filter_names(&Object::Array(vec![
                Object::Name("ASCII85Decode".to_string()),
                Object::Name("FlateDecode".to_string()),
            ])),
            vec!["ASCII85Decode", "FlateDecode"]
        );
    }
}
