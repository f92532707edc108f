//! Font encoding and CMap support for text extraction (§4.6).
//!
//! [`font::Font`] is the unit the content-stream interpreter consults: built once per resource
//! dictionary entry, then used to decode every `Tj`/`TJ` operand shown with that font.

pub mod cmap;
pub mod encoding;
pub mod font;

pub use cmap::{parse_tounicode_cmap, CMap};
pub use encoding::EncodingTable;
pub use font::{Font, ObjectResolver};
