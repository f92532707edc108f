// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::explicit_counter_loop)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::redundant_guards)]
#![allow(clippy::match_like_matches_macro)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # pdf_extract_core
//!
//! High-throughput extraction of Unicode text from PDF byte streams.
//!
//! Given a PDF's bytes, [`Document::open`] resolves the cross-reference table, walks the page
//! tree, and decodes every page's fonts, ready for [`Document::extract_text`]/
//! [`Document::extract_all`] to interpret each page's content stream and emit Unicode text in
//! stream order — no layout reconstruction, no rendering, no writing.
//!
//! ```ignore
//! use pdf_extract_core::{Document, ErrorConfig};
//!
//! let bytes = std::fs::read("paper.pdf")?;
//! let doc = Document::open(&bytes, ErrorConfig::permissive())?;
//! let mut text = String::new();
//! doc.extract_text(0, &mut text)?;
//! println!("{text}");
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

/// Error types for the PDF text-extraction pipeline.
pub mod error;

// Core PDF parsing
pub mod document;
pub mod lexer;
pub mod object;
pub mod objstm;
pub mod parser;
pub mod scan;
pub mod xref;

// Stream decoders
pub mod decoders;

// Page tree resolution
pub mod page;

// Font encoding and CMap decoding
pub mod fonts;

// Content stream tokenizing and interpretation
pub mod content;

// Configuration
pub mod config;

// Re-exports
pub use config::{ErrorConfig, ErrorMode, ExtractionOptions};
pub use content::TextSink;
pub use document::{Document, PageInfo};
pub use error::{Error, Result};

// Version info
/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
