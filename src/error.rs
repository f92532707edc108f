//! Error types for the PDF text-extraction pipeline.
//!
//! Every fallible operation in this crate returns [`Result`]. Variants are split into
//! structural/fatal failures (xref, trailer, catalog) and per-object/per-operator failures that
//! the document façade may downgrade to a skip in [`crate::config::ErrorMode::Permissive`]
//! (see `document.rs`).

/// Result type alias for PDF library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while resolving, parsing, decompressing, or interpreting a PDF.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `startxref` keyword not found within the last 1024 bytes of the file.
    #[error("startxref keyword not found in trailing 1024 bytes")]
    StartXrefNotFound,

    /// The offset following `startxref` is not a valid byte offset into the document.
    #[error("invalid xref offset: {0}")]
    InvalidXrefOffset(u64),

    /// A legacy (table-format) xref section failed to parse.
    #[error("invalid cross-reference table at byte {offset}: {reason}")]
    InvalidXrefTable {
        /// Byte offset of the malformed subsection or entry.
        offset: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// A cross-reference stream (`/Type /XRef`) failed to parse.
    #[error("invalid cross-reference stream: {0}")]
    InvalidXrefStream(String),

    /// The trailer dictionary is missing or malformed.
    #[error("invalid trailer dictionary: {0}")]
    InvalidTrailer(String),

    /// The lexer encountered a byte sequence that cannot start any valid token.
    #[error("unexpected token at byte {offset}: {reason}")]
    UnexpectedToken {
        /// Byte offset of the offending token.
        offset: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// The cursor reached the end of input while a construct was still open.
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),

    /// A numeric literal could not be parsed.
    #[error("invalid number at byte {0}")]
    InvalidNumber(usize),

    /// A literal string (`( ... )`) could not be decoded.
    #[error("invalid literal string at byte {0}: {1}")]
    InvalidString(usize, String),

    /// A hex string (`< ... >`) contained a non-hex-digit byte.
    #[error("invalid hex string at byte {0}")]
    InvalidHexString(usize),

    /// A name (`/...`) contained a malformed `#XX` escape that could not be recovered from.
    #[error("invalid name at byte {0}")]
    InvalidName(usize),

    /// A dictionary (`<< ... >>`) was malformed, most commonly a non-name key.
    #[error("invalid dictionary at byte {offset}: {reason}")]
    InvalidDictionary {
        /// Byte offset of the dictionary.
        offset: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// An array (`[ ... ]`) was malformed.
    #[error("invalid array at byte {0}")]
    InvalidArray(usize),

    /// A stream (`stream ... endstream`) was malformed or its length could not be determined.
    #[error("invalid stream at byte {offset}: {reason}")]
    InvalidStream {
        /// Byte offset of the stream keyword.
        offset: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// A `Reference` (`N G R`) pointed at an object number/generation the xref table has no
    /// entry for, or the referenced entry's kind does not match what was expected.
    #[error("invalid reference: {0} {1} R")]
    InvalidReference(u32, u16),

    /// Object, array, or dictionary nesting exceeded the 100-level cap.
    #[error("nesting too deep (limit {0} levels)")]
    NestingTooDeep(usize),

    /// A stream named a `/Filter` this crate does not implement.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// A filter stage failed to decode its input, or a decompression-bomb guard tripped.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// The page tree is malformed: a `/Kids` cycle, a leaf with no resolvable type, or similar.
    #[error("invalid page tree: {0}")]
    InvalidPageTree(String),

    /// A content-stream operator byte sequence is not recognized.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// A `Tf` operator named a font not present in the page's `/Resources/Font` dictionary.
    #[error("font not found: {0}")]
    FontNotFound(String),

    /// A caller-requested cancellation interrupted `extract_all_parallel` between pages.
    #[error("extraction cancelled after {completed} of {total} pages")]
    Cancelled {
        /// Pages that completed before cancellation was observed.
        completed: usize,
        /// Total pages the document has.
        total: usize,
    },

    /// An allocation would exceed the arena's configured bound.
    #[error("out of memory: {0}")]
    OutOfMemory(String),
}
