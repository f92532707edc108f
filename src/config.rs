//! Configuration for error handling and extraction tunables.
//!
//! Mirrors the strict/lenient split of `ParserOptions` in the crate this was adapted from: a
//! document is opened once with an [`ErrorConfig`], and every fallible step downstream consults
//! it to decide whether to propagate or to recover and continue.

/// Whether recoverable errors propagate or are swallowed and substituted with a fallback.
///
/// See `error.rs` for which error kinds are structural (always fatal, regardless of mode) versus
/// recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Every typed error surfaces to the caller.
    Strict,
    /// Recoverable errors are logged and suppressed: unknown operators are skipped, missing
    /// glyphs become `U+FFFD`, a single undecodable stream is treated as empty.
    Permissive,
}

/// Top-level error-handling configuration passed to [`crate::document::Document::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorConfig {
    /// The propagation policy in effect for this document.
    pub mode: ErrorMode,
}

impl ErrorConfig {
    /// Fail on the first structural or recoverable error.
    pub fn strict() -> Self {
        Self { mode: ErrorMode::Strict }
    }

    /// Recover from non-fatal errors and continue extracting.
    pub fn permissive() -> Self {
        Self { mode: ErrorMode::Permissive }
    }

    /// Returns `true` when recoverable errors should be swallowed rather than propagated.
    pub fn is_permissive(&self) -> bool {
        self.mode == ErrorMode::Permissive
    }
}

impl Default for ErrorConfig {
    /// Permissive by default: most real-world PDFs have at least one minor nonconformance, and a
    /// text extractor that refuses to run on them is not useful as a default.
    fn default() -> Self {
        Self::permissive()
    }
}

/// Tunable thresholds for the content-stream interpreter and the resource-exhaustion guards in
/// the xref resolver and stream decompressor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionOptions {
    /// `TJ` horizontal-displacement threshold (in thousandths of a text-space unit) at or below
    /// which a space is inserted between adjacent shown strings. Negative; default -150.0 matches
    /// the PDF producers this was characterized against.
    pub tj_space_threshold: f32,
    /// Maximum object/array/dictionary nesting depth before `NestingTooDeep`.
    pub max_nesting: usize,
    /// Maximum number of `/Prev` hops walked when resolving incremental updates.
    pub max_prev_chain: usize,
    /// Maximum compressed:decompressed ratio allowed for any single filter stage.
    pub max_decompression_ratio: u32,
    /// Maximum decompressed size, in bytes, allowed for any single filter stage.
    pub max_decompressed_size: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            tj_space_threshold: -150.0,
            max_nesting: 100,
            max_prev_chain: 100,
            max_decompression_ratio: 100,
            max_decompressed_size: 100 * 1024 * 1024,
        }
    }
}

impl ExtractionOptions {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the `TJ` space-insertion threshold (builder style).
    pub fn with_tj_space_threshold(mut self, threshold: f32) -> Self {
        self.tj_space_threshold = threshold;
        self
    }

    /// Override the nesting cap (builder style).
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_and_permissive_modes() {
        assert!(!ErrorConfig::strict().is_permissive());
        assert!(ErrorConfig::permissive().is_permissive());
    }

    #[test]
    fn default_extraction_options_match_spec_defaults() {
        let opts = ExtractionOptions::default();
        assert_eq!(opts.tj_space_threshold, -150.0);
        assert_eq!(opts.max_nesting, 100);
        assert_eq!(opts.max_prev_chain, 100);
    }

    #[test]
    fn builder_overrides_threshold() {
        let opts = ExtractionOptions::new().with_tj_space_threshold(-80.0);
        assert_eq!(opts.tj_space_threshold, -80.0);
    }
}
