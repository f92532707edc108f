//! FlateDecode (zlib/deflate) implementation.
//!
//! This is the most common PDF compression filter, used in the vast majority of PDFs.
//! Uses the flate2 crate for zlib decompression.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// FlateDecode filter implementation.
///
/// Decompresses data using the zlib/deflate algorithm.
pub struct FlateDecoder;

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut decoder = ZlibDecoder::new(input);

        match decoder.read_to_end(&mut output) {
            Ok(_) => Ok(output),
            Err(e) => {
                // Partial recovery: some producers truncate the final deflate block but still
                // wrote every text-bearing byte before it.
                if !output.is_empty() {
                    log::warn!(
                        "FlateDecode partial recovery: extracted {} bytes before corruption: {}",
                        output.len(),
                        e
                    );
                    return Ok(output);
                }

                // A minority of producers write a raw deflate stream with no zlib header.
                log::debug!("zlib decode failed ({e}), trying raw deflate");
                output.clear();
                let mut deflate_decoder = DeflateDecoder::new(input);
                match deflate_decoder.read_to_end(&mut output) {
                    Ok(_) => Ok(output),
                    Err(deflate_err) if !output.is_empty() => {
                        log::warn!(
                            "raw deflate partial recovery: extracted {} bytes before corruption",
                            output.len()
                        );
                        let _ = deflate_err;
                        Ok(output)
                    },
                    Err(deflate_err) => Err(Error::DecompressionFailed(format!(
                        "FlateDecode failed: zlib error: {e}, raw deflate error: {deflate_err}"
                    ))),
                }
            },
        }
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}
