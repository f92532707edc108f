//! Stream decoder implementations for PDF filters (§4.4).
//!
//! Supports the five text-relevant filters: FlateDecode, ASCIIHexDecode, ASCII85Decode,
//! LZWDecode, RunLengthDecode. Image-only filters (DCTDecode, CCITTFaxDecode, JBIG2Decode) are
//! out of scope — image extraction is a Non-goal.
//!
//! Decoders can be chained together in a filter pipeline; a `/DecodeParms` predictor, if present,
//! is applied once after the full filter chain runs.

use crate::config::ExtractionOptions;
use crate::error::{Error, Result};

mod ascii85;
mod ascii_hex;
mod flate;
mod lzw;
pub(crate) mod predictor;
mod runlength;

pub use ascii85::Ascii85Decoder;
pub use ascii_hex::AsciiHexDecoder;
pub use flate::FlateDecoder;
pub use lzw::LzwDecoder;
pub use predictor::{DecodeParams, PngPredictor, decode_predictor};
pub use runlength::RunLengthDecoder;

/// Trait for PDF stream decoders. Each decoder implements a single filter algorithm.
pub trait StreamDecoder {
    /// Decode `input`, producing the filter's output bytes.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// The filter's PDF name, e.g. `"FlateDecode"`.
    fn name(&self) -> &str;
}

fn decoder_for(filter_name: &str) -> Result<Box<dyn StreamDecoder>> {
    match filter_name {
        "FlateDecode" => Ok(Box::new(FlateDecoder)),
        "ASCIIHexDecode" => Ok(Box::new(AsciiHexDecoder)),
        "ASCII85Decode" => Ok(Box::new(Ascii85Decoder)),
        "LZWDecode" => Ok(Box::new(LzwDecoder)),
        "RunLengthDecode" => Ok(Box::new(RunLengthDecoder)),
        _ => Err(Error::UnknownFilter(filter_name.to_string())),
    }
}

/// Apply a filter chain with decompression-bomb guards, then an optional predictor.
pub fn decode_stream_with_params(
    data: &[u8],
    filters: &[String],
    params: Option<&DecodeParams>,
    options: &ExtractionOptions,
) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for filter_name in filters {
        let decoder = decoder_for(filter_name)?;
        let compressed_size = current.len();
        current = decoder.decode(&current)?;

        if options.max_decompression_ratio > 0 && compressed_size > 0 {
            let ratio = current.len() as u64 / compressed_size.max(1) as u64;
            if ratio > options.max_decompression_ratio as u64 {
                log::warn!(
                    "{filter_name}: decompression ratio {ratio}:1 exceeds limit {}:1",
                    options.max_decompression_ratio
                );
                return Err(Error::DecompressionFailed(format!(
                    "ratio {ratio}:1 exceeds limit {}:1 ({compressed_size} -> {} bytes)",
                    options.max_decompression_ratio,
                    current.len()
                )));
            }
        }

        if options.max_decompressed_size > 0 && current.len() > options.max_decompressed_size {
            log::warn!(
                "{filter_name}: decompressed size {} exceeds limit {}",
                current.len(),
                options.max_decompressed_size
            );
            return Err(Error::DecompressionFailed(format!(
                "decompressed size {} exceeds limit {}",
                current.len(),
                options.max_decompressed_size
            )));
        }
    }

    if let Some(params) = params {
        if params.predictor != 1 {
            current = decode_predictor(&current, params)?;
        }
    }

    Ok(current)
}
