//! Compression codec layer
//!
//! The firmware decoder reconstructs LZMA1 state from build-time
//! constants, so the encoder here is pinned to one configuration:
//! "alone" framing, 16 KiB dictionary, preset 6, 13-byte variable
//! header stripped before storage. A `DontCompress` mode frames raw
//! bytes so a single runtime decoder path handles both forms.

use super::constants::{LZMA_ALONE_HEADER_LEN, LZMA_DICT_SIZE, LZMA_PRESET};
use crate::exceptions::{Result, RomPackError};
use std::io::Write;
use xz2::stream::{LzmaOptions, Stream};
use xz2::write::XzEncoder;

/// Registered compression method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Lzma,
}

impl CompressionMethod {
    /// Parse a method name as given on the command line, with or
    /// without a leading dot. Unknown names are fatal configuration.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim_start_matches('.') {
            "lzma" => Ok(CompressionMethod::Lzma),
            other => Err(RomPackError::Config(format!(
                "Unknown compression method: \"{other}\""
            ))),
        }
    }

    /// File suffix appended to compressed counterpart files.
    pub fn suffix(&self) -> &'static str {
        match self {
            CompressionMethod::Lzma => ".lzma",
        }
    }
}

/// Encoding mode for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal compression
    Default,
    /// Frame the input for the runtime decoder without compressing it
    DontCompress,
}

/// Compress one segment with the given method and mode.
pub fn compress(method: CompressionMethod, data: &[u8], mode: Mode) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::Lzma => compress_lzma(data, mode),
    }
}

/// LZMA1 "alone" encoding with the firmware's fixed parameters. For
/// `DontCompress` the raw bytes already are the framed form: the
/// runtime maps such a segment directly at its bank offset.
fn compress_lzma(data: &[u8], mode: Mode) -> Result<Vec<u8>> {
    if mode == Mode::DontCompress {
        return Ok(data.to_vec());
    }

    let mut options = LzmaOptions::new_preset(LZMA_PRESET)
        .map_err(|e| RomPackError::Codec(format!("lzma preset {LZMA_PRESET}: {e}")))?;
    options.dict_size(LZMA_DICT_SIZE);

    let stream = Stream::new_lzma_encoder(&options)
        .map_err(|e| RomPackError::Codec(format!("lzma encoder init: {e}")))?;

    let mut encoder = XzEncoder::new_stream(Vec::new(), stream);
    encoder
        .write_all(data)
        .map_err(|e| RomPackError::Codec(format!("lzma encode: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| RomPackError::Codec(format!("lzma finalize: {e}")))?;

    if compressed.len() < LZMA_ALONE_HEADER_LEN {
        return Err(RomPackError::Codec(format!(
            "lzma stream shorter than its header: {} bytes",
            compressed.len()
        )));
    }

    Ok(compressed[LZMA_ALONE_HEADER_LEN..].to_vec())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_names() {
        assert_eq!(
            CompressionMethod::parse("lzma").unwrap(),
            CompressionMethod::Lzma
        );
        assert_eq!(
            CompressionMethod::parse(".lzma").unwrap(),
            CompressionMethod::Lzma
        );
    }

    #[test]
    fn test_parse_unknown_method_is_config_error() {
        let err = CompressionMethod::parse("zip").unwrap_err();
        assert!(matches!(err, RomPackError::Config(_)));
        assert!(err.to_string().contains("zip"));
    }

    #[test]
    fn test_lzma_round_trip() {
        let data: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = compress(CompressionMethod::Lzma, &data, Mode::Default).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(testutil::decompress_stripped(&compressed), data);
    }

    #[test]
    fn test_dont_compress_is_identity() {
        let data = b"bank zero stays mapped in place".to_vec();
        let framed = compress(CompressionMethod::Lzma, &data, Mode::DontCompress).unwrap();
        assert_eq!(framed, data);
    }

    #[test]
    fn test_empty_input_compresses() {
        let compressed = compress(CompressionMethod::Lzma, &[], Mode::Default).unwrap();
        assert_eq!(testutil::decompress_stripped(&compressed), Vec::<u8>::new());
    }
}
