use std::path::Path;

use tracing::{debug, info, warn};

use crate::codec::Codec;
use crate::config::{Mode, TranscodeConfig};
use crate::error::{CodecError, Error, Result};
use crate::format;
use crate::reader::read_all;
use crate::writer::Writer;

// ── Reports ────────────────────────────────────────────────────────────────

/// Sizes observed by a compress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    /// Bytes in the source file.
    pub original_size: u64,
    /// Bytes of compressed payload, excluding the size header.
    pub compressed_size: u64,
}

impl CompressionStats {
    /// Compressed size as a percentage of the original (`compressed / original * 100`).
    ///
    /// An empty original reports `0.0`.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.compressed_size as f64 * 100.0 / self.original_size as f64
    }
}

/// Sizes observed by a decompress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressionStats {
    /// Bytes of compressed payload read, excluding the size header.
    pub compressed_size: u64,
    /// Bytes written to the output, always equal to the header's size.
    pub original_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Report {
    Compressed(CompressionStats),
    Decompressed(DecompressionStats),
}

// ── Driver ─────────────────────────────────────────────────────────────────

/// Run the transcode described by `config`.
pub fn run(config: &TranscodeConfig, codec: &dyn Codec) -> Result<Report> {
    match config.mode {
        Mode::Compress => run_compress(&config.input, &config.output, codec).map(Report::Compressed),
        Mode::Decompress => {
            run_decompress(&config.input, &config.output, codec).map(Report::Decompressed)
        }
    }
}

/// Compress `input` into a container at `output`.
///
/// The output is staged and only moved into place after compression and the
/// full write succeed. A codec failure leaves `output` untouched.
pub fn run_compress(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    codec: &dyn Codec,
) -> Result<CompressionStats> {
    let raw = read_all(input)?;
    let original_size = raw.len() as u64;

    let payload = codec.compress(&raw).map_err(|e| {
        warn!(codec = codec.name(), error = %e, "compression failed");
        Error::CodecFailure(e)
    })?;
    debug!(original_size, compressed_size = payload.len(), "compressed");

    let mut writer = Writer::create(&output)?;
    writer.write_container(&payload, original_size)?;
    let written = writer.finish()?;

    let stats = CompressionStats {
        original_size,
        compressed_size: payload.len() as u64,
    };
    info!(
        output = ?output.as_ref(),
        original_size,
        compressed_size = stats.compressed_size,
        ratio = stats.ratio(),
        bytes_written = written,
        "compress done"
    );
    Ok(stats)
}

/// Decompress the container at `input` into `output`.
///
/// Fails with [`Error::Container`] if the header is missing and with
/// [`Error::CodecFailure`] if the stream is corrupt or yields a byte count
/// other than the header's `original_size`.
pub fn run_decompress(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    codec: &dyn Codec,
) -> Result<DecompressionStats> {
    let bytes = read_all(input)?;
    let container = format::decode(&bytes)?;
    debug!(
        original_size = container.original_size,
        payload = container.payload.len(),
        "decoded container header"
    );

    let raw = codec
        .decompress(container.payload, container.original_size)
        .map_err(|e| {
            warn!(codec = codec.name(), error = %e, "decompression failed");
            Error::CodecFailure(e)
        })?;
    if raw.len() as u64 != container.original_size {
        return Err(Error::CodecFailure(CodecError::SizeMismatch {
            expected: container.original_size,
            actual: raw.len() as u64,
        }));
    }

    let mut writer = Writer::create(&output)?;
    writer.write(&raw)?;
    let written = writer.finish()?;

    let stats = DecompressionStats {
        compressed_size: container.payload.len() as u64,
        original_size: raw.len() as u64,
    };
    info!(
        output = ?output.as_ref(),
        original_size = stats.original_size,
        bytes_written = written,
        "decompress done"
    );
    Ok(stats)
}
