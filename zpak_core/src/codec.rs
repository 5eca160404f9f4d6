use crate::error::CodecError;

/// Core compression abstraction used by the transcode driver.
///
/// Each `Codec` implementation:
/// - Transcodes a whole in-memory buffer per call. There is no incremental
///   feeding; the full input is always available up front.
/// - Is atomic from the caller's point of view: it returns either a complete,
///   valid buffer or an error, never a truncated buffer as success.
/// - Holds no state across calls. Any stream context lives for one call only.
pub trait Codec {
    /// Human-readable codec name for CLI display.
    fn name(&self) -> &'static str;

    /// Compress `raw` into a payload without any container framing.
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Decompress `compressed` into a buffer of exactly `expected_size` bytes.
    ///
    /// Implementations must fail with [`CodecError::SizeMismatch`] rather
    /// than return a buffer of any other length.
    fn decompress(&self, compressed: &[u8], expected_size: u64) -> Result<Vec<u8>, CodecError>;
}
