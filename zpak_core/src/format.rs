use std::io::{self, Write};

use crate::error::ContainerError;

/// Fixed size of the container header in bytes: `original_size:u64`.
pub const HEADER_SIZE: usize = 8;

// ── Container ──────────────────────────────────────────────────────────────

/// Decoded view of a container file.
///
/// ```text
/// [original_size: u64 LE][compressed payload ...]
///  0                    8                      end
/// ```
///
/// `original_size` is the exact length of the uncompressed source. Readers
/// trust it to size the decompression buffer once, up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container<'a> {
    pub original_size: u64,
    pub payload: &'a [u8],
}

/// Frame `payload` behind its size header as one contiguous buffer.
pub fn encode(payload: &[u8], original_size: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&original_size.to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Stream the same bytes as [`encode`] into `dst` without building a copy.
pub fn write_to<W: Write>(dst: &mut W, payload: &[u8], original_size: u64) -> io::Result<()> {
    dst.write_all(&original_size.to_le_bytes())?;
    dst.write_all(payload)
}

/// Split a container into its size header and payload.
pub fn decode(bytes: &[u8]) -> Result<Container<'_>, ContainerError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ContainerError::Truncated { len: bytes.len() });
    }
    let (header, payload) = bytes.split_at(HEADER_SIZE);
    let mut size = [0u8; HEADER_SIZE];
    size.copy_from_slice(header);
    Ok(Container {
        original_size: u64::from_le_bytes(size),
        payload,
    })
}
