use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`Codec`](crate::Codec) while transcoding a buffer.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The stream context or its output buffer could not be set up.
    #[error("codec init failed: {0}")]
    InitFailed(String),
    /// The stream terminated with anything other than a clean end-of-stream.
    #[error("codec stream error: {0}")]
    StreamError(String),
    /// Decompressed byte count disagrees with the size stored in the header.
    #[error("decompressed size mismatch: header says {expected} bytes, stream produced {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
}

/// Failures decoding the on-disk container framing.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container truncated: {len} bytes is shorter than the 8-byte size header")]
    Truncated { len: usize },
}

/// Top-level error for a compress or decompress run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("codec failure")]
    CodecFailure(#[from] CodecError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Alias for `Result<T, zpak_core::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
