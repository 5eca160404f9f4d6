pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod reader;
pub mod transcode;
pub mod writer;

pub use codec::Codec;
pub use config::{Mode, TranscodeConfig};
pub use error::{CodecError, ContainerError, Error, Result};
pub use format::{Container, HEADER_SIZE};
pub use transcode::{run, run_compress, run_decompress, CompressionStats, DecompressionStats, Report};
pub use writer::Writer;
