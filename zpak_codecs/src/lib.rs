mod deflate_codec;

pub use deflate_codec::{DeflateCodec, BEST_LEVEL, DEFAULT_CHUNK_SIZE};
