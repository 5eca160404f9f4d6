use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use tracing::{debug, trace};

use zpak_core::{Codec, CodecError};

/// Default size of the scratch output chunk drained per loop iteration.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Highest zlib compression level.
pub const BEST_LEVEL: u32 = 9;

/// Streaming zlib/DEFLATE codec.
///
/// Both directions run the same loop over a `flate2` stream: the whole input
/// is attached up front, and output is drained through a fixed-size scratch
/// chunk until the stream reports its end. The number of new bytes per step
/// is the delta of the stream's `total_out` counter.
///
/// The chunk size only changes how many iterations the loop takes. Any
/// positive value produces byte-identical output.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    level: Compression,
    chunk_size: usize,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new(BEST_LEVEL)
    }
}

impl DeflateCodec {
    /// Codec at `level` (0 = store, 9 = smallest), with the default chunk size.
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(BEST_LEVEL)),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Replace the scratch chunk size. Zero is rejected.
    pub fn with_chunk_size(self, chunk_size: usize) -> Result<Self, CodecError> {
        if chunk_size == 0 {
            return Err(CodecError::InitFailed("chunk size must be positive".into()));
        }
        Ok(Self { chunk_size, ..self })
    }

    pub fn level(&self) -> u32 {
        self.level.level()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Codec for DeflateCodec {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut stream = Compress::new(self.level, true);
        let mut out = Vec::new();
        let steps = drain(&mut stream, raw, self.chunk_size, &mut out, None)?;
        debug!(
            raw = raw.len(),
            compressed = out.len(),
            level = self.level(),
            steps,
            "deflate compress"
        );
        Ok(out)
    }

    fn decompress(&self, compressed: &[u8], expected_size: u64) -> Result<Vec<u8>, CodecError> {
        let capacity = usize::try_from(expected_size).map_err(|_| {
            CodecError::InitFailed(format!("{expected_size} bytes does not fit in memory"))
        })?;
        let mut out = Vec::new();
        out.try_reserve_exact(capacity).map_err(|e| {
            CodecError::InitFailed(format!("cannot allocate {expected_size} byte output: {e}"))
        })?;

        let mut stream = Decompress::new(true);
        let steps = drain(&mut stream, compressed, self.chunk_size, &mut out, Some(expected_size))?;
        if out.len() as u64 != expected_size {
            return Err(CodecError::SizeMismatch {
                expected: expected_size,
                actual: out.len() as u64,
            });
        }
        debug!(compressed = compressed.len(), raw = out.len(), steps, "deflate decompress");
        Ok(out)
    }
}

// ── Stream loop ────────────────────────────────────────────────────────────

/// One direction of a `flate2` stream, as seen by [`drain`].
trait Stream {
    fn step(&mut self, input: &[u8], chunk: &mut [u8]) -> Result<Status, String>;
    fn total_in(&self) -> u64;
    fn total_out(&self) -> u64;
}

impl Stream for Compress {
    fn step(&mut self, input: &[u8], chunk: &mut [u8]) -> Result<Status, String> {
        // All input is present, so every step asks the encoder to finish.
        self.compress(input, chunk, FlushCompress::Finish)
            .map_err(|e| e.to_string())
    }

    fn total_in(&self) -> u64 {
        Compress::total_in(self)
    }

    fn total_out(&self) -> u64 {
        Compress::total_out(self)
    }
}

impl Stream for Decompress {
    fn step(&mut self, input: &[u8], chunk: &mut [u8]) -> Result<Status, String> {
        self.decompress(input, chunk, FlushDecompress::None)
            .map_err(|e| e.to_string())
    }

    fn total_in(&self) -> u64 {
        Decompress::total_in(self)
    }

    fn total_out(&self) -> u64 {
        Decompress::total_out(self)
    }
}

/// Feed `input` through `stream`, appending its output to `out` one chunk at
/// a time until the stream ends.
///
/// With `limit` set, fails as soon as `out` would grow past it. Returns the
/// number of steps taken. The loop always runs at least once so an empty
/// input still gets the codec's header and trailer.
fn drain<S: Stream>(
    stream: &mut S,
    input: &[u8],
    chunk_size: usize,
    out: &mut Vec<u8>,
    limit: Option<u64>,
) -> Result<u64, CodecError> {
    let mut chunk = vec![0u8; chunk_size];
    let mut steps = 0u64;

    loop {
        let in_before = stream.total_in();
        let out_before = stream.total_out();
        let consumed = (in_before as usize).min(input.len());

        let status = stream
            .step(&input[consumed..], &mut chunk)
            .map_err(CodecError::StreamError)?;
        steps += 1;

        let produced = (stream.total_out() - out_before) as usize;
        let progressed = produced > 0 || stream.total_in() > in_before;

        if let Some(limit) = limit {
            let total = (out.len() + produced) as u64;
            if total > limit {
                return Err(CodecError::SizeMismatch {
                    expected: limit,
                    actual: total,
                });
            }
        }
        out.extend_from_slice(&chunk[..produced]);
        trace!(step = steps, produced, total = out.len(), ?status, "drained chunk");

        match status {
            Status::StreamEnd => return Ok(steps),
            Status::Ok | Status::BufError if progressed => continue,
            Status::Ok | Status::BufError => {
                return Err(CodecError::StreamError(format!(
                    "stream stalled after {} input bytes without reaching its end",
                    stream.total_in()
                )))
            }
        }
    }
}
