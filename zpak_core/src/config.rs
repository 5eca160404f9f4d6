use std::fmt;
use std::path::PathBuf;

/// Direction of a transcode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compress => f.write_str("compress"),
            Mode::Decompress => f.write_str("decompress"),
        }
    }
}

/// What to do for one invocation.
///
/// Built once from the command line and passed by reference into the driver;
/// it is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: Mode,
}

impl TranscodeConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            mode,
        }
    }
}
