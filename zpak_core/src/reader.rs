use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Read `path` fully into memory.
///
/// Every transcode is whole-file: the input is always memory-resident before
/// the codec sees it.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    debug!(path = ?path, len = bytes.len(), "read input");
    Ok(bytes)
}
