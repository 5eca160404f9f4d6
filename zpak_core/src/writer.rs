use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::format;

/// All-or-nothing writer for a transcode output file.
///
/// # Write contract
/// Bytes go to a temporary file created next to the destination. Only
/// [`finish`](Writer::finish) moves it over the destination path. If the
/// writer is dropped before that (an error path, a panic), the temporary
/// file is removed and the destination is left exactly as it was.
///
/// Nothing is created at the destination until the whole output exists, so a
/// failed run never leaves a partial or corrupt file behind.
///
/// # Permissions
/// On unix the staged file takes the mode of the file it replaces. A brand
/// new output gets `0o666` minus the process umask, the same as `File::create`.
pub struct Writer {
    tmp: NamedTempFile,
    dest: PathBuf,
    written: u64,
}

impl Writer {
    /// Stage a new output file for `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let dest = path.as_ref().to_path_buf();
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = stage_in(dir, &dest).map_err(|e| Error::io(&dest, e))?;
        debug!(dest = ?dest, tmp = ?tmp.path(), "staging output");
        Ok(Self {
            tmp,
            dest,
            written: 0,
        })
    }

    /// Append raw bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.tmp
            .write_all(data)
            .map_err(|e| Error::io(&self.dest, e))?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Append a framed container: size header then `payload`.
    pub fn write_container(&mut self, payload: &[u8], original_size: u64) -> Result<()> {
        format::write_to(&mut self.tmp, payload, original_size)
            .map_err(|e| Error::io(&self.dest, e))?;
        self.written += (format::HEADER_SIZE + payload.len()) as u64;
        Ok(())
    }

    /// Flush and move the staged file over the destination.
    ///
    /// Returns the number of bytes in the final file.
    pub fn finish(mut self) -> Result<u64> {
        self.tmp.flush().map_err(|e| Error::io(&self.dest, e))?;
        let Writer { tmp, dest, written } = self;
        if let Err(e) = tmp.persist(&dest) {
            warn!(dest = ?dest, error = %e.error, "could not move output into place");
            return Err(Error::io(dest, e.error));
        }
        Ok(written)
    }
}

fn stage_in(dir: &Path, dest: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".zpak-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // open(2) masks this with the umask.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let tmp = builder.tempfile_in(dir)?;
    #[cfg(unix)]
    if let Ok(meta) = std::fs::metadata(dest) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    #[cfg(not(unix))]
    let _ = dest;
    Ok(tmp)
}
