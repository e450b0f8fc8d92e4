use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ByteWriter, check_range};
use crate::error::{Error, Result};

/// A binary on disk, patched in place
#[derive(Debug)]
pub struct PatchFile {
    file: File,
    path: PathBuf,
    size: u64,
}

impl PatchFile {
    /// Open for in-place writing. Never creates or truncates.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        Self::open_with(path.as_ref(), &options)
    }

    /// Open for reading only; writes fail with the OS error.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true);
        Self::open_with(path.as_ref(), &options)
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Result<Self> {
        let open_error = |source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = options.open(path).map_err(open_error)?;
        let size = file.metadata().map_err(open_error)?.len();
        debug!("Opened {} ({} bytes)", path.display(), size);

        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteWriter for PatchFile {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        check_range(self.size, offset, len)?;
        let mut buffer = vec![0u8; len];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        check_range(self.size, offset, bytes.len())?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()
    }
}
