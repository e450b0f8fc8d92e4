//! Random-access byte I/O on the patch target.

mod file;
mod memory;

pub use file::PatchFile;
pub use memory::MemoryWriter;

use std::io;

/// Positioned reads and in-place writes over a fixed-size target.
///
/// Writes never grow the target: a range past the end fails with
/// `UnexpectedEof`.
pub trait ByteWriter {
    /// Target size in bytes
    fn size(&self) -> u64;

    fn read_at(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>>;

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()>;

    /// Commit pending writes durably
    fn flush(&mut self) -> io::Result<()>;
}

/// Fail unless `offset..offset + len` lies inside a target of `size` bytes.
pub fn check_range(size: u64, offset: u64, len: usize) -> io::Result<()> {
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= size => Ok(()),
        _ => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "range 0x{:X}+{} is beyond end of file (size 0x{:X})",
                offset, len, size
            ),
        )),
    }
}
