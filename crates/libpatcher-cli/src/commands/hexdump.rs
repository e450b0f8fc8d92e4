//! Hexdump command implementation.
//!
//! Displays raw file bytes in traditional hexdump format, useful for
//! checking an offset before and after patching.

use std::path::Path;

use anyhow::{Result, bail};
use libpatcher_core::{ByteWriter, PatchFile};

use super::hex_utils::{format_hex_row, parse_hex_offset};

/// Run the hexdump command
pub fn run(file: &Path, offset: &str, size: usize, ascii: bool) -> Result<()> {
    let offset = parse_hex_offset(offset)?;
    let mut target = PatchFile::open_read_only(file)?;

    if offset >= target.size() {
        bail!(
            "Offset 0x{:X} is beyond end of file (size 0x{:X})",
            offset,
            target.size()
        );
    }
    let size = size.min((target.size() - offset) as usize);
    let bytes = target.read_at(offset, size)?;

    println!("Hexdump of {} at 0x{:X} ({} bytes):", file.display(), offset, size);
    println!();

    for (i, chunk) in bytes.chunks(16).enumerate() {
        println!("{}", format_hex_row(offset + (i * 16) as u64, chunk, ascii));
    }

    Ok(())
}
