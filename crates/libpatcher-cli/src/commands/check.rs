//! Check command implementation.

use anyhow::{Result, bail};
use libpatcher_core::{format_offset, parse_offsets, validate_offsets};

/// Run the check command
pub fn run(offsets: &str) -> Result<()> {
    if !validate_offsets(offsets) {
        bail!(
            "Invalid offsets format: {:?} (e.g. 0x100 or 0x100,0x200)",
            offsets
        );
    }

    let parsed = parse_offsets("offsets", offsets)?;
    if parsed.is_empty() {
        println!("Valid (no offsets)");
        return Ok(());
    }

    println!("Valid ({} offset(s)):", parsed.len());
    for offset in parsed {
        println!("  {} ({})", format_offset(offset), offset);
    }

    Ok(())
}
