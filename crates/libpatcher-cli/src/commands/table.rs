//! Table command implementation.

use anyhow::Result;
use libpatcher_core::{Arch, SemanticValueKind, code_for, encode_hex};
use strum::IntoEnumIterator;

/// Run the table command
pub fn run(arch: Option<Arch>) -> Result<()> {
    for arch in Arch::iter().filter(|a| arch.is_none_or(|only| only == *a)) {
        println!("=== {} ({}) ===", arch, arch.family_name());
        for kind in SemanticValueKind::all() {
            println!(
                "  {:<14} {:<32} {}",
                kind.name(),
                encode_hex(code_for(kind, arch)),
                kind.describe()
            );
        }
        println!();
    }

    Ok(())
}
