//! Arch command implementation.

use std::path::Path;

use anyhow::Result;
use libpatcher_core::{BinaryInspector, ObjectInspector, classify};

/// Run the arch command
pub fn run(file: &Path) -> Result<()> {
    let info = ObjectInspector.inspect(file)?;
    let family = classify(&info.machine);

    println!("File:    {}", file.display());
    println!("Format:  {}", info.format);
    println!("Machine: {}", info.machine);

    let known_foreign = family.is_known_foreign();
    match family.into_supported(file) {
        Ok(arch) => println!("Patches: {} ({})", arch.family_name(), arch),
        Err(e) => {
            println!("Patches: not available ({})", e);
            if !known_foreign {
                println!("(unrecognized machine, only ARM targets can be patched)");
            }
        }
    }

    Ok(())
}
