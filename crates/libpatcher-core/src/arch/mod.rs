//! Architecture detection for patch targets.
//!
//! The binary inspector reports a raw machine identifier; [`classify`] turns
//! it into an [`ArchitectureFamily`]. Only the two ARM families can be
//! patched, represented by [`Arch`].

mod inspect;

pub use inspect::*;

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Marker reported for 64-bit ARM binaries
pub const AARCH64_MARKER: &str = "aarch64";
/// Marker reported for 32-bit ARM binaries
pub const ARM_MARKER: &str = "ARM";
/// Machine names known to be unpatchable
pub const FOREIGN_MARKERS: [&str; 3] = ["x86-64", "Intel", "MIPS"];

/// Classification result for a raw machine identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchitectureFamily {
    Arm64,
    Arm32,
    /// Not patchable. An empty identifier means the file was not recognised
    /// as an executable at all.
    Unsupported(String),
}

impl ArchitectureFamily {
    /// Narrow to a patchable architecture.
    ///
    /// `path` is only used to build the `FileNotExecutable` error.
    pub fn into_supported(self, path: &Path) -> Result<Arch> {
        match self {
            Self::Arm64 => Ok(Arch::Arm64),
            Self::Arm32 => Ok(Arch::Arm32),
            Self::Unsupported(machine) if machine.is_empty() => Err(Error::FileNotExecutable {
                path: path.to_path_buf(),
            }),
            Self::Unsupported(machine) => Err(Error::UnsupportedArchitecture { machine }),
        }
    }

    /// Whether the identifier names one of the well-known non-ARM machines
    pub fn is_known_foreign(&self) -> bool {
        match self {
            Self::Unsupported(machine) => FOREIGN_MARKERS.iter().any(|m| machine.contains(m)),
            _ => false,
        }
    }
}

/// Classify a raw machine identifier.
///
/// `aarch64` wins over `ARM`, since 64-bit identifiers usually carry both.
pub fn classify(raw: &str) -> ArchitectureFamily {
    if raw.contains(AARCH64_MARKER) {
        ArchitectureFamily::Arm64
    } else if raw.contains(ARM_MARKER) {
        ArchitectureFamily::Arm32
    } else {
        ArchitectureFamily::Unsupported(raw.to_string())
    }
}

/// Inspect `path` and resolve it to a patchable architecture.
pub fn resolve_architecture<I: BinaryInspector + ?Sized>(inspector: &I, path: &Path) -> Result<Arch> {
    // Unparseable content means "not executable"; read failures keep their cause
    let machine = match inspector.inspect(path) {
        Ok(info) => info.machine,
        Err(Error::Inspect(detail)) => {
            debug!("Inspector failed for {}: {}", path.display(), detail);
            String::new()
        }
        Err(e) => return Err(e),
    };

    let arch = classify(&machine).into_supported(path)?;
    info!("Detected architecture: {} ({})", arch, machine);
    Ok(arch)
}

/// A patchable instruction set
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Arch {
    #[strum(to_string = "arm64-v8a", serialize = "arm64", serialize = "aarch64")]
    #[serde(rename = "arm64-v8a")]
    Arm64,
    #[strum(to_string = "armeabi-v7a", serialize = "arm32", serialize = "arm")]
    #[serde(rename = "armeabi-v7a")]
    Arm32,
}

impl Arch {
    pub fn abi_name(&self) -> &'static str {
        self.into()
    }

    /// Short family name used in messages ("arm64" / "arm32")
    pub fn family_name(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::Arm32 => "arm32",
        }
    }
}
