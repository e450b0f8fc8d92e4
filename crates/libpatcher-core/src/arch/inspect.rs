//! Binary inspection: read a container header and report its machine.

use std::fs;
use std::path::Path;

use goblin::Object;
use goblin::elf::header as elf;
use goblin::mach::Mach;
use goblin::mach::constants::cputype;
use goblin::pe::header as pe;
use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::error::{Error, Result};

/// Machine identifiers, in the vocabulary used by common disassemblers
pub mod machine {
    pub const AARCH64: &str = "ARM aarch64";
    pub const ARM: &str = "ARM";
    pub const X86_64: &str = "AMD x86-64";
    pub const X86: &str = "Intel 80386";
    pub const MIPS: &str = "MIPS R3000";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum BinaryFormat {
    #[strum(serialize = "ELF")]
    Elf,
    #[strum(serialize = "PE")]
    Pe,
    #[strum(serialize = "Mach-O")]
    MachO,
}

/// What the inspector learned about a binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineInfo {
    pub machine: String,
    pub format: BinaryFormat,
}

/// Reports the machine identifier of an executable
pub trait BinaryInspector {
    fn inspect(&self, path: &Path) -> Result<MachineInfo>;
}

/// Inspector backed by goblin (ELF, PE and Mach-O)
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectInspector;

impl BinaryInspector for ObjectInspector {
    fn inspect(&self, path: &Path) -> Result<MachineInfo> {
        let bytes = fs::read(path)?;
        let info = machine_info(&bytes)?;
        debug!(
            "Inspected {}: {} ({})",
            path.display(),
            info.machine,
            info.format
        );
        Ok(info)
    }
}

/// Parse container bytes and report the machine identifier
pub fn machine_info(bytes: &[u8]) -> Result<MachineInfo> {
    let object = Object::parse(bytes).map_err(|e| Error::Inspect(e.to_string()))?;

    match object {
        Object::Elf(binary) => Ok(MachineInfo {
            machine: elf_machine_name(binary.header.e_machine),
            format: BinaryFormat::Elf,
        }),
        Object::PE(binary) => Ok(MachineInfo {
            machine: pe_machine_name(binary.header.coff_header.machine),
            format: BinaryFormat::Pe,
        }),
        Object::Mach(Mach::Binary(binary)) => Ok(MachineInfo {
            machine: macho_machine_name(binary.header.cputype),
            format: BinaryFormat::MachO,
        }),
        Object::Mach(Mach::Fat(multi)) => {
            // Fat binaries: report the first slice
            let first = multi
                .iter_arches()
                .next()
                .ok_or_else(|| Error::Inspect("empty fat binary".to_string()))?
                .map_err(|e| Error::Inspect(e.to_string()))?;
            Ok(MachineInfo {
                machine: macho_machine_name(first.cputype),
                format: BinaryFormat::MachO,
            })
        }
        _ => Err(Error::Inspect("unrecognized container format".to_string())),
    }
}

fn elf_machine_name(e_machine: u16) -> String {
    match e_machine {
        elf::EM_AARCH64 => machine::AARCH64.to_string(),
        elf::EM_ARM => machine::ARM.to_string(),
        elf::EM_X86_64 => machine::X86_64.to_string(),
        elf::EM_386 => machine::X86.to_string(),
        elf::EM_MIPS => machine::MIPS.to_string(),
        other => elf::machine_to_str(other).to_string(),
    }
}

fn pe_machine_name(coff_machine: u16) -> String {
    match coff_machine {
        pe::COFF_MACHINE_ARM64 => machine::AARCH64.to_string(),
        pe::COFF_MACHINE_ARM | pe::COFF_MACHINE_ARMNT | pe::COFF_MACHINE_THUMB => {
            machine::ARM.to_string()
        }
        pe::COFF_MACHINE_X86_64 => machine::X86_64.to_string(),
        pe::COFF_MACHINE_X86 => machine::X86.to_string(),
        other => format!("COFF machine 0x{:X}", other),
    }
}

fn macho_machine_name(cpu: u32) -> String {
    match cpu {
        cputype::CPU_TYPE_ARM64 => machine::AARCH64.to_string(),
        cputype::CPU_TYPE_ARM => machine::ARM.to_string(),
        cputype::CPU_TYPE_X86_64 => machine::X86_64.to_string(),
        cputype::CPU_TYPE_X86 => machine::X86.to_string(),
        other => format!("Mach-O cputype 0x{:X}", other),
    }
}
