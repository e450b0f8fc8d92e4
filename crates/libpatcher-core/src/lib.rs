//! # libpatcher-core
//!
//! Core library for patching ARM executables at known offsets.
//!
//! This crate provides:
//! - Architecture detection (goblin-backed inspector + classifier)
//! - The patch code table (semantic value kind x architecture -> machine code)
//! - Offset list validation and patch requests
//! - The patch engine, with per-offset outcomes and run reports
//! - The interactive patch flow, driven through a [`Prompter`]

pub mod arch;
pub mod engine;
pub mod error;
pub mod flow;
pub mod offset;
pub mod plan;
pub mod report;
pub mod table;
pub mod writer;

#[cfg(test)]
pub mod mock;

pub use arch::{
    Arch, ArchitectureFamily, BinaryFormat, BinaryInspector, MachineInfo, ObjectInspector,
    classify, machine_info, resolve_architecture,
};
pub use engine::{
    PatchContext, PatchEngine, PreviewEntry, PreviewStatus, apply_request, preview_request,
};
pub use error::{Error, Result};
pub use flow::{FlowMode, FlowResult, FlowState, PatchFlow, Prompter};
pub use offset::{
    OffsetEntry, OffsetRequest, format_offset, parse_offsets, validate_offsets,
};
pub use plan::PatchPlan;
pub use report::{PatchFailure, PatchOutcome, PatchReport, PatchStatus};
pub use table::{RequestedKind, SemanticValueKind, code_for, encode_hex, lookup};
pub use writer::{ByteWriter, MemoryWriter, PatchFile};
