//! Patch engine: write each requested kind's code at its offsets.
//!
//! A run is best effort. A failed offset is recorded and the run moves on;
//! writes already applied are never rolled back. Only opening and flushing
//! the target are fatal.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::arch::{Arch, BinaryInspector, resolve_architecture};
use crate::error::Result;
use crate::offset::{OffsetRequest, format_offset};
use crate::report::{PatchFailure, PatchOutcome, PatchReport, PatchStatus};
use crate::table::{RequestedKind, encode_hex, lookup};
use crate::writer::{ByteWriter, PatchFile};

/// The resolved target of a patch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchContext {
    path: PathBuf,
    arch: Arch,
}

impl PatchContext {
    pub fn new(path: impl Into<PathBuf>, arch: Arch) -> Self {
        Self {
            path: path.into(),
            arch,
        }
    }

    /// Inspect `path` once and fix its architecture for the rest of the run.
    pub fn resolve<I: BinaryInspector + ?Sized>(inspector: &I, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let arch = resolve_architecture(inspector, &path)?;
        Ok(Self { path, arch })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }
}

pub struct PatchEngine<'a> {
    context: &'a PatchContext,
}

impl<'a> PatchEngine<'a> {
    pub fn new(context: &'a PatchContext) -> Self {
        Self { context }
    }

    /// Open the target for writing, apply every requested offset, and flush.
    pub fn apply(&self, request: &OffsetRequest) -> Result<PatchReport> {
        let started = Instant::now();
        info!(
            "Patching {} offset(s) in {} ({})",
            request.offset_count(),
            self.context.path.display(),
            self.context.arch
        );

        let mut target = PatchFile::open(&self.context.path)?;
        let outcomes = apply_request(&mut target, self.context.arch, request);
        target.flush()?;

        let report = PatchReport::new(
            self.context.path.clone(),
            self.context.arch,
            outcomes,
            started.elapsed(),
        );
        info!(
            "Finished setting values: {} applied, {} skipped, {} failed ({:.2}s)",
            report.applied_count(),
            report.skipped_count(),
            report.failed_count(),
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Show what `apply` would change, without writing.
    pub fn preview(&self, request: &OffsetRequest) -> Result<Vec<PreviewEntry>> {
        let mut target = PatchFile::open_read_only(&self.context.path)?;
        Ok(preview_request(&mut target, self.context.arch, request))
    }
}

/// Apply a request to any byte target, one offset at a time in request order.
pub fn apply_request<W: ByteWriter + ?Sized>(
    target: &mut W,
    arch: Arch,
    request: &OffsetRequest,
) -> Vec<PatchOutcome> {
    request
        .targets()
        .map(|(kind, offset)| {
            let status = match apply_offset(target, arch, kind, offset) {
                Ok((previous, written)) => {
                    debug!(
                        "Value of {} has been set at offset {} ({} -> {})",
                        kind,
                        format_offset(offset),
                        encode_hex(&previous),
                        encode_hex(&written)
                    );
                    PatchStatus::Applied { previous, written }
                }
                Err(failure) => {
                    warn!(
                        "Skipping offset {} for {}: {}",
                        format_offset(offset),
                        kind,
                        failure
                    );
                    PatchStatus::Failed(failure)
                }
            };
            PatchOutcome {
                kind: kind.clone(),
                offset,
                status,
            }
        })
        .collect()
}

fn apply_offset<W: ByteWriter + ?Sized>(
    target: &mut W,
    arch: Arch,
    kind: &RequestedKind,
    offset: u64,
) -> std::result::Result<(Vec<u8>, Vec<u8>), PatchFailure> {
    let code = lookup(kind, arch).map_err(|_| PatchFailure::UnknownDataType)?;

    let previous = target.read_at(offset, code.len()).map_err(io_failure)?;
    target.write_at(offset, code).map_err(io_failure)?;

    let actual = target.read_at(offset, code.len()).map_err(io_failure)?;
    if actual != code {
        return Err(PatchFailure::VerifyMismatch {
            expected: code.to_vec(),
            actual,
        });
    }

    Ok((previous, code.to_vec()))
}

fn io_failure(e: std::io::Error) -> PatchFailure {
    PatchFailure::Io {
        message: e.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
    Pending { current: Vec<u8>, replacement: Vec<u8> },
    AlreadyApplied { bytes: Vec<u8> },
    Failed(PatchFailure),
}

/// What patching one offset would do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub kind: RequestedKind,
    pub offset: u64,
    pub status: PreviewStatus,
}

/// Read the current bytes at each requested offset and compare them with
/// the code that would be written.
pub fn preview_request<W: ByteWriter + ?Sized>(
    target: &mut W,
    arch: Arch,
    request: &OffsetRequest,
) -> Vec<PreviewEntry> {
    request
        .targets()
        .map(|(kind, offset)| {
            let status = match lookup(kind, arch) {
                Err(_) => PreviewStatus::Failed(PatchFailure::UnknownDataType),
                Ok(code) => match target.read_at(offset, code.len()) {
                    Ok(current) if current == code => PreviewStatus::AlreadyApplied { bytes: current },
                    Ok(current) => PreviewStatus::Pending {
                        current,
                        replacement: code.to_vec(),
                    },
                    Err(e) => PreviewStatus::Failed(io_failure(e)),
                },
            };
            PreviewEntry {
                kind: kind.clone(),
                offset,
                status,
            }
        })
        .collect()
}
