//! Per-offset outcomes and the run report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use tracing::info;

use crate::arch::Arch;
use crate::error::Result;
use crate::offset::format_offset;
use crate::table::{RequestedKind, encode_hex};

fn as_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode_hex(bytes))
}

fn as_offset<S: Serializer>(offset: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_offset(*offset))
}

fn as_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Why a single offset was not patched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PatchFailure {
    /// The kind has no entry in the code table; the offset was skipped
    UnknownDataType,
    /// Reading or writing the target failed
    Io { message: String },
    /// The bytes read back differ from the bytes written
    VerifyMismatch {
        #[serde(serialize_with = "as_hex")]
        expected: Vec<u8>,
        #[serde(serialize_with = "as_hex")]
        actual: Vec<u8>,
    },
}

impl std::fmt::Display for PatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDataType => f.write_str("invalid data type"),
            Self::Io { message } => write!(f, "I/O error: {}", message),
            Self::VerifyMismatch { expected, actual } => write!(
                f,
                "verification failed: expected {}, read back {}",
                encode_hex(expected),
                encode_hex(actual)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatchStatus {
    Applied {
        #[serde(serialize_with = "as_hex")]
        previous: Vec<u8>,
        #[serde(serialize_with = "as_hex")]
        written: Vec<u8>,
    },
    Failed(PatchFailure),
}

/// Outcome for one `(kind, offset)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOutcome {
    pub kind: RequestedKind,
    #[serde(serialize_with = "as_offset")]
    pub offset: u64,
    #[serde(flatten)]
    pub status: PatchStatus,
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, PatchStatus::Applied { .. })
    }

    pub fn failure(&self) -> Option<&PatchFailure> {
        match &self.status {
            PatchStatus::Failed(failure) => Some(failure),
            PatchStatus::Applied { .. } => None,
        }
    }

    /// True when the offset already held the written bytes
    pub fn was_unchanged(&self) -> bool {
        matches!(&self.status, PatchStatus::Applied { previous, written } if previous == written)
    }
}

/// Result of one patch run
#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub path: PathBuf,
    pub arch: Arch,
    pub outcomes: Vec<PatchOutcome>,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub finished_at: DateTime<Local>,
}

impl PatchReport {
    pub fn new(path: PathBuf, arch: Arch, outcomes: Vec<PatchOutcome>, elapsed: Duration) -> Self {
        Self {
            path,
            arch,
            outcomes,
            elapsed,
            finished_at: Local::now(),
        }
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    /// Offsets skipped because their kind is not in the table
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.failure() == Some(&PatchFailure::UnknownDataType))
            .count()
    }

    /// Offsets that failed for any other reason
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.applied_count() - self.skipped_count()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(PatchOutcome::is_applied)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(&path, self.to_json()?)?;
        info!("Saved patch report to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SemanticValueKind;

    fn sample_report() -> PatchReport {
        let outcomes = vec![
            PatchOutcome {
                kind: SemanticValueKind::VoidNop.into(),
                offset: 0x100,
                status: PatchStatus::Applied {
                    previous: vec![0xFD, 0x7B, 0xBF, 0xA9],
                    written: vec![0xC0, 0x03, 0x5F, 0xD6],
                },
            },
            PatchOutcome {
                kind: RequestedKind::from("short_max"),
                offset: 0x200,
                status: PatchStatus::Failed(PatchFailure::UnknownDataType),
            },
            PatchOutcome {
                kind: SemanticValueKind::VoidNop.into(),
                offset: 0x9000,
                status: PatchStatus::Failed(PatchFailure::Io {
                    message: "beyond end of file".to_string(),
                }),
            },
        ];
        PatchReport::new(
            PathBuf::from("libgame.so"),
            Arch::Arm64,
            outcomes,
            Duration::from_millis(12),
        )
    }

    #[test]
    fn test_report_counts() {
        let report = sample_report();
        assert_eq!(report.applied_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_report_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&sample_report().to_json().unwrap()).unwrap();
        assert_eq!(json["arch"], "arm64-v8a");
        assert_eq!(json["outcomes"][0]["kind"], "void_nop");
        assert_eq!(json["outcomes"][0]["offset"], "0x100");
        assert_eq!(json["outcomes"][0]["status"], "applied");
        assert_eq!(json["outcomes"][0]["written"], "C0035FD6");
        assert_eq!(json["outcomes"][1]["status"], "failed");
        assert_eq!(json["outcomes"][1]["reason"], "unknown_data_type");
        assert_eq!(json["outcomes"][2]["reason"], "io");
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(PatchFailure::UnknownDataType.to_string(), "invalid data type");
        let mismatch = PatchFailure::VerifyMismatch {
            expected: vec![0xC0, 0x03],
            actual: vec![0x00, 0x00],
        };
        assert_eq!(
            mismatch.to_string(),
            "verification failed: expected C003, read back 0000"
        );
    }

    #[test]
    fn test_was_unchanged() {
        let outcome = PatchOutcome {
            kind: SemanticValueKind::VoidNop.into(),
            offset: 0,
            status: PatchStatus::Applied {
                previous: vec![0xC0, 0x03, 0x5F, 0xD6],
                written: vec![0xC0, 0x03, 0x5F, 0xD6],
            },
        };
        assert!(outcome.was_unchanged());
    }
}
