//! Patch code table.
//!
//! Every semantic value kind has one fixed machine-code fragment per
//! architecture. The fragments load the value into the return register and
//! return, and are written verbatim over the start of a function.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::arch::Arch;
use crate::error::{Error, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SemanticValueKind {
    BooleanTrue,
    BooleanFalse,
    IntegerZero,
    #[strum(serialize = "integer16_max")]
    #[serde(rename = "integer16_max")]
    Integer16Max,
    #[strum(serialize = "integer32_max")]
    #[serde(rename = "integer32_max")]
    Integer32Max,
    LongZero,
    #[strum(serialize = "long_64")]
    #[serde(rename = "long_64")]
    Long64,
    FloatZero,
    DoubleZero,
    VoidNop,
}

impl SemanticValueKind {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// All kinds in prompt order
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Human readable effect of the patch
    pub fn describe(&self) -> &'static str {
        match self {
            Self::BooleanTrue => "return true",
            Self::BooleanFalse => "return false",
            Self::IntegerZero => "return 0 (int)",
            Self::Integer16Max => "return 32767 (int16 max)",
            Self::Integer32Max => "return 2147483647 (int32 max)",
            Self::LongZero => "return 0 (long)",
            Self::Long64 => "return a large 64-bit value",
            Self::FloatZero => "return 0.0 (float)",
            Self::DoubleZero => "return 0.0 (double)",
            Self::VoidNop => "return immediately",
        }
    }
}

mod arm64 {
    pub const RET_TRUE: &[u8] = &[0x20, 0x00, 0x80, 0x52, 0xC0, 0x03, 0x5F, 0xD6];
    pub const RET_ZERO: &[u8] = &[0x00, 0x00, 0x80, 0x52, 0xC0, 0x03, 0x5F, 0xD6];
    pub const RET_I16_MAX: &[u8] = &[0xE0, 0xFF, 0x8F, 0x52, 0xC0, 0x03, 0x5F, 0xD6];
    pub const RET_I32_MAX: &[u8] = &[
        0xE0, 0xFF, 0x9F, 0x52, 0xE0, 0xFF, 0xAF, 0x72, 0xC0, 0x03, 0x5F, 0xD6,
    ];
    pub const RET_LONG_64: &[u8] = &[
        0xE0, 0xFF, 0x9F, 0xD2, 0xE0, 0xFF, 0xBF, 0xF2, 0xE0, 0x0F, 0xC0, 0xF2, 0xC0, 0x03, 0x5F,
        0xD6,
    ];
    pub const RET_FLOAT_ZERO: &[u8] = &[0xE0, 0x03, 0x27, 0x1E, 0xC0, 0x03, 0x5F, 0xD6];
    pub const RET_DOUBLE_ZERO: &[u8] = &[0xE0, 0x03, 0x67, 0x9E, 0xC0, 0x03, 0x5F, 0xD6];
    pub const RET: &[u8] = &[0xC0, 0x03, 0x5F, 0xD6];
}

mod arm32 {
    pub const RET_TRUE: &[u8] = &[0x01, 0x00, 0xA0, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1];
    pub const RET_ZERO: &[u8] = &[0x00, 0x00, 0xA0, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1];
    pub const RET_I16_MAX: &[u8] = &[0xFF, 0x0F, 0x07, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1];
    pub const RET_I32_MAX: &[u8] = &[
        0xFF, 0x0F, 0x0F, 0xE3, 0xFF, 0x0F, 0x47, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1,
    ];
    pub const RET_LONG_64: &[u8] = &[0x02, 0x01, 0xE0, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1];
    // Six bytes: ends mid-instruction, reproduced as published
    pub const RET: &[u8] = &[0xA0, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1];
}

/// Machine code for `kind` on `arch`.
///
/// boolean_false, integer_zero and long_zero share one encoding, and on
/// 32-bit ARM so do float_zero and double_zero.
pub fn code_for(kind: SemanticValueKind, arch: Arch) -> &'static [u8] {
    use SemanticValueKind::*;

    match arch {
        Arch::Arm64 => match kind {
            BooleanTrue => arm64::RET_TRUE,
            BooleanFalse | IntegerZero | LongZero => arm64::RET_ZERO,
            Integer16Max => arm64::RET_I16_MAX,
            Integer32Max => arm64::RET_I32_MAX,
            Long64 => arm64::RET_LONG_64,
            FloatZero => arm64::RET_FLOAT_ZERO,
            DoubleZero => arm64::RET_DOUBLE_ZERO,
            VoidNop => arm64::RET,
        },
        Arch::Arm32 => match kind {
            BooleanTrue => arm32::RET_TRUE,
            BooleanFalse | IntegerZero | LongZero | FloatZero | DoubleZero => arm32::RET_ZERO,
            Integer16Max => arm32::RET_I16_MAX,
            Integer32Max => arm32::RET_I32_MAX,
            Long64 => arm32::RET_LONG_64,
            VoidNop => arm32::RET,
        },
    }
}

/// A kind named by the caller, which may not exist in the table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestedKind {
    Known(SemanticValueKind),
    Unknown(String),
}

impl RequestedKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Known(kind) => kind.name(),
            Self::Unknown(name) => name,
        }
    }
}

impl From<SemanticValueKind> for RequestedKind {
    fn from(kind: SemanticValueKind) -> Self {
        Self::Known(kind)
    }
}

impl From<&str> for RequestedKind {
    fn from(name: &str) -> Self {
        match SemanticValueKind::from_str(name.trim()) {
            Ok(kind) => Self::Known(kind),
            Err(_) => Self::Unknown(name.trim().to_string()),
        }
    }
}

impl fmt::Display for RequestedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for RequestedKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Look up the code for a caller-named kind.
pub fn lookup(kind: &RequestedKind, arch: Arch) -> Result<&'static [u8]> {
    match kind {
        RequestedKind::Known(kind) => Ok(code_for(*kind, arch)),
        RequestedKind::Unknown(name) => Err(Error::UnknownDataType(name.clone())),
    }
}

/// Format bytes as contiguous uppercase hex (e.g. "C0035FD6")
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
