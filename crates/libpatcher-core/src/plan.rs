//! Patch plan files.
//!
//! A plan lets a patch run skip the prompts:
//!
//! ```toml
//! file = "lib/arm64-v8a/libgame.so"
//!
//! [offsets]
//! boolean_true = "0x1A2B0, 0x1A7F4"
//! void_nop = "0x2C000"
//! ```
//!
//! A relative `file` is resolved against the plan's directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::offset::OffsetRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPlan {
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Kind name -> offset list, in the prompt's grammar
    #[serde(default)]
    pub offsets: BTreeMap<String, String>,
}

impl PatchPlan {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut plan = Self::parse(&content)?;

        if let Some(file) = plan.file.as_mut()
            && file.is_relative()
            && let Some(dir) = path.parent()
        {
            *file = dir.join(&*file);
        }

        debug!(
            "Loaded plan {} ({} kinds)",
            path.display(),
            plan.offsets.len()
        );
        Ok(plan)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate every list and build the request
    pub fn to_request(&self) -> Result<OffsetRequest> {
        OffsetRequest::from_raw(&self.offsets)
    }
}
