use serde::Serialize;

use super::validator::parse_offsets;
use crate::error::Result;
use crate::table::RequestedKind;

/// Offsets requested for one kind, in the order given
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetEntry {
    pub kind: RequestedKind,
    pub offsets: Vec<u64>,
}

/// Where each kind's code should be written.
///
/// Entries keep insertion order. Offsets are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OffsetRequest {
    entries: Vec<OffsetEntry>,
}

impl OffsetRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(kind name, offset list)` pairs.
    ///
    /// Entries are ordered by the table's kind order, unrecognised names last.
    pub fn from_raw<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::new();
        for (kind, raw) in pairs {
            request.add_raw(kind.as_ref(), raw.as_ref())?;
        }
        request.entries.sort_by(|a, b| a.kind.cmp(&b.kind));
        Ok(request)
    }

    /// Append offsets for a kind, merging with an earlier entry of the same kind.
    pub fn push(&mut self, kind: impl Into<RequestedKind>, offsets: Vec<u64>) {
        let kind = kind.into();
        match self.entries.iter_mut().find(|entry| entry.kind == kind) {
            Some(entry) => entry.offsets.extend(offsets),
            None => self.entries.push(OffsetEntry { kind, offsets }),
        }
    }

    /// Validate and parse a raw offset list, then append it.
    pub fn add_raw(&mut self, kind: &str, raw: &str) -> Result<()> {
        let offsets = parse_offsets(kind, raw.trim())?;
        self.push(kind, offsets);
        Ok(())
    }

    pub fn entries(&self) -> &[OffsetEntry] {
        &self.entries
    }

    /// Every `(kind, offset)` pair in application order
    pub fn targets(&self) -> impl Iterator<Item = (&RequestedKind, u64)> {
        self.entries
            .iter()
            .flat_map(|entry| entry.offsets.iter().map(move |&offset| (&entry.kind, offset)))
    }

    pub fn offset_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.offsets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.offset_count() == 0
    }
}
