//! Orphan candidates and their disposition state machine
//!
//! ```text
//! pending ──► confirmed ──► removed
//!    │            └───────► failed
//!    └──────► skipped
//! ```
//!
//! `skipped`, `removed` and `failed` are terminal. Transition methods return
//! `false` and leave the candidate untouched when called from the wrong state.

use crate::conan::InventoryEntry;
use crate::package::PackageReference;
use serde::Serialize;
use std::fmt;

/// Why a candidate was not removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// User answered no
    Declined,
    /// User aborted the rest of the batch
    Aborted,
    /// Run interrupted before this candidate was reached
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Declined => "declined",
            Self::Aborted => "aborted by user",
            Self::Cancelled => "interrupted",
        };
        write!(f, "{}", text)
    }
}

/// Where a candidate stands in the cleanup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Disposition {
    Pending,
    Confirmed,
    Skipped { reason: SkipReason },
    Removed,
    Failed { detail: String },
}

impl Disposition {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Skipped { .. } | Self::Removed | Self::Failed { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Skipped { .. } => "skipped",
            Self::Removed => "removed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// A cache entry no project references
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanCandidate {
    #[serde(flatten)]
    entry: InventoryEntry,
    disposition: Disposition,
}

impl OrphanCandidate {
    pub fn new(entry: InventoryEntry) -> Self {
        Self {
            entry,
            disposition: Disposition::Pending,
        }
    }

    pub fn entry(&self) -> &InventoryEntry {
        &self.entry
    }

    pub fn reference(&self) -> &PackageReference {
        &self.entry.reference
    }

    pub fn disposition(&self) -> &Disposition {
        &self.disposition
    }

    pub fn confirm(&mut self) -> bool {
        self.transition(|d| matches!(d, Disposition::Pending), Disposition::Confirmed)
    }

    pub fn skip(&mut self, reason: SkipReason) -> bool {
        self.transition(
            |d| matches!(d, Disposition::Pending),
            Disposition::Skipped { reason },
        )
    }

    pub fn mark_removed(&mut self) -> bool {
        self.transition(|d| matches!(d, Disposition::Confirmed), Disposition::Removed)
    }

    pub fn mark_failed(&mut self, detail: impl Into<String>) -> bool {
        self.transition(
            |d| matches!(d, Disposition::Confirmed),
            Disposition::Failed {
                detail: detail.into(),
            },
        )
    }

    fn transition(&mut self, allowed: impl Fn(&Disposition) -> bool, next: Disposition) -> bool {
        if allowed(&self.disposition) {
            self.disposition = next;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for OrphanCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entry)
    }
}
