//! Outcome of a cleanup batch

use crate::cleanup::candidate::{Disposition, OrphanCandidate};
use serde::Serialize;

/// Number of candidates in each disposition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispositionCounts {
    pub removed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
}

impl DispositionCounts {
    fn tally<'a>(candidates: impl IntoIterator<Item = &'a OrphanCandidate>) -> Self {
        let mut counts = Self::default();
        for candidate in candidates {
            match candidate.disposition() {
                Disposition::Removed => counts.removed += 1,
                Disposition::Failed { .. } => counts.failed += 1,
                Disposition::Skipped { .. } => counts.skipped += 1,
                Disposition::Pending | Disposition::Confirmed => counts.pending += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.removed + self.failed + self.skipped + self.pending
    }
}

/// Every candidate of a batch with its final disposition
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub mode: &'static str,
    pub candidates: Vec<OrphanCandidate>,
    /// Recipes removed after all of their binaries were
    pub pruned: Vec<OrphanCandidate>,
}

impl CleanupReport {
    pub fn counts(&self) -> DispositionCounts {
        DispositionCounts::tally(&self.candidates)
    }

    pub fn pruned_counts(&self) -> DispositionCounts {
        DispositionCounts::tally(&self.pruned)
    }

    fn all(&self) -> impl Iterator<Item = &OrphanCandidate> {
        self.candidates.iter().chain(&self.pruned)
    }

    pub fn failures(&self) -> impl Iterator<Item = &OrphanCandidate> {
        self.all()
            .filter(|c| matches!(c.disposition(), Disposition::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &OrphanCandidate> {
        self.all()
            .filter(|c| matches!(c.disposition(), Disposition::Skipped { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Bytes freed by removed binaries whose size the cache reported
    pub fn reclaimed_bytes(&self) -> u64 {
        self.all()
            .filter(|c| matches!(c.disposition(), Disposition::Removed))
            .filter_map(|c| c.entry().size)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::SkipReason;
    use crate::conan::InventoryEntry;

    fn candidate(reference: &str, size: Option<u64>) -> OrphanCandidate {
        let mut entry = InventoryEntry::new(reference.parse().unwrap());
        entry.size = size;
        OrphanCandidate::new(entry)
    }

    #[test]
    fn counts_and_failures() {
        let mut removed = candidate("a/1.0:x", Some(100));
        removed.confirm();
        removed.mark_removed();
        let mut failed = candidate("b/1.0:y", Some(50));
        failed.confirm();
        failed.mark_failed("locked");
        let mut skipped = candidate("c/1.0:z", None);
        skipped.skip(SkipReason::Declined);
        let mut pruned = candidate("a/1.0", Some(7));
        pruned.confirm();
        pruned.mark_removed();

        let report = CleanupReport {
            mode: "automatic",
            candidates: vec![removed, failed, skipped],
            pruned: vec![pruned],
        };

        assert_eq!(
            report.counts(),
            DispositionCounts {
                removed: 1,
                failed: 1,
                skipped: 1,
                pending: 0
            }
        );
        assert_eq!(report.counts().total(), 3);
        assert_eq!(report.pruned_counts().removed, 1);
        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.skipped().count(), 1);
        assert_eq!(report.reclaimed_bytes(), 107);
    }

    #[test]
    fn empty_report_has_no_failures() {
        let report = CleanupReport {
            mode: "interactive",
            candidates: Vec::new(),
            pruned: Vec::new(),
        };
        assert!(!report.has_failures());
        assert_eq!(report.counts().total(), 0);
    }
}
