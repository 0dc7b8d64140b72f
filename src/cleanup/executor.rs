//! Sequential removal of orphan candidates
//!
//! Removals run strictly one at a time: the package manager holds a lock on
//! its cache, and interactive answers have to line up with the candidate
//! they were asked about.

use crate::cleanup::cancel::CancelFlag;
use crate::cleanup::candidate::{OrphanCandidate, SkipReason};
use crate::cleanup::confirm::{Confirmation, Confirmer};
use crate::cleanup::report::CleanupReport;
use crate::conan::{InventoryEntry, PackageCache};
use crate::error::CleanupError;
use crate::journal::RemovalJournal;
use crate::reconcile::emptied_recipes;
use crate::usage::UsedSet;
use tracing::{debug, info, warn};

/// How candidates get confirmed
#[derive(Clone, Copy)]
pub enum CleanupMode<'a> {
    /// Every candidate is confirmed without asking
    Automatic,
    /// Each candidate is put to the confirmer first
    Interactive(&'a dyn Confirmer),
}

impl CleanupMode<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Interactive(_) => "interactive",
        }
    }
}

type Observer<'a> = &'a (dyn Fn(&OrphanCandidate) + Send + Sync);

/// Drives candidates through their disposition state machine
pub struct CleanupExecutor<'a> {
    cache: &'a dyn PackageCache,
    mode: CleanupMode<'a>,
    prune_empty_recipes: bool,
    cancel: CancelFlag,
    journal: Option<&'a RemovalJournal>,
    observer: Option<Observer<'a>>,
}

impl<'a> CleanupExecutor<'a> {
    pub fn new(cache: &'a dyn PackageCache, mode: CleanupMode<'a>) -> Self {
        Self {
            cache,
            mode,
            prune_empty_recipes: true,
            cancel: CancelFlag::new(),
            journal: None,
            observer: None,
        }
    }

    pub fn prune_empty_recipes(mut self, prune: bool) -> Self {
        self.prune_empty_recipes = prune;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_journal(mut self, journal: &'a RemovalJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Called once per candidate when it reaches a terminal disposition
    pub fn with_observer(mut self, observer: Observer<'a>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Process every candidate, then prune recipes left without binaries
    ///
    /// Never fails: per-candidate errors end up as `failed` dispositions in
    /// the report.
    pub async fn run(
        &self,
        mut candidates: Vec<OrphanCandidate>,
        used: &UsedSet,
        inventory: &[InventoryEntry],
    ) -> CleanupReport {
        info!(
            "Processing {} orphan(s) in {} mode",
            candidates.len(),
            self.mode.label()
        );

        let stopped = self.process(&mut candidates).await;

        let pruned = match stopped {
            None if self.prune_empty_recipes => {
                let recipes = emptied_recipes(used, inventory, &candidates);
                self.prune(recipes).await
            }
            _ => Vec::new(),
        };

        CleanupReport {
            mode: self.mode.label(),
            candidates,
            pruned,
        }
    }

    /// Returns why the batch stopped early, if it did
    async fn process(&self, candidates: &mut [OrphanCandidate]) -> Option<SkipReason> {
        let mut stopped = None;

        for candidate in candidates.iter_mut() {
            if stopped.is_none() && self.cancel.is_cancelled() {
                info!("Cleanup interrupted, skipping remaining candidates");
                stopped = Some(SkipReason::Cancelled);
            }
            if let Some(reason) = stopped {
                self.finish_skipped(candidate, reason);
                continue;
            }

            if let CleanupMode::Interactive(confirmer) = self.mode {
                match confirmer.confirm(candidate).await {
                    Confirmation::Yes => {}
                    Confirmation::No => {
                        self.finish_skipped(candidate, SkipReason::Declined);
                        continue;
                    }
                    Confirmation::Abort => {
                        debug!("{}", CleanupError::ConfirmationAborted);
                        stopped = Some(SkipReason::Aborted);
                        self.finish_skipped(candidate, SkipReason::Aborted);
                        continue;
                    }
                }
                // Ctrl-C may have arrived while the prompt was open
                if self.cancel.is_cancelled() {
                    stopped = Some(SkipReason::Cancelled);
                    self.finish_skipped(candidate, SkipReason::Cancelled);
                    continue;
                }
            }

            candidate.confirm();
            self.remove(candidate).await;
        }

        stopped
    }

    async fn prune(&self, recipes: Vec<InventoryEntry>) -> Vec<OrphanCandidate> {
        if recipes.is_empty() {
            return Vec::new();
        }
        info!("{} recipe(s) left without binaries", recipes.len());

        let answer = match self.mode {
            CleanupMode::Automatic => Confirmation::Yes,
            CleanupMode::Interactive(confirmer) => confirmer.confirm_prune(&recipes).await,
        };

        let mut pruned: Vec<OrphanCandidate> =
            recipes.into_iter().map(OrphanCandidate::new).collect();

        match answer {
            // One answer covers the whole group
            Confirmation::Yes => self.remove_all(&mut pruned).await,
            Confirmation::No => pruned
                .iter_mut()
                .for_each(|c| self.finish_skipped(c, SkipReason::Declined)),
            Confirmation::Abort => pruned
                .iter_mut()
                .for_each(|c| self.finish_skipped(c, SkipReason::Aborted)),
        }
        pruned
    }

    async fn remove_all(&self, candidates: &mut [OrphanCandidate]) {
        for candidate in candidates.iter_mut() {
            if self.cancel.is_cancelled() {
                self.finish_skipped(candidate, SkipReason::Cancelled);
                continue;
            }
            candidate.confirm();
            self.remove(candidate).await;
        }
    }

    async fn remove(&self, candidate: &mut OrphanCandidate) {
        match self.cache.remove(candidate.entry()).await {
            Ok(()) => {
                info!("Removed {}", candidate);
                candidate.mark_removed();
            }
            Err(e) => {
                warn!("{}", e);
                let detail = match e {
                    CleanupError::RemovalFailed { detail, .. } => detail,
                    other => other.to_string(),
                };
                candidate.mark_failed(detail);
            }
        }

        if let Some(journal) = self.journal {
            journal.record(candidate).await;
        }
        self.notify(candidate);
    }

    fn finish_skipped(&self, candidate: &mut OrphanCandidate, reason: SkipReason) {
        if candidate.skip(reason) {
            debug!("Skipped {} ({})", candidate, reason);
            self.notify(candidate);
        }
    }

    fn notify(&self, candidate: &OrphanCandidate) {
        if let Some(observer) = self.observer {
            observer(candidate);
        }
    }
}
