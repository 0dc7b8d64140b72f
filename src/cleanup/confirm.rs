//! Confirmation collaborator for interactive cleanups

use crate::cleanup::candidate::OrphanCandidate;
use crate::conan::InventoryEntry;
use async_trait::async_trait;

/// Answer to a confirmation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Remove this item
    Yes,
    /// Keep this item, continue with the next one
    No,
    /// Keep this and every remaining item
    Abort,
}

/// Asks whether cache entries may be removed
///
/// Each call is one request/response exchange; the executor awaits the
/// answer before touching the cache.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Ask about one orphan
    async fn confirm(&self, candidate: &OrphanCandidate) -> Confirmation;

    /// Ask once about a group of recipes left without binaries
    async fn confirm_prune(&self, recipes: &[InventoryEntry]) -> Confirmation;
}
