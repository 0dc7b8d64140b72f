//! Cleanup of orphaned cache entries
//!
//! Candidates come from [`crate::reconcile`]; the executor confirms, removes
//! and reports them.

pub mod cancel;
pub mod candidate;
pub mod confirm;
pub mod executor;
pub mod report;

pub use cancel::CancelFlag;
pub use candidate::{Disposition, OrphanCandidate, SkipReason};
pub use confirm::{Confirmation, Confirmer};
pub use executor::{CleanupExecutor, CleanupMode};
pub use report::{CleanupReport, DispositionCounts};
