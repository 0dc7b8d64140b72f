//! conan-cleanup - Conan cache reconciliation
//!
//! Collects the package references every project under a root declares,
//! compares them with the local Conan cache and removes the cache entries
//! nothing references anymore.

pub mod cleanup;
pub mod cli;
pub mod conan;
pub mod config;
pub mod error;
pub mod journal;
pub mod package;
pub mod reconcile;
pub mod ui;
pub mod usage;

pub use error::{CleanupError, CleanupResult};
