//! Package cache abstraction
//!
//! The cache itself is owned by the package manager. This trait is the only
//! way the rest of the crate reads or mutates it, so tests can substitute an
//! in-memory cache.

use crate::error::CleanupResult;
use crate::package::PackageReference;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// One package (or package-less recipe) present in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub reference: PackageReference,
    /// Recipe reference exactly as the package manager reported it
    pub cache_ref: String,
    /// Bytes on disk, when the package manager reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl InventoryEntry {
    pub fn new(reference: PackageReference) -> Self {
        let cache_ref = reference.recipe.to_string();
        Self {
            reference,
            cache_ref,
            size: None,
        }
    }

    pub fn with_cache_ref(mut self, cache_ref: impl Into<String>) -> Self {
        self.cache_ref = cache_ref.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// The recipe this entry belongs to, as a package-less entry
    pub fn recipe_entry(&self) -> Self {
        Self {
            reference: PackageReference::recipe(self.reference.recipe.clone()),
            cache_ref: self.cache_ref.clone(),
            size: None,
        }
    }
}

impl fmt::Display for InventoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)
    }
}

/// Abstract package cache interface
#[async_trait]
pub trait PackageCache: Send + Sync {
    /// Enumerate every entry currently in the cache
    async fn inventory(&self) -> CleanupResult<Vec<InventoryEntry>>;

    /// Remove exactly one entry: a binary, or a whole recipe when the
    /// entry has no package id
    async fn remove(&self, entry: &InventoryEntry) -> CleanupResult<()>;

    /// Human-readable backend name for display
    fn name(&self) -> &'static str;
}
