//! Used-set / inventory reconciliation
//!
//! Orphans are the inventory entries no used reference covers. Lookups go
//! through an index keyed by package name and then by full recipe key, so
//! each inventory entry is only compared against references to its own
//! recipe.

use crate::cleanup::{Disposition, OrphanCandidate};
use crate::conan::InventoryEntry;
use crate::package::{PackageReference, RecipeKey};
use crate::usage::UsedSet;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// What the used set protects of one recipe
#[derive(Debug)]
enum Protection<'a> {
    /// A recipe-level reference: every binary
    AllBinaries,
    /// Only these package ids
    Binaries(HashSet<&'a str>),
}

/// Lookup structure over a [`UsedSet`]
#[derive(Debug)]
pub struct UsageIndex<'a> {
    by_name: HashMap<&'a str, HashMap<&'a RecipeKey, Protection<'a>>>,
}

impl<'a> UsageIndex<'a> {
    pub fn new(used: &'a UsedSet) -> Self {
        let mut by_name: HashMap<&str, HashMap<&RecipeKey, Protection>> = HashMap::new();

        for reference in used.references() {
            let recipes = by_name.entry(reference.name()).or_default();
            let protection = recipes
                .entry(&reference.recipe)
                .or_insert_with(|| Protection::Binaries(HashSet::new()));

            match (&reference.package_id, protection) {
                (None, protection) => *protection = Protection::AllBinaries,
                (Some(id), Protection::Binaries(ids)) => {
                    ids.insert(id.as_str());
                }
                (Some(_), Protection::AllBinaries) => {}
            }
        }

        Self { by_name }
    }

    fn recipe(&self, recipe: &RecipeKey) -> Option<&Protection<'a>> {
        self.by_name.get(recipe.name.as_str())?.get(recipe)
    }

    /// Whether some used reference covers `reference`
    ///
    /// Same rule as [`PackageReference::covers`], applied to the whole set.
    pub fn covers(&self, reference: &PackageReference) -> bool {
        match (self.recipe(&reference.recipe), &reference.package_id) {
            (None, _) => false,
            (Some(Protection::AllBinaries), _) => true,
            (Some(Protection::Binaries(ids)), Some(id)) => ids.contains(id.as_str()),
            (Some(Protection::Binaries(_)), None) => true,
        }
    }

    /// Whether any used reference names this recipe
    pub fn uses_recipe(&self, recipe: &RecipeKey) -> bool {
        self.recipe(recipe).is_some()
    }
}

/// Compute the orphan candidates: `inventory - used`
///
/// The result is sorted by name, version, user, channel and package id, and
/// is identical across runs on identical input.
pub fn reconcile(used: &UsedSet, inventory: &[InventoryEntry]) -> Vec<OrphanCandidate> {
    let index = UsageIndex::new(used);

    let mut orphans: Vec<&InventoryEntry> = inventory
        .iter()
        .filter(|entry| !index.covers(&entry.reference))
        .collect();
    orphans.sort_by(|a, b| a.reference.cmp(&b.reference));
    orphans.dedup_by(|a, b| a.reference == b.reference);

    debug!(
        "{} of {} cache entries are orphans",
        orphans.len(),
        inventory.len()
    );

    orphans
        .into_iter()
        .cloned()
        .map(OrphanCandidate::new)
        .collect()
}

/// Recipes whose every cached binary was removed in this run
///
/// A recipe qualifies only if no used reference names it at all, so a
/// project pinning a binary that is missing from the cache still keeps its
/// recipe. Returned as package-less entries in canonical order.
pub fn emptied_recipes(
    used: &UsedSet,
    inventory: &[InventoryEntry],
    processed: &[OrphanCandidate],
) -> Vec<InventoryEntry> {
    let index = UsageIndex::new(used);

    let removed: HashSet<&PackageReference> = processed
        .iter()
        .filter(|c| matches!(c.disposition(), Disposition::Removed))
        .map(OrphanCandidate::reference)
        .collect();

    let mut recipes: BTreeMap<&RecipeKey, (&InventoryEntry, bool)> = BTreeMap::new();
    for entry in inventory {
        let emptied = !entry.reference.is_recipe_level() && removed.contains(&entry.reference);
        recipes
            .entry(&entry.reference.recipe)
            .and_modify(|(_, all_removed)| *all_removed &= emptied)
            .or_insert((entry, emptied));
    }

    recipes
        .into_iter()
        .filter(|(recipe, (_, all_removed))| *all_removed && !index.uses_recipe(recipe))
        .map(|(_, (entry, _))| entry.recipe_entry())
        .collect()
}
