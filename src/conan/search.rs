//! Parsers for Conan's JSON inventory output
//!
//! Conan 2 lists the whole cache in one document. Conan 1 needs one
//! document for the recipe list and one per recipe for its package ids.
//! Any deviation from the expected shape is `InventoryUnavailable`: an
//! inventory we cannot fully read is not a baseline we can delete against.

use crate::conan::cache::InventoryEntry;
use crate::error::{CleanupError, CleanupResult};
use crate::package::PackageReference;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Top-level key of the local cache in `conan list` output
const LOCAL_CACHE: &str = "Local Cache";

fn format_error(reason: impl Into<String>) -> CleanupError {
    CleanupError::InventoryUnavailable(format!(
        "unexpected conan output (conan might have changed its format): {}",
        reason.into()
    ))
}

fn parse_json(text: &str) -> CleanupResult<Value> {
    serde_json::from_str(text).map_err(|e| format_error(format!("invalid JSON: {}", e)))
}

/// Parse a recipe reference as reported by conan
fn parse_recipe_ref(cache_ref: &str) -> CleanupResult<PackageReference> {
    let reference: PackageReference = cache_ref
        .parse()
        .map_err(|e| format_error(format!("bad recipe reference '{}': {}", cache_ref, e)))?;
    if !reference.is_recipe_level() {
        return Err(format_error(format!(
            "expected a recipe reference, got '{}'",
            cache_ref
        )));
    }
    Ok(reference)
}

/// Entries for one recipe: one per package id, or the bare recipe
fn recipe_entries(
    cache_ref: &str,
    package_ids: BTreeSet<String>,
) -> CleanupResult<Vec<InventoryEntry>> {
    let recipe = parse_recipe_ref(cache_ref)?.recipe;

    if package_ids.is_empty() {
        return Ok(vec![
            InventoryEntry::new(PackageReference::recipe(recipe)).with_cache_ref(cache_ref)
        ]);
    }

    Ok(package_ids
        .into_iter()
        .map(|id| {
            InventoryEntry::new(PackageReference::binary(recipe.clone(), id))
                .with_cache_ref(cache_ref)
        })
        .collect())
}

/// Parse `conan list "*:*" --format=json` (Conan 2)
///
/// ```json
/// { "Local Cache": { "zlib/1.2.11": { "revisions": { "<rrev>": {
///     "packages": { "<package_id>": { "info": {} } } } } } } }
/// ```
pub fn parse_list_json(text: &str) -> CleanupResult<Vec<InventoryEntry>> {
    let json = parse_json(text)?;
    let cache = json
        .get(LOCAL_CACHE)
        .ok_or_else(|| format_error(format!("missing '{}' object", LOCAL_CACHE)))?
        .as_object()
        .ok_or_else(|| format_error(format!("'{}' is not an object", LOCAL_CACHE)))?;

    if let Some(error) = cache.get("error") {
        return Err(CleanupError::InventoryUnavailable(format!(
            "conan list reported an error: {}",
            error.as_str().unwrap_or(&error.to_string())
        )));
    }

    let mut entries = Vec::new();
    for (cache_ref, recipe) in cache {
        let package_ids = list_package_ids(cache_ref, recipe)?;
        entries.extend(recipe_entries(cache_ref, package_ids)?);
    }
    Ok(entries)
}

fn list_package_ids(cache_ref: &str, recipe: &Value) -> CleanupResult<BTreeSet<String>> {
    let mut ids = BTreeSet::new();

    let Some(revisions) = recipe.get("revisions") else {
        return Ok(ids);
    };
    let revisions = revisions
        .as_object()
        .ok_or_else(|| format_error(format!("'revisions' of {} is not an object", cache_ref)))?;

    for revision in revisions.values() {
        match revision.get("packages") {
            None => {}
            Some(Value::Object(packages)) => ids.extend(packages.keys().cloned()),
            Some(_) => {
                return Err(format_error(format!(
                    "'packages' of {} is not an object",
                    cache_ref
                )))
            }
        }
    }
    Ok(ids)
}

/// Root object of Conan 1 search output: `results[0]`
fn search_result(text: &str) -> CleanupResult<Option<Map<String, Value>>> {
    let json = parse_json(text)?;

    if json.get("error").and_then(Value::as_bool) == Some(true) {
        return Err(CleanupError::InventoryUnavailable(
            "conan search reported an error".to_string(),
        ));
    }

    let results = json
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| format_error("missing top-level 'results' array"))?;

    match results.first() {
        None => Ok(None),
        Some(Value::Object(result)) => Ok(Some(result.clone())),
        Some(_) => Err(format_error("'results' array is missing its root object")),
    }
}

fn search_items(result: &Map<String, Value>) -> CleanupResult<&Vec<Value>> {
    result
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| format_error("root object of 'results' is missing the 'items' array"))
}

/// Parse recipe ids from `conan search -j <file>` (Conan 1)
pub fn parse_search_recipes(text: &str) -> CleanupResult<Vec<String>> {
    let Some(result) = search_result(text)? else {
        return Ok(Vec::new());
    };

    search_items(&result)?
        .iter()
        .map(|item| {
            item.get("recipe")
                .and_then(|recipe| recipe.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| format_error("'items' entry is missing 'recipe.id'"))
        })
        .collect()
}

/// Parse package ids from `conan search <recipe> -j <file>` (Conan 1)
pub fn parse_search_packages(text: &str) -> CleanupResult<BTreeSet<String>> {
    let Some(result) = search_result(text)? else {
        return Ok(BTreeSet::new());
    };

    let mut ids = BTreeSet::new();
    for item in search_items(&result)? {
        let Some(packages) = item.get("packages") else {
            continue;
        };
        let packages = packages
            .as_array()
            .ok_or_else(|| format_error("'packages' is not an array"))?;
        for package in packages {
            let id = package
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| format_error("'package' is missing an 'id' string"))?;
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}

/// Build entries for one Conan 1 recipe from its package search output
pub fn search_entries(
    cache_ref: &str,
    packages_json: &str,
) -> CleanupResult<Vec<InventoryEntry>> {
    recipe_entries(cache_ref, parse_search_packages(packages_json)?)
}
