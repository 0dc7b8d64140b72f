//! Reference aggregation
//!
//! Reads and parses every discovered descriptor, then folds the results
//! into one [`UsedSet`]. Parsing runs on a bounded number of concurrent
//! reads; the fold is a single writer over the collected results.
//!
//! A descriptor that cannot be read or parsed is skipped and recorded in
//! [`Usage::skipped`]. Skipped files mean the used set may be incomplete,
//! which callers must surface before removing anything.

use crate::error::{CleanupError, CleanupResult};
use crate::package::{parse_descriptor, Descriptor, PackageReference};
use futures_util::stream::{self, StreamExt};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a used reference was declared
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Provenance {
    pub path: PathBuf,
    pub line: usize,
}

/// Every reference used by any project, with where it was declared
///
/// Keys are de-duplicated by full identity; each maps to a non-empty set
/// of declaration sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedSet {
    refs: BTreeMap<PackageReference, BTreeSet<Provenance>>,
}

impl UsedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one declaration site of `reference`
    pub fn insert(&mut self, reference: PackageReference, path: &Path, line: usize) {
        self.refs.entry(reference).or_default().insert(Provenance {
            path: path.to_path_buf(),
            line,
        });
    }

    /// Fold all declarations of a parsed descriptor
    pub fn extend_from(&mut self, descriptor: &Descriptor) {
        for declaration in &descriptor.declarations {
            for &line in &declaration.lines {
                self.insert(declaration.reference.clone(), &descriptor.path, line);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn contains(&self, reference: &PackageReference) -> bool {
        self.refs.contains_key(reference)
    }

    /// References in canonical order
    pub fn references(&self) -> impl Iterator<Item = &PackageReference> {
        self.refs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PackageReference, &BTreeSet<Provenance>)> {
        self.refs.iter()
    }

    /// Distinct files declaring `reference`
    pub fn files(&self, reference: &PackageReference) -> BTreeSet<&Path> {
        self.refs
            .get(reference)
            .map(|sites| sites.iter().map(|p| p.path.as_path()).collect())
            .unwrap_or_default()
    }
}

impl Serialize for UsedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            reference: String,
            #[serde(flatten)]
            key: &'a PackageReference,
            sources: &'a BTreeSet<Provenance>,
        }

        let mut seq = serializer.serialize_seq(Some(self.refs.len()))?;
        for (reference, sources) in &self.refs {
            seq.serialize_element(&Entry {
                reference: reference.to_string(),
                key: reference,
                sources,
            })?;
        }
        seq.end()
    }
}

/// A descriptor left out of the used set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDescriptor {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of aggregating all descriptors
#[derive(Debug, Clone, Default, Serialize)]
pub struct Usage {
    pub used: UsedSet,
    /// Descriptors that contributed to `used`
    pub scanned: usize,
    pub skipped: Vec<SkippedDescriptor>,
}

impl Usage {
    /// Whether some descriptor could not be taken into account
    pub fn is_incomplete(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Read, parse and fold all descriptors
///
/// At most `concurrency` files are read at once. Results are folded in the
/// order of `paths`, so the outcome does not depend on scheduling.
pub async fn aggregate(paths: &[PathBuf], concurrency: usize) -> Usage {
    info!(
        descriptors = paths.len(),
        concurrency, "Aggregating used references"
    );

    let outcomes: Vec<(PathBuf, CleanupResult<Descriptor>)> = stream::iter(paths.iter().cloned())
        .map(|path| async move {
            let parsed = read_descriptor(&path).await;
            (path, parsed)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    fold(outcomes)
}

/// Single-writer merge of per-file parse results
pub fn fold(outcomes: impl IntoIterator<Item = (PathBuf, CleanupResult<Descriptor>)>) -> Usage {
    let mut usage = Usage::default();

    for (path, outcome) in outcomes {
        match outcome {
            Ok(descriptor) => {
                debug!(
                    "{}: {} reference(s)",
                    descriptor.path.display(),
                    descriptor.len()
                );
                usage.used.extend_from(&descriptor);
                usage.scanned += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping descriptor");
                usage.skipped.push(SkippedDescriptor {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    usage
}

async fn read_descriptor(path: &Path) -> CleanupResult<Descriptor> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CleanupError::io(format!("reading descriptor {}", path.display()), e))?;
    parse_descriptor(path, &content)
}
