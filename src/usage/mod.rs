//! Used-set construction
//!
//! Discovers descriptor files under a project root and aggregates their
//! references into the set of packages that must stay in the cache.

pub mod aggregate;
pub mod discovery;

pub use aggregate::{aggregate, fold, Provenance, SkippedDescriptor, Usage, UsedSet};
pub use discovery::{DescriptorWalker, Discovery, DEFAULT_DESCRIPTOR_NAME};
