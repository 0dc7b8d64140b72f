//! Package identities and descriptor parsing
//!
//! Turns per-project `conaninfo.txt` descriptors into canonical
//! [`PackageReference`]s keyed by the full `name/version@user/channel:id`
//! compound key.

pub mod descriptor;
pub mod reference;

pub use descriptor::{parse_descriptor, Declaration, Descriptor};
pub use reference::{PackageReference, RecipeKey, ReferenceError};
