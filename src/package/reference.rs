//! Canonical package identities
//!
//! A Conan package is identified by the compound key
//! `name/version@user/channel:package_id`. The recipe part
//! (`name/version@user/channel`) is always present; the package id is
//! optional and pins one binary variant of the recipe.
//!
//! Identity is exact field-by-field comparison. Nothing here ever compares
//! references by substring or prefix.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder Conan writes for an empty user or channel
const EMPTY_SCOPE: &str = "_";

/// Why a reference string could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("empty reference")]
    Empty,

    #[error("missing package name")]
    MissingName,

    #[error("missing version")]
    MissingVersion,

    #[error("user given without channel")]
    MissingChannel,

    #[error("empty package id after ':'")]
    EmptyPackageId,

    #[error("unexpected '{0}' in {1}")]
    Unexpected(char, &'static str),
}

/// The recipe part of a reference: `name/version@user/channel`
///
/// Empty user/channel are stored as empty strings, so `zlib/1.2.11`,
/// `zlib/1.2.11@` and `zlib/1.2.11@_/_` all produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecipeKey {
    pub name: String,
    pub version: String,
    pub user: String,
    pub channel: String,
}

impl RecipeKey {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: normalize_scope(user.into()),
            channel: normalize_scope(channel.into()),
        }
    }

    /// Whether both user and channel are empty
    pub fn is_unscoped(&self) -> bool {
        self.user.is_empty() && self.channel.is_empty()
    }

    fn parse(s: &str) -> Result<Self, ReferenceError> {
        // `#rrev` is a revision token, not part of identity
        let s = s.split('#').next().unwrap_or_default().trim();
        if s.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let (name_version, scope) = match s.split_once('@') {
            Some((nv, scope)) => (nv, Some(scope)),
            None => (s, None),
        };

        let (name, version) = match name_version.split_once('/') {
            Some((name, version)) => (name.trim(), version.trim()),
            None if name_version.trim().is_empty() => return Err(ReferenceError::MissingName),
            None => return Err(ReferenceError::MissingVersion),
        };
        if name.is_empty() {
            return Err(ReferenceError::MissingName);
        }
        if version.is_empty() {
            return Err(ReferenceError::MissingVersion);
        }
        if version.contains('/') {
            return Err(ReferenceError::Unexpected('/', "version"));
        }

        let (user, channel) = match scope.map(str::trim) {
            None | Some("") => ("", ""),
            Some(scope) => match scope.split_once('/') {
                Some((user, channel)) if !user.trim().is_empty() && !channel.trim().is_empty() => {
                    if channel.contains('/') {
                        return Err(ReferenceError::Unexpected('/', "channel"));
                    }
                    (user.trim(), channel.trim())
                }
                _ => return Err(ReferenceError::MissingChannel),
            },
        };

        Ok(Self::new(name, version, user, channel))
    }
}

impl fmt::Display for RecipeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if !self.is_unscoped() {
            write!(
                f,
                "@{}/{}",
                display_scope(&self.user),
                display_scope(&self.channel)
            )?;
        }
        Ok(())
    }
}

/// A package identity as required by a project or held in the cache
///
/// `Eq`/`Hash`/`Ord` are structural over all five fields and are what the
/// used set de-duplicates on. Matching a used reference against the cache
/// goes through [`PackageReference::covers`], which treats a missing
/// package id as "every binary of this recipe".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageReference {
    #[serde(flatten)]
    pub recipe: RecipeKey,
    pub package_id: Option<String>,
}

impl PackageReference {
    /// Recipe-level reference (no package id)
    pub fn recipe(recipe: RecipeKey) -> Self {
        Self {
            recipe,
            package_id: None,
        }
    }

    /// Binary-level reference pinned to one package id
    pub fn binary(recipe: RecipeKey, package_id: impl Into<String>) -> Self {
        Self {
            recipe,
            package_id: Some(package_id.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.recipe.name
    }

    pub fn is_recipe_level(&self) -> bool {
        self.package_id.is_none()
    }

    /// Whether this (used) reference protects `other` (a cache entry)
    ///
    /// Recipe keys must be identical. A recipe-level reference then covers
    /// every package id; a binary-level one covers only its own id.
    pub fn covers(&self, other: &PackageReference) -> bool {
        if self.recipe != other.recipe {
            return false;
        }
        match (&self.package_id, &other.package_id) {
            (None, _) => true,
            (Some(mine), Some(theirs)) => mine == theirs,
            // A binary in use keeps its (empty) recipe entry alive too
            (Some(_), None) => true,
        }
    }
}

impl FromStr for PackageReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (recipe, package_id) = match s.split_once(':') {
            Some((recipe, package)) => {
                let package = package.split('#').next().unwrap_or_default().trim();
                if package.is_empty() {
                    return Err(ReferenceError::EmptyPackageId);
                }
                if let Some(c) = package.chars().find(|c| matches!(c, ':' | '/' | '@')) {
                    return Err(ReferenceError::Unexpected(c, "package id"));
                }
                (recipe, Some(package.to_string()))
            }
            None => (s, None),
        };

        Ok(Self {
            recipe: RecipeKey::parse(recipe)?,
            package_id,
        })
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.recipe)?;
        if let Some(ref id) = self.package_id {
            write!(f, ":{}", id)?;
        }
        Ok(())
    }
}

fn normalize_scope(value: String) -> String {
    if value == EMPTY_SCOPE {
        String::new()
    } else {
        value
    }
}

fn display_scope(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_SCOPE
    } else {
        value
    }
}
