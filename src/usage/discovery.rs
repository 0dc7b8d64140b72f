//! Descriptor discovery
//!
//! Walks a project tree and collects every descriptor file. Build
//! directories are usually git-ignored, so ignore files and hidden-file
//! filtering are switched off.

use crate::error::{CleanupError, CleanupResult};
use crate::usage::aggregate::SkippedDescriptor;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name Conan writes next to every installed build configuration
pub const DEFAULT_DESCRIPTOR_NAME: &str = "conaninfo.txt";

/// Descriptor paths found by a walk, plus the entries it could not read
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub descriptors: Vec<PathBuf>,
    /// A directory that cannot be read may hide descriptors
    pub unreadable: Vec<SkippedDescriptor>,
}

/// Finds descriptor files below a root directory
#[derive(Debug, Clone)]
pub struct DescriptorWalker {
    root: PathBuf,
    names: Vec<String>,
    follow_links: bool,
}

impl DescriptorWalker {
    /// Walker looking for the default descriptor name
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            names: vec![DEFAULT_DESCRIPTOR_NAME.to_string()],
            follow_links: true,
        }
    }

    /// Replace the set of file names treated as descriptors
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        if !names.is_empty() {
            self.names = names;
        }
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect descriptor paths, sorted for reproducible runs
    ///
    /// Unreadable entries are collected in `Discovery::unreadable`; only a
    /// missing root is an error.
    pub fn discover(&self) -> CleanupResult<Discovery> {
        if !self.root.is_dir() {
            return Err(CleanupError::PathNotFound(self.root.clone()));
        }

        let mut found = Vec::new();
        let mut unreadable = Vec::new();
        for result in WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(self.follow_links)
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    let path = error_path(&err).unwrap_or(&self.root).to_path_buf();
                    unreadable.push(SkippedDescriptor {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.names.iter().any(|n| n == name));
            if matches {
                debug!("Found descriptor: {}", entry.path().display());
                found.push(entry.into_path());
            }
        }

        found.sort();
        found.dedup();
        debug!("Discovered {} descriptors", found.len());
        Ok(Discovery {
            descriptors: found,
            unreadable,
        })
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nested_descriptors_sorted() {
        let dir = TempDir::new().unwrap();
        let b = dir.path().join("b/build/Release");
        let a = dir.path().join("a/build");
        fs::create_dir_all(&b).unwrap();
        fs::create_dir_all(&a).unwrap();
        fs::write(b.join("conaninfo.txt"), "").unwrap();
        fs::write(a.join("conaninfo.txt"), "").unwrap();
        fs::write(a.join("conanbuildinfo.txt"), "").unwrap();

        let found = DescriptorWalker::new(dir.path()).discover().unwrap().descriptors;

        assert_eq!(
            found,
            vec![a.join("conaninfo.txt"), b.join("conaninfo.txt")]
        );
    }

    #[test]
    fn ignores_gitignore_rules() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        let build = dir.path().join("build");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("conaninfo.txt"), "").unwrap();

        let found = DescriptorWalker::new(dir.path()).discover().unwrap().descriptors;
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn custom_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("deps.lock"), "").unwrap();
        fs::write(dir.path().join("conaninfo.txt"), "").unwrap();

        let found = DescriptorWalker::new(dir.path())
            .with_names(vec!["deps.lock".to_string()])
            .discover()
            .unwrap()
            .descriptors;
        assert_eq!(found, vec![dir.path().join("deps.lock")]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_is_reported_unreadable() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("conaninfo.txt"), "").unwrap();
        let link = dir.path().join("moved");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        let discovery = DescriptorWalker::new(dir.path()).discover().unwrap();

        assert_eq!(discovery.descriptors, vec![app.join("conaninfo.txt")]);
        assert_eq!(discovery.unreadable.len(), 1);
        assert_eq!(discovery.unreadable[0].path, link);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = DescriptorWalker::new(dir.path().join("nope"))
            .discover()
            .unwrap_err();
        assert!(matches!(err, CleanupError::PathNotFound(_)));
    }
}
