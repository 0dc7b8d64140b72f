//! Descriptor parsing
//!
//! A descriptor (`conaninfo.txt`) records the exact package identities a
//! project's build resolved to. Two layouts are accepted:
//!
//! - INI-style documents with `[section]` headers, where only the lines of
//!   the `[full_requires]` section declare dependencies
//! - plain lists with one reference per line
//!
//! Parsing is pure: the same text always yields the same declarations in the
//! same order.

use crate::error::{CleanupError, CleanupResult};
use crate::package::reference::PackageReference;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Section holding the resolved dependency references
const REQUIRES_SECTION: &str = "full_requires";

/// One distinct reference declared in a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub reference: PackageReference,
    /// 1-based line numbers of every line declaring this reference
    pub lines: Vec<usize>,
}

/// A parsed descriptor file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub path: PathBuf,
    /// Distinct declarations in order of first appearance
    pub declarations: Vec<Declaration>,
}

impl Descriptor {
    /// Distinct references in order of first appearance
    pub fn references(&self) -> impl Iterator<Item = &PackageReference> {
        self.declarations.iter().map(|d| &d.reference)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Parse the text of one descriptor
///
/// `path` is only used for error reporting. Fails on the first line whose
/// name or version is missing.
pub fn parse_descriptor(path: &Path, content: &str) -> CleanupResult<Descriptor> {
    let sectioned = content.lines().any(|line| section_name(line.trim()).is_some());
    let mut in_requires = !sectioned;

    let mut declarations: Vec<Declaration> = Vec::new();
    let mut index: HashMap<PackageReference, usize> = HashMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || is_comment(line) {
            continue;
        }

        if let Some(section) = section_name(line) {
            in_requires = section.eq_ignore_ascii_case(REQUIRES_SECTION);
            continue;
        }

        if !in_requires {
            continue;
        }

        let reference = line
            .parse::<PackageReference>()
            .map_err(|e| CleanupError::malformed(path, line_no, line, e.to_string()))?;

        match index.get(&reference) {
            Some(&pos) => declarations[pos].lines.push(line_no),
            None => {
                index.insert(reference.clone(), declarations.len());
                declarations.push(Declaration {
                    reference,
                    lines: vec![line_no],
                });
            }
        }
    }

    Ok(Descriptor {
        path: path.to_path_buf(),
        declarations,
    })
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with(';')
}

fn section_name(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::RecipeKey;

    const CONANINFO: &str = r#"[settings]
    arch=x86_64
    build_type=Release
    os=Linux

[requires]
    zlib/1.Y.Z

[options]
    shared=False

[full_settings]
    arch=x86_64

[full_requires]
    zlib/1.2.11@_/_:6af9cc7cb931c5ad942174fd7838eb655717c709
    openssl/3.0.8@acme/stable

[full_options]
    zlib:shared=False

[recipe_hash]
    0123456789abcdef
"#;

    fn parse(content: &str) -> CleanupResult<Descriptor> {
        parse_descriptor(Path::new("/work/app/build/conaninfo.txt"), content)
    }

    #[test]
    fn reads_only_full_requires_section() {
        let descriptor = parse(CONANINFO).unwrap();
        let refs: Vec<String> = descriptor.references().map(ToString::to_string).collect();
        assert_eq!(
            refs,
            vec![
                "zlib/1.2.11:6af9cc7cb931c5ad942174fd7838eb655717c709",
                "openssl/3.0.8@acme/stable",
            ]
        );
        assert_eq!(descriptor.declarations[0].lines, vec![16]);
    }

    #[test]
    fn plain_list_without_sections() {
        let descriptor = parse("# pinned\nzlib/1.2.11@_/_\n\n; other\nbzip2/1.0.8:abc\n").unwrap();
        assert_eq!(descriptor.len(), 2);
        assert_eq!(
            descriptor.declarations[0].reference,
            PackageReference::recipe(RecipeKey::new("zlib", "1.2.11", "", ""))
        );
        assert_eq!(descriptor.declarations[1].lines, vec![5]);
    }

    #[test]
    fn duplicates_collapse_but_keep_lines() {
        let descriptor = parse("zlib/1.2.11\nzlib/1.2.11@_/_\nbzip2/1.0.8\n").unwrap();
        assert_eq!(descriptor.len(), 2);
        assert_eq!(descriptor.declarations[0].lines, vec![1, 2]);
    }

    #[test]
    fn missing_version_reports_path_and_line() {
        let err = parse("zlib/1.2.11\nboost\n").unwrap_err();
        match err {
            CleanupError::MalformedDescriptor {
                path,
                line,
                content,
                ..
            } => {
                assert_eq!(path, Path::new("/work/app/build/conaninfo.txt"));
                assert_eq!(line, 2);
                assert_eq!(content, "boost");
            }
            other => panic!("expected MalformedDescriptor, got {other:?}"),
        }
    }

    #[test]
    fn malformed_lines_outside_requires_are_ignored() {
        let descriptor = parse("[settings]\nos=Linux\n[full_requires]\nzlib/1.2.11\n").unwrap();
        assert_eq!(descriptor.len(), 1);
    }

    #[test]
    fn empty_descriptor_is_valid() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("[full_requires]\n").unwrap().is_empty());
    }

    #[test]
    fn parsing_is_deterministic() {
        let first = parse(CONANINFO).unwrap();
        let second = parse(CONANINFO).unwrap();
        assert_eq!(first, second);
    }
}
