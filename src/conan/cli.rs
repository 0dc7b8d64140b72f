//! Conan command-line backend
//!
//! Implements [`PackageCache`] by running the `conan` executable. Every
//! invocation is bounded by the configured timeout; a child still running
//! when the timeout fires is killed.

use crate::config::{ConanApi, ConanConfig};
use crate::conan::cache::{InventoryEntry, PackageCache};
use crate::conan::command_output_tail;
use crate::conan::search;
use crate::error::{CleanupError, CleanupResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Package cache backed by the `conan` executable
pub struct ConanCli {
    binary: String,
    api: ConanApi,
    timeout: Duration,
}

impl ConanCli {
    /// Create a backend from configuration
    pub fn new(config: &ConanConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            api: config.api,
            timeout: config.timeout(),
        }
    }

    fn display_command(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    /// Execute a conan command and return its output
    async fn exec(&self, args: &[&str]) -> CleanupResult<Output> {
        let command = self.display_command(args);
        debug!("Executing: {}", command);

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, output).await {
            Ok(result) => result.map_err(|e| CleanupError::command_failed(command, e)),
            Err(_) => Err(CleanupError::CommandTimeout {
                command,
                timeout: self.timeout,
            }),
        }
    }

    /// Execute a query command, requiring success
    async fn query(&self, args: &[&str]) -> CleanupResult<Output> {
        let output = self
            .exec(args)
            .await
            .map_err(|e| CleanupError::InventoryUnavailable(e.to_string()))?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(CleanupError::InventoryUnavailable(format!(
                "`{}` exited with {}: {}",
                self.display_command(args),
                output.status,
                command_output_tail(&output.stdout, &output.stderr)
            )))
        }
    }

    async fn inventory_v2(&self) -> CleanupResult<Vec<InventoryEntry>> {
        let output = self.query(&["list", "*:*", "--format=json"]).await?;
        search::parse_list_json(&String::from_utf8_lossy(&output.stdout))
    }

    async fn inventory_v1(&self) -> CleanupResult<Vec<InventoryEntry>> {
        let result_file = SearchResultFile::new();
        let json_path = result_file.path_str();

        self.query(&["search", "-j", &json_path]).await?;
        let recipes = search::parse_search_recipes(&result_file.read().await?)?;
        debug!("Conan reports {} recipes", recipes.len());

        let mut entries = Vec::new();
        for cache_ref in &recipes {
            let pattern = v1_recipe_arg(cache_ref);
            self.query(&["search", &pattern, "-j", &json_path]).await?;
            entries.extend(search::search_entries(cache_ref, &result_file.read().await?)?);
        }
        Ok(entries)
    }

    /// Arguments removing exactly `entry` from the cache
    pub fn remove_args(&self, entry: &InventoryEntry) -> Vec<String> {
        let package_id = entry.reference.package_id.as_deref();
        match (self.api, package_id) {
            (ConanApi::V2, Some(id)) => vec![
                "remove".to_string(),
                format!("{}#*:{}", entry.cache_ref, id),
                "-c".to_string(),
            ],
            (ConanApi::V2, None) => vec![
                "remove".to_string(),
                entry.cache_ref.clone(),
                "-c".to_string(),
            ],
            (ConanApi::V1, Some(id)) => vec![
                "remove".to_string(),
                v1_recipe_arg(&entry.cache_ref),
                "-p".to_string(),
                id.to_string(),
                "-f".to_string(),
            ],
            (ConanApi::V1, None) => vec![
                "remove".to_string(),
                v1_recipe_arg(&entry.cache_ref),
                "-f".to_string(),
            ],
        }
    }
}

#[async_trait]
impl PackageCache for ConanCli {
    async fn inventory(&self) -> CleanupResult<Vec<InventoryEntry>> {
        info!("Querying {} cache inventory", self.api);
        let entries = match self.api {
            ConanApi::V2 => self.inventory_v2().await?,
            ConanApi::V1 => self.inventory_v1().await?,
        };
        info!("Cache holds {} entries", entries.len());
        Ok(entries)
    }

    async fn remove(&self, entry: &InventoryEntry) -> CleanupResult<()> {
        let args = self.remove_args(entry);
        let args_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self
            .exec(&args_refs)
            .await
            .map_err(|e| CleanupError::RemovalFailed {
                reference: entry.to_string(),
                detail: e.to_string(),
            })?;

        if output.status.success() {
            debug!("Removed {}", entry);
            Ok(())
        } else {
            Err(CleanupError::RemovalFailed {
                reference: entry.to_string(),
                detail: format!(
                    "exit {}: {}",
                    output.status,
                    command_output_tail(&output.stdout, &output.stderr)
                ),
            })
        }
    }

    fn name(&self) -> &'static str {
        match self.api {
            ConanApi::V1 => "Conan 1.x",
            ConanApi::V2 => "Conan 2.x",
        }
    }
}

/// Conan 1 needs a trailing `@` to read `name/version` as a reference
/// rather than a search pattern
fn v1_recipe_arg(cache_ref: &str) -> String {
    if cache_ref.contains('@') {
        cache_ref.to_string()
    } else {
        format!("{}@", cache_ref)
    }
}

/// Temporary JSON file conan 1 writes search results to
///
/// Removed on drop, whether or not the query succeeded.
struct SearchResultFile {
    path: PathBuf,
}

impl SearchResultFile {
    fn new() -> Self {
        let path =
            std::env::temp_dir().join(format!("conan-cleanup-search-{}.json", Uuid::new_v4()));
        Self { path }
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    async fn read(&self) -> CleanupResult<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CleanupError::InventoryUnavailable(format!(
                "reading conan search result {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for SearchResultFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove temporary file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(api: ConanApi) -> ConanCli {
        ConanCli::new(&ConanConfig {
            api,
            ..ConanConfig::default()
        })
    }

    fn entry(reference: &str) -> InventoryEntry {
        InventoryEntry::new(reference.parse().unwrap())
    }

    #[test]
    fn v2_remove_args() {
        let conan = cli(ConanApi::V2);
        assert_eq!(
            conan.remove_args(&entry("zlib/1.2.11:abc")),
            vec!["remove", "zlib/1.2.11#*:abc", "-c"]
        );
        assert_eq!(
            conan.remove_args(&entry("fmt/9.1.0@acme/stable")),
            vec!["remove", "fmt/9.1.0@acme/stable", "-c"]
        );
    }

    #[test]
    fn v1_remove_args() {
        let conan = cli(ConanApi::V1);
        assert_eq!(
            conan.remove_args(&entry("zlib/1.2.11:abc")),
            vec!["remove", "zlib/1.2.11@", "-p", "abc", "-f"]
        );
        assert_eq!(
            conan.remove_args(&entry("boost/1.70.0@conan/stable")),
            vec!["remove", "boost/1.70.0@conan/stable", "-f"]
        );
    }

    #[test]
    fn backend_name() {
        assert_eq!(cli(ConanApi::V1).name(), "Conan 1.x");
        assert_eq!(cli(ConanApi::V2).name(), "Conan 2.x");
    }

    #[test]
    fn search_result_file_is_removed_on_drop() {
        let file = SearchResultFile::new();
        let path = file.path.clone();
        std::fs::write(&path, "{}").unwrap();
        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_binary_is_inventory_unavailable() {
        let conan = ConanCli::new(&ConanConfig {
            binary: "/nonexistent/conan-cleanup-test/conan".to_string(),
            ..ConanConfig::default()
        });
        let err = conan.inventory().await.unwrap_err();
        assert!(matches!(err, CleanupError::InventoryUnavailable(_)));
    }

    #[tokio::test]
    async fn missing_binary_fails_removal() {
        let conan = ConanCli::new(&ConanConfig {
            binary: "/nonexistent/conan-cleanup-test/conan".to_string(),
            ..ConanConfig::default()
        });
        let err = conan.remove(&entry("zlib/1.2.11:abc")).await.unwrap_err();
        assert!(matches!(err, CleanupError::RemovalFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let conan = ConanCli {
            binary: "sleep".to_string(),
            api: ConanApi::V2,
            timeout: Duration::from_millis(100),
        };
        let err = conan.exec(&["5"]).await.unwrap_err();
        assert!(matches!(err, CleanupError::CommandTimeout { .. }));
    }
}
