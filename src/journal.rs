//! Removal journal
//!
//! Appends one JSON line per removal attempt to
//! `~/.local/state/conan-cleanup/removals.log`, so a cache that shrank
//! unexpectedly can be traced back to the run that did it.

use crate::cleanup::{Disposition, OrphanCandidate};
use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File-based removal journal that appends JSON lines
pub struct RemovalJournal {
    enabled: bool,
    path: PathBuf,
}

impl RemovalJournal {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.removal_log,
            path: ConfigManager::removal_log_path(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Record the outcome of one removal attempt
    ///
    /// Only removed and failed candidates are journaled. Write failures are
    /// logged and otherwise ignored; they never fail the cleanup.
    pub async fn record(&self, candidate: &OrphanCandidate) {
        let event = match candidate.disposition() {
            Disposition::Removed => "package.removed",
            Disposition::Failed { .. } => "package.remove_failed",
            _ => return,
        };
        self.log(event, &serde_json::to_value(candidate).unwrap_or_default())
            .await;
    }

    async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize journal entry: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write removal journal {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::SkipReason;
    use crate::conan::InventoryEntry;
    use tempfile::TempDir;

    fn journal(dir: &TempDir, enabled: bool) -> RemovalJournal {
        RemovalJournal {
            enabled,
            path: dir.path().join("state").join("removals.log"),
        }
    }

    fn candidate(reference: &str) -> OrphanCandidate {
        OrphanCandidate::new(InventoryEntry::new(reference.parse().unwrap()))
    }

    #[tokio::test]
    async fn records_removed_package() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir, true);
        let mut c = candidate("zlib/1.2.8:def456");
        c.confirm();
        c.mark_removed();

        journal.record(&c).await;

        let content = tokio::fs::read_to_string(journal.path()).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["event"], "package.removed");
        assert_eq!(parsed["data"]["name"], "zlib");
        assert_eq!(parsed["data"]["package_id"], "def456");
        assert!(parsed["timestamp"].is_string());
    }

    #[tokio::test]
    async fn records_failure_detail() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir, true);
        let mut removed = candidate("a/1.0:x");
        removed.confirm();
        removed.mark_removed();
        let mut failed = candidate("b/1.0:y");
        failed.confirm();
        failed.mark_failed("locked");

        journal.record(&removed).await;
        journal.record(&failed).await;

        let content = tokio::fs::read_to_string(journal.path()).await.unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed["event"], "package.remove_failed");
        assert_eq!(parsed["data"]["disposition"]["detail"], "locked");
    }

    #[tokio::test]
    async fn ignores_skipped_candidates() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir, true);
        let mut c = candidate("a/1.0:x");
        c.skip(SkipReason::Declined);

        journal.record(&c).await;

        assert!(!journal.path().exists());
    }

    #[tokio::test]
    async fn skips_when_disabled() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir, false);
        let mut c = candidate("a/1.0:x");
        c.confirm();
        c.mark_removed();

        journal.record(&c).await;

        assert!(!journal.path().exists());
    }
}
