//! Integration tests for conan-cleanup

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn conan_cleanup() -> Command {
        let mut cmd = cargo_bin_cmd!("conan-cleanup");
        cmd.env_remove("CONAN_CLEANUP_CONFIG");
        cmd
    }

    /// Config with the removal journal off and the given conan binary
    fn write_config(dir: &Path, binary: &str) -> PathBuf {
        let path = dir.join("config.toml");
        let content = format!(
            "[general]\nremoval_log = false\n\n[conan]\nbinary = \"{}\"\ntimeout_secs = 10\n",
            binary
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    fn write_descriptor(root: &Path, project: &str, content: &str) {
        let dir = root.join(project).join("build");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("conaninfo.txt"), content).unwrap();
    }

    #[test]
    fn help_displays() {
        conan_cleanup()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("remove Conan packages no project uses"));
    }

    #[test]
    fn version_displays() {
        conan_cleanup()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("conan-cleanup"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        conan_cleanup()
            .args(["--config", path.to_str().unwrap(), "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        conan_cleanup()
            .args(["--config", path.to_str().unwrap(), "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[conan]"))
            .stdout(predicate::str::contains("conaninfo.txt"));
    }

    #[test]
    fn config_init_replaces_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[conan]\napi = \"v9\"\n").unwrap();

        conan_cleanup()
            .args(["--config", path.to_str().unwrap(), "config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));

        conan_cleanup()
            .args(["--config", path.to_str().unwrap(), "config", "init", "--force"])
            .assert()
            .success();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("api = \"v2\""));
    }

    #[test]
    fn clean_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "conan");
        conan_cleanup()
            .args(["--config", config.to_str().unwrap(), "clean"])
            .arg(dir.path().join("nope"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn clean_without_conan_is_fatal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("projects");
        write_descriptor(&root, "app", "[full_requires]\n    zlib/1.2.11:abc123\n");
        let config = write_config(dir.path(), "/nonexistent/conan-cleanup-test/conan");

        conan_cleanup()
            .args(["--config", config.to_str().unwrap(), "clean", "--auto"])
            .arg(&root)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Cache inventory unavailable"));
    }

    #[test]
    fn used_lists_references() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("projects");
        write_descriptor(
            &root,
            "app",
            "[settings]\n    os=Linux\n\n[full_requires]\n    zlib/1.2.11:abc123\n    fmt/9.1.0@acme/stable:f00\n",
        );
        write_descriptor(&root, "broken", "[full_requires]\n    zlib\n");
        let config = write_config(dir.path(), "conan");

        conan_cleanup()
            .args(["--config", config.to_str().unwrap(), "used", "--format", "plain"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("zlib/1.2.11:abc123"))
            .stdout(predicate::str::contains("fmt/9.1.0@acme/stable:f00"))
            .stdout(predicate::str::contains("os=Linux").not());
    }

    #[test]
    fn used_json_reports_skipped_descriptor() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("projects");
        write_descriptor(&root, "app", "zlib/1.2.11\n");
        write_descriptor(&root, "broken", "zlib\n");
        let config = write_config(dir.path(), "conan");

        let output = conan_cleanup()
            .args(["--config", config.to_str().unwrap(), "used", "--format", "json"])
            .arg(&root)
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["scanned"], 1);
        assert_eq!(json["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(json["used"][0]["reference"], "zlib/1.2.11");
    }

    #[cfg(unix)]
    mod fake_conan {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        const LIST_OUTPUT: &str = r#"{"Local Cache": {
  "zlib/1.2.11": {"revisions": {"r1": {"packages": {"abc123": {}}}}},
  "zlib/1.2.8": {"revisions": {"r2": {"packages": {"def456": {}}}}},
  "boost/1.81.0": {"revisions": {"r3": {"packages": {"b00": {}}}}}
}}"#;

        /// A `conan` stand-in: `list` prints a fixed cache, `remove` logs its
        /// pattern and fails for patterns containing `$FAIL_ON`
        fn fake_conan(dir: &Path) -> PathBuf {
            let path = dir.join("conan");
            let script = format!(
                r#"#!/bin/sh
case "$1" in
  list)
    cat <<'JSON'
{}
JSON
    ;;
  remove)
    echo "$2" >> "$FAKE_CONAN_LOG"
    if [ -n "$FAIL_ON" ]; then
      case "$2" in
        *"$FAIL_ON"*) echo "ERROR: package is locked" >&2; exit 1 ;;
      esac
    fi
    ;;
  *)
    exit 2
    ;;
esac
"#,
                LIST_OUTPUT
            );
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        struct Fixture {
            dir: TempDir,
            root: PathBuf,
            config: PathBuf,
        }

        impl Fixture {
            fn new() -> Self {
                let dir = TempDir::new().unwrap();
                let root = dir.path().join("projects");
                write_descriptor(&root, "app", "[full_requires]\n    zlib/1.2.11\n");
                write_descriptor(&root, "tool", "[full_requires]\n    boost/1.81.0:b00\n");
                let conan = fake_conan(dir.path());
                let config = write_config(dir.path(), conan.to_str().unwrap());
                Self { dir, root, config }
            }

            fn log(&self) -> PathBuf {
                self.dir.path().join("removals.txt")
            }

            fn removals(&self) -> Vec<String> {
                std::fs::read_to_string(self.log())
                    .unwrap_or_default()
                    .lines()
                    .map(str::to_string)
                    .collect()
            }

            fn clean(&self) -> Command {
                let mut cmd = conan_cleanup();
                cmd.env("FAKE_CONAN_LOG", self.log())
                    .args(["--config", self.config.to_str().unwrap(), "clean"])
                    .arg(&self.root);
                cmd
            }
        }

        #[test]
        fn inventory_lists_cache() {
            let fixture = Fixture::new();
            conan_cleanup()
                .args([
                    "--config",
                    fixture.config.to_str().unwrap(),
                    "inventory",
                    "--format",
                    "plain",
                ])
                .assert()
                .success()
                .stdout(predicate::str::contains("boost/1.81.0:b00"))
                .stdout(predicate::str::contains("zlib/1.2.8:def456"));
        }

        #[test]
        fn auto_removes_orphan_and_empty_recipe() {
            let fixture = Fixture::new();

            fixture
                .clean()
                .args(["--auto", "--format", "plain"])
                .assert()
                .success()
                .stdout(predicate::str::contains("removed\tzlib/1.2.8:def456"))
                .stdout(predicate::str::contains("removed\tzlib/1.2.8\n"))
                .stdout(predicate::str::contains("zlib/1.2.11").not());

            assert_eq!(
                fixture.removals(),
                vec!["zlib/1.2.8#*:def456", "zlib/1.2.8"]
            );
        }

        #[test]
        fn keep_empty_recipes() {
            let fixture = Fixture::new();

            fixture
                .clean()
                .args(["--auto", "--keep-empty-recipes", "--format", "plain"])
                .assert()
                .success();

            assert_eq!(fixture.removals(), vec!["zlib/1.2.8#*:def456"]);
        }

        #[test]
        fn failed_removal_exits_with_two() {
            let fixture = Fixture::new();

            let output = fixture
                .clean()
                .env("FAIL_ON", "def456")
                .args(["--auto", "--format", "json"])
                .output()
                .unwrap();

            assert_eq!(output.status.code(), Some(2));
            let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
            assert_eq!(json["counts"]["failed"], 1);
            assert_eq!(json["candidates"][0]["disposition"]["state"], "failed");
            assert!(json["candidates"][0]["disposition"]["detail"]
                .as_str()
                .unwrap()
                .contains("package is locked"));
            assert!(json["pruned"].as_array().unwrap().is_empty());
        }

        #[test]
        fn unreadable_project_is_listed_as_skipped() {
            let fixture = Fixture::new();
            std::os::unix::fs::symlink(
                fixture.dir.path().join("gone"),
                fixture.root.join("moved"),
            )
            .unwrap();

            let output = fixture
                .clean()
                .args(["--dry-run", "--format", "json"])
                .output()
                .unwrap();

            assert!(output.status.success());
            let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
            let skipped = json["skipped_descriptors"].as_array().unwrap();
            assert_eq!(skipped.len(), 1);
            assert!(skipped[0]["path"].as_str().unwrap().ends_with("moved"));
        }

        #[test]
        fn dry_run_removes_nothing() {
            let fixture = Fixture::new();

            let output = fixture
                .clean()
                .args(["--dry-run", "--format", "json"])
                .output()
                .unwrap();

            assert!(output.status.success());
            let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
            assert_eq!(json["dry_run"], true);
            assert_eq!(json["counts"]["pending"], 1);
            assert_eq!(json["candidates"][0]["name"], "zlib");
            assert_eq!(json["candidates"][0]["version"], "1.2.8");
            assert!(fixture.removals().is_empty());
        }

        #[test]
        fn interactive_answers_from_stdin() {
            let fixture = Fixture::new();

            // Only zlib/1.2.8:def456 is orphaned; the prune prompt then hits end of input
            fixture
                .clean()
                .args(["--format", "plain"])
                .write_stdin("y\n")
                .assert()
                .success()
                .stdout(predicate::str::contains("removed\tzlib/1.2.8:def456"))
                .stdout(predicate::str::contains("skipped\tzlib/1.2.8\n"));

            assert_eq!(fixture.removals(), vec!["zlib/1.2.8#*:def456"]);
        }

        #[test]
        fn interactive_prune_takes_one_answer() {
            let fixture = Fixture::new();

            // One answer for the orphan, one for the emptied recipe group
            fixture
                .clean()
                .args(["--format", "plain"])
                .write_stdin("y\ny\n")
                .assert()
                .success()
                .stdout(predicate::str::contains("removed\tzlib/1.2.8:def456"))
                .stdout(predicate::str::contains("removed\tzlib/1.2.8\n"));

            assert_eq!(
                fixture.removals(),
                vec!["zlib/1.2.8#*:def456", "zlib/1.2.8"]
            );
        }

        #[test]
        fn interactive_end_of_input_aborts() {
            let fixture = Fixture::new();

            fixture
                .clean()
                .args(["--format", "plain"])
                .write_stdin("")
                .assert()
                .success()
                .stdout(predicate::str::contains("skipped\tzlib/1.2.8:def456"));

            assert!(fixture.removals().is_empty());
        }
    }
}
