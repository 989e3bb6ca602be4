//! End-to-end tests for the gallery-sync binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Workspace with an isolated config file and a small source gallery.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "config.toml", "[sync]\nconcurrency = 2\n");
        write(root, "source/summer/beach.jpg", "beach");
        write(root, "source/summer/dunes.png", "dunes");
        write(root, "source/summer/album.yml", "name: Summer\nrank: 1\n");
        write(root, "source/winter/snow.jpg", "snow");
        std::fs::create_dir_all(root.join("source/empty")).unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> std::path::PathBuf {
        self.dir.path().join(rel)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("gallery-sync").unwrap();
        cmd.env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.path("config.toml"));
        cmd
    }
}

// ===========================================
// Help
// ===========================================

#[test]
fn help_lists_commands() {
    Command::cargo_bin("gallery-sync")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("init-config"));
}

// ===========================================
// list
// ===========================================

#[test]
fn list_shows_albums_with_photos() {
    let fx = Fixture::new();

    fx.cmd()
        .arg("list")
        .arg(fx.path("source"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Summer"))
        .stdout(predicate::str::contains("winter"))
        .stdout(predicate::str::contains("empty").not())
        .stdout(predicate::str::contains("2 albums, 3 photos"));
}

#[test]
fn list_json_is_ordered_by_rank() {
    let fx = Fixture::new();

    let output = fx
        .cmd()
        .args(["list", "--json"])
        .arg(fx.path("source"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let albums: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(albums[0]["id"], "summer");
    assert_eq!(albums[0]["photos"], 2);
    assert_eq!(albums[1]["id"], "winter");
}

#[test]
fn list_rejects_malformed_metadata() {
    let fx = Fixture::new();
    write(fx.dir.path(), "source/winter/album.yml", "date_from: last year\n");

    fx.cmd()
        .arg("list")
        .arg(fx.path("source"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("date_from"));
}

// ===========================================
// diff
// ===========================================

#[test]
fn diff_does_not_touch_target() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.path("target")).unwrap();

    fx.cmd()
        .arg("diff")
        .arg("--source")
        .arg(fx.path("source"))
        .arg("--target")
        .arg(fx.path("target"))
        .assert()
        .success()
        .stdout(predicate::str::contains("add album summer"))
        .stdout(predicate::str::contains("add album winter"));

    assert!(!fx.path("target/summer").exists());
}

#[test]
fn diff_json_lists_operations() {
    let fx = Fixture::new();
    write(fx.dir.path(), "target/winter/snow.jpg", "snow");
    write(fx.dir.path(), "target/winter/ice.jpg", "ice");

    let output = fx
        .cmd()
        .args(["diff", "--json", "--source"])
        .arg(fx.path("source"))
        .arg("--target")
        .arg(fx.path("target"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ops: Vec<&str> = plan["operations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops, vec!["add_album", "delete_photo"]);
}

// ===========================================
// sync
// ===========================================

#[test]
fn sync_copies_gallery_and_is_idempotent() {
    let fx = Fixture::new();
    write(fx.dir.path(), "target/stale/old.jpg", "old");

    fx.cmd()
        .arg("sync")
        .arg("--source")
        .arg(fx.path("source"))
        .arg("--target")
        .arg(fx.path("target"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 applied, 0 failed, 0 skipped"));

    assert_eq!(
        std::fs::read_to_string(fx.path("target/summer/beach.jpg")).unwrap(),
        "beach"
    );
    let metadata = std::fs::read_to_string(fx.path("target/summer/album.yml")).unwrap();
    assert!(metadata.contains("Summer"));
    assert!(!fx.path("target/stale").exists());

    fx.cmd()
        .arg("sync")
        .arg("--source")
        .arg(fx.path("source"))
        .arg("--target")
        .arg(fx.path("target"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 applied"));
}

#[test]
fn sync_accepts_flag_overrides() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["sync", "--concurrency", "1", "--best-effort", "--timeout", "60"])
        .arg("--source")
        .arg(fx.path("source"))
        .arg("--target")
        .arg(fx.path("new/target"))
        .assert()
        .success();

    assert!(fx.path("new/target/winter/snow.jpg").exists());
}

#[test]
fn sync_fails_for_missing_source() {
    let fx = Fixture::new();

    fx.cmd()
        .arg("sync")
        .arg("--source")
        .arg(fx.path("nope"))
        .arg("--target")
        .arg(fx.path("target"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

// ===========================================
// Configuration
// ===========================================

#[test]
fn malformed_config_is_reported() {
    let fx = Fixture::new();
    write(fx.dir.path(), "config.toml", "[sync\n");

    fx.cmd()
        .arg("list")
        .arg(fx.path("source"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn init_config_writes_file_once() {
    let fx = Fixture::new();
    let path = fx.path("fresh/config.toml");

    Command::cargo_bin("gallery-sync")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("init-config")
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("concurrency = 4"));
    assert!(content.contains("error_policy = \"abort\""));

    Command::cargo_bin("gallery-sync")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    Command::cargo_bin("gallery-sync")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .args(["init-config", "--force"])
        .assert()
        .success();
}
