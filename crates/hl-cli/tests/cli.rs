//! End-to-end tests for the `hl` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAGE: &str = "<html><head><title>Story</title></head><body>\
<p>Reading faster</p><code>keep_me</code></body></html>";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("page.html"), PAGE).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn store(&self) -> PathBuf {
        self.path("lists.json")
    }

    fn hl(&self) -> Command {
        let mut cmd = Command::cargo_bin("hl").unwrap();
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("XDG_DATA_HOME", self.dir.path())
            .env("NO_COLOR", "1")
            .env_remove("HL_CONFIG")
            .env_remove("HL_STORE")
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.store());
        cmd
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_render_allowlisted_page() {
    let ws = Workspace::new();
    ws.hl()
        .args(["render", "page.html", "--url", "https://medium.com/@someone/story"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<p><span class=\"hl-processed\"><span class=\"hl-bold\">Rea</span>ding \
             <span class=\"hl-bold\">fas</span>ter</span></p>",
        ))
        .stdout(predicate::str::contains("<code>keep_me</code>"))
        .stdout(predicate::str::contains("hl-first-letters-style"));
}

#[test]
fn test_render_blocked_page_unchanged() {
    let ws = Workspace::new();
    ws.hl()
        .args(["render", "page.html", "--host", "www.chase.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>Reading faster</p>"))
        .stdout(predicate::str::contains("hl-processed").not())
        .stderr(predicate::str::contains("blocklisted"));
}

#[test]
fn test_render_then_revert_round_trip() {
    let ws = Workspace::new();
    ws.hl()
        .args(["render", "page.html", "--host", "reddit.com", "-o", "out.html"])
        .assert()
        .success();
    assert!(read(&ws.path("out.html")).contains("hl-bold"));

    ws.hl()
        .args(["revert", "out.html", "--strip-style"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>Reading faster</p>"))
        .stdout(predicate::str::contains("hl-").not());
}

#[test]
fn test_policy_allow_then_check() {
    let ws = Workspace::new();
    ws.hl()
        .args(["policy", "allow", "https://Example.org/news"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added example.org to the allowlist"));

    ws.hl()
        .args(["policy", "check", "blog.example.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is allowed"));

    ws.hl()
        .args(["policy", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"example.org\""));

    assert!(read(&ws.store()).contains("example.org"));
}

#[test]
fn test_allowing_blocked_site_is_declined_without_terminal() {
    let ws = Workspace::new();
    ws.hl()
        .args(["policy", "allow", "monzo.com"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("monzo.com stays on the blocklist"));

    ws.hl()
        .args(["policy", "check", "monzo.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is blocked"));

    ws.hl()
        .args(["policy", "allow", "monzo.com", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moved monzo.com off the blocklist"));

    ws.hl()
        .args(["policy", "check", "monzo.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is allowed"));
}

#[test]
fn test_block_evicts_from_allowlist() {
    let ws = Workspace::new();
    ws.hl()
        .args(["policy", "block", "medium.com"])
        .assert()
        .success();

    ws.hl()
        .args(["render", "page.html", "--host", "medium.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hl-processed").not());
}

#[test]
fn test_export_and_edit_lists() {
    let ws = Workspace::new();
    ws.hl()
        .args(["policy", "export", "--allow-file", "allow.txt", "--block-file", "block.txt"])
        .assert()
        .success();
    assert!(read(&ws.path("allow.txt")).contains("medium.com"));

    std::fs::write(ws.path("allow.txt"), "# mine\nexample.net\n").unwrap();
    std::fs::write(ws.path("block.txt"), "bank.example\n").unwrap();

    ws.hl()
        .args(["policy", "edit", "--allow-file", "allow.txt", "--block-file", "block.txt"])
        .write_stdin("")
        .assert()
        .success();

    ws.hl()
        .args(["policy", "check", "medium.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not on the allowlist"));
}

#[test]
fn test_session_messages_over_stdin() {
    let ws = Workspace::new();
    ws.hl()
        .args(["session", "page.html", "--host", "medium.com"])
        .write_stdin(
            "{\"type\":\"STATE\"}\n\
             {\"type\":\"TOGGLE\"}\n\
             {\"type\":\"STATE\"}\n\
             not json\n\
             {\"type\":\"DUMP\"}\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "{\"enabled\":true}\n{\"enabled\":false}\n{\"enabled\":false}\n{\"html\":",
        ))
        .stdout(predicate::str::contains("hl-processed").not());
}

#[test]
fn test_config_generate_and_validate() {
    let ws = Workspace::new();
    ws.hl().args(["config", "generate"]).assert().success();
    assert!(read(&ws.path("hl.toml")).contains("debounce_ms = 150"));

    ws.hl()
        .args(["config", "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    ws.hl()
        .args(["config", "validate", "hl.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));

    std::fs::write(ws.path("bad.toml"), "[pipeline]\ndebounce_ms = 0\n").unwrap();
    ws.hl()
        .args(["config", "validate", "bad.toml"])
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    let ws = Workspace::new();
    ws.hl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hl"));
}
