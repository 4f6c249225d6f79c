//! End-to-end tests driving the `spark` binary.

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

struct Workspace {
    project: TempDir,
    data: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            project: TempDir::new().unwrap(),
            data: TempDir::new().unwrap(),
        }
    }

    fn db(&self) -> std::path::PathBuf {
        self.data.path().join("spark_store.db")
    }

    fn spark_in(&self, dir: &Path, args: &[&str]) -> std::process::Output {
        Command::cargo_bin("spark")
            .unwrap()
            .current_dir(dir)
            .env_remove("RUST_LOG")
            .env_remove("SPARK_DB")
            .arg("--no-color")
            .arg("--db")
            .arg(self.db())
            .args(args)
            .output()
            .unwrap()
    }

    fn spark(&self, args: &[&str]) -> std::process::Output {
        self.spark_in(self.project.path(), args)
    }

    fn init(&self) {
        let out = self.spark(&[
            "init",
            "--project-name",
            "My Cool App!!",
            "--default-collection",
            "general",
        ]);
        assert!(out.status.success(), "init failed: {}", stderr(&out));
    }
}

fn stdout(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

#[test]
fn test_capture_and_list_scenario() {
    let ws = Workspace::new();
    ws.init();

    let config = std::fs::read_to_string(ws.project.path().join(".spark")).unwrap();
    assert!(config.contains("project_name: my cool app"));

    let out = ws.spark(&["add", "refactor the parser"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("✓ Spark #1 added successfully"));

    let out = ws.spark(&["list"]);
    assert!(stdout(&out).contains("1: refactor the parser ["));

    let out = ws.spark(&["collections"]);
    assert!(stdout(&out).contains("general (1 sparks)"));

    let out = ws.spark(&["contexts"]);
    assert!(stdout(&out).contains("my cool app"));
}

#[test]
fn test_init_failure_aborts() {
    let ws = Workspace::new();
    let out = ws.spark(&["init", "--project-name", "!!", "--default-collection", "general"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("✗ Project name must be at least 3"));
    assert!(!ws.project.path().join(".spark").exists());

    let out = ws.spark(&["init", "--project-name", "my app", "--default-collection", "help"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("reserved"));
}

#[test]
fn test_init_prompts_for_missing_values() {
    let ws = Workspace::new();
    let out = Command::cargo_bin("spark")
        .unwrap()
        .current_dir(ws.project.path())
        .arg("--no-color")
        .arg("--db")
        .arg(ws.db())
        .arg("init")
        .write_stdin("Prompted Project\n\n")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", stderr(&out));

    let config = std::fs::read_to_string(ws.project.path().join(".spark")).unwrap();
    assert!(config.contains("project_name: prompted project"));
    assert!(config.contains("default_collection: general"));
}

#[test]
fn test_db_location_from_env() {
    let ws = Workspace::new();
    let db = ws.data.path().join("from_env.db");
    let out = Command::cargo_bin("spark")
        .unwrap()
        .current_dir(ws.project.path())
        .env("SPARK_DB", &db)
        .args(["--no-color", "collections"])
        .output()
        .unwrap();

    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("No collections found"));
    assert!(db.exists());
}

#[test]
fn test_missing_config_is_reported_not_fatal() {
    let ws = Workspace::new();
    let out = ws.spark(&["add", "no project here"]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("Run 'spark init' first"));
}

#[test]
fn test_edit_show_delete() {
    let ws = Workspace::new();
    ws.init();
    ws.spark(&["add", "first draft", "-c", "drafts"]);

    let out = ws.spark(&["edit", "1", "second draft"]);
    assert!(stdout(&out).contains("✓ Spark #1 updated"));

    let out = ws.spark(&["show", "1"]);
    let text = stdout(&out);
    assert!(text.contains("ID: 1"));
    assert!(text.contains("Content: second draft"));
    assert!(text.contains("Collections: drafts"));

    let out = ws.spark(&["delete", "1"]);
    assert!(stdout(&out).contains("✓ Spark #1 deleted"));

    let out = ws.spark(&["show", "1"]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("Spark with ID 1 not found"));

    let out = ws.spark(&["delete", "1"]);
    assert!(stderr(&out).contains("Spark with ID 1 not found"));

    let out = ws.spark(&["edit", "1", "ghost"]);
    assert!(stderr(&out).contains("Spark with ID 1 not found"));
}

#[test]
fn test_search_is_case_insensitive() {
    let ws = Workspace::new();
    ws.init();
    ws.spark(&["add", "Fix the ABC importer"]);
    ws.spark(&["add", "unrelated thought"]);

    let out = ws.spark(&["search", "abc"]);
    let text = stdout(&out);
    assert!(text.contains("1: Fix the ABC importer"));
    assert!(!text.contains("unrelated"));

    let out = ws.spark(&["search", "zzz"]);
    assert!(stdout(&out).contains("No sparks found for 'zzz'"));
}

#[test]
fn test_list_filters() {
    let ws = Workspace::new();
    ws.init();
    ws.spark(&["add", "general idea"]);
    ws.spark(&["add", "bug idea", "--collection", "bugs"]);

    let out = ws.spark(&["list", "-c", "bugs"]);
    let text = stdout(&out);
    assert!(text.contains("bug idea"));
    assert!(!text.contains("general idea"));

    let out = ws.spark(&["list", "--today"]);
    assert!(stdout(&out).contains("general idea"));

    let elsewhere = TempDir::new().unwrap();
    let project = ws.project.path().to_string_lossy().to_string();
    let out = ws.spark_in(elsewhere.path(), &["list", "--context", &project]);
    assert!(stdout(&out).contains("bug idea"));

    let out = ws.spark(&["list", "-c", "missing"]);
    assert!(stderr(&out).contains("Collection 'missing' not found"));
}

#[test]
fn test_collections_actions() {
    let ws = Workspace::new();
    ws.init();
    ws.spark(&["add", "idea"]);

    let out = ws.spark(&["collections", "create", "Later"]);
    assert!(stdout(&out).contains("✓ Collection 'later' created"));

    let out = ws.spark(&["collections", "add", "later", "1"]);
    assert!(stdout(&out).contains("✓ Spark #1 added to 'later'"));
    ws.spark(&["collections", "add", "later", "1"]);

    let out = ws.spark(&["collections"]);
    let text = stdout(&out);
    assert!(text.contains("general (1 sparks)"));
    assert!(text.contains("later (1 sparks)"));

    let out = ws.spark(&["collections", "add", "later"]);
    assert!(stderr(&out).contains("Use: collections"));

    let out = ws.spark(&["collections", "rename", "later"]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("✗ Invalid argument: Unknown action 'rename'"));

    let out = ws.spark(&["collections", "remove", "later", "1"]);
    assert!(stdout(&out).contains("removed from 'later'"));

    let out = ws.spark(&["collections", "delete", "later"]);
    assert!(stdout(&out).contains("Collection 'later' deleted"));
}

#[test]
fn test_json_list_output() {
    let ws = Workspace::new();
    ws.init();
    ws.spark(&["add", "structured"]);

    let out = ws.spark(&["--json", "list"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["count"], 1);
    assert_eq!(value["sparks"][0]["content"], "structured");
}

#[test]
fn test_completions_generate() {
    let ws = Workspace::new();
    let out = ws.spark(&["completions", "bash"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("spark"));
}
