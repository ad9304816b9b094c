use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const OLD: &str = "Pasal 1 Ketentuan umum.\nPasal 2 Berlaku sejak diundangkan.";
const NEW: &str = "Pasal 1 Ketentuan umum. Pasal 2 Berlaku sejak ditetapkan. Pasal 3 Ketentuan baru.";

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_regcompare"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("binary runs")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

fn audit_lines(dir: &Path) -> usize {
    fs::read_to_string(dir.join("store/audit.jsonl"))
        .map(|s| s.lines().filter(|l| !l.trim().is_empty()).count())
        .unwrap_or(0)
}

fn sources(dir: &Path) {
    fs::write(dir.join("old.txt"), OLD).unwrap();
    fs::write(dir.join("new.txt"), NEW).unwrap();
}

#[test]
fn compare_then_duplicate_then_show_and_delete() {
    let td = tempfile::tempdir().unwrap();
    let dir = td.path();
    sources(dir);

    let out = run(dir, &["compare", "--title", "PP 5", "--store", "store", "old.txt", "new.txt"]);
    assert_eq!(out.status.code(), Some(0));
    let created = stdout_json(&out);
    assert_eq!(created["message"], "Comparison created successfully");
    assert_eq!(created["data"]["summary"], serde_json::json!({"added": 1, "removed": 0, "modified": 1}));
    assert_eq!(created["data"]["meta"]["old_title"], "old.txt");
    let uuid = created["data"]["uuid"].as_str().unwrap().to_string();
    assert_eq!(audit_lines(dir), 1);

    let out = run(dir, &["compare", "--title", "PP 5 lagi", "--store", "store", "old.txt", "new.txt"]);
    assert_eq!(out.status.code(), Some(4));
    let dup = stdout_json(&out);
    assert_eq!(dup["message"], "Comparison for these sources already exists");
    assert_eq!(dup["data"], serde_json::json!({"uuid": uuid, "title": "PP 5"}));
    assert_eq!(audit_lines(dir), 2);

    let out = run(dir, &["show", "--store", "store", &uuid]);
    assert_eq!(out.status.code(), Some(0));
    let shown = stdout_json(&out);
    assert_eq!(shown["title"], "PP 5");
    assert_eq!(shown["changes"][1]["status"], "added");

    let out = run(dir, &["delete", "--store", "store", &uuid]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_json(&out)["uuid"], uuid.as_str());

    let out = run(dir, &["show", "--store", "store", &uuid]);
    assert_eq!(out.status.code(), Some(5));
    assert_eq!(stdout_json(&out)["message"], "Data not found");
}

#[test]
fn show_unknown_uuid_is_not_found() {
    let td = tempfile::tempdir().unwrap();
    let unknown = uuid::Uuid::new_v4().to_string();
    let out = run(td.path(), &["show", "--store", "store", &unknown]);
    assert_eq!(out.status.code(), Some(5));
    assert_eq!(stdout_json(&out)["message"], "Data not found");
}

#[test]
fn compare_without_title_is_a_usage_error() {
    let td = tempfile::tempdir().unwrap();
    sources(td.path());
    let out = run(td.path(), &["compare", "--store", "store", "old.txt", "new.txt"]);
    assert_eq!(out.status.code(), Some(64));
    assert!(out.stdout.is_empty());
    assert_eq!(audit_lines(td.path()), 0);
}

#[test]
fn failed_compare_is_still_audited() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("old.txt"), OLD).unwrap();
    let out = run(td.path(), &["compare", "--title", "PP 5", "--store", "store", "old.txt", "missing.txt"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(audit_lines(td.path()), 1);
    let line = fs::read_to_string(td.path().join("store/audit.jsonl")).unwrap();
    let entry: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(entry["status"], 1);
    assert_eq!(entry["command"], "compare");
}

#[test]
fn diff_prints_meta_summary_and_changes() {
    let td = tempfile::tempdir().unwrap();
    sources(td.path());
    let out = run(td.path(), &["diff", "old.txt", "new.txt"]);
    assert_eq!(out.status.code(), Some(0));
    let v = stdout_json(&out);
    assert_eq!(v["meta"], serde_json::json!({"old_title": "old.txt", "new_title": "new.txt"}));
    assert_eq!(v["summary"]["modified"], 1);
    assert_eq!(v["changes"][0]["pasal"], "Pasal 2");
    assert!(!td.path().join("comparisons").exists());
}

#[test]
fn pdf_sources_without_pdftotext_exit_with_deps_code() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("old.pdf"), b"%PDF-1.4\n").unwrap();
    fs::write(td.path().join("new.pdf"), b"%PDF-1.4\n").unwrap();
    let empty = td.path().join("empty-bin");
    fs::create_dir_all(&empty).unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_regcompare"))
        .current_dir(td.path())
        .env("PATH", &empty)
        .args(["diff", "old.pdf", "new.pdf"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn config_and_store_failures_have_their_own_codes() {
    let td = tempfile::tempdir().unwrap();
    let out = run(td.path(), &["list", "--config", "missing.yaml"]);
    assert_eq!(out.status.code(), Some(3));

    fs::write(td.path().join("blocked"), b"file, not a directory").unwrap();
    let out = run(td.path(), &["list", "--store", "blocked"]);
    assert_eq!(out.status.code(), Some(6));

    let out = run(td.path(), &["frobnicate"]);
    assert_eq!(out.status.code(), Some(64));
}
