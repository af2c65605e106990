use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn smellmap() -> Command {
    Command::cargo_bin("smellmap").unwrap()
}

const MAGIC_SOURCE: &str = "a = 42\nb = 42\nc = 42\n";

#[test]
fn scan_reports_magic_numbers_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("magic.py");
    fs::write(&file, MAGIC_SOURCE).unwrap();

    let output = smellmap().arg("scan").arg(&file).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["total_smells_detected"], 1);
    assert_eq!(report["details"][0]["smell_type"], "MagicNumbers");
    assert_eq!(report["details"][0]["details"]["occurrences"], 3);
}

#[test]
fn scan_writes_to_a_file_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("magic.py");
    let out = dir.path().join("report.json");
    fs::write(&file, MAGIC_SOURCE).unwrap();

    smellmap()
        .arg("scan")
        .arg(&file)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["summary"]["severity_breakdown"]["medium"], 1);
}

#[test]
fn table_format_is_human_readable() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("magic.py");
    fs::write(&file, MAGIC_SOURCE).unwrap();

    smellmap()
        .arg("scan")
        .arg(&file)
        .args(["--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MagicNumbers"))
        .stdout(predicate::str::contains("Total: 1"));
}

#[test]
fn only_filter_limits_active_smells() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("magic.py");
    fs::write(&file, MAGIC_SOURCE).unwrap();

    let output = smellmap()
        .arg("scan")
        .arg(&file)
        .args(["--only", "LongMethod,GodClass"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["total_smells_detected"], 0);
    assert_eq!(
        report["metadata"]["active_smells"],
        serde_json::json!(["LongMethod", "GodClass"])
    );
}

#[test]
fn unknown_smell_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("magic.py");
    fs::write(&file, MAGIC_SOURCE).unwrap();

    smellmap()
        .arg("scan")
        .arg(&file)
        .args(["--only", "LongMethods"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LongMethods"));
}

#[test]
fn syntax_errors_fail_without_a_report_body() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.py");
    fs::write(&file, "def broken(:\n").unwrap();

    smellmap()
        .arg("scan")
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn invalid_threshold_in_config_is_a_precise_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("magic.py");
    let config = dir.path().join("bad.toml");
    fs::write(&file, MAGIC_SOURCE).unwrap();
    fs::write(&config, "[thresholds]\nduplication_similarity = 1.5\n").unwrap();

    smellmap()
        .arg("scan")
        .arg(&file)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplication_similarity"));
}

#[test]
fn init_config_round_trips_through_scan() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("smellmap.toml");
    let file = dir.path().join("magic.py");
    fs::write(&file, MAGIC_SOURCE).unwrap();

    smellmap()
        .arg("init-config")
        .arg("--output")
        .arg(&config)
        .assert()
        .success();
    smellmap()
        .arg("init-config")
        .arg("--output")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    smellmap()
        .arg("scan")
        .arg(&file)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn show_config_prints_defaults() {
    smellmap()
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("long_method_sloc = 30"))
        .stdout(predicate::str::contains("LongMethod = true"));
}

#[test]
fn scanning_two_files_combines_the_reports() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.py");
    let b = dir.path().join("b.py");
    fs::write(&a, MAGIC_SOURCE).unwrap();
    fs::write(&b, "x = 7\ny = 7\nz = 7\n").unwrap();

    let output = smellmap().arg("scan").arg(&a).arg(&b).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["metadata"]["file_path"], "2 files");
    assert_eq!(report["summary"]["total_smells_detected"], 2);
}
