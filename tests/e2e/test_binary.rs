//! Integration tests for the visaflow binary.
//!
//! Each test copies the fixture data directory into a temp dir and runs the
//! compiled binary against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/flowcharts")
}

/// Fresh copy of the fixture data directory.
fn data_dir() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    for entry in fs::read_dir(fixtures_dir()).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, tmp.path().join(path.file_name().unwrap())).unwrap();
    }
    tmp
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_visaflow"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run binary")
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).expect("non-UTF8 output")
}

fn germany(dir: &TempDir) -> String {
    dir.path().join("germany.json").to_string_lossy().into_owned()
}

fn read_json(path: &str) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ─── repair ──────────────────────────────────────────────────────────────────

#[test]
fn test_repair_rewrites_legacy_ids() {
    let dir = data_dir();
    let out = run(&["repair", dir.path().to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("JobOffer -> job-offer"), "{text}");
    assert!(text.contains("Files scanned:    1"), "{text}");
    assert!(text.contains("Files modified:   1"), "{text}");
    assert!(text.contains("Ids fixed:        3"), "{text}");
    assert!(text.contains("Unresolved nodes: 1"), "{text}");

    let json = read_json(&germany(&dir));
    let diagram = json["eu_blue_card"]["mermaidDiagram"].as_str().unwrap();
    assert!(json["eu_blue_card"].get("diagramText").is_none());
    assert!(json["eu_blue_card"]["officialUrl"].as_str().unwrap().contains("eu-blue-card"));
    assert!(diagram.contains(r#"-->job-offer["Secure Job Offer"]"#));
    assert!(diagram.contains("gather-documents --> submit-application"));
    assert!(!diagram.contains("JobOffer"));
    // CheckSalary is a decision with no matching step and stays as is.
    assert!(diagram.contains("CheckSalary"));
}

#[test]
fn test_repair_is_idempotent_on_disk() {
    let dir = data_dir();
    run(&["repair", dir.path().to_str().unwrap()]);
    let first = fs::read_to_string(germany(&dir)).unwrap();
    let out = run(&["repair", dir.path().to_str().unwrap()]);
    assert!(stdout(&out).contains("Files modified:   0"));
    assert_eq!(fs::read_to_string(germany(&dir)).unwrap(), first);
}

#[test]
fn test_repair_leaves_index_alone() {
    let dir = data_dir();
    let index = dir.path().join("index.json");
    let before = fs::read_to_string(&index).unwrap();
    run(&["repair", dir.path().to_str().unwrap()]);
    assert_eq!(fs::read_to_string(&index).unwrap(), before);
}

#[test]
fn test_missing_directory_fails() {
    let out = run(&["repair", "/nonexistent/visaflow-data"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error:"));
}

// ─── missing-steps / fix-keys ────────────────────────────────────────────────

const AUSTRIA: &str = r#"{
  "redWhiteRed": {
    "programId": "at_red_white_red",
    "countryCode": "AT",
    "programName": "Red-White-Red Card",
    "diagramText": "flowchart TD\n Start([Start]) --> job-offer[Job Offer]\n job-offer --> processing[Wait 8 weeks]\n processing --> receive-card[Collect RWR Card]\n receive-card --> Success([Done])",
    "steps": [{"id": "job-offer", "title": "Job Offer", "tips": ["ask HR"]}]
  }
}"#;

#[test]
fn test_missing_steps_report_then_write() {
    let dir = data_dir();
    let austria = dir.path().join("austria.json");
    fs::write(&austria, AUSTRIA).unwrap();
    let report = dir.path().join("report.txt");

    let out = run(&[
        "missing-steps",
        dir.path().to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("austria.json - redWhiteRed: processing, receive-card"), "{text}");
    assert!(text.contains("Total missing steps: 2"), "{text}");
    assert_eq!(fs::read_to_string(&austria).unwrap(), AUSTRIA);
    assert!(fs::read_to_string(&report).unwrap().contains("\"Collect RWR Card\""));

    let out = run(&["missing-steps", dir.path().to_str().unwrap(), "--write"]);
    assert!(stdout(&out).contains("Files modified:      1"));
    let json = read_json(austria.to_str().unwrap());
    let steps = json["redWhiteRed"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["tips"][0], "ask HR");
    assert_eq!(steps[1]["estimatedDuration"], "8 weeks");
    assert_eq!(steps[2]["title"], "Collect RWR Card");

    let out = run(&["missing-steps", dir.path().to_str().unwrap()]);
    assert!(stdout(&out).contains("Total missing steps: 0"));
}

#[test]
fn test_fix_keys() {
    let dir = data_dir();
    let austria = dir.path().join("austria.json");
    fs::write(&austria, AUSTRIA).unwrap();

    let out = run(&["fix-keys", dir.path().to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("austria.json: redWhiteRed -> red_white_red"), "{text}");
    assert!(text.contains("Keys renamed:    1"), "{text}");
    let json = read_json(austria.to_str().unwrap());
    assert!(json.get("redWhiteRed").is_none());
    assert_eq!(json["red_white_red"]["steps"][0]["tips"][0], "ask HR");
}

// ─── strip-styles ────────────────────────────────────────────────────────────

#[test]
fn test_strip_styles_dry_run_writes_nothing() {
    let dir = data_dir();
    let before = fs::read_to_string(germany(&dir)).unwrap();
    let out = run(&["strip-styles", dir.path().to_str().unwrap(), "--dry-run"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Styles removed:  3"), "{text}");
    assert_eq!(fs::read_to_string(germany(&dir)).unwrap(), before);
}

#[test]
fn test_strip_styles_in_place() {
    let dir = data_dir();
    let out = run(&["strip-styles", dir.path().to_str().unwrap()]);
    assert!(out.status.success());
    let json = read_json(&germany(&dir));
    let diagram = json["eu_blue_card"]["mermaidDiagram"].as_str().unwrap();
    assert!(!diagram.contains("style "));
    assert!(diagram.ends_with("registration --> Success([Process Complete])"));
}

// ─── validate ────────────────────────────────────────────────────────────────

#[test]
fn test_validate_reports_then_passes_after_repair() {
    let dir = data_dir();
    let path = dir.path().to_str().unwrap();

    let out = run(&["validate", path]);
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.contains("[case-mismatch]"), "{text}");
    assert!(text.contains("Case mismatches:    3"), "{text}");

    run(&["repair", path]);
    let out = run(&["validate", path]);
    assert!(out.status.success(), "{}", stdout(&out));
    assert!(stdout(&out).contains("Total issues:       0"));
}

// ─── timeline ────────────────────────────────────────────────────────────────

#[test]
fn test_timeline_branches() {
    let dir = data_dir();
    let out = run(&["timeline", &germany(&dir), "work_visa"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("│ Secure Job Offer │"), "{text}");
    let labels = text.lines().find(|l| l.contains("Approved")).unwrap();
    assert!(labels.contains("Rejected"));
}

#[test]
fn test_timeline_ascii_by_program_id() {
    let dir = data_dir();
    let out = run(&["timeline", &germany(&dir), "de_work_visa", "--ascii"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.is_ascii());
    assert!(text.contains("| Secure Job Offer |"));
}

#[test]
fn test_timeline_unknown_program() {
    let dir = data_dir();
    let out = run(&["timeline", &germany(&dir), "nope"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("program 'nope' not found"));
}

// ─── export ──────────────────────────────────────────────────────────────────

#[test]
fn test_export_svg() {
    let dir = data_dir();
    let target = dir.path().join("out.svg");
    let out = run(&[
        "export",
        &germany(&dir),
        "eu_blue_card",
        "-o",
        target.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let svg = fs::read_to_string(&target).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"id="flowchart-de_eu_blue_card-1""#));
    assert!(svg.contains(r#"id="flowchart-JobOffer-1""#));
}

#[test]
fn test_export_default_file_name() {
    let dir = data_dir();
    let file = germany(&dir);
    let out = Command::new(env!("CARGO_BIN_EXE_visaflow"))
        .args(["export", &file, "work_visa"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(dir.path().join("de_work_visa-flowchart.svg").exists());
}
