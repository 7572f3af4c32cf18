//! CLI end-to-end tests
//!
//! Runs the compiled binary against snapshot fixtures and checks output,
//! report files, and the exit code convention.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FLEET: &str = r#"{
  "instances": [
    {
      "InstanceId": "i-aaaa1111",
      "InstanceType": "m5.xlarge",
      "State": "running",
      "Tags": {},
      "AverageCPUUtilization": 5,
      "AverageNetworkBps": 500
    }
  ]
}"#;

fn costctl() -> Command {
    Command::cargo_bin("costctl").unwrap()
}

#[test]
fn test_analyze_snapshot_text_output() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("fleet.json");
    std::fs::write(&snapshot, FLEET).unwrap();

    costctl()
        .arg("analyze")
        .arg("--input-json")
        .arg(&snapshot)
        .args(["--current-cost", "1000", "--station", "lab-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EC2 COST OPTIMIZATION REPORT"))
        .stdout(predicate::str::contains("i-aaaa1111"))
        .stdout(predicate::str::contains("m5.large"))
        .stdout(predicate::str::contains("$1000.00"));
}

#[test]
fn test_analyze_snapshot_json_output() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("fleet.json");
    std::fs::write(&snapshot, FLEET).unwrap();

    let output = costctl()
        .args(["--output", "json", "analyze", "--current-cost", "1000"])
        .arg("--input-json")
        .arg(&snapshot)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["analysis"]["total_estimated_savings"], 1000.0);
    let rec = &report["analysis"]["recommendations"][0];
    assert_eq!(rec["instance_id"], "i-aaaa1111");
    assert_eq!(rec["proposed_instance_type"], "m5.large");
    assert_eq!(rec["actions"][0], "scheduling");
    assert_eq!(rec["actions"][1], "rightsizing");
}

#[test]
fn test_analyze_writes_report_file() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("fleet.json");
    let report_path = dir.path().join("report.json");
    std::fs::write(&snapshot, FLEET).unwrap();

    costctl()
        .arg("analyze")
        .arg("--input-json")
        .arg(&snapshot)
        .arg("--output-json")
        .arg(&report_path)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert!(report["analysis"]["total_estimated_savings"].as_f64().unwrap() > 0.0);
    assert_eq!(report["metadata"]["observation_days"], 14);
}

#[test]
fn test_analyze_without_source_is_user_error() {
    costctl()
        .arg("analyze")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--input-json"));
}

#[test]
fn test_analyze_unsupported_shape_is_user_error() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("bad.json");
    std::fs::write(&snapshot, r#"{"servers": []}"#).unwrap();

    costctl()
        .arg("analyze")
        .arg("--input-json")
        .arg(&snapshot)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Data format error"));
}

#[test]
fn test_analyze_missing_snapshot_is_system_error() {
    costctl()
        .args(["analyze", "--input-json", "/nonexistent/fleet.json"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("costctl.toml");

    costctl()
        .arg("init")
        .arg("--output")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("cpu_threshold_percent"));
    assert!(content.contains("region"));
}
