//! End-to-end tests over offline snapshots
//!
//! Drives the snapshot source and the engine together on fixture files in
//! both supported shapes (bare array, object wrapper) and both tag
//! conventions.

use costctl::analysis::{analyze, Action, Thresholds};
use costctl::instance::InstanceState;
use costctl::source::snapshot::load_instances;
use std::path::PathBuf;
use tempfile::TempDir;

const SAMPLE_FLEET: &str = r#"{
  "instances": [
    {
      "InstanceId": "i-aaaa1111",
      "InstanceType": "m5.xlarge",
      "State": "running",
      "Tags": {"env": "dev", "Name": "dev-batch-runner"},
      "AverageCPUUtilization": 3.1,
      "AverageNetworkBps": 1500.0
    },
    {
      "InstanceId": "i-bbbb2222",
      "InstanceType": "c5.2xlarge",
      "State": "running",
      "Tags": {"environment": "production", "Name": "api-server"},
      "AverageCPUUtilization": 64.0,
      "AverageNetworkBps": 48000000.0
    },
    {
      "InstanceId": "i-cccc3333",
      "InstanceType": "t3.medium",
      "State": "stopped",
      "Tags": {"env": "dev"},
      "AverageCPUUtilization": 0.4,
      "AverageNetworkBps": 20.0
    }
  ]
}"#;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn default_thresholds() -> Thresholds {
    Thresholds {
        cpu_threshold_percent: 10.0,
        network_threshold_bps: 1_000_000.0,
        current_total_cost: 2332.74,
        observation_days: 14,
    }
}

#[test]
fn test_sample_fleet_flags_the_dev_instance() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "fleet.json", SAMPLE_FLEET);

    let instances = load_instances(&path).unwrap();
    assert_eq!(instances.len(), 3);
    assert_eq!(instances[2].state, InstanceState::Stopped);

    let result = analyze(&instances, &default_thresholds());
    assert!(result.total_estimated_savings > 0.0);

    // The idle dev box gets flagged for both actions; the busy production
    // API server and the stopped instance do not appear at all.
    assert_eq!(result.recommendations.len(), 1);
    let rec = &result.recommendations[0];
    assert_eq!(rec.instance_id, "i-aaaa1111");
    assert_eq!(rec.actions, vec![Action::Scheduling, Action::Rightsizing]);
    assert_eq!(rec.proposed_instance_type.as_deref(), Some("m5.large"));
}

#[test]
fn test_sample_fleet_all_stopped_saves_nothing() {
    let dir = TempDir::new().unwrap();
    let stopped = SAMPLE_FLEET.replace("\"running\"", "\"stopped\"");
    let path = write_fixture(&dir, "stopped.json", &stopped);

    let instances = load_instances(&path).unwrap();
    let result = analyze(&instances, &default_thresholds());
    assert_eq!(result.total_estimated_savings, 0.0);
    assert!(result.recommendations.is_empty());
}

#[test]
fn test_bare_array_with_ec2_style_tags() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "bare.json",
        r#"[
            {
                "InstanceId": "i-list-tags",
                "InstanceType": "r5.large",
                "State": "running",
                "Tags": [
                    {"Key": "Environment", "Value": "Staging"},
                    {"Key": "Name", "Value": "etl-worker"}
                ],
                "AverageCPUUtilization": 2.0,
                "AverageNetworkBps": 100.0
            }
        ]"#,
    );

    let instances = load_instances(&path).unwrap();
    let result = analyze(&instances, &default_thresholds());

    let rec = &result.recommendations[0];
    assert_eq!(rec.tags.get("Environment").map(String::as_str), Some("Staging"));
    assert_eq!(rec.actions, vec![Action::Scheduling, Action::Rightsizing]);
    assert_eq!(rec.proposed_instance_type.as_deref(), Some("r5.medium"));
}

#[test]
fn test_partial_records_are_defaulted_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "partial.json",
        r#"{"instances": [
            {"State": "running", "AverageCPUUtilization": 1.0},
            {"InstanceId": "i-ok", "InstanceType": "t3.micro", "State": "running",
             "AverageCPUUtilization": 1.0, "AverageNetworkBps": 5.0}
        ]}"#,
    );

    let instances = load_instances(&path).unwrap();
    let result = analyze(&instances, &default_thresholds());

    // The near-empty record still analyzes under its defaults
    assert_eq!(result.recommendations.len(), 2);
    assert_eq!(result.recommendations[0].instance_id, "unknown");
    assert_eq!(result.recommendations[0].instance_type, "unknown");
    assert_eq!(result.recommendations[1].instance_id, "i-ok");
}
