//! Instance record model
//!
//! `InstanceRecord` is the engine's input shape. Records arrive from two
//! producers with different conventions: the live AWS collector (EC2 API
//! casing, tags as a list of Key/Value pairs) and offline snapshots (either
//! convention). Deserialization is deliberately lenient: every field maps a
//! missing or malformed value to an explicit default instead of failing, so
//! one instance with partial telemetry can never abort a whole report.
//! Absent metrics stay `None` and are treated as "unknown, do not flag"
//! downstream.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Lifecycle state as reported by EC2; anything but running/stopped is Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Running,
    Stopped,
    #[default]
    #[serde(other)]
    Other,
}

impl InstanceState {
    pub fn parse(s: &str) -> Self {
        match s {
            "running" => InstanceState::Running,
            "stopped" => InstanceState::Stopped,
            _ => InstanceState::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Running => "running",
            InstanceState::Stopped => "stopped",
            InstanceState::Other => "other",
        }
    }
}

/// One instance with its averaged utilization metrics over the observation window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(alias = "InstanceId", default = "unknown", deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(alias = "InstanceType", default = "unknown", deserialize_with = "lenient_string")]
    pub instance_type: String,

    #[serde(alias = "State", default, deserialize_with = "lenient_state")]
    pub state: InstanceState,

    #[serde(alias = "Tags", default, deserialize_with = "lenient_tags")]
    pub tags: BTreeMap<String, String>,

    /// Mean hourly CPU utilization (%); `None` means no samples
    #[serde(alias = "AverageCPUUtilization", default, deserialize_with = "lenient_f64")]
    pub avg_cpu_percent: Option<f64>,

    /// Mean network throughput (bytes/sec); `None` means no samples
    #[serde(alias = "AverageNetworkBps", default, deserialize_with = "lenient_f64")]
    pub avg_network_bps: Option<f64>,
}

fn unknown() -> String {
    "unknown".to_string()
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => unknown(),
    })
}

fn lenient_state<'de, D: Deserializer<'de>>(d: D) -> Result<InstanceState, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => InstanceState::parse(&s),
        _ => InstanceState::Other,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_f64())
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(normalize_tags(&value))
}

/// Normalize the two tag shapes into one canonical mapping
///
/// EC2 API responses carry tags as `[{"Key": ..., "Value": ...}, ...]`;
/// hand-written snapshots usually use a plain object map. Entries without a
/// key are dropped; entries without a value keep an empty string.
pub fn normalize_tags(value: &Value) -> BTreeMap<String, String> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let key = item.get("Key")?;
                if key.is_null() {
                    return None;
                }
                let val = item.get("Value").map(value_to_string).unwrap_or_default();
                Some((value_to_string(key), val))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
