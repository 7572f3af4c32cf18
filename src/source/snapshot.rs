//! Offline snapshot source
//!
//! Reads instance records from a local JSON file, either a bare array or an
//! object wrapping the array under an `instances` field. Anything else is a
//! data-format error, reported before any analysis runs. Per-record leniency
//! (missing fields, either tag shape) lives in `crate::instance`.

use crate::error::{CostctlError, Result};
use crate::instance::InstanceRecord;
use crate::source::MetricsSource;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MetricsSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn collect(&self) -> Result<Vec<InstanceRecord>> {
        load_instances(&self.path)
    }
}

/// Load instance records from a snapshot file
pub fn load_instances(path: &Path) -> Result<Vec<InstanceRecord>> {
    let content = std::fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&content)?;

    let records = match data {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("instances") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(CostctlError::DataFormat(
                    "'instances' field is not an array".to_string(),
                ))
            }
            None => {
                return Err(CostctlError::DataFormat(
                    "unsupported input JSON format: expected an array or an object with an 'instances' field"
                        .to_string(),
                ))
            }
        },
        _ => {
            return Err(CostctlError::DataFormat(
                "unsupported input JSON format: expected an array or an object with an 'instances' field"
                    .to_string(),
            ))
        }
    };

    debug!("Loaded {} records from {}", records.len(), path.display());

    records
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| CostctlError::DataFormat(format!("invalid instance record: {}", e)))
        })
        .collect()
}
