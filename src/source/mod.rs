//! Instance metrics sources
//!
//! The engine consumes an already-materialized `Vec<InstanceRecord>`; where
//! that list comes from is abstracted behind `MetricsSource`. Two
//! implementations exist: an offline JSON snapshot (`snapshot`) and a live
//! AWS fetch via EC2 + CloudWatch (`aws`). Acquisition failures surface to
//! the caller before the engine ever runs.

pub mod aws;
pub mod snapshot;

use crate::error::Result;
use crate::instance::InstanceRecord;
use async_trait::async_trait;

/// Source of instance records with averaged utilization metrics
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Source name (e.g., "snapshot", "aws")
    fn name(&self) -> &'static str;

    /// Materialize the full list of instance records
    async fn collect(&self) -> Result<Vec<InstanceRecord>>;
}

pub use aws::AwsSource;
pub use snapshot::SnapshotSource;
