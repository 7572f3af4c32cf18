//! Live AWS source
//!
//! Fetches the fleet via paginated `DescribeInstances`, then enriches each
//! running/stopped instance with averaged CloudWatch utilization metrics over
//! the observation window. A failed `DescribeInstances` is fatal (after
//! retries); a failed per-instance metric query degrades to an absent metric
//! so one CloudWatch hiccup cannot abort the whole report.

use crate::error::{CostctlError, Result};
use crate::instance::{InstanceRecord, InstanceState};
use crate::retry::ExponentialBackoff;
use crate::source::MetricsSource;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, StandardUnit, Statistic};
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use aws_sdk_ec2::Client as Ec2Client;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// CloudWatch sample period (one hour, in seconds)
const METRIC_PERIOD_SECS: i32 = 3600;

pub struct AwsSource {
    region: String,
    profile: Option<String>,
    observation_days: u32,
}

impl AwsSource {
    pub fn new(region: String, profile: Option<String>, observation_days: u32) -> Self {
        Self {
            region,
            profile,
            observation_days,
        }
    }

    async fn load_clients(&self) -> (Ec2Client, CloudWatchClient) {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        let shared = loader.load().await;
        (Ec2Client::new(&shared), CloudWatchClient::new(&shared))
    }

    async fn metric_average(
        &self,
        cw: &CloudWatchClient,
        instance_id: &str,
        metric_name: &str,
        unit: StandardUnit,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<f64> {
        let result = cw
            .get_metric_statistics()
            .namespace("AWS/EC2")
            .metric_name(metric_name)
            .dimensions(
                Dimension::builder()
                    .name("InstanceId")
                    .value(instance_id)
                    .build(),
            )
            .start_time(AwsDateTime::from_secs(start.timestamp()))
            .end_time(AwsDateTime::from_secs(end.timestamp()))
            .period(METRIC_PERIOD_SECS)
            .statistics(Statistic::Average)
            .unit(unit)
            .send()
            .await;

        match result {
            Ok(output) => datapoint_mean(output.datapoints()),
            Err(e) => {
                debug!("{} fetch failed for {}: {}", metric_name, instance_id, e);
                None
            }
        }
    }

    async fn average_cpu(
        &self,
        cw: &CloudWatchClient,
        instance_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<f64> {
        self.metric_average(cw, instance_id, "CPUUtilization", StandardUnit::Percent, start, end)
            .await
    }

    /// Combined NetworkIn + NetworkOut as bytes/sec
    ///
    /// Hourly "Average" datapoints are per-period byte counts, hence the
    /// division by the period length.
    async fn average_network_bps(
        &self,
        cw: &CloudWatchClient,
        instance_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<f64> {
        let inbound = self
            .metric_average(cw, instance_id, "NetworkIn", StandardUnit::Bytes, start, end)
            .await;
        let outbound = self
            .metric_average(cw, instance_id, "NetworkOut", StandardUnit::Bytes, start, end)
            .await;
        combine_network(inbound, outbound)
    }
}

#[async_trait]
impl MetricsSource for AwsSource {
    fn name(&self) -> &'static str {
        "aws"
    }

    async fn collect(&self) -> Result<Vec<InstanceRecord>> {
        let (ec2, cw) = self.load_clients().await;

        let instances = ExponentialBackoff::for_cloud_api()
            .run(|| async {
                let mut collected = Vec::new();
                let mut pages = ec2.describe_instances().into_paginator().send();
                while let Some(page) = pages.next().await {
                    let page = page.map_err(|e| {
                        CostctlError::Aws(format!("describe_instances failed: {}", e))
                    })?;
                    for reservation in page.reservations() {
                        collected.extend(reservation.instances().iter().cloned());
                    }
                }
                Ok(collected)
            })
            .await?;

        // Terminated and transitional states carry no useful utilization signal
        let candidates: Vec<_> = instances
            .into_iter()
            .filter(|inst| {
                matches!(
                    inst.state().and_then(|s| s.name()).map(|n| n.as_str()),
                    Some("running") | Some("stopped")
                )
            })
            .collect();

        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(self.observation_days));

        let pb = ProgressBar::new(candidates.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40}] {pos}/{len} {msg}")
                .expect("Progress bar template should be valid"),
        );
        pb.set_message("Collecting CloudWatch metrics");

        let mut records = Vec::with_capacity(candidates.len());
        for inst in &candidates {
            let id = inst.instance_id().unwrap_or("unknown").to_string();
            let instance_type = inst
                .instance_type()
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let state = InstanceState::parse(
                inst.state()
                    .and_then(|s| s.name())
                    .map(|n| n.as_str())
                    .unwrap_or("unknown"),
            );
            let tags: BTreeMap<String, String> = inst
                .tags()
                .iter()
                .filter_map(|t| {
                    t.key()
                        .map(|k| (k.to_string(), t.value().unwrap_or("").to_string()))
                })
                .collect();

            let avg_cpu_percent = self.average_cpu(&cw, &id, start, end).await;
            let avg_network_bps = self.average_network_bps(&cw, &id, start, end).await;

            records.push(InstanceRecord {
                id,
                instance_type,
                state,
                tags,
                avg_cpu_percent,
                avg_network_bps,
            });
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!("Collected metrics for {} instances", records.len());
        Ok(records)
    }
}

/// Mean of the "Average" statistic across datapoints, or `None` when empty
fn datapoint_mean(datapoints: &[Datapoint]) -> Option<f64> {
    let values: Vec<f64> = datapoints.iter().filter_map(|dp| dp.average()).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Absent only when both directions have no samples; a missing direction
/// contributes zero bytes
fn combine_network(inbound: Option<f64>, outbound: Option<f64>) -> Option<f64> {
    match (inbound, outbound) {
        (None, None) => None,
        (i, o) => Some((i.unwrap_or(0.0) + o.unwrap_or(0.0)) / f64::from(METRIC_PERIOD_SECS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datapoint_mean() {
        assert_eq!(datapoint_mean(&[]), None);

        let dps = vec![
            Datapoint::builder().average(10.0).build(),
            Datapoint::builder().average(20.0).build(),
            Datapoint::builder().build(), // no Average statistic
        ];
        assert_eq!(datapoint_mean(&dps), Some(15.0));
    }

    #[test]
    fn test_combine_network() {
        assert_eq!(combine_network(None, None), None);
        assert_eq!(combine_network(Some(3600.0), None), Some(1.0));
        assert_eq!(combine_network(None, Some(7200.0)), Some(2.0));
        assert_eq!(combine_network(Some(3600.0), Some(3600.0)), Some(2.0));
    }
}
