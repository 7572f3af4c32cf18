//! Command handlers for the costctl CLI
//!
//! Thin orchestration layer: resolve settings (config file overridden by CLI
//! flags), pick a metrics source, run the engine, render the report. All
//! analysis semantics live in `crate::analysis`.

use crate::analysis::{analyze, Thresholds};
use crate::config::{AnalysisConfig, Config};
use crate::error::{CostctlError, Result};
use crate::report::{Report, ReportMetadata};
use crate::source::{AwsSource, MetricsSource, SnapshotSource};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// AWS region to analyze
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS credential profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Station label stamped into report metadata
    #[arg(long)]
    pub station: Option<String>,

    /// Assumed current cost over the observation window (USD)
    #[arg(long)]
    pub current_cost: Option<f64>,

    /// Observation window in days
    #[arg(long)]
    pub days: Option<u32>,

    /// Average CPU threshold (%) to mark underutilized
    #[arg(long)]
    pub cpu_threshold: Option<f64>,

    /// Average bytes/sec threshold for low network
    #[arg(long)]
    pub network_threshold: Option<f64>,

    /// Path to offline instance metrics JSON
    #[arg(long)]
    pub input_json: Option<PathBuf>,

    /// Enable live AWS fetch (requires credentials)
    #[arg(long)]
    pub aws_live: bool,

    /// Optional path to write the JSON report
    #[arg(long)]
    pub output_json: Option<PathBuf>,
}

/// Config-file values overridden by whatever flags were given
fn resolved_analysis(args: &AnalyzeArgs, config: &Config) -> AnalysisConfig {
    let mut resolved = config.analysis.clone();
    if let Some(station) = &args.station {
        resolved.station = station.clone();
    }
    if let Some(cost) = args.current_cost {
        resolved.current_monthly_cost = cost;
    }
    if let Some(days) = args.days {
        resolved.observation_days = days;
    }
    if let Some(cpu) = args.cpu_threshold {
        resolved.cpu_threshold_percent = cpu;
    }
    if let Some(network) = args.network_threshold {
        resolved.network_threshold_bps = network;
    }
    resolved
}

pub async fn analyze_command(
    args: AnalyzeArgs,
    config: &Config,
    output_format: &str,
) -> Result<()> {
    let analysis_cfg = resolved_analysis(&args, config);
    let region = args
        .region
        .clone()
        .unwrap_or_else(|| config.aws.region.clone());
    let profile = args.profile.clone().or_else(|| config.aws.profile.clone());

    let source: Box<dyn MetricsSource> = if let Some(path) = &args.input_json {
        Box::new(SnapshotSource::new(path))
    } else if args.aws_live {
        Box::new(AwsSource::new(
            region.clone(),
            profile,
            analysis_cfg.observation_days,
        ))
    } else {
        return Err(CostctlError::Validation {
            field: "input".to_string(),
            reason: "provide --input-json for offline analysis or --aws-live with AWS credentials"
                .to_string(),
        });
    };

    info!("Collecting instance records from {} source", source.name());
    let instances = source.collect().await?;

    let analysis = analyze(&instances, &Thresholds::from(&analysis_cfg));

    let report = Report::new(
        ReportMetadata {
            station: analysis_cfg.station,
            region,
            observation_days: analysis_cfg.observation_days,
            cpu_threshold_percent: analysis_cfg.cpu_threshold_percent,
            network_threshold_bps: analysis_cfg.network_threshold_bps,
            current_cost: analysis_cfg.current_monthly_cost,
        },
        analysis,
    );

    if let Some(path) = &args.output_json {
        report.write_json(path)?;
        info!("Wrote JSON report to {}", path.display());
    }

    if output_format == "json" {
        println!("{}", report.to_json_pretty()?);
    } else {
        report.render_text();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let args = AnalyzeArgs {
            station: Some("rack-12".to_string()),
            cpu_threshold: Some(20.0),
            ..Default::default()
        };

        let resolved = resolved_analysis(&args, &config);
        assert_eq!(resolved.station, "rack-12");
        assert_eq!(resolved.cpu_threshold_percent, 20.0);
        // Untouched values come from config
        assert_eq!(resolved.observation_days, 14);
        assert_eq!(resolved.network_threshold_bps, 1_000_000.0);
    }

    #[tokio::test]
    async fn test_missing_source_is_validation_error() {
        let config = Config::default();
        let result = analyze_command(AnalyzeArgs::default(), &config, "text").await;
        assert!(matches!(result, Err(CostctlError::Validation { .. })));
    }
}
