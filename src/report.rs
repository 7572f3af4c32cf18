//! Report assembly and rendering
//!
//! Wraps an `AnalysisResult` in a metadata envelope (station label, region,
//! thresholds, window, assumed cost) and renders it as pretty JSON or as a
//! human-readable text summary. The envelope is pass-through configuration,
//! not computed by the engine.

use crate::analysis::{Action, AnalysisResult};
use crate::error::Result;
use comfy_table::{Cell, Table};
use console::style;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Scheduling => write!(f, "scheduling"),
            Action::Rightsizing => write!(f, "rightsizing"),
        }
    }
}

/// Configuration echo stamped into every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub station: String,
    pub region: String,
    pub observation_days: u32,
    pub cpu_threshold_percent: f64,
    pub network_threshold_bps: f64,
    pub current_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub analysis: AnalysisResult,
}

impl Report {
    pub fn new(metadata: ReportMetadata, analysis: AnalysisResult) -> Self {
        Self { metadata, analysis }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Render the human-readable text summary to stdout
    pub fn render_text(&self) {
        println!("{}", "=".repeat(80));
        println!("EC2 COST OPTIMIZATION REPORT");
        println!("{}", "=".repeat(80));
        println!(
            "Station: {}    Region: {}",
            self.metadata.station, self.metadata.region
        );
        println!("Observation window: {} days", self.metadata.observation_days);
        println!(
            "Thresholds: CPU < {}%, network < {} B/s",
            self.metadata.cpu_threshold_percent, self.metadata.network_threshold_bps
        );
        println!("Assumed current cost: ${:.2}", self.metadata.current_cost);
        println!();

        if self.analysis.recommendations.is_empty() {
            println!("No recommendations. All running instances look adequately utilized.");
        } else {
            let mut table = Table::new();
            table.set_header(vec![
                "Instance ID",
                "Type",
                "Actions",
                "Est. savings/mo",
                "Proposal",
                "Reason",
            ]);

            for rec in &self.analysis.recommendations {
                let actions = rec
                    .actions
                    .iter()
                    .map(Action::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let proposal = match (&rec.proposed_instance_type, &rec.schedule_suggestion) {
                    (Some(t), _) => t.clone(),
                    (None, Some(s)) => s.clone(),
                    (None, None) => String::new(),
                };
                table.add_row(vec![
                    Cell::new(&rec.instance_id),
                    Cell::new(&rec.instance_type),
                    Cell::new(actions),
                    Cell::new(format!("${:.2}", rec.estimated_monthly_savings))
                        .fg(comfy_table::Color::Green),
                    Cell::new(proposal),
                    Cell::new(&rec.reason),
                ]);
            }

            println!("{table}");
        }

        println!();
        println!(
            "{} ${:.2}",
            style("Total estimated monthly savings:").bold(),
            self.analysis.total_estimated_savings
        );
    }
}
