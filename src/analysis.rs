//! Recommendation engine
//!
//! Pure, synchronous core of the analyzer. Takes an already-materialized list
//! of instance records plus thresholds and produces per-instance scheduling
//! and rightsizing recommendations with an aggregate savings estimate. No
//! I/O, no shared state: callers fetch records first (snapshot or live AWS)
//! and render the result afterwards.
//!
//! Two independent rules contribute to a single recommendation per instance:
//!
//! - scheduling: a non-production instance idling below the CPU *or* network
//!   threshold can run a reduced schedule for roughly half its cost share
//! - rightsizing: an instance below *both* thresholds that has a smaller
//!   size in its family can drop one size, again for half its cost share
//!
//! Cost shares weight the fleet-wide cost by an exponential size proxy (see
//! `crate::sizing`). Absent metrics never trigger a flag: missing telemetry
//! is not evidence of low utilization.

use crate::config::AnalysisConfig;
use crate::instance::{InstanceRecord, InstanceState};
use crate::sizing::{effective_weight, next_smaller_type};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag keys consulted for environment classification, in priority order.
/// The order is load-bearing when an instance carries conflicting tags.
const ENV_TAG_KEYS: [&str; 6] = ["env", "environment", "stage", "Environment", "Stage", "Env"];

/// Tag values (lowercased) that mark an instance as non-production
const NON_PROD_VALUES: [&str; 8] = [
    "dev", "development", "test", "qa", "staging", "sandbox", "nonprod", "non-prod",
];

/// Name-tag substrings (lowercased) hinting at a non-production instance
const NAME_HINTS: [&str; 5] = ["dev", "test", "qa", "staging", "sandbox"];

/// Fixed suggestion attached to scheduling recommendations
pub const SCHEDULE_SUGGESTION: &str = "Schedule to 12h/day Mon-Fri (approx 50% savings)";

const SCHEDULING_SAVINGS_FRACTION: f64 = 0.5;
const RIGHTSIZING_SAVINGS_FRACTION: f64 = 0.5;

/// Analysis thresholds and window-wide cost assumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub cpu_threshold_percent: f64,
    pub network_threshold_bps: f64,
    /// Observed total cost over the window, distributed across running instances
    pub current_total_cost: f64,
    /// Informational only; not used in any computation
    pub observation_days: u32,
}

impl From<&AnalysisConfig> for Thresholds {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            cpu_threshold_percent: config.cpu_threshold_percent,
            network_threshold_bps: config.network_threshold_bps,
            current_total_cost: config.current_monthly_cost,
            observation_days: config.observation_days,
        }
    }
}

/// Action tags attached to a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Scheduling,
    Rightsizing,
}

/// One flagged instance; both rules merge into a single entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub instance_id: String,
    pub instance_type: String,
    pub tags: BTreeMap<String, String>,
    pub actions: Vec<Action>,
    pub reason: String,
    pub estimated_monthly_savings: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_instance_type: Option<String>,
}

/// Engine output: recommendations in input iteration order plus their rounded sum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_estimated_savings: f64,
    pub recommendations: Vec<Recommendation>,
}

/// Classify an instance as non-production from its tags
///
/// Checks the environment-style keys in fixed priority order (case-sensitive
/// keys, case-insensitive values); the first key holding a non-empty value
/// decides. Falls back to substring hints in the Name tag. An instance with
/// no usable tags defaults to non-production: unlabeled capacity gets
/// flagged for review rather than silently exempted.
pub fn is_non_prod(tags: &BTreeMap<String, String>) -> bool {
    for key in ENV_TAG_KEYS {
        if let Some(value) = tags.get(key) {
            let value = value.to_lowercase();
            if !value.is_empty() {
                return NON_PROD_VALUES.contains(&value.as_str());
            }
        }
    }
    if let Some(name) = tags.get("Name") {
        let name = name.to_lowercase();
        if !name.is_empty() {
            return NAME_HINTS.iter().any(|hint| name.contains(hint));
        }
    }
    true
}

/// Strictly below threshold; absent metrics never flag
fn below(value: Option<f64>, threshold: f64) -> bool {
    value.map(|v| v < threshold).unwrap_or(false)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn metric_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

fn bytes_text(value: Option<f64>) -> String {
    value.map(|v| (v as i64).to_string()).unwrap_or_else(|| "n/a".to_string())
}

/// Run the engine over a fleet
///
/// Only running instances are evaluated. With zero running instances the
/// result is empty rather than an error: cost attribution is meaningless for
/// an idle fleet. Idempotent for identical input.
pub fn analyze(instances: &[InstanceRecord], thresholds: &Thresholds) -> AnalysisResult {
    let running: Vec<&InstanceRecord> = instances
        .iter()
        .filter(|i| i.state == InstanceState::Running)
        .collect();
    if running.is_empty() {
        return AnalysisResult {
            total_estimated_savings: 0.0,
            recommendations: Vec::new(),
        };
    }

    let total_weight: f64 = running
        .iter()
        .map(|i| effective_weight(&i.instance_type))
        .sum();

    let mut recommendations = Vec::new();
    let mut total_savings = 0.0;

    for inst in running {
        let cost_share =
            thresholds.current_total_cost * effective_weight(&inst.instance_type) / total_weight;

        let under_cpu = below(inst.avg_cpu_percent, thresholds.cpu_threshold_percent);
        let under_network = below(inst.avg_network_bps, thresholds.network_threshold_bps);

        let mut actions = Vec::new();
        let mut reasons = Vec::new();
        let mut estimated = 0.0;
        let mut schedule_suggestion = None;
        let mut proposed_instance_type = None;

        if is_non_prod(&inst.tags) && (under_cpu || under_network) {
            actions.push(Action::Scheduling);
            estimated += cost_share * SCHEDULING_SAVINGS_FRACTION;
            reasons.push(format!(
                "Non-prod underutilized: CPU={}% Net={} B/s",
                metric_text(inst.avg_cpu_percent),
                bytes_text(inst.avg_network_bps),
            ));
            schedule_suggestion = Some(SCHEDULE_SUGGESTION.to_string());
        }

        if under_cpu && under_network {
            if let Some(smaller) = next_smaller_type(&inst.instance_type) {
                actions.push(Action::Rightsizing);
                estimated += cost_share * RIGHTSIZING_SAVINGS_FRACTION;
                reasons.push("Low CPU and low network over observation window".to_string());
                proposed_instance_type = Some(smaller);
            }
        }

        if actions.is_empty() {
            continue;
        }

        let estimated = round2(estimated);
        total_savings += estimated;
        recommendations.push(Recommendation {
            instance_id: inst.id.clone(),
            instance_type: inst.instance_type.clone(),
            tags: inst.tags.clone(),
            actions,
            reason: reasons.join("; "),
            estimated_monthly_savings: estimated,
            schedule_suggestion,
            proposed_instance_type,
        });
    }

    AnalysisResult {
        total_estimated_savings: round2(total_savings),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_is_non_prod_env_values() {
        assert!(is_non_prod(&tags(&[("env", "dev")])));
        assert!(is_non_prod(&tags(&[("environment", "Staging")])));
        assert!(is_non_prod(&tags(&[("Environment", "non-prod")])));
        assert!(!is_non_prod(&tags(&[("env", "production")])));
        assert!(!is_non_prod(&tags(&[("environment", "prod")])));
    }

    #[test]
    fn test_is_non_prod_key_priority_order() {
        // "env" outranks "Environment" when both are present
        assert!(!is_non_prod(&tags(&[("env", "prod"), ("Environment", "dev")])));
        assert!(is_non_prod(&tags(&[("env", "dev"), ("Environment", "prod")])));
        // An empty value falls through to the next key
        assert!(is_non_prod(&tags(&[("env", ""), ("stage", "qa")])));
    }

    #[test]
    fn test_is_non_prod_name_fallback() {
        assert!(is_non_prod(&tags(&[("Name", "qa-runner-3")])));
        assert!(is_non_prod(&tags(&[("Name", "Dev-Box")])));
        assert!(!is_non_prod(&tags(&[("Name", "web-frontend")])));
    }

    #[test]
    fn test_is_non_prod_env_key_outranks_name() {
        assert!(!is_non_prod(&tags(&[("env", "prod"), ("Name", "dev-box")])));
    }

    #[test]
    fn test_is_non_prod_defaults_true_when_unlabeled() {
        assert!(is_non_prod(&BTreeMap::new()));
        // Empty values everywhere count as unlabeled
        assert!(is_non_prod(&tags(&[("env", ""), ("Name", "")])));
    }

    #[test]
    fn test_below_requires_present_value() {
        assert!(below(Some(5.0), 10.0));
        assert!(!below(Some(10.0), 10.0)); // strict comparison
        assert!(!below(None, 10.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.125), 0.13); // half rounds away from zero
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(0.0), 0.0);
    }
}
