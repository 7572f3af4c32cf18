use crate::error::{ConfigError, CostctlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aws: AwsConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
    /// Credential profile; falls back to the default credential chain when unset
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Arbitrary label stamped into report metadata
    pub station: String,
    /// Assumed total cost over the observation window (USD)
    pub current_monthly_cost: f64,
    /// Observation window length in days
    pub observation_days: u32,
    /// Average CPU threshold (%) to mark an instance underutilized
    pub cpu_threshold_percent: f64,
    /// Average bytes/sec threshold for low network
    pub network_threshold_bps: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws: AwsConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            profile: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            station: "undefined".to_string(),
            current_monthly_cost: 2332.74,
            observation_days: 14,
            cpu_threshold_percent: 10.0,
            network_threshold_bps: 1_000_000.0,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .costctl.toml in current dir, then ~/.config/costctl/config.toml
            let local = PathBuf::from(".costctl.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("costctl").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".costctl.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                let mut err = format!("{}: {}", config_path.display(), e);
                err.push_str("\n  Common issues:");
                err.push_str("\n    - Invalid TOML syntax");
                err.push_str("\n    - Incorrect value types");
                err.push_str("\n  Tip: Run 'costctl init' to create a new config file");
                ConfigError::ParseError(err)
            })?;
            config.validate()?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration. Run 'costctl init' to create a config file.");
            }
            Ok(Config::default())
        }
    }

    /// Reject values the analysis cannot meaningfully work with
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("analysis.current_monthly_cost", self.analysis.current_monthly_cost),
            ("analysis.cpu_threshold_percent", self.analysis.cpu_threshold_percent),
            ("analysis.network_threshold_bps", self.analysis.network_threshold_bps),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(CostctlError::Config(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("must be a non-negative number, got {}", value),
                }));
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
