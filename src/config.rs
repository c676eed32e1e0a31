use crate::assets::{NetworkTier, SchedulingClass};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub usage: UsageConfig,
    pub currency: CurrencyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Tier applied to network interfaces that carry no explicit tier
    pub default_network_tier: NetworkTier,
    /// Scheduling class for instances without a `scheduling.preemptible` field
    pub default_scheduling: SchedulingClass,
    /// OS label used when a license token is not recognized
    pub fallback_os: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Worst-case instance hours per month
    pub ceiling_hours: u64,
    /// Expected instance hours per month
    pub projected_hours: u64,
    pub egress_ceiling_gib: u64,
    pub egress_projected_gib: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub code: String,
    /// Reference-currency units per display-currency unit
    pub conversion_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                default_network_tier: NetworkTier::Premium,
                default_scheduling: SchedulingClass::OnDemand,
                fallback_os: "Debian".to_string(),
            },
            usage: UsageConfig {
                ceiling_hours: 24 * 30,
                projected_hours: 24 * 30,
                egress_ceiling_gib: 1024,
                egress_projected_gib: 100,
            },
            currency: CurrencyConfig {
                code: "USD".to_string(),
                conversion_rate: 1.0,
            },
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
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content).with_context(|| {
                let mut err = format!("Failed to parse config: {}", config_path.display());
                err.push_str("\n  Common issues:");
                err.push_str("\n    - Invalid TOML syntax");
                err.push_str("\n    - Missing [project], [usage] or [currency] sections");
                err.push_str("\n    - Unknown network tier or scheduling class");
                err.push_str("\n  Tip: Run 'costctl init' to create a new config file");
                err
            })?;
            config
                .validate()
                .with_context(|| format!("Invalid config: {}", config_path.display()))?;
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

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> crate::error::Result<()> {
        crate::validation::validate_conversion_rate(self.currency.conversion_rate)?;
        crate::validation::validate_projection(
            "usage.projected_hours",
            self.usage.projected_hours,
            self.usage.ceiling_hours,
        )?;
        crate::validation::validate_projection(
            "usage.egress_projected_gib",
            self.usage.egress_projected_gib,
            self.usage.egress_ceiling_gib,
        )?;
        if self.project.fallback_os.trim().is_empty() {
            return Err(crate::error::ConfigError::MissingField(
                "project.fallback_os".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
