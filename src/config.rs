use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::simulation::{PnlModel, SchedulerConfig, DEFAULT_HISTORY_CAP};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub strategy_provider: StrategyProviderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Milliseconds between ticks of one agent's simulation
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Samples retained per agent
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Subtracted from each uniform draw (0.48 gives a slight upward drift)
    #[serde(default = "default_drift_bias")]
    pub drift_bias: Decimal,
    /// Fraction of balance moved per unit of (draw - bias)
    #[serde(default = "default_volatility_scale")]
    pub volatility_scale: Decimal,
    /// Base seed for reproducible runs (None = OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Capacity of the tick channel between runs and the engine
    #[serde(default = "default_tick_channel_capacity")]
    pub tick_channel_capacity: usize,
}

fn default_tick_interval() -> u64 {
    500
}

fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

fn default_drift_bias() -> Decimal {
    dec!(0.48)
}

fn default_volatility_scale() -> Decimal {
    dec!(0.0005)
}

fn default_tick_channel_capacity() -> usize {
    1024
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            history_cap: default_history_cap(),
            drift_bias: default_drift_bias(),
            volatility_scale: default_volatility_scale(),
            seed: None,
            tick_channel_capacity: default_tick_channel_capacity(),
        }
    }
}

impl SimulationConfig {
    pub fn model(&self) -> PnlModel {
        PnlModel {
            drift_bias: self.drift_bias,
            volatility_scale: self.volatility_scale,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            model: self.model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyProviderConfig {
    /// Gemini API key; empty selects the local template fallback
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    #[serde(default = "default_provider_model")]
    pub model: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_provider_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

impl Default for StrategyProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_provider_url(),
            model: default_provider_model(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl StrategyProviderConfig {
    /// Fill an empty key from `GEMINI_API_KEY`, then `API_KEY`
    pub fn with_env_key(mut self) -> Self {
        if self.api_key.trim().is_empty() {
            self.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .unwrap_or_default();
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for the daily rolling log file
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("simulation.tick_interval_ms", 500)?
            .set_default("simulation.history_cap", DEFAULT_HISTORY_CAP as u64)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("AGENTSIM_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (AGENTSIM__SIMULATION__SEED, etc.)
            .add_source(
                Environment::with_prefix("AGENTSIM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.strategy_provider = config.strategy_provider.with_env_key();
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.simulation.tick_interval_ms == 0 {
            errors.push("tick_interval_ms must be positive".to_string());
        }

        if self.simulation.history_cap == 0 {
            errors.push("history_cap must be at least 1".to_string());
        }

        if self.simulation.drift_bias < Decimal::ZERO || self.simulation.drift_bias > Decimal::ONE {
            errors.push("drift_bias must be between 0 and 1".to_string());
        }

        if self.simulation.volatility_scale <= Decimal::ZERO {
            errors.push("volatility_scale must be positive".to_string());
        }

        if self.simulation.tick_channel_capacity == 0 {
            errors.push("tick_channel_capacity must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_model() {
        let config = AppConfig::default();
        assert_eq!(config.simulation.model(), PnlModel::default());
        assert_eq!(config.simulation.history_cap, 100);
        assert_eq!(
            config.simulation.scheduler_config().tick_interval,
            Duration::from_millis(500)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.simulation.tick_interval_ms = 0;
        config.simulation.drift_bias = dec!(1.5);

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let config = AppConfig::load_from("/nonexistent/agentsim-config").unwrap();
        assert_eq!(config.simulation.tick_interval_ms, 500);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.strategy_provider.model, "gemini-2.5-flash");
    }
}
