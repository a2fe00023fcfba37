//! Engine Configuration

use crate::config::SimulationConfig;
use crate::simulation::{SchedulerConfig, DEFAULT_HISTORY_CAP};

/// Configuration for the agent engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    /// Samples retained per agent
    pub history_cap: usize,
    /// Capacity of the channel between simulation runs and the engine
    pub tick_channel_capacity: usize,
    /// Capacity of the command channel behind `EngineHandle`
    pub command_channel_capacity: usize,
    /// Base seed for per-run random streams (None = OS entropy)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            history_cap: DEFAULT_HISTORY_CAP,
            tick_channel_capacity: 1024,
            command_channel_capacity: 64,
            seed: None,
        }
    }
}

impl From<&SimulationConfig> for EngineConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            scheduler: config.scheduler_config(),
            history_cap: config.history_cap,
            tick_channel_capacity: config.tick_channel_capacity,
            seed: config.seed,
            ..Self::default()
        }
    }
}
