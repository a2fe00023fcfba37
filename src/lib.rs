pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod session;
pub mod simulation;
pub mod strategy;
pub mod tui;
pub mod validation;

pub use config::AppConfig;
pub use domain::{Agent, AgentEdit, AgentId, AgentStatus, PnlData, RiskLevel, Strategy};
pub use engine::{AgentEngine, AgentsView, EngineConfig, EngineHandle};
pub use error::{Result, SimError};
pub use session::{WalletAddress, WalletSession};
pub use simulation::{PnlHistory, PnlModel, RunId, SimulationScheduler, TickEvent};
pub use strategy::{GenerationRequest, StrategyProvider, TemplateStrategyProvider};
