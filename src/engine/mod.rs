//! Agent Lifecycle Engine
//!
//! Owns the authoritative agent collection and mediates every status
//! transition. Simulation runs report through a tick channel; presentation
//! code issues requests through `EngineHandle` and reads `AgentsView`.

pub mod command;
pub mod config;
pub mod engine;
pub mod state;

pub use command::EngineCommand;
pub use config::EngineConfig;
pub use engine::{AgentEngine, EngineHandle};
pub use state::AgentsView;
