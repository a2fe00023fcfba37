//! Engine Commands: requests sent from handles to the engine loop

use rust_decimal::Decimal;
use tokio::sync::oneshot;

use crate::domain::{Agent, AgentEdit, AgentId, Strategy};
use crate::error::Result;

/// Lifecycle requests, each answered on its own oneshot channel
#[derive(Debug)]
pub enum EngineCommand {
    /// Create an idle agent
    CreateAgent {
        name: String,
        balance: Decimal,
        reply: oneshot::Sender<Agent>,
    },
    /// Assign (or switch) a strategy and (re)start the simulation
    AssignStrategy {
        agent_id: AgentId,
        strategy: Strategy,
        reply: oneshot::Sender<Result<Agent>>,
    },
    /// Update display fields and balance; resets P&L
    EditAgent {
        agent_id: AgentId,
        edit: AgentEdit,
        reply: oneshot::Sender<Result<Agent>>,
    },
    /// Stop the agent's simulation and drop it
    RemoveAgent {
        agent_id: AgentId,
        reply: oneshot::Sender<Result<Agent>>,
    },
    /// Stop every simulation and discard all agents
    TeardownSession { reply: oneshot::Sender<()> },
}

impl EngineCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineCommand::CreateAgent { .. } => "create_agent",
            EngineCommand::AssignStrategy { .. } => "assign_strategy",
            EngineCommand::EditAgent { .. } => "edit_agent",
            EngineCommand::RemoveAgent { .. } => "remove_agent",
            EngineCommand::TeardownSession { .. } => "teardown_session",
        }
    }
}
