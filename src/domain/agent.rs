use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::pnl::PnlData;
use super::strategy::{RiskLevel, Strategy};
use crate::simulation::history::{PnlHistory, DEFAULT_HISTORY_CAP};

/// Opaque, immutable agent identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, for compact display
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for AgentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agent lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    /// No strategy, no simulation running
    Idle,
    /// Strategy assigned, simulation running
    Active,
    /// Reserved for simulation faults; no current transition produces it
    Error,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "Idle",
            AgentStatus::Active => "Active",
            AgentStatus::Error => "Error",
        }
    }

    /// Check if this status can transition to another status
    pub fn can_transition_to(&self, target: AgentStatus) -> bool {
        use AgentStatus::*;

        match (self, target) {
            (Idle, Active) => true,
            // Strategy switch or edit restart
            (Active, Active) => true,
            (Active, Idle) => true,
            (Active, Error) => true,
            (Error, Idle) => true,
            (Error, Active) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field updates accepted by an agent edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEdit {
    pub name: String,
    pub balance: Decimal,
    pub avatar_url: String,
}

/// Identity and simulation state of one trading bot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub avatar_url: String,
    pub balance: Decimal,
    pub status: AgentStatus,
    pub pnl: Decimal,
    pub pnl_history: PnlHistory,
    pub strategy: Option<Strategy>,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// New idle agent with a single zero-valued history point at `now`
    pub fn new(name: impl Into<String>, balance: Decimal, now: DateTime<Utc>) -> Self {
        Self::with_history_cap(name, balance, now, DEFAULT_HISTORY_CAP)
    }

    pub fn with_history_cap(
        name: impl Into<String>,
        balance: Decimal,
        now: DateTime<Utc>,
        history_cap: usize,
    ) -> Self {
        let name = name.into();
        Self {
            id: AgentId::new(),
            avatar_url: default_avatar_url(&name),
            name,
            balance,
            status: AgentStatus::Idle,
            pnl: Decimal::ZERO,
            pnl_history: PnlHistory::new(history_cap, now),
            strategy: None,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Risk level of the assigned strategy, if any
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.strategy.as_ref().map(|s| s.risk_level)
    }

    /// Drop P&L back to zero and restart the history at `now`
    pub fn reset_pnl(&mut self, now: DateTime<Utc>) {
        self.pnl = Decimal::ZERO;
        self.pnl_history.reset(now);
    }

    /// Apply one simulated sample: history and current P&L move together
    pub fn record_tick(&mut self, point: PnlData) {
        self.pnl_history.push(point);
        self.pnl = point.value;
    }
}

/// Initials avatar seeded with the agent name
pub fn default_avatar_url(name: &str) -> String {
    format!(
        "https://api.dicebear.com/8.x/initials/svg?seed={}",
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_agent_is_idle_with_zero_point() {
        let now = Utc::now();
        let agent = Agent::new("Alpha", dec!(10000), now);

        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.pnl, Decimal::ZERO);
        assert!(agent.strategy.is_none());
        assert_eq!(agent.pnl_history.len(), 1);
        assert_eq!(agent.pnl_history.latest(), Some(&PnlData::zero(now)));
    }

    #[test]
    fn test_default_avatar_is_url_encoded() {
        let url = default_avatar_url("Bot One");
        assert_eq!(url, "https://api.dicebear.com/8.x/initials/svg?seed=Bot%20One");
    }

    #[test]
    fn test_status_transitions() {
        assert!(AgentStatus::Idle.can_transition_to(AgentStatus::Active));
        assert!(AgentStatus::Active.can_transition_to(AgentStatus::Active));
        assert!(!AgentStatus::Idle.can_transition_to(AgentStatus::Error));
        assert!(!AgentStatus::Idle.can_transition_to(AgentStatus::Idle));
    }

    #[test]
    fn test_record_tick_updates_pnl_and_history() {
        let now = Utc::now();
        let mut agent = Agent::new("Alpha", dec!(10000), now);
        agent.record_tick(PnlData::new(now, dec!(2.50)));

        assert_eq!(agent.pnl, dec!(2.50));
        assert_eq!(agent.pnl_history.len(), 2);

        agent.reset_pnl(now);
        assert_eq!(agent.pnl, Decimal::ZERO);
        assert_eq!(agent.pnl_history.len(), 1);
    }

    #[test]
    fn test_agent_id_short() {
        let id = AgentId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }
}
