//! Engine State: read-only snapshot published to the presentation layer

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{Agent, AgentId, AgentStatus};

/// Every agent in creation order, plus simulation bookkeeping
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsView {
    pub agents: Vec<Agent>,
    /// Simulation runs currently registered with the scheduler
    pub active_simulations: usize,
    /// Last time the engine published this view
    pub updated_at: DateTime<Utc>,
}

impl AgentsView {
    pub fn new() -> Self {
        Self::empty_at(Utc::now())
    }

    /// Empty view stamped with `now`
    pub fn empty_at(now: DateTime<Utc>) -> Self {
        Self {
            agents: Vec::new(),
            active_simulations: 0,
            updated_at: now,
        }
    }

    pub fn get(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == agent_id)
    }

    /// Keyed view of the agents
    pub fn by_id(&self) -> HashMap<AgentId, &Agent> {
        self.agents.iter().map(|a| (a.id, a)).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents currently in Active status
    pub fn active_agent_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| a.status == AgentStatus::Active)
            .count()
    }

    /// Sum of current P&L across all agents
    pub fn total_pnl(&self) -> Decimal {
        self.agents
            .iter()
            .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a.pnl))
    }

    /// Sum of balances across all agents
    pub fn total_balance(&self) -> Decimal {
        self.agents
            .iter()
            .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a.balance))
    }
}

impl Default for AgentsView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RiskLevel, Strategy};
    use rust_decimal_macros::dec;

    fn agent(name: &str, pnl: Decimal, active: bool) -> Agent {
        let mut agent = Agent::new(name, dec!(1000), Utc::now());
        agent.pnl = pnl;
        if active {
            agent.status = AgentStatus::Active;
            agent.strategy = Some(Strategy::new("s", "S", "s", RiskLevel::Low));
        }
        agent
    }

    #[test]
    fn test_view_defaults() {
        let view = AgentsView::new();
        assert!(view.is_empty());
        assert_eq!(view.active_agent_count(), 0);
        assert_eq!(view.total_pnl(), Decimal::ZERO);
    }

    #[test]
    fn test_view_aggregates() {
        let mut view = AgentsView::new();
        view.agents.push(agent("a", dec!(12.50), true));
        view.agents.push(agent("b", dec!(-2.25), false));

        assert_eq!(view.len(), 2);
        assert_eq!(view.active_agent_count(), 1);
        assert_eq!(view.total_pnl(), dec!(10.25));
        assert_eq!(view.total_balance(), dec!(2000));

        let id = view.agents[1].id;
        assert_eq!(view.get(&id).map(|a| a.name.as_str()), Some("b"));
        assert_eq!(view.by_id().len(), 2);
    }

    #[test]
    fn test_totals_saturate() {
        let mut view = AgentsView::new();
        for name in ["a", "b", "c"] {
            let mut a = agent(name, Decimal::MAX, false);
            a.balance = Decimal::MAX;
            view.agents.push(a);
        }
        assert_eq!(view.total_pnl(), Decimal::MAX);
        assert_eq!(view.total_balance(), Decimal::MAX);
    }
}
