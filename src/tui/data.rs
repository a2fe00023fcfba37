//! Data models for the TUI dashboard
//!
//! These models are optimized for display and derived from domain types.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{Agent, AgentId, AgentStatus, RiskLevel};
use crate::engine::AgentsView;

/// Agent row data
#[derive(Debug, Clone)]
pub struct DisplayAgent {
    pub id: AgentId,
    pub name: String,
    pub status: AgentStatus,
    pub strategy: Option<String>,
    pub risk: Option<RiskLevel>,
    pub balance: Decimal,
    pub pnl: Decimal,
    /// History as `(seconds since first point, value)` pairs for charting
    pub points: Vec<(f64, f64)>,
}

impl DisplayAgent {
    pub fn from_agent(agent: &Agent) -> Self {
        let first = agent.pnl_history.iter().next().map(|p| p.time);
        let points = agent
            .pnl_history
            .iter()
            .map(|p| {
                let secs = first
                    .map(|t0| (p.time - t0).num_milliseconds() as f64 / 1000.0)
                    .unwrap_or(0.0);
                (secs, p.value.to_f64().unwrap_or(0.0))
            })
            .collect();

        Self {
            id: agent.id,
            name: agent.name.clone(),
            status: agent.status,
            strategy: agent.strategy.as_ref().map(|s| s.name.clone()),
            risk: agent.risk_level(),
            balance: agent.balance,
            pnl: agent.pnl,
            points,
        }
    }

    /// P&L as a percentage of balance
    pub fn pnl_pct(&self) -> Decimal {
        self.pnl
            .checked_div(self.balance)
            .map(|ratio| ratio.saturating_mul(dec!(100)).round_dp(2))
            .unwrap_or(Decimal::ZERO)
    }

    /// `(min, max)` of the charted values, always spanning zero
    pub fn value_bounds(&self) -> (f64, f64) {
        let (lo, hi) = self
            .points
            .iter()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
        if (hi - lo).abs() < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        }
    }

    /// `(0, last x)`, at least one second wide
    pub fn time_bounds(&self) -> (f64, f64) {
        let last = self.points.last().map(|&(t, _)| t).unwrap_or(0.0);
        (0.0, last.max(1.0))
    }
}

/// Summary numbers for the footer
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub agent_count: usize,
    pub active_count: usize,
    pub running_simulations: usize,
    pub total_balance: Decimal,
    pub total_pnl: Decimal,
}

impl DashboardStats {
    pub fn from_view(view: &AgentsView) -> Self {
        Self {
            agent_count: view.len(),
            active_count: view.active_agent_count(),
            running_simulations: view.active_simulations,
            total_balance: view.total_balance(),
            total_pnl: view.total_pnl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PnlData;
    use chrono::{Duration, Utc};

    #[test]
    fn test_display_agent_points() {
        let t0 = Utc::now();
        let mut agent = Agent::new("Alpha", dec!(1000), t0);
        agent.record_tick(PnlData::new(t0 + Duration::milliseconds(500), dec!(-2.50)));
        agent.record_tick(PnlData::new(t0 + Duration::milliseconds(1000), dec!(5)));

        let display = DisplayAgent::from_agent(&agent);
        assert_eq!(display.points, vec![(0.0, 0.0), (0.5, -2.5), (1.0, 5.0)]);
        assert_eq!(display.value_bounds(), (-2.5, 5.0));
        assert_eq!(display.time_bounds(), (0.0, 1.0));
        assert_eq!(display.pnl_pct(), dec!(0.50));
    }

    #[test]
    fn test_flat_history_bounds() {
        let agent = Agent::new("Flat", dec!(1000), Utc::now());
        let display = DisplayAgent::from_agent(&agent);
        assert_eq!(display.value_bounds(), (-1.0, 1.0));
    }
}
