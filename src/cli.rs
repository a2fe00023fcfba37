use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{Agent, Strategy};
use crate::engine::{AgentEngine, EngineConfig};
use crate::error::{Result, SimError};
use crate::strategy::{predefined_strategies, provider_from_config};
use crate::tui::widgets::format_currency;
use crate::validation;

#[derive(Parser)]
#[command(name = "agentsim")]
#[command(version = "0.1.0")]
#[command(about = "Simulated trading agents with live P&L", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml plus per-environment overrides)
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive terminal dashboard (default)
    Dashboard,
    /// Run agents headless for a while and print their results
    Simulate {
        /// Number of agents to create
        #[arg(short, long, default_value = "3")]
        agents: usize,
        /// How long to simulate
        #[arg(short, long, default_value = "10")]
        seconds: u64,
        /// Starting balance of every agent
        #[arg(short, long, default_value = "10000")]
        balance: String,
        /// Seed for reproducible runs
        #[arg(long, env = "AGENTSIM_SEED")]
        seed: Option<u64>,
    },
    /// List the predefined strategies
    Strategies,
    /// Generate a strategy from an investment goal
    Generate {
        /// Free-text goal, e.g. "steady income with low drawdowns"
        goal: String,
    },
}

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}

#[derive(Debug, Serialize, Tabled)]
pub struct StrategyRow {
    pub id: String,
    pub name: String,
    pub risk: String,
    pub description: String,
}

impl From<&Strategy> for StrategyRow {
    fn from(s: &Strategy) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            risk: s.risk_level.to_string(),
            description: s.description.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct AgentRow {
    pub agent: String,
    pub strategy: String,
    pub risk: String,
    pub balance: String,
    pub pnl: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub pnl_value: Decimal,
    pub samples: usize,
}

impl From<&Agent> for AgentRow {
    fn from(a: &Agent) -> Self {
        Self {
            agent: a.name.clone(),
            strategy: a
                .strategy
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "-".to_string()),
            risk: a
                .risk_level()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            balance: format_currency(a.balance),
            pnl: format_currency(a.pnl),
            pnl_value: a.pnl,
            samples: a.pnl_history.len(),
        }
    }
}

/// Headless simulation parameters
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub agents: usize,
    pub duration: Duration,
    pub balance: Decimal,
    pub seed: Option<u64>,
}

/// Create agents, assign the predefined strategies round-robin, let them
/// run for `duration`, and return their final state.
pub async fn run_simulation(config: &AppConfig, opts: &SimulateOptions) -> Result<Vec<AgentRow>> {
    validation::validate_balance(opts.balance)?;
    if opts.agents == 0 {
        return Err(SimError::Validation("at least one agent is required".into()));
    }

    let mut engine_config = EngineConfig::from(&config.simulation);
    engine_config.seed = opts.seed.or(engine_config.seed);
    let mut engine = AgentEngine::new(engine_config);

    let catalog = predefined_strategies();
    for i in 0..opts.agents {
        let agent = engine.create_agent(format!("Agent {}", i + 1), opts.balance);
        let strategy = catalog[i % catalog.len()].clone();
        engine.assign_strategy(agent.id, strategy).await?;
    }
    info!(
        agents = opts.agents,
        seconds = opts.duration.as_secs(),
        seed = ?opts.seed,
        "headless simulation started"
    );

    let deadline = tokio::time::Instant::now() + opts.duration;
    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, stopping simulation early");
                break;
            }
            applied = engine.process_next_tick() => {
                if applied.is_none() {
                    break;
                }
                ticks += 1;
            }
        }
    }

    if let Err(errors) = engine.verify_invariants() {
        return Err(SimError::Internal(errors.join("; ")));
    }

    let rows = engine.agents().iter().map(AgentRow::from).collect();
    engine.teardown_session().await;
    info!(ticks, discarded = engine.discarded_ticks(), "headless simulation finished");
    Ok(rows)
}

pub async fn simulate(
    config: &AppConfig,
    agents: usize,
    seconds: u64,
    balance: &str,
    seed: Option<u64>,
    mode: OutputMode,
) -> Result<()> {
    let opts = SimulateOptions {
        agents,
        duration: Duration::from_secs(seconds),
        balance: validation::parse_balance(balance)?,
        seed,
    };

    let rows = run_simulation(config, &opts).await?;
    print_items(&rows, mode)?;

    if mode == OutputMode::Table {
        let total = rows
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.pnl_value));
        println!("Total P&L: {}", format_currency(total));
    }
    Ok(())
}

pub fn list_strategies(mode: OutputMode) -> Result<()> {
    let rows: Vec<StrategyRow> = predefined_strategies().iter().map(StrategyRow::from).collect();
    print_items(&rows, mode)
}

pub async fn generate(config: &AppConfig, goal: &str, mode: OutputMode) -> Result<()> {
    let provider = provider_from_config(&config.strategy_provider);
    let strategy = provider.generate_strategy(goal).await?;
    print_items(&[StrategyRow::from(&strategy)], mode)
}
