//! Agent Engine: single writer over the agent collection
//!
//! The engine owns every `Agent` and is the only caller of the
//! `SimulationScheduler`. Presentation code talks to it through
//! `EngineHandle` (clone-friendly). The `run()` loop uses `tokio::select!` to:
//!   - Apply lifecycle commands (create, assign, edit, remove, teardown)
//!   - Apply tick events from running simulations, discarding stale runs
//!   - Tear the session down on shutdown

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::domain::{Agent, AgentEdit, AgentId, AgentStatus, Strategy};
use crate::error::{Result, SimError};
use crate::simulation::{
    Clock, RandomSourceFactory, SeededRandomFactory, SimulationScheduler, StartOutcome,
    SystemClock, TickEvent,
};
use crate::validation;

use super::command::EngineCommand;
use super::config::EngineConfig;
use super::state::AgentsView;

/// Clonable handle for issuing lifecycle requests and reading the agent view
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    view_rx: watch::Receiver<AgentsView>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| SimError::EngineUnavailable("engine command channel closed".into()))?;
        reply_rx
            .await
            .map_err(|_| SimError::EngineUnavailable("engine dropped the reply".into()))
    }

    /// Create an idle agent after validating name and balance
    pub async fn create_agent(&self, name: &str, balance: Decimal) -> Result<Agent> {
        validation::validate_name(name)?;
        validation::validate_balance(balance)?;

        let name = name.trim().to_string();
        self.request(|reply| EngineCommand::CreateAgent {
            name,
            balance,
            reply,
        })
        .await
    }

    /// Assign a strategy and (re)start the agent's simulation
    pub async fn assign_strategy(&self, agent_id: AgentId, strategy: Strategy) -> Result<Agent> {
        self.request(|reply| EngineCommand::AssignStrategy {
            agent_id,
            strategy,
            reply,
        })
        .await?
    }

    /// Apply an edit; P&L and history are reset
    pub async fn edit_agent(&self, agent_id: AgentId, edit: AgentEdit) -> Result<Agent> {
        validation::validate_name(&edit.name)?;
        validation::validate_balance(edit.balance)?;
        validation::validate_avatar_url(&edit.avatar_url)?;

        let edit = AgentEdit {
            name: edit.name.trim().to_string(),
            avatar_url: edit.avatar_url.trim().to_string(),
            ..edit
        };
        self.request(|reply| EngineCommand::EditAgent {
            agent_id,
            edit,
            reply,
        })
        .await?
    }

    /// Stop the agent's simulation and remove it
    pub async fn remove_agent(&self, agent_id: AgentId) -> Result<Agent> {
        self.request(|reply| EngineCommand::RemoveAgent { agent_id, reply })
            .await?
    }

    /// Stop every simulation and discard all agents
    pub async fn teardown_session(&self) -> Result<()> {
        self.request(|reply| EngineCommand::TeardownSession { reply })
            .await
    }

    /// Latest published snapshot
    pub fn view(&self) -> AgentsView {
        self.view_rx.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<AgentsView> {
        self.view_rx.clone()
    }
}

/// Owner of the canonical agent collection
pub struct AgentEngine {
    config: EngineConfig,
    agents: Vec<Agent>,
    scheduler: SimulationScheduler,
    clock: Arc<dyn Clock>,
    tick_rx: mpsc::Receiver<TickEvent>,
    command_tx: mpsc::Sender<EngineCommand>,
    command_rx: mpsc::Receiver<EngineCommand>,
    view_tx: watch::Sender<AgentsView>,
    discarded_ticks: u64,
}

impl AgentEngine {
    pub fn new(config: EngineConfig) -> Self {
        let random = Arc::new(SeededRandomFactory::new(config.seed));
        Self::with_sources(config, random, Arc::new(SystemClock))
    }

    /// Build with explicit randomness and clock (deterministic tests, replays)
    pub fn with_sources(
        config: EngineConfig,
        random: Arc<dyn RandomSourceFactory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (tick_tx, tick_rx) = mpsc::channel(config.tick_channel_capacity.max(1));
        let (command_tx, command_rx) = mpsc::channel(config.command_channel_capacity.max(1));
        let (view_tx, _) = watch::channel(AgentsView::empty_at(clock.now()));
        let scheduler = SimulationScheduler::new(config.scheduler, tick_tx, random, clock.clone());

        Self {
            config,
            agents: Vec::new(),
            scheduler,
            clock,
            tick_rx,
            command_tx,
            command_rx,
            view_tx,
            discarded_ticks: 0,
        }
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            command_tx: self.command_tx.clone(),
            view_rx: self.view_tx.subscribe(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentsView> {
        self.view_tx.subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the current collection
    pub fn view(&self) -> AgentsView {
        AgentsView {
            agents: self.agents.clone(),
            active_simulations: self.scheduler.active_count(),
            updated_at: self.clock.now(),
        }
    }

    pub fn agent(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == agent_id)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn active_simulations(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn is_simulating(&self, agent_id: &AgentId) -> bool {
        self.scheduler.is_running(agent_id)
    }

    /// Tick events dropped because their run had already been stopped
    pub fn discarded_ticks(&self) -> u64 {
        self.discarded_ticks
    }

    fn index_of(&self, agent_id: &AgentId) -> Result<usize> {
        self.agents
            .iter()
            .position(|a| &a.id == agent_id)
            .ok_or(SimError::AgentNotFound(*agent_id))
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }

    fn transition(agent: &mut Agent, target: AgentStatus) {
        if agent.status != target && !agent.status.can_transition_to(target) {
            warn!(
                agent_id = %agent.id, from = %agent.status, to = %target,
                "unexpected status transition"
            );
        }
        agent.status = target;
    }

    /// New idle agent with a single zero point; no simulation is started
    pub fn create_agent(&mut self, name: impl Into<String>, balance: Decimal) -> Agent {
        let agent =
            Agent::with_history_cap(name, balance, self.clock.now(), self.config.history_cap);
        info!(agent_id = %agent.id, name = %agent.name, %balance, "agent created");

        self.agents.push(agent.clone());
        self.publish();
        agent
    }

    /// Stop any running simulation, assign `strategy`, and start a fresh run
    /// seeded with the agent's current P&L.
    pub async fn assign_strategy(&mut self, agent_id: AgentId, strategy: Strategy) -> Result<Agent> {
        let idx = self.index_of(&agent_id)?;
        let replaced = self.scheduler.stop(&agent_id).await;

        let agent = &mut self.agents[idx];
        let risk = strategy.risk_level;
        info!(
            %agent_id, strategy = %strategy.name, risk = %risk, replaced,
            "strategy assigned"
        );
        agent.strategy = Some(strategy);
        Self::transition(agent, AgentStatus::Active);

        let outcome =
            self.scheduler
                .start(agent_id, agent.balance, agent.risk_level(), agent.pnl);
        if let StartOutcome::AlreadyRunning(run_id) = outcome {
            warn!(%agent_id, %run_id, "simulation survived stop; keeping existing run");
        }

        let agent = agent.clone();
        self.publish();
        Ok(agent)
    }

    /// Apply an edit. The P&L restarts from zero and, when a strategy is
    /// assigned, a new run starts against the edited balance.
    pub async fn edit_agent(&mut self, agent_id: AgentId, edit: AgentEdit) -> Result<Agent> {
        let idx = self.index_of(&agent_id)?;
        let was_running = self.scheduler.stop(&agent_id).await;

        let now = self.clock.now();
        let agent = &mut self.agents[idx];
        agent.name = edit.name;
        agent.balance = edit.balance;
        agent.avatar_url = edit.avatar_url;
        agent.reset_pnl(now);

        let restarted = match agent.risk_level() {
            Some(risk) => {
                self.scheduler
                    .start(agent_id, agent.balance, Some(risk), agent.pnl)
                    .run_id()
                    .is_some()
            }
            None => false,
        };
        info!(
            %agent_id, name = %agent.name, balance = %agent.balance, was_running, restarted,
            "agent edited"
        );

        let agent = agent.clone();
        self.publish();
        Ok(agent)
    }

    /// Stop the agent's simulation and drop it from the collection
    pub async fn remove_agent(&mut self, agent_id: AgentId) -> Result<Agent> {
        let idx = self.index_of(&agent_id)?;
        self.scheduler.stop(&agent_id).await;

        let agent = self.agents.remove(idx);
        info!(%agent_id, name = %agent.name, final_pnl = %agent.pnl, "agent removed");
        self.publish();
        Ok(agent)
    }

    /// Stop every simulation, then discard every agent
    pub async fn teardown_session(&mut self) {
        let stopped = self.scheduler.stop_all().await;
        let discarded = self.agents.len();
        self.agents.clear();

        info!(stopped, discarded, "session torn down");
        self.publish();
    }

    /// Apply one tick event if it belongs to the agent's current run.
    ///
    /// Returns false when the event was discarded.
    pub fn apply_tick(&mut self, event: TickEvent) -> bool {
        if !self.scheduler.is_current(&event) {
            self.discarded_ticks += 1;
            debug!(
                agent_id = %event.agent_id, run_id = %event.run_id,
                "discarding tick from stopped run"
            );
            return false;
        }

        let Some(agent) = self.agents.iter_mut().find(|a| a.id == event.agent_id) else {
            self.discarded_ticks += 1;
            warn!(agent_id = %event.agent_id, run_id = %event.run_id, "tick for unknown agent");
            return false;
        };

        agent.record_tick(event.point);
        debug!(
            agent_id = %event.agent_id, run_id = %event.run_id, pnl = %event.pnl,
            "tick applied"
        );
        self.publish();
        true
    }

    /// Wait for the next tick from a current run and apply it.
    ///
    /// Stale events met on the way are discarded. Returns None once every
    /// sender is gone.
    pub async fn process_next_tick(&mut self) -> Option<TickEvent> {
        while let Some(event) = self.tick_rx.recv().await {
            if self.apply_tick(event) {
                return Some(event);
            }
        }
        None
    }

    /// Check the collection against the scheduler registry
    pub fn verify_invariants(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for agent in &self.agents {
            let running = self.scheduler.is_running(&agent.id);
            match agent.status {
                AgentStatus::Active => {
                    if agent.strategy.is_none() {
                        errors.push(format!("{}: active without a strategy", agent.id));
                    }
                    if !running {
                        errors.push(format!("{}: active without a simulation", agent.id));
                    }
                }
                AgentStatus::Idle => {
                    if agent.strategy.is_some() {
                        errors.push(format!("{}: idle with a strategy", agent.id));
                    }
                    if running {
                        errors.push(format!("{}: idle with a simulation", agent.id));
                    }
                }
                AgentStatus::Error => {}
            }

            if agent.pnl_history.len() > self.config.history_cap {
                errors.push(format!(
                    "{}: history holds {} points (cap {})",
                    agent.id,
                    agent.pnl_history.len(),
                    self.config.history_cap
                ));
            }

            let times: Vec<_> = agent.pnl_history.iter().map(|p| p.time).collect();
            if times.windows(2).any(|w| w[0] > w[1]) {
                errors.push(format!("{}: history out of time order", agent.id));
            }

            if agent.pnl_history.latest().map(|p| p.value) != Some(agent.pnl) {
                errors.push(format!("{}: pnl differs from latest history point", agent.id));
            }
        }

        let orphaned = self
            .scheduler
            .running_agents()
            .into_iter()
            .filter(|id| self.agent(id).is_none())
            .count();
        if orphaned > 0 {
            errors.push(format!("{} simulations running for unknown agents", orphaned));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    async fn handle_command(&mut self, command: EngineCommand) {
        let kind = command.kind();
        let delivered = match command {
            EngineCommand::CreateAgent {
                name,
                balance,
                reply,
            } => reply.send(self.create_agent(name, balance)).is_ok(),
            EngineCommand::AssignStrategy {
                agent_id,
                strategy,
                reply,
            } => reply
                .send(self.assign_strategy(agent_id, strategy).await)
                .is_ok(),
            EngineCommand::EditAgent {
                agent_id,
                edit,
                reply,
            } => reply.send(self.edit_agent(agent_id, edit).await).is_ok(),
            EngineCommand::RemoveAgent { agent_id, reply } => {
                reply.send(self.remove_agent(agent_id).await).is_ok()
            }
            EngineCommand::TeardownSession { reply } => {
                self.teardown_session().await;
                reply.send(()).is_ok()
            }
        };

        if !delivered {
            debug!(command = kind, "requester went away before the reply");
        }
    }

    /// Main engine loop, blocks until shutdown
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            agents = self.agents.len(),
            tick_ms = self.config.scheduler.tick_interval.as_millis() as u64,
            "agent engine starting main loop"
        );
        self.publish();

        loop {
            tokio::select! {
                biased;

                // --- Shutdown signal ---
                _ = shutdown_rx.recv() => {
                    info!("agent engine: shutdown signal received");
                    self.teardown_session().await;
                    break;
                }

                // --- Lifecycle commands ---
                Some(command) = self.command_rx.recv() => {
                    self.handle_command(command).await;
                }

                // --- Simulation ticks ---
                Some(event) = self.tick_rx.recv() => {
                    self.apply_tick(event);
                }
            }
        }

        info!(discarded_ticks = self.discarded_ticks, "agent engine: main loop exited");
    }
}
