//! Simulation Scheduler
//!
//! Owns at most one periodic task per agent. Each task draws from its own
//! random source, feeds the generator, and emits a `TickEvent` on the tick
//! channel. The scheduler never touches agent state; the engine consumes the
//! channel.
//!
//! Stopping is a barrier: the task is aborted and awaited before `stop`
//! returns, and every event carries the `RunId` of the run that produced it so
//! events already sitting in the channel can be told apart from the current
//! run's.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::generator::{is_saturated, Clock, PnlModel, RandomSource, RandomSourceFactory};
use crate::domain::{AgentId, PnlData, RiskLevel};

/// Identity of one started simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// One generated sample, addressed to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub agent_id: AgentId,
    pub run_id: RunId,
    pub pnl: Decimal,
    pub point: PnlData,
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(RunId),
    /// A run is already registered for this agent; nothing changed
    AlreadyRunning(RunId),
    /// No risk level to simulate with; nothing changed
    NoStrategyAssigned,
}

impl StartOutcome {
    pub fn run_id(&self) -> Option<RunId> {
        match self {
            StartOutcome::Started(id) | StartOutcome::AlreadyRunning(id) => Some(*id),
            StartOutcome::NoStrategyAssigned => None,
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Time between ticks of one run
    pub tick_interval: Duration,
    pub model: PnlModel,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            model: PnlModel::default(),
        }
    }
}

struct SimulationTask {
    run_id: RunId,
    handle: JoinHandle<()>,
    started_at: DateTime<Utc>,
}

/// Registry of running simulations keyed by agent
pub struct SimulationScheduler {
    config: SchedulerConfig,
    tasks: HashMap<AgentId, SimulationTask>,
    tick_tx: mpsc::Sender<TickEvent>,
    random: Arc<dyn RandomSourceFactory>,
    clock: Arc<dyn Clock>,
    next_run: u64,
}

impl SimulationScheduler {
    pub fn new(
        config: SchedulerConfig,
        tick_tx: mpsc::Sender<TickEvent>,
        random: Arc<dyn RandomSourceFactory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            tasks: HashMap::new(),
            tick_tx,
            random,
            clock,
            next_run: 1,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Start a periodic run for `agent_id` unless one is already registered.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        agent_id: AgentId,
        balance: Decimal,
        risk_level: Option<RiskLevel>,
        initial_pnl: Decimal,
    ) -> StartOutcome {
        if let Some(task) = self.tasks.get(&agent_id) {
            debug!(%agent_id, run_id = %task.run_id, "simulation already running, start ignored");
            return StartOutcome::AlreadyRunning(task.run_id);
        }

        let Some(risk) = risk_level else {
            debug!(%agent_id, "no strategy assigned, start ignored");
            return StartOutcome::NoStrategyAssigned;
        };

        let run_id = RunId(self.next_run);
        self.next_run += 1;

        let run = SimulationRun {
            agent_id,
            run_id,
            balance,
            risk,
            pnl: initial_pnl,
            model: self.config.model,
            interval: self.config.tick_interval,
            random: self.random.source_for(&agent_id),
            clock: self.clock.clone(),
            tx: self.tick_tx.clone(),
        };
        let handle = tokio::spawn(run.run());

        self.tasks.insert(
            agent_id,
            SimulationTask {
                run_id,
                handle,
                started_at: self.clock.now(),
            },
        );

        info!(
            %agent_id, %run_id, %balance, risk = %risk, %initial_pnl,
            "simulation started"
        );
        StartOutcome::Started(run_id)
    }

    /// Cancel the run for `agent_id` and wait for its task to finish.
    ///
    /// Returns false when nothing was registered.
    pub async fn stop(&mut self, agent_id: &AgentId) -> bool {
        let Some(task) = self.tasks.remove(agent_id) else {
            return false;
        };

        task.handle.abort();
        if let Err(e) = task.handle.await {
            if e.is_panic() {
                warn!(%agent_id, run_id = %task.run_id, "simulation task panicked: {}", e);
            }
        }

        let ran_for = self.clock.now() - task.started_at;
        info!(
            %agent_id, run_id = %task.run_id,
            ran_ms = ran_for.num_milliseconds(),
            "simulation stopped"
        );
        true
    }

    /// Stop every registered run. No task runs once this returns.
    pub async fn stop_all(&mut self) -> usize {
        let ids: Vec<AgentId> = self.tasks.keys().copied().collect();
        let mut stopped = 0;
        for id in ids {
            if self.stop(&id).await {
                stopped += 1;
            }
        }
        if stopped > 0 {
            info!(stopped, "all simulations stopped");
        }
        stopped
    }

    pub fn is_running(&self, agent_id: &AgentId) -> bool {
        self.tasks.contains_key(agent_id)
    }

    pub fn run_id(&self, agent_id: &AgentId) -> Option<RunId> {
        self.tasks.get(agent_id).map(|t| t.run_id)
    }

    /// Whether `event` was produced by the run currently registered for its agent
    pub fn is_current(&self, event: &TickEvent) -> bool {
        self.run_id(&event.agent_id) == Some(event.run_id)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn running_agents(&self) -> Vec<AgentId> {
        self.tasks.keys().copied().collect()
    }
}

impl Drop for SimulationScheduler {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.handle.abort();
        }
    }
}

/// State owned by one spawned run
struct SimulationRun {
    agent_id: AgentId,
    run_id: RunId,
    balance: Decimal,
    risk: RiskLevel,
    pnl: Decimal,
    model: PnlModel,
    interval: Duration,
    random: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    tx: mpsc::Sender<TickEvent>,
}

impl SimulationRun {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        // Don't burst-fire missed ticks
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let draw = self.random.next_unit();
            let point =
                self.model
                    .next_point(self.pnl, self.balance, self.risk, draw, self.clock.now());
            if is_saturated(point.value) && !is_saturated(self.pnl) {
                warn!(
                    agent_id = %self.agent_id, run_id = %self.run_id, balance = %self.balance,
                    "simulated P&L hit the representable limit, holding at bound"
                );
            }
            self.pnl = point.value;

            let event = TickEvent {
                agent_id: self.agent_id,
                run_id: self.run_id,
                pnl: point.value,
                point,
            };
            if self.tx.send(event).await.is_err() {
                debug!(agent_id = %self.agent_id, run_id = %self.run_id, "tick channel closed, run exiting");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::generator::{SequenceSourceFactory, SystemClock};
    use rust_decimal_macros::dec;

    fn scheduler(draw: f64) -> (SimulationScheduler, mpsc::Receiver<TickEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let scheduler = SimulationScheduler::new(
            SchedulerConfig::default(),
            tx,
            Arc::new(SequenceSourceFactory::constant(draw)),
            Arc::new(SystemClock),
        );
        (scheduler, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let (mut scheduler, _rx) = scheduler(0.98);
        let id = AgentId::new();

        let first = scheduler.start(id, dec!(10000), Some(RiskLevel::Medium), Decimal::ZERO);
        let second = scheduler.start(id, dec!(500), Some(RiskLevel::High), dec!(9));

        let run = first.run_id().unwrap();
        assert_eq!(first, StartOutcome::Started(run));
        assert_eq!(second, StartOutcome::AlreadyRunning(run));
        assert_eq!(scheduler.active_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_without_strategy_is_noop() {
        let (mut scheduler, _rx) = scheduler(0.98);
        let id = AgentId::new();

        let outcome = scheduler.start(id, dec!(10000), None, Decimal::ZERO);
        assert_eq!(outcome, StartOutcome::NoStrategyAssigned);
        assert!(!scheduler.is_running(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_the_generator() {
        let (mut scheduler, mut rx) = scheduler(0.98);
        let id = AgentId::new();
        let run = scheduler
            .start(id, dec!(10000), Some(RiskLevel::Medium), Decimal::ZERO)
            .run_id()
            .unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();

        assert_eq!(first.agent_id, id);
        assert_eq!(first.run_id, run);
        assert_eq!(first.pnl, dec!(2.50));
        assert_eq!(second.pnl, dec!(5.00));
        assert_eq!(first.point.value, first.pnl);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_interval() {
        let (mut scheduler, mut rx) = scheduler(0.98);
        let id = AgentId::new();
        let started = Instant::now();
        scheduler.start(id, dec!(10000), Some(RiskLevel::Low), Decimal::ZERO);

        rx.recv().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_a_barrier() {
        let (mut scheduler, mut rx) = scheduler(0.98);
        let id = AgentId::new();
        scheduler.start(id, dec!(10000), Some(RiskLevel::Medium), Decimal::ZERO);
        rx.recv().await.unwrap();

        assert!(scheduler.stop(&id).await);
        assert!(!scheduler.is_running(&id));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_unknown_agent_is_noop() {
        let (mut scheduler, _rx) = scheduler(0.98);
        assert!(!scheduler.stop(&AgentId::new()).await);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_run_is_not_current() {
        let (mut scheduler, mut rx) = scheduler(0.98);
        let id = AgentId::new();
        scheduler.start(id, dec!(10000), Some(RiskLevel::Medium), Decimal::ZERO);
        let stale = rx.recv().await.unwrap();

        scheduler.stop(&id).await;
        let fresh_run = scheduler
            .start(id, dec!(10000), Some(RiskLevel::High), Decimal::ZERO)
            .run_id()
            .unwrap();

        assert!(!scheduler.is_current(&stale));
        assert_ne!(stale.run_id, fresh_run);
        let fresh = rx.recv().await.unwrap();
        assert!(scheduler.is_current(&fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_all_silences_every_run() {
        let (mut scheduler, mut rx) = scheduler(0.3);
        for _ in 0..5 {
            scheduler.start(AgentId::new(), dec!(1000), Some(RiskLevel::High), Decimal::ZERO);
        }
        assert_eq!(scheduler.active_count(), 5);

        assert_eq!(scheduler.stop_all().await, 5);
        assert_eq!(scheduler.active_count(), 0);

        // Drain anything sent before the barrier, then nothing more arrives
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
