//! Dashboard runner
//!
//! Connects the agent engine to the TUI: redraws on every published view,
//! executes `AppCommand`s through the engine handle, and polls pending
//! strategy generations.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::prelude::*;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::domain::AgentId;
use crate::engine::{AgentEngine, EngineConfig, EngineHandle};
use crate::error::{Result, SimError};
use crate::session::WalletSession;
use crate::strategy::{provider_from_config, GenerationRequest, StrategyProvider};
use crate::tui::app::{user_message, AppCommand, TuiApp};
use crate::tui::event::{AppEvent, EventHandler};
use crate::tui::{init_terminal, restore_terminal, ui};

/// Dashboard runner that owns the UI state and talks to the engine
pub struct DashboardRunner {
    app: TuiApp,
    engine: EngineHandle,
    provider: Arc<dyn StrategyProvider>,
    session: WalletSession,
    generation: Option<(AgentId, GenerationRequest)>,
}

impl DashboardRunner {
    pub fn new(engine: EngineHandle, provider: Arc<dyn StrategyProvider>) -> Self {
        let mut app = TuiApp::new();
        app.apply_view(engine.view());

        Self {
            app,
            engine,
            provider,
            session: WalletSession::new(),
            generation: None,
        }
    }

    pub fn app(&self) -> &TuiApp {
        &self.app
    }

    /// Run the draw/event loop until the user quits
    pub async fn run(mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let mut events = EventHandler::new(Duration::from_millis(100));
        events.start();
        let mut view_rx = self.engine.subscribe();

        loop {
            terminal.draw(|f| ui::render(f, &self.app))?;

            tokio::select! {
                Some(event) = events.next() => match event {
                    AppEvent::Key(key) => {
                        if let Some(command) = self.app.handle_key(key) {
                            self.execute(command).await;
                        }
                    }
                    AppEvent::Tick => self.poll_generation().await,
                    AppEvent::Resize(_, _) => {}
                },

                changed = view_rx.changed() => {
                    if changed.is_err() {
                        error!("agent engine stopped, closing dashboard");
                        break;
                    }
                    let view = view_rx.borrow_and_update().clone();
                    self.app.apply_view(view);
                }
            }

            if !self.app.is_running() {
                break;
            }
        }

        if let Some((_, request)) = self.generation.take() {
            request.dismiss();
        }
        info!("Dashboard stopped");
        Ok(())
    }

    /// Carry out one UI command against the engine
    pub async fn execute(&mut self, command: AppCommand) {
        match command {
            AppCommand::Connect => {
                let address = self.session.connect().truncated();
                self.app.set_wallet(Some(address));
                self.app.set_info("Wallet connected");
            }
            AppCommand::Disconnect => {
                self.dismiss_generation();
                match self.session.disconnect(&self.engine).await {
                    Ok(()) => {
                        self.app.set_wallet(None);
                        self.app.set_info("Wallet disconnected");
                    }
                    Err(e) => self.app.set_error(user_message(&e)),
                }
            }
            AppCommand::CreateAgent { name, balance } => {
                match self.engine.create_agent(&name, balance).await {
                    Ok(agent) => {
                        self.app.focus_agent(agent.id);
                        self.app.set_info(format!("Created agent {}", agent.name));
                    }
                    Err(e) => self.app.set_error(user_message(&e)),
                }
            }
            AppCommand::AssignStrategy { agent_id, strategy } => {
                let name = strategy.name.clone();
                match self.engine.assign_strategy(agent_id, strategy).await {
                    Ok(agent) => self
                        .app
                        .set_info(format!("{} is now running {}", agent.name, name)),
                    Err(e) => self.app.set_error(user_message(&e)),
                }
            }
            AppCommand::GenerateStrategy { agent_id, goal } => {
                self.dismiss_generation();
                let request = GenerationRequest::spawn(self.provider.clone(), goal.clone());
                self.generation = Some((agent_id, request));
                self.app.set_generating(agent_id, goal);
                self.app
                    .set_info(format!("Generating strategy with {}...", self.provider.name()));
            }
            AppCommand::DismissGeneration => self.dismiss_generation(),
            AppCommand::EditAgent { agent_id, edit } => {
                match self.engine.edit_agent(agent_id, edit).await {
                    Ok(agent) => self.app.set_info(format!("Updated {}; P&L reset", agent.name)),
                    Err(e) => self.app.set_error(user_message(&e)),
                }
            }
            AppCommand::RemoveAgent(agent_id) => {
                if matches!(&self.generation, Some((id, _)) if *id == agent_id) {
                    self.dismiss_generation();
                }
                match self.engine.remove_agent(agent_id).await {
                    Ok(agent) => self.app.set_info(format!("Removed {}", agent.name)),
                    Err(e) => self.app.set_error(user_message(&e)),
                }
            }
        }
    }

    fn dismiss_generation(&mut self) {
        if let Some((_, request)) = self.generation.take() {
            request.dismiss();
        }
        self.app.finish_generation();
    }

    /// Apply a finished generation by assigning the strategy it produced
    pub async fn poll_generation(&mut self) {
        let Some((agent_id, request)) = self.generation.as_mut() else {
            return;
        };
        let agent_id = *agent_id;
        let Some(result) = request.try_take() else {
            return;
        };

        self.generation = None;
        self.app.finish_generation();

        match result {
            Ok(strategy) => {
                self.execute(AppCommand::AssignStrategy { agent_id, strategy })
                    .await
            }
            Err(e) => self.app.set_error(user_message(&e)),
        }
    }
}

/// Start an engine, run the dashboard on the terminal, and tear everything
/// down when the user quits.
pub async fn run_dashboard(config: &AppConfig) -> Result<()> {
    let engine = AgentEngine::new(EngineConfig::from(&config.simulation));
    let handle = engine.handle();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let engine_task = tokio::spawn(engine.run(shutdown_rx));

    let provider = provider_from_config(&config.strategy_provider);
    let runner = DashboardRunner::new(handle, provider);

    let mut terminal = init_terminal()?;
    let result = runner.run(&mut terminal).await;
    restore_terminal()?;

    let _ = shutdown_tx.send(());
    engine_task
        .await
        .map_err(|e| SimError::Internal(format!("engine task failed: {}", e)))?;

    result
}
