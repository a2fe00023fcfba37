//! TUI Application state management
//!
//! Holds display state and turns key presses into `AppCommand`s. Commands are
//! executed against the engine by the dashboard runner, so everything here
//! stays synchronous and testable without a terminal.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rust_decimal::Decimal;

use crate::domain::{Agent, AgentEdit, AgentId, Strategy};
use crate::engine::AgentsView;
use crate::error::{Result, SimError};
use crate::strategy::predefined_strategies;
use crate::tui::data::{DashboardStats, DisplayAgent};
use crate::tui::event::KeyAction;
use crate::validation;

/// Balance pre-filled in the new-agent form
const DEFAULT_BALANCE: &str = "10000";

/// Work the runner performs on behalf of the UI
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    CreateAgent { name: String, balance: Decimal },
    AssignStrategy { agent_id: AgentId, strategy: Strategy },
    GenerateStrategy { agent_id: AgentId, goal: String },
    DismissGeneration,
    EditAgent { agent_id: AgentId, edit: AgentEdit },
    RemoveAgent(AgentId),
    Connect,
    Disconnect,
}

/// Which request an open form builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    NewAgent,
    EditAgent(AgentId),
    Goal(AgentId),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

impl FormField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Modal text form
#[derive(Debug, Clone)]
pub struct InputForm {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl InputForm {
    pub fn new_agent() -> Self {
        Self::with_fields(
            FormKind::NewAgent,
            vec![
                FormField::new("Name", ""),
                FormField::new("Balance", DEFAULT_BALANCE),
            ],
        )
    }

    pub fn edit(agent: &Agent) -> Self {
        Self::with_fields(
            FormKind::EditAgent(agent.id),
            vec![
                FormField::new("Name", agent.name.clone()),
                FormField::new("Balance", agent.balance.to_string()),
                FormField::new("Avatar URL", agent.avatar_url.clone()),
            ],
        )
    }

    pub fn goal(agent_id: AgentId) -> Self {
        Self::with_fields(FormKind::Goal(agent_id), vec![FormField::new("Goal", "")])
    }

    fn with_fields(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::NewAgent => " Create New Agent ",
            FormKind::EditAgent(_) => " Edit Agent ",
            FormKind::Goal(_) => " Generate Strategy with AI ",
        }
    }

    fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|f| f.value.as_str()).unwrap_or("")
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn focus_prev(&mut self) {
        self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
    }

    fn is_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    /// Validate the fields and build the command
    pub fn submit(&self) -> Result<AppCommand> {
        match self.kind {
            FormKind::NewAgent => {
                let name = self.value(0).trim();
                validation::validate_name(name)?;
                let balance = validation::parse_balance(self.value(1))?;
                Ok(AppCommand::CreateAgent {
                    name: name.to_string(),
                    balance,
                })
            }
            FormKind::EditAgent(agent_id) => {
                let name = self.value(0).trim();
                validation::validate_name(name)?;
                let balance = validation::parse_balance(self.value(1))?;
                let avatar_url = self.value(2).trim();
                validation::validate_avatar_url(avatar_url)?;
                Ok(AppCommand::EditAgent {
                    agent_id,
                    edit: AgentEdit {
                        name: name.to_string(),
                        balance,
                        avatar_url: avatar_url.to_string(),
                    },
                })
            }
            FormKind::Goal(agent_id) => {
                let goal = self.value(0).trim();
                validation::validate_goal(goal)?;
                Ok(AppCommand::GenerateStrategy {
                    agent_id,
                    goal: goal.to_string(),
                })
            }
        }
    }
}

/// A generation the runner is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    pub agent_id: AgentId,
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// Text shown to the user for a failed request
pub fn user_message(err: &SimError) -> String {
    match err {
        SimError::Validation(msg) => msg.clone(),
        SimError::Generation(_) | SimError::Http(_) => {
            "Could not generate strategy from AI. Please try again.".to_string()
        }
        other => other.to_string(),
    }
}

/// TUI Application state
pub struct TuiApp {
    /// Latest snapshot from the engine
    pub view: AgentsView,
    /// Rows derived from `view`
    pub agents: Vec<DisplayAgent>,
    pub stats: DashboardStats,
    /// Truncated wallet address while connected
    pub wallet: Option<String>,
    pub selected: usize,
    pub form: Option<InputForm>,
    pub generating: Option<PendingGeneration>,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
    pub running: bool,
    pub last_update: DateTime<Utc>,
    /// Agent to select once it shows up in a view
    focus_on: Option<AgentId>,
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiApp {
    pub fn new() -> Self {
        Self {
            view: AgentsView::new(),
            agents: Vec::new(),
            stats: DashboardStats::default(),
            wallet: None,
            selected: 0,
            form: None,
            generating: None,
            status: None,
            show_help: false,
            running: true,
            last_update: Utc::now(),
            focus_on: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn set_wallet(&mut self, wallet: Option<String>) {
        if wallet.is_none() {
            self.form = None;
            self.generating = None;
        }
        self.wallet = wallet;
    }

    pub fn set_info(&mut self, msg: impl Into<String>) {
        self.status = Some(StatusMessage::Info(msg.into()));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status = Some(StatusMessage::Error(msg.into()));
    }

    /// Replace the displayed snapshot
    pub fn apply_view(&mut self, view: AgentsView) {
        self.agents = view.agents.iter().map(DisplayAgent::from_agent).collect();
        self.stats = DashboardStats::from_view(&view);
        self.last_update = view.updated_at;
        self.view = view;

        if let Some(id) = self.focus_on {
            if let Some(idx) = self.agents.iter().position(|a| a.id == id) {
                self.selected = idx;
                self.focus_on = None;
            }
        }
        self.selected = self.selected.min(self.agents.len().saturating_sub(1));
    }

    /// Select `agent_id` as soon as a view contains it
    pub fn focus_agent(&mut self, agent_id: AgentId) {
        self.focus_on = Some(agent_id);
        if let Some(idx) = self.agents.iter().position(|a| a.id == agent_id) {
            self.selected = idx;
            self.focus_on = None;
        }
    }

    pub fn selected_agent(&self) -> Option<&Agent> {
        self.view.agents.get(self.selected)
    }

    pub fn selected_display(&self) -> Option<&DisplayAgent> {
        self.agents.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.agents.is_empty() {
            self.selected = (self.selected + 1) % self.agents.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.agents.is_empty() {
            if self.selected == 0 {
                self.selected = self.agents.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn set_generating(&mut self, agent_id: AgentId, goal: String) {
        self.generating = Some(PendingGeneration { agent_id, goal });
    }

    pub fn finish_generation(&mut self) {
        self.generating = None;
    }

    /// Next predefined strategy after the agent's current one
    fn next_strategy_for(agent: &Agent) -> Option<Strategy> {
        let catalog = predefined_strategies();
        let next = agent
            .strategy
            .as_ref()
            .and_then(|s| catalog.iter().position(|c| c.id == s.id))
            .map(|i| (i + 1) % catalog.len())
            .unwrap_or(0);
        catalog.into_iter().nth(next)
    }

    /// Translate a key press into a command for the runner
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        if self.form.is_some() {
            return self.handle_form_key(key);
        }

        if self.show_help {
            self.show_help = false;
            return None;
        }

        let action = KeyAction::from(key);
        match action {
            KeyAction::Quit => {
                self.quit();
                None
            }
            KeyAction::Help => {
                self.toggle_help();
                None
            }
            KeyAction::SelectNext => {
                self.select_next();
                None
            }
            KeyAction::SelectPrev => {
                self.select_prev();
                None
            }
            KeyAction::Connect => {
                if self.is_connected() {
                    None
                } else {
                    Some(AppCommand::Connect)
                }
            }
            KeyAction::Dismiss => {
                if self.generating.take().is_some() {
                    self.set_info("Strategy generation dismissed");
                    Some(AppCommand::DismissGeneration)
                } else {
                    self.status = None;
                    None
                }
            }
            KeyAction::None => None,
            _ if !self.is_connected() => {
                self.set_error("Connect a wallet first (press c)");
                None
            }
            KeyAction::Disconnect => Some(AppCommand::Disconnect),
            KeyAction::NewAgent => {
                self.form = Some(InputForm::new_agent());
                None
            }
            KeyAction::AssignStrategy => {
                let agent = self.selected_agent()?;
                let agent_id = agent.id;
                let strategy = Self::next_strategy_for(agent)?;
                Some(AppCommand::AssignStrategy { agent_id, strategy })
            }
            KeyAction::GenerateStrategy => {
                if self.generating.is_some() {
                    self.set_error("A strategy is already being generated");
                    return None;
                }
                let agent_id = self.selected_agent()?.id;
                self.form = Some(InputForm::goal(agent_id));
                None
            }
            KeyAction::EditAgent => {
                let form = InputForm::edit(self.selected_agent()?);
                self.form = Some(form);
                None
            }
            KeyAction::RemoveAgent => {
                let agent_id = self.selected_agent()?.id;
                Some(AppCommand::RemoveAgent(agent_id))
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        let form = self.form.as_mut()?;

        match key.code {
            KeyCode::Esc => {
                self.form = None;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => {
                if let Some(field) = form.fields.get_mut(form.focus) {
                    field.value.pop();
                }
            }
            KeyCode::Enter if !form.is_last_field() => form.focus_next(),
            KeyCode::Enter => match form.submit() {
                Ok(command) => {
                    self.form = None;
                    return Some(command);
                }
                Err(e) => form.error = Some(user_message(&e)),
            },
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                if let Some(field) = form.fields.get_mut(form.focus) {
                    field.value.push(c);
                    form.error = None;
                }
            }
            _ => {}
        }
        None
    }
}
