//! Event handling for TUI
//!
//! Manages keyboard input and redraw ticks.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

/// TUI Events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Regular tick for UI refresh
    Tick,
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// Event handler that manages the event loop
pub struct EventHandler {
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, tick_rate }
    }

    /// Spawn the tick task and the keyboard thread
    pub fn start(&self) {
        let tick_rate = self.tick_rate;

        let tick_tx = self.tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tick_tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        // crossterm reads block, so they live on a plain thread
        let key_tx = self.tx.clone();
        std::thread::spawn(move || loop {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                let sent = match event::read() {
                    Ok(Event::Key(key)) => key_tx.send(AppEvent::Key(key)),
                    Ok(Event::Resize(w, h)) => key_tx.send(AppEvent::Resize(w, h)),
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            } else if key_tx.is_closed() {
                break;
            }
        });
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

/// Key action derived from key event (outside of forms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    SelectPrev,
    SelectNext,
    Help,
    NewAgent,
    AssignStrategy,
    GenerateStrategy,
    EditAgent,
    RemoveAgent,
    Connect,
    Disconnect,
    Dismiss,
    None,
}

impl From<KeyEvent> for KeyAction {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => KeyAction::SelectPrev,
            KeyCode::Down | KeyCode::Char('j') => KeyAction::SelectNext,
            KeyCode::Char('?') => KeyAction::Help,
            KeyCode::Char('n') => KeyAction::NewAgent,
            KeyCode::Char('a') => KeyAction::AssignStrategy,
            KeyCode::Char('g') => KeyAction::GenerateStrategy,
            KeyCode::Char('e') => KeyAction::EditAgent,
            KeyCode::Char('x') => KeyAction::RemoveAgent,
            KeyCode::Char('c') => KeyAction::Connect,
            KeyCode::Char('d') => KeyAction::Disconnect,
            KeyCode::Esc => KeyAction::Dismiss,
            _ => KeyAction::None,
        }
    }
}
