//! Terminal User Interface module
//!
//! Dashboard for creating agents, assigning strategies and watching P&L.

pub mod app;
pub mod data;
pub mod event;
pub mod runner;
pub mod theme;
pub mod ui;
pub mod widgets;


pub use app::{AppCommand, TuiApp};
pub use data::{DashboardStats, DisplayAgent};
pub use event::{AppEvent, EventHandler, KeyAction};
pub use runner::{run_dashboard, DashboardRunner};
pub use theme::Theme;

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
