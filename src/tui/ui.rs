//! Main UI rendering logic
//!
//! Orchestrates the layout and renders all widgets.

use ratatui::{
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::TuiApp;
use crate::tui::theme::THEME;
use crate::tui::widgets;

/// Render the entire UI
pub fn render(f: &mut Frame, app: &TuiApp) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(6),    // Agents table
        Constraint::Min(10),   // P&L chart
        Constraint::Length(1), // Footer status bar
    ])
    .split(f.area());

    render_header(f, chunks[0], app);

    if app.is_connected() {
        widgets::render_agents(f, chunks[1], app);
        widgets::render_pnl_chart(f, chunks[2], app);
    } else {
        widgets::render_connect_prompt(f, chunks[1].union(chunks[2]));
    }
    widgets::render_footer(f, chunks[3], app);

    if let Some(form) = &app.form {
        widgets::render_form(f, f.area(), form);
    } else if app.show_help {
        widgets::render_help(f, f.area());
    }
}

fn render_header(f: &mut Frame, area: ratatui::layout::Rect, app: &TuiApp) {
    let wallet = match &app.wallet {
        Some(address) => Span::styled(format!("wallet {}", address), THEME.highlight_style()),
        None => Span::styled("wallet disconnected", THEME.inactive_style()),
    };

    let line = Line::from(vec![
        Span::styled("  AI Agent Trading Dashboard  ", THEME.title_style()),
        wallet,
        Span::styled(
            format!("  sims {}", app.stats.running_simulations),
            THEME.inactive_style(),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
