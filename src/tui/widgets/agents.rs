//! Agents widget: one row per agent with status, strategy and P&L

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};

use crate::tui::app::TuiApp;
use crate::tui::theme::THEME;
use crate::tui::widgets::format_currency;

/// Render the agents table with the current selection highlighted
pub fn render_agents(f: &mut Frame, area: Rect, app: &TuiApp) {
    let header_cells = ["Agent", "Status", "Strategy", "Risk", "Balance", "P&L", "P&L %"]
        .iter()
        .map(|h| Cell::from(*h).style(THEME.title_style()));
    let header = Row::new(header_cells).height(1);

    let rows = app.agents.iter().map(|a| {
        let (strategy, strategy_style) = match &a.strategy {
            Some(name) => (name.clone(), THEME.text_style()),
            None => ("No strategy".to_string(), THEME.inactive_style()),
        };
        let risk = match a.risk {
            Some(risk) => Cell::from(risk.as_str()).style(THEME.risk_style(risk)),
            None => Cell::from("-").style(THEME.inactive_style()),
        };

        Row::new(vec![
            Cell::from(a.name.clone()).style(THEME.text_style()),
            Cell::from(a.status.as_str()).style(THEME.status_style(a.status)),
            Cell::from(strategy).style(strategy_style),
            risk,
            Cell::from(format_currency(a.balance)).style(THEME.text_style()),
            Cell::from(format_currency(a.pnl)).style(THEME.pnl_style(a.pnl)),
            Cell::from(format!("{}%", a.pnl_pct())).style(THEME.pnl_style(a.pnl)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(8),
            Constraint::Min(18),
            Constraint::Length(7),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .row_highlight_style(THEME.selected_style())
    .highlight_symbol("> ")
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Agents ({}) ", app.agents.len()))
            .title_style(THEME.title_style())
            .border_style(THEME.border_style()),
    );

    let mut state = TableState::default();
    if !app.agents.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}
