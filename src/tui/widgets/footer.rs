//! Footer status bar widget
//!
//! Displays portfolio totals, the last status message, and key hints.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::{StatusMessage, TuiApp};
use crate::tui::theme::THEME;
use crate::tui::widgets::format_currency;

/// Render the footer status bar
pub fn render_footer(f: &mut Frame, area: Rect, app: &TuiApp) {
    let stats = &app.stats;

    let mut spans = vec![
        Span::raw("  Agents: "),
        Span::styled(
            format!("{}/{}", stats.active_count, stats.agent_count),
            THEME.highlight_style(),
        ),
        Span::raw("  Balance: "),
        Span::styled(format_currency(stats.total_balance), THEME.highlight_style()),
        Span::raw("  P&L: "),
        Span::styled(format_currency(stats.total_pnl), THEME.pnl_style(stats.total_pnl)),
        Span::raw("  "),
    ];

    if let Some(pending) = &app.generating {
        spans.push(Span::styled(
            format!("[GENERATING: {}] ", pending.goal),
            THEME.highlight_style(),
        ));
    }

    match &app.status {
        Some(StatusMessage::Info(msg)) => spans.push(Span::styled(msg.clone(), THEME.text_style())),
        Some(StatusMessage::Error(msg)) => spans.push(Span::styled(msg.clone(), THEME.error_style())),
        None => spans.push(Span::styled("? help  q quit", THEME.inactive_style())),
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
