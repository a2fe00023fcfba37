//! P&L chart for the selected agent

use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

use crate::tui::app::TuiApp;
use crate::tui::theme::THEME;
use crate::tui::widgets::format_currency;

pub fn render_pnl_chart(f: &mut Frame, area: Rect, app: &TuiApp) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title_style(THEME.title_style())
        .border_style(THEME.border_style());

    let Some(agent) = app.selected_display() else {
        let empty = Paragraph::new("Create an agent (n) to start simulating.")
            .style(THEME.inactive_style())
            .block(block.title(" P&L "));
        f.render_widget(empty, area);
        return;
    };

    let (y_min, y_max) = agent.value_bounds();
    let (x_min, x_max) = agent.time_bounds();
    let line_style = THEME.pnl_style(agent.pnl);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(line_style)
        .data(&agent.points);

    let title = format!(
        " {} | P&L {} ({}%) ",
        agent.name,
        format_currency(agent.pnl),
        agent.pnl_pct()
    );

    let chart = Chart::new(vec![dataset])
        .block(block.title(title))
        .x_axis(
            Axis::default()
                .style(THEME.inactive_style())
                .bounds([x_min, x_max])
                .labels([format!("{:.0}s", x_min), format!("{:.0}s", x_max)]),
        )
        .y_axis(
            Axis::default()
                .style(THEME.inactive_style())
                .bounds([y_min, y_max])
                .labels([format!("{:.2}", y_min), "0".to_string(), format!("{:.2}", y_max)]),
        );

    f.render_widget(chart, area);
}
