//! Overlay widgets: input form, help, wallet prompt

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::app::InputForm;
use crate::tui::theme::THEME;

/// Rect of at most `width` x `height` centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn render_form(f: &mut Frame, area: Rect, form: &InputForm) {
    let height = form.fields.len() as u16 * 2 + 5;
    let popup = centered_rect(60, height, area);

    let mut lines = Vec::new();
    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focus;
        let label_style = if focused {
            THEME.highlight_style()
        } else {
            THEME.inactive_style()
        };
        lines.push(Line::from(Span::styled(format!("{}:", field.label), label_style)));

        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{}{}", field.value, cursor), THEME.text_style()),
        ]));
    }
    lines.push(Line::raw(""));
    match &form.error {
        Some(err) => lines.push(Line::from(Span::styled(err.clone(), THEME.error_style()))),
        None => lines.push(Line::from(Span::styled(
            "Tab next field | Enter submit | Esc cancel",
            THEME.inactive_style(),
        ))),
    }

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(form.title())
                .title_style(THEME.title_style())
                .border_style(THEME.border_style()),
        ),
        popup,
    );
}

const HELP_LINES: [(&str, &str); 11] = [
    ("c", "connect wallet"),
    ("d", "disconnect wallet (discards all agents)"),
    ("n", "create agent"),
    ("a", "assign next predefined strategy"),
    ("g", "generate a strategy from a goal"),
    ("e", "edit agent (resets P&L)"),
    ("x", "remove agent"),
    ("j / k", "select next / previous"),
    ("Esc", "dismiss pending generation or message"),
    ("?", "toggle help"),
    ("q", "quit"),
];

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(56, HELP_LINES.len() as u16 + 2, area);
    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!(" {:<6}", key), THEME.highlight_style()),
                Span::styled(*desc, THEME.text_style()),
            ])
        })
        .collect();

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keys ")
                .title_style(THEME.title_style())
                .border_style(THEME.border_style()),
        ),
        popup,
    );
}

pub fn render_connect_prompt(f: &mut Frame, area: Rect) {
    let popup = centered_rect(54, 7, area);
    let text = vec![
        Line::from(Span::styled("Connect Your Wallet", THEME.title_style())),
        Line::raw(""),
        Line::from(Span::styled(
            "To start creating and managing your trading agents, press c to connect your wallet.",
            THEME.text_style(),
        )),
    ];

    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(THEME.border_style()),
            ),
        popup,
    );
}
