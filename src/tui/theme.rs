//! Theme and color definitions for the TUI dashboard
//!
//! Cyan borders, green profit, red loss, risk levels on a green-yellow-red scale.

use ratatui::style::{Color, Modifier, Style};
use rust_decimal::Decimal;

use crate::domain::{AgentStatus, RiskLevel};

/// Theme configuration for the dashboard
#[derive(Debug, Clone)]
pub struct Theme {
    /// Border color (cyan)
    pub border: Color,
    /// Title color
    pub title: Color,
    /// Profit color (green)
    pub profit: Color,
    /// Loss color (red)
    pub loss: Color,
    /// Highlight/accent color (yellow)
    pub highlight: Color,
    /// Inactive/dim color
    pub inactive: Color,
    /// Normal text color
    pub text: Color,
    /// Selected row background
    pub selection: Color,
    /// Error message color
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Color::Cyan,
            title: Color::Cyan,
            profit: Color::Green,
            loss: Color::Red,
            highlight: Color::Yellow,
            inactive: Color::DarkGray,
            text: Color::White,
            selection: Color::Rgb(30, 40, 60),
            error: Color::LightRed,
        }
    }
}

impl Theme {
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    pub fn inactive_style(&self) -> Style {
        Style::default().fg(self.inactive)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Green at or above zero, red below
    pub fn pnl_style(&self, value: Decimal) -> Style {
        if value >= Decimal::ZERO {
            Style::default().fg(self.profit)
        } else {
            Style::default().fg(self.loss)
        }
    }

    pub fn status_style(&self, status: AgentStatus) -> Style {
        match status {
            AgentStatus::Active => Style::default().fg(self.profit),
            AgentStatus::Idle => self.inactive_style(),
            AgentStatus::Error => Style::default().fg(self.loss),
        }
    }

    pub fn risk_style(&self, risk: RiskLevel) -> Style {
        match risk {
            RiskLevel::Low => Style::default().fg(Color::Green),
            RiskLevel::Medium => Style::default().fg(Color::Yellow),
            RiskLevel::High => Style::default().fg(Color::Red),
        }
    }
}

/// Global theme instance
pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);
