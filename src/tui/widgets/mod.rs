//! TUI Widget components
//!
//! Modular widgets for the dashboard display.

pub mod agents;
pub mod footer;
pub mod pnl_chart;
pub mod popup;

pub use agents::render_agents;
pub use footer::render_footer;
pub use pnl_chart::render_pnl_chart;
pub use popup::{centered_rect, render_connect_prompt, render_form, render_help};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Format currency with commas and 2 decimal places
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2).abs();
    let int_part = rounded.trunc();
    let cents = ((rounded - int_part) * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u32()
        .unwrap_or(0);

    let int_str = format_with_commas(&int_part.to_string());
    let sign = if value.round_dp(2).is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{}${}.{:02}", sign, int_str, cents)
}

/// Insert thousands separators into a string of digits
fn format_with_commas(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(-2.5)), "-$2.50");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(999)), "$999.00");
    }
}
