/// Input validation for agent and strategy requests
///
/// The engine assumes well-formed input; these checks run at the handle
/// boundary before a request is queued, so rejected input never reaches the
/// simulation core.
use crate::error::{SimError, Result};
use rust_decimal::Decimal;

/// Maximum characters in an agent name
pub const MAX_NAME_LEN: usize = 64;

/// Maximum characters in a strategy goal prompt
pub const MAX_GOAL_LEN: usize = 500;

/// Largest accepted simulation balance (one trillion)
pub const MAX_BALANCE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Validate an agent display name
pub fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SimError::Validation("Agent name is required.".to_string()));
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(SimError::Validation(format!(
            "Agent name cannot exceed {} characters",
            MAX_NAME_LEN
        )));
    }

    Ok(())
}

/// Validate a simulation balance (strictly positive, at most `MAX_BALANCE`)
pub fn validate_balance(balance: Decimal) -> Result<()> {
    if balance <= Decimal::ZERO {
        return Err(SimError::Validation(format!(
            "Balance must be a positive number: {}",
            balance
        )));
    }

    if balance > MAX_BALANCE {
        return Err(SimError::Validation(format!(
            "Balance {} exceeds maximum {}",
            balance, MAX_BALANCE
        )));
    }

    Ok(())
}

/// Validate an avatar URL (required on edit)
pub fn validate_avatar_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(SimError::Validation("Avatar URL is required.".to_string()));
    }

    Ok(())
}

/// Validate the free-text goal handed to the strategy provider
pub fn validate_goal(goal: &str) -> Result<()> {
    let trimmed = goal.trim();
    if trimmed.is_empty() {
        return Err(SimError::Validation(
            "Please describe your investment goal.".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_GOAL_LEN {
        return Err(SimError::Validation(format!(
            "Goal cannot exceed {} characters",
            MAX_GOAL_LEN
        )));
    }

    Ok(())
}

/// Parse user-typed balance text, e.g. "10000" or "2,500.50"
pub fn parse_balance(input: &str) -> Result<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    let balance: Decimal = cleaned
        .parse()
        .map_err(|_| SimError::Validation(format!("Balance is not a number: {}", input.trim())))?;
    validate_balance(balance)?;
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Alpha").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_balance() {
        assert!(validate_balance(dec!(0.01)).is_ok());
        assert!(validate_balance(Decimal::ZERO).is_err());
        assert!(validate_balance(dec!(-5)).is_err());
        assert!(validate_balance(MAX_BALANCE).is_ok());
        assert!(validate_balance(MAX_BALANCE + dec!(0.01)).is_err());
        assert_eq!(MAX_BALANCE, dec!(1000000000000));
    }

    #[test]
    fn test_validate_goal() {
        assert!(validate_goal("steady income").is_ok());
        assert!(validate_goal("").is_err());
    }

    #[test]
    fn test_parse_balance() {
        assert_eq!(parse_balance("10000").unwrap(), dec!(10000));
        assert_eq!(parse_balance(" $2,500.50 ").unwrap(), dec!(2500.50));
        assert!(parse_balance("abc").is_err());
        assert!(parse_balance("-1").is_err());
        assert!(parse_balance("0").is_err());
        assert!(matches!(
            parse_balance("79228162514264337593543950335"),
            Err(SimError::Validation(_))
        ));
    }
}
