//! Predefined strategies offered before any AI generation

use crate::domain::{RiskLevel, Strategy};

/// The built-in strategy catalog, lowest risk first
pub fn predefined_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new(
            "conservative-yield",
            "Conservative Yield",
            "Prioritizes capital preservation with small, steady positions.",
            RiskLevel::Low,
        ),
        Strategy::new(
            "momentum-rider",
            "Momentum Rider",
            "Follows established trends and exits when momentum fades.",
            RiskLevel::Medium,
        ),
        Strategy::new(
            "mean-reversion",
            "Mean Reversion",
            "Fades short-term extremes, betting on a return to the average.",
            RiskLevel::Medium,
        ),
        Strategy::new(
            "volatility-hunter",
            "Volatility Hunter",
            "Sizes up into sharp price swings for outsized gains and losses.",
            RiskLevel::High,
        ),
    ]
}

/// Look a predefined strategy up by id
pub fn find_strategy(id: &str) -> Option<Strategy> {
    predefined_strategies().into_iter().find(|s| s.id == id)
}
