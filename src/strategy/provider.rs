//! StrategyProvider trait and the local template fallback

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::StrategyProviderConfig;
use crate::domain::{RiskLevel, Strategy};
use crate::error::Result;
use crate::validation;

use super::gemini::GeminiStrategyProvider;

/// Turns a free-text investment goal into a `Strategy`.
///
/// Implementations fail with `SimError::Generation` when the backend is
/// unreachable or answers with an incomplete payload; they never return a
/// partially filled strategy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StrategyProvider: Send + Sync {
    /// Short label for logs and the UI
    fn name(&self) -> &str;

    async fn generate_strategy(&self, goal: &str) -> Result<Strategy>;
}

/// Deterministic offline provider: fills a template from the goal text
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateStrategyProvider;

/// Characters of the goal kept in a template strategy name
const TEMPLATE_NAME_CHARS: usize = 20;

impl TemplateStrategyProvider {
    pub fn template_for(goal: &str) -> Strategy {
        let goal = goal.trim();
        let head: String = goal.chars().take(TEMPLATE_NAME_CHARS).collect();
        Strategy::generated(
            format!("AI: {}...", head),
            format!("A custom strategy based on the goal: \"{}\".", goal),
            RiskLevel::Medium,
        )
    }
}

#[async_trait]
impl StrategyProvider for TemplateStrategyProvider {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate_strategy(&self, goal: &str) -> Result<Strategy> {
        validation::validate_goal(goal)?;
        Ok(Self::template_for(goal))
    }
}

/// Gemini when an API key is configured, the template otherwise
pub fn provider_from_config(config: &StrategyProviderConfig) -> Arc<dyn StrategyProvider> {
    if !config.is_configured() {
        info!("no strategy provider API key configured, using local templates");
        return Arc::new(TemplateStrategyProvider);
    }

    match GeminiStrategyProvider::new(config.clone()) {
        Ok(provider) => {
            info!(model = %config.model, "using Gemini strategy provider");
            Arc::new(provider)
        }
        Err(e) => {
            warn!(error = %e, "failed to build Gemini client, using local templates");
            Arc::new(TemplateStrategyProvider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[tokio::test]
    async fn test_template_fills_from_goal() {
        let strategy = TemplateStrategyProvider
            .generate_strategy("steady income with low drawdowns")
            .await
            .unwrap();

        assert_eq!(strategy.name, "AI: steady income with l...");
        assert_eq!(
            strategy.description,
            "A custom strategy based on the goal: \"steady income with low drawdowns\"."
        );
        assert_eq!(strategy.risk_level, RiskLevel::Medium);
        assert!(!strategy.id.is_empty());
    }

    #[tokio::test]
    async fn test_template_short_goal_and_multibyte() {
        let strategy = TemplateStrategyProvider::template_for("grow 💰");
        assert_eq!(strategy.name, "AI: grow 💰...");
    }

    #[tokio::test]
    async fn test_template_rejects_empty_goal() {
        let err = TemplateStrategyProvider.generate_strategy("  ").await.unwrap_err();
        assert!(matches!(err, SimError::Validation(_)));
    }

    #[test]
    fn test_unconfigured_provider_falls_back() {
        let provider = provider_from_config(&StrategyProviderConfig::default());
        assert_eq!(provider.name(), "template");
    }

    #[tokio::test]
    async fn test_mock_provider_failure_is_recoverable() {
        let mut mock = MockStrategyProvider::new();
        mock.expect_generate_strategy()
            .returning(|_| Err(SimError::Generation("unreachable".into())));

        let err = mock.generate_strategy("anything").await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
