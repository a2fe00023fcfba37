//! In-flight strategy generation that the UI can abandon
//!
//! The provider call runs on its own task. Dismissing (or dropping) the
//! request aborts the task, so a late answer is never applied.

use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::Strategy;
use crate::error::{Result, SimError};

use super::provider::StrategyProvider;

/// Pending `generate_strategy` call
pub struct GenerationRequest {
    goal: String,
    result_rx: Option<oneshot::Receiver<Result<Strategy>>>,
    task: JoinHandle<()>,
}

impl GenerationRequest {
    /// Start generating on a background task. Must be called within a tokio runtime.
    pub fn spawn(provider: Arc<dyn StrategyProvider>, goal: impl Into<String>) -> Self {
        let goal = goal.into();
        let (result_tx, result_rx) = oneshot::channel();

        let task_goal = goal.clone();
        let task = tokio::spawn(async move {
            let result = provider.generate_strategy(&task_goal).await;
            if result_tx.send(result).is_err() {
                debug!(goal = %task_goal, "generation finished after the request was dropped");
            }
        });

        Self {
            goal,
            result_rx: Some(result_rx),
            task,
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Non-blocking poll; `Some` once the provider has answered.
    ///
    /// The result is handed out only once.
    pub fn try_take(&mut self) -> Option<Result<Strategy>> {
        let rx = self.result_rx.as_mut()?;
        match rx.try_recv() {
            Ok(result) => {
                self.result_rx = None;
                Some(result)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.result_rx = None;
                Some(Err(SimError::Internal(
                    "strategy generation task ended without a result".into(),
                )))
            }
        }
    }

    /// Wait for the provider's answer
    pub async fn resolve(mut self) -> Result<Strategy> {
        let rx = self.result_rx.take().ok_or(SimError::Cancelled)?;
        rx.await.map_err(|_| {
            SimError::Internal("strategy generation task ended without a result".into())
        })?
    }

    /// Abandon the request; any later answer is discarded
    pub fn dismiss(mut self) {
        debug!(goal = %self.goal, "strategy generation dismissed");
        self.result_rx = None;
        self.task.abort();
    }
}

impl Drop for GenerationRequest {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLevel;
    use crate::strategy::provider::MockStrategyProvider;
    use crate::strategy::TemplateStrategyProvider;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Answers after a delay and records whether it got to finish
    struct SlowProvider {
        finished: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl StrategyProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate_strategy(&self, goal: &str) -> Result<Strategy> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(Strategy::generated(goal, "late", RiskLevel::High))
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_provider_result() {
        let request = GenerationRequest::spawn(Arc::new(TemplateStrategyProvider), "steady growth");
        assert_eq!(request.goal(), "steady growth");

        let strategy = request.resolve().await.unwrap();
        assert_eq!(strategy.risk_level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_failure_surfaces_without_partial_strategy() {
        let mut mock = MockStrategyProvider::new();
        mock.expect_generate_strategy()
            .times(1)
            .returning(|_| Err(SimError::Generation("Invalid response structure".into())));

        let request = GenerationRequest::spawn(Arc::new(mock), "anything");
        assert!(matches!(request.resolve().await, Err(SimError::Generation(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_take_polls_once() {
        let finished = Arc::new(AtomicBool::new(false));
        let mut request = GenerationRequest::spawn(
            Arc::new(SlowProvider {
                finished: finished.clone(),
            }),
            "later",
        );

        assert!(request.try_take().is_none());
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(matches!(request.try_take(), Some(Ok(_))));
        assert!(request.try_take().is_none());
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissed_request_never_completes() {
        let finished = Arc::new(AtomicBool::new(false));
        let request = GenerationRequest::spawn(
            Arc::new(SlowProvider {
                finished: finished.clone(),
            }),
            "abandon me",
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        request.dismiss();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!finished.load(Ordering::SeqCst));
    }
}
