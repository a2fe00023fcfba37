use std::sync::Arc;
use std::time::Duration;

use agentsim::domain::{AgentEdit, AgentId, AgentStatus, RiskLevel, Strategy};
use agentsim::engine::{AgentEngine, EngineConfig, EngineHandle};
use agentsim::error::SimError;
use agentsim::session::WalletSession;
use agentsim::simulation::{SequenceSourceFactory, SystemClock};
use agentsim::strategy::predefined_strategies;
use agentsim::validation::MAX_BALANCE;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

fn spawn_engine(draw: f64) -> (EngineHandle, broadcast::Sender<()>, JoinHandle<()>) {
    let engine = AgentEngine::with_sources(
        EngineConfig::default(),
        Arc::new(SequenceSourceFactory::constant(draw)),
        Arc::new(SystemClock),
    );
    let handle = engine.handle();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(engine.run(shutdown_rx));
    (handle, shutdown_tx, task)
}

fn medium() -> Strategy {
    Strategy::new("momentum-rider", "Momentum Rider", "Follows trends", RiskLevel::Medium)
}

/// A 10,000 agent on a medium strategy gains 2.50 per tick with a 0.98 draw.
#[tokio::test(start_paused = true)]
async fn assigned_agent_accumulates_pnl_through_handle() {
    let (handle, shutdown_tx, task) = spawn_engine(0.98);

    let agent = handle.create_agent("Alpha", dec!(10000)).await.unwrap();
    assert_eq!(agent.status, AgentStatus::Idle);
    assert_eq!(agent.pnl_history.len(), 1);

    handle.assign_strategy(agent.id, medium()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_250)).await;

    let view = handle.view();
    let agent = view.get(&agent.id).unwrap();
    assert_eq!(agent.status, AgentStatus::Active);
    assert!(agent.pnl > Decimal::ZERO);
    assert_eq!(agent.pnl % dec!(2.50), Decimal::ZERO);
    assert_eq!(agent.pnl_history.latest().map(|p| p.value), Some(agent.pnl));
    assert_eq!(view.active_simulations, 1);

    let _ = shutdown_tx.send(());
    task.await.unwrap();
}

/// Long runs keep only the newest 100 samples.
#[tokio::test(start_paused = true)]
async fn history_is_capped_at_one_hundred_samples() {
    let (handle, shutdown_tx, task) = spawn_engine(0.98);

    let agent = handle.create_agent("Alpha", dec!(10000)).await.unwrap();
    handle.assign_strategy(agent.id, medium()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(90)).await;

    let view = handle.view();
    let agent = view.get(&agent.id).unwrap();
    assert_eq!(agent.pnl_history.len(), 100);
    assert!(agent.pnl >= dec!(2.50) * dec!(150));

    let values: Vec<Decimal> = agent.pnl_history.iter().map(|p| p.value).collect();
    assert!(values.windows(2).all(|w| w[1] - w[0] == dec!(2.50)));
    assert_eq!(values.last().copied(), Some(agent.pnl));

    let _ = shutdown_tx.send(());
    task.await.unwrap();
}

/// Rapid reassignment leaves exactly one live simulation per agent.
#[tokio::test(start_paused = true)]
async fn repeated_assignment_keeps_one_simulation() {
    let (handle, shutdown_tx, task) = spawn_engine(0.98);

    let agent = handle.create_agent("Alpha", dec!(10000)).await.unwrap();
    for strategy in predefined_strategies() {
        handle.assign_strategy(agent.id, strategy).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    let view = handle.view();
    assert_eq!(view.active_simulations, 1);
    let agent = view.get(&agent.id).unwrap();
    assert_eq!(agent.risk_level(), Some(RiskLevel::High));
    // One tick of the high-risk run: 10000 * 0.0005 * 0.5 * 2
    assert_eq!(agent.pnl, dec!(5.00));

    let _ = shutdown_tx.send(());
    task.await.unwrap();
}

/// Editing resets the history and restarts against the new balance.
#[tokio::test(start_paused = true)]
async fn edit_resets_and_restarts() {
    let (handle, shutdown_tx, task) = spawn_engine(0.98);

    let agent = handle.create_agent("Alpha", dec!(10000)).await.unwrap();
    handle.assign_strategy(agent.id, medium()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(handle.view().get(&agent.id).unwrap().pnl > Decimal::ZERO);

    let edited = handle
        .edit_agent(
            agent.id,
            AgentEdit {
                name: "  Beta  ".to_string(),
                balance: dec!(20000),
                avatar_url: agent.avatar_url.clone(),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.name, "Beta");
    assert_eq!(edited.pnl, Decimal::ZERO);
    assert_eq!(edited.pnl_history.len(), 1);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let agent = handle.view().get(&agent.id).cloned().unwrap();
    assert_eq!(agent.pnl, dec!(5.00));
    assert_eq!(agent.pnl_history.len(), 2);

    let _ = shutdown_tx.send(());
    task.await.unwrap();
}

/// Boundary validation rejects bad input before it reaches the engine.
#[tokio::test]
async fn invalid_requests_are_rejected() {
    let (handle, shutdown_tx, task) = spawn_engine(0.5);

    let err = handle.create_agent("   ", dec!(100)).await.unwrap_err();
    assert!(matches!(err, SimError::Validation(_)));

    let err = handle.create_agent("Alpha", dec!(-1)).await.unwrap_err();
    assert!(matches!(err, SimError::Validation(_)));

    let err = handle.create_agent("Whale", Decimal::MAX).await.unwrap_err();
    assert!(matches!(err, SimError::Validation(_)));
    assert!(handle.create_agent("Whale", MAX_BALANCE).await.is_ok());

    let err = handle
        .assign_strategy(AgentId::new(), medium())
        .await
        .unwrap_err();
    assert!(matches!(err, SimError::AgentNotFound(_)));
    assert_eq!(handle.view().len(), 1);

    let _ = shutdown_tx.send(());
    task.await.unwrap();
}

/// Disconnecting the wallet stops every run and clears the collection.
#[tokio::test(start_paused = true)]
async fn disconnect_tears_down_the_session() {
    let (handle, shutdown_tx, task) = spawn_engine(0.98);
    let mut session = WalletSession::new();
    session.connect();

    for (i, strategy) in predefined_strategies().into_iter().enumerate() {
        let agent = handle
            .create_agent(&format!("Agent {}", i + 1), dec!(5000))
            .await
            .unwrap();
        handle.assign_strategy(agent.id, strategy).await.unwrap();
    }
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.view().active_simulations, 4);

    tokio_test::assert_ok!(session.disconnect(&handle).await);
    assert!(!session.is_connected());

    let view = handle.view();
    assert!(view.is_empty());
    assert_eq!(view.active_simulations, 0);

    // Nothing comes back after teardown
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(handle.view().is_empty());

    let _ = shutdown_tx.send(());
    task.await.unwrap();
}

/// Requests after shutdown fail instead of hanging.
#[tokio::test]
async fn handle_reports_stopped_engine() {
    let (handle, shutdown_tx, task) = spawn_engine(0.5);
    let _ = shutdown_tx.send(());
    task.await.unwrap();

    let err = handle.create_agent("Alpha", dec!(100)).await.unwrap_err();
    assert!(matches!(err, SimError::EngineUnavailable(_)));
}

/// A seeded mix of lifecycle calls never leaves more than one run per agent.
#[tokio::test(start_paused = true)]
async fn random_lifecycle_mix_keeps_invariants() {
    let mut engine = AgentEngine::with_sources(
        EngineConfig::default(),
        Arc::new(SequenceSourceFactory::new(vec![0.1, 0.9, 0.5, 0.73])),
        Arc::new(SystemClock),
    );
    let catalog = predefined_strategies();
    let mut rng = StdRng::seed_from_u64(2024);

    for step in 0..400 {
        let ids: Vec<AgentId> = engine.agents().iter().map(|a| a.id).collect();
        let pick = |rng: &mut StdRng| ids[rng.gen_range(0..ids.len())];

        match rng.gen_range(0..6) {
            0 if ids.len() < 8 => {
                engine.create_agent(format!("Agent {}", step), dec!(1000));
            }
            1 | 2 if !ids.is_empty() => {
                let strategy = catalog[rng.gen_range(0..catalog.len())].clone();
                engine.assign_strategy(pick(&mut rng), strategy).await.unwrap();
            }
            3 if !ids.is_empty() => {
                let id = pick(&mut rng);
                let edit = AgentEdit {
                    name: format!("Edited {}", step),
                    balance: Decimal::from(rng.gen_range(1..50_000u32)),
                    avatar_url: "https://example.com/a.svg".to_string(),
                };
                engine.edit_agent(id, edit).await.unwrap();
            }
            4 if !ids.is_empty() => {
                engine.remove_agent(pick(&mut rng)).await.unwrap();
            }
            _ => {
                let _ = tokio::time::timeout(
                    Duration::from_millis(rng.gen_range(100..1_200)),
                    engine.process_next_tick(),
                )
                .await;
            }
        }

        if let Err(errors) = engine.verify_invariants() {
            panic!("step {}: {:?}", step, errors);
        }
        assert!(engine.active_simulations() <= engine.agents().len());
        for agent in engine.agents() {
            assert_eq!(engine.is_simulating(&agent.id), agent.strategy.is_some());
        }
    }

    engine.teardown_session().await;
    assert_eq!(engine.active_simulations(), 0);
    assert!(engine.verify_invariants().is_ok());
}
