//! 長時間プレイでの不変条件テスト

mod common;

use common::*;
use livemod::content::{ContentSource, MockContentSource};
use livemod::game::{GameAction, LEVEL_THRESHOLDS};
use livemod::service::choose_action;
use livemod::{GameConfig, GameService};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn busy_config(seed: u64) -> GameConfig {
    GameConfig {
        tick_interval_ms: 3_600_000,
        seed: Some(seed),
        ..Default::default()
    }
}

fn mock_service(seed: u64) -> GameService {
    let source: Arc<dyn ContentSource> = Arc::new(MockContentSource::new(Some(seed)));
    GameService::new(busy_config(seed), source)
}

#[tokio::test(start_paused = true)]
async fn test_invariants_hold_under_random_play() {
    for seed in [1_u64, 7, 42] {
        let service = mock_service(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        service.start();
        settle().await;

        let mut last_score = 0;
        let mut last_level = 1;

        for _ in 0..300 {
            let outcome = service.tick_now();
            settle().await;

            // 半分の確率で何かしらアクションを試す（存在しないIDも混ぜる）
            if rng.gen_bool(0.5) {
                let snapshot = service.snapshot();
                let action = *GameAction::ALL.choose(&mut rng).unwrap();
                let target = match action {
                    GameAction::ResolveAlert => snapshot.alerts.first().map(|a| a.id.clone()),
                    GameAction::ReplyPost | GameAction::IgnorePost => {
                        snapshot.posts.first().map(|p| p.id.clone())
                    }
                    GameAction::CompleteTask => snapshot.tasks.first().map(|t| t.id.clone()),
                    _ => snapshot.chat_messages.last().map(|m| m.id.clone()),
                };
                service.perform(action, target.as_deref().unwrap_or("missing"));
            }

            let snapshot = service.snapshot();
            let resources = snapshot.resources;
            assert!(resources.sanity() <= 100);
            assert!(resources.hype() <= 100);
            assert!(snapshot.chat_messages.len() <= 50);
            assert!(snapshot.tasks.len() <= 4);
            assert!(resources.score() >= last_score);
            assert!(resources.level() >= last_level);
            assert!(resources.level() as usize <= LEVEL_THRESHOLDS.len());
            last_score = resources.score();
            last_level = resources.level();

            if outcome.game_over {
                assert_eq!(resources.sanity(), 0);
                break;
            }
        }

        service.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_over_state_is_never_mutated() {
    let config = GameConfig {
        initial_sanity: 3,
        alert_probability: 1.0,
        ..busy_config(3)
    };
    let source: Arc<dyn ContentSource> = Arc::new(MockContentSource::new(Some(3)));
    let service = GameService::new(config, source);
    service.deliver_batch(alert_batch(5));
    service.start();
    settle().await;

    assert!(service.tick_now().game_over);

    let frozen = service.snapshot();
    for _ in 0..20 {
        assert!(!service.tick_now().executed);
        if let Some((action, target)) = choose_action(&service.snapshot()) {
            assert!(!service.perform(action, &target).is_applied());
        }
    }
    let after = service.snapshot();
    assert_eq!(after.resources, frozen.resources);
    assert_eq!(after.chat_messages, frozen.chat_messages);
    assert_eq!(after.alerts, frozen.alerts);
    assert_eq!(after.posts, frozen.posts);
    assert_eq!(after.tasks, frozen.tasks);
    assert_eq!(after.ticks, frozen.ticks);

    service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_autopilot_session_scores_points() {
    let service = mock_service(21);
    service.start();
    settle().await;

    for _ in 0..100 {
        if service.tick_now().game_over {
            break;
        }
        settle().await;
        if let Some((action, target)) = choose_action(&service.snapshot()) {
            assert!(service.perform(action, &target).is_applied());
        }
    }

    let report = service.report();
    assert!(report.score > 0);
    assert!(report.actions.total > 0);
    assert!(report.peak_viewers >= report.viewers);

    service.shutdown().await;
}
