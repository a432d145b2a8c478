//! ティックスケジューラ
//!
//! 1ティックごとにバッファから表示リストへアイテムを移し、副作用を適用し、
//! タスクを確率的に生成してからリソースを再計算する。
//! 周期実行そのものは `service::GameService` が担当し、ここは1ステップ分の純粋な処理。

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::constants::TASK_CATALOG;
use super::models::{new_entity_id, Alert, ChatMessage, MessageCategory, SocialPost, Task};
use super::resources::GamePhase;
use super::state::GameState;
use crate::config::GameConfig;
use crate::content::{ContentBuffer, ContentKind, FetchRequest, NormalizedBatch};

/// 1ティックの結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// ティックが実行されたか（プレイ中でなければfalse）
    pub executed: bool,
    pub chat_added: Option<ChatMessage>,
    pub alert_added: Option<Alert>,
    pub post_added: Option<SocialPost>,
    pub task_spawned: Option<Task>,
    /// このティックでサニティが0に到達した
    pub game_over: bool,
    /// チャットキューが補充しきい値を下回った
    pub refill_requested: bool,
}

/// ティックスケジューラ（コンテンツバッファの所有者）
#[derive(Debug)]
pub struct TickScheduler {
    config: GameConfig,
    buffer: ContentBuffer,
    rng: StdRng,
    ticks: u64,
}

impl TickScheduler {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            config,
            buffer: ContentBuffer::new(),
            rng,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn buffer(&self) -> &ContentBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ContentBuffer {
        &mut self.buffer
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// 実行済みティック数
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 開始・再開時にチャットキューが空なら補充が必要
    pub fn needs_initial_refill(&self) -> bool {
        self.buffer.is_empty(ContentKind::Chat)
    }

    /// 現在の状態からフェッチ要求を組み立てる
    pub fn fetch_request(&self, state: &GameState) -> FetchRequest {
        FetchRequest {
            hype: state.resources.hype(),
            batch_size: self.config.batch_size,
        }
    }

    /// 正規化済みバッチをバッファへ積む
    pub fn enqueue(&mut self, batch: NormalizedBatch) -> (usize, usize, usize) {
        let chat = self.buffer.enqueue_batch(batch.chat);
        let alerts = self.buffer.enqueue_batch(batch.alerts);
        let posts = self.buffer.enqueue_batch(batch.posts);
        tracing::debug!(
            chat,
            alerts,
            posts,
            buffered_chat = self.buffer.size(ContentKind::Chat),
            "📦 [BUFFER] Batch enqueued"
        );
        (chat, alerts, posts)
    }

    /// バッファとティック数を初期化
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.ticks = 0;
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// 1ティック分の処理
    pub fn tick(&mut self, state: &mut GameState) -> TickOutcome {
        if !state.resources.is_playing() {
            return TickOutcome::default();
        }

        self.ticks += 1;
        let mut outcome = TickOutcome {
            executed: true,
            ..Default::default()
        };

        // チャットは毎回、アラートと投稿は確率で取り出す
        let chat = self.buffer.dequeue::<ChatMessage>();
        let alert = if self.chance(self.config.alert_probability) {
            self.buffer.dequeue::<Alert>()
        } else {
            None
        };
        let post = if self.chance(self.config.post_probability) {
            self.buffer.dequeue::<SocialPost>()
        } else {
            None
        };

        if let Some(message) = chat {
            tracing::trace!(
                category = message.category.as_str(),
                author = %message.author,
                "💬 [TICK] Chat surfaced"
            );
            if message.category == MessageCategory::Hate {
                state
                    .resources
                    .adjust_sanity(-(self.config.hate_sanity_penalty as i32));
            }
            state.chat.push_back(message.clone());
            while state.chat.len() > self.config.visible_chat_cap {
                state.chat.pop_front();
            }
            outcome.chat_added = Some(message);
        }

        if let Some(alert) = alert {
            state
                .resources
                .adjust_sanity(-(self.config.alert_sanity_penalty as i32));
            state.alerts.push(alert.clone());
            outcome.alert_added = Some(alert);
        }

        if let Some(post) = post {
            state.posts.push_front(post.clone());
            outcome.post_added = Some(post);
        }

        if state.tasks.len() < self.config.max_tasks && self.chance(self.config.task_probability)
        {
            if let Some(template) = TASK_CATALOG.choose(&mut self.rng) {
                let task = Task {
                    id: new_entity_id(),
                    description: template.description.to_string(),
                    xp_reward: template.xp,
                };
                tracing::debug!("📋 [TICK] Task spawned: {}", task.description);
                state.tasks.push(task.clone());
                outcome.task_spawned = Some(task);
            }
        }

        let regen = if state.alerts.is_empty() { 1 } else { -1 };
        if state.resources.adjust_sanity(regen) == 0 {
            state.resources.set_phase(GamePhase::Over);
            outcome.game_over = true;
            tracing::info!(
                tick = self.ticks,
                score = state.resources.score(),
                level = state.resources.level(),
                "💀 [TICK] Sanity depleted, session over"
            );
            return outcome;
        }

        let drift = self.rng.gen_range(0..=9) as i64;
        let delta = if state.resources.hype() > 50 {
            drift
        } else {
            -drift
        };
        state.resources.adjust_viewers(delta);
        state.track_viewers();

        outcome.refill_requested =
            self.buffer.size(ContentKind::Chat) < self.config.chat_low_water_mark;

        tracing::trace!(
            tick = self.ticks,
            sanity = state.resources.sanity(),
            hype = state.resources.hype(),
            viewers = state.resources.viewers(),
            buffered_chat = self.buffer.size(ContentKind::Chat),
            "⏱️ [TICK] Completed"
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::models::Severity;

    /// 確率ゲートをすべて閉じた決定的な設定
    fn quiet_config() -> GameConfig {
        GameConfig {
            alert_probability: 0.0,
            post_probability: 0.0,
            task_probability: 0.0,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn playing_state(config: &GameConfig) -> GameState {
        let mut state = GameState::new(config);
        state.resources.set_phase(GamePhase::Playing);
        state
    }

    fn chat(category: MessageCategory) -> ChatMessage {
        ChatMessage {
            id: new_entity_id(),
            author: "viewer".to_string(),
            content: "hi".to_string(),
            category,
            is_moderator: false,
            avatar_url: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    fn alert() -> Alert {
        Alert {
            id: new_entity_id(),
            channel: "#reports".to_string(),
            user: "reporter".to_string(),
            issue: "raid".to_string(),
            severity: Severity::High,
            resolved: false,
        }
    }

    fn post(content: &str) -> SocialPost {
        SocialPost {
            id: new_entity_id(),
            author: "fan".to_string(),
            handle: "@fan".to_string(),
            content: content.to_string(),
            likes: 3,
            is_brand_risk: false,
            replied: false,
        }
    }

    #[test]
    fn test_tick_skipped_when_not_playing() {
        let config = quiet_config();
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = GameState::new(&config);
        scheduler.buffer_mut().enqueue_batch(vec![chat(MessageCategory::Normal)]);

        let outcome = scheduler.tick(&mut state);
        assert!(!outcome.executed);
        assert_eq!(scheduler.ticks(), 0);
        assert!(state.chat_messages().is_empty());
        assert_eq!(scheduler.buffer().size(ContentKind::Chat), 1);
    }

    #[test]
    fn test_sanity_regenerates_without_alerts() {
        let config = GameConfig {
            initial_sanity: 90,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);

        let outcome = scheduler.tick(&mut state);
        assert!(outcome.executed);
        assert_eq!(state.resources().sanity(), 91);
    }

    #[test]
    fn test_sanity_decays_with_open_alerts() {
        let config = GameConfig {
            initial_sanity: 90,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        state.alerts.push(alert());

        scheduler.tick(&mut state);
        assert_eq!(state.resources().sanity(), 89);
    }

    #[test]
    fn test_hate_message_costs_sanity() {
        let config = GameConfig {
            initial_sanity: 50,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        scheduler.buffer_mut().enqueue_batch(vec![chat(MessageCategory::Hate)]);

        let outcome = scheduler.tick(&mut state);
        assert!(outcome.chat_added.is_some());
        // -5（HATE）+1（アラートなしの回復）
        assert_eq!(state.resources().sanity(), 46);
    }

    #[test]
    fn test_alert_drain_ends_game_at_zero_sanity() {
        let config = GameConfig {
            initial_sanity: 5,
            initial_hype: 80,
            alert_probability: 1.0,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        scheduler.buffer_mut().enqueue_batch(vec![alert()]);
        let viewers_before = state.resources().viewers();

        let outcome = scheduler.tick(&mut state);
        assert!(outcome.game_over);
        assert!(!outcome.refill_requested);
        assert_eq!(state.resources().sanity(), 0);
        assert!(state.resources().is_over());
        assert_eq!(state.resources().viewers(), viewers_before);

        // 終了後のティックは何も変更しない
        scheduler.buffer_mut().enqueue_batch(vec![chat(MessageCategory::Normal)]);
        let outcome = scheduler.tick(&mut state);
        assert!(!outcome.executed);
        assert!(state.chat_messages().is_empty());
    }

    #[test]
    fn test_visible_chat_capped() {
        let config = quiet_config();
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        scheduler
            .buffer_mut()
            .enqueue_batch((0..60).map(|_| chat(MessageCategory::Normal)));

        let mut first_ids = Vec::new();
        for _ in 0..60 {
            let outcome = scheduler.tick(&mut state);
            first_ids.push(outcome.chat_added.unwrap().id);
            assert!(state.chat_messages().len() <= 50);
        }

        assert_eq!(state.chat_messages().len(), 50);
        // 最も古い10件が落ちている
        assert_eq!(state.chat_messages().front().unwrap().id, first_ids[10]);
        assert_eq!(state.chat_messages().back().unwrap().id, first_ids[59]);
    }

    #[test]
    fn test_posts_are_prepended() {
        let config = GameConfig {
            post_probability: 1.0,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        scheduler
            .buffer_mut()
            .enqueue_batch(vec![post("older"), post("newer")]);

        scheduler.tick(&mut state);
        scheduler.tick(&mut state);

        assert_eq!(state.posts()[0].content, "newer");
        assert_eq!(state.posts()[1].content, "older");
    }

    #[test]
    fn test_task_spawn_respects_cap() {
        let config = GameConfig {
            task_probability: 1.0,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);

        for _ in 0..10 {
            scheduler.tick(&mut state);
        }

        assert_eq!(state.tasks().len(), 4);
        assert!(state
            .tasks()
            .iter()
            .all(|t| TASK_CATALOG.iter().any(|tpl| tpl.xp == t.xp_reward)));
    }

    #[test]
    fn test_viewer_drift_direction_follows_hype() {
        let config = GameConfig {
            initial_hype: 80,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        for _ in 0..20 {
            let before = state.resources().viewers();
            scheduler.tick(&mut state);
            let after = state.resources().viewers();
            assert!(after >= before && after - before <= 9);
        }

        let config = GameConfig {
            initial_hype: 50,
            initial_viewers: 3,
            ..quiet_config()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        for _ in 0..20 {
            let before = state.resources().viewers();
            scheduler.tick(&mut state);
            assert!(state.resources().viewers() <= before);
        }
    }

    #[test]
    fn test_refill_requested_below_low_water_mark() {
        let config = quiet_config();
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);
        scheduler
            .buffer_mut()
            .enqueue_batch((0..6).map(|_| chat(MessageCategory::Normal)));

        // 6 -> 5: しきい値ちょうどなので要求しない
        assert!(!scheduler.tick(&mut state).refill_requested);
        // 5 -> 4: 要求する
        assert!(scheduler.tick(&mut state).refill_requested);
    }

    #[test]
    fn test_meters_stay_in_range_under_random_play() {
        let config = GameConfig {
            alert_probability: 0.5,
            post_probability: 0.5,
            task_probability: 0.5,
            seed: Some(1234),
            ..Default::default()
        };
        let mut scheduler = TickScheduler::new(config.clone());
        let mut state = playing_state(&config);

        for round in 0..200 {
            if round % 10 == 0 {
                let category = if round % 20 == 0 {
                    MessageCategory::Hate
                } else {
                    MessageCategory::Normal
                };
                scheduler
                    .buffer_mut()
                    .enqueue_batch((0..10).map(|_| chat(category)));
                scheduler.buffer_mut().enqueue_batch(vec![alert(), alert()]);
            }
            scheduler.tick(&mut state);
            assert!(state.resources().sanity() <= 100);
            assert!(state.resources().hype() <= 100);
            assert!(state.chat_messages().len() <= 50);
            if state.resources().is_over() {
                assert_eq!(state.resources().sanity(), 0);
                break;
            }
        }
    }
}
