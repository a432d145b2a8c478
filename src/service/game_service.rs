//! ゲームサービス（非同期ランタイム側の外殻）
//!
//! セッション（`GameState` + `TickScheduler`）をロックの内側に保持し、
//! 周期ティック・コンテンツ補充・通知の期限切れをtokioタスクで駆動する。
//! 書き込みはすべてセッションロックの内側で行われるため、
//! ティックとプレイヤーアクションが交差することはない。

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::broadcaster::{StateBroadcaster, StateChange};
use crate::config::{AppConfig, GameConfig};
use crate::content::{
    build_content_source, ContentNormalizer, ContentSource, RawContentBatch, RefillGuard,
};
use crate::error::{ContentSourceError, LivemodResult};
use crate::game::{
    ActionOutcome, ActionProcessor, GameAction, GamePhase, GameSnapshot, GameState,
    SessionReport, TickOutcome, TickScheduler,
};

/// ロックで保護されるセッション本体
struct Session {
    state: GameState,
    scheduler: TickScheduler,
    /// 再スタートごとに進む。古いフェッチ結果の破棄に使う
    generation: u64,
}

impl Session {
    fn new(config: &GameConfig) -> Self {
        Self {
            state: GameState::new(config),
            scheduler: TickScheduler::new(config.clone()),
            generation: 0,
        }
    }
}

/// 実行中のティッカー
struct TickerHandle {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

struct ServiceInner {
    config: GameConfig,
    session: Mutex<Session>,
    source: Arc<dyn ContentSource>,
    normalizer: ContentNormalizer,
    refill_guard: RefillGuard,
    broadcaster: StateBroadcaster,
    ticker: Mutex<Option<TickerHandle>>,
}

/// ゲームサービス
///
/// クローンは同じセッションを共有する。`start`・`resume`・`request_refill` は
/// tokioランタイム内から呼び出す必要がある。
#[derive(Clone)]
pub struct GameService {
    inner: Arc<ServiceInner>,
}

impl GameService {
    pub fn new(config: GameConfig, source: Arc<dyn ContentSource>) -> Self {
        tracing::info!(
            "🎮 Game service created (tick {}ms, source {})",
            config.tick_interval_ms,
            source.name()
        );
        Self {
            inner: Arc::new(ServiceInner {
                session: Mutex::new(Session::new(&config)),
                config,
                source,
                normalizer: ContentNormalizer::default(),
                refill_guard: RefillGuard::new(),
                broadcaster: StateBroadcaster::new(),
                ticker: Mutex::new(None),
            }),
        }
    }

    /// アプリ設定からコンテンツソースごと構築
    pub fn from_app_config(config: &AppConfig) -> LivemodResult<Self> {
        config.game.validate()?;
        let source = build_content_source(&config.content, config.game.seed)?;
        Ok(Self::new(config.game.clone(), source))
    }

    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    pub fn phase(&self) -> GamePhase {
        self.inner.session.lock().state.resources().phase()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.inner.broadcaster.subscribe()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let session = self.inner.session.lock();
        GameSnapshot::capture(
            &session.state,
            session.scheduler.ticks(),
            session.scheduler.buffer().sizes(),
        )
    }

    pub fn report(&self) -> SessionReport {
        let session = self.inner.session.lock();
        SessionReport::from_state(&session.state, session.scheduler.ticks())
    }

    pub fn is_refill_in_flight(&self) -> bool {
        self.inner.refill_guard.is_in_flight()
    }

    /// (発行済み, 破棄済み) の補充要求数
    pub fn refill_counts(&self) -> (u64, u64) {
        (
            self.inner.refill_guard.issued_count(),
            self.inner.refill_guard.dropped_count(),
        )
    }

    pub fn is_ticker_running(&self) -> bool {
        self.inner.ticker.lock().is_some()
    }

    /// セッションを開始（NotStartedからのみ）
    pub fn start(&self) -> bool {
        self.enter_playing(GamePhase::NotStarted, "▶️ Session started")
    }

    /// 一時停止。周期タスクは即座にキャンセルされる
    pub fn pause(&self) -> bool {
        {
            let mut session = self.inner.session.lock();
            if !session.state.resources().is_playing() {
                return false;
            }
            session.state.resources.set_phase(GamePhase::Paused);
        }
        self.stop_ticker();
        tracing::info!("⏸️ Session paused");
        self.inner
            .broadcaster
            .broadcast(StateChange::PhaseChanged(GamePhase::Paused));
        true
    }

    /// 一時停止から再開
    pub fn resume(&self) -> bool {
        self.enter_playing(GamePhase::Paused, "▶️ Session resumed")
    }

    fn enter_playing(&self, from: GamePhase, message: &str) -> bool {
        let needs_refill = {
            let mut session = self.inner.session.lock();
            if session.state.resources().phase() != from {
                tracing::debug!(
                    "🎮 Cannot enter playing from {}",
                    session.state.resources().phase().as_str()
                );
                return false;
            }
            session.state.resources.set_phase(GamePhase::Playing);
            session.scheduler.needs_initial_refill()
        };

        tracing::info!("{}", message);
        self.inner
            .broadcaster
            .broadcast(StateChange::PhaseChanged(GamePhase::Playing));

        if needs_refill {
            self.request_refill();
        }
        self.start_ticker();
        true
    }

    /// 初期状態（NotStarted）へ戻す
    ///
    /// 実行中のフェッチは完了してもバッファへは入らない。
    pub fn restart(&self) {
        self.stop_ticker();
        {
            let mut session = self.inner.session.lock();
            let generation = session.generation + 1;
            *session = Session::new(&self.inner.config);
            session.generation = generation;
        }
        tracing::info!("🔄 Session restarted");
        self.inner.broadcaster.broadcast(StateChange::Reset);
        self.inner
            .broadcaster
            .broadcast(StateChange::PhaseChanged(GamePhase::NotStarted));
    }

    /// ティッカーを停止して終了を待つ
    pub async fn shutdown(&self) {
        let ticker = self.inner.ticker.lock().take();
        if let Some(TickerHandle { cancel, handle }) = ticker {
            let _ = cancel.send(());
            if let Err(e) = handle.await {
                tracing::warn!("⚠️ Ticker task ended abnormally: {}", e);
            }
        }
        tracing::info!("🛑 Game service shut down");
    }

    /// プレイヤーアクションを適用
    pub fn perform(&self, action: GameAction, target_id: &str) -> ActionOutcome {
        let outcome = {
            let mut session = self.inner.session.lock();
            ActionProcessor::apply(&mut session.state, action, target_id, Utc::now())
        };

        if let ActionOutcome::Applied(report) = &outcome {
            for notification in &report.notifications {
                self.schedule_expiry(notification.id.clone());
                self.inner
                    .broadcaster
                    .broadcast(StateChange::NotificationPushed(notification.clone()));
            }
            self.inner
                .broadcaster
                .broadcast(StateChange::ActionApplied(report.clone()));
        }

        outcome
    }

    /// 1ティックを即座に実行（周期タスクからも呼ばれる）
    pub fn tick_now(&self) -> TickOutcome {
        let (outcome, expired, resources, ticks) = {
            let mut session = self.inner.session.lock();
            let Session {
                state, scheduler, ..
            } = &mut *session;
            let expired = state.notifications.prune_expired(Utc::now());
            let outcome = scheduler.tick(state);
            (outcome, expired, *state.resources(), scheduler.ticks())
        };

        for id in expired {
            self.inner
                .broadcaster
                .broadcast(StateChange::NotificationExpired { id });
        }

        if !outcome.executed {
            return outcome;
        }

        self.inner.broadcaster.broadcast(StateChange::Ticked {
            tick: ticks,
            resources,
            latest_chat: outcome.chat_added.clone(),
            alert_added: outcome.alert_added.is_some(),
            post_added: outcome.post_added.is_some(),
            task_spawned: outcome.task_spawned.clone(),
        });

        if outcome.game_over {
            self.stop_ticker();
            self.inner
                .broadcaster
                .broadcast(StateChange::PhaseChanged(GamePhase::Over));
            self.inner.broadcaster.broadcast(StateChange::GameOver {
                score: resources.score(),
                level: resources.level(),
            });
        } else if outcome.refill_requested {
            self.request_refill();
        }

        outcome
    }

    /// 補充リクエストを発行（シングルフライト）
    ///
    /// 既に実行中なら何もせず `false` を返す。フェッチはバックグラウンドで行われ、
    /// 呼び出し元をブロックしない。
    pub fn request_refill(&self) -> bool {
        let Some(permit) = self.inner.refill_guard.try_acquire() else {
            tracing::debug!("📦 [BUFFER] Refill already in flight, request dropped");
            return false;
        };

        let (request, generation) = {
            let session = self.inner.session.lock();
            (
                session.scheduler.fetch_request(&session.state),
                session.generation,
            )
        };

        tracing::debug!(
            hype = request.hype,
            batch_size = request.batch_size,
            "📦 [BUFFER] Refill requested"
        );

        let service = self.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let inner = &service.inner;
            let result = match inner.config.fetch_timeout() {
                Some(timeout) => {
                    match tokio::time::timeout(timeout, inner.source.fetch_batch(request)).await {
                        Ok(result) => result,
                        Err(_) => Err(ContentSourceError::Timeout {
                            timeout_ms: timeout.as_millis() as u64,
                        }),
                    }
                }
                None => inner.source.fetch_batch(request).await,
            };

            match result {
                Ok(batch) => {
                    service.deliver(batch, generation);
                }
                Err(e) => {
                    tracing::warn!("⚠️ [BUFFER] Content fetch failed: {}", e);
                    inner
                        .broadcaster
                        .broadcast(StateChange::RefillFailed(e.to_string()));
                }
            }
        });

        true
    }

    /// 生バッチを正規化してバッファへ積む
    pub fn deliver_batch(&self, batch: RawContentBatch) -> (usize, usize, usize) {
        let generation = self.inner.session.lock().generation;
        self.deliver(batch, generation).unwrap_or((0, 0, 0))
    }

    fn deliver(&self, batch: RawContentBatch, generation: u64) -> Option<(usize, usize, usize)> {
        let counts = {
            let mut session = self.inner.session.lock();
            if session.generation != generation {
                tracing::debug!("📦 [BUFFER] Stale batch from previous session dropped");
                return None;
            }
            let scheduler = &mut session.scheduler;
            let normalized =
                self.inner
                    .normalizer
                    .normalize_batch(batch, scheduler.rng_mut(), Utc::now());
            scheduler.enqueue(normalized)
        };

        let (chat, alerts, posts) = counts;
        self.inner.broadcaster.broadcast(StateChange::BufferRefilled {
            chat,
            alerts,
            posts,
        });
        Some(counts)
    }

    /// 通知を表示期間後に消すタイマー
    ///
    /// ランタイム外では `prune_expired` によるティック時の掃除に任せる。
    fn schedule_expiry(&self, id: String) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let weak: Weak<ServiceInner> = Arc::downgrade(&self.inner);
        let delay = self.inner.config.notification_duration();

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let removed = inner.session.lock().state.notifications.expire(&id);
            if removed {
                inner
                    .broadcaster
                    .broadcast(StateChange::NotificationExpired { id });
            }
        });
    }

    fn start_ticker(&self) {
        let mut ticker = self.inner.ticker.lock();
        if let Some(previous) = ticker.take() {
            let _ = previous.cancel.send(());
        }

        let (cancel, mut cancel_rx) = oneshot::channel();
        let weak = Arc::downgrade(&self.inner);
        // interval_atは周期0でパニックする
        let period = self
            .inner
            .config
            .tick_interval()
            .max(std::time::Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            // 最初のティックは1周期後
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut stalled = false;
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => {
                        tracing::debug!("⏱️ [TICK] Ticker cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        let service = GameService { inner };
                        let outcome = service.tick_now();
                        if outcome.game_over {
                            break;
                        }
                        if !outcome.executed {
                            stalled = true;
                            break;
                        }
                    }
                }
            }

            // 誰にも止められずに終わった場合は自分のハンドルを片付ける
            if stalled {
                cancel_rx.close();
                if let Some(inner) = weak.upgrade() {
                    let mut slot = inner.ticker.lock();
                    if slot.as_ref().is_some_and(|t| t.cancel.is_closed()) {
                        *slot = None;
                        tracing::debug!("⏱️ [TICK] Ticker exited, session not playing");
                    }
                }
            }
        });

        *ticker = Some(TickerHandle { cancel, handle });
        tracing::debug!("⏱️ [TICK] Ticker started ({}ms)", period.as_millis());
    }

    fn stop_ticker(&self) {
        if let Some(TickerHandle { cancel, .. }) = self.inner.ticker.lock().take() {
            let _ = cancel.send(());
            tracing::debug!("⏱️ [TICK] Ticker stopped");
        }
    }
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("phase", &self.phase())
            .field("source", &self.inner.source.name())
            .field("refill_in_flight", &self.is_refill_in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MockContentSource;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_slot_cleared_when_session_left_playing() {
        let config = GameConfig {
            seed: Some(1),
            ..Default::default()
        };
        let service = GameService::new(config, Arc::new(MockContentSource::new(Some(1))));
        assert!(service.start());
        assert!(service.is_ticker_running());

        // ティッカー起動前にpause()が割り込んだ場合と同じ状態
        service
            .inner
            .session
            .lock()
            .state
            .resources
            .set_phase(GamePhase::Paused);

        tokio::time::sleep(Duration::from_millis(2600)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }

        assert!(!service.is_ticker_running());
        assert_eq!(service.snapshot().ticks, 0);
        assert!(service.resume());
        assert!(service.is_ticker_running());

        service.shutdown().await;
    }
}
