//! 状態変更のブロードキャスト
//!
//! レンダラーはポーリングせずに `StateChange` を購読し、
//! 必要になったときだけ `GameService::snapshot` で全体を取得する。

use tokio::sync::broadcast;

use crate::game::{ActionReport, ChatMessage, GamePhase, Notification, ResourceState, Task};

/// 状態変更イベント
///
/// 各イベントは変更の要点のみを含み、セッション全体のクローンを避ける。
#[derive(Clone, Debug)]
pub enum StateChange {
    /// フェーズが変わった
    PhaseChanged(GamePhase),

    /// ティックが完了した
    Ticked {
        tick: u64,
        resources: ResourceState,
        /// 新たに表示されたチャット
        latest_chat: Option<ChatMessage>,
        alert_added: bool,
        post_added: bool,
        task_spawned: Option<Task>,
    },

    /// アクションが適用された
    ActionApplied(ActionReport),

    /// 補充バッチがバッファに積まれた
    BufferRefilled {
        chat: usize,
        alerts: usize,
        posts: usize,
    },

    /// 補充が失敗した（バッファは変化なし）
    RefillFailed(String),

    /// 通知が表示期間を過ぎて消えた
    NotificationExpired { id: String },

    /// 新しい通知
    NotificationPushed(Notification),

    /// サニティが尽きてセッションが終了した
    GameOver { score: u32, level: u32 },

    /// 再スタートで初期状態に戻った
    Reset,
}

/// 状態変更のブロードキャスター
pub struct StateBroadcaster {
    sender: broadcast::Sender<StateChange>,
}

impl StateBroadcaster {
    /// バッファサイズ256。遅いサブスクライバーは古いイベントを取りこぼす（lagged）
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }

    /// サブスクライバーがいなければイベントは破棄される
    pub fn broadcast(&self, change: StateChange) {
        let _ = self.sender.send(change);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StateBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateBroadcaster")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
