//! ゲームの固定データ（モデレーター名簿・レベル表・タスクカタログ）
//!
//! 調整用の数値（確率・上限・周期）は `config::GameConfig` 側にある。

/// 既知のモデレーター名簿
///
/// チャット投稿者がここに含まれていれば正規化時にモデレーターとして扱う。
pub const MODERATORS: &[&str] = &[
    "Rodrigues",
    "ralf",
    "Erick",
    "Shhhbr",
    "yune",
    "Nishimura",
    "hms",
    "yumi",
    "BrGirl",
    "Kawajplemes7AmorDaCadeira",
    "Marisco",
    "Rubens",
];

/// Discord風アラートの発生チャンネル
pub const CHANNELS: &[&str] = &["#general", "#memes", "#clips", "#reports", "#off-topic"];

pub const INITIAL_SANITY: u8 = 100;
pub const INITIAL_HYPE: u8 = 50;
pub const INITIAL_VIEWERS: u32 = 1200;

/// ティック周期（ミリ秒）
pub const GAME_TICK_MS: u64 = 2500;
/// 1回のフェッチで要求するアイテム数の目安
pub const CONTENT_BATCH_SIZE: usize = 15;
/// 1回のフェッチで要求できるアイテム数の上限
pub const MAX_BATCH_SIZE: usize = 500;
/// チャットキューの補充しきい値
pub const CHAT_LOW_WATER_MARK: usize = 5;
/// 表示チャットの最大件数
pub const VISIBLE_CHAT_CAP: usize = 50;
/// 同時に存在できるタスク数の上限
pub const MAX_ACTIVE_TASKS: usize = 4;

pub const ALERT_PROBABILITY: f64 = 0.30;
pub const POST_PROBABILITY: f64 = 0.20;
pub const TASK_PROBABILITY: f64 = 0.15;

pub const HATE_SANITY_PENALTY: u8 = 5;
pub const ALERT_SANITY_PENALTY: u8 = 5;

/// 通知の表示時間（ミリ秒）
pub const NOTIFICATION_DISPLAY_MS: u64 = 2000;

/// アバター画像URLのベース
pub const AVATAR_URL_BASE: &str = "https://picsum.photos/seed";

/// タスクのテンプレート
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTemplate {
    pub description: &'static str,
    pub xp: u32,
}

/// 発生し得るタスクの一覧
pub const TASK_CATALOG: &[TaskTemplate] = &[
    TaskTemplate {
        description: "Check the ban logs",
        xp: 50,
    },
    TaskTemplate {
        description: "Update the stream title",
        xp: 30,
    },
    TaskTemplate {
        description: "Create the !shop command",
        xp: 40,
    },
    TaskTemplate {
        description: "Purge bots from chat",
        xp: 60,
    },
    TaskTemplate {
        description: "Curate the clip of the week",
        xp: 45,
    },
    TaskTemplate {
        description: "Answer whispers",
        xp: 25,
    },
    TaskTemplate {
        description: "Configure the word filter",
        xp: 35,
    },
    TaskTemplate {
        description: "Raffle a VIP slot in chat",
        xp: 55,
    },
    TaskTemplate {
        description: "Post the rules in #general",
        xp: 20,
    },
    TaskTemplate {
        description: "Change the stream category",
        xp: 30,
    },
];
