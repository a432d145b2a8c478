pub mod actions; // プレイヤーアクション
pub mod constants;
pub mod leveling;
pub mod models;
pub mod notifications;
pub mod report;
pub mod resources;
pub mod scheduler; // ティック処理
pub mod state;

pub use actions::{ActionOutcome, ActionProcessor, ActionReport, GameAction};
pub use leveling::{award_xp, level_for_score, title_for_level, LevelChange, LEVEL_THRESHOLDS};
pub use models::{Alert, ChatMessage, MessageCategory, Severity, SocialPost, Task};
pub use notifications::{Notification, NotificationCenter, NotificationColor, NotificationIcon};
pub use report::{ModerationCounts, SessionReport};
pub use resources::{GamePhase, ResourceState, METER_MAX};
pub use scheduler::{TickOutcome, TickScheduler};
pub use state::{GameSnapshot, GameState, ModerationStats};
