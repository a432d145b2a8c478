pub mod autopilot;
pub mod broadcaster; // 状態変更の通知
pub mod game_service;

pub use autopilot::choose_action;
pub use broadcaster::{StateBroadcaster, StateChange};
pub use game_service::GameService;
