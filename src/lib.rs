pub mod config;
pub mod content;
pub mod error;
pub mod game;
pub mod io;
pub mod service;
pub mod utils;

// Re-export the main error types for convenience
pub use error::{ContentSourceError, LivemodError, LivemodResult};

// Re-export the runtime shell
pub use config::{AppConfig, ConfigManager, ContentSourceConfig, GameConfig, LogConfig};
pub use content::{ContentSource, MockContentSource, RawContentBatch};
pub use game::{ActionOutcome, GameAction, GamePhase, GameSnapshot, SessionReport};
pub use service::{GameService, StateChange};
