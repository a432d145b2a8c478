//! アプリケーション設定管理モジュール
//!
//! XDGディレクトリまたは明示パスのTOMLファイルから設定を読み込む。
//! ファイルが無ければデフォルト値で動作する。

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{LivemodError, LivemodResult};
use crate::game::constants::*;

/// ゲームループの調整値
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// ティック周期（ミリ秒）
    pub tick_interval_ms: u64,
    /// チャットキューがこの件数を下回ったら補充を要求
    pub chat_low_water_mark: usize,
    /// 表示チャットの最大件数
    pub visible_chat_cap: usize,
    /// 同時タスク数の上限
    pub max_tasks: usize,
    /// ティックごとにアラートを取り出す確率
    pub alert_probability: f64,
    /// ティックごとに投稿を取り出す確率
    pub post_probability: f64,
    /// ティックごとにタスクを生成する確率
    pub task_probability: f64,
    pub hate_sanity_penalty: u8,
    pub alert_sanity_penalty: u8,
    /// 通知の表示時間（ミリ秒）
    pub notification_duration_ms: u64,
    pub initial_sanity: u8,
    pub initial_hype: u8,
    pub initial_viewers: u32,
    /// フェッチ1回あたりの要求件数の目安
    pub batch_size: usize,
    /// フェッチのタイムアウト（Noneで無制限）
    pub fetch_timeout_ms: Option<u64>,
    /// 乱数シード（Noneでエントロピーから生成）
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: GAME_TICK_MS,
            chat_low_water_mark: CHAT_LOW_WATER_MARK,
            visible_chat_cap: VISIBLE_CHAT_CAP,
            max_tasks: MAX_ACTIVE_TASKS,
            alert_probability: ALERT_PROBABILITY,
            post_probability: POST_PROBABILITY,
            task_probability: TASK_PROBABILITY,
            hate_sanity_penalty: HATE_SANITY_PENALTY,
            alert_sanity_penalty: ALERT_SANITY_PENALTY,
            notification_duration_ms: NOTIFICATION_DISPLAY_MS,
            initial_sanity: INITIAL_SANITY,
            initial_hype: INITIAL_HYPE,
            initial_viewers: INITIAL_VIEWERS,
            batch_size: CONTENT_BATCH_SIZE,
            fetch_timeout_ms: None,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// 設定値の妥当性を検証
    pub fn validate(&self) -> LivemodResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(LivemodError::configuration(
                "tick_interval_ms must be greater than 0",
            ));
        }
        if self.visible_chat_cap == 0 {
            return Err(LivemodError::configuration(
                "visible_chat_cap must be greater than 0",
            ));
        }
        if self.max_tasks == 0 {
            return Err(LivemodError::configuration(
                "max_tasks must be greater than 0",
            ));
        }
        if self.chat_low_water_mark == 0 {
            return Err(LivemodError::configuration(
                "chat_low_water_mark must be greater than 0",
            ));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(LivemodError::configuration(format!(
                "batch_size must be within [1, {}], got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        for (name, value) in [
            ("alert_probability", self.alert_probability),
            ("post_probability", self.post_probability),
            ("task_probability", self.task_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LivemodError::configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.initial_sanity == 0 || self.initial_sanity > 100 {
            return Err(LivemodError::configuration(
                "initial_sanity must be within [1, 100]",
            ));
        }
        if self.initial_hype > 100 {
            return Err(LivemodError::configuration(
                "initial_hype must be within [0, 100]",
            ));
        }
        Ok(())
    }
}

/// コンテンツソースの選択
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSourceConfig {
    /// ローカル乱数生成
    Mock {
        #[serde(default)]
        latency_ms: u64,
        #[serde(default)]
        failure_rate: f64,
    },
    /// HTTP経由の外部生成サービス
    Http {
        endpoint: String,
        #[serde(default = "default_request_timeout_ms")]
        request_timeout_ms: u64,
    },
    /// 記録済みNDJSONの再生
    Replay { path: PathBuf },
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

impl Default for ContentSourceConfig {
    fn default() -> Self {
        ContentSourceConfig::Mock {
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// カスタムログディレクトリ（Noneの場合はXDGデフォルト使用）
    pub log_dir: Option<PathBuf>,
    /// ログレベル (trace/debug/info/warn/error)
    pub log_level: String,
    /// ファイル出力有効化
    pub enable_file_logging: bool,
    /// ログファイル名のプレフィックス
    pub log_file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_level: "info".to_string(),
            enable_file_logging: false,
            log_file_prefix: "livemod.log".to_string(),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub content: ContentSourceConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// TOML文字列から読み込み、ゲーム設定を検証する
    pub fn from_toml_str(content: &str) -> LivemodResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.game.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> LivemodResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// 設定管理マネージャー
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// XDG設定ディレクトリを使う設定マネージャーを作成
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Ok(Self { config_path })
    }

    /// 明示パスを使う設定マネージャーを作成
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// XDGディレクトリに基づく設定ファイルパスを取得
    fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("dev", "livemod", "livemod")
            .context("Failed to get project directories")?;

        let config_file = project_dirs.config_dir().join("config.toml");
        debug!("Config file path: {}", config_file.display());

        Ok(config_file)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 設定を読み込み
    pub fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "Config file not found, using default settings: {}",
                self.config_path.display()
            );
            return Ok(AppConfig::default());
        }

        let config_content = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config = AppConfig::from_toml_str(&config_content).with_context(|| {
            format!(
                "Failed to load config file: {}",
                self.config_path.display()
            )
        })?;

        info!(
            "✅ Configuration loaded from: {}",
            self.config_path.display()
        );

        Ok(config)
    }

    /// 設定を保存
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let config_content = config
            .to_toml_string()
            .context("Failed to serialize config")?;

        fs::write(&self.config_path, config_content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;

        info!("💾 Configuration saved to: {}", self.config_path.display());
        Ok(())
    }
}
