// ログ初期化とログ用ヘルパー

use anyhow::Context;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogConfig;
use crate::game::{GameSnapshot, SessionReport};

/// ログファイルの出力先を決定
///
/// 明示指定がなければXDGデータディレクトリ配下の `logs`。
pub fn resolve_log_dir(config: &LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &config.log_dir {
        return Ok(dir.clone());
    }
    let project_dirs = ProjectDirs::from("dev", "livemod", "livemod")
        .context("Failed to get project directories")?;
    Ok(project_dirs.data_dir().join("logs"))
}

/// ログ初期化
///
/// `RUST_LOG` が設定されていればそちらを優先する。
/// ファイル出力が有効な場合は返された `WorkerGuard` を保持し続けること。
pub fn init_logging(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("Invalid log level: {}", config.log_level))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let (file_layer, guard) = if config.enable_file_logging {
        let log_dir = resolve_log_dir(config)?;
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let appender = tracing_appender::rolling::daily(&log_dir, &config.log_file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    if config.enable_file_logging {
        info!("📝 File logging enabled");
    }

    Ok(guard)
}

/// スナップショットの要約をデバッグ出力
pub fn dump_snapshot(snapshot: &GameSnapshot, context: &str) {
    debug!(
        context = context,
        phase = snapshot.resources.phase().as_str(),
        sanity = snapshot.resources.sanity(),
        hype = snapshot.resources.hype(),
        viewers = snapshot.resources.viewers(),
        score = snapshot.resources.score(),
        level = snapshot.resources.level(),
        chat = snapshot.chat_messages.len(),
        alerts = snapshot.alerts.len(),
        posts = snapshot.posts.len(),
        tasks = snapshot.tasks.len(),
        buffered_chat = snapshot.buffered_chat,
        "📊 Session snapshot"
    );
}

pub fn log_session_summary(report: &SessionReport) {
    info!(
        level = report.level,
        title = %report.title,
        score = report.score,
        ticks = report.ticks,
        peak_viewers = report.peak_viewers,
        actions = report.actions.total,
        "🏁 Session finished"
    );
}

/// エラー詳細のログ
pub fn log_error_with_context(error: &anyhow::Error, context: &str) {
    error!(
        context = context,
        error = %error,
        error_chain = ?error.chain().collect::<Vec<_>>(),
        "❌ Error occurred"
    );
}
