use anyhow::Context;
use clap::Parser;
use livemod::{
    config::{AppConfig, ConfigManager, ContentSourceConfig},
    service::{choose_action, GameService, StateChange},
    utils,
};
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

/// ヘッドレスでモデレーションセッションを実行する
#[derive(Parser, Debug)]
#[command(version, about = "Headless livestream moderation session runner")]
struct Cli {
    /// 設定ファイル（省略時はXDG設定ディレクトリ）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 乱数シード
    #[arg(long)]
    seed: Option<u64>,

    /// ティック間隔（ミリ秒）
    #[arg(long)]
    tick_ms: Option<u64>,

    /// 指定ティック数で終了
    #[arg(long)]
    max_ticks: Option<u64>,

    /// HTTPコンテンツソースのエンドポイント
    #[arg(long, conflicts_with = "replay")]
    endpoint: Option<String>,

    /// 記録済みNDJSONバッチを再生
    #[arg(long)]
    replay: Option<PathBuf>,

    /// 自動でモデレーションする
    #[arg(long)]
    autopilot: bool,

    /// 終了レポートのJSON出力先（省略時は標準出力）
    #[arg(long)]
    report: Option<PathBuf>,

    /// ログレベル
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(seed) = self.seed {
            config.game.seed = Some(seed);
        }
        if let Some(tick_ms) = self.tick_ms {
            config.game.tick_interval_ms = tick_ms;
        }
        if let Some(endpoint) = &self.endpoint {
            config.content = ContentSourceConfig::Http {
                endpoint: endpoint.clone(),
                request_timeout_ms: 15_000,
            };
        }
        if let Some(path) = &self.replay {
            config.content = ContentSourceConfig::Replay { path: path.clone() };
        }
        if let Some(level) = &self.log_level {
            config.log.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = config_manager.load_config()?;
    cli.apply_overrides(&mut config);

    // tokio-consoleの初期化（プロファイリング用）
    #[cfg(feature = "debug-tokio")]
    console_subscriber::init();

    #[cfg(not(feature = "debug-tokio"))]
    let _log_guard = utils::init_logging(&config.log)?;

    tracing::info!("🎬 Starting livemod session");

    if let Err(e) = run_session(&cli, &config).await {
        utils::log_error_with_context(&e, "session");
        return Err(e);
    }

    Ok(())
}

/// セッションを実行し、終了時にレポートを書き出す
async fn run_session(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let service = GameService::from_app_config(config).context("Failed to build game service")?;
    let mut events = service.subscribe();
    service.start();

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                tracing::info!("🛑 Interrupted, stopping session");
                break;
            }
            event = events.recv() => match event {
                Ok(StateChange::Ticked { tick, .. }) => {
                    if cli.autopilot {
                        if let Some((action, target)) = choose_action(&service.snapshot()) {
                            service.perform(action, &target);
                        }
                    }
                    if cli.max_ticks.is_some_and(|max| tick >= max) {
                        tracing::info!("⏹️ Reached {} ticks", tick);
                        break;
                    }
                }
                Ok(StateChange::GameOver { score, level }) => {
                    tracing::info!("💀 Game over at level {} with {} XP", level, score);
                    break;
                }
                Ok(StateChange::RefillFailed(reason)) => {
                    tracing::debug!("Refill failed: {}", reason);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("⚠️ Event stream lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    service.pause();
    service.shutdown().await;

    utils::dump_snapshot(&service.snapshot(), "final");
    let report = service.report();
    utils::log_session_summary(&report);

    let json = report
        .to_json_pretty()
        .context("Failed to serialize session report")?;
    match &cli.report {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            tracing::info!("💾 Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
