//! コンテンツ生成サービスのモックサーバー
//!
//! `GET /content?hype=<n>&count=<n>` に対して
//! `{"chatMessages":[...],"discordAlerts":[...],"socialPosts":[...]}` を返す。

use clap::Parser;
use livemod::content::{generate_batch, FetchRequest};
use livemod::game::constants::MAX_BATCH_SIZE;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::Filter;
use warp::http::StatusCode;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Mock content generation server for livemod")]
struct Args {
    /// 待ち受けポート
    #[arg(short, long, default_value_t = 3030)]
    port: u16,

    /// 乱数シード
    #[arg(long)]
    seed: Option<u64>,

    /// 応答までの遅延（ミリ秒）
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// 503を返す確率
    #[arg(long, default_value_t = 0.0)]
    failure_rate: f64,
}

#[derive(Debug, Deserialize)]
struct ContentQuery {
    #[serde(default = "default_hype")]
    hype: u8,
    #[serde(default = "default_count")]
    count: usize,
}

fn default_hype() -> u8 {
    50
}

fn default_count() -> usize {
    15
}

type SharedRng = Arc<Mutex<StdRng>>;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let rng: SharedRng = Arc::new(Mutex::new(match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }));

    let state = warp::any().map({
        let rng = rng.clone();
        let args = args.clone();
        move || (rng.clone(), args.clone())
    });

    let content = warp::path("content")
        .and(warp::get())
        .and(warp::query::<ContentQuery>())
        .and(state)
        .and_then(|query: ContentQuery, (rng, args): (SharedRng, Args)| async move {
            handle_content(query, rng, args).await
        });

    let health = warp::path("health").map(|| "ok");

    let routes = content.or(health).with(warp::log("mock_server"));

    let addr: SocketAddr = ([127, 0, 0, 1], args.port).into();
    log::info!("Mock content server listening on http://{}", addr);

    let (_, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("Shutting down mock server");
    });
    server.await;
}

async fn handle_content(
    query: ContentQuery,
    rng: SharedRng,
    args: Args,
) -> Result<Box<dyn warp::Reply>, warp::Rejection> {
    let request_id = uuid::Uuid::new_v4();

    if args.latency_ms > 0 {
        tokio::time::sleep(Duration::from_millis(args.latency_ms)).await;
    }

    let batch = {
        let mut rng = match rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if rng.gen_bool(args.failure_rate.clamp(0.0, 1.0)) {
            log::warn!("[{}] Injected failure", request_id);
            return Ok(Box::new(warp::reply::with_status(
                "injected failure",
                StatusCode::SERVICE_UNAVAILABLE,
            )));
        }
        generate_batch(
            &mut *rng,
            &FetchRequest {
                hype: query.hype.min(100),
                batch_size: query.count.min(MAX_BATCH_SIZE),
            },
        )
    };

    log::info!(
        "[{}] {} hype={} count={} -> {} chat, {} alerts, {} posts",
        request_id,
        chrono::Utc::now().format("%H:%M:%S"),
        query.hype,
        query.count,
        batch.chat_messages.len(),
        batch.alerts.len(),
        batch.posts.len()
    );

    Ok(Box::new(warp::reply::json(&batch)))
}
