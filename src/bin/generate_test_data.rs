use anyhow::Context;
use clap::Parser;
use livemod::content::{generate_batch, FetchRequest};
use livemod::io::{write_ndjson_file, TimestampedEntry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

/// 再生用のコンテンツバッチをNDJSONで書き出す
#[derive(Parser, Debug)]
#[command(version, about = "Generate recorded content batches for replay")]
struct Args {
    /// 出力ファイル
    #[arg(short, long, default_value = "test_batches.ndjson")]
    output: PathBuf,

    /// バッチ数
    #[arg(short, long, default_value_t = 20)]
    batches: usize,

    /// バッチサイズのヒント
    #[arg(long, default_value_t = 15)]
    batch_size: usize,

    /// 乱数シード
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    // 記録時刻は20秒間隔、ハイプは少しずつ揺らす
    let start = chrono::Utc::now().timestamp().max(0) as u64;
    let mut hype: i32 = 50;
    let entries: Vec<_> = (0..args.batches)
        .map(|index| {
            hype = (hype + rng.gen_range(-10..=10)).clamp(0, 100);
            let request = FetchRequest {
                hype: hype as u8,
                batch_size: args.batch_size,
            };
            TimestampedEntry {
                timestamp: start + index as u64 * 20,
                data: generate_batch(&mut rng, &request),
            }
        })
        .collect();

    write_ndjson_file(&args.output, &entries)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let items: usize = entries.iter().map(|e| e.data.total_items()).sum();
    println!(
        "Generated {} batches ({} items) -> {}",
        entries.len(),
        items,
        args.output.display()
    );
    Ok(())
}
