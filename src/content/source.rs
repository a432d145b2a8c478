//! コンテンツソースの抽象インタフェースとローカル生成実装

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use super::models::{FetchRequest, RawAlert, RawChatMessage, RawContentBatch, RawPost};
use crate::error::ContentSourceError;
use crate::game::constants::{CHANNELS, MAX_BATCH_SIZE, MODERATORS};
use crate::game::models::{MessageCategory, Severity};

/// コンテンツソースの抽象インタフェース
///
/// ハイプ値に応じたバッチを非同期に返す。失敗はゲームにとって非致命的。
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// バッチを取得
    async fn fetch_batch(&self, request: FetchRequest)
        -> Result<RawContentBatch, ContentSourceError>;

    /// ログ用のソース名
    fn name(&self) -> &str;
}

const VIEWER_NAMES: &[&str] = &[
    "PixelPanda",
    "nightowl_99",
    "LurkMaster",
    "cozy_gamer",
    "Speedrunner Sam",
    "KappaQueen",
    "xX_Sniper_Xx",
    "BoomerTom",
    "glitchwitch",
    "Chat Goblin",
    "mintyfresh",
    "RNGesus",
];

const TROLL_NAMES: &[&str] = &["troll_420", "ragebait_bob", "SaltLord", "anon8812"];

const NORMAL_LINES: &[&str] = &[
    "LETS GOOO",
    "what game is this?",
    "first time here, love the vibe",
    "that jump was insane",
    "W streamer",
    "can you show the settings?",
    "lol",
    "hydrate check!",
];

const SPAM_LINES: &[&str] = &[
    "FREE SKINS at totally-legit.example",
    "follow my channel pls pls pls",
    "AAAAAAAAAAAAAAAAAAAA",
    "buy cheap followers now",
];

const HATE_LINES: &[&str] = &[
    "this stream is trash",
    "you are the worst player ever",
    "uninstall the game already",
    "mods are useless here",
];

const MOD_LINES: &[&str] = &[
    "reminder: be nice in chat",
    "links are not allowed",
    "check the !rules command",
];

const SUB_LINES: &[&str] = &[
    "just subscribed for 3 months!",
    "gifted 5 subs, enjoy",
    "resub hype!",
];

const ALERT_ISSUES: &[&str] = &[
    "raid of bots spamming invites",
    "someone leaked a private clip",
    "heated argument turning into insults",
    "NSFW image posted",
    "user impersonating a moderator",
    "phishing link in DMs",
];

const POSITIVE_POSTS: &[&str] = &[
    "best stream of the week, no contest",
    "that clutch play lives rent free in my head",
    "new emotes are adorable",
];

const NEGATIVE_POSTS: &[&str] = &[
    "the streamer ignored my question again, unfollowing",
    "mods banned me for nothing, this community is toxic",
    "sponsor segment was so cringe",
];

/// ハイプに応じたバッチを乱数で生成
///
/// ハイプが高いほどチャット件数が増え、HATEと炎上投稿の比率が下がる。
/// 要求件数は `MAX_BATCH_SIZE` で頭打ちにする。
pub fn generate_batch<R: Rng + ?Sized>(rng: &mut R, request: &FetchRequest) -> RawContentBatch {
    let hype = request.hype.min(100) as usize;
    let batch_size = request.batch_size.min(MAX_BATCH_SIZE);
    let chat_count = (batch_size / 2 + batch_size * hype / 200).max(1);

    let chat_messages = (0..chat_count)
        .map(|_| generate_chat(rng, hype))
        .collect();

    let alert_count = rng.gen_range(1..=3);
    let alerts = (0..alert_count)
        .map(|_| RawAlert {
            channel: pick(rng, CHANNELS).to_string(),
            user: pick(rng, VIEWER_NAMES).to_string(),
            issue: pick(rng, ALERT_ISSUES).to_string(),
            severity: match rng.gen_range(0..3) {
                0 => Severity::Low,
                1 => Severity::Medium,
                _ => Severity::High,
            },
        })
        .collect();

    let post_count = rng.gen_range(1..=3);
    let risk_probability = 0.4 - (hype as f64) * 0.002;
    let posts = (0..post_count)
        .map(|_| {
            let is_brand_risk = rng.gen_bool(risk_probability);
            let lines = if is_brand_risk {
                NEGATIVE_POSTS
            } else {
                POSITIVE_POSTS
            };
            RawPost {
                username: pick(rng, VIEWER_NAMES).to_string(),
                handle: None,
                content: pick(rng, lines).to_string(),
                is_brand_risk,
            }
        })
        .collect();

    RawContentBatch {
        chat_messages,
        alerts,
        posts,
    }
}

fn generate_chat<R: Rng + ?Sized>(rng: &mut R, hype: usize) -> RawChatMessage {
    let hate_weight = 25 - hype * 15 / 100;
    let spam_weight = 15;
    let sub_weight = 10 + hype / 10;
    let mod_weight = 5;

    let roll = rng.gen_range(0..100);
    let category = if roll < hate_weight {
        MessageCategory::Hate
    } else if roll < hate_weight + spam_weight {
        MessageCategory::Spam
    } else if roll < hate_weight + spam_weight + sub_weight {
        MessageCategory::Sub
    } else if roll < hate_weight + spam_weight + sub_weight + mod_weight {
        MessageCategory::Mod
    } else {
        MessageCategory::Normal
    };

    let (username, lines, is_mod) = match category {
        MessageCategory::Hate => (pick(rng, TROLL_NAMES), HATE_LINES, None),
        MessageCategory::Spam => (pick(rng, TROLL_NAMES), SPAM_LINES, None),
        MessageCategory::Mod => (pick(rng, MODERATORS), MOD_LINES, Some(true)),
        MessageCategory::Sub => (pick(rng, VIEWER_NAMES), SUB_LINES, None),
        MessageCategory::Normal => (pick(rng, VIEWER_NAMES), NORMAL_LINES, None),
    };

    RawChatMessage {
        username: username.to_string(),
        content: pick(rng, lines).to_string(),
        category,
        is_mod,
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

/// ローカル乱数で動くコンテンツソース
pub struct MockContentSource {
    rng: Mutex<StdRng>,
    latency: Duration,
    failure_rate: f64,
}

impl MockContentSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            latency: Duration::ZERO,
            failure_rate: 0.0,
        }
    }

    /// 擬似的な応答遅延を設定
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// 擬似的な失敗率を設定
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch_batch(
        &self,
        request: FetchRequest,
    ) -> Result<RawContentBatch, ContentSourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut rng = self.rng.lock();
        if rng.gen_bool(self.failure_rate) {
            return Err(ContentSourceError::Unavailable(
                "simulated outage".to_string(),
            ));
        }
        Ok(generate_batch(&mut *rng, &request))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(hype: u8) -> FetchRequest {
        FetchRequest {
            hype,
            batch_size: 15,
        }
    }

    #[test]
    fn test_higher_hype_gives_larger_batches() {
        let mut rng = StdRng::seed_from_u64(3);
        let low = generate_batch(&mut rng, &request(0));
        let high = generate_batch(&mut rng, &request(100));

        assert_eq!(low.chat_messages.len(), 7);
        assert_eq!(high.chat_messages.len(), 14);
    }

    #[test]
    fn test_oversized_request_is_capped() {
        let mut rng = StdRng::seed_from_u64(4);
        let batch = generate_batch(
            &mut rng,
            &FetchRequest {
                hype: 100,
                batch_size: usize::MAX,
            },
        );
        assert_eq!(batch.chat_messages.len(), MAX_BATCH_SIZE);
    }

    #[test]
    fn test_generated_alerts_and_posts_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        for hype in [0, 50, 100] {
            let batch = generate_batch(&mut rng, &request(hype));
            assert!((1..=3).contains(&batch.alerts.len()));
            assert!((1..=3).contains(&batch.posts.len()));
            assert!(batch.alerts.iter().all(|a| CHANNELS.contains(&a.channel.as_str())));
        }
    }

    #[test]
    fn test_mod_messages_come_from_roster() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let batch = generate_batch(&mut rng, &request(50));
            for message in batch
                .chat_messages
                .iter()
                .filter(|m| m.category == MessageCategory::Mod)
            {
                assert!(MODERATORS.contains(&message.username.as_str()));
                assert_eq!(message.is_mod, Some(true));
            }
        }
    }

    #[tokio::test]
    async fn test_mock_source_is_deterministic_with_seed() {
        let a = MockContentSource::new(Some(5));
        let b = MockContentSource::new(Some(5));

        let batch_a = a.fetch_batch(request(60)).await.unwrap();
        let batch_b = b.fetch_batch(request(60)).await.unwrap();
        assert_eq!(batch_a, batch_b);
    }

    #[tokio::test]
    async fn test_mock_source_failure_rate() {
        let source = MockContentSource::new(Some(1)).with_failure_rate(1.0);
        let result = source.fetch_batch(request(50)).await;
        assert!(matches!(result, Err(ContentSourceError::Unavailable(_))));
    }
}
