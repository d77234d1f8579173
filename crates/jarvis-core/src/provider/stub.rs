//! Local stub provider.
//!
//! Stands in for a real model backend: waits a random delay, then answers
//! with one of a fixed set of canned replies. Older history is synthesised
//! on demand as alternating user/bot turns one minute apart.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use jarvis_types::config::StubConfig;
use jarvis_types::error::ProviderError;
use jarvis_types::message::{DeliveryState, Message, QuickReply};

use super::provider::ResponseProvider;

const CANNED_REPLIES: [&str; 5] = [
    "I understand your question. Let me think about how best to help you with that.",
    "That's an interesting point. Here's what I think...",
    "Thanks for sharing that. I'd like to offer some thoughts on the matter.",
    "I appreciate your question. Here's what I can tell you based on my knowledge.",
    "That's a great question. Let me provide some information that might help.",
];

const HISTORY_USER_LINES: [&str; 3] = [
    "Can you summarise what we discussed earlier?",
    "What were the main options again?",
    "Thanks, that helped.",
];

const HISTORY_BOT_LINES: [&str; 3] = [
    "Sure, here is a short recap of our earlier conversation.",
    "We looked at a few alternatives and their trade-offs.",
    "You're welcome! Let me know if anything else comes up.",
];

const QUICK_REPLIES: [(&str, &str); 4] = [
    ("more", "Tell me more"),
    ("example", "Can you give an example?"),
    ("simpler", "Explain it more simply"),
    ("thanks", "Thanks!"),
];

/// Spacing between synthesised history messages.
const HISTORY_SPACING_MINUTES: i64 = 1;

/// Canned-response provider with randomised latency.
pub struct StubProvider {
    config: StubConfig,
    rng: Mutex<StdRng>,
}

impl StubProvider {
    /// Create a stub from config. A configured seed makes replies reproducible.
    ///
    /// A non-finite failure rate is treated as 0.0; anything else is clamped
    /// into `0.0..=1.0`.
    pub fn new(mut config: StubConfig) -> Self {
        config.failure_rate = sanitize_rate(config.failure_rate);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> (Duration, bool, usize) {
        let mut rng = self.rng.lock().expect("stub rng lock poisoned");
        let (lo, hi) = if self.config.min_delay_ms <= self.config.max_delay_ms {
            (self.config.min_delay_ms, self.config.max_delay_ms)
        } else {
            (self.config.max_delay_ms, self.config.min_delay_ms)
        };
        let delay = Duration::from_millis(rng.gen_range(lo..=hi));
        let fail = rng.gen_bool(self.config.failure_rate);
        let pick = rng.gen_range(0..CANNED_REPLIES.len());
        (delay, fail, pick)
    }

    fn history_page(&self, before: DateTime<Utc>) -> Vec<Message> {
        let count = self.config.history_batch;
        (0..count)
            .map(|i| {
                // i = 0 is the oldest message of the page.
                let minutes_back = (count - i) as i64 * HISTORY_SPACING_MINUTES;
                let timestamp = before - chrono::Duration::minutes(minutes_back);
                let line = i / 2 % HISTORY_USER_LINES.len();
                let message = if i % 2 == 0 {
                    let mut m = Message::user(HISTORY_USER_LINES[line]);
                    m.advance_delivery(DeliveryState::Read);
                    m
                } else {
                    Message::bot(HISTORY_BOT_LINES[line])
                };
                message.at(timestamp)
            })
            .collect()
    }
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        warn!(rate, "non-finite stub failure rate, using 0.0");
        0.0
    }
}

impl ResponseProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn get_reply(&self, text: &str) -> Result<String, ProviderError> {
        let (delay, fail, pick) = self.roll();
        debug!(delay_ms = delay.as_millis() as u64, chars = text.len(), "stub reply scheduled");
        tokio::time::sleep(delay).await;

        if fail {
            return Err(ProviderError::provider("simulated reply failure"));
        }
        Ok(CANNED_REPLIES[pick].to_string())
    }

    async fn fetch_older(
        &self,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>, ProviderError> {
        let (delay, fail, _) = self.roll();
        tokio::time::sleep(delay).await;

        if fail {
            return Err(ProviderError::provider("simulated history failure"));
        }
        Ok(self.history_page(before.unwrap_or_else(Utc::now)))
    }

    fn quick_replies(&self) -> Vec<QuickReply> {
        QUICK_REPLIES
            .iter()
            .map(|(id, text)| QuickReply::new(*id, *text))
            .collect()
    }
}

impl std::fmt::Debug for StubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubProvider")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_types::message::MessageRole;

    fn seeded(failure_rate: f64) -> StubProvider {
        StubProvider::new(StubConfig {
            min_delay_ms: 10,
            max_delay_ms: 20,
            failure_rate,
            history_batch: 3,
            seed: Some(42),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn reply_is_canned() {
        let stub = seeded(0.0);
        let reply = stub.get_reply("hello").await.unwrap();
        assert!(CANNED_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_rate_one_always_fails() {
        let stub = seeded(1.0);
        assert!(stub.get_reply("hello").await.is_err());
        assert!(stub.fetch_older(None).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reply_waits_for_delay() {
        let stub = seeded(0.0);
        let start = tokio::time::Instant::now();
        stub.get_reply("hello").await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed <= Duration::from_millis(25));
    }

    #[tokio::test(start_paused = true)]
    async fn history_is_older_and_chronological() {
        let stub = seeded(0.0);
        let anchor = Utc::now();
        let page = stub.fetch_older(Some(anchor)).await.unwrap();

        assert_eq!(page.len(), 3);
        assert!(page.iter().all(|m| m.timestamp < anchor));
        assert!(page.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(page[0].role, MessageRole::User);
        assert_eq!(page[1].role, MessageRole::Bot);
    }

    #[test]
    fn quick_replies_are_stable() {
        let stub = seeded(0.0);
        assert_eq!(stub.quick_replies(), stub.quick_replies());
        assert_eq!(stub.quick_replies().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn nan_failure_rate_never_fails() {
        let config: jarvis_types::config::JarvisConfig =
            toml::from_str("[stub]\nfailure_rate = nan\nmin_delay_ms = 1\nmax_delay_ms = 2\n")
                .unwrap();
        assert!(config.stub.failure_rate.is_nan());

        let stub = StubProvider::new(config.stub);
        assert_eq!(stub.config.failure_rate, 0.0);
        assert!(stub.get_reply("hi").await.is_ok());
        assert!(stub.fetch_older(None).await.is_ok());
    }

    #[test]
    fn out_of_range_failure_rate_is_clamped() {
        assert_eq!(seeded(7.5).config.failure_rate, 1.0);
        assert_eq!(seeded(-1.0).config.failure_rate, 0.0);
        assert_eq!(seeded(f64::INFINITY).config.failure_rate, 0.0);
    }

    #[test]
    fn inverted_delay_window_is_tolerated() {
        let stub = StubProvider::new(StubConfig {
            min_delay_ms: 50,
            max_delay_ms: 5,
            ..StubConfig::default()
        });
        let (delay, _, _) = stub.roll();
        assert!(delay >= Duration::from_millis(5) && delay <= Duration::from_millis(50));
    }
}
