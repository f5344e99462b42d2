//! Request pacing
//!
//! Every outbound request waits on one shared [`Throttle`], which keeps at
//! least the configured delay between request starts. With auto-throttle
//! enabled the delay follows observed response latency, never dropping below
//! the configured minimum.
//!
//! A waiter reserves its start slot under the lock and sleeps after releasing
//! it, so latency updates never queue behind pending requests.

use crate::config::CrawlerConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Upper bound for the adaptive delay
pub const MAX_AUTO_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct ThrottleState {
    /// Start time of the most recently reserved request slot
    last_slot: Option<Instant>,
    delay: Duration,
}

impl ThrottleState {
    /// Claims the earliest slot at least one delay after the previous one
    fn reserve(&mut self, now: Instant) -> Instant {
        let slot = match self.last_slot {
            Some(last) => std::cmp::max(now, last + self.delay),
            None => now,
        };
        self.last_slot = Some(slot);
        slot
    }
}

/// Shared inter-request delay
#[derive(Debug)]
pub struct Throttle {
    min_delay: Duration,
    auto: bool,
    state: Mutex<ThrottleState>,
}

impl Throttle {
    /// Creates a throttle with a fixed minimum delay
    pub fn new(min_delay: Duration, auto: bool) -> Self {
        Self {
            min_delay,
            auto,
            state: Mutex::new(ThrottleState {
                last_slot: None,
                delay: min_delay,
            }),
        }
    }

    /// Builds a throttle from the crawler configuration
    ///
    /// The delay is clamped to `[0, MAX_AUTO_DELAY]`; a value that is not a
    /// number means no delay.
    pub fn from_config(config: &CrawlerConfig) -> Self {
        let seconds = config
            .request_delay_seconds
            .clamp(0.0, MAX_AUTO_DELAY.as_secs_f64());
        Self::new(
            Duration::try_from_secs_f64(seconds).unwrap_or_default(),
            config.auto_throttle,
        )
    }

    /// Waits until the next request may start
    ///
    /// Concurrent callers get consecutive slots one delay apart.
    pub async fn wait(&self) {
        let slot = self.state.lock().await.reserve(Instant::now());
        if slot > Instant::now() {
            tracing::trace!("Throttling until {:?}", slot);
            tokio::time::sleep_until(slot).await;
        }
    }

    /// Feeds a response latency into the adaptive delay
    ///
    /// No-op unless auto-throttle is enabled. Slots already reserved keep
    /// the delay they were reserved with.
    pub async fn record_latency(&self, latency: Duration) {
        if !self.auto {
            return;
        }

        let mut state = self.state.lock().await;
        let max = std::cmp::max(self.min_delay, MAX_AUTO_DELAY);
        state.delay = ((state.delay + latency) / 2).clamp(self.min_delay, max);
    }

    /// The delay currently enforced between requests
    pub async fn current_delay(&self) -> Duration {
        self.state.lock().await.delay
    }
}
