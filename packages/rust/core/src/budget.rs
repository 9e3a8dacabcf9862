//! Per-minute rate budget for the text-generation provider.
//!
//! Every rewrite request reserves an estimated number of units before it is
//! sent. Reservations are counted in a one-minute window; a reservation that
//! would overflow the window suspends the caller until the window has ended
//! (plus a small safety margin) and then starts a fresh one.
//!
//! The lock is held across the suspension, so concurrent callers queue up
//! behind the one that is waiting and are admitted in order.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use articleflow_shared::PipelineConfig;

/// Length of one budget window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Rough units for a piece of text: one unit per four characters, rounded up.
pub fn estimate_units(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

#[derive(Debug)]
struct BudgetWindow {
    consumed: u64,
    window_start: Instant,
}

/// Point-in-time view of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSnapshot {
    pub limit: u64,
    pub consumed: u64,
    pub remaining: u64,
}

/// Shared units-per-minute budget. One instance per run, shared through `Arc`.
#[derive(Debug)]
pub struct RateBudget {
    limit: u64,
    safety_margin: Duration,
    window: Mutex<BudgetWindow>,
}

impl RateBudget {
    pub fn new(limit: u64, safety_margin: Duration) -> Self {
        Self {
            limit,
            safety_margin,
            window: Mutex::new(BudgetWindow {
                consumed: 0,
                window_start: Instant::now(),
            }),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.tokens_per_minute,
            Duration::from_millis(config.safety_margin_ms),
        )
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Wait until `units` fit in the current window, then commit them.
    ///
    /// Never fails. Returns how long the caller was suspended.
    pub async fn reserve(&self, units: u64) -> Duration {
        let mut window = self.window.lock().await;

        let now = Instant::now();
        if now.duration_since(window.window_start) >= WINDOW {
            window.consumed = 0;
            window.window_start = now;
        }

        if units > self.limit {
            warn!(units, limit = self.limit, "reservation exceeds the whole per-minute budget");
        }

        let mut waited = Duration::ZERO;
        // An empty window admits anything; waiting would not make it fit.
        if window.consumed > 0 && window.consumed + units > self.limit {
            let elapsed = now.duration_since(window.window_start);
            let wait = WINDOW.saturating_sub(elapsed) + self.safety_margin;
            info!(
                units,
                consumed = window.consumed,
                limit = self.limit,
                wait_ms = wait.as_millis() as u64,
                "rate budget exhausted, waiting for next window"
            );
            tokio::time::sleep(wait).await;

            window.consumed = 0;
            window.window_start = Instant::now();
            waited = wait;
        }

        window.consumed += units;
        waited
    }

    /// Consumption in the current window, as of now.
    pub async fn snapshot(&self) -> BudgetSnapshot {
        let window = self.window.lock().await;
        let consumed = if window.window_start.elapsed() >= WINDOW {
            0
        } else {
            window.consumed
        };
        BudgetSnapshot {
            limit: self.limit,
            consumed,
            remaining: self.limit.saturating_sub(consumed),
        }
    }
}
