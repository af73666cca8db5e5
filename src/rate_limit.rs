use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_MAX_REQUESTS: usize = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

// Stale identifiers are swept every this many checks
const SWEEP_EVERY: u64 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rate limit exceeded. Please wait before trying again.")]
pub struct RateLimited {
    pub identifier: String,
}

// Accepted timestamps per identifier, oldest first. Rejections are not recorded.
pub struct RateLimiter {
    ledger: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
    checks: AtomicU64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            ledger: DashMap::new(),
            max_requests,
            window,
            checks: AtomicU64::new(0),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, identifier: &str) -> Result<(), RateLimited> {
        self.check_at(identifier, Instant::now())
    }

    pub fn check_at(&self, identifier: &str, now: Instant) -> Result<(), RateLimited> {
        let result = {
            let mut entry = self.ledger.entry(identifier.to_string()).or_default();
            trim(&mut entry, now, self.window);

            if entry.len() >= self.max_requests {
                warn!(
                    identifier,
                    in_window = entry.len(),
                    max = self.max_requests,
                    "rate limit exceeded"
                );
                Err(RateLimited {
                    identifier: identifier.to_string(),
                })
            } else {
                entry.push_back(now);
                debug!(
                    identifier,
                    in_window = entry.len(),
                    max = self.max_requests,
                    "rate limit ok"
                );
                Ok(())
            }
        };

        // entry guard is released above, sweeping takes shard locks
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep(now);
        }

        result
    }

    pub fn in_window(&self, identifier: &str, now: Instant) -> usize {
        self.ledger
            .get(identifier)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|t| within(**t, now, self.window))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Drop identifiers with no request left inside the window.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.ledger.len();
        self.ledger.retain(|_, stamps| {
            trim(stamps, now, self.window);
            !stamps.is_empty()
        });
        let removed = before.saturating_sub(self.ledger.len());
        if removed > 0 {
            debug!(removed, remaining = self.ledger.len(), "swept idle identifiers");
        }
        removed
    }

    pub fn tracked_identifiers(&self) -> usize {
        self.ledger.len()
    }
}

fn within(stamp: Instant, now: Instant, window: Duration) -> bool {
    // a stamp exactly one window old still counts
    now.saturating_duration_since(stamp) <= window
}

fn trim(stamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = stamps.front() {
        if within(*oldest, now, window) {
            break;
        }
        stamps.pop_front();
    }
}
