//! Fixed-window request counting per client identity

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Limiter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

/// Outcome of a single limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Whole seconds until the window resets; only set on denial
    pub retry_after_secs: Option<u64>,
    pub limit: u32,
    pub remaining: u32,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            count: 0,
        }
    }

    fn expired(&self, now: Instant, length: Duration) -> bool {
        now.saturating_duration_since(self.started) >= length
    }
}

/// Per-key fixed-window limiter.
///
/// Check and increment happen under one lock, so concurrent callers can
/// never both take the last slot of a window.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count one request for `key` against the current window
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub(crate) fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let limit = self.config.max_requests;
        let mut windows = self.lock();

        let window = windows
            .entry(key.to_owned())
            .or_insert_with(|| Window::new(now));
        if window.expired(now, self.config.window) {
            *window = Window::new(now);
        }

        if window.count < limit {
            window.count += 1;
            return RateDecision {
                allowed: true,
                retry_after_secs: None,
                limit,
                remaining: limit - window.count,
            };
        }

        let left = self
            .config
            .window
            .saturating_sub(now.saturating_duration_since(window.started));
        RateDecision {
            allowed: false,
            retry_after_secs: Some(ceil_secs(left).max(1)),
            limit,
            remaining: 0,
        }
    }

    /// Drop every window that has run out; returns how many were removed
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        let length = self.config.window;
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, w| !w.expired(now, length));
        before - windows.len()
    }

    /// Number of identities currently holding a window
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        // Counters stay consistent even if a holder panicked mid-update.
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
