// ABOUTME: Fixed-window rate limiter for dev.to publish calls
// ABOUTME: Blocks once the per-window quota is used up, then starts a new window

use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// Writes allowed per window before pausing.
pub const UPLOAD_THRESHOLD: u32 = 10;

/// dev.to allows 10 writes per 30 seconds; the extra margin absorbs setup
/// latency before the first write of a window.
pub const QUOTA_PERIOD: Duration = Duration::from_secs(35);

/// Counters for the current window, threaded through the batch loop.
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    pub uploaded: u32,
    pub started: Instant,
}

impl RateWindow {
    pub fn start() -> Self {
        RateWindow {
            uploaded: 0,
            started: Instant::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    threshold: u32,
    period: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new(UPLOAD_THRESHOLD, QUOTA_PERIOD)
    }
}

impl RateLimiter {
    pub fn new(threshold: u32, period: Duration) -> Self {
        RateLimiter { threshold, period }
    }

    /// How long to wait before the next write, if the window is exhausted.
    pub fn pause_needed(&self, uploaded: u32, elapsed: Duration) -> Option<Duration> {
        if uploaded < self.threshold {
            return None;
        }
        self.period.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Called after every processed article. Sleeps out the remainder of a full
    /// window, then resets the counters; below the threshold it is a no-op.
    pub fn admit(&self, window: RateWindow) -> RateWindow {
        if window.uploaded < self.threshold {
            return window;
        }

        if let Some(wait) = self.pause_needed(window.uploaded, window.started.elapsed()) {
            info!(
                wait_ms = wait.as_millis() as u64,
                uploaded = window.uploaded,
                "rate limit reached, pausing"
            );
            thread::sleep(wait);
        }

        RateWindow::start()
    }
}
