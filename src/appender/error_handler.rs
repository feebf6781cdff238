//! Reporting for sink failures that the appender swallows
//!
//! Reports go to stderr rather than through `log`, since the appender may be
//! the very logger `log` would route them to.

use chrono::{Local, Utc};
use colored::*;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use crate::error::InvocationError;

pub trait ErrorHandler: Send + Sync {
    fn error(&self, err: &InvocationError);
}

/// Writes at most `max_per_window` reports to stderr per time window
#[derive(Debug)]
pub struct DefaultErrorHandler {
    max_per_window: u64,
    window_ms: i64,
    window_start: AtomicI64,
    count: AtomicU64,
}

impl DefaultErrorHandler {
    pub const MAX_REPORTS: u64 = 3;
    pub const WINDOW: Duration = Duration::from_secs(5 * 60);

    pub fn new() -> Self {
        Self::with_limit(Self::MAX_REPORTS, Self::WINDOW)
    }

    pub fn with_limit(max_per_window: u64, window: Duration) -> Self {
        Self {
            max_per_window,
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            window_start: AtomicI64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Counting is approximate when several threads fail at once
    pub(crate) fn should_report(&self, now_ms: i64) -> bool {
        let start = self.window_start.load(Ordering::Relaxed);
        if now_ms.saturating_sub(start) >= self.window_ms {
            self.window_start.store(now_ms, Ordering::Relaxed);
            self.count.store(1, Ordering::Relaxed);
            return self.max_per_window > 0;
        }
        self.count.fetch_add(1, Ordering::Relaxed) < self.max_per_window
    }
}

impl Default for DefaultErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn error(&self, err: &InvocationError) {
        if self.should_report(Utc::now().timestamp_millis()) {
            eprintln!(
                "{} {} {}",
                Local::now().format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                "flog".yellow().bold(),
                err
            );
        }
    }
}
