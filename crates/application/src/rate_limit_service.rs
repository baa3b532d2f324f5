//! Rate limiting ports and application service.
//!
//! Fixed-window counters keyed by category and caller, used to throttle
//! passcode guessing against the eight-digit keyspace.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use schoolgate_core::{AppError, AppResult};

/// Windows older than this are stale for every rule.
const STALE_WINDOW_HOURS: i64 = 1;

/// Repository port for rate limit persistence.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Records an attempt for the given key and returns the active window.
    ///
    /// An expired window is reset before counting.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Deletes windows that started before the cutoff, returning how many went.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Information about the current rate limit window for a key.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Number of attempts in the current window (including this one).
    pub attempt_count: i32,
    /// When the current window started.
    pub window_started_at: DateTime<Utc>,
}

/// Configuration for a rate limit rule.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    /// Category name prefixed to every key.
    pub category: String,
    /// Maximum number of attempts allowed in the window.
    pub max_attempts: i32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }

    /// Passcode sign-in: 10 attempts per caller per 15 minutes.
    #[must_use]
    pub fn passcode_sign_in() -> Self {
        Self::new("passcode_sign_in", 10, 15 * 60)
    }
}

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Records the attempt and fails with `RateLimited` once the rule is exceeded.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, key: &str) -> AppResult<()> {
        let composite_key = format!("{}:{key}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            return Err(AppError::RateLimited(format!(
                "too many {} attempts since {}, please try again later",
                rule.category,
                info.window_started_at.to_rfc3339()
            )));
        }

        Ok(())
    }

    /// Removes windows no rule can still be counting. Intended for periodic cleanup.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(STALE_WINDOW_HOURS);
        self.repository.cleanup_expired(cutoff).await
    }
}
