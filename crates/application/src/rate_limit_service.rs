//! Rate limiting ports and application service.
//!
//! Sliding-window limiter over the `rate_limits` table, applied to
//! authorization-request creation so one subject cannot flood the approval
//! queue.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use assent_core::{AppError, AppResult};

/// Repository port for rate limit persistence.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Records an attempt for the given key.
    ///
    /// Uses an UPSERT pattern: if the current window has expired, resets the
    /// counter. Returns the updated attempt count within the active window.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Removes expired entries older than the given cutoff.
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
    /// The operation category (e.g. "authorization_create").
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

    /// Checks whether the given key is within the rate limit.
    ///
    /// Records the attempt and returns `Ok(())` if allowed, or
    /// `Err(AppError::RateLimited)` if the limit has been exceeded.
    ///
    /// The key is composed as `"{category}:{identifier}"` where the
    /// identifier is the calling subject.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, key: &str) -> AppResult<()> {
        let composite_key = format!("{}:{key}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            return Err(AppError::RateLimited(
                "too many authorization requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes expired rate limit entries. Intended for periodic cleanup.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use tokio::sync::Mutex;

    use assent_core::{AppError, AppResult};

    use super::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};

    #[derive(Default)]
    struct FakeRateLimitRepository {
        attempts: Mutex<HashMap<String, i32>>,
    }

    #[async_trait]
    impl RateLimitRepository for FakeRateLimitRepository {
        async fn record_attempt(
            &self,
            key: &str,
            _window_duration_seconds: i64,
        ) -> AppResult<AttemptInfo> {
            let mut attempts = self.attempts.lock().await;
            let count = attempts.entry(key.to_owned()).or_insert(0);
            *count += 1;
            Ok(AttemptInfo {
                attempt_count: *count,
                window_started_at: Utc::now(),
            })
        }

        async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn attempts_beyond_the_limit_are_rejected() {
        let service = RateLimitService::new(Arc::new(FakeRateLimitRepository::default()));
        let rule = RateLimitRule::new("authorization_create", 2, 300);

        assert!(service.check_rate_limit(&rule, "auth0|alice").await.is_ok());
        assert!(service.check_rate_limit(&rule, "auth0|alice").await.is_ok());
        let third = service.check_rate_limit(&rule, "auth0|alice").await;
        assert!(matches!(third, Err(AppError::RateLimited(_))));

        // a different subject has its own window
        assert!(service.check_rate_limit(&rule, "auth0|bob").await.is_ok());
    }
}
