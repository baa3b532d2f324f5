use std::time::Duration;

use schoolgate_application::RateLimitService;
use tracing::{debug, error, info};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodically deletes stale rate limit windows so rotated keys do not pile up.
pub fn spawn_rate_limit_cleanup_worker(rate_limit_service: RateLimitService) {
    tokio::spawn(async move {
        info!(
            interval_seconds = CLEANUP_INTERVAL.as_secs(),
            "rate limit cleanup worker started"
        );

        loop {
            match rate_limit_service.cleanup().await {
                Ok(removed) => debug!(removed, "rate limit windows cleaned up"),
                Err(error) => error!(
                    category = "backend_failure",
                    error = %error,
                    "rate limit cleanup failed"
                ),
            }

            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}
