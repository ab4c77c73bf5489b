use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::domain::deadline::Deadline;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::session::service::RefreshTokenManager;

/// Spawn the periodic refresh token sweep.
///
/// The first sweep runs immediately. Failures are logged and the loop keeps
/// going; it only stops once `shutdown` is cancelled.
///
/// # Arguments
/// * `sessions` - Manager whose expired records are swept
/// * `interval` - Time between sweeps
/// * `timeout` - Deadline for a single sweep
/// * `shutdown` - Stops the loop and aborts an in-flight sweep
pub fn spawn_cleanup<RS>(
    sessions: Arc<RefreshTokenManager<RS>>,
    interval: Duration,
    timeout: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    RS: RefreshTokenStore,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Refresh token cleanup stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let deadline = Deadline::after(timeout).with_cancellation(shutdown.child_token());
                    match sessions.cleanup_expired(&deadline).await {
                        Ok(deleted) => {
                            tracing::info!(deleted, "Refresh token cleanup completed");
                        }
                        Err(e) => {
                            tracing::error!("Refresh token cleanup failed: {}", e);
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use auth::FixedClock;
    use chrono::Duration as ChronoDuration;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::domain::session::models::RefreshToken;
    use crate::domain::user::models::UserId;
    use crate::outbound::repositories::InMemoryRefreshTokenStore;

    #[tokio::test]
    async fn test_cleanup_runs_and_stops_on_shutdown() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let store = Arc::new(InMemoryRefreshTokenStore::new());
        store
            .insert(RefreshToken::new(
                UserId::new(),
                "stale".to_string(),
                start - ChronoDuration::days(60),
                ChronoDuration::days(30),
            ))
            .await
            .unwrap();

        let sessions = Arc::new(RefreshTokenManager::new(
            Arc::clone(&store),
            Arc::new(FixedClock::new(start)),
            ChronoDuration::days(30),
            ChronoDuration::hours(168),
        ));
        let shutdown = CancellationToken::new();

        let handle = spawn_cleanup(
            sessions,
            Duration::from_millis(10),
            Duration::from_secs(1),
            shutdown.clone(),
        );

        for _ in 0..100 {
            if store.is_empty().unwrap() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(store.is_empty().unwrap());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("Cleanup task did not stop")
            .unwrap();
    }
}
