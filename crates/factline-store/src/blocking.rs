//! Bounded blocking calls
//!
//! Collaborator traits are synchronous. Async callers hand them to the
//! blocking pool and stop waiting after a deadline; a timed-out task is left
//! to finish on its own.

use factline_domain::traits::ServiceError;
use std::time::Duration;

/// Run `f` on the blocking pool, giving up after `limit`
///
/// # Errors
///
/// - `ServiceError::Timeout` when `limit` elapses first
/// - `ServiceError::Unavailable` when the task panics or is cancelled
/// - whatever `f` itself returns
pub async fn call_blocking<T, F>(limit: Duration, f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(ServiceError::Unavailable(format!("Task join error: {}", join))),
        Err(_) => Err(ServiceError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_value() {
        let out = call_blocking(Duration::from_secs(1), || Ok(41 + 1)).await;
        assert_eq!(out, Ok(42));
    }

    #[tokio::test]
    async fn test_propagates_service_error() {
        let out: Result<(), _> = call_blocking(Duration::from_secs(1), || {
            Err(ServiceError::Unavailable("down".into()))
        })
        .await;
        assert_eq!(out, Err(ServiceError::Unavailable("down".into())));
    }

    #[tokio::test]
    async fn test_times_out() {
        let out = call_blocking(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .await;
        assert_eq!(out, Err(ServiceError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_panic_maps_to_unavailable() {
        let out: Result<(), _> = call_blocking(Duration::from_secs(1), || panic!("boom")).await;
        assert!(matches!(out, Err(ServiceError::Unavailable(_))));
    }
}
