//! Timers that work in the browser and on native runtimes.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::future::{select, Either};

use crate::ApiError;

#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Resolve `fut`, or fail with [`ApiError::Timeout`] once `limit` elapses.
pub async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let fut = pin!(fut);
    let timer = pin!(sleep(limit));
    match select(fut, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(ApiError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires() {
        let result: Result<(), ApiError> = with_timeout(Duration::from_secs(5), async {
            sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(ApiError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_future_wins() {
        let result = with_timeout(Duration::from_secs(5), async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
