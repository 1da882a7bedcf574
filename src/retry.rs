// Retry logic with exponential backoff for rate-limited model calls

use std::time::Duration;
use tokio::time::sleep;

use crate::providers::ProviderError;

const MAX_ATTEMPTS: u32 = 5;

/// Execute a model call with exponential backoff on rate limits.
///
/// Only `ProviderError::RateLimited` is retried, sleeping `2^attempt` seconds
/// before the next attempt. Any other error aborts immediately. Exhausting
/// all attempts yields `None`; callers degrade to an empty result instead of
/// failing the workflow.
pub async fn with_backoff<F, Fut, T>(f: F) -> Option<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, ProviderError>>,
{
    for attempt in 0..MAX_ATTEMPTS {
        match f().await {
            Ok(result) => return Some(result),
            Err(ProviderError::RateLimited(msg)) => {
                if attempt < MAX_ATTEMPTS - 1 {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Rate limited (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        MAX_ATTEMPTS,
                        delay,
                        msg
                    );
                    sleep(delay).await;
                }
            }
            Err(e) => {
                tracing::error!("Model call failed, not retrying: {}", e);
                return None;
            }
        }
    }

    tracing::error!(
        "Model call still rate limited after {} attempts, giving up",
        MAX_ATTEMPTS
    );
    None
}
