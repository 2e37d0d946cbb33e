//! Binary download with bounded retry.

use crate::Transport;
use backdrop_error::{FetchError, FetchErrorKind};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Delays slept between attempts: `base, 2*base, 4*base, ...`.
///
/// Yields one fewer delay than `max_attempts`, so the retry loop makes at most
/// `max_attempts` calls. No jitter is applied.
///
/// # Examples
///
/// ```
/// use backdrop_fetch::backoff_delays;
/// use std::time::Duration;
///
/// let delays: Vec<_> = backoff_delays(3, Duration::from_millis(300)).collect();
/// assert_eq!(delays, vec![Duration::from_millis(300), Duration::from_millis(600)]);
/// ```
pub fn backoff_delays(max_attempts: u32, base_delay: Duration) -> impl Iterator<Item = Duration> {
    (0..max_attempts.saturating_sub(1))
        .map(move |i| base_delay.saturating_mul(2u32.saturating_pow(i)))
}

/// Download a binary payload, retrying every failure.
///
/// Attempt `n` failing is followed by a sleep of `base_delay * 2^(n-1)`.
/// Any non-2xx status or transport error is retried, since a CDN may briefly
/// answer 404 for a freshly published asset. Exactly `max(1, max_attempts)`
/// requests are made before giving up.
///
/// # Errors
///
/// Returns [`FetchErrorKind::DownloadExhausted`] carrying the attempt count and
/// the last attempt's error.
#[instrument(skip(transport, base_delay), fields(base_delay_ms = base_delay.as_millis() as u64))]
pub async fn fetch_binary_with_retry<T>(
    transport: &T,
    url: &str,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<Vec<u8>, FetchError>
where
    T: Transport + ?Sized,
{
    let attempts = AtomicU32::new(0);
    let strategy = backoff_delays(max_attempts.max(1), base_delay);

    let result = Retry::spawn(strategy, || {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            let outcome = match transport.get(url).await {
                Ok(response) if response.is_success() => Ok(response.body),
                Ok(response) => Err(FetchError::new(FetchErrorKind::HttpStatus {
                    url: url.to_string(),
                    status: response.status,
                })),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(body) => {
                    debug!(attempt, size = body.len(), "Downloaded payload");
                    Ok(body)
                }
                Err(e) => {
                    warn!(attempt, error = %e.kind, "Download attempt failed");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
            }
        }
    })
    .await;

    result.map_err(|last| {
        FetchError::new(FetchErrorKind::DownloadExhausted {
            url: url.to_string(),
            attempts: attempts.load(Ordering::SeqCst),
            last: last.kind.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_attempt_has_no_delays() {
        assert_eq!(backoff_delays(1, Duration::from_millis(300)).count(), 0);
        assert_eq!(backoff_delays(0, Duration::from_millis(300)).count(), 0);
    }

    #[test]
    fn delays_double() {
        let delays: Vec<_> = backoff_delays(5, Duration::from_millis(100)).collect();
        assert_eq!(
            delays,
            [100, 200, 400, 800].map(Duration::from_millis).to_vec()
        );
    }
}
