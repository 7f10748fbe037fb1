use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Upper bound on a server-requested retry wait.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// How a failed request should be treated by [`retry_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableError {
    /// 429 from the upstream API
    RateLimit,
    /// 429 with a server-provided wait, used as the minimum delay
    RetryAfter(Duration),
    /// 5xx from the upstream API
    ServerError,
    /// Request or connect timeout
    Timeout,
    /// Anything else, fail immediately
    Other,
}

impl RetryableError {
    /// Classify an HTTP status code returned by an upstream API.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => RetryableError::RateLimit,
            500..=599 => RetryableError::ServerError,
            408 => RetryableError::Timeout,
            _ => RetryableError::Other,
        }
    }
}

/// Backoff schedule per error class.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    pub max_attempts: u32,
    pub rate_limit_delays_ms: Vec<u64>,
    pub server_error_delays_ms: Vec<u64>,
    pub timeout_delays_ms: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_delays_ms: vec![1000, 2000, 4000],
            server_error_delays_ms: vec![500, 1000, 2000],
            timeout_delays_ms: vec![500, 1000],
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Uniform short delays, used by tests and local tooling.
    pub fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        let delays = vec![delay_ms; max_attempts as usize];
        Self {
            max_attempts,
            rate_limit_delays_ms: delays.clone(),
            server_error_delays_ms: delays.clone(),
            timeout_delays_ms: delays,
        }
    }

    /// Delay before retry number `attempt` (0-indexed). The last configured
    /// delay is reused when the schedule is shorter than `max_attempts`.
    fn delay_for(&self, attempt: u32, kind: RetryableError) -> Option<Duration> {
        let delays = match kind {
            RetryableError::RetryAfter(wait) => {
                let wait = wait.min(MAX_RETRY_AFTER);
                let scheduled = self
                    .delay_for(attempt, RetryableError::RateLimit)
                    .unwrap_or(Duration::ZERO);
                return Some(scheduled.max(wait));
            }
            RetryableError::RateLimit => &self.rate_limit_delays_ms,
            RetryableError::ServerError => &self.server_error_delays_ms,
            RetryableError::Timeout => &self.timeout_delays_ms,
            RetryableError::Other => return None,
        };

        delays
            .get(attempt as usize)
            .or_else(|| delays.last())
            .map(|&ms| Duration::from_millis(ms))
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `config.max_attempts` retries have been spent.
///
/// ```ignore
/// let body = retry_with_backoff(
///     || async { client.get(&url).send().await },
///     &RetryConfig::with_max_attempts(3),
///     |e| if e.is_timeout() { RetryableError::Timeout } else { RetryableError::Other },
/// ).await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    config: &RetryConfig,
    classify_error: impl Fn(&E) -> RetryableError,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Request succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        let kind = classify_error(&err);
        if kind == RetryableError::Other {
            debug!("Non-retryable error: {}", err);
            return Err(err);
        }

        if attempt >= config.max_attempts {
            error!(
                "Giving up after {} attempts ({:?}): {}",
                attempt + 1,
                kind,
                err
            );
            return Err(err);
        }

        let Some(delay) = config.delay_for(attempt, kind) else {
            return Err(err);
        };

        warn!(
            "Attempt {}/{} failed ({:?}): {}, retrying in {}ms",
            attempt + 1,
            config.max_attempts + 1,
            kind,
            err,
            delay.as_millis()
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
