use crate::RemoteError;
use std::time::Duration;

/// Bounded retry for transient HTTP statuses.
///
/// Attempt `n` (1-based) that fails with a retryable status is followed by a
/// sleep of `base_delay * 2^n` before attempt `n + 1`, until `max_attempts`
/// is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Run `op` until it succeeds, fails with something other than a
    /// retryable status, or attempts run out. `op` receives the 1-based
    /// attempt number.
    pub fn run<T, F>(&self, url: &str, mut op: F) -> Result<T, RemoteError>
    where
        F: FnMut(u32) -> Result<T, RemoteError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Err(RemoteError::Status { code, .. }) if self.is_retryable(code) => {
                    if attempt >= max_attempts {
                        return Err(RemoteError::RetriesExhausted {
                            url: url.to_owned(),
                            attempts: attempt,
                            last_status: code,
                        });
                    }
                    let delay = self.delay_for(attempt);
                    tracing::debug!(
                        "HTTP {code} for {url} (attempt {attempt}/{max_attempts}), retrying in {delay:?}"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
