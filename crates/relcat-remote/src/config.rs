use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP settings for sidecar fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Per-request timeout covering connect, send and body read.
    pub timeout_secs: u64,
    /// Attempts per sidecar, including the first.
    pub max_attempts: u32,
    /// Base of the exponential backoff between attempts.
    pub backoff_base_ms: u64,
    /// Statuses treated as transient.
    pub retryable_statuses: Vec<u16>,
    /// Sent as `Authorization: Bearer <token>` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            timeout_secs: 30,
            max_attempts: policy.max_attempts,
            backoff_base_ms: policy.base_delay.as_millis() as u64,
            retryable_statuses: policy.retryable_statuses,
            auth_token: None,
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_owned());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.backoff_base_ms),
            retryable_statuses: self.retryable_statuses.clone(),
        }
    }
}
