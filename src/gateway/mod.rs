//! Rate-limited gateways for external AI APIs.
//!
//! Each external API gets its own [`ApiGateway`]: calls are strictly
//! serialized, a fixed gap is kept after each call completes, and
//! quota errors are retried with exponential backoff. Distinct gateways
//! run independently of one another.

pub mod queue;
pub mod retry;

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub use queue::RateLimitedQueue;
pub use retry::{retry_with_backoff, RetryPolicy};

/// Failure reported by an external AI provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status. 429s and quota-exhaustion bodies
    /// become [`ProviderError::Quota`].
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let lower = body.to_lowercase();
        if status == 429 || lower.contains("resource_exhausted") || lower.contains("quota") {
            ProviderError::Quota(if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                body
            })
        } else {
            ProviderError::Http { status, body }
        }
    }

    /// Whether this failure is a quota/429-class error worth backing off on.
    pub fn is_quota(&self) -> bool {
        matches!(self, ProviderError::Quota(_))
    }
}

impl From<ureq::Error> for ProviderError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                ProviderError::from_status(status, body)
            }
            ureq::Error::Transport(transport) => ProviderError::Transport(transport.to_string()),
        }
    }
}

/// Serialized, spaced and quota-aware access to one external API.
pub struct ApiGateway {
    queue: RateLimitedQueue,
    retry: RetryPolicy,
}

impl ApiGateway {
    pub fn new(name: impl Into<String>, interval: Duration, retry: RetryPolicy) -> Self {
        Self {
            queue: RateLimitedQueue::new(name, interval),
            retry,
        }
    }

    pub fn name(&self) -> &str {
        self.queue.name()
    }

    /// Run `operation` through this gateway, retrying quota failures.
    /// Every attempt takes its own slot, so the minimum gap applies before
    /// a retry too and the backoff delay adds on top of it.
    /// `op` is invoked before the slot is free; its future must do the
    /// actual call when polled.
    pub async fn call<F, Fut, T>(&self, operation: &str, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        retry_with_backoff(operation, &self.retry, || {
            let attempt = op();
            self.queue.run(move || attempt)
        })
        .await
    }
}
