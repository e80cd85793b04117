//! Terminal error surfaced once a retry policy is exhausted.

use std::fmt;

/// Wraps the final triggering error once a policy stops authorizing
/// retries: total attempt count, the policy's configured message, and the
/// original cause as typed fields rather than interpolated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    attempts: u32,
    message: String,
    source: E,
}

impl<E> RetryExhausted<E> {
    pub(crate) fn new(attempts: u32, message: impl Into<String>, source: E) -> Self {
        Self { attempts, message: message.into(), source }
    }

    /// Total failures observed, including the one that exhausted the policy.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The policy's configured error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Borrow the error that triggered exhaustion.
    pub fn cause(&self) -> &E {
        &self.source
    }

    /// Consume the wrapper, yielding the original cause.
    pub fn into_source(self) -> E {
        self.source
    }
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "retry limit reached after {} attempts: {}; last error: {}",
            self.attempts, self.message, self.source
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
