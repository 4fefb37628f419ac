//! Result and error types for Esperar.

use thiserror::Error;

use crate::context::ContextError;

/// Result type for Esperar operations
pub type EsperarResult<T> = Result<T, EsperarError>;

/// Errors that can occur while waiting
#[derive(Debug, Clone, Error)]
pub enum EsperarError {
    /// The wait deadline elapsed without the condition producing a value.
    ///
    /// Carries the condition description and the last observed non-success
    /// state for diagnostics. This is the expected outcome of a
    /// negative-path wait and is always recoverable by the caller.
    #[error("condition \"{condition}\" not met within {timeout_ms}ms (last outcome: {last_outcome})")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
        /// Description of the condition that was polled
        condition: String,
        /// Rendering of the last non-success evaluation outcome
        last_outcome: String,
    },

    /// A condition evaluation raised an error whose kind was not tolerated.
    ///
    /// Surfaces immediately, aborting the poll loop without waiting out the
    /// timeout.
    #[error("condition evaluation failed: {0}")]
    Propagated(#[from] ContextError),

    /// Invalid wait configuration, rejected before any polling begins.
    #[error("invalid wait configuration: {message}")]
    Configuration {
        /// What was wrong with the configuration
        message: String,
    },
}

impl EsperarError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
