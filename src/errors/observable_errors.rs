use std::{error::Error, sync::Arc, time::Duration};

use thiserror::Error;

/// Error type passed to an `Observer`'s `error` function.
pub type SignalError = Arc<dyn Error + Send + Sync>;

/// Errors produced by observables, their operators and the blocking or awaiting
/// helpers that consume them.
#[derive(Debug, Clone, Error)]
pub enum ObservableError {
    /// `single()` was applied to a source that completed without emitting.
    #[error("source was expected to emit exactly one item but emitted none")]
    NoSuchElement,

    /// `single()` was applied to a source that emitted more than one item.
    #[error("source was expected to emit exactly one item but emitted more than one")]
    TooManyElements,

    /// Any other error signalled by a source.
    #[error("observable emitted an error: {0}")]
    Upstream(SignalError),

    /// The source dropped its subscriber without completing or erroring.
    #[error("observable dropped its subscriber without a terminal signal")]
    Disconnected,

    #[error("no terminal signal received within {0:?}")]
    Timeout(Duration),

    #[error("failed to await observable task: {0}")]
    JoinTask(String),

    #[error("failed to join observable thread")]
    JoinThread,

    /// `Subscription::join` was called on a subscription backed by a Tokio task.
    #[error("subscription is backed by a Tokio task; use `join_concurrent().await` instead")]
    BlockingJoinOnTask,
}

/// Result type alias for blocking and awaiting operations.
pub type Result<T> = std::result::Result<T, ObservableError>;

impl ObservableError {
    /// Recovers an `ObservableError` from an error signal.
    ///
    /// Signals raised by this crate's operators come back as their original
    /// variant, anything else is wrapped in [`ObservableError::Upstream`].
    #[must_use]
    pub fn from_signal(signal: SignalError) -> Self {
        match signal.downcast_ref::<ObservableError>() {
            Some(e) => e.clone(),
            None => ObservableError::Upstream(signal),
        }
    }

    /// Wraps this error into a signal that can be passed to `Observer::error`.
    #[must_use]
    pub fn into_signal(self) -> SignalError {
        Arc::new(self)
    }

    /// Returns true if this error reports a cardinality violation from `single()`.
    #[must_use]
    pub fn is_cardinality(&self) -> bool {
        matches!(
            self,
            ObservableError::NoSuchElement | ObservableError::TooManyElements
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Foreign;

    impl std::fmt::Display for Foreign {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "foreign failure")
        }
    }

    impl Error for Foreign {}

    #[test]
    fn from_signal_recovers_own_variants() {
        let signal = ObservableError::NoSuchElement.into_signal();
        assert!(matches!(
            ObservableError::from_signal(signal),
            ObservableError::NoSuchElement
        ));
    }

    #[test]
    fn from_signal_wraps_foreign_errors() {
        let err = ObservableError::from_signal(Arc::new(Foreign));
        assert!(matches!(err, ObservableError::Upstream(_)));
        assert!(err.to_string().contains("foreign failure"));
    }

    #[test]
    fn cardinality_errors() {
        assert!(ObservableError::NoSuchElement.is_cardinality());
        assert!(ObservableError::TooManyElements.is_cardinality());
        assert!(!ObservableError::Disconnected.is_cardinality());
    }
}
