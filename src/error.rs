//! Error taxonomy for the effect layer.
//!
//! The stream engine itself has no error vocabulary of its own; every
//! failure travelling through an effect's error channel is a [`FlowError`].
//! Keeping the taxonomy concrete (rather than generic over `E`) lets the
//! async bridge synthesize overflow and protocol errors, and gives effect
//! outcomes the deterministic equality that law checking needs.

use thiserror::Error;

/// A failure travelling through an effect's error channel.
///
/// `FlowError` is `Clone + PartialEq + Eq` so that two effect outcomes can
/// be compared directly, e.g. when asserting monad laws over effects that
/// produce a single synchronous value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The wrapped computation raised an error.
    ///
    /// Propagates through `map`, `flat_map`, `concat_map` and `switch_map`
    /// unchanged; only [`handle_error_with`] intercepts it.
    ///
    /// [`handle_error_with`]: crate::ReactiveEffect::handle_error_with
    #[error("{0}")]
    Upstream(String),

    /// Production outpaced consumption under
    /// [`BackpressureStrategy::Error`](crate::BackpressureStrategy::Error).
    #[error("backpressure overflow: producer emitted while the consumer was not ready")]
    Overflow,

    /// A bridged callback invoked its continuation more than once.
    ///
    /// This error is never delivered downstream: the first invocation wins
    /// and later ones are dropped with a warning. It exists so the warning
    /// can name the violation precisely.
    #[error("async callback invoked its continuation more than once")]
    ProtocolViolation,
}

impl FlowError {
    /// Shorthand for an [`Upstream`](FlowError::Upstream) failure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::FlowError;
    ///
    /// let e = FlowError::upstream("boom");
    /// assert_eq!(e, FlowError::Upstream("boom".to_string()));
    /// ```
    pub fn upstream(msg: impl Into<String>) -> Self {
        FlowError::Upstream(msg.into())
    }
}
