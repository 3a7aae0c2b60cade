//! The reactive effect wrapper.
//!
//! [`ReactiveEffect<A>`] wraps exactly one push-based stream handle: a
//! possibly-infinite sequence of `A` values with an error channel. It is
//! the sole concrete representation of "a computation producing zero or
//! more values over time" in this crate; everything else composes it.
//!
//! # Laziness
//!
//! Composition never starts execution. Every operator returns a new effect
//! wrapping a new derived stream immediately; nothing runs until the
//! effect is subscribed to, either by polling it as a [`Stream`] or by
//! driving it with [`run`](ReactiveEffect::run).
//!
//! # Choosing a flattening discipline
//!
//! The three flattening operators share a type signature and differ only
//! in ordering and concurrency:
//!
//! - [`flat_map`](ReactiveEffect::flat_map): nested effects run
//!   concurrently, outputs interleave as they arrive;
//! - [`concat_map`](ReactiveEffect::concat_map): strictly sequential, one
//!   nested effect at a time in source order;
//! - [`switch_map`](ReactiveEffect::switch_map): latest wins, a new source
//!   element cancels the still-running nested effect before it.
//!
//! [`CompositionStrategy`] selects among them as a value, for call sites
//! that take the discipline as a parameter.

pub mod bridge;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use bridge::{run_async, run_async_with, BackpressureStrategy, Callback};
pub use strategy::CompositionStrategy;

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};

use crate::error::FlowError;
use crate::stream::{switch_all, terminate_on_error};

/// The stream handle an effect wraps: a boxed push-based sequence of
/// values with a terminal error channel.
///
/// Well-formedness invariant: a `FlowStream` never yields another item
/// after its first `Err`. Every constructor and operator in this crate
/// preserves it.
pub type FlowStream<A> = BoxStream<'static, Result<A, FlowError>>;

/// A deferred computation producing zero or more `A` values over time,
/// with an error channel.
///
/// Owns exactly one [`FlowStream`]. Operators consume the effect and
/// produce a new one wrapping a new derived stream; no effect ever
/// mutates another effect's stream in place.
///
/// # Example
///
/// ```rust
/// use millstream::ReactiveEffect;
///
/// # tokio_test::block_on(async {
/// let effect = ReactiveEffect::pure(21).map(|x| x * 2);
/// assert_eq!(effect.run().await, Ok(vec![42]));
/// # });
/// ```
pub struct ReactiveEffect<A> {
    stream: FlowStream<A>,
}

impl<A> fmt::Debug for ReactiveEffect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveEffect")
            .field("stream", &"<stream>")
            .finish()
    }
}

impl<A: Send + 'static> ReactiveEffect<A> {
    /// Wrap a raw stream handle in an effect.
    ///
    /// This is the coercion from the engine's representation into the
    /// effect wrapper; [`into_inner`](ReactiveEffect::into_inner) is its
    /// inverse. The stream must uphold the [`FlowStream`] well-formedness
    /// invariant: no items after the first `Err`.
    pub fn new(stream: impl Stream<Item = Result<A, FlowError>> + Send + 'static) -> Self {
        ReactiveEffect {
            stream: stream.boxed(),
        }
    }

    /// Recover the raw stream handle from the wrapper.
    pub fn into_inner(self) -> FlowStream<A> {
        self.stream
    }

    /// An effect that emits exactly one value, then completes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::ReactiveEffect;
    ///
    /// # tokio_test::block_on(async {
    /// assert_eq!(ReactiveEffect::pure(5).run().await, Ok(vec![5]));
    /// # });
    /// ```
    pub fn pure(value: A) -> Self {
        Self::new(stream::iter(std::iter::once(Ok(value))))
    }

    /// An effect that emits nothing and fails immediately.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::{FlowError, ReactiveEffect};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = ReactiveEffect::<i32>::raise_error(FlowError::upstream("boom"));
    /// assert_eq!(effect.run().await, Err(FlowError::upstream("boom")));
    /// # });
    /// ```
    pub fn raise_error(error: FlowError) -> Self {
        Self::new(stream::iter(std::iter::once(Err(error))))
    }

    /// Element-wise transform.
    ///
    /// Preserves element order and the error channel unchanged; the
    /// closure is never invoked once the stream has failed.
    pub fn map<B, F>(self, f: F) -> ReactiveEffect<B>
    where
        B: Send + 'static,
        F: FnMut(A) -> B + Send + 'static,
    {
        ReactiveEffect::new(self.stream.map_ok(f))
    }

    /// Merge flattening: nested effects run concurrently and their
    /// outputs interleave as they arrive, with no ordering guarantee
    /// across source elements.
    pub fn flat_map<B, F>(self, mut f: F) -> ReactiveEffect<B>
    where
        B: Send + 'static,
        F: FnMut(A) -> ReactiveEffect<B> + Send + 'static,
    {
        let nested = self.stream.map_ok(move |a| f(a).into_inner());
        ReactiveEffect::new(terminate_on_error(nested.try_flatten_unordered(None)))
    }

    /// Concat flattening: nested effects run one at a time, strictly in
    /// source order. No output for element `n + 1` precedes the full
    /// completion of element `n`'s nested effect.
    pub fn concat_map<B, F>(self, mut f: F) -> ReactiveEffect<B>
    where
        B: Send + 'static,
        F: FnMut(A) -> ReactiveEffect<B> + Send + 'static,
    {
        let nested = self.stream.map_ok(move |a| f(a).into_inner());
        ReactiveEffect::new(terminate_on_error(nested.try_flatten()))
    }

    /// Switch flattening: only the most recently started nested effect is
    /// observed. A new source element cancels the still-running nested
    /// effect from the previous element by dropping its stream.
    pub fn switch_map<B, F>(self, mut f: F) -> ReactiveEffect<B>
    where
        B: Send + 'static,
        F: FnMut(A) -> ReactiveEffect<B> + Send + 'static,
    {
        let nested = self.stream.map_ok(move |a| f(a).into_inner());
        ReactiveEffect::new(switch_all(nested))
    }

    /// On upstream failure, continue with `recover(error)` instead of
    /// propagating the failure; on success, values pass through
    /// unchanged.
    ///
    /// Only the upstream's own failure is intercepted. A failure of the
    /// recovery effect itself propagates.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::{FlowError, ReactiveEffect};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = ReactiveEffect::<i32>::raise_error(FlowError::upstream("boom"))
    ///     .handle_error_with(|_| ReactiveEffect::pure(0));
    /// assert_eq!(effect.run().await, Ok(vec![0]));
    /// # });
    /// ```
    pub fn handle_error_with<F>(self, recover: F) -> ReactiveEffect<A>
    where
        F: FnOnce(FlowError) -> ReactiveEffect<A> + Send + 'static,
    {
        let mut current = self.stream;
        let mut recover = Some(recover);
        ReactiveEffect::new(stream::poll_fn(move |cx| loop {
            match current.poll_next_unpin(cx) {
                Poll::Ready(Some(Err(e))) => match recover.take() {
                    Some(r) => current = r(e).into_inner(),
                    None => return Poll::Ready(Some(Err(e))),
                },
                other => return other,
            }
        }))
    }

    /// Subscribe to the effect and drive it to completion, collecting
    /// every emitted value.
    ///
    /// Returns `Err` at the first failure; values emitted before the
    /// failure are discarded. Two effects that produce the same values
    /// and terminal state compare equal through their outcomes, which is
    /// the observational equality the law checks rely on.
    pub async fn run(mut self) -> Result<Vec<A>, FlowError> {
        let mut values = Vec::new();
        while let Some(item) = self.stream.next().await {
            values.push(item?);
        }
        Ok(values)
    }
}

impl<A: Send + 'static> From<FlowStream<A>> for ReactiveEffect<A> {
    fn from(stream: FlowStream<A>) -> Self {
        ReactiveEffect { stream }
    }
}

/// An effect is itself a stream handle; polling it is the subscription.
impl<A> Stream for ReactiveEffect<A> {
    type Item = Result<A, FlowError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().stream.poll_next_unpin(cx)
    }
}
