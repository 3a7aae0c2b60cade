//! Selectable flattening strategies for monadic composition.
//!
//! The three strategies share one type signature and differ only in the
//! ordering and concurrency of the nested effects. Which one backs a bind
//! is the central design decision of this layer, so it is an explicit
//! value passed at the call site rather than anything ambient.

use crate::effect::ReactiveEffect;
use crate::either::Either;
use crate::error::FlowError;
use crate::stream::{tail_rec_concat, tail_rec_merge, tail_rec_switch};

/// The flattening discipline backing `flat_map` and `tail_rec_m`.
///
/// Stateless and `Copy`: select one once and reuse it across many calls.
///
/// # Example
///
/// ```rust
/// use millstream::{CompositionStrategy, ReactiveEffect};
///
/// # tokio_test::block_on(async {
/// let effect = CompositionStrategy::Concat.flat_map(
///     ReactiveEffect::pure(21),
///     |x| ReactiveEffect::pure(x * 2),
/// );
/// assert_eq!(effect.run().await, Ok(vec![42]));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionStrategy {
    /// Nested effects run concurrently; outputs interleave as they
    /// arrive, with no ordering guarantee across source elements.
    Merge,
    /// Nested effects run one at a time, strictly in source order.
    Concat,
    /// Only the most recently started nested effect is observed; a new
    /// source element cancels the previous nested effect.
    Switch,
}

impl CompositionStrategy {
    /// Monadic bind under this strategy's flattening discipline.
    ///
    /// Applies `f` to every element `fa` produces and flattens the
    /// resulting nested effects.
    pub fn flat_map<A, B, F>(self, fa: ReactiveEffect<A>, f: F) -> ReactiveEffect<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnMut(A) -> ReactiveEffect<B> + Send + 'static,
    {
        match self {
            CompositionStrategy::Merge => fa.flat_map(f),
            CompositionStrategy::Concat => fa.concat_map(f),
            CompositionStrategy::Switch => fa.switch_map(f),
        }
    }

    /// Stack-safe monadic loop.
    ///
    /// `f(seed)` yields an effect of loop steps: each `Left(a)` continues
    /// the loop with seed `a`, flattened under this same strategy; each
    /// `Right(b)` is emitted as a result. The loop is driven by an
    /// iterative stream machine, so arbitrarily many `Left` iterations
    /// neither grow the call stack nor accumulate per-iteration state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::{CompositionStrategy, Either, ReactiveEffect};
    ///
    /// # tokio_test::block_on(async {
    /// let countdown = CompositionStrategy::Concat.tail_rec_m(3, |n| {
    ///     if n == 0 {
    ///         ReactiveEffect::pure(Either::right("done"))
    ///     } else {
    ///         ReactiveEffect::pure(Either::left(n - 1))
    ///     }
    /// });
    /// assert_eq!(countdown.run().await, Ok(vec!["done"]));
    /// # });
    /// ```
    pub fn tail_rec_m<A, B, F>(self, seed: A, mut f: F) -> ReactiveEffect<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnMut(A) -> ReactiveEffect<Either<A, B>> + Send + 'static,
    {
        let step = move |a: A| f(a).into_inner();
        match self {
            CompositionStrategy::Merge => ReactiveEffect::new(tail_rec_merge(seed, step)),
            CompositionStrategy::Concat => ReactiveEffect::new(tail_rec_concat(seed, step)),
            CompositionStrategy::Switch => ReactiveEffect::new(tail_rec_switch(seed, step)),
        }
    }

    /// The error-aware capability: on upstream failure, continue with
    /// `recover(error)` in place of the failure.
    ///
    /// Recovery is independent of the flattening discipline, so every
    /// strategy exposes the same behavior; see
    /// [`ReactiveEffect::handle_error_with`].
    pub fn handle_error_with<A, F>(self, fa: ReactiveEffect<A>, recover: F) -> ReactiveEffect<A>
    where
        A: Send + 'static,
        F: FnOnce(FlowError) -> ReactiveEffect<A> + Send + 'static,
    {
        fa.handle_error_with(recover)
    }
}
