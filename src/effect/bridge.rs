//! Bridges callback-style asynchronous computations into effects.
//!
//! A bridged producer is any `FnOnce(Callback<A>)`: a computation that,
//! once started, eventually invokes the continuation it was handed with
//! either a terminal failure or a single successful value. The bridge
//! turns one into a [`ReactiveEffect`] that invokes the producer exactly
//! once, lazily, when the effect is first polled.
//!
//! # Caller contract
//!
//! The continuation is expected to be invoked at most once. The bridge
//! does not rely on producers honoring that: the first invocation wins and
//! later ones are dropped with a warning, never re-delivered and never a
//! panic.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Poll, Waker};

use futures::stream;

use crate::effect::ReactiveEffect;
use crate::either::Either;
use crate::error::FlowError;

/// Policy applied when a value is produced while the consumer has not yet
/// drained the previous emission.
///
/// Chosen once per bridge invocation. With a single-shot producer the
/// queue rarely holds more than one item, but the policy is what a caller
/// composes against when bridged effects are merged or concatenated with
/// demand-sensitive effects downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackpressureStrategy {
    /// Unconsumed values queue without bound.
    #[default]
    Buffer,
    /// Values produced while the consumer is not ready are discarded
    /// silently.
    Drop,
    /// Production while the consumer is not ready terminates the effect
    /// with [`FlowError::Overflow`].
    Error,
    /// Only the most recent unconsumed value is retained; older
    /// unconsumed values are discarded.
    Latest,
    /// No backpressure handling at all. The consumer must already handle
    /// unbounded demand; this is an intentional opt-out, delegated
    /// entirely to whatever runs the effect.
    Missing,
}

/// The continuation a bridged producer invokes with its outcome.
///
/// `Left` fails the effect; `Right` emits the value and completes it.
pub type Callback<A> = Box<dyn Fn(Either<FlowError, A>) + Send + Sync>;

struct BridgeState<A> {
    queue: VecDeque<Result<A, FlowError>>,
    fired: bool,
    complete: bool,
    waker: Option<Waker>,
}

fn lock<A>(state: &Mutex<BridgeState<A>>) -> MutexGuard<'_, BridgeState<A>> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Applies the backpressure policy to a pending emission.
///
/// The queue is "occupied" when the consumer has not drained a previous
/// emission; that is the moment the policy decides what happens to the
/// new one.
pub(crate) fn apply_backpressure<A>(
    queue: &mut VecDeque<Result<A, FlowError>>,
    strategy: BackpressureStrategy,
    item: Result<A, FlowError>,
) {
    match strategy {
        BackpressureStrategy::Buffer | BackpressureStrategy::Missing => queue.push_back(item),
        BackpressureStrategy::Drop => {
            if queue.is_empty() {
                queue.push_back(item);
            }
        }
        BackpressureStrategy::Error => {
            if queue.is_empty() {
                queue.push_back(item);
            } else {
                queue.clear();
                queue.push_back(Err(FlowError::Overflow));
            }
        }
        BackpressureStrategy::Latest => {
            queue.clear();
            queue.push_back(item);
        }
    }
}

fn signal<A>(
    state: &Mutex<BridgeState<A>>,
    strategy: BackpressureStrategy,
    outcome: Either<FlowError, A>,
) {
    let mut st = lock(state);
    if st.fired {
        tracing::warn!(
            violation = %FlowError::ProtocolViolation,
            "dropping extra continuation invocation from bridged producer"
        );
        return;
    }
    st.fired = true;
    match outcome {
        // failures terminate regardless of demand; the policy only
        // governs value emissions
        Either::Left(error) => st.queue.push_back(Err(error)),
        Either::Right(value) => apply_backpressure(&mut st.queue, strategy, Ok(value)),
    }
    st.complete = true;
    if let Some(waker) = st.waker.take() {
        waker.wake();
    }
}

/// Bridge a callback-style producer into an effect under the default
/// [`Buffer`](BackpressureStrategy::Buffer) policy.
///
/// # Example
///
/// ```rust
/// use millstream::{run_async, Either};
///
/// # tokio_test::block_on(async {
/// let effect = run_async(|done| done(Either::right(5)));
/// assert_eq!(effect.run().await, Ok(vec![5]));
/// # });
/// ```
pub fn run_async<A, F>(producer: F) -> ReactiveEffect<A>
where
    A: Send + 'static,
    F: FnOnce(Callback<A>) + Send + 'static,
{
    run_async_with(producer, BackpressureStrategy::default())
}

/// Bridge a callback-style producer into an effect under an explicit
/// backpressure policy.
///
/// The producer is invoked exactly once, on the effect's first poll; on
/// `Right(value)` the effect emits `value` then completes, on
/// `Left(error)` it fails without emitting.
pub fn run_async_with<A, F>(producer: F, strategy: BackpressureStrategy) -> ReactiveEffect<A>
where
    A: Send + 'static,
    F: FnOnce(Callback<A>) + Send + 'static,
{
    let state = Arc::new(Mutex::new(BridgeState::<A> {
        queue: VecDeque::new(),
        fired: false,
        complete: false,
        waker: None,
    }));
    let mut producer = Some(producer);
    ReactiveEffect::new(stream::poll_fn(move |cx| {
        lock(&state).waker = Some(cx.waker().clone());
        if let Some(start) = producer.take() {
            let shared = Arc::clone(&state);
            let callback: Callback<A> = Box::new(move |outcome| signal(&shared, strategy, outcome));
            start(callback);
        }
        let mut st = lock(&state);
        if let Some(item) = st.queue.pop_front() {
            return Poll::Ready(Some(item));
        }
        if st.complete {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }))
}
