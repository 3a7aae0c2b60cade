//! Stream adapters the effect layer composes from.
//!
//! The `futures` engine supplies merge (`try_flatten_unordered`) and concat
//! (`try_flatten`) flattening natively but has no switch operator and no
//! terminal-error guarantee, so this module carries the small pull-adapters
//! the effect layer needs. Everything here is an iterative
//! `stream::poll_fn` state machine: no hand-rolled `Pin` projection, and no
//! recursion that could grow the call stack.

mod switch;
mod tail_rec;

pub(crate) use switch::switch_all;
pub(crate) use tail_rec::{tail_rec_concat, tail_rec_merge, tail_rec_switch};

use std::task::Poll;

use futures::stream::{self, Stream, StreamExt};

use crate::error::FlowError;

/// Ends a stream at its first `Err` item.
///
/// An effect's stream never yields another item after a failure. The raw
/// `futures` try-combinators forward errors but keep polling the remaining
/// inner streams, so every flattened stream is wrapped in this adapter to
/// restore the invariant.
pub(crate) fn terminate_on_error<A, S>(upstream: S) -> impl Stream<Item = Result<A, FlowError>> + Send
where
    A: Send + 'static,
    S: Stream<Item = Result<A, FlowError>> + Send + 'static,
{
    let mut upstream = Box::pin(upstream);
    let mut done = false;
    stream::poll_fn(move |cx| {
        if done {
            return Poll::Ready(None);
        }
        match upstream.poll_next_unpin(cx) {
            Poll::Ready(Some(Err(e))) => {
                done = true;
                Poll::Ready(Some(Err(e)))
            }
            other => other,
        }
    })
}
