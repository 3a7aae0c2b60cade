//! Latest-wins flattening.

use std::task::Poll;

use futures::stream::{self, Stream, StreamExt};

use crate::effect::FlowStream;
use crate::error::FlowError;

/// Flattens a stream of streams, observing only the most recently started
/// inner stream.
///
/// Delivery order matches a push engine's: a ready inner stream drains
/// before the next outer element is examined, so synchronous inner values
/// are never lost. Preemption happens the moment the inner stream is idle
/// and a newer one is available; replacing the current inner stream drops
/// it, which is how cancellation propagates in a pull model — a dropped
/// stream is never polled again and its resources are released.
///
/// Completes once the outer stream and the last inner stream have both
/// completed. An error on either channel terminates the output.
pub(crate) fn switch_all<A, S>(outer: S) -> impl Stream<Item = Result<A, FlowError>> + Send
where
    A: Send + 'static,
    S: Stream<Item = Result<FlowStream<A>, FlowError>> + Send + 'static,
{
    let mut outer: Option<_> = Some(Box::pin(outer));
    let mut inner: Option<FlowStream<A>> = None;
    let mut done = false;
    stream::poll_fn(move |cx| {
        if done {
            return Poll::Ready(None);
        }
        loop {
            if let Some(current) = inner.as_mut() {
                match current.poll_next_unpin(cx) {
                    Poll::Ready(Some(Ok(value))) => return Poll::Ready(Some(Ok(value))),
                    Poll::Ready(Some(Err(e))) => {
                        done = true;
                        inner = None;
                        outer = None;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Ready(None) => {
                        inner = None;
                        continue;
                    }
                    Poll::Pending => {}
                }
            }
            let inner_live = inner.is_some();
            let Some(source) = outer.as_mut() else {
                if inner_live {
                    return Poll::Pending;
                }
                done = true;
                return Poll::Ready(None);
            };
            match source.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(next))) => {
                    // dropping the superseded stream is the unsubscribe
                    inner = Some(next);
                }
                Poll::Ready(Some(Err(e))) => {
                    done = true;
                    inner = None;
                    outer = None;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    outer = None;
                    if inner_live {
                        return Poll::Pending;
                    }
                    done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    })
}
