//! Trampolined monadic loop machines.
//!
//! `tail_rec_m` must survive arbitrarily many `Left` iterations without
//! growing the call stack, so each strategy gets an iterative machine that
//! keeps its pending work on the heap instead of recursing:
//!
//! - Concat: a stack of suspended levels, drained depth-first so element
//!   `n + 1` of a step is never expanded before element `n`'s expansion
//!   has completed.
//! - Merge: a [`SelectAll`] set, every expansion polled concurrently.
//! - Switch: a preemption chain polled deepest-first, where an element
//!   surfacing at a shallower level discards everything spawned below it.
//!
//! Each `Left(a)` feeds the step function back into the machine; each
//! `Right(b)` is emitted downstream. The first `Err` terminates the loop.

use std::task::{Context, Poll};

use futures::stream::{self, SelectAll, Stream, StreamExt};

use crate::effect::FlowStream;
use crate::either::Either;
use crate::error::FlowError;

/// One suspended level of the concat and switch machines.
///
/// `pending` holds a single item pulled ahead of an expansion so that an
/// exhausted level can be dropped before the expansion is pushed on top
/// of it. That keeps the depth proportional to live levels rather than
/// loop iterations: a step that emits one value and completes never
/// leaves a husk behind.
struct Level<A, B> {
    stream: Option<FlowStream<Either<A, B>>>,
    pending: Option<Result<Either<A, B>, FlowError>>,
}

impl<A, B> Level<A, B> {
    fn new(stream: FlowStream<Either<A, B>>) -> Self {
        Level {
            stream: Some(stream),
            pending: None,
        }
    }

    /// Next item for this level: the pulled-ahead one first, then the
    /// live stream. `Ready(None)` means the level is exhausted.
    fn next_item(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<Either<A, B>, FlowError>>> {
        if let Some(item) = self.pending.take() {
            return Poll::Ready(Some(item));
        }
        let Some(live) = self.stream.as_mut() else {
            return Poll::Ready(None);
        };
        match live.poll_next_unpin(cx) {
            Poll::Ready(Some(item)) => Poll::Ready(Some(item)),
            Poll::Ready(None) => {
                self.stream = None;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    /// Pull one item ahead so exhaustion can be detected without losing
    /// anything.
    fn pull_ahead(&mut self, cx: &mut Context<'_>) {
        if self.pending.is_some() {
            return;
        }
        if let Some(live) = self.stream.as_mut() {
            match live.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => self.pending = Some(item),
                Poll::Ready(None) => self.stream = None,
                Poll::Pending => {}
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.stream.is_none() && self.pending.is_none()
    }
}

/// Sequential loop: each `Left` expansion runs to completion before the
/// next element of its parent level is taken.
pub(crate) fn tail_rec_concat<A, B, F>(
    seed: A,
    mut f: F,
) -> impl Stream<Item = Result<B, FlowError>> + Send
where
    A: Send + 'static,
    B: Send + 'static,
    F: FnMut(A) -> FlowStream<Either<A, B>> + Send + 'static,
{
    let mut stack = vec![Level::new(f(seed))];
    let mut done = false;
    stream::poll_fn(move |cx| {
        if done {
            return Poll::Ready(None);
        }
        loop {
            let Some(top) = stack.last_mut() else {
                done = true;
                return Poll::Ready(None);
            };
            match top.next_item(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    stack.pop();
                }
                Poll::Ready(Some(Err(e))) => {
                    done = true;
                    stack.clear();
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(Some(Ok(Either::Right(b)))) => return Poll::Ready(Some(Ok(b))),
                Poll::Ready(Some(Ok(Either::Left(a)))) => {
                    top.pull_ahead(cx);
                    if top.is_exhausted() {
                        stack.pop();
                    }
                    let expansion = f(a);
                    stack.push(Level::new(expansion));
                }
            }
        }
    })
}

/// Concurrent loop: every `Left` expansion joins the active set and their
/// outputs interleave as they arrive.
pub(crate) fn tail_rec_merge<A, B, F>(
    seed: A,
    mut f: F,
) -> impl Stream<Item = Result<B, FlowError>> + Send
where
    A: Send + 'static,
    B: Send + 'static,
    F: FnMut(A) -> FlowStream<Either<A, B>> + Send + 'static,
{
    let mut active: SelectAll<FlowStream<Either<A, B>>> = SelectAll::new();
    active.push(f(seed));
    let mut done = false;
    stream::poll_fn(move |cx| {
        if done {
            return Poll::Ready(None);
        }
        loop {
            match active.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(Either::Left(a)))) => {
                    let expansion = f(a);
                    active.push(expansion);
                }
                Poll::Ready(Some(Ok(Either::Right(b)))) => return Poll::Ready(Some(Ok(b))),
                Poll::Ready(Some(Err(e))) => {
                    done = true;
                    active.clear();
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    })
}

/// Latest-wins loop.
///
/// `chain[0]` is the oldest still-open level; `chain[i + 1]` was spawned
/// by the most recent element of `chain[i]`. The deepest level is polled
/// first, mirroring push delivery: a synchronous expansion drains before
/// its ancestors are examined. When a shallower level does surface an
/// element, everything spawned below it is truncated away, and truncation
/// drops the abandoned streams, which cancels them.
pub(crate) fn tail_rec_switch<A, B, F>(
    seed: A,
    mut f: F,
) -> impl Stream<Item = Result<B, FlowError>> + Send
where
    A: Send + 'static,
    B: Send + 'static,
    F: FnMut(A) -> FlowStream<Either<A, B>> + Send + 'static,
{
    let mut chain = vec![Level::new(f(seed))];
    let mut done = false;
    stream::poll_fn(move |cx| {
        if done {
            return Poll::Ready(None);
        }
        'scan: loop {
            let mut idx = chain.len();
            while idx > 0 {
                let i = idx - 1;
                match chain[i].next_item(cx) {
                    Poll::Ready(Some(Ok(Either::Left(a)))) => {
                        chain.truncate(i + 1);
                        chain[i].pull_ahead(cx);
                        if chain[i].is_exhausted() {
                            chain.remove(i);
                        }
                        let expansion = f(a);
                        chain.push(Level::new(expansion));
                        continue 'scan;
                    }
                    Poll::Ready(Some(Ok(Either::Right(b)))) => {
                        chain.truncate(i + 1);
                        return Poll::Ready(Some(Ok(b)));
                    }
                    Poll::Ready(Some(Err(e))) => {
                        done = true;
                        chain.clear();
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Ready(None) => {
                        chain.remove(i);
                        idx -= 1;
                    }
                    Poll::Pending => {
                        idx -= 1;
                    }
                }
            }
            if chain.is_empty() {
                done = true;
                return Poll::Ready(None);
            }
            // every remaining level reported Pending this scan
            return Poll::Pending;
        }
    })
}
