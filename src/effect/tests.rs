//! Tests for the effect wrapper, strategies and the async bridge.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream;

use crate::effect::bridge::apply_backpressure;
use crate::prelude::*;

fn from_values<A: Send + 'static>(values: Vec<A>) -> ReactiveEffect<A> {
    ReactiveEffect::new(stream::iter(values.into_iter().map(Ok)))
}

// Constructor tests

#[tokio::test]
async fn test_pure_emits_one_value_then_completes() {
    let effect = ReactiveEffect::pure(42);
    assert_eq!(effect.run().await, Ok(vec![42]));
}

#[tokio::test]
async fn test_raise_error_fails_without_emitting() {
    let effect = ReactiveEffect::<i32>::raise_error(FlowError::upstream("boom"));
    assert_eq!(effect.run().await, Err(FlowError::upstream("boom")));
}

#[tokio::test]
async fn test_new_and_into_inner_round_trip() {
    let effect = from_values(vec![1, 2, 3]);
    let effect = ReactiveEffect::from(effect.into_inner());
    assert_eq!(effect.run().await, Ok(vec![1, 2, 3]));
}

// Map tests

#[tokio::test]
async fn test_map_transforms_each_element() {
    let effect = from_values(vec![1, 2, 3]).map(|x| x * 10);
    assert_eq!(effect.run().await, Ok(vec![10, 20, 30]));
}

#[tokio::test]
async fn test_map_closure_never_runs_after_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let effect = ReactiveEffect::<i32>::raise_error(FlowError::upstream("boom")).map(move |x| {
        seen.fetch_add(1, Ordering::SeqCst);
        x * 2
    });
    assert_eq!(effect.run().await, Err(FlowError::upstream("boom")));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// Flattening operator tests

#[tokio::test]
async fn test_concat_map_keeps_source_order() {
    let effect = from_values(vec![1, 2]).concat_map(|x| from_values(vec![x * 10, x * 10 + 1]));
    assert_eq!(effect.run().await, Ok(vec![10, 11, 20, 21]));
}

#[tokio::test]
async fn test_flat_map_yields_every_nested_value() {
    let effect = from_values(vec![1, 2]).flat_map(|x| from_values(vec![x * 10, x * 10 + 1]));
    let mut values = effect.run().await.unwrap();
    values.sort_unstable();
    assert_eq!(values, vec![10, 11, 20, 21]);
}

#[tokio::test]
async fn test_switch_map_drains_synchronous_nested_effects_fully() {
    // a ready nested effect drains before the next source element is
    // examined, so nothing is lost when everything is synchronous;
    // preemption of an in-flight nested effect is covered in the
    // integration tests
    let effect = from_values(vec![1, 2]).switch_map(|x| from_values(vec![x * 10, x * 10 + 1]));
    assert_eq!(effect.run().await, Ok(vec![10, 11, 20, 21]));
}

#[tokio::test]
async fn test_flattening_propagates_source_failure() {
    let source = ReactiveEffect::new(stream::iter(vec![
        Ok(1),
        Err(FlowError::upstream("mid-stream")),
    ]));
    let effect = source.concat_map(ReactiveEffect::pure);
    assert_eq!(effect.run().await, Err(FlowError::upstream("mid-stream")));
}

#[tokio::test]
async fn test_flattening_propagates_nested_failure() {
    let effect = from_values(vec![1, 2]).concat_map(|x| {
        if x == 2 {
            ReactiveEffect::raise_error(FlowError::upstream("nested"))
        } else {
            ReactiveEffect::pure(x)
        }
    });
    assert_eq!(effect.run().await, Err(FlowError::upstream("nested")));
}

#[tokio::test]
async fn test_flat_map_propagates_nested_failure() {
    let effect = from_values(vec![1, 2]).flat_map(|x| {
        if x == 2 {
            ReactiveEffect::raise_error(FlowError::upstream("nested"))
        } else {
            ReactiveEffect::pure(x)
        }
    });
    assert_eq!(effect.run().await, Err(FlowError::upstream("nested")));
}

#[tokio::test]
async fn test_switch_map_propagates_nested_failure() {
    let effect = from_values(vec![1, 2]).switch_map(|x| {
        if x == 2 {
            ReactiveEffect::raise_error(FlowError::upstream("nested"))
        } else {
            ReactiveEffect::pure(x)
        }
    });
    assert_eq!(effect.run().await, Err(FlowError::upstream("nested")));
}

#[tokio::test]
async fn test_switch_map_propagates_source_failure() {
    let source = ReactiveEffect::new(stream::iter(vec![
        Ok(1),
        Err(FlowError::upstream("mid-stream")),
    ]));
    let effect = source.switch_map(ReactiveEffect::pure);
    assert_eq!(effect.run().await, Err(FlowError::upstream("mid-stream")));
}

// Error recovery tests

#[tokio::test]
async fn test_handle_error_with_substitutes_recovery_effect() {
    let effect = ReactiveEffect::<i32>::raise_error(FlowError::upstream("boom"))
        .handle_error_with(|e| match e {
            FlowError::Upstream(msg) => ReactiveEffect::pure(msg.len() as i32),
            other => ReactiveEffect::raise_error(other),
        });
    assert_eq!(effect.run().await, Ok(vec![4]));
}

#[tokio::test]
async fn test_handle_error_with_is_noop_on_success() {
    let effect = ReactiveEffect::pure(1).handle_error_with(|_| ReactiveEffect::pure(0));
    assert_eq!(effect.run().await, Ok(vec![1]));
}

#[tokio::test]
async fn test_handle_error_with_recovery_failure_propagates() {
    let effect = ReactiveEffect::<i32>::raise_error(FlowError::upstream("first"))
        .handle_error_with(|_| ReactiveEffect::raise_error(FlowError::upstream("second")));
    assert_eq!(effect.run().await, Err(FlowError::upstream("second")));
}

#[tokio::test]
async fn test_handle_error_with_keeps_values_emitted_before_recovery() {
    let source = ReactiveEffect::new(stream::iter(vec![
        Ok(1),
        Err(FlowError::upstream("late")),
    ]));
    let effect = source.handle_error_with(|_| ReactiveEffect::pure(99));
    assert_eq!(effect.run().await, Ok(vec![1, 99]));
}

// Strategy dispatch tests

#[tokio::test]
async fn test_each_strategy_binds_single_value_effects() {
    for strategy in [
        CompositionStrategy::Merge,
        CompositionStrategy::Concat,
        CompositionStrategy::Switch,
    ] {
        let effect = strategy.flat_map(ReactiveEffect::pure(1), |x| ReactiveEffect::pure(x + 1));
        assert_eq!(effect.run().await, Ok(vec![2]), "strategy {:?}", strategy);
    }
}

#[tokio::test]
async fn test_each_strategy_runs_short_tail_rec_loop() {
    for strategy in [
        CompositionStrategy::Merge,
        CompositionStrategy::Concat,
        CompositionStrategy::Switch,
    ] {
        let effect = strategy.tail_rec_m(3, |n| {
            if n == 0 {
                ReactiveEffect::pure(Either::right("done"))
            } else {
                ReactiveEffect::pure(Either::left(n - 1))
            }
        });
        assert_eq!(effect.run().await, Ok(vec!["done"]), "strategy {:?}", strategy);
    }
}

#[tokio::test]
async fn test_strategy_handle_error_with_matches_effect_method() {
    let effect = CompositionStrategy::Merge.handle_error_with(
        ReactiveEffect::<i32>::raise_error(FlowError::upstream("boom")),
        |_| ReactiveEffect::pure(7),
    );
    assert_eq!(effect.run().await, Ok(vec![7]));
}

// Bridge tests

#[tokio::test]
async fn test_run_async_right_emits_value_then_completes() {
    let effect = run_async(|done| done(Either::right(5)));
    assert_eq!(effect.run().await, Ok(vec![5]));
}

#[tokio::test]
async fn test_run_async_left_fails_without_emitting() {
    let effect: ReactiveEffect<i32> =
        run_async(|done| done(Either::left(FlowError::upstream("boom"))));
    assert_eq!(effect.run().await, Err(FlowError::upstream("boom")));
}

#[tokio::test]
async fn test_run_async_defers_producer_until_first_poll() {
    let started = Arc::new(AtomicUsize::new(0));
    let seen = started.clone();
    let effect = run_async(move |done| {
        seen.fetch_add(1, Ordering::SeqCst);
        done(Either::right(1));
    });
    assert_eq!(started.load(Ordering::SeqCst), 0);
    assert_eq!(effect.run().await, Ok(vec![1]));
    assert_eq!(started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_async_first_invocation_wins() {
    // capture the protocol-violation warning instead of polluting output
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let effect = run_async(|done| {
        done(Either::right(1));
        done(Either::right(2));
        done(Either::left(FlowError::upstream("too late")));
    });
    assert_eq!(effect.run().await, Ok(vec![1]));
}

#[tokio::test]
async fn test_run_async_under_every_backpressure_strategy() {
    for strategy in [
        BackpressureStrategy::Buffer,
        BackpressureStrategy::Drop,
        BackpressureStrategy::Error,
        BackpressureStrategy::Latest,
        BackpressureStrategy::Missing,
    ] {
        let effect = run_async_with(|done| done(Either::right(5)), strategy);
        assert_eq!(effect.run().await, Ok(vec![5]), "strategy {:?}", strategy);
    }
}

#[tokio::test]
async fn test_run_async_completes_from_another_thread() {
    let effect = run_async(|done| {
        std::thread::spawn(move || {
            done(Either::right(9));
        });
    });
    assert_eq!(effect.run().await, Ok(vec![9]));
}

// Backpressure policy matrix

#[test]
fn test_buffer_and_missing_append_when_occupied() {
    for strategy in [BackpressureStrategy::Buffer, BackpressureStrategy::Missing] {
        let mut queue: VecDeque<Result<i32, FlowError>> = VecDeque::from([Ok(1)]);
        apply_backpressure(&mut queue, strategy, Ok(2));
        assert_eq!(queue, VecDeque::from([Ok(1), Ok(2)]), "strategy {:?}", strategy);
    }
}

#[test]
fn test_drop_discards_when_occupied() {
    let mut queue: VecDeque<Result<i32, FlowError>> = VecDeque::from([Ok(1)]);
    apply_backpressure(&mut queue, BackpressureStrategy::Drop, Ok(2));
    assert_eq!(queue, VecDeque::from([Ok(1)]));

    let mut empty: VecDeque<Result<i32, FlowError>> = VecDeque::new();
    apply_backpressure(&mut empty, BackpressureStrategy::Drop, Ok(2));
    assert_eq!(empty, VecDeque::from([Ok(2)]));
}

#[test]
fn test_error_overflows_when_occupied() {
    let mut queue: VecDeque<Result<i32, FlowError>> = VecDeque::from([Ok(1)]);
    apply_backpressure(&mut queue, BackpressureStrategy::Error, Ok(2));
    assert_eq!(queue, VecDeque::from([Err(FlowError::Overflow)]));
}

#[test]
fn test_latest_retains_only_newest() {
    let mut queue: VecDeque<Result<i32, FlowError>> = VecDeque::from([Ok(1), Ok(2)]);
    apply_backpressure(&mut queue, BackpressureStrategy::Latest, Ok(3));
    assert_eq!(queue, VecDeque::from([Ok(3)]));
}

#[test]
fn test_default_backpressure_is_buffer() {
    assert_eq!(BackpressureStrategy::default(), BackpressureStrategy::Buffer);
}
