//! # Millstream
//!
//! > *Effects flow; the mill decides how they turn.*
//!
//! A Rust library for reactive effect composition over push-based streams.
//!
//! ## Philosophy
//!
//! **Millstream** wraps a stream handle in a monadic effect type and makes
//! the flattening discipline an explicit, selectable value:
//! - **Merge** = concurrent, interleaved as results arrive
//! - **Concat** = strictly sequential, in source order
//! - **Switch** = latest wins, superseded work is cancelled
//!
//! On top of the wrapper it bridges single-shot callback computations into
//! effects under a configurable backpressure policy, and provides
//! stack-safe monadic recursion (`tail_rec_m`) driven by iterative stream
//! machines.
//!
//! ## Quick Example
//!
//! ```rust
//! use millstream::{CompositionStrategy, ReactiveEffect};
//!
//! # tokio_test::block_on(async {
//! // Sequence two effects under the strictly-sequential discipline
//! let effect = CompositionStrategy::Concat.flat_map(
//!     ReactiveEffect::pure(20),
//!     |x| ReactiveEffect::pure(x + 2),
//! );
//! assert_eq!(effect.run().await, Ok(vec![22]));
//! # });
//! ```
//!
//! Bridging a callback-based computation:
//!
//! ```rust
//! use millstream::{run_async, Either};
//!
//! # tokio_test::block_on(async {
//! let effect = run_async(|done| {
//!     // hand the outcome to the continuation whenever it is ready
//!     done(Either::right(5));
//! });
//! assert_eq!(effect.run().await, Ok(vec![5]));
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod effect;
pub mod either;
pub mod error;
mod stream;

// Re-exports
pub use effect::{
    run_async, run_async_with, BackpressureStrategy, Callback, CompositionStrategy, FlowStream,
    ReactiveEffect,
};
pub use either::Either;
pub use error::FlowError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::effect::{
        run_async, run_async_with, BackpressureStrategy, Callback, CompositionStrategy,
        FlowStream, ReactiveEffect,
    };
    pub use crate::either::Either;
    pub use crate::error::FlowError;
}
