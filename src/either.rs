//! A semantically neutral sum type for representing one of two possible values.
//!
//! `Either<L, R>` carries no inherent success/failure semantics; which side
//! means what is decided by the boundary using it. This crate uses it in two
//! places:
//!
//! - the async bridge hands bridged callbacks an `Either<FlowError, A>`:
//!   `Left` fails the effect, `Right` emits the value and completes;
//! - [`tail_rec_m`](crate::CompositionStrategy::tail_rec_m) steps over
//!   `Either<A, B>`: `Left` continues the loop with a new seed, `Right`
//!   finishes it with a result.
//!
//! By convention `Either` is right-biased: [`map`](Either::map) operates on
//! the `Right` variant.
//!
//! # Example
//!
//! ```rust
//! use millstream::Either;
//!
//! let step: Either<i32, &str> = Either::left(1);
//! let description = step.fold(
//!     |seed| format!("continue with {}", seed),
//!     |done| format!("finished with {}", done),
//! );
//! assert_eq!(description, "continue with 1");
//! ```

/// A value that is either `Left(L)` or `Right(R)`.
///
/// See the [module docs](self) for where this crate uses it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Either<L, R> {
    /// The left variant.
    Left(L),
    /// The right variant.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Create a Left value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::Either;
    ///
    /// let e: Either<i32, &str> = Either::left(42);
    /// assert!(e.is_left());
    /// ```
    #[inline]
    pub fn left(value: L) -> Self {
        Either::Left(value)
    }

    /// Create a Right value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::Either;
    ///
    /// let e: Either<i32, &str> = Either::right("done");
    /// assert!(e.is_right());
    /// ```
    #[inline]
    pub fn right(value: R) -> Self {
        Either::Right(value)
    }

    /// Returns `true` if this is a Left value.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    /// Returns `true` if this is a Right value.
    #[inline]
    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }

    /// Extract the Left value, if present.
    #[inline]
    pub fn into_left(self) -> Option<L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// Extract the Right value, if present.
    #[inline]
    pub fn into_right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(r) => Some(r),
        }
    }

    /// Transform the Left value, leaving Right untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::Either;
    ///
    /// let e: Either<i32, &str> = Either::left(21);
    /// assert_eq!(e.map_left(|x| x * 2), Either::left(42));
    /// ```
    #[inline]
    pub fn map_left<L2, F>(self, f: F) -> Either<L2, R>
    where
        F: FnOnce(L) -> L2,
    {
        match self {
            Either::Left(l) => Either::Left(f(l)),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Transform the Right value, leaving Left untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::Either;
    ///
    /// let e: Either<&str, i32> = Either::right(21);
    /// assert_eq!(e.map(|x| x * 2), Either::right(42));
    /// ```
    #[inline]
    pub fn map<R2, F>(self, f: F) -> Either<L, R2>
    where
        F: FnOnce(R) -> R2,
    {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(f(r)),
        }
    }

    /// Collapse both variants into a single value: one handler per side,
    /// applied to whichever is present.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millstream::Either;
    ///
    /// let e: Either<i32, &str> = Either::right("done");
    /// let n = e.fold(|seed| seed, |s| s.len() as i32);
    /// assert_eq!(n, 4);
    /// ```
    #[inline]
    pub fn fold<T, F, G>(self, left_fn: F, right_fn: G) -> T
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> T,
    {
        match self {
            Either::Left(l) => left_fn(l),
            Either::Right(r) => right_fn(r),
        }
    }

    /// Convert to a `Result`, treating Right as `Ok`.
    #[inline]
    pub fn into_result(self) -> Result<R, L> {
        match self {
            Either::Left(l) => Err(l),
            Either::Right(r) => Ok(r),
        }
    }

    /// Convert from a `Result`, treating `Ok` as Right.
    #[inline]
    pub fn from_result(result: Result<R, L>) -> Self {
        match result {
            Ok(r) => Either::Right(r),
            Err(l) => Either::Left(l),
        }
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        Either::from_result(result)
    }
}
