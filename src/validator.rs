//! Reusable field validators.
//!
//! A [Validator] wraps one pure check bound to a single value type. The building
//! blocks are [Exact], [Min], [Max] and [Range]; arbitrary checks can be wrapped
//! with [Validator::from_fn]. Validators are immutable and can be cloned and shared
//! across threads freely.
//!
//! ```
//! use bitrecord::errors::ValidationError;
//! use bitrecord::validator::{Range, Validate};
//!
//! let percent = Range::new(0u8, 100);
//! assert_eq!(percent.validate(&42), Ok(()));
//! assert_eq!(percent.validate(&101), Err(ValidationError::ValueAboveMaximum));
//! ```

use std::{fmt, sync::Arc};

use num_traits::Num;

use crate::errors::ValidationError;

/// A check on values of type `T`.
pub trait Validate<T>: fmt::Debug + Send + Sync {
    /// Returns `Ok(())` if `value` is accepted, or the configured error.
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

/// Numeric types accepted by [Min], [Max] and [Range].
///
/// Non-numeric types (e.g. `bool`) do not implement this trait, so building an
/// ordering validator over them fails to compile.
pub trait Bound: Num + PartialOrd + Copy + fmt::Debug + Send + Sync + 'static {}

impl<T> Bound for T where T: Num + PartialOrd + Copy + fmt::Debug + Send + Sync + 'static {}

/// Fails with `error` iff the value differs from `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct Exact<T> {
    pub expected: T,
    pub error: ValidationError,
}

impl<T> Exact<T> {
    pub fn new(expected: T) -> Self {
        Exact {
            expected,
            error: ValidationError::InvalidFieldValue,
        }
    }

    pub fn with_error(mut self, error: ValidationError) -> Self {
        self.error = error;
        self
    }
}

impl<T> Validate<T> for Exact<T>
where
    T: PartialEq + fmt::Debug + Send + Sync,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        if *value != self.expected {
            return Err(self.error.clone());
        }

        Ok(())
    }
}

/// Fails with `error` iff the value is below `bound`.
#[derive(Debug, Clone, PartialEq)]
pub struct Min<T> {
    pub bound: T,
    pub error: ValidationError,
}

impl<T: Bound> Min<T> {
    pub fn new(bound: T) -> Self {
        Min {
            bound,
            error: ValidationError::ValueBelowMinimum,
        }
    }

    pub fn with_error(mut self, error: ValidationError) -> Self {
        self.error = error;
        self
    }
}

impl<T: Bound> Validate<T> for Min<T> {
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        if *value < self.bound {
            return Err(self.error.clone());
        }

        Ok(())
    }
}

/// Fails with `error` iff the value is above `bound`.
#[derive(Debug, Clone, PartialEq)]
pub struct Max<T> {
    pub bound: T,
    pub error: ValidationError,
}

impl<T: Bound> Max<T> {
    pub fn new(bound: T) -> Self {
        Max {
            bound,
            error: ValidationError::ValueAboveMaximum,
        }
    }

    pub fn with_error(mut self, error: ValidationError) -> Self {
        self.error = error;
        self
    }
}

impl<T: Bound> Validate<T> for Max<T> {
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        if *value > self.bound {
            return Err(self.error.clone());
        }

        Ok(())
    }
}

/// Inclusive range check.
///
/// The minimum is always checked first: a value below `min` yields `min_error`
/// without looking at `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
    pub min_error: ValidationError,
    pub max_error: ValidationError,
}

impl<T: Bound> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Range {
            min,
            max,
            min_error: ValidationError::ValueBelowMinimum,
            max_error: ValidationError::ValueAboveMaximum,
        }
    }

    pub fn with_errors(mut self, min_error: ValidationError, max_error: ValidationError) -> Self {
        self.min_error = min_error;
        self.max_error = max_error;
        self
    }
}

impl<T: Bound> Validate<T> for Range<T> {
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        if *value < self.min {
            return Err(self.min_error.clone());
        }

        if *value > self.max {
            return Err(self.max_error.clone());
        }

        Ok(())
    }
}

struct FnValidator<F>(F);

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnValidator")
    }
}

impl<T, F> Validate<T> for FnValidator<F>
where
    F: Fn(&T) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        (self.0)(value)
    }
}

/// Shared handle to a check on values of type `T`.
pub struct Validator<T> {
    inner: Arc<dyn Validate<T>>,
}

impl<T> Validator<T> {
    pub fn new<V>(validator: V) -> Self
    where
        V: Validate<T> + 'static,
    {
        Validator {
            inner: Arc::new(validator),
        }
    }

    /// Wraps a pure closure.
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&T) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self::new(FnValidator(check))
    }

    pub fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self.inner.validate(value)
    }
}

impl<T> Validator<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    pub fn exact(expected: T) -> Self {
        Self::new(Exact::new(expected))
    }
}

impl<T: Bound> Validator<T> {
    pub fn min(bound: T) -> Self {
        Self::new(Min::new(bound))
    }

    pub fn max(bound: T) -> Self {
        Self::new(Max::new(bound))
    }

    pub fn range(min: T, max: T) -> Self {
        Self::new(Range::new(min, max))
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Validator {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.inner).finish()
    }
}

impl<T> From<Exact<T>> for Validator<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn from(value: Exact<T>) -> Self {
        Validator::new(value)
    }
}

impl<T: Bound> From<Min<T>> for Validator<T> {
    fn from(value: Min<T>) -> Self {
        Validator::new(value)
    }
}

impl<T: Bound> From<Max<T>> for Validator<T> {
    fn from(value: Max<T>) -> Self {
        Validator::new(value)
    }
}

impl<T: Bound> From<Range<T>> for Validator<T> {
    fn from(value: Range<T>) -> Self {
        Validator::new(value)
    }
}
