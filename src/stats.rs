//! Aggregates over repeated runs.

use std::{mem, ops};

use cast::From;
use num_traits::float;

/// This is an extension of `num_traits::float::Float` that adds safe
/// casting from `usize`.
pub trait Float: float::Float + From<usize, Output = Self> {}

impl Float for f32 {}
impl Float for f64 {}

/// A collection of runtimes measured under the same configuration
///
/// Invariants:
///
/// - The sample contains at least 1 data point
/// - The sample contains no `NaN`s
#[repr(transparent)]
pub struct Sample<A>([A]);

impl<A> Sample<A>
where
    A: Float,
{
    /// Creates a new sample from an existing slice
    ///
    /// # Panics
    ///
    /// Panics if `slice` contains any `NaN` or if `slice` is empty
    #[allow(clippy::new_ret_no_self)]
    pub fn new(slice: &[A]) -> &Sample<A> {
        assert!(!slice.is_empty() && slice.iter().all(|x| !x.is_nan()));

        unsafe { mem::transmute(slice) }
    }

    /// Returns the biggest element in the sample
    pub fn max(&self) -> A {
        self.iter().fold(self[0], |a, &b| a.max(b))
    }

    /// Returns the smallest element in the sample
    pub fn min(&self) -> A {
        self.iter().fold(self[0], |a, &b| a.min(b))
    }

    pub fn sum(&self) -> A {
        self.iter().fold(A::zero(), |a, &b| a + b)
    }

    /// Returns the arithmetic average of the sample
    pub fn mean(&self) -> A {
        let n = self.len();

        self.sum() / A::cast(n)
    }

    /// Returns the sample standard deviation, zero for a single data point
    pub fn std_dev(&self, mean: Option<A>) -> A {
        let n = self.len();
        if n < 2 {
            return A::zero();
        }
        let mean = mean.unwrap_or_else(|| self.mean());
        let sum_sq = self.iter().fold(A::zero(), |acc, &x| {
            let delta = x - mean;
            acc + delta * delta
        });

        (sum_sq / A::cast(n - 1)).sqrt()
    }
}

impl<A> ops::Deref for Sample<A> {
    type Target = [A];

    fn deref(&self) -> &[A] {
        &self.0
    }
}

/// How many times faster the parallel run was than the serial baseline.
pub fn speedup<A: Float>(serial_mean: A, parallel_mean: A) -> A {
    serial_mean / parallel_mean
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use quickcheck::{quickcheck, TestResult};

    #[test]
    fn mean_min_max() {
        let data = [4.0, 2.0, 6.0, 8.0];
        let sample = Sample::new(&data);
        assert_relative_eq!(sample.mean(), 5.0);
        assert_relative_eq!(sample.min(), 2.0);
        assert_relative_eq!(sample.max(), 8.0);
    }

    #[test]
    fn std_dev_of_known_sample() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sample = Sample::new(&data);
        assert_relative_eq!(sample.std_dev(None), 2.138_089_935, epsilon = 1e-9);
        assert_relative_eq!(Sample::new(&[3.0]).std_dev(None), 0.0);
    }

    #[test]
    fn speedup_is_serial_over_parallel() {
        assert_relative_eq!(speedup(800.0, 200.0), 4.0);
        assert_relative_eq!(speedup(100.0, 400.0), 0.25);
    }

    #[test]
    #[should_panic]
    fn empty_sample_panics() {
        let data: [f64; 0] = [];
        Sample::new(&data);
    }

    quickcheck! {
        fn mean_of_constant_sample(value: f64, len: u8) -> TestResult {
            if !value.is_finite() || value.abs() > 1e300 || len == 0 {
                return TestResult::discard();
            }
            let data = vec![value; len as usize];
            let mean = Sample::new(&data).mean();
            TestResult::from_bool((mean - value).abs() <= value.abs() * 1e-12)
        }

        fn equal_means_have_unit_speedup(value: f64) -> TestResult {
            if !value.is_finite() || value == 0.0 {
                return TestResult::discard();
            }
            TestResult::from_bool(speedup(value, value) == 1.0)
        }
    }
}
