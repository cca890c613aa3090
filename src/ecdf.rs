//! Empirical cumulative distribution function of a sample
//!
use crate::TestError;

/// Empirical cumulative distribution function
///
/// Is calculated by sorting the list of samples and represents step-like
/// approximation to cdf of underling distribution.
/// The value of ecdf for some `x ∈ [xᵢ, xᵢ₊₁)` is `i/N` where `N` is the total
/// number of samples. The step function is right-continuous: a sample counts
/// towards the proportion as soon as `x` reaches it, so repeated samples form a
/// single jump of height `k/N`.
///
/// One can iterate over the jumps of ecdf and their associated values
/// as below:
/// ```
/// # use step_ks::{Ecdf, TestError};
/// # fn main() -> Result<(), TestError> {
/// let ecdf = Ecdf::new(vec![0.1, 0.0, 0.7, 0.2, 0.7])?;
///
/// for (ecdf_value, s) in ecdf.steps() {
///     assert_eq!(ecdf_value, ecdf.get(s));
/// }
/// # Ok(())}
/// ```
///
#[derive(Debug, Clone)]
pub struct Ecdf<T>
where
    T: PartialOrd + Copy,
{
    samples: Vec<T>,
}

impl<T> Ecdf<T>
where
    T: PartialOrd + Copy,
{
    /// Create a new instance from unordered vector of samples
    ///
    /// # Errors
    /// - [TestError::EmptySample] if there are no samples
    /// - [TestError::ContainsNotSortableValues] if any sample has no place in
    ///   the order (e.g. NaN)
    ///
    pub fn new(samples: Vec<T>) -> Result<Self, TestError> {
        check_sample(&samples)?;
        Ok(Self::from_checked(samples))
    }

    /// Build from samples that already passed [check_sample]
    ///
    pub(crate) fn from_checked(mut samples: Vec<T>) -> Self {
        // Every value is comparable so `partial_cmp` cannot fail
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self { samples }
    }

    /// Get the value of ecdf at `val`
    ///
    /// `val` does not need to be one of the samples.
    ///
    pub fn get(&self, val: T) -> f64 {
        self.count_le(val) as f64 / self.samples.len() as f64
    }

    /// Number of samples smaller or equal to `val`
    pub(crate) fn count_le(&self, val: T) -> usize {
        self.samples.partition_point(|x| *x <= val)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false, an ecdf cannot be built from an empty sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in ascending order
    pub fn sorted_samples(&self) -> &[T] {
        &self.samples
    }

    /// Sorted unique values at which the ecdf jumps
    pub fn support(&self) -> Vec<T> {
        self.steps().map(|(_, x)| x).collect()
    }

    /// Iterate over the jumps of the step function
    ///
    /// Yields `(ecdf_value, x)` once per distinct sample, where `ecdf_value`
    /// already includes all repetitions of `x`. Useful for plotting.
    ///
    pub fn steps(&self) -> impl Iterator<Item = (f64, T)> + '_ {
        let n = self.samples.len() as f64;
        self.samples
            .iter()
            .enumerate()
            .filter(move |(i, x)| self.samples.get(i + 1).map_or(true, |next| next != *x))
            .map(move |(i, x)| ((i + 1) as f64 / n, *x))
    }
}

///
/// Check that a sample can be used to build an [Ecdf]
///
/// Note that e.g. f64 may contain NaNs which are not comparable to other
/// numbers, not even to themselves.
///
pub(crate) fn check_sample<T>(samples: &[T]) -> Result<(), TestError>
where
    T: PartialOrd,
{
    if samples.is_empty() {
        Err(TestError::EmptySample)
    } else if samples.iter().any(|x| x.partial_cmp(x).is_none()) {
        Err(TestError::ContainsNotSortableValues)
    } else {
        Ok(())
    }
}
