//! Draw surrogate pairs of samples under the null hypothesis
//!
//! Both samples are pooled together, which makes them indistinguishable,
//! and new pairs are drawn from the pool.
//!
use crate::TestError;
use rand::seq::index;
use rand::Rng;

/// Sizes of the two resampled samples
///
/// With `bootstrap_size` set, both samples get that size. Otherwise the sizes
/// of the original samples are kept.
///
pub(crate) fn resample_sizes(
    n1: usize,
    n2: usize,
    bootstrap_size: Option<usize>,
) -> Result<(usize, usize), TestError> {
    match bootstrap_size {
        Some(0) => Err(TestError::ZeroBootstrapSize),
        Some(m) => Ok((m, m)),
        None => Ok((n1, n2)),
    }
}

/// Check that a pool of `available` values can provide the draws
///
pub(crate) fn check_pool(
    sizes: (usize, usize),
    available: usize,
    replacement: bool,
) -> Result<(), TestError> {
    let requested = sizes.0 + sizes.1;
    if available == 0 {
        Err(TestError::EmptySample)
    } else if !replacement && requested > available {
        Err(TestError::BootstrapSizeExceedsPool {
            requested,
            available,
        })
    } else {
        Ok(())
    }
}

///
/// Draw two samples of the given sizes from a pool
///
/// Without replacement the pool is shuffled and cut into two disjoint pieces
/// (leftover values are dropped if the sizes do not cover the whole pool).
/// With replacement every value is an independent uniform pick.
///
/// The pool must already satisfy [check_pool].
///
pub(crate) fn draw_pair<T, R>(
    rng: &mut R,
    pool: &[T],
    sizes: (usize, usize),
    replacement: bool,
) -> (Vec<T>, Vec<T>)
where
    T: Copy,
    R: Rng + ?Sized,
{
    let (n1, n2) = sizes;
    if replacement {
        let mut pick = |n: usize| -> Vec<T> {
            (0..n).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
        };
        let first = pick(n1);
        let second = pick(n2);
        (first, second)
    } else {
        let picked = index::sample(rng, pool.len(), n1 + n2);
        let mut first = Vec::with_capacity(n1);
        let mut second = Vec::with_capacity(n2);
        for (k, i) in picked.iter().enumerate() {
            if k < n1 {
                first.push(pool[i]);
            } else {
                second.push(pool[i]);
            }
        }
        (first, second)
    }
}

///
/// Resample a pair of samples from their pooled values
///
/// Returns a new pair with sizes matching `sample1` and `sample2`, or both
/// of size `bootstrap_size` if it is provided.
///
/// ```
/// # use step_ks::{resample, TestError};
/// # use rand::SeedableRng;
/// # fn main() -> Result<(), TestError> {
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let (a, b) = resample(&mut rng, &[1, 2, 3], &[4, 5], None, false)?;
/// assert_eq!((a.len(), b.len()), (3, 2));
/// # Ok(())}
/// ```
///
/// # Errors
/// - [TestError::EmptySample] if either sample is empty
/// - [TestError::ZeroBootstrapSize] if `bootstrap_size` is `Some(0)`
/// - [TestError::BootstrapSizeExceedsPool] if sampling without replacement
///   needs more values than the pool holds
///
pub fn resample<T, R>(
    rng: &mut R,
    sample1: &[T],
    sample2: &[T],
    bootstrap_size: Option<usize>,
    replacement: bool,
) -> Result<(Vec<T>, Vec<T>), TestError>
where
    T: Copy,
    R: Rng + ?Sized,
{
    if sample1.is_empty() || sample2.is_empty() {
        return Err(TestError::EmptySample);
    }
    let sizes = resample_sizes(sample1.len(), sample2.len(), bootstrap_size)?;
    let pool = [sample1, sample2].concat();
    check_pool(sizes, pool.len(), replacement)?;

    Ok(draw_pair(rng, &pool, sizes, replacement))
}
