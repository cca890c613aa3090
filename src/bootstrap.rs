//! Bootstrap estimate of the p-value
//!
//! The distribution of the KS statistic under the null hypothesis is built by
//! repeatedly resampling the pooled data (see [crate::resample]) and computing
//! the statistic for each surrogate pair. The p-value is then the fraction of
//! the surrogate statistics that are at least as large as the observed one.
//!
//! Each iteration gets its own [StdRng] seeded from the caller's generator
//! before any work is dispatched. The iterations thus share no state and the
//! result depends only on the caller's seed. They run on the calling thread
//! unless [BootstrapConfig::parallel] is set.
//!
use crate::ecdf::{check_sample, Ecdf};
use crate::ks_tests::{ks_statistic, Alternative};
use crate::resampling::{check_pool, draw_pair, resample_sizes};
use crate::TestError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default number of bootstrap iterations
pub const DEFAULT_BOOTSTRAP_LOOPS: usize = 1000;

/// Bootstrap configuration
///
/// Can be deserialised with any missing field taking its default value:
/// ```
/// # use step_ks::BootstrapConfig;
/// let config: BootstrapConfig = serde_json::from_str(r#"{"nloop": 200}"#).unwrap();
/// assert_eq!(config.nloop, 200);
/// assert!(!config.replacement);
/// ```
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Number of bootstrap iterations (default: 1000)
    pub nloop: usize,
    /// Draw resampled values with replacement (default: false)
    pub replacement: bool,
    /// Size of both resampled samples. Original sizes are kept if `None`
    pub bootstrap_size: Option<usize>,
    /// Spread the iterations over the rayon thread pool (default: false)
    pub parallel: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            nloop: DEFAULT_BOOTSTRAP_LOOPS,
            replacement: false,
            bootstrap_size: None,
            parallel: false,
        }
    }
}

/// Values of the statistic obtained from resampled pairs
///
/// The order of the values carries no meaning.
///
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapDistribution {
    stats: Vec<f64>,
    alternative: Alternative,
}

impl BootstrapDistribution {
    /// Wrap precomputed statistics, e.g. to reuse a distribution
    ///
    /// # Errors
    /// [TestError::ZeroLoops] if `stats` is empty
    ///
    pub fn new(stats: Vec<f64>, alternative: Alternative) -> Result<Self, TestError> {
        if stats.is_empty() {
            return Err(TestError::ZeroLoops);
        }
        Ok(Self { stats, alternative })
    }

    /// Statistics of the individual iterations
    pub fn stats(&self) -> &[f64] {
        &self.stats
    }

    /// Number of iterations
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Always false for a distribution built by this crate
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Alternative the statistics were computed for
    pub fn alternative(&self) -> Alternative {
        self.alternative
    }

    /// True if every iteration produced the same statistic
    ///
    /// Happens e.g. when all pooled values are equal. A p-value from such a
    /// distribution is either 0 or 1 and says little.
    ///
    pub fn is_degenerate(&self) -> bool {
        self.stats.windows(2).all(|w| w[0] == w[1])
    }

    /// Fraction of statistics `>= reference_stat`
    ///
    /// # Errors
    /// [TestError::InvalidReferenceStatistic] if `reference_stat` is NaN
    ///
    pub fn p_value(&self, reference_stat: f64) -> Result<PValue, TestError> {
        p_value(self, reference_stat, self.alternative)
    }
}

/// Bootstrap estimate of the p-value
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PValue {
    value: f64,
    exceedances: usize,
    nloop: usize,
}

impl PValue {
    /// Get the p-value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of bootstrap statistics at least as extreme as the reference
    pub fn exceedances(&self) -> usize {
        self.exceedances
    }

    /// Number of bootstrap iterations
    pub fn nloop(&self) -> usize {
        self.nloop
    }
}

///
/// Build the distribution of the statistic under the null hypothesis
///
/// Performs `config.nloop` iterations. Each resamples a pair from the pooled
/// `sample1` and `sample2` and computes its statistic for `alternative`.
///
/// # Errors
/// - [TestError::ZeroLoops] if `config.nloop` is 0
/// - [TestError::EmptySample], [TestError::ContainsNotSortableValues] for
///   invalid samples
/// - [TestError::ZeroBootstrapSize], [TestError::BootstrapSizeExceedsPool] for
///   a bootstrap size that cannot be drawn
///
pub fn bootstrap_distribution<T, R>(
    rng: &mut R,
    sample1: &[T],
    sample2: &[T],
    alternative: Alternative,
    config: &BootstrapConfig,
) -> Result<BootstrapDistribution, TestError>
where
    T: PartialOrd + Copy + Send + Sync,
    R: Rng + ?Sized,
{
    if config.nloop == 0 {
        return Err(TestError::ZeroLoops);
    }
    check_sample(sample1)?;
    check_sample(sample2)?;

    let sizes = resample_sizes(sample1.len(), sample2.len(), config.bootstrap_size)?;
    let pool = [sample1, sample2].concat();
    check_pool(sizes, pool.len(), config.replacement)?;

    tracing::debug!(
        nloop = config.nloop,
        parallel = config.parallel,
        replacement = config.replacement,
        size1 = sizes.0,
        size2 = sizes.1,
        "building bootstrap distribution"
    );

    let seeds: Vec<u64> = (0..config.nloop).map(|_| rng.gen()).collect();

    let iteration = |seed: u64| -> f64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (d1, d2) = draw_pair(&mut rng, &pool, sizes, config.replacement);
        let ecdf1 = Ecdf::from_checked(d1);
        let ecdf2 = Ecdf::from_checked(d2);
        ks_statistic(&ecdf1, &ecdf2, alternative).stat()
    };

    let stats: Vec<f64> = if config.parallel {
        seeds.into_par_iter().map(iteration).collect()
    } else {
        seeds.into_iter().map(iteration).collect()
    };

    BootstrapDistribution::new(stats, alternative)
}

///
/// Estimate the p-value of `reference_stat` from a bootstrap distribution
///
/// Counts the statistics greater or equal to `reference_stat`. Since the KS
/// statistic is non-negative, only the upper tail is of interest, for the
/// two-sided alternative as well.
///
/// # Errors
/// - [TestError::ZeroLoops] if the distribution is empty
/// - [TestError::InvalidReferenceStatistic] if `reference_stat` is NaN
/// - [TestError::AlternativeMismatch] if the distribution was built for a
///   different alternative
///
pub fn p_value(
    distribution: &BootstrapDistribution,
    reference_stat: f64,
    alternative: Alternative,
) -> Result<PValue, TestError> {
    if distribution.is_empty() {
        return Err(TestError::ZeroLoops);
    }
    if reference_stat.is_nan() {
        return Err(TestError::InvalidReferenceStatistic(reference_stat));
    }
    if distribution.alternative != alternative {
        return Err(TestError::AlternativeMismatch {
            distribution: distribution.alternative,
            requested: alternative,
        });
    }

    let nloop = distribution.len();
    let exceedances = distribution
        .stats
        .iter()
        .filter(|s| **s >= reference_stat)
        .count();

    Ok(PValue {
        value: exceedances as f64 / nloop as f64,
        exceedances,
        nloop,
    })
}

///
/// Bootstrap p-value of an observed statistic
///
/// Combines [bootstrap_distribution] and [p_value].
///
/// ```
/// # use step_ks::*;
/// # use rand::SeedableRng;
/// # fn main() -> Result<(), TestError> {
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let s1 = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let s2 = [1.5, 2.5, 3.5, 4.5];
///
/// let stat = raw_ks_test(&s1, &s2, Alternative::TwoSided)?.stat();
/// let config = BootstrapConfig { nloop: 200, ..Default::default() };
/// let p = bootstrap_pvalue(&mut rng, &s1, &s2, stat, Alternative::TwoSided, &config)?;
/// assert!(p.value() > 0.05);
/// # Ok(())}
/// ```
///
pub fn bootstrap_pvalue<T, R>(
    rng: &mut R,
    sample1: &[T],
    sample2: &[T],
    reference_stat: f64,
    alternative: Alternative,
    config: &BootstrapConfig,
) -> Result<PValue, TestError>
where
    T: PartialOrd + Copy + Send + Sync,
    R: Rng + ?Sized,
{
    if reference_stat.is_nan() {
        return Err(TestError::InvalidReferenceStatistic(reference_stat));
    }
    let distribution = bootstrap_distribution(rng, sample1, sample2, alternative, config)?;
    let p = p_value(&distribution, reference_stat, alternative)?;
    tracing::debug!(p_value = p.value, exceedances = p.exceedances, "bootstrap p-value");
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(nloop: usize) -> BootstrapConfig {
        BootstrapConfig {
            nloop,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = BootstrapConfig::default();
        assert_eq!(config.nloop, DEFAULT_BOOTSTRAP_LOOPS);
        assert!(!config.replacement);
        assert_eq!(config.bootstrap_size, None);
        assert!(!config.parallel);
    }

    #[test]
    fn test_config_serde() {
        let config: BootstrapConfig =
            serde_json::from_str(r#"{"replacement": true, "bootstrap_size": 10}"#).unwrap();
        assert_eq!(config.nloop, DEFAULT_BOOTSTRAP_LOOPS);
        assert!(config.replacement);
        assert_eq!(config.bootstrap_size, Some(10));

        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(config, serde_json::from_str(&text).unwrap());
    }

    #[test]
    fn test_distribution_length() {
        let mut rng = StdRng::seed_from_u64(12);
        let s1 = [0.1, 0.4, 0.2, 0.9, 0.5];
        let s2 = [0.3, 0.35, 0.8];

        for nloop in [1, 17, 250] {
            let dist =
                bootstrap_distribution(&mut rng, &s1, &s2, Alternative::TwoSided, &config(nloop))
                    .unwrap();
            assert_eq!(dist.len(), nloop);
            assert!(dist.stats().iter().all(|s| (0.0..=1.0).contains(s)));
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let s1 = [1, 5, 3, 8, 2, 9, 4];
        let s2 = [7, 6, 10, 11, 3];

        for replacement in [false, true] {
            let parallel = BootstrapConfig {
                nloop: 300,
                replacement,
                parallel: true,
                ..Default::default()
            };
            let serial = BootstrapConfig {
                parallel: false,
                ..parallel.clone()
            };

            let a = bootstrap_distribution(
                &mut StdRng::seed_from_u64(3),
                &s1,
                &s2,
                Alternative::OneLessThanTwo,
                &parallel,
            )
            .unwrap();
            let b = bootstrap_distribution(
                &mut StdRng::seed_from_u64(3),
                &s1,
                &s2,
                Alternative::OneLessThanTwo,
                &serial,
            )
            .unwrap();

            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_p_value_counts() {
        let dist =
            BootstrapDistribution::new(vec![0.1, 0.2, 0.2, 0.3, 0.5], Alternative::TwoSided)
                .unwrap();

        let p = dist.p_value(0.2).unwrap();
        assert_eq!(p.exceedances(), 4);
        assert_eq!(p.nloop(), 5);
        approx::assert_relative_eq!(p.value(), 0.8);

        assert_eq!(dist.p_value(0.0).unwrap().value(), 1.0);
        assert_eq!(dist.p_value(0.6).unwrap().value(), 0.0);
    }

    #[test]
    fn test_p_value_monotonic() {
        let mut rng = StdRng::seed_from_u64(8);
        let s1 = [0.3, 1.2, 0.7, 2.5, 1.1, 0.2];
        let s2 = [1.9, 2.2, 0.8, 3.1];
        let dist =
            bootstrap_distribution(&mut rng, &s1, &s2, Alternative::TwoSided, &config(400))
                .unwrap();

        let mut last = 1.0;
        for i in 0..=20 {
            let p = dist.p_value(i as f64 * 0.05).unwrap().value();
            assert!((0.0..=1.0).contains(&p));
            assert!(p <= last);
            last = p;
        }
    }

    #[test]
    fn test_p_value_errors() {
        let dist = BootstrapDistribution::new(vec![0.1, 0.2], Alternative::TwoSided).unwrap();

        assert!(matches!(
            dist.p_value(f64::NAN),
            Err(TestError::InvalidReferenceStatistic(_))
        ));
        assert!(matches!(
            p_value(&dist, 0.1, Alternative::OneGreaterThanTwo),
            Err(TestError::AlternativeMismatch { .. })
        ));
        assert!(matches!(
            BootstrapDistribution::new(vec![], Alternative::TwoSided),
            Err(TestError::ZeroLoops)
        ));
    }

    #[test]
    fn test_bootstrap_errors() {
        let mut rng = StdRng::seed_from_u64(0);
        let s1 = [1.0, 2.0, 3.0];
        let s2 = [4.0, 5.0];

        assert!(matches!(
            bootstrap_pvalue(&mut rng, &s1, &s2, 0.5, Alternative::TwoSided, &config(0)),
            Err(TestError::ZeroLoops)
        ));

        let too_big = BootstrapConfig {
            bootstrap_size: Some(3),
            ..config(10)
        };
        assert!(matches!(
            bootstrap_pvalue(&mut rng, &s1, &s2, 0.5, Alternative::TwoSided, &too_big),
            Err(TestError::BootstrapSizeExceedsPool { .. })
        ));

        let with_replacement = BootstrapConfig {
            replacement: true,
            ..too_big
        };
        assert!(
            bootstrap_pvalue(&mut rng, &s1, &s2, 0.5, Alternative::TwoSided, &with_replacement)
                .is_ok()
        );

        assert!(matches!(
            bootstrap_pvalue(&mut rng, &s1, &[], 0.5, Alternative::TwoSided, &config(10)),
            Err(TestError::EmptySample)
        ));
    }

    #[test]
    fn test_degenerate_pool() {
        let mut rng = StdRng::seed_from_u64(5);
        let dist =
            bootstrap_distribution(&mut rng, &[2.0], &[2.0], Alternative::TwoSided, &config(50))
                .unwrap();

        assert!(dist.is_degenerate());
        assert!(dist.stats().iter().all(|s| *s == 0.0));
        assert_eq!(dist.p_value(0.0).unwrap().value(), 1.0);
    }
}
