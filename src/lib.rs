//! Two-sample Kolmogorov-Smirnov test, step by step
//!
//! This crate compares two samples with the Kolmogorov-Smirnov statistic and
//! estimates its p-value by bootstrap instead of the asymptotic formula. Every
//! stage is exposed on its own:
//!  - [Ecdf] empirical cumulative distribution function of a sample
//!  - [raw_ks_test] the statistic, where it occurs and in which direction
//!  - [resample] surrogate pairs drawn from the pooled samples
//!  - [bootstrap_distribution] the statistic under the null hypothesis
//!  - [p_value] and [bootstrap_pvalue] the p-value estimate
//!  - [ks_test] all of the above in one call
//!
//! ```
//! # use step_ks::*;
//! # use rand::prelude::*;
//! # fn main() -> Result<(), TestError> {
//! let mut rng = StdRng::seed_from_u64(2024);
//! let s1: Vec<f64> = (0..100).map(|_| rng.gen()).collect();
//! let s2: Vec<f64> = (0..70).map(|_| rng.gen::<f64>() + 0.5).collect();
//!
//! let config = BootstrapConfig { nloop: 500, ..Default::default() };
//! let res = ks_test(&mut rng, &s1, &s2, Alternative::OneLessThanTwo, &config)?;
//!
//! // Sample 1 is clearly smaller, the null hypothesis is rejected
//! assert!(res.pvalue < 0.05);
//! # Ok(())}
//! ```
//!
//! All randomness comes from the generator passed by the caller, so a seeded
//! generator makes the whole test reproducible.
//!
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

pub mod bootstrap;
pub mod ecdf;
pub mod plotting;
pub mod resampling;

pub use bootstrap::{
    bootstrap_distribution, bootstrap_pvalue, p_value, BootstrapConfig, BootstrapDistribution,
    PValue, DEFAULT_BOOTSTRAP_LOOPS,
};
pub use ecdf::Ecdf;
pub use ks_tests::{raw_ks_test, Alternative, Direction, KsResult};
pub use plotting::{NoPlot, PlotError, Plotter};
pub use resampling::resample;

///
/// Error that can be raised by the test
///
#[derive(Debug, Error)]
pub enum TestError {
    /// One of the samples has no values
    #[error("Sample must contain at least one value")]
    EmptySample,
    /// Case when a type to test supports only a partial order and some of the entries are not
    /// present in the order sequence (e.g. NaN in floats)
    #[error("Collection contains values that cannot be placed in an order sequence (e.g. NaN for floats)")]
    ContainsNotSortableValues,
    /// String does not name an alternative hypothesis
    #[error("Unknown alternative hypothesis '{0}'")]
    UnknownAlternative(String),
    /// Number of bootstrap iterations is zero
    #[error("Number of bootstrap iterations must be positive")]
    ZeroLoops,
    /// Requested bootstrap sample size is zero
    #[error("Bootstrap sample size must be positive")]
    ZeroBootstrapSize,
    /// Sampling without replacement needs more values than available
    #[error("Cannot draw {requested} values without replacement from a pool of {available}")]
    BootstrapSizeExceedsPool { requested: usize, available: usize },
    /// Reference statistic cannot be compared
    #[error("Invalid reference statistic {0}")]
    InvalidReferenceStatistic(f64),
    /// P-value requested for other alternative than the distribution was built with
    #[error("Distribution built for '{distribution}' cannot test '{requested}'")]
    AlternativeMismatch {
        distribution: Alternative,
        requested: Alternative,
    },
}

/// Result of the complete test
///
#[derive(Debug, Clone, Serialize)]
pub struct KsTestResult<T> {
    /// Value of the statistic for the original samples
    pub statistic: f64,
    /// Value at which the statistic occurs
    pub location: T,
    /// Which ecdf was above the other at `location`
    pub direction: Direction,
    /// Bootstrap estimate of the p-value
    pub pvalue: f64,
    /// Tested alternative hypothesis
    pub alternative: Alternative,
    /// Number of bootstrap iterations
    pub nloop: usize,
    /// Set if the p-value should not be trusted
    pub warning: Option<String>,
    /// Statistics of the bootstrap iterations
    #[serde(skip)]
    pub distribution: BootstrapDistribution,
}

///
/// Perform two sample Kolmogorov-Smirnov test with a bootstrap p-value
///
/// Computes the statistic of the original samples with [raw_ks_test], builds
/// its null distribution with [bootstrap_distribution] and estimates the
/// p-value with [p_value].
///
/// # Errors
/// Any of the errors of the three stages. Samples are validated before the
/// bootstrap starts.
///
pub fn ks_test<T, R>(
    rng: &mut R,
    sample1: &[T],
    sample2: &[T],
    alternative: Alternative,
    config: &BootstrapConfig,
) -> Result<KsTestResult<T>, TestError>
where
    T: PartialOrd + Copy + Send + Sync,
    R: Rng + ?Sized,
{
    ks_test_with_plotter(rng, sample1, sample2, alternative, config, &NoPlot)
}

///
/// Like [ks_test] but passes the intermediate quantities to a [Plotter]
///
/// The plotter is called only once the p-value is known; on invalid input it
/// is not called at all. A failing plotter only produces a warning in the log.
///
pub fn ks_test_with_plotter<T, R, P>(
    rng: &mut R,
    sample1: &[T],
    sample2: &[T],
    alternative: Alternative,
    config: &BootstrapConfig,
    plotter: &P,
) -> Result<KsTestResult<T>, TestError>
where
    T: PartialOrd + Copy + Send + Sync,
    R: Rng + ?Sized,
    P: Plotter<T> + ?Sized,
{
    let ecdf1 = Ecdf::new(sample1.to_vec())?;
    let ecdf2 = Ecdf::new(sample2.to_vec())?;
    let reference = ks_tests::ks_statistic(&ecdf1, &ecdf2, alternative);

    let distribution = bootstrap_distribution(rng, sample1, sample2, alternative, config)?;
    let p = p_value(&distribution, reference.stat(), alternative)?;

    // Plotter only sees results of a run that passed all checks
    if let Err(e) = plotter.plot_ecdfs(&ecdf1, &ecdf2, &reference) {
        tracing::warn!(error = %e, "failed to plot the ecdfs");
    }
    if let Err(e) = plotter.plot_distribution(&distribution, reference.stat()) {
        tracing::warn!(error = %e, "failed to plot the bootstrap distribution");
    }

    let warning = if distribution.is_degenerate() {
        tracing::warn!(
            nloop = distribution.len(),
            "all bootstrap statistics are equal, the p-value is not informative"
        );
        Some("All bootstrap statistics are identical".to_string())
    } else {
        None
    };

    tracing::debug!(
        statistic = reference.stat(),
        p_value = p.value(),
        %alternative,
        "KS test finished"
    );

    Ok(KsTestResult {
        statistic: reference.stat(),
        location: reference.location(),
        direction: reference.direction(),
        pvalue: p.value(),
        alternative,
        nloop: p.nloop(),
        warning,
        distribution,
    })
}
