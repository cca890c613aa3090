//! Hooks for visualising the intermediate results of a test
//!
//! The crate draws nothing itself. A [Plotter] receives the two ecdfs and the
//! bootstrap distribution from [crate::ks_test_with_plotter] and may render
//! them however it likes. Its failures are logged and never change the
//! numeric result.
//!
use crate::bootstrap::BootstrapDistribution;
use crate::ecdf::Ecdf;
use crate::ks_tests::KsResult;
use thiserror::Error;

/// Error reported by a [Plotter]
#[derive(Debug, Error)]
#[error("Plotting failed: {0}")]
pub struct PlotError(pub String);

/// Receiver of the quantities worth plotting
///
/// Both methods do nothing by default.
///
pub trait Plotter<T>
where
    T: PartialOrd + Copy,
{
    /// Called with the ecdfs of the two original samples and their comparison
    fn plot_ecdfs(
        &self,
        _ecdf1: &Ecdf<T>,
        _ecdf2: &Ecdf<T>,
        _result: &KsResult<T>,
    ) -> Result<(), PlotError> {
        Ok(())
    }

    /// Called with the bootstrap distribution and the observed statistic
    fn plot_distribution(
        &self,
        _distribution: &BootstrapDistribution,
        _reference_stat: f64,
    ) -> Result<(), PlotError> {
        Ok(())
    }
}

/// Plotter that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlot;

impl<T> Plotter<T> for NoPlot where T: PartialOrd + Copy {}
