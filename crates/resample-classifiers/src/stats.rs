use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{ResampleError, Result};
use crate::simulation::TrialResult;

/// Lower and upper percentiles bounding the empirical 95% interval.
pub const LOWER_PERCENTILE: f64 = 2.5;
pub const UPPER_PERCENTILE: f64 = 97.5;

/// Percentile of pre-sorted data using linear interpolation between order statistics.
///
/// The rank of percentile `q` (in `[0, 100]`) is `q / 100 * (n - 1)`; when it
/// falls between two order statistics the value is interpolated linearly.
/// This is numpy's default (`method="linear"`).
///
/// # Arguments
///
/// * `sorted` - Values in ascending order.
/// * `q` - Percentile in `[0, 100]`.
///
/// Returns `None` for an empty sample.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Mean, spread and 95% percentile interval of one tracked quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantitySummary {
    pub mean: f64,
    /// Population standard deviation (divides by `n`).
    pub std_dev: f64,
    /// 2.5th percentile.
    pub lower: f64,
    /// 97.5th percentile.
    pub upper: f64,
    /// Trials contributing a value.
    pub n_defined: usize,
    /// Trials where the quantity was undefined and therefore left out.
    pub n_undefined: usize,
}

impl QuantitySummary {
    /// Width of the 95% percentile interval, `upper - lower`.
    pub fn interval_width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Summarize a quantity across trials.
///
/// Undefined values (`None`) are excluded from every statistic and counted
/// in `n_undefined`. Returns `None` when no trial has a defined value.
pub fn summarize<I>(values: I) -> Option<QuantitySummary>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut defined = Vec::new();
    let mut n_undefined = 0;
    for value in values {
        match value {
            Some(v) if v.is_finite() => defined.push(v),
            _ => n_undefined += 1,
        }
    }
    defined.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let lower = percentile(&defined, LOWER_PERCENTILE)?;
    let upper = percentile(&defined, UPPER_PERCENTILE)?;
    let mean = defined.iter().mean();
    let std_dev = defined.iter().population_std_dev();

    Some(QuantitySummary {
        mean,
        std_dev,
        lower,
        upper,
        n_defined: defined.len(),
        n_undefined,
    })
}

/// A labelled quantity in the aggregate report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedQuantity {
    pub name: String,
    /// `None` when the quantity was undefined in every trial.
    pub summary: Option<QuantitySummary>,
}

impl TrackedQuantity {
    fn new<I>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        TrackedQuantity {
            name: name.to_string(),
            summary: summarize(values),
        }
    }
}

/// Summary of a full trial sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub n_trials: usize,
    /// One entry per feature column, named after the column.
    pub coefficients: Vec<TrackedQuantity>,
    pub accuracy: TrackedQuantity,
    pub sensitivity: TrackedQuantity,
    pub specificity: TrackedQuantity,
    pub ppv: TrackedQuantity,
    pub auroc: TrackedQuantity,
    pub optimal_threshold: TrackedQuantity,
    pub optimal_accuracy: TrackedQuantity,
}

impl AggregateReport {
    /// Coefficients then fixed-threshold metrics, in report order.
    pub fn quantities(&self) -> Vec<&TrackedQuantity> {
        self.coefficients
            .iter()
            .chain([
                &self.accuracy,
                &self.sensitivity,
                &self.specificity,
                &self.ppv,
                &self.auroc,
            ])
            .collect()
    }
}

/// Reduce the trial sequence into per-quantity summaries.
///
/// The reduction only reads `trials`, so calling it again on the same
/// sequence gives the same report.
pub fn aggregate(trials: &[TrialResult], feature_names: &[String]) -> Result<AggregateReport> {
    if trials.is_empty() {
        return Err(ResampleError::NoTrials);
    }
    if let Some(bad) = trials
        .iter()
        .find(|t| t.coefficients.len() != feature_names.len())
    {
        return Err(ResampleError::LengthMismatch {
            expected: feature_names.len(),
            found: bad.coefficients.len(),
        });
    }

    let coefficients = feature_names
        .iter()
        .enumerate()
        .map(|(j, name)| TrackedQuantity::new(name, trials.iter().map(|t| Some(t.coefficients[j]))))
        .collect();

    Ok(AggregateReport {
        n_trials: trials.len(),
        coefficients,
        accuracy: TrackedQuantity::new("accuracy", trials.iter().map(|t| Some(t.accuracy))),
        sensitivity: TrackedQuantity::new("sensitivity", trials.iter().map(|t| t.sensitivity)),
        specificity: TrackedQuantity::new("specificity", trials.iter().map(|t| t.specificity)),
        ppv: TrackedQuantity::new("ppv", trials.iter().map(|t| t.ppv)),
        auroc: TrackedQuantity::new("auroc", trials.iter().map(|t| t.auroc)),
        optimal_threshold: TrackedQuantity::new(
            "optimal_threshold",
            trials.iter().map(|t| Some(t.optimal_threshold)),
        ),
        optimal_accuracy: TrackedQuantity::new(
            "optimal_accuracy",
            trials.iter().map(|t| Some(t.optimal_accuracy)),
        ),
    })
}
