//! Decision threshold search.
//!
//! A threshold `k` classifies a row as positive iff its predicted
//! probability is `>= k`. The scanner walks a grid in ascending order and
//! keeps the first threshold reaching the highest accuracy.
use itertools_num::linspace;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{ResampleError, Result};
use crate::metrics::accuracy_at_threshold;
use crate::models::{FittedClassifier, DEFAULT_THRESHOLD};

/// Closed, evenly spaced threshold grid `[start, stop]` with `n_points` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGrid {
    pub start: f64,
    pub stop: f64,
    pub n_points: usize,
}

impl Default for ThresholdGrid {
    fn default() -> Self {
        ThresholdGrid::new(0.0, 1.0, 101)
    }
}

impl ThresholdGrid {
    pub fn new(start: f64, stop: f64, n_points: usize) -> Self {
        ThresholdGrid {
            start,
            stop,
            n_points,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_points < 2 {
            return Err(ResampleError::InvalidThresholdGrid(format!(
                "need at least 2 points, got {}",
                self.n_points
            )));
        }
        if !(self.start.is_finite() && self.stop.is_finite() && self.start < self.stop) {
            return Err(ResampleError::InvalidThresholdGrid(format!(
                "start {} must be below stop {}",
                self.start, self.stop
            )));
        }
        Ok(())
    }

    /// Grid values in ascending order, both end points included.
    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.stop, self.n_points).collect()
    }
}

/// The accuracy-maximizing threshold found by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalThreshold {
    pub threshold: f64,
    pub accuracy: f64,
}

/// Scan `thresholds` in the given order and return the best one.
///
/// The running best starts at `(0.5, 0.0)` and is only replaced on a strict
/// improvement, so ties resolve to the lowest threshold of an ascending grid
/// and an all-zero curve keeps the 0.5 default.
pub fn find_optimal_threshold(
    probabilities: &Array1<f64>,
    labels: &Array1<bool>,
    thresholds: &[f64],
) -> Result<OptimalThreshold> {
    let mut best = OptimalThreshold {
        threshold: DEFAULT_THRESHOLD,
        accuracy: 0.0,
    };
    for &k in thresholds {
        let accuracy = accuracy_at_threshold(probabilities, labels, k)?.unwrap_or(0.0);
        if accuracy > best.accuracy {
            best = OptimalThreshold {
                threshold: k,
                accuracy,
            };
        }
    }
    Ok(best)
}

/// Run the threshold scan for a fitted model on held-out rows.
pub fn scan_model(
    model: &dyn FittedClassifier,
    x: &Array2<f64>,
    y: &Array1<bool>,
    grid: &ThresholdGrid,
) -> Result<OptimalThreshold> {
    let probabilities = model.predict_proba(x);
    find_optimal_threshold(&probabilities, y, &grid.values())
}

/// Accuracy evaluated at every point of a threshold grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCurve {
    pub thresholds: Vec<f64>,
    pub accuracies: Vec<f64>,
}

impl ThresholdCurve {
    /// First grid point attaining the maximum accuracy (argmax semantics).
    pub fn best(&self) -> Option<OptimalThreshold> {
        let mut best: Option<OptimalThreshold> = None;
        for (&threshold, &accuracy) in self.thresholds.iter().zip(self.accuracies.iter()) {
            if best.map_or(true, |b| accuracy > b.accuracy) {
                best = Some(OptimalThreshold {
                    threshold,
                    accuracy,
                });
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

pub fn accuracy_curve(
    probabilities: &Array1<f64>,
    labels: &Array1<bool>,
    grid: &ThresholdGrid,
) -> Result<ThresholdCurve> {
    let thresholds = grid.values();
    let accuracies = thresholds
        .iter()
        .map(|&k| Ok(accuracy_at_threshold(probabilities, labels, k)?.unwrap_or(0.0)))
        .collect::<Result<Vec<f64>>>()?;
    Ok(ThresholdCurve {
        thresholds,
        accuracies,
    })
}
