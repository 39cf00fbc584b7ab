//! Binary classification metrics.
//!
//! Every ratio returns `None` when its denominator is zero (for example
//! sensitivity on a test fold without positives) instead of producing a
//! NaN or a silent zero.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{ResampleError, Result};

/// 2x2 confusion counts for a binary problem where `true` is positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Count outcomes from aligned predicted and actual labels.
    pub fn from_predictions(predicted: &Array1<bool>, actual: &Array1<bool>) -> Result<Self> {
        check_lengths(actual.len(), predicted.len())?;
        let mut cm = ConfusionMatrix::default();
        for (&p, &a) in predicted.iter().zip(actual.iter()) {
            match (p, a) {
                (true, true) => cm.tp += 1,
                (true, false) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fn_ += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// (TP + TN) / total.
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.tp + self.tn, self.total())
    }

    /// True positive rate, TP / (TP + FN). Undefined without actual positives.
    pub fn sensitivity(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// True negative rate, TN / (TN + FP). Undefined without actual negatives.
    pub fn specificity(&self) -> Option<f64> {
        ratio(self.tn, self.tn + self.fp)
    }

    /// Positive predictive value, TP / (TP + FP). Undefined without predicted positives.
    pub fn ppv(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fp)
    }
}

fn check_lengths(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ResampleError::LengthMismatch { expected, found });
    }
    Ok(())
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    if den == 0 {
        None
    } else {
        Some(num as f64 / den as f64)
    }
}

/// Fraction of rows whose label matches `score >= threshold`.
///
/// `None` for empty input.
pub fn accuracy_at_threshold(
    scores: &Array1<f64>,
    labels: &Array1<bool>,
    threshold: f64,
) -> Result<Option<f64>> {
    check_lengths(labels.len(), scores.len())?;
    let correct = scores
        .iter()
        .zip(labels.iter())
        .filter(|(&s, &l)| (s >= threshold) == l)
        .count();
    Ok(ratio(correct, scores.len()))
}

/// Area under the ROC curve computed from continuous scores.
///
/// Uses the Mann-Whitney formulation: the probability that a random
/// positive scores higher than a random negative, with tied scores
/// counted as one half (average ranks). Undefined unless both classes are
/// present.
pub fn roc_auc(scores: &Array1<f64>, labels: &Array1<bool>) -> Result<Option<f64>> {
    check_lengths(labels.len(), scores.len())?;
    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Ok(None);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Sum of 1-based ranks of the positives, ties sharing their average rank.
    let mut rank_sum_pos = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let pos_in_group = order[start..end].iter().filter(|&&i| labels[i]).count();
        rank_sum_pos += avg_rank * pos_in_group as f64;
        start = end;
    }

    let u = rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Ok(Some(u / (n_pos * n_neg) as f64))
}
