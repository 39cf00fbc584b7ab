use ndarray::{Array1, Array2};

use crate::error::Result;

/// Probability cutoff used for hard labels unless a caller scans thresholds.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// A trainable binary probabilistic classifier.
///
/// Implementations are stateless recipes: `fit` returns a new fitted model
/// and leaves `self` untouched, so one recipe serves every Monte Carlo
/// trial. Labels use `true` for the positive class.
pub trait ClassifierModel {
    /// Fit on the training rows. Failing to converge within the iteration
    /// budget is not an error; the fitted model reports it through
    /// [`FittedClassifier::converged`].
    fn fit(&self, x: &Array2<f64>, y: &Array1<bool>) -> Result<Box<dyn FittedClassifier>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// The result of [`ClassifierModel::fit`].
pub trait FittedClassifier {
    /// Probability of the positive class for every row, each in `[0, 1]`.
    fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64>;

    /// Hard labels at [`DEFAULT_THRESHOLD`]: positive iff probability >= 0.5.
    fn predict(&self, x: &Array2<f64>) -> Array1<bool> {
        self.predict_proba(x).mapv(|p| p >= DEFAULT_THRESHOLD)
    }

    /// One coefficient per feature column, in feature-matrix column order.
    fn coefficients(&self) -> &Array1<f64>;

    fn intercept(&self) -> f64 {
        0.0
    }

    /// Whether the solver met its tolerance before exhausting its budget.
    fn converged(&self) -> bool {
        true
    }
}
