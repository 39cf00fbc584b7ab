use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::FittedLogisticRegression as LinfaFitted;
use ndarray::{Array1, Array2};

use crate::error::{ResampleError, Result};
use crate::models::classifier_trait::{ClassifierModel, FittedClassifier};

/// L2-penalized logistic regression backed by `linfa-logistic`.
///
/// `c` is the inverse regularization strength. linfa penalizes
/// `0.5 * alpha * ||w||^2` next to the summed log-loss, so `alpha = 1 / c`
/// gives the same optimum as scikit-learn's `LogisticRegression(C = c)`.
/// The intercept is not penalized.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    /// Gradient tolerance handed to the L-BFGS solver.
    pub tol: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1.0, 1000, 1e-4)
    }
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize, tol: f64) -> Self {
        LogisticRegression { c, max_iter, tol }
    }
}

impl ClassifierModel for LogisticRegression {
    fn fit(&self, x: &Array2<f64>, y: &Array1<bool>) -> Result<Box<dyn FittedClassifier>> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            return Err(ResampleError::EmptyDataset);
        }
        if y.len() != n_rows {
            return Err(ResampleError::LengthMismatch {
                expected: n_rows,
                found: y.len(),
            });
        }
        let n_positive = y.iter().filter(|&&v| v).count();
        if n_positive == 0 || n_positive == n_rows {
            return Err(ResampleError::SingleClass);
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ResampleError::ModelFit(format!(
                "inverse regularization strength must be positive, got {}",
                self.c
            )));
        }

        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let params = linfa_logistic::LogisticRegression::default()
            .alpha(1.0 / self.c)
            .max_iterations(self.max_iter as u64)
            .gradient_tolerance(self.tol)
            .with_intercept(true);

        let model = params
            .fit(&dataset)
            .map_err(|e| ResampleError::ModelFit(e.to_string()))?;

        let fitted = FittedLogisticRegression::from_linfa(model, self.c, x, y);
        if !fitted.converged {
            log::warn!(
                "Logistic regression gradient norm {:.3e} exceeds tol {:.1e} after at most {} iterations; using the last parameters",
                fitted.gradient_norm,
                self.tol,
                self.max_iter
            );
        }
        Ok(Box::new(fitted))
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

/// Adapter exposing a fitted linfa model through [`FittedClassifier`].
///
/// linfa picks which label it calls positive from the training targets, so
/// the adapter reorients probabilities and parameters towards `true`.
pub struct FittedLogisticRegression {
    model: LinfaFitted<f64, bool>,
    /// Whether linfa's positive class is `true`.
    positive_is_true: bool,
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    /// L2 norm of the penalized objective's gradient at the returned parameters.
    pub gradient_norm: f64,
    pub converged: bool,
}

impl FittedLogisticRegression {
    fn from_linfa(
        model: LinfaFitted<f64, bool>,
        c: f64,
        x: &Array2<f64>,
        y: &Array1<bool>,
    ) -> Self {
        let positive_is_true = model.labels().pos.class;
        let sign = if positive_is_true { 1.0 } else { -1.0 };
        let coefficients = model.params().mapv(|w| sign * w);
        let intercept = sign * model.intercept();

        let mut fitted = FittedLogisticRegression {
            model,
            positive_is_true,
            coefficients,
            intercept,
            gradient_norm: 0.0,
            converged: true,
        };

        // Gradient of 0.5 * ||w||^2 / c + sum(logloss); the intercept is unpenalized.
        let residual = fitted.predict_proba(x) - y.mapv(|v| if v { 1.0 } else { 0.0 });
        let grad_w = x.t().dot(&residual) + &fitted.coefficients / c;
        let grad_b = residual.sum();
        fitted.gradient_norm = (grad_w.dot(&grad_w) + grad_b * grad_b).sqrt();
        fitted
    }

    /// Linear score `x . w + b` oriented towards the `true` class.
    pub fn decision_function(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }
}

impl FittedClassifier for FittedLogisticRegression {
    fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        let probs = self.model.predict_probabilities(x);
        if self.positive_is_true {
            probs
        } else {
            probs.mapv(|p| 1.0 - p)
        }
    }

    fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    fn intercept(&self) -> f64 {
        self.intercept
    }

    fn converged(&self) -> bool {
        self.converged
    }
}
