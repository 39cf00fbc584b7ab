use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::threshold::ThresholdGrid;

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    /// L2-penalized logistic regression.
    ///
    /// `c` is the inverse regularization strength, `tol` the gradient
    /// max-norm at which the solver stops.
    LogisticRegression { c: f64, max_iter: usize, tol: f64 },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::LogisticRegression {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" | "logistic_regression" | "logreg" => Ok(ModelType::default()),
            _ => Err(format!(
                "Unknown model type: {}. Supported model types: logistic",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }

    /// Logistic regression with the given inverse regularization strength
    /// and default iteration budget.
    pub fn logistic(c: f64) -> Self {
        Self {
            model_type: ModelType::LogisticRegression {
                c,
                max_iter: 1000,
                tol: 1e-4,
            },
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::default(),
        }
    }
}

/// Parameters of a full Monte Carlo run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent train/test trials.
    pub n_trials: usize,
    /// Fraction of rows held out for testing in every trial.
    pub test_fraction: f64,
    /// Grid searched for the accuracy-maximizing threshold in every trial.
    pub scan_grid: ThresholdGrid,
    /// Grid for the accuracy curve computed on the last trial.
    pub fine_grid: ThresholdGrid,
    /// Seed for the partition RNG. `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub model: ModelConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_trials: 1000,
            test_fraction: 0.2,
            scan_grid: ThresholdGrid::new(0.0, 1.0, 101),
            fine_grid: ThresholdGrid::new(0.4, 0.6, 101),
            seed: None,
            model: ModelConfig::default(),
        }
    }
}
