//! Monte Carlo trial runner.
//!
//! Every trial draws a fresh random partition, fits the classifier on the
//! training rows and evaluates it on the held-out rows. Results are
//! collected into an append-only `Vec<TrialResult>` that is handed to the
//! aggregator once all trials are done.
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::data_handling::{train_test_split, Dataset};
use crate::error::{ResampleError, Result};
use crate::metrics::{roc_auc, ConfusionMatrix};
use crate::models::{build_model, ClassifierModel, FittedClassifier};
use crate::threshold::{accuracy_curve, scan_model, ThresholdCurve};

/// Everything recorded for a single trial. `None` marks an undefined metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// One coefficient per feature column, in dataset column order.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
    pub ppv: Option<f64>,
    pub auroc: Option<f64>,
    pub optimal_threshold: f64,
    /// Accuracy reached at `optimal_threshold`.
    pub optimal_accuracy: f64,
    pub converged: bool,
}

/// Output of a full run: per-trial results plus the last trial's fine-grid curve.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Completed trials, in the order they ran.
    pub trials: Vec<TrialResult>,
    /// Accuracy over the fine grid on the last completed trial's model and test fold.
    pub final_curve: ThresholdCurve,
    /// Trials dropped because their training fold held a single class or the
    /// classifier could not be fitted.
    pub n_skipped: usize,
}

impl SimulationOutcome {
    /// Per-trial accuracy at the default 0.5 threshold.
    pub fn accuracies(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.accuracy).collect()
    }

    pub fn optimal_thresholds(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.optimal_threshold).collect()
    }

    pub fn optimal_accuracies(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.optimal_accuracy).collect()
    }

    pub fn n_not_converged(&self) -> usize {
        self.trials.iter().filter(|t| !t.converged).count()
    }
}

/// Drives the split/fit/evaluate loop.
pub struct MonteCarloRunner {
    config: SimulationConfig,
    model: Box<dyn ClassifierModel>,
}

impl MonteCarloRunner {
    /// Runner using the classifier described by `config.model`.
    pub fn new(config: SimulationConfig) -> Self {
        let model = build_model(&config.model);
        Self { config, model }
    }

    /// Runner with a caller-supplied classifier; `config.model` is ignored.
    pub fn with_model(config: SimulationConfig, model: Box<dyn ClassifierModel>) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run `config.n_trials` trials with an RNG seeded from `config.seed`,
    /// or from OS entropy when no seed is set.
    pub fn run(&self, dataset: &Dataset) -> Result<SimulationOutcome> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(dataset, &mut rng)
    }

    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        rng: &mut R,
    ) -> Result<SimulationOutcome> {
        self.config.scan_grid.validate()?;
        self.config.fine_grid.validate()?;
        if self.config.n_trials == 0 {
            return Err(ResampleError::NoTrials);
        }

        log::info!(
            "Running {} trials of {} with test fraction {}",
            self.config.n_trials,
            self.model.name(),
            self.config.test_fraction
        );

        let mut trials = Vec::with_capacity(self.config.n_trials);
        let mut n_skipped = 0;
        let mut last_fold: Option<(Array1<f64>, Array1<bool>)> = None;

        for trial_idx in 0..self.config.n_trials {
            let partition = train_test_split(dataset, self.config.test_fraction, &mut *rng)?;
            let model = match self.model.fit(&partition.x_train, &partition.y_train) {
                Ok(model) => model,
                Err(e @ (ResampleError::SingleClass | ResampleError::ModelFit(_))) => {
                    log::debug!("Trial {}: skipped, {}", trial_idx + 1, e);
                    n_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let result = self.evaluate(
                trial_idx,
                model.as_ref(),
                &partition.x_test,
                &partition.y_test,
            )?;
            trials.push(result);
            last_fold = Some((model.predict_proba(&partition.x_test), partition.y_test));
        }

        let (probabilities, labels) =
            last_fold.ok_or(ResampleError::AllTrialsSkipped(n_skipped))?;
        let final_curve = accuracy_curve(&probabilities, &labels, &self.config.fine_grid)?;

        let outcome = SimulationOutcome {
            trials,
            final_curve,
            n_skipped,
        };

        if n_skipped > 0 {
            log::warn!(
                "Skipped {} of {} trials whose classifier could not be fitted",
                n_skipped,
                self.config.n_trials
            );
        }

        let not_converged = outcome.n_not_converged();
        if not_converged > 0 {
            log::warn!(
                "{} of {} trials stopped before meeting the gradient tolerance",
                not_converged,
                outcome.trials.len()
            );
        }
        log::info!("Completed {} trials", outcome.trials.len());

        Ok(outcome)
    }

    /// Evaluate a fitted model on one held-out fold.
    fn evaluate(
        &self,
        trial_idx: usize,
        model: &dyn FittedClassifier,
        x_test: &Array2<f64>,
        y_test: &Array1<bool>,
    ) -> Result<TrialResult> {
        let coefficients = model.coefficients();
        if coefficients.len() != x_test.ncols() {
            return Err(ResampleError::LengthMismatch {
                expected: x_test.ncols(),
                found: coefficients.len(),
            });
        }

        let predicted = model.predict(x_test);
        let probabilities = model.predict_proba(x_test);
        let confusion = ConfusionMatrix::from_predictions(&predicted, y_test)?;

        let accuracy = confusion.accuracy().ok_or(ResampleError::EmptyPartition {
            n_rows: x_test.nrows(),
            n_test: 0,
        })?;
        let sensitivity = confusion.sensitivity();
        let specificity = confusion.specificity();
        let ppv = confusion.ppv();
        let auroc = roc_auc(&probabilities, y_test)?;

        for (name, value) in [
            ("sensitivity", sensitivity),
            ("specificity", specificity),
            ("ppv", ppv),
            ("auroc", auroc),
        ] {
            if value.is_none() {
                log::debug!(
                    "Trial {}: {} undefined for test fold {:?}",
                    trial_idx + 1,
                    name,
                    confusion
                );
            }
        }

        let optimal = scan_model(model, x_test, y_test, &self.config.scan_grid)?;

        log::debug!(
            "Trial {}: accuracy {:.3}, optimal threshold {:.2} (accuracy {:.3})",
            trial_idx + 1,
            accuracy,
            optimal.threshold,
            optimal.accuracy
        );

        Ok(TrialResult {
            coefficients: coefficients.to_vec(),
            intercept: model.intercept(),
            confusion,
            accuracy,
            sensitivity,
            specificity,
            ppv,
            auroc,
            optimal_threshold: optimal.threshold,
            optimal_accuracy: optimal.accuracy,
            converged: model.converged(),
        })
    }
}
