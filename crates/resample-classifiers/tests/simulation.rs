use ndarray::{Array1, Array2};
use resample_classifiers::config::{ModelConfig, SimulationConfig};
use resample_classifiers::data_handling::{test_size, Dataset};
use resample_classifiers::error::{ResampleError, Result};
use resample_classifiers::io::{parse_passenger_records, InputConfig};
use resample_classifiers::metrics::ConfusionMatrix;
use resample_classifiers::models::{ClassifierModel, FittedClassifier};
use resample_classifiers::report::format_report;
use resample_classifiers::simulation::{MonteCarloRunner, TrialResult};
use resample_classifiers::stats::aggregate;

/// Survivors are first-class women, non-survivors second-class men; ages
/// interleave so age alone carries no signal.
const SEPARABLE: &str = "\
pclass,age,gender,survived
1,20,F,1
2,25,M,0
2,30,M,0
1,35,F,1
1,40,F,1
2,45,M,0
2,50,M,0
1,55,F,1
1,60,F,1
2,65,M,0
";

fn separable_dataset() -> Dataset {
    let records = parse_passenger_records(SEPARABLE.as_bytes(), &InputConfig::default()).unwrap();
    Dataset::from_records(&records).unwrap()
}

/// Mixed table where no feature pattern predicts survival perfectly.
fn noisy_dataset(n_rows: usize) -> Dataset {
    let mut csv = String::from("pclass,age,gender,survived\n");
    for i in 0..n_rows {
        let class = 1 + i % 3;
        let age = 5 + (i * 7) % 70;
        let gender = if i % 2 == 0 { "M" } else { "F" };
        // Women and upper classes survive more often, with exceptions.
        let survived = (gender == "F" && i % 5 != 0) || (class == 1 && i % 4 == 0);
        csv.push_str(&format!("{},{},{},{}\n", class, age, gender, survived as u8));
    }
    let records = parse_passenger_records(csv.as_bytes(), &InputConfig::default()).unwrap();
    Dataset::from_records(&records).unwrap()
}

fn config(n_trials: usize, seed: u64) -> SimulationConfig {
    SimulationConfig {
        n_trials,
        seed: Some(seed),
        ..SimulationConfig::default()
    }
}

#[test]
fn separable_data_scores_perfectly() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dataset = separable_dataset();
    // Ages are unscaled. Under the default C = 1 the penalty shrinks the
    // class and gender weights enough that age can tip rows near the
    // boundary; C = 100 leaves the fit close to unpenalized.
    let cfg = SimulationConfig {
        model: ModelConfig::logistic(100.0),
        ..config(5, 42)
    };

    let outcome = MonteCarloRunner::new(cfg).run(&dataset).unwrap();
    assert_eq!(outcome.trials.len(), 5);

    let report = aggregate(&outcome.trials, &dataset.feature_names).unwrap();
    let accuracy = report.accuracy.summary.unwrap();
    assert_eq!(accuracy.mean, 1.0);
    assert_eq!(accuracy.interval_width(), 0.0);

    for trial in &outcome.trials {
        assert_eq!(trial.optimal_accuracy, 1.0);
        assert_eq!(trial.auroc.unwrap_or(1.0), 1.0);
    }
}

#[test]
fn every_trial_tests_on_ceil_fraction_of_rows() {
    let dataset = noisy_dataset(53);
    let cfg = SimulationConfig {
        test_fraction: 0.3,
        ..config(20, 3)
    };
    let outcome = MonteCarloRunner::new(cfg).run(&dataset).unwrap();
    let expected = test_size(53, 0.3);
    assert_eq!(expected, 16);
    for trial in &outcome.trials {
        assert_eq!(trial.confusion.total(), expected);
    }
}

#[test]
fn same_seed_reproduces_the_run() {
    let dataset = noisy_dataset(60);
    let first = MonteCarloRunner::new(config(15, 11)).run(&dataset).unwrap();
    let second = MonteCarloRunner::new(config(15, 11)).run(&dataset).unwrap();
    assert_eq!(first.trials, second.trials);
    assert_eq!(first.final_curve, second.final_curve);
}

#[test]
fn optimal_accuracy_never_below_default_threshold_accuracy() {
    let dataset = noisy_dataset(80);
    let outcome = MonteCarloRunner::new(config(30, 5)).run(&dataset).unwrap();
    for trial in &outcome.trials {
        assert!(trial.optimal_accuracy >= trial.accuracy);
        assert!((0.0..=1.0).contains(&trial.optimal_threshold));
    }
}

#[test]
fn final_curve_covers_the_fine_grid() {
    let dataset = noisy_dataset(40);
    let outcome = MonteCarloRunner::new(config(3, 9)).run(&dataset).unwrap();
    let curve = &outcome.final_curve;
    assert_eq!(curve.len(), 101);
    assert!((curve.thresholds[0] - 0.4).abs() < 1e-12);
    assert!((curve.thresholds[100] - 0.6).abs() < 1e-12);
    assert!(curve.best().is_some());
}

#[test]
fn coefficients_follow_feature_column_order() {
    let dataset = noisy_dataset(90);
    let outcome = MonteCarloRunner::new(config(10, 21)).run(&dataset).unwrap();
    let report = aggregate(&outcome.trials, &dataset.feature_names).unwrap();

    let names: Vec<&str> = report.coefficients.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, vec!["C1", "C2", "C3", "age", "gender"]);

    // Women survive more often, so the male indicator weighs against survival.
    let gender = report.coefficients[4].summary.unwrap();
    assert!(gender.mean < 0.0);
}

#[test]
fn aggregation_is_repeatable() {
    let dataset = noisy_dataset(50);
    let outcome = MonteCarloRunner::new(config(25, 8)).run(&dataset).unwrap();
    let first = aggregate(&outcome.trials, &dataset.feature_names).unwrap();
    let second = aggregate(&outcome.trials, &dataset.feature_names).unwrap();
    assert_eq!(first, second);

    for quantity in first.quantities() {
        if let Some(s) = quantity.summary {
            assert!(s.lower <= s.upper, "{} interval is inverted", quantity.name);
            assert_eq!(s.n_defined + s.n_undefined, 25);
        }
    }
}

/// `n_rows` men spread over three classes; only the first `n_survivors` rows survived.
fn rare_survivor_dataset(n_rows: usize, n_survivors: usize) -> Dataset {
    let mut csv = String::from("pclass,age,gender,survived\n");
    for i in 0..n_rows {
        let survived = (i < n_survivors) as u8;
        csv.push_str(&format!("{},{},M,{}\n", 1 + i % 3, 20 + i, survived));
    }
    let records = parse_passenger_records(csv.as_bytes(), &InputConfig::default()).unwrap();
    Dataset::from_records(&records).unwrap()
}

#[test]
fn single_class_training_folds_are_skipped_and_counted() {
    let _ = env_logger::builder().is_test(true).try_init();
    // With two test rows out of ten, the lone survivor is held out in about
    // one trial in five, leaving a training fold without positives.
    let dataset = rare_survivor_dataset(10, 1);
    let outcome = MonteCarloRunner::new(config(200, 1)).run(&dataset).unwrap();

    assert!(outcome.n_skipped > 0);
    assert!(!outcome.trials.is_empty());
    assert_eq!(outcome.trials.len() + outcome.n_skipped, 200);

    // Completed trials trained on the survivor, so their test folds hold none.
    for trial in &outcome.trials {
        assert_eq!(trial.confusion.tp + trial.confusion.fn_, 0);
        assert!(trial.sensitivity.is_none());
        assert!(trial.auroc.is_none());
    }

    let report = aggregate(&outcome.trials, &dataset.feature_names).unwrap();
    assert_eq!(report.n_trials, outcome.trials.len());
    assert_eq!(outcome.final_curve.len(), 101);
}

#[test]
fn test_folds_without_survivors_leave_sensitivity_undefined() {
    let dataset = rare_survivor_dataset(30, 3);
    let outcome = MonteCarloRunner::new(config(40, 17)).run(&dataset).unwrap();
    let report = aggregate(&outcome.trials, &dataset.feature_names).unwrap();

    let without_positives = outcome
        .trials
        .iter()
        .filter(|t| t.confusion.tp + t.confusion.fn_ == 0)
        .count();
    assert!(without_positives > 0);
    assert!(without_positives < outcome.trials.len());

    for trial in &outcome.trials {
        let has_positives = trial.confusion.tp + trial.confusion.fn_ > 0;
        assert_eq!(trial.sensitivity.is_some(), has_positives);
        assert_eq!(trial.auroc.is_some(), has_positives);
    }

    let sensitivity = report.sensitivity.summary.unwrap();
    assert_eq!(sensitivity.n_undefined, without_positives);
    assert_eq!(sensitivity.n_defined, outcome.trials.len() - without_positives);
    assert!((0.0..=1.0).contains(&sensitivity.mean));

    let line = format_report(&report)
        .into_iter()
        .find(|l| l.starts_with("Mean sensitivity"))
        .unwrap();
    assert!(line.ends_with(&format!(
        "(undefined in {} of {} trials, excluded)",
        without_positives,
        outcome.trials.len()
    )));
}

/// Refuses every training fold.
struct UnfittableModel;

impl ClassifierModel for UnfittableModel {
    fn fit(&self, _x: &Array2<f64>, _y: &Array1<bool>) -> Result<Box<dyn FittedClassifier>> {
        Err(ResampleError::ModelFit("solver diverged".to_string()))
    }
}

#[test]
fn run_fails_when_every_trial_is_skipped() {
    let dataset = noisy_dataset(20);
    let runner = MonteCarloRunner::with_model(config(3, 2), Box::new(UnfittableModel));
    assert_eq!(
        runner.run(&dataset).unwrap_err(),
        ResampleError::AllTrialsSkipped(3)
    );
}

#[test]
fn zero_trials_is_rejected() {
    let dataset = separable_dataset();
    let err = MonteCarloRunner::new(config(0, 1)).run(&dataset).unwrap_err();
    assert_eq!(err, ResampleError::NoTrials);
}

/// Predicts a fixed probability for every row and never calls a positive.
struct ConstantModel(f64);

struct FittedConstant {
    probability: f64,
    coefficients: Array1<f64>,
}

impl ClassifierModel for ConstantModel {
    fn fit(&self, x: &Array2<f64>, _y: &Array1<bool>) -> Result<Box<dyn FittedClassifier>> {
        Ok(Box::new(FittedConstant {
            probability: self.0,
            coefficients: Array1::zeros(x.ncols()),
        }))
    }
}

impl FittedClassifier for FittedConstant {
    fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        Array1::from_elem(x.nrows(), self.probability)
    }

    fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }
}

#[test]
fn pluggable_classifier_with_undefined_ppv() {
    let dataset = noisy_dataset(30);
    let runner = MonteCarloRunner::with_model(config(12, 4), Box::new(ConstantModel(0.3)));
    let outcome = runner.run(&dataset).unwrap();
    let report = aggregate(&outcome.trials, &dataset.feature_names).unwrap();

    // No predicted positives in any trial.
    assert!(outcome.trials.iter().all(|t| t.ppv.is_none()));
    assert!(report.ppv.summary.is_none());
    assert!(report.specificity.summary.is_some());

    let lines = format_report(&report);
    assert!(lines
        .iter()
        .any(|l| l == "Mean pos. pred. val. = undefined in all 12 trials"));
}

fn trial(accuracy: f64, sensitivity: Option<f64>) -> TrialResult {
    TrialResult {
        coefficients: vec![0.5, -0.5],
        intercept: 0.0,
        confusion: ConfusionMatrix::default(),
        accuracy,
        sensitivity,
        specificity: Some(0.8),
        ppv: Some(0.7),
        auroc: Some(0.75),
        optimal_threshold: 0.5,
        optimal_accuracy: accuracy,
        converged: true,
    }
}

#[test]
fn undefined_sensitivity_is_excluded_not_zeroed() {
    let trials = vec![
        trial(0.8, Some(0.6)),
        trial(0.9, None),
        trial(0.7, Some(0.8)),
    ];
    let names = vec!["a".to_string(), "b".to_string()];
    let report = aggregate(&trials, &names).unwrap();

    let sensitivity = report.sensitivity.summary.unwrap();
    assert_eq!(sensitivity.n_defined, 2);
    assert_eq!(sensitivity.n_undefined, 1);
    assert!((sensitivity.mean - 0.7).abs() < 1e-12);

    let line = format_report(&report)
        .into_iter()
        .find(|l| l.starts_with("Mean sensitivity"))
        .unwrap();
    assert!(line.ends_with("(undefined in 1 of 3 trials, excluded)"));
}

#[test]
fn aggregate_rejects_mismatched_coefficients() {
    let trials = vec![trial(0.8, Some(0.5))];
    let names = vec!["only".to_string()];
    assert_eq!(
        aggregate(&trials, &names).unwrap_err(),
        ResampleError::LengthMismatch {
            expected: 1,
            found: 2
        }
    );
    assert_eq!(aggregate(&[], &names).unwrap_err(), ResampleError::NoTrials);
}
