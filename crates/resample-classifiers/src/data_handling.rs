//! Data structures for the passenger table and its random train/test splits.
//!
//! This module defines `PassengerRecord`, the one-hot encoded `Dataset`
//! built from a slice of records, and the `Partition` drawn for every
//! Monte Carlo trial.
use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ResampleError, Result};

/// One parsed input row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerRecord {
    /// Ordinal passenger class (e.g. 1, 2, 3).
    pub class: u32,
    pub age: f64,
    pub male: bool,
    pub survived: bool,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix laid out as `[C<k1> .. C<kK>, age, gender]`.
    pub x: Array2<f64>,
    /// `true` for the positive class (survived).
    pub y: Array1<bool>,
    pub feature_names: Vec<String>,
    /// Distinct class values, ascending. Indicator column `i` encodes `class_levels[i]`.
    pub class_levels: Vec<u32>,
}

impl Dataset {
    /// Build the numeric feature matrix and label vector from parsed records.
    ///
    /// The class column is expanded into one indicator column per distinct
    /// value, in ascending order, so the column layout only depends on the
    /// set of classes present. Age and gender are copied through unscaled.
    pub fn from_records(records: &[PassengerRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(ResampleError::EmptyDataset);
        }

        let class_levels: Vec<u32> = records
            .iter()
            .map(|r| r.class)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let n_features = class_levels.len() + 2;

        let mut x = Array2::<f64>::zeros((records.len(), n_features));
        for (i, record) in records.iter().enumerate() {
            // `class_levels` was built from these records, so the lookup cannot miss.
            if let Ok(col) = class_levels.binary_search(&record.class) {
                x[(i, col)] = 1.0;
            }
            x[(i, n_features - 2)] = record.age;
            x[(i, n_features - 1)] = if record.male { 1.0 } else { 0.0 };
        }

        let y = records.iter().map(|r| r.survived).collect::<Array1<bool>>();

        let mut feature_names: Vec<String> =
            class_levels.iter().map(|c| format!("C{}", c)).collect();
        feature_names.push("age".to_string());
        feature_names.push("gender".to_string());

        Ok(Dataset {
            x,
            y,
            feature_names,
            class_levels,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_positive(&self) -> usize {
        self.y.iter().filter(|&&v| v).count()
    }

    pub fn log_input_data_summary(&self) {
        log::info!(
            "{} passengers ({} survived, {} did not), {} feature columns: {}",
            self.n_rows(),
            self.n_positive(),
            self.n_rows() - self.n_positive(),
            self.n_features(),
            self.feature_names.join(", ")
        );
    }

    /// Gather the rows at `indices` into a new feature matrix and label vector.
    pub fn select_rows(&self, indices: &[usize]) -> (Array2<f64>, Array1<bool>) {
        (self.x.select(Axis(0), indices), self.y.select(Axis(0), indices))
    }
}

/// One random train/test split of a `Dataset`.
#[derive(Debug, Clone)]
pub struct Partition {
    pub x_train: Array2<f64>,
    pub y_train: Array1<bool>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<bool>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Number of test rows for `n_rows` at the given holdout fraction.
///
/// Rounds up, so any positive fraction holds out at least one row.
pub fn test_size(n_rows: usize, test_fraction: f64) -> usize {
    (test_fraction * n_rows as f64).ceil() as usize
}

/// Draw a non-stratified random partition.
///
/// Row indices are shuffled uniformly and the first `ceil(f * N)` land in
/// the test side. Every call consumes fresh randomness from `rng`, so
/// successive calls yield independent partitions.
pub fn train_test_split<R: Rng + ?Sized>(
    dataset: &Dataset,
    test_fraction: f64,
    rng: &mut R,
) -> Result<Partition> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ResampleError::InvalidTestFraction(test_fraction));
    }

    let n_rows = dataset.n_rows();
    let n_test = test_size(n_rows, test_fraction);
    if n_test == 0 || n_test >= n_rows {
        return Err(ResampleError::EmptyPartition { n_rows, n_test });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(rng);
    let train_indices = indices.split_off(n_test);
    let test_indices = indices;

    let (x_train, y_train) = dataset.select_rows(&train_indices);
    let (x_test, y_test) = dataset.select_rows(&test_indices);

    Ok(Partition {
        x_train,
        y_train,
        x_test,
        y_test,
        train_indices,
        test_indices,
    })
}
