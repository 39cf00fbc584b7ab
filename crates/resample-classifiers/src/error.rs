use std::error::Error;
use std::fmt;

/// Errors raised while building datasets, drawing partitions or fitting models.
#[derive(Debug, Clone, PartialEq)]
pub enum ResampleError {
    /// A data line could not be turned into a record (1-based line number).
    InvalidRecord { line: usize, reason: String },
    EmptyDataset,
    /// Holdout fraction outside the open interval (0, 1).
    InvalidTestFraction(f64),
    /// The split left the train or the test side without rows.
    EmptyPartition { n_rows: usize, n_test: usize },
    /// The training labels contain a single class, so no decision boundary exists.
    SingleClass,
    /// The classifier backend rejected its parameters or failed numerically.
    ModelFit(String),
    InvalidThresholdGrid(String),
    LengthMismatch { expected: usize, found: usize },
    NoTrials,
    /// Every trial was skipped; carries the number of skipped trials.
    AllTrialsSkipped(usize),
}

impl fmt::Display for ResampleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResampleError::InvalidRecord { line, reason } => {
                write!(f, "Invalid record at line {}: {}", line, reason)
            }
            ResampleError::EmptyDataset => write!(f, "Dataset contains no records"),
            ResampleError::InvalidTestFraction(fraction) => write!(
                f,
                "Test fraction must be strictly between 0 and 1, got {}",
                fraction
            ),
            ResampleError::EmptyPartition { n_rows, n_test } => write!(
                f,
                "Splitting {} rows with {} test rows leaves one side empty",
                n_rows, n_test
            ),
            ResampleError::SingleClass => write!(
                f,
                "Training labels contain a single class; both classes are required"
            ),
            ResampleError::ModelFit(msg) => write!(f, "Model fit failed: {}", msg),
            ResampleError::InvalidThresholdGrid(msg) => write!(f, "Invalid threshold grid: {}", msg),
            ResampleError::LengthMismatch { expected, found } => write!(
                f,
                "Length mismatch: expected {} values, found {}",
                expected, found
            ),
            ResampleError::NoTrials => write!(f, "At least one trial is required"),
            ResampleError::AllTrialsSkipped(n) => write!(
                f,
                "All {} trials were skipped; no training fold could be fitted",
                n
            ),
        }
    }
}

impl Error for ResampleError {}

pub type Result<T> = std::result::Result<T, ResampleError>;
