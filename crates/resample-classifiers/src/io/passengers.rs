//! Delimited passenger table reader.
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::data_handling::{Dataset, PassengerRecord};
use crate::error::ResampleError;

/// Number of fields expected per line: class, age, gender code, survived flag.
pub const N_FIELDS: usize = 4;

/// Configuration for reading passenger tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Field delimiter.
    pub delimiter: char,
    /// Gender code mapped to the `gender = 1` category; every other code maps to 0.
    pub male_marker: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            male_marker: "M".to_string(),
        }
    }
}

/// Read a passenger file into records. The first line is a header and is skipped.
pub fn read_passenger_records<P: AsRef<Path>>(
    path: P,
    config: &InputConfig,
) -> Result<Vec<PassengerRecord>> {
    let file = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open passenger file: {}", path.as_ref().display()))?;
    parse_passenger_records(file, config)
        .with_context(|| format!("Failed to parse passenger file: {}", path.as_ref().display()))
}

/// Read a passenger file straight into a `Dataset`.
pub fn read_passenger_dataset<P: AsRef<Path>>(path: P, config: &InputConfig) -> Result<Dataset> {
    let records = read_passenger_records(&path, config)?;
    log::debug!(
        "Read {} records from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(Dataset::from_records(&records)?)
}

/// Parse passenger records from any reader.
///
/// Stops at the first malformed line; a malformed table never yields a
/// partial record list.
pub fn parse_passenger_records<R: Read>(
    reader: R,
    config: &InputConfig,
) -> Result<Vec<PassengerRecord>> {
    let delimiter = u8::try_from(config.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter must be a single ASCII character, got '{}'", config.delimiter))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        // Header occupies line 1.
        let line = row_idx + 2;
        let record = result.with_context(|| format!("Failed to read line {}", line))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push(parse_record(&record, line, config)?);
    }

    if records.is_empty() {
        return Err(ResampleError::EmptyDataset.into());
    }
    Ok(records)
}

fn parse_record(
    record: &StringRecord,
    line: usize,
    config: &InputConfig,
) -> std::result::Result<PassengerRecord, ResampleError> {
    let invalid = |reason: String| ResampleError::InvalidRecord { line, reason };

    if record.len() != N_FIELDS {
        return Err(invalid(format!(
            "expected {} fields, found {}",
            N_FIELDS,
            record.len()
        )));
    }

    let class = record[0]
        .parse::<u32>()
        .map_err(|e| invalid(format!("class '{}': {}", &record[0], e)))?;

    let age = record[1]
        .parse::<f64>()
        .map_err(|e| invalid(format!("age '{}': {}", &record[1], e)))?;
    if !age.is_finite() || age < 0.0 {
        return Err(invalid(format!("age '{}' must be a non-negative number", &record[1])));
    }

    let male = record[2] == config.male_marker;

    let survived = match &record[3] {
        "0" => false,
        "1" => true,
        other => return Err(invalid(format!("survived flag '{}' must be 0 or 1", other))),
    };

    Ok(PassengerRecord {
        class,
        age,
        male,
        survived,
    })
}
