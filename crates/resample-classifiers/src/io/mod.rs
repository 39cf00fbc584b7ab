//! IO utilities for loading passenger tables.

pub mod passengers;

pub use passengers::{
    parse_passenger_records, read_passenger_dataset, read_passenger_records, InputConfig,
};
