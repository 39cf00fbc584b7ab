//! resample-classifiers: Monte Carlo evaluation of binary classifiers.
//!
//! The crate repeatedly splits a passenger table into random train/test
//! partitions, fits a classifier on each training side, records its
//! coefficients and held-out metrics, searches for the accuracy-maximizing
//! decision threshold, and summarizes everything with means and 95%
//! percentile intervals.
//!
//! The classifier is a pluggable capability (`models::ClassifierModel`); an
//! L2-penalized logistic regression is provided.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod metrics;
pub mod models;
pub mod report;
pub mod simulation;
pub mod stats;
pub mod threshold;
