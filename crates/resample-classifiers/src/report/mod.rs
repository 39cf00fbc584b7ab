//! Reporting and plotting helpers.
//!
//! `summary` turns an `AggregateReport` into the fixed console lines,
//! `plots` converts the per-trial sequences into `plotly::Plot`s that can be
//! written as standalone HTML files, and `html` assembles both into a single
//! report page.
pub mod html;
pub mod plots;
pub mod summary;

pub use html::build_html_report;
pub use plots::{plot_accuracy_histogram, plot_threshold_curve, plot_threshold_histogram, write_plots};
pub use summary::{format_report, quantity_label};
