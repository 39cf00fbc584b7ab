use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::report::plots::{plot_accuracy_histogram, plot_threshold_curve, plot_threshold_histogram};
use crate::report::summary::quantity_label;
use crate::simulation::SimulationOutcome;
use crate::stats::{AggregateReport, TrackedQuantity};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

fn quantity_row(quantity: &TrackedQuantity) -> Markup {
    html! {
        tr {
            td { (quantity_label(&quantity.name)) }
            @match &quantity.summary {
                Some(s) => {
                    td { (format!("{:.3}", s.mean)) }
                    td { (format!("{:.3}", s.std_dev)) }
                    td { (format!("[{:.3}, {:.3}]", s.lower, s.upper)) }
                    td { (format!("{:.3}", s.interval_width())) }
                    td { (s.n_undefined) }
                }
                None => {
                    td colspan="4" { "undefined" }
                    td { "all" }
                }
            }
        }
    }
}

/// Standalone HTML page with the summary table, the three plots and the
/// run configuration.
///
/// `config_json` is shown verbatim in a code block.
pub fn build_html_report(
    report: &AggregateReport,
    outcome: &SimulationOutcome,
    config_json: &str,
) -> String {
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let plots = [
        ("accuracy-histogram", plot_accuracy_histogram(&outcome.accuracies())),
        (
            "threshold-histogram",
            plot_threshold_histogram(&outcome.optimal_thresholds()),
        ),
        (
            "threshold-curve",
            plot_threshold_curve(
                &outcome.final_curve.thresholds,
                &outcome.final_curve.accuracies,
            ),
        ),
    ];

    let page = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Resampling report" }
                script src=(PLOTLY_JS) {}
                style {
                    "body { font-family: sans-serif; margin: 2em; }
                    table { border-collapse: collapse; }
                    td, th { border: 1px solid #ccc; padding: 4px 8px; text-align: right; }
                    td:first-child { text-align: left; }
                    .code-container {
                        background-color: #f5f5f5;
                        padding: 10px;
                        border-radius: 5px;
                        overflow-x: auto;
                        font-family: monospace;
                        white-space: pre-wrap;
                    }"
                }
            }
            body {
                h1 { "Resampling report" }
                p { "Generated " (generated) " from " (report.n_trials) " trials at threshold 0.5." }
                @if outcome.n_skipped > 0 {
                    p { (outcome.n_skipped) " trials were skipped because their training fold could not be fitted." }
                }

                h2 { "Summary" }
                table {
                    tr {
                        th { "Quantity" }
                        th { "Mean" }
                        th { "SD" }
                        th { "95% interval" }
                        th { "Width" }
                        th { "Undefined trials" }
                    }
                    @for quantity in report.quantities() {
                        (quantity_row(quantity))
                    }
                    (quantity_row(&report.optimal_threshold))
                    (quantity_row(&report.optimal_accuracy))
                }

                h2 { "Plots" }
                @for (id, plot) in &plots {
                    div { (PreEscaped(plot.to_inline_html(Some(*id)))) }
                }

                h2 { "Configuration" }
                div class="code-container" {
                    pre { code { (config_json) } }
                }
            }
        }
    };
    page.into_string()
}
