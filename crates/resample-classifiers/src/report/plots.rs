use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotly::common::{DashType, Line, Marker, Mode};
use plotly::layout::{Annotation, Axis, Layout, Shape, ShapeLine, ShapeType};
use plotly::{Histogram, Plot, Scatter};
use statrs::statistics::Statistics;

use crate::simulation::SimulationOutcome;

const N_BINS: usize = 20;

/// File names written by [`write_plots`], in the order they are produced.
pub const ACCURACY_HISTOGRAM_FILE: &str = "accuracy_histogram.html";
pub const THRESHOLD_HISTOGRAM_FILE: &str = "optimal_threshold_histogram.html";
pub const THRESHOLD_CURVE_FILE: &str = "accuracy_vs_threshold.html";

#[cfg(feature = "static-images")]
const IMAGE_WIDTH: usize = 900;
#[cfg(feature = "static-images")]
const IMAGE_HEIGHT: usize = 600;

/// Histogram of per-trial accuracy at the default threshold.
pub fn plot_accuracy_histogram(accuracies: &[f64]) -> Plot {
    let trace = Histogram::new(accuracies.to_vec())
        .name("Accuracy")
        .n_bins_x(N_BINS)
        .marker(Marker::new().line(Line::new().color("black").width(1.0)));

    let layout = Layout::new()
        .title("Accuracy at threshold 0.5")
        .x_axis(Axis::new().title("Accuracy"))
        .y_axis(Axis::new().title("Number of trials"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Histogram of per-trial optimal thresholds with a dashed mean marker and a
/// mean/SD annotation.
pub fn plot_threshold_histogram(optimal_thresholds: &[f64]) -> Plot {
    let mean = optimal_thresholds.iter().mean();
    let sd = optimal_thresholds.iter().population_std_dev();

    let trace = Histogram::new(optimal_thresholds.to_vec())
        .name("Optimal threshold")
        .n_bins_x(N_BINS)
        .marker(
            Marker::new()
                .color("blue")
                .line(Line::new().color("black").width(1.0)),
        );

    let mean_marker = Shape::new()
        .shape_type(ShapeType::Line)
        .x_ref("x")
        .y_ref("paper")
        .x0(mean)
        .x1(mean)
        .y0(0.0)
        .y1(1.0)
        .line(ShapeLine::new().color("red").width(1.0).dash(DashType::Dash));

    let note = Annotation::new()
        .x_ref("x")
        .y_ref("paper")
        .x(mean + 0.03)
        .y(0.9)
        .show_arrow(false)
        .text(&format!("Mean = {:.2}<br>SD = {:.2}", mean, sd));

    let layout = Layout::new()
        .title("Optimal threshold k for maximum accuracy")
        .x_axis(Axis::new().title("Optimal threshold k"))
        .y_axis(Axis::new().title("Frequency"))
        .shapes(vec![mean_marker])
        .annotations(vec![note]);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Accuracy against threshold with the (first) maximum marked and annotated.
pub fn plot_threshold_curve(thresholds: &[f64], accuracies: &[f64]) -> Plot {
    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(thresholds.to_vec(), accuracies.to_vec())
            .mode(Mode::Lines)
            .name("Accuracy"),
    );

    let mut layout = Layout::new()
        .title("Accuracy for different threshold values (last trial)")
        .x_axis(Axis::new().title("Threshold k"))
        .y_axis(Axis::new().title("Accuracy"));

    let best = thresholds
        .iter()
        .zip(accuracies.iter())
        .fold(None::<(f64, f64)>, |best, (&k, &acc)| match best {
            Some((_, best_acc)) if acc <= best_acc => best,
            _ => Some((k, acc)),
        });

    if let Some((k, acc)) = best {
        plot.add_trace(
            Scatter::new(vec![k], vec![acc])
                .mode(Mode::Markers)
                .name("Maximum accuracy")
                .marker(Marker::new().color("red").size(10)),
        );
        layout = layout.annotations(vec![Annotation::new()
            .x(k)
            .y(acc)
            .text(&format!("({:.2}, {:.2})", k, acc))
            .show_arrow(true)]);
    }

    plot.set_layout(layout);
    plot
}

/// Write the three standard plots for a run into `out_dir` as HTML files.
/// With the `static-images` feature each plot also gets a PNG copy.
///
/// Returns the written paths.
pub fn write_plots(outcome: &SimulationOutcome, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create plot directory: {}", out_dir.display()))?;

    let plots = [
        (
            ACCURACY_HISTOGRAM_FILE,
            plot_accuracy_histogram(&outcome.accuracies()),
        ),
        (
            THRESHOLD_HISTOGRAM_FILE,
            plot_threshold_histogram(&outcome.optimal_thresholds()),
        ),
        (
            THRESHOLD_CURVE_FILE,
            plot_threshold_curve(
                &outcome.final_curve.thresholds,
                &outcome.final_curve.accuracies,
            ),
        ),
    ];

    let mut written = Vec::with_capacity(plots.len());
    for (name, plot) in plots {
        let path = out_dir.join(name);
        std::fs::write(&path, plot.to_html())
            .with_context(|| format!("Failed to write plot: {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        #[cfg(feature = "static-images")]
        written.push(write_png(&plot, &path));
        written.push(path);
    }
    Ok(written)
}

/// Render `plot` to a PNG next to its HTML file.
#[cfg(feature = "static-images")]
fn write_png(plot: &Plot, html_path: &Path) -> PathBuf {
    let png_path = html_path.with_extension("png");
    plot.write_image(
        &png_path,
        plotly::ImageFormat::PNG,
        IMAGE_WIDTH,
        IMAGE_HEIGHT,
        1.0,
    );
    log::info!("Wrote {}", png_path.display());
    png_path
}
