use crate::stats::{AggregateReport, TrackedQuantity};

/// Human readable label for a tracked quantity name.
///
/// Coefficient names come from the dataset columns (`C1`, `age`, `gender`);
/// metric names are the `AggregateReport` field names.
pub fn quantity_label(name: &str) -> String {
    match name {
        "age" => "Mean weight of age".to_string(),
        "gender" => "Mean weight of male gender".to_string(),
        "accuracy" => "Mean accuracy".to_string(),
        "sensitivity" => "Mean sensitivity".to_string(),
        "specificity" => "Mean specificity".to_string(),
        "ppv" => "Mean pos. pred. val.".to_string(),
        "auroc" => "Mean AUROC".to_string(),
        "optimal_threshold" => "Mean optimal threshold".to_string(),
        "optimal_accuracy" => "Mean accuracy at optimal threshold".to_string(),
        other => format!("Mean weight of {}", other),
    }
}

fn format_line(quantity: &TrackedQuantity, n_trials: usize) -> String {
    let label = quantity_label(&quantity.name);
    match &quantity.summary {
        Some(s) if s.n_undefined == 0 => format!(
            "{} = {:.3}, 95% interval = {:.3}",
            label,
            s.mean,
            s.interval_width()
        ),
        Some(s) => format!(
            "{} = {:.3}, 95% interval = {:.3} (undefined in {} of {} trials, excluded)",
            label,
            s.mean,
            s.interval_width(),
            s.n_undefined,
            n_trials
        ),
        None => format!("{} = undefined in all {} trials", label, n_trials),
    }
}

/// Console report, one line per tracked quantity.
///
/// Order: one coefficient per class column, age, gender, accuracy,
/// sensitivity, specificity, positive predictive value, AUROC, followed by
/// the optimal threshold mean and standard deviation.
pub fn format_report(report: &AggregateReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Averages over {} trials with threshold 0.5",
        report.n_trials
    )];
    lines.extend(
        report
            .quantities()
            .into_iter()
            .map(|q| format_line(q, report.n_trials)),
    );
    if let Some(k) = &report.optimal_threshold.summary {
        let acc = report
            .optimal_accuracy
            .summary
            .map(|s| format!(", mean accuracy at optimum = {:.3}", s.mean))
            .unwrap_or_default();
        lines.push(format!(
            "Optimal threshold k: mean = {:.3}, SD = {:.3}{}",
            k.mean, k.std_dev, acc
        ));
    }
    lines
}
