// Console report for a comparison run.
// Pure formatting: result in, text out. Printing happens in main.

use std::fmt::Write;
use std::path::Path;

use patterncmp_compare::model::{Coverage, Mismatch, Statistics};

const RULE_WIDTH: usize = 40;

pub fn loading_lines(predicted: &Path, actual: &Path) -> String {
    format!(
        "Loading predicted data: {}\nLoading actual data:    {}\n",
        predicted.display(),
        actual.display()
    )
}

pub fn aligned_line(coverage: &Coverage) -> String {
    format!("Aligned {} data points for comparison.\n", coverage.aligned)
}

/// Dashed statistics block, six decimals.
pub fn statistics_block(stats: &Statistics) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Mean Squared Error (MSE):       {:.6}", stats.mse);
    let _ = writeln!(out, "Root Mean Squared Error (RMSE): {:.6}", stats.rmse);
    let _ = writeln!(out, "Mean Bias:                      {:.6} dB ({})", stats.mean_bias, stats.bias);
    let _ = writeln!(out, "{rule}");
    out
}

/// Worst-mismatch table. Columns: Phi, Theta, actual, predicted, diff.
pub fn mismatch_table(top: &[Mismatch]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Top {} Largest Differences:", top.len());
    let _ = writeln!(
        out,
        "{:>4}  {:>10}  {:>10}  {:>12}  {:>12}  {:>10}",
        "#", "Phi[deg]", "Theta[deg]", "actual", "predicted", "diff"
    );
    for (i, m) in top.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:>10}  {:>10}  {:>12.6}  {:>12.6}  {:>10.6}",
            i + 1,
            m.phi,
            m.theta,
            m.actual,
            m.predicted,
            m.diff
        );
    }
    out
}

pub fn full_report(stats: &Statistics, coverage: &Coverage, top: &[Mismatch]) -> String {
    let mut out = aligned_line(coverage);
    out.push_str(&statistics_block(stats));
    out.push('\n');
    out.push_str(&mismatch_table(top));
    out
}
