use crate::model::{AlignedRecord, BiasLabel, Statistics};

/// Compute MSE, RMSE and mean bias over aligned rows.
///
/// Rows with a missing gain are skipped. If none remain, the means are NaN
/// and the label falls back to Conservative.
pub fn compute_statistics(records: &[AlignedRecord]) -> Statistics {
    let diffs: Vec<f64> = records.iter().filter_map(|r| r.diff).collect();
    let n = diffs.len() as f64;
    let mse = diffs.iter().map(|d| d * d).sum::<f64>() / n;
    let mean_bias = diffs.iter().sum::<f64>() / n;

    Statistics {
        aligned: records.len(),
        scored: diffs.len(),
        mse,
        rmse: mse.sqrt(),
        mean_bias,
        bias: BiasLabel::from_mean_bias(mean_bias),
    }
}
