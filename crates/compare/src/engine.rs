use std::io;
use std::path::Path;

use crate::align::align;
use crate::config::{ColumnMapping, CompareConfig};
use crate::error::CompareError;
use crate::grid::build_grids;
use crate::model::{CompareInput, CompareMeta, ComparisonResult, SampleRecord, SampleSet, Source};
use crate::rank::top_mismatches;
use crate::stats::compute_statistics;

/// Run the comparison: align, score, rank, pivot.
///
/// Fails without partial output; a returned result is always complete.
pub fn run(config: &CompareConfig, input: &CompareInput) -> Result<ComparisonResult, CompareError> {
    let alignment = align(&input.predicted, &input.actual)?;
    let coverage = alignment.coverage;
    log::debug!(
        "aligned {} rows ({} predicted, {} actual)",
        coverage.aligned,
        coverage.predicted_rows,
        coverage.actual_rows
    );

    if config.report.warn_dropped && coverage.dropped() > 0 {
        log::warn!(
            "inner join dropped {} row(s): {} predicted-only, {} actual-only",
            coverage.dropped(),
            coverage.predicted_only,
            coverage.actual_only
        );
    }

    let statistics = compute_statistics(&alignment.records);
    if statistics.scored == 0 {
        log::warn!("no aligned row has both gain values; statistics are undefined");
    }
    let top = top_mismatches(&alignment.records, config.report.top);
    let grids = build_grids(&alignment.records)?;
    log::debug!(
        "built {}x{} grids, {} error cells, {} scored rows",
        grids.rows(),
        grids.cols(),
        grids.error.present(),
        statistics.scored
    );

    Ok(ComparisonResult {
        meta: CompareMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        statistics,
        coverage,
        top_mismatches: top,
        grids,
        aligned: alignment.records,
    })
}

/// Read a sample file fully into memory and parse it.
pub fn read_samples(
    source: Source,
    path: &Path,
    columns: &ColumnMapping,
) -> Result<SampleSet, CompareError> {
    let csv_data = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CompareError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CompareError::Io(format!("cannot read {}: {e}", path.display())),
    })?;
    let set = load_csv_samples(source, &csv_data, columns)?;
    log::debug!("loaded {} {source} rows from {}", set.records.len(), path.display());
    Ok(set)
}

/// Parse CSV text into samples, locating the required columns by trimmed
/// header name. Every missing column is reported at once.
///
/// Short rows are accepted. An empty, absent or NaN gain cell loads as a
/// missing gain; a row with no usable Phi or Theta is skipped. Text that is
/// not a number fails with `ValueParse`.
pub fn load_csv_samples(
    source: Source,
    csv_data: &str,
    columns: &ColumnMapping,
) -> Result<SampleSet, CompareError> {
    let csv_err = |e: csv::Error| CompareError::Csv {
        source,
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let required = columns.required();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CompareError::MissingColumn {
            source,
            missing,
            available: headers,
        });
    }

    let idx = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let phi_idx = idx(required[0]);
    let theta_idx = idx(required[1]);
    let gain_idx = idx(required[2]);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // Ok(None) for an empty, absent or NaN cell
        let field = |i: usize, column: &str| -> Result<Option<f64>, CompareError> {
            let raw = record.get(i).unwrap_or("").trim();
            if raw.is_empty() {
                return Ok(None);
            }
            match raw.parse::<f64>() {
                Ok(v) if v.is_nan() => Ok(None),
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(CompareError::ValueParse {
                    source,
                    line,
                    column: column.into(),
                    value: raw.into(),
                }),
            }
        };

        let phi = field(phi_idx, required[0])?;
        let theta = field(theta_idx, required[1])?;
        let gain = field(gain_idx, required[2])?;
        match (phi, theta) {
            (Some(phi), Some(theta)) => records.push(SampleRecord { phi, theta, gain }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} {source} row(s) without Phi/Theta");
    }
    let missing_gain = records.iter().filter(|r| r.gain.is_none()).count();
    if missing_gain > 0 {
        log::debug!("{missing_gain} {source} row(s) have no gain value");
    }

    Ok(SampleSet { source, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::BiasLabel;

    const PREDICTED: &str = "\
Phi[deg], Theta[deg] , dB10normalize(GainTotal)
0,0,10
0,90,8
180,0,5
";

    const ACTUAL: &str = "\
 Phi[deg],Theta[deg],dB10normalize(GainTotal),Freq [GHz]
0,0,12,10
0,90,9,10
180,0,4,10
";

    fn input(predicted: &str, actual: &str) -> CompareInput {
        let cols = ColumnMapping::default();
        CompareInput {
            predicted: load_csv_samples(Source::Predicted, predicted, &cols).unwrap(),
            actual: load_csv_samples(Source::Actual, actual, &cols).unwrap(),
        }
    }

    #[test]
    fn load_trims_header_names() {
        let set = load_csv_samples(Source::Predicted, PREDICTED, &ColumnMapping::default()).unwrap();
        assert_eq!(set.records.len(), 3);
        assert_eq!(set.records[1], SampleRecord { phi: 0.0, theta: 90.0, gain: Some(8.0) });
    }

    #[test]
    fn load_tolerates_padded_cells() {
        let csv = "Phi[deg],Theta[deg],dB10normalize(GainTotal)\n 10 , 20 , -3.25 \n";
        let set = load_csv_samples(Source::Actual, csv, &ColumnMapping::default()).unwrap();
        assert_eq!(set.records[0], SampleRecord { phi: 10.0, theta: 20.0, gain: Some(-3.25) });
    }

    #[test]
    fn load_reports_every_missing_column() {
        let csv = "Phi[deg],Gain\n0,1\n";
        let err = load_csv_samples(Source::Actual, csv, &ColumnMapping::default()).unwrap_err();
        match err {
            CompareError::MissingColumn { source, missing, available } => {
                assert_eq!(source, Source::Actual);
                assert_eq!(missing, vec!["Theta[deg]", "dB10normalize(GainTotal)"]);
                assert_eq!(available, vec!["Phi[deg]", "Gain"]);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_non_numeric_cell() {
        let csv = "Phi[deg],Theta[deg],dB10normalize(GainTotal)\n0,0,1\n0,x,2\n";
        let err = load_csv_samples(Source::Predicted, csv, &ColumnMapping::default()).unwrap_err();
        match err {
            CompareError::ValueParse { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Theta[deg]");
                assert_eq!(value, "x");
            }
            other => panic!("expected ValueParse, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_infinite_cell() {
        let csv = "Phi[deg],Theta[deg],dB10normalize(GainTotal)\n0,0,inf\n";
        let err = load_csv_samples(Source::Actual, csv, &ColumnMapping::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn load_keeps_empty_and_nan_gain_as_missing() {
        let csv = "Phi[deg],Theta[deg],dB10normalize(GainTotal)\n0,0,1\n0,90,\n0,180,NaN\n";
        let set = load_csv_samples(Source::Predicted, csv, &ColumnMapping::default()).unwrap();
        assert_eq!(set.records.len(), 3);
        assert_eq!(set.records[0].gain, Some(1.0));
        assert_eq!(set.records[1], SampleRecord { phi: 0.0, theta: 90.0, gain: None });
        assert_eq!(set.records[2].gain, None);
    }

    #[test]
    fn load_accepts_short_rows() {
        let csv = "Phi[deg],Theta[deg],dB10normalize(GainTotal),Freq [GHz]\n0,0,1,10\n0,90,2\n0,180\n";
        let set = load_csv_samples(Source::Actual, csv, &ColumnMapping::default()).unwrap();
        assert_eq!(set.records.len(), 3);
        assert_eq!(set.records[1].gain, Some(2.0));
        assert_eq!(set.records[2].gain, None);
    }

    #[test]
    fn load_skips_rows_without_angles() {
        let csv = "Phi[deg],Theta[deg],dB10normalize(GainTotal)\n0,0,1\n,90,2\n";
        let set = load_csv_samples(Source::Actual, csv, &ColumnMapping::default()).unwrap();
        assert_eq!(set.records.len(), 1);
    }

    #[test]
    fn run_scores_only_complete_rows() {
        let predicted = "Phi[deg],Theta[deg],dB10normalize(GainTotal)\n0,0,1\n0,90,\n";
        let result = run(&CompareConfig::default(), &input(predicted, ACTUAL)).unwrap();
        assert_eq!(result.coverage.aligned, 2);
        assert_eq!(result.statistics.scored, 1);
        // 1 - 12
        assert_eq!(result.statistics.mse, 121.0);
        assert_eq!(result.top_mismatches.len(), 1);
        assert_eq!(result.grids.actual.get(0, 1), Some(9.0));
        assert_eq!(result.grids.predicted.get(0, 1), None);
        assert_eq!(result.grids.error.get(0, 1), None);
    }

    #[test]
    fn load_with_custom_columns() {
        let cols = ColumnMapping {
            phi: "phi".into(),
            theta: "theta".into(),
            gain: "g".into(),
        };
        let set = load_csv_samples(Source::Predicted, "theta,g,phi\n1,2,3\n", &cols).unwrap();
        assert_eq!(set.records[0], SampleRecord { phi: 3.0, theta: 1.0, gain: Some(2.0) });
    }

    #[test]
    fn run_end_to_end() {
        let result = run(&CompareConfig::default(), &input(PREDICTED, ACTUAL)).unwrap();
        assert_eq!(result.statistics.aligned, 3);
        assert!((result.statistics.mse - 2.0).abs() < 1e-12);
        assert_eq!(result.statistics.bias, BiasLabel::Conservative);
        assert_eq!(result.top_mismatches.len(), 3);
        assert_eq!(result.top_mismatches[0].diff, -2.0);
        assert_eq!(result.grids.phi_axis, vec![0.0, 180.0]);
        assert_eq!(result.grids.theta_axis, vec![0.0, 90.0]);
        assert_eq!(result.coverage.dropped(), 0);
    }

    #[test]
    fn run_respects_top_setting() {
        let mut config = CompareConfig::default();
        config.report.top = 1;
        let result = run(&config, &input(PREDICTED, ACTUAL)).unwrap();
        assert_eq!(result.top_mismatches.len(), 1);
    }

    #[test]
    fn run_fails_without_overlap() {
        let shifted = "Phi[deg],Theta[deg],dB10normalize(GainTotal)\n-180,0,1\n-90,0,1\n";
        let err = run(&CompareConfig::default(), &input(PREDICTED, shifted)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoOverlap);
    }

    #[test]
    fn read_missing_file_names_path() {
        let path = Path::new("definitely/not/here.csv");
        let err = read_samples(Source::Predicted, path, &ColumnMapping::default()).unwrap_err();
        match err {
            CompareError::FileNotFound { path: p } => assert_eq!(p, path),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pattern.csv");
        std::fs::write(&path, PREDICTED).unwrap();
        let set = read_samples(Source::Predicted, &path, &ColumnMapping::default()).unwrap();
        assert_eq!(set.source, Source::Predicted);
        assert_eq!(set.records.len(), 3);
    }
}
