use std::fmt;
use std::path::PathBuf;

use crate::model::Source;

#[derive(Debug)]
pub enum CompareError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty or duplicate column name, bad `top`).
    ConfigValidation(String),
    /// Input file does not exist.
    FileNotFound { path: PathBuf },
    /// One or more required columns absent from a source.
    MissingColumn {
        source: Source,
        missing: Vec<String>,
        available: Vec<String>,
    },
    /// Numeric cell could not be parsed.
    ValueParse {
        source: Source,
        line: u64,
        column: String,
        value: String,
    },
    /// The inner join on (phi, theta) produced no rows.
    NoOverlap { predicted_rows: usize, actual_rows: usize },
    /// Two aligned rows share one (phi, theta) cell, so no grid can be built.
    DuplicateKey { phi: f64, theta: f64 },
    /// CSV framing error.
    Csv { source: Source, message: String },
    /// IO error (file read, etc.).
    Io(String),
}

/// Coarse classification used for exit codes and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidConfig,
    FileNotFound,
    MissingColumn,
    NoOverlap,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidConfig => "invalid_config",
            Self::FileNotFound => "file_not_found",
            Self::MissingColumn => "missing_column",
            Self::NoOverlap => "no_overlap",
            Self::Unexpected => "unexpected",
        }
    }
}

impl CompareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse(_) | Self::ConfigValidation(_) => ErrorKind::InvalidConfig,
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::MissingColumn { .. } => ErrorKind::MissingColumn,
            Self::NoOverlap { .. } => ErrorKind::NoOverlap,
            Self::ValueParse { .. } | Self::DuplicateKey { .. } | Self::Csv { .. } | Self::Io(_) => {
                ErrorKind::Unexpected
            }
        }
    }
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::FileNotFound { path } => write!(f, "file not found: {}", path.display()),
            Self::MissingColumn { source, missing, available } => {
                write!(
                    f,
                    "{source} file missing required column(s): {} (available columns: {})",
                    quoted(missing),
                    quoted(available),
                )
            }
            Self::ValueParse { source, line, column, value } => {
                write!(f, "{source} file, line {line}: cannot parse '{column}' value '{value}' as a number")
            }
            Self::NoOverlap { predicted_rows, actual_rows } => {
                write!(
                    f,
                    "no matching Phi/Theta coordinates found between files \
                     ({predicted_rows} predicted rows, {actual_rows} actual rows); \
                     check that both files use the same angle range convention (e.g. -180..180 vs 0..360)"
                )
            }
            Self::DuplicateKey { phi, theta } => {
                write!(f, "duplicate sample at Phi={phi}, Theta={theta}: cannot build a grid with two values in one cell")
            }
            // csv::Error already prefixes its own "CSV error"
            Self::Csv { source, message } => write!(f, "{source} file: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CompareError {}

fn quoted(names: &[String]) -> String {
    names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_source_and_columns() {
        let err = CompareError::MissingColumn {
            source: Source::Actual,
            missing: vec!["Theta[deg]".into()],
            available: vec!["Phi[deg]".into(), "Gain".into()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("actual file"));
        assert!(msg.contains("'Theta[deg]'"));
        assert!(msg.contains("'Gain'"));
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
    }

    #[test]
    fn no_overlap_suggests_angle_convention() {
        let err = CompareError::NoOverlap { predicted_rows: 3, actual_rows: 4 };
        assert!(err.to_string().contains("-180..180 vs 0..360"));
        assert_eq!(err.kind().as_str(), "no_overlap");
    }

    #[test]
    fn parse_failures_are_unexpected() {
        let err = CompareError::ValueParse {
            source: Source::Predicted,
            line: 7,
            column: "Phi[deg]".into(),
            value: "abc".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn csv_error_prefix_not_doubled() {
        let mut reader = csv::ReaderBuilder::new().from_reader("a,b\n1,2,3\n".as_bytes());
        let csv_err = reader.records().find_map(|r| r.err()).unwrap();
        let err = CompareError::Csv { source: Source::Predicted, message: csv_err.to_string() };
        let msg = err.to_string();
        assert!(msg.starts_with("predicted file: "));
        assert_eq!(msg.matches("CSV error").count(), 1, "{msg}");
    }
}
