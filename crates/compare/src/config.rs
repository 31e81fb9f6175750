use serde::Deserialize;

use crate::error::CompareError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Header names of the three required columns. Matched after trimming.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMapping {
    pub phi: String,
    pub theta: String,
    pub gain: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            phi: "Phi[deg]".into(),
            theta: "Theta[deg]".into(),
            gain: "dB10normalize(GainTotal)".into(),
        }
    }
}

impl ColumnMapping {
    /// Required column names in (phi, theta, gain) order, trimmed.
    pub fn required(&self) -> [&str; 3] {
        [self.phi.trim(), self.theta.trim(), self.gain.trim()]
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Length of the worst-mismatch ranking.
    pub top: usize,
    /// Log a warning with the number of rows the inner join dropped.
    pub warn_dropped: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top: 5,
            warn_dropped: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, CompareError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| CompareError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        let names = self.columns.required();
        for (field, name) in ["phi", "theta", "gain"].iter().zip(names) {
            if name.is_empty() {
                return Err(CompareError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
        }

        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(CompareError::ConfigValidation(
                "columns.phi, columns.theta and columns.gain must name distinct columns".into(),
            ));
        }

        if self.report.top == 0 {
            return Err(CompareError::ConfigValidation(
                "report.top must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CompareConfig::from_toml("").unwrap();
        assert_eq!(config.columns.phi, "Phi[deg]");
        assert_eq!(config.columns.theta, "Theta[deg]");
        assert_eq!(config.columns.gain, "dB10normalize(GainTotal)");
        assert_eq!(config.report.top, 5);
        assert!(!config.report.warn_dropped);
    }

    #[test]
    fn partial_override() {
        let config = CompareConfig::from_toml(
            r#"
[columns]
gain = "dB(GainTheta)"

[report]
top = 10
warn_dropped = true
"#,
        )
        .unwrap();
        assert_eq!(config.columns.phi, "Phi[deg]");
        assert_eq!(config.columns.gain, "dB(GainTheta)");
        assert_eq!(config.report.top, 10);
        assert!(config.report.warn_dropped);
    }

    #[test]
    fn required_names_are_trimmed() {
        let config = CompareConfig::from_toml("[columns]\nphi = \"  Phi  \"\n").unwrap();
        assert_eq!(config.columns.required()[0], "Phi");
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = CompareConfig::from_toml("[columns]\nphi = \"a\"\ntheta = \"a\"\n").unwrap_err();
        assert!(matches!(err, CompareError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_blank_column() {
        let err = CompareConfig::from_toml("[columns]\ngain = \"   \"\n").unwrap_err();
        assert!(err.to_string().contains("columns.gain"));
    }

    #[test]
    fn rejects_zero_top() {
        let err = CompareConfig::from_toml("[report]\ntop = 0\n").unwrap_err();
        assert!(matches!(err, CompareError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = CompareConfig::from_toml("[report]\ntpo = 3\n").unwrap_err();
        assert!(matches!(err, CompareError::ConfigParse(_)), "typo should fail deserialization");
    }
}
