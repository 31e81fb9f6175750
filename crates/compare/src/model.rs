use serde::Serialize;

use crate::grid::GridSet;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which side of the comparison a dataset plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Interpolated / predicted pattern.
    Predicted,
    /// Original / measured pattern.
    Actual,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predicted => write!(f, "predicted"),
            Self::Actual => write!(f, "actual"),
        }
    }
}

/// One sampled direction: angles in degrees, normalized gain in dB.
/// `gain` is `None` when the cell was empty or NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleRecord {
    pub phi: f64,
    pub theta: f64,
    pub gain: Option<f64>,
}

/// All records loaded from one file, in file order.
#[derive(Debug, Clone)]
pub struct SampleSet {
    pub source: Source,
    pub records: Vec<SampleRecord>,
}

/// The two pre-loaded patterns to compare.
pub struct CompareInput {
    pub predicted: SampleSet,
    pub actual: SampleSet,
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Exact-equality join key over (phi, theta).
///
/// Negative zero is folded into positive zero so `-0.0` and `0.0` samples align.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AngleKey {
    phi_bits: u64,
    theta_bits: u64,
}

impl AngleKey {
    pub fn new(phi: f64, theta: f64) -> Self {
        Self {
            phi_bits: canonical_bits(phi),
            theta_bits: canonical_bits(theta),
        }
    }
}

fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// A predicted and an actual sample sharing one (phi, theta) key.
///
/// Error fields are `None` when either gain is missing; such rows stay in
/// the join but are skipped by statistics and ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedRecord {
    pub phi: f64,
    pub theta: f64,
    pub predicted: Option<f64>,
    pub actual: Option<f64>,
    /// Signed: predicted - actual.
    pub diff: Option<f64>,
    pub squared_error: Option<f64>,
    pub absolute_error: Option<f64>,
}

impl AlignedRecord {
    pub fn new(phi: f64, theta: f64, predicted: f64, actual: f64) -> Self {
        Self::from_gains(phi, theta, Some(predicted), Some(actual))
    }

    pub fn from_gains(phi: f64, theta: f64, predicted: Option<f64>, actual: Option<f64>) -> Self {
        let diff = predicted.zip(actual).map(|(p, a)| p - a);
        Self {
            phi,
            theta,
            predicted,
            actual,
            diff,
            squared_error: diff.map(|d| d * d),
            absolute_error: diff.map(f64::abs),
        }
    }

    /// Ranking row, if both gains are present.
    pub fn mismatch(&self) -> Option<Mismatch> {
        Some(Mismatch {
            phi: self.phi,
            theta: self.theta,
            predicted: self.predicted?,
            actual: self.actual?,
            diff: self.diff?,
            squared_error: self.squared_error?,
        })
    }
}

/// How many rows each side contributed to, or lost in, the inner join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Coverage {
    pub predicted_rows: usize,
    pub actual_rows: usize,
    pub aligned: usize,
    /// Predicted rows whose key has no actual counterpart.
    pub predicted_only: usize,
    /// Actual rows whose key has no predicted counterpart.
    pub actual_only: usize,
}

impl Coverage {
    pub fn dropped(&self) -> usize {
        self.predicted_only + self.actual_only
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasLabel {
    /// Predicted gain runs high on average.
    Optimistic,
    /// Predicted gain runs low on average, or exactly matches.
    Conservative,
}

impl BiasLabel {
    /// Strictly positive bias is optimistic; zero counts as conservative.
    pub fn from_mean_bias(mean_bias: f64) -> Self {
        if mean_bias > 0.0 {
            Self::Optimistic
        } else {
            Self::Conservative
        }
    }
}

impl std::fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimistic => write!(f, "Optimistic"),
            Self::Conservative => write!(f, "Conservative"),
        }
    }
}

/// Error statistics over scored rows. With no scored rows the numeric fields
/// are NaN (serialized as null).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub aligned: usize,
    /// Aligned rows with both gains present.
    pub scored: usize,
    pub mse: f64,
    pub rmse: f64,
    pub mean_bias: f64,
    pub bias: BiasLabel,
}

/// One row of the worst-mismatch ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mismatch {
    pub phi: f64,
    pub theta: f64,
    pub predicted: f64,
    pub actual: f64,
    pub diff: f64,
    pub squared_error: f64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CompareMeta {
    pub engine_version: String,
    pub run_at: String,
}

/// Immutable result of one comparison run. Everything the report and the
/// viewer need; nothing else is consulted after this is built.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub meta: CompareMeta,
    pub statistics: Statistics,
    pub coverage: Coverage,
    pub top_mismatches: Vec<Mismatch>,
    pub grids: GridSet,
    pub aligned: Vec<AlignedRecord>,
}
