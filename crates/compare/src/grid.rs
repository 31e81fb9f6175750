use std::collections::HashMap;

use serde::Serialize;

use crate::error::CompareError;
use crate::model::{AlignedRecord, AngleKey};

/// Row-major 2D grid of optional values. Rows follow the phi axis, columns
/// the theta axis of the owning `GridSet`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Option<f64>>,
}

impl Grid {
    fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        self.cells[row * self.cols + col] = value;
    }

    /// (min, max) over present cells. `None` when every cell is missing.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn present(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// The three comparison grids over one shared pair of axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSet {
    /// Unique phi values, ascending. Row keys.
    pub phi_axis: Vec<f64>,
    /// Unique theta values, ascending. Column keys.
    pub theta_axis: Vec<f64>,
    pub predicted: Grid,
    pub actual: Grid,
    pub error: Grid,
}

impl GridSet {
    pub fn rows(&self) -> usize {
        self.phi_axis.len()
    }

    pub fn cols(&self) -> usize {
        self.theta_axis.len()
    }
}

/// Pivot aligned rows into predicted, actual and absolute-error grids.
/// A row with a missing gain leaves that cell (and its error cell) empty.
///
/// Axes are computed once and every grid is filled through the same index
/// maps, so cell (r, c) means the same direction in all three.
pub fn build_grids(records: &[AlignedRecord]) -> Result<GridSet, CompareError> {
    let phi_axis = sorted_unique(records.iter().map(|r| r.phi));
    let theta_axis = sorted_unique(records.iter().map(|r| r.theta));

    let row_of = axis_index(&phi_axis);
    let col_of = axis_index(&theta_axis);

    let (rows, cols) = (phi_axis.len(), theta_axis.len());
    let mut predicted = Grid::empty(rows, cols);
    let mut actual = Grid::empty(rows, cols);
    let mut error = Grid::empty(rows, cols);
    let mut filled = vec![false; rows * cols];

    for r in records {
        let row = row_of[&AngleKey::new(r.phi, 0.0)];
        let col = col_of[&AngleKey::new(r.theta, 0.0)];
        if std::mem::replace(&mut filled[row * cols + col], true) {
            return Err(CompareError::DuplicateKey {
                phi: r.phi,
                theta: r.theta,
            });
        }
        predicted.set(row, col, r.predicted);
        actual.set(row, col, r.actual);
        error.set(row, col, r.absolute_error);
    }

    Ok(GridSet {
        phi_axis,
        theta_axis,
        predicted,
        actual,
        error,
    })
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut axis: Vec<f64> = values.map(|v| if v == 0.0 { 0.0 } else { v }).collect();
    axis.sort_by(f64::total_cmp);
    axis.dedup_by(|a, b| a.to_bits() == b.to_bits());
    axis
}

// Keyed through AngleKey so the -0.0 / 0.0 folding matches the join.
fn axis_index(axis: &[f64]) -> HashMap<AngleKey, usize> {
    axis.iter()
        .enumerate()
        .map(|(i, &v)| (AngleKey::new(v, 0.0), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AlignedRecord> {
        vec![
            AlignedRecord::new(0.0, 0.0, 10.0, 12.0),
            AlignedRecord::new(0.0, 90.0, 8.0, 9.0),
            AlignedRecord::new(180.0, 0.0, 5.0, 4.0),
        ]
    }

    #[test]
    fn axes_sorted_and_shared() {
        let grids = build_grids(&sample()).unwrap();
        assert_eq!(grids.phi_axis, vec![0.0, 180.0]);
        assert_eq!(grids.theta_axis, vec![0.0, 90.0]);
        for g in [&grids.predicted, &grids.actual, &grids.error] {
            assert_eq!((g.rows, g.cols), (2, 2));
        }
    }

    #[test]
    fn cells_line_up_across_grids() {
        let grids = build_grids(&sample()).unwrap();
        assert_eq!(grids.predicted.get(0, 1), Some(8.0));
        assert_eq!(grids.actual.get(0, 1), Some(9.0));
        assert_eq!(grids.error.get(0, 1), Some(1.0));
        assert_eq!(grids.predicted.get(1, 0), Some(5.0));
        assert_eq!(grids.error.get(1, 0), Some(1.0));
    }

    #[test]
    fn absent_cells_are_missing_not_zero() {
        let grids = build_grids(&sample()).unwrap();
        assert_eq!(grids.predicted.get(1, 1), None);
        assert_eq!(grids.error.get(1, 1), None);
        assert_eq!(grids.error.present(), 3);
    }

    #[test]
    fn range_ignores_missing_cells() {
        let grids = build_grids(&sample()).unwrap();
        assert_eq!(grids.predicted.range(), Some((5.0, 10.0)));
        assert_eq!(grids.actual.range(), Some((4.0, 12.0)));
        assert_eq!(grids.error.range(), Some((1.0, 2.0)));
    }

    #[test]
    fn unsorted_input_produces_sorted_axes() {
        let records = vec![
            AlignedRecord::new(270.0, 45.0, 0.0, 0.0),
            AlignedRecord::new(-90.0, 180.0, 0.0, 0.0),
            AlignedRecord::new(90.0, 0.0, 0.0, 0.0),
        ];
        let grids = build_grids(&records).unwrap();
        assert_eq!(grids.phi_axis, vec![-90.0, 90.0, 270.0]);
        assert_eq!(grids.theta_axis, vec![0.0, 45.0, 180.0]);
    }

    #[test]
    fn duplicate_cell_is_rejected() {
        let records = vec![
            AlignedRecord::new(0.0, 0.0, 1.0, 0.0),
            AlignedRecord::new(0.0, 0.0, 2.0, 0.0),
        ];
        let err = build_grids(&records).unwrap_err();
        assert!(matches!(err, CompareError::DuplicateKey { .. }));
    }

    #[test]
    fn out_of_bounds_get_is_none() {
        let grids = build_grids(&sample()).unwrap();
        assert_eq!(grids.predicted.get(5, 0), None);
    }

    #[test]
    fn missing_gain_leaves_cell_empty() {
        let records = vec![
            AlignedRecord::new(0.0, 0.0, 1.0, 0.0),
            AlignedRecord::from_gains(0.0, 90.0, None, Some(4.0)),
        ];
        let grids = build_grids(&records).unwrap();
        assert_eq!(grids.predicted.get(0, 1), None);
        assert_eq!(grids.actual.get(0, 1), Some(4.0));
        assert_eq!(grids.error.get(0, 1), None);
        assert_eq!(grids.error.present(), 1);
        assert_eq!(grids.actual.range(), Some((0.0, 4.0)));
    }

    #[test]
    fn duplicate_cell_with_missing_gain_is_rejected() {
        let records = vec![
            AlignedRecord::from_gains(0.0, 0.0, None, Some(1.0)),
            AlignedRecord::new(0.0, 0.0, 2.0, 0.0),
        ];
        assert!(matches!(build_grids(&records), Err(CompareError::DuplicateKey { .. })));
    }
}
