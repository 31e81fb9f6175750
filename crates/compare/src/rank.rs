use crate::model::{AlignedRecord, Mismatch};

/// The `n` aligned rows with the largest squared error, largest first.
///
/// Stable: rows with equal squared error keep their aligned order. Rows with
/// a missing gain are never ranked.
pub fn top_mismatches(records: &[AlignedRecord], n: usize) -> Vec<Mismatch> {
    let mut scored: Vec<Mismatch> = records.iter().filter_map(AlignedRecord::mismatch).collect();
    scored.sort_by(|a, b| b.squared_error.total_cmp(&a.squared_error));
    scored.truncate(n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(theta: f64, predicted: f64, actual: f64) -> AlignedRecord {
        AlignedRecord::new(0.0, theta, predicted, actual)
    }

    #[test]
    fn ranks_by_descending_squared_error() {
        let records = vec![
            rec(0.0, 1.0, 1.0),
            rec(1.0, 5.0, 1.0),
            rec(2.0, 1.0, 3.0),
            rec(3.0, 0.0, 10.0),
            rec(4.0, 1.5, 1.0),
            rec(5.0, 2.0, 1.0),
            rec(6.0, 7.0, 1.0),
        ];
        let top = top_mismatches(&records, 5);
        let thetas: Vec<f64> = top.iter().map(|m| m.theta).collect();
        assert_eq!(thetas, vec![3.0, 6.0, 1.0, 2.0, 5.0]);
        assert_eq!(top[0].diff, -10.0);
        assert_eq!(top[0].squared_error, 100.0);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let records = vec![rec(0.0, 1.0, 0.0), rec(1.0, 0.0, 1.0), rec(2.0, 1.0, 0.0)];
        let top = top_mismatches(&records, 5);
        let thetas: Vec<f64> = top.iter().map(|m| m.theta).collect();
        assert_eq!(thetas, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn fewer_rows_than_requested() {
        let records = vec![rec(0.0, 1.0, 0.0), rec(1.0, 3.0, 0.0)];
        let top = top_mismatches(&records, 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].theta, 1.0);
    }

    #[test]
    fn missing_gains_are_not_ranked() {
        let records = vec![
            rec(0.0, 1.0, 0.0),
            AlignedRecord::from_gains(0.0, 1.0, Some(50.0), None),
        ];
        let top = top_mismatches(&records, 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].theta, 0.0);
    }
}
