use std::collections::{HashMap, HashSet};

use crate::error::CompareError;
use crate::model::{AlignedRecord, AngleKey, Coverage, SampleSet};

/// Aligned rows plus join bookkeeping.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub records: Vec<AlignedRecord>,
    pub coverage: Coverage,
}

/// Inner join of two sample sets on exact (phi, theta).
///
/// Output follows the actual set's row order; for each actual row, every
/// predicted row with the same key is paired in predicted file order. Rows
/// whose key exists on one side only are dropped and counted in `Coverage`.
pub fn align(predicted: &SampleSet, actual: &SampleSet) -> Result<Alignment, CompareError> {
    let mut predicted_index: HashMap<AngleKey, Vec<usize>> = HashMap::new();
    for (i, rec) in predicted.records.iter().enumerate() {
        predicted_index
            .entry(AngleKey::new(rec.phi, rec.theta))
            .or_default()
            .push(i);
    }

    let mut records = Vec::new();
    let mut matched_keys: HashSet<AngleKey> = HashSet::new();
    let mut actual_only = 0;

    for act in &actual.records {
        let key = AngleKey::new(act.phi, act.theta);
        match predicted_index.get(&key) {
            Some(indices) => {
                matched_keys.insert(key);
                for &pi in indices {
                    let pred = &predicted.records[pi];
                    records.push(AlignedRecord::from_gains(act.phi, act.theta, pred.gain, act.gain));
                }
            }
            None => actual_only += 1,
        }
    }

    if records.is_empty() {
        return Err(CompareError::NoOverlap {
            predicted_rows: predicted.records.len(),
            actual_rows: actual.records.len(),
        });
    }

    let predicted_only = predicted
        .records
        .iter()
        .filter(|r| !matched_keys.contains(&AngleKey::new(r.phi, r.theta)))
        .count();

    let coverage = Coverage {
        predicted_rows: predicted.records.len(),
        actual_rows: actual.records.len(),
        aligned: records.len(),
        predicted_only,
        actual_only,
    };

    Ok(Alignment { records, coverage })
}
