//! Per-feature standardization of the record table.

use crate::data::record::{FinancialRecord, NUMERIC_FIELDS};

/// Standardize every numeric field (label included) to zero mean and
/// unit variance across the whole table, iterating the explicit field
/// descriptor list. A field with zero population variance normalizes to
/// 0.0 for every record instead of dividing by zero.
pub fn normalize_records(records: &mut [FinancialRecord]) {
    if records.is_empty() {
        return;
    }

    for field in NUMERIC_FIELDS {
        let n = records.len() as f64;

        let mean = records.iter().map(|r| (field.get)(r)).sum::<f64>() / n;
        let variance = records
            .iter()
            .map(|r| {
                let d = (field.get)(r) - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let stddev = variance.sqrt();

        for record in records.iter_mut() {
            let value = (field.get)(record);
            let normalized = if stddev != 0.0 {
                (value - mean) / stddev
            } else {
                0.0
            };
            (field.set)(record, normalized);
        }
    }
}
