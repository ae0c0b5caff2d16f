use std::cmp::Ordering;

use serde_json::Value;
use shared::{
    domain::{Row, SortOrder},
    error::{ProcessError, ProcessErrorCode},
    protocol::Operation,
};
use tracing::debug;

/// In-process data-processing backend. Applies operations in order over a
/// row snapshot; the interaction controller talks to it through its
/// `DataProcessor` seam.
#[derive(Debug, Default)]
pub struct LocalDataProcessor;

impl LocalDataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, rows: Vec<Row>, operations: &[Operation]) -> Result<Vec<Row>, ProcessError> {
        let mut rows = rows;
        for operation in operations {
            rows = match operation {
                Operation::Sort { column, order } => sort_rows(rows, column, *order)?,
                Operation::Filter { .. } => {
                    return Err(ProcessError::new(
                        ProcessErrorCode::UnsupportedOperation,
                        "filter operations are not supported",
                    ))
                }
            };
        }
        Ok(rows)
    }
}

fn sort_rows(mut rows: Vec<Row>, column: &str, order: SortOrder) -> Result<Vec<Row>, ProcessError> {
    if !rows.is_empty() && !rows.iter().any(|row| row.contains_key(column)) {
        return Err(ProcessError::unknown_column(column));
    }
    debug!(column, order = order.as_str(), "processing: sorting rows");
    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(column), b.get(column));
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    Ok(rows)
}

/// Total order over JSON values: missing/null first, then booleans, numbers,
/// strings, and finally composite values, comparing within each kind.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&b.as_f64().unwrap_or(f64::NAN)),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
