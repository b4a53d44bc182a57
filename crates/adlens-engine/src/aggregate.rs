use std::collections::{BTreeMap, BTreeSet};

use adlens_core::{Dataset, Value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// How each group is reduced to one number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateOp {
    /// Number of records in the group.
    Count,
    /// Sum of a numeric field; empty cells count as zero.
    Sum(String),
    /// Number of distinct non-empty values of a field.
    CountDistinct(String),
}

/// Ordering of the grouped output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Largest metric first; ties by ascending key. Used for ranked bars.
    MetricDescending,
    /// Natural order of the dimension value.
    KeyAscending,
}

/// One bar: a dimension value and its metric.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct GroupPoint {
    pub key: Value,
    pub value: f64,
}

/// One scatter point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

enum Accumulator {
    Count(u64),
    Sum(f64),
    Distinct(BTreeSet<Value>),
}

impl Accumulator {
    fn value(&self) -> f64 {
        match self {
            Accumulator::Count(count) => *count as f64,
            Accumulator::Sum(sum) => *sum,
            Accumulator::Distinct(values) => values.len() as f64,
        }
    }
}

/// Group records by `group_by` and reduce each group with `op`.
///
/// Every record lands in exactly one group; records with an empty key form
/// their own `null` group.
pub fn aggregate(
    dataset: &Dataset,
    group_by: &str,
    op: &AggregateOp,
    order: GroupOrder,
) -> Result<Vec<GroupPoint>, EngineError> {
    let key_idx = dataset.require_column(group_by)?;
    let target_idx = match op {
        AggregateOp::Count => None,
        AggregateOp::Sum(field) | AggregateOp::CountDistinct(field) => {
            Some(dataset.require_column(field)?)
        }
    };

    let mut groups: BTreeMap<Value, Accumulator> = BTreeMap::new();
    for record in dataset.records() {
        let entry = groups
            .entry(record.get(key_idx).clone())
            .or_insert_with(|| match op {
                AggregateOp::Count => Accumulator::Count(0),
                AggregateOp::Sum(_) => Accumulator::Sum(0.0),
                AggregateOp::CountDistinct(_) => Accumulator::Distinct(BTreeSet::new()),
            });

        match (entry, target_idx) {
            (Accumulator::Count(count), _) => *count += 1,
            (Accumulator::Sum(sum), Some(idx)) => *sum += record.get(idx).to_f64_or_zero(),
            (Accumulator::Distinct(values), Some(idx)) => {
                let value = record.get(idx);
                if !value.is_null() {
                    values.insert(value.clone());
                }
            }
            _ => {}
        }
    }

    let mut points: Vec<GroupPoint> = groups
        .into_iter()
        .map(|(key, acc)| GroupPoint {
            value: acc.value(),
            key,
        })
        .collect();

    if order == GroupOrder::MetricDescending {
        // Stable sort keeps ascending keys among equal metrics.
        points.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    Ok(points)
}

/// `(x, y)` pairs in record order; empty cells count as zero.
pub fn scatter(dataset: &Dataset, x: &str, y: &str) -> Result<Vec<ScatterPoint>, EngineError> {
    let x_idx = dataset.require_column(x)?;
    let y_idx = dataset.require_column(y)?;
    Ok(dataset
        .records()
        .iter()
        .map(|record| ScatterPoint {
            x: record.get(x_idx).to_f64_or_zero(),
            y: record.get(y_idx).to_f64_or_zero(),
        })
        .collect())
}
