use std::collections::BTreeMap;

use adlens_core::{Dataset, FieldType, Value};
use schemars::JsonSchema;
use serde::Serialize;

/// Descriptive statistics for one column.
///
/// Categorical and text columns fill `unique`/`top`/`freq`; numeric columns
/// fill the moments and quartiles.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ColumnProfile {
    pub column: String,
    pub field_type: FieldType,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ColumnProfile {
    fn empty(column: &str, field_type: FieldType, count: u64) -> Self {
        Self {
            column: column.to_string(),
            field_type,
            count,
            unique: None,
            top: None,
            freq: None,
            mean: None,
            std: None,
            min: None,
            p25: None,
            p50: None,
            p75: None,
            max: None,
        }
    }
}

/// Profile every column of `dataset`, in column order.
pub fn describe(dataset: &Dataset) -> Vec<ColumnProfile> {
    dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let values: Vec<&Value> = dataset
                .records()
                .iter()
                .map(|record| record.get(idx))
                .filter(|value| !value.is_null())
                .collect();
            if column.field_type.is_numeric() {
                numeric_profile(&column.name, column.field_type, &values)
            } else {
                categorical_profile(&column.name, column.field_type, &values)
            }
        })
        .collect()
}

fn categorical_profile(name: &str, field_type: FieldType, values: &[&Value]) -> ColumnProfile {
    let mut profile = ColumnProfile::empty(name, field_type, values.len() as u64);
    let mut frequencies: BTreeMap<&Value, u64> = BTreeMap::new();
    for value in values {
        *frequencies.entry(*value).or_default() += 1;
    }

    profile.unique = Some(frequencies.len() as u64);
    // First value wins ties, keeping the output deterministic.
    let mut top: Option<(&Value, u64)> = None;
    for (value, count) in frequencies {
        if top.is_none_or(|(_, best)| count > best) {
            top = Some((value, count));
        }
    }
    if let Some((value, count)) = top {
        profile.top = Some(value.clone());
        profile.freq = Some(count);
    }
    profile
}

fn numeric_profile(name: &str, field_type: FieldType, values: &[&Value]) -> ColumnProfile {
    let mut numbers: Vec<f64> = values.iter().filter_map(|value| value.as_f64()).collect();
    let mut profile = ColumnProfile::empty(name, field_type, numbers.len() as u64);
    if numbers.is_empty() {
        return profile;
    }

    numbers.sort_by(f64::total_cmp);
    let count = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / count;

    profile.mean = Some(mean);
    if numbers.len() > 1 {
        let variance = numbers
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / (count - 1.0);
        profile.std = Some(variance.sqrt());
    }
    profile.min = numbers.first().copied();
    profile.p25 = Some(quantile(&numbers, 0.25));
    profile.p50 = Some(quantile(&numbers, 0.5));
    profile.p75 = Some(quantile(&numbers, 0.75));
    profile.max = numbers.last().copied();
    profile
}

/// Linear interpolation between the closest order statistics.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use adlens_core::Column;

    use super::*;

    fn sample() -> Dataset {
        let mut dataset = Dataset::new(
            "ad_spend",
            vec![
                Column::new("channel", FieldType::Category),
                Column::new("cost", FieldType::Float),
            ],
        );
        dataset.push(vec!["Facebook".into(), Value::Float(1.0)]);
        dataset.push(vec!["Google".into(), Value::Float(2.0)]);
        dataset.push(vec!["Facebook".into(), Value::Float(3.0)]);
        dataset.push(vec!["TikTok".into(), Value::Float(4.0)]);
        dataset.push(vec![Value::Null, Value::Null]);
        dataset
    }

    #[test]
    fn categorical_columns_report_top_value() {
        let profiles = describe(&sample());
        let channel = &profiles[0];
        assert_eq!(channel.count, 4);
        assert_eq!(channel.unique, Some(3));
        assert_eq!(channel.top, Some(Value::from("Facebook")));
        assert_eq!(channel.freq, Some(2));
        assert_eq!(channel.mean, None);
    }

    #[test]
    fn numeric_columns_report_quartiles() {
        let profiles = describe(&sample());
        let cost = &profiles[1];
        assert_eq!(cost.count, 4);
        assert_eq!(cost.mean, Some(2.5));
        assert_eq!(cost.min, Some(1.0));
        assert_eq!(cost.p25, Some(1.75));
        assert_eq!(cost.p50, Some(2.5));
        assert_eq!(cost.p75, Some(3.25));
        assert_eq!(cost.max, Some(4.0));
        let std = cost.std.expect("sample std");
        assert!((std - 1.2909944487358056).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_std() {
        let mut dataset = Dataset::new("x", vec![Column::new("cost", FieldType::Float)]);
        dataset.push(vec![Value::Float(7.0)]);
        let profile = &describe(&dataset)[0];
        assert_eq!(profile.std, None);
        assert_eq!(profile.p75, Some(7.0));
    }
}
