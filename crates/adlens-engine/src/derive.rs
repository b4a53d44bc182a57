use adlens_core::{Column, Dataset, FieldType, Value};

use crate::errors::EngineError;
use crate::ratio::safe_ratio;

pub const COST_PER_INSTALL: &str = "cost_per_install";
pub const INSTALL_RATE: &str = "install_rate";
pub const CLICK_THROUGH_RATE: &str = "click_through_rate";
pub const CONVERSION_RATE: &str = "conversion_rate";
pub const CHANNEL_CAMPAIGN_CREATIVE: &str = "channel_campaign_creative";

/// A column computed from other columns of the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivedField {
    /// `numerator / denominator`, zero when the denominator is zero.
    Ratio {
        name: String,
        numerator: String,
        denominator: String,
    },
    /// Text fields joined with a separator; empty cells contribute "".
    Concat {
        name: String,
        fields: Vec<String>,
        separator: String,
    },
}

impl DerivedField {
    pub fn ratio(name: &str, numerator: &str, denominator: &str) -> Self {
        DerivedField::Ratio {
            name: name.to_string(),
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DerivedField::Ratio { name, .. } | DerivedField::Concat { name, .. } => name,
        }
    }
}

/// The four per-row ad-spend ratios.
pub fn ad_spend_derived_fields() -> Vec<DerivedField> {
    vec![
        DerivedField::ratio(COST_PER_INSTALL, "cost", "installs"),
        DerivedField::ratio(INSTALL_RATE, "installs", "network_impressions"),
        DerivedField::ratio(CLICK_THROUGH_RATE, "network_clicks", "network_impressions"),
        DerivedField::ratio(CONVERSION_RATE, "installs", "network_clicks"),
    ]
}

/// `channel | campaign | creative` label.
pub fn channel_campaign_creative() -> DerivedField {
    DerivedField::Concat {
        name: CHANNEL_CAMPAIGN_CREATIVE.to_string(),
        fields: vec![
            "channel".to_string(),
            "campaign".to_string(),
            "creative".to_string(),
        ],
        separator: " | ".to_string(),
    }
}

/// Return a copy of `dataset` with every derived field appended.
///
/// Fields are applied in order, so a later field may read an earlier one.
pub fn compute_derived_fields(
    dataset: &Dataset,
    fields: &[DerivedField],
) -> Result<Dataset, EngineError> {
    let mut derived = dataset.clone();
    for field in fields {
        let (column, values) = evaluate(&derived, field)?;
        derived = derived.with_column(column, values);
    }
    Ok(derived)
}

fn evaluate(dataset: &Dataset, field: &DerivedField) -> Result<(Column, Vec<Value>), EngineError> {
    match field {
        DerivedField::Ratio {
            name,
            numerator,
            denominator,
        } => {
            let num = dataset.require_column(numerator)?;
            let den = dataset.require_column(denominator)?;
            let values = dataset
                .records()
                .iter()
                .map(|record| {
                    Value::Float(safe_ratio(
                        record.get(num).to_f64_or_zero(),
                        record.get(den).to_f64_or_zero(),
                    ))
                })
                .collect();
            Ok((Column::new(name.clone(), FieldType::Float), values))
        }
        DerivedField::Concat {
            name,
            fields,
            separator,
        } => {
            let indexes = fields
                .iter()
                .map(|field| dataset.require_column(field))
                .collect::<Result<Vec<_>, _>>()?;
            let values = dataset
                .records()
                .iter()
                .map(|record| {
                    let parts: Vec<String> =
                        indexes.iter().map(|idx| record.get(*idx).to_csv()).collect();
                    Value::Text(parts.join(separator))
                })
                .collect();
            Ok((Column::new(name.clone(), FieldType::Category), values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spend() -> Dataset {
        let mut dataset = Dataset::new(
            "ad_spend",
            vec![
                Column::new("channel", FieldType::Category),
                Column::new("campaign", FieldType::Category),
                Column::new("creative", FieldType::Category),
                Column::new("network_clicks", FieldType::Float),
                Column::new("network_impressions", FieldType::Float),
                Column::new("installs", FieldType::Float),
                Column::new("cost", FieldType::Float),
            ],
        );
        dataset.push(vec![
            "Facebook".into(),
            "summer".into(),
            "video1".into(),
            Value::Float(100.0),
            Value::Float(1000.0),
            Value::Float(20.0),
            Value::Float(100.0),
        ]);
        dataset.push(vec![
            "TikTok".into(),
            "launch".into(),
            "clip1".into(),
            Value::Float(0.0),
            Value::Float(0.0),
            Value::Float(0.0),
            Value::Float(100.0),
        ]);
        dataset
    }

    fn column(dataset: &Dataset, name: &str) -> Vec<f64> {
        dataset
            .field_values(name)
            .expect("derived column")
            .map(Value::to_f64_or_zero)
            .collect()
    }

    #[test]
    fn ratios_are_computed_per_row() {
        let derived = compute_derived_fields(&spend(), &ad_spend_derived_fields()).expect("derive");
        assert_eq!(column(&derived, COST_PER_INSTALL)[0], 5.0);
        assert_eq!(column(&derived, INSTALL_RATE)[0], 0.02);
        assert_eq!(column(&derived, CLICK_THROUGH_RATE)[0], 0.1);
        assert_eq!(column(&derived, CONVERSION_RATE)[0], 0.2);
    }

    #[test]
    fn zero_denominators_give_zero() {
        let derived = compute_derived_fields(&spend(), &ad_spend_derived_fields()).expect("derive");
        for name in [COST_PER_INSTALL, INSTALL_RATE, CLICK_THROUGH_RATE, CONVERSION_RATE] {
            let value = column(&derived, name)[1];
            assert_eq!(value, 0.0, "{name} should be zero");
        }
    }

    #[test]
    fn source_dataset_is_untouched() {
        let source = spend();
        let derived = compute_derived_fields(&source, &ad_spend_derived_fields()).expect("derive");
        assert_eq!(source.columns().len(), 7);
        assert_eq!(derived.columns().len(), 11);
    }

    #[test]
    fn concat_joins_labels() {
        let derived =
            compute_derived_fields(&spend(), &[channel_campaign_creative()]).expect("derive");
        let labels: Vec<String> = derived
            .field_values(CHANNEL_CAMPAIGN_CREATIVE)
            .expect("label column")
            .map(Value::to_csv)
            .collect();
        assert_eq!(labels, vec!["Facebook | summer | video1", "TikTok | launch | clip1"]);
    }

    #[test]
    fn unknown_operand_is_an_error() {
        let err = compute_derived_fields(&spend(), &[DerivedField::ratio("x", "revenue", "cost")])
            .unwrap_err();
        assert!(err.to_string().contains("unknown field 'revenue'"));
    }
}
