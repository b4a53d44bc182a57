use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declared type of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text (identifiers, user ids).
    Text,
    /// Categorical label usable as a chart dimension.
    Category,
    Float,
}

impl FieldType {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Float)
    }

    pub fn describe(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Category => "a category",
            FieldType::Float => "a number",
        }
    }
}

/// Column metadata for a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    pub field_type: FieldType,
}

impl Column {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Input files the dashboards read, each with a fixed column contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Installs,
    Revenue,
    AdSpend,
    AdSpendWithoutOutliers,
    AdPerformance,
}

const INSTALLS: &[(&str, FieldType)] = &[
    ("countryName", FieldType::Category),
    ("adGroupName", FieldType::Category),
    ("trackerName", FieldType::Category),
    ("limitAdTracking", FieldType::Category),
    ("os_name", FieldType::Category),
    ("device", FieldType::Category),
    ("channel", FieldType::Category),
    ("campaign", FieldType::Category),
    ("creative", FieldType::Category),
];

const REVENUE: &[(&str, FieldType)] = &[
    ("userId", FieldType::Text),
    ("amount", FieldType::Float),
    ("countryName", FieldType::Category),
    ("platform", FieldType::Category),
    ("source", FieldType::Category),
    ("network", FieldType::Category),
    ("adUnitFormat", FieldType::Category),
    ("packageName", FieldType::Category),
    ("adUnitName", FieldType::Category),
];

// Count-like columns are floats: the preparation stage writes them as `12.0`.
const AD_SPEND: &[(&str, FieldType)] = &[
    ("country_name", FieldType::Category),
    ("os_name", FieldType::Category),
    ("channel", FieldType::Category),
    ("campaign", FieldType::Category),
    ("creative", FieldType::Category),
    ("network_clicks", FieldType::Float),
    ("network_impressions", FieldType::Float),
    ("network_installs", FieldType::Float),
    ("network_installs_diff", FieldType::Float),
    ("installs", FieldType::Float),
    ("cost", FieldType::Float),
];

const AD_PERFORMANCE: &[(&str, FieldType)] = &[
    ("channel", FieldType::Category),
    ("revenue_2024_01_01", FieldType::Float),
    ("installs/users_2024_01_01", FieldType::Float),
    ("events_2024_01_01", FieldType::Float),
    ("installs", FieldType::Float),
    ("network_installs", FieldType::Float),
    ("network_impressions", FieldType::Float),
    ("network_clicks", FieldType::Float),
    ("cost", FieldType::Float),
];

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Installs,
        DatasetKind::Revenue,
        DatasetKind::AdSpend,
        DatasetKind::AdSpendWithoutOutliers,
        DatasetKind::AdPerformance,
    ];

    /// Stable identifier, also used as the dataset name.
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Installs => "installs",
            DatasetKind::Revenue => "revenue",
            DatasetKind::AdSpend => "ad_spend",
            DatasetKind::AdSpendWithoutOutliers => "ad_spend_without_outliers",
            DatasetKind::AdPerformance => "ad_performance",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            DatasetKind::Installs => "installs.csv",
            DatasetKind::Revenue => "revenue.csv",
            DatasetKind::AdSpend => "ad_spend_installs.csv",
            DatasetKind::AdSpendWithoutOutliers => "ad_spend_installs_without_outliers.csv",
            DatasetKind::AdPerformance => "ad_performance_metrics_per_channel.csv",
        }
    }

    /// Required columns and their declared types.
    pub fn contract(self) -> Vec<Column> {
        let entries = match self {
            DatasetKind::Installs => INSTALLS,
            DatasetKind::Revenue => REVENUE,
            DatasetKind::AdSpend | DatasetKind::AdSpendWithoutOutliers => AD_SPEND,
            DatasetKind::AdPerformance => AD_PERFORMANCE,
        };
        entries
            .iter()
            .map(|(name, field_type)| Column::new(*name, *field_type))
            .collect()
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
