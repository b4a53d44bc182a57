use std::collections::BTreeMap;

use adlens_core::Dataset;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::ratio::safe_ratio;

/// Which install count feeds conversion rate and install rate.
///
/// The dashboards disagree here (the performance page uses network-reported
/// installs, the ad-spend page tracked installs), so callers choose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InstallBasis {
    Installs,
    #[default]
    NetworkInstalls,
}

/// Column names the summary reads totals from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryColumns {
    pub revenue: String,
    pub users: String,
    pub events: String,
    pub installs: String,
    pub network_installs: String,
    pub impressions: String,
    pub clicks: String,
    pub cost: String,
}

impl Default for SummaryColumns {
    fn default() -> Self {
        Self {
            revenue: "revenue_2024_01_01".to_string(),
            users: "installs/users_2024_01_01".to_string(),
            events: "events_2024_01_01".to_string(),
            installs: "installs".to_string(),
            network_installs: "network_installs".to_string(),
            impressions: "network_impressions".to_string(),
            clicks: "network_clicks".to_string(),
            cost: "cost".to_string(),
        }
    }
}

/// Summary metric names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalRevenue,
    TotalUsers,
    TotalEvents,
    TotalInstalls,
    TotalNetworkInstalls,
    TotalImpressions,
    TotalClicks,
    TotalCost,
    Cpi,
    Cpc,
    Ctr,
    ConversionRate,
    InstallRate,
    Rpi,
    Roas,
    Arpu,
    Roi,
}

/// How a metric is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFormat {
    Currency,
    Count,
    /// Stored as a fraction, shown multiplied by 100.
    Percent,
    Ratio,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::TotalRevenue,
        Metric::TotalUsers,
        Metric::TotalEvents,
        Metric::TotalInstalls,
        Metric::TotalNetworkInstalls,
        Metric::TotalImpressions,
        Metric::TotalClicks,
        Metric::TotalCost,
        Metric::Cpi,
        Metric::Cpc,
        Metric::Ctr,
        Metric::ConversionRate,
        Metric::InstallRate,
        Metric::Rpi,
        Metric::Roas,
        Metric::Arpu,
        Metric::Roi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalRevenue => "Total Revenue",
            Metric::TotalUsers => "Total Users",
            Metric::TotalEvents => "Total Events",
            Metric::TotalInstalls => "Total Installs",
            Metric::TotalNetworkInstalls => "Total Network Installs",
            Metric::TotalImpressions => "Total Impressions",
            Metric::TotalClicks => "Total Clicks",
            Metric::TotalCost => "Total Cost",
            Metric::Cpi => "Cost per Install (CPI)",
            Metric::Cpc => "Cost per Click (CPC)",
            Metric::Ctr => "Click Through Rate (CTR)",
            Metric::ConversionRate => "Conversion Rate",
            Metric::InstallRate => "Install Rate",
            Metric::Rpi => "Revenue per Install (RPI)",
            Metric::Roas => "Return on Ad Spend (ROAS)",
            Metric::Arpu => "Average Revenue per User (ARPU)",
            Metric::Roi => "Return on Investment (ROI)",
        }
    }

    pub fn format(self) -> MetricFormat {
        match self {
            Metric::TotalRevenue
            | Metric::TotalCost
            | Metric::Cpi
            | Metric::Cpc
            | Metric::Rpi
            | Metric::Arpu => MetricFormat::Currency,
            Metric::TotalUsers
            | Metric::TotalEvents
            | Metric::TotalInstalls
            | Metric::TotalNetworkInstalls
            | Metric::TotalImpressions
            | Metric::TotalClicks => MetricFormat::Count,
            Metric::Ctr | Metric::ConversionRate | Metric::InstallRate | Metric::Roi => {
                MetricFormat::Percent
            }
            Metric::Roas => MetricFormat::Ratio,
        }
    }
}

impl MetricFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            MetricFormat::Currency => format!("${}", group_thousands(value, 2)),
            MetricFormat::Count => {
                let decimals = if value.fract() == 0.0 { 0 } else { 2 };
                group_thousands(value, decimals)
            }
            MetricFormat::Percent => format!("{:.2}%", value * 100.0),
            MetricFormat::Ratio => format!("{value:.2}"),
        }
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    if value < 0.0 && grouped.chars().any(|ch| ch != '0' && ch != '.' && ch != ',') {
        grouped.insert(0, '-');
    }
    grouped
}

/// Mapping from metric name to value; ratios are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct AggregateSummary {
    values: BTreeMap<Metric, f64>,
}

impl AggregateSummary {
    pub fn get(&self, metric: Metric) -> f64 {
        self.values.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().map(|(metric, value)| (*metric, *value))
    }
}

/// Totals and guarded ratios across every record of `dataset`.
pub fn summarize(
    dataset: &Dataset,
    columns: &SummaryColumns,
    basis: InstallBasis,
) -> Result<AggregateSummary, EngineError> {
    let revenue = dataset.sum(&columns.revenue)?;
    let users = dataset.sum(&columns.users)?;
    let events = dataset.sum(&columns.events)?;
    let installs = dataset.sum(&columns.installs)?;
    let network_installs = dataset.sum(&columns.network_installs)?;
    let impressions = dataset.sum(&columns.impressions)?;
    let clicks = dataset.sum(&columns.clicks)?;
    let cost = dataset.sum(&columns.cost)?;

    let converted = match basis {
        InstallBasis::Installs => installs,
        InstallBasis::NetworkInstalls => network_installs,
    };

    let values = BTreeMap::from([
        (Metric::TotalRevenue, revenue),
        (Metric::TotalUsers, users),
        (Metric::TotalEvents, events),
        (Metric::TotalInstalls, installs),
        (Metric::TotalNetworkInstalls, network_installs),
        (Metric::TotalImpressions, impressions),
        (Metric::TotalClicks, clicks),
        (Metric::TotalCost, cost),
        (Metric::Cpi, safe_ratio(cost, installs)),
        (Metric::Cpc, safe_ratio(cost, clicks)),
        (Metric::Ctr, safe_ratio(clicks, impressions)),
        (Metric::ConversionRate, safe_ratio(converted, clicks)),
        (Metric::InstallRate, safe_ratio(converted, impressions)),
        (Metric::Rpi, safe_ratio(revenue, installs)),
        (Metric::Roas, safe_ratio(revenue, cost)),
        (Metric::Arpu, safe_ratio(revenue, users)),
        (Metric::Roi, safe_ratio(revenue - cost, cost)),
    ]);

    Ok(AggregateSummary { values })
}
