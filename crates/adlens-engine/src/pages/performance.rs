use adlens_core::DatasetKind;
use schemars::JsonSchema;
use serde::Serialize;

use crate::aggregate::{AggregateOp, GroupOrder, aggregate, scatter};
use crate::errors::EngineError;
use crate::pages::{BarSeries, DataSources, ScatterSeries};
use crate::selection::{Choice, ChoiceSet, Selection};
use crate::summary::{AggregateSummary, InstallBasis, SummaryColumns, summarize};

#[derive(Debug, Clone, Default)]
pub struct PerformanceParams {
    /// Metric shown per channel, by label or column name.
    pub metric: Option<String>,
    pub basis: InstallBasis,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PerformanceView {
    pub dataset: String,
    pub rows: u64,
    pub install_basis: InstallBasis,
    pub summary: AggregateSummary,
    pub metric: Selection,
    pub per_channel: BarSeries,
    pub cost_vs_installs: ScatterSeries,
    pub impressions_vs_installs: ScatterSeries,
}

pub fn metric_choices() -> ChoiceSet {
    ChoiceSet::new(
        "metric",
        vec![
            Choice::labelled("Revenue on 01.01.2024", "revenue_2024_01_01"),
            Choice::labelled("Installs on 01.01.2024", "installs/users_2024_01_01"),
            Choice::labelled("Events on 01.01.2024", "events_2024_01_01"),
            Choice::labelled("Installs", "installs"),
            Choice::labelled("Network Installs", "network_installs"),
            Choice::labelled("Network Impressions", "network_impressions"),
            Choice::labelled("Network Clicks", "network_clicks"),
            Choice::labelled("Cost", "cost"),
        ],
    )
}

pub fn build(
    sources: &DataSources,
    params: &PerformanceParams,
) -> Result<PerformanceView, EngineError> {
    let dataset = sources.load(DatasetKind::AdPerformance)?;
    let summary = summarize(&dataset, &SummaryColumns::default(), params.basis)?;

    let metric = metric_choices().select(params.metric.as_deref());
    let points = aggregate(
        &dataset,
        "channel",
        &AggregateOp::Sum(metric.field.clone()),
        GroupOrder::KeyAscending,
    )?;
    let per_channel = BarSeries::new("Channel", &metric.label, points)
        .with_title(format!("{} per Channel", metric.label));

    let cost_vs_installs = ScatterSeries {
        title: "Cost vs. Installs".to_string(),
        x: "cost".to_string(),
        y: "installs".to_string(),
        points: scatter(&dataset, "cost", "installs")?,
    };
    let impressions_vs_installs = ScatterSeries {
        title: "Network Impressions vs. Installs".to_string(),
        x: "network_impressions".to_string(),
        y: "installs".to_string(),
        points: scatter(&dataset, "network_impressions", "installs")?,
    };

    tracing::info!(
        event = "page_built",
        page = "performance",
        rows = dataset.len(),
        metric = %metric.field
    );

    Ok(PerformanceView {
        dataset: dataset.name().to_string(),
        rows: dataset.len() as u64,
        install_basis: params.basis,
        summary,
        metric,
        per_channel,
        cost_vs_installs,
        impressions_vs_installs,
    })
}
