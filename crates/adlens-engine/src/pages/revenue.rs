use std::collections::BTreeMap;

use adlens_core::DatasetKind;
use schemars::JsonSchema;
use serde::Serialize;

use crate::aggregate::{AggregateOp, GroupOrder, GroupPoint, aggregate};
use crate::errors::EngineError;
use crate::pages::{BarSeries, DataSources};
use crate::selection::{ChoiceSet, Selection};

#[derive(Debug, Clone, Default)]
pub struct RevenueParams {
    pub dimension: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RevenueView {
    pub dataset: String,
    pub rows: u64,
    pub dimension: Selection,
    /// Distinct users per dimension value, most first.
    pub users: BarSeries,
    /// Revenue per dimension value, in the same order as `users`.
    pub revenue: BarSeries,
}

pub fn dimension_choices() -> ChoiceSet {
    ChoiceSet::from_fields(
        "dimension",
        &[
            "countryName",
            "platform",
            "source",
            "network",
            "adUnitFormat",
            "packageName",
            "adUnitName",
        ],
    )
}

pub fn build(sources: &DataSources, params: &RevenueParams) -> Result<RevenueView, EngineError> {
    let dataset = sources.load(DatasetKind::Revenue)?;
    let dimension = dimension_choices().select(params.dimension.as_deref());

    let users = aggregate(
        &dataset,
        &dimension.field,
        &AggregateOp::CountDistinct("userId".to_string()),
        GroupOrder::MetricDescending,
    )?;
    let revenue = aggregate(
        &dataset,
        &dimension.field,
        &AggregateOp::Sum("amount".to_string()),
        GroupOrder::KeyAscending,
    )?;
    let revenue = reindex(&users, revenue);

    tracing::info!(
        event = "page_built",
        page = "revenue",
        rows = dataset.len(),
        dimension = %dimension.field
    );

    Ok(RevenueView {
        dataset: dataset.name().to_string(),
        rows: dataset.len() as u64,
        users: BarSeries::new(&dimension.label, "Number of Users", users),
        revenue: BarSeries::new(&dimension.label, "Revenue Amount", revenue),
        dimension,
    })
}

/// Reorder `points` to follow the key order of `order`.
fn reindex(order: &[GroupPoint], points: Vec<GroupPoint>) -> Vec<GroupPoint> {
    let mut by_key: BTreeMap<_, _> = points
        .into_iter()
        .map(|point| (point.key.clone(), point))
        .collect();
    order
        .iter()
        .filter_map(|point| by_key.remove(&point.key))
        .collect()
}
