use adlens_core::DatasetKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateOp, GroupOrder, aggregate};
use crate::derive::{
    CHANNEL_CAMPAIGN_CREATIVE, CLICK_THROUGH_RATE, CONVERSION_RATE, COST_PER_INSTALL,
    INSTALL_RATE, ad_spend_derived_fields, channel_campaign_creative, compute_derived_fields,
};
use crate::errors::EngineError;
use crate::pages::{BarSeries, DataSources};
use crate::selection::{Choice, ChoiceSet, Selection};

/// Which ad-spend file to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdSpendVariant {
    #[default]
    Original,
    WithoutOutliers,
}

impl AdSpendVariant {
    pub fn dataset_kind(self) -> DatasetKind {
        match self {
            AdSpendVariant::Original => DatasetKind::AdSpend,
            AdSpendVariant::WithoutOutliers => DatasetKind::AdSpendWithoutOutliers,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdSpendParams {
    pub variant: AdSpendVariant,
    /// Y axis.
    pub metric: Option<String>,
    /// X axis.
    pub dimension: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AdSpendView {
    pub dataset: String,
    pub variant: AdSpendVariant,
    pub rows: u64,
    pub metric: Selection,
    pub dimension: Selection,
    pub bars: BarSeries,
}

pub fn metric_choices() -> ChoiceSet {
    ChoiceSet::new(
        "metric",
        vec![
            Choice::field("network_clicks"),
            Choice::field("network_impressions"),
            Choice::field("network_installs"),
            Choice::field("network_installs_diff"),
            Choice::field("installs"),
            Choice::field("cost"),
            Choice::labelled("Cost per Install (CPI)", COST_PER_INSTALL),
            Choice::labelled("Install Rate", INSTALL_RATE),
            Choice::labelled("Click-through Rate (CTR)", CLICK_THROUGH_RATE),
            Choice::labelled("Conversion Rate", CONVERSION_RATE),
        ],
    )
}

pub fn dimension_choices() -> ChoiceSet {
    ChoiceSet::from_fields(
        "dimension",
        &[
            "country_name",
            "os_name",
            "channel",
            "campaign",
            "creative",
            CHANNEL_CAMPAIGN_CREATIVE,
        ],
    )
}

pub fn build(sources: &DataSources, params: &AdSpendParams) -> Result<AdSpendView, EngineError> {
    let dataset = sources.load(params.variant.dataset_kind())?;
    let mut fields = ad_spend_derived_fields();
    fields.push(channel_campaign_creative());
    let dataset = compute_derived_fields(&dataset, &fields)?;

    let metric = metric_choices().select(params.metric.as_deref());
    let dimension = dimension_choices().select(params.dimension.as_deref());

    let points = aggregate(
        &dataset,
        &dimension.field,
        &AggregateOp::Sum(metric.field.clone()),
        GroupOrder::KeyAscending,
    )?;
    let bars = BarSeries::new(&dimension.label, &metric.label, points);

    tracing::info!(
        event = "page_built",
        page = "ad_spend",
        variant = ?params.variant,
        rows = dataset.len(),
        metric = %metric.field,
        dimension = %dimension.field
    );

    Ok(AdSpendView {
        dataset: dataset.name().to_string(),
        variant: params.variant,
        rows: dataset.len() as u64,
        metric,
        dimension,
        bars,
    })
}
