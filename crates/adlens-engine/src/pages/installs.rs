use adlens_core::{Dataset, DatasetKind, Value, filter_by};
use schemars::JsonSchema;
use serde::Serialize;

use crate::aggregate::{AggregateOp, GroupOrder, aggregate};
use crate::derive::{CHANNEL_CAMPAIGN_CREATIVE, channel_campaign_creative, compute_derived_fields};
use crate::errors::EngineError;
use crate::pages::{BarSeries, DataSources};
use crate::profile::{ColumnProfile, describe};
use crate::selection::{Choice, ChoiceSet, Selection};

const COUNTRY_FIELD: &str = "countryName";

#[derive(Debug, Clone, Default)]
pub struct InstallsParams {
    pub dimension: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct InstallsView {
    pub dataset: String,
    pub rows: u64,
    pub dimension: Selection,
    pub distribution: BarSeries,
    /// Sorted countries offered by the country filter.
    pub countries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// The installs of one country.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CountryDetail {
    pub selection: Selection,
    pub rows: u64,
    pub profiles: Vec<ColumnProfile>,
    pub export_file_name: String,
    /// Filtered records, for CSV export.
    #[serde(skip)]
    pub records: Dataset,
}

pub fn dimension_choices() -> ChoiceSet {
    ChoiceSet::from_fields(
        "dimension",
        &[
            "countryName",
            "adGroupName",
            "trackerName",
            "limitAdTracking",
            "os_name",
            "device",
            "channel",
            "campaign",
            "creative",
            CHANNEL_CAMPAIGN_CREATIVE,
        ],
    )
}

pub fn build(sources: &DataSources, params: &InstallsParams) -> Result<InstallsView, EngineError> {
    let dataset = sources.load(DatasetKind::Installs)?;
    let dataset = compute_derived_fields(&dataset, &[channel_campaign_creative()])?;

    let dimension = dimension_choices().select(params.dimension.as_deref());
    let points = aggregate(
        &dataset,
        &dimension.field,
        &AggregateOp::Count,
        GroupOrder::MetricDescending,
    )?;
    let distribution = BarSeries::new(&dimension.label, "Number of Installations", points)
        .with_title(format!("Installations by {}", dimension.label));

    let countries: Vec<String> = dataset
        .distinct_values(COUNTRY_FIELD)?
        .into_iter()
        .filter_map(|value| match value {
            Value::Null => None,
            other => Some(other.to_csv()),
        })
        .collect();

    let (country, notice) = if countries.is_empty() {
        (None, Some("no countries to filter by".to_string()))
    } else {
        let picker = ChoiceSet::new(
            "country",
            countries
                .iter()
                .map(|name| Choice::labelled(name, name))
                .collect(),
        );
        let selection = picker.select(params.country.as_deref());
        (Some(country_detail(&dataset, selection)?), None)
    };

    tracing::info!(
        event = "page_built",
        page = "installs",
        rows = dataset.len(),
        dimension = %dimension.field
    );

    Ok(InstallsView {
        dataset: dataset.name().to_string(),
        rows: dataset.len() as u64,
        dimension,
        distribution,
        countries,
        country,
        notice,
    })
}

fn country_detail(dataset: &Dataset, selection: Selection) -> Result<CountryDetail, EngineError> {
    let filtered = filter_by(dataset, COUNTRY_FIELD, &Value::from(selection.field.as_str()))?;
    Ok(CountryDetail {
        rows: filtered.len() as u64,
        profiles: describe(&filtered),
        export_file_name: format!("{}_installs.csv", selection.field),
        selection,
        records: filtered,
    })
}
