//! Metrics engine for the adlens dashboards.
//!
//! Derived per-row fields, grouped aggregates, the ad-performance summary
//! and the four dashboard pages built on top of them.

pub mod aggregate;
pub mod derive;
pub mod errors;
pub mod pages;
pub mod profile;
pub mod ratio;
pub mod report;
pub mod selection;
pub mod summary;

pub use aggregate::{AggregateOp, GroupOrder, GroupPoint, ScatterPoint, aggregate, scatter};
pub use derive::{
    DerivedField, ad_spend_derived_fields, channel_campaign_creative, compute_derived_fields,
};
pub use errors::EngineError;
pub use pages::{DataSources, PageView};
pub use profile::{ColumnProfile, describe};
pub use ratio::safe_ratio;
pub use report::render_report;
pub use selection::{Choice, ChoiceSet, Selection};
pub use summary::{AggregateSummary, InstallBasis, Metric, MetricFormat, SummaryColumns, summarize};
