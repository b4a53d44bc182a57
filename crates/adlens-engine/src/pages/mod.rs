//! Dashboard pages. Each build loads its data from scratch.

pub mod ad_spend;
pub mod installs;
pub mod performance;
pub mod revenue;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use adlens_core::{Dataset, DatasetKind, load_dataset};
use schemars::JsonSchema;
use serde::Serialize;

use crate::aggregate::{GroupPoint, ScatterPoint};
use crate::errors::EngineError;

pub use ad_spend::{AdSpendParams, AdSpendVariant, AdSpendView};
pub use installs::{CountryDetail, InstallsParams, InstallsView};
pub use performance::{PerformanceParams, PerformanceView};
pub use revenue::{RevenueParams, RevenueView};

/// Where each input file lives.
#[derive(Debug, Clone)]
pub struct DataSources {
    data_dir: PathBuf,
    files: HashMap<DatasetKind, PathBuf>,
}

impl DataSources {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            files: HashMap::new(),
        }
    }

    /// Override the file for one dataset; relative paths resolve against the data dir.
    pub fn with_file(mut self, kind: DatasetKind, file: impl Into<PathBuf>) -> Self {
        self.files.insert(kind, file.into());
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, kind: DatasetKind) -> PathBuf {
        match self.files.get(&kind) {
            Some(file) => self.data_dir.join(file),
            None => self.data_dir.join(kind.default_file_name()),
        }
    }

    /// Load a dataset fresh from disk.
    pub fn load(&self, kind: DatasetKind) -> Result<Dataset, EngineError> {
        let path = self.path(kind);
        let dataset = load_dataset(kind, &path)?;
        tracing::info!(
            event = "dataset_loaded",
            dataset = %kind,
            rows = dataset.len()
        );
        Ok(dataset)
    }
}

/// A ranked or naturally ordered bar series.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct BarSeries {
    pub title: String,
    pub dimension: String,
    pub metric: String,
    pub points: Vec<GroupPoint>,
    /// Set when there is nothing to chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl BarSeries {
    pub fn new(dimension: &str, metric: &str, points: Vec<GroupPoint>) -> Self {
        let notice = points
            .is_empty()
            .then(|| format!("no records to chart for {dimension}"));
        Self {
            title: format!("{metric} by {dimension}"),
            dimension: dimension.to_string(),
            metric: metric.to_string(),
            points,
            notice,
        }
    }

    pub fn with_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ScatterSeries {
    pub title: String,
    pub x: String,
    pub y: String,
    pub points: Vec<ScatterPoint>,
}

/// Output of one page build, handed to the rendering layer.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    Performance(PerformanceView),
    Installs(InstallsView),
    Revenue(RevenueView),
    AdSpend(AdSpendView),
}

impl PageView {
    pub fn title(&self) -> &'static str {
        match self {
            PageView::Performance(_) => "Ad Performance Metrics Dashboard",
            PageView::Installs(_) => "Installs Data Exploration",
            PageView::Revenue(_) => "Revenue Data Exploration",
            PageView::AdSpend(_) => "Ad Spend Installs Data Exploration",
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
