use std::path::{Path, PathBuf};

use adlens_core::DatasetKind;
use adlens_engine::{DataSources, InstallBasis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{RegistryError, write_bytes_atomic};

pub const DEFAULT_SETTINGS_FILE: &str = "adlens.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("settings file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// File name of each input, relative to `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    pub installs: PathBuf,
    pub revenue: PathBuf,
    pub ad_spend: PathBuf,
    pub ad_spend_without_outliers: PathBuf,
    pub ad_performance: PathBuf,
}

impl DatasetFiles {
    fn get(&self, kind: DatasetKind) -> &Path {
        match kind {
            DatasetKind::Installs => &self.installs,
            DatasetKind::Revenue => &self.revenue,
            DatasetKind::AdSpend => &self.ad_spend,
            DatasetKind::AdSpendWithoutOutliers => &self.ad_spend_without_outliers,
            DatasetKind::AdPerformance => &self.ad_performance,
        }
    }
}

impl Default for DatasetFiles {
    fn default() -> Self {
        let file = |kind: DatasetKind| PathBuf::from(kind.default_file_name());
        Self {
            installs: file(DatasetKind::Installs),
            revenue: file(DatasetKind::Revenue),
            ad_spend: file(DatasetKind::AdSpend),
            ad_spend_without_outliers: file(DatasetKind::AdSpendWithoutOutliers),
            ad_performance: file(DatasetKind::AdPerformance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,
    /// Append JSON log lines to this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            json_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Install count used by conversion rate and install rate.
    pub install_basis: InstallBasis,
    pub datasets: DatasetFiles,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/processed"),
            install_basis: InstallBasis::NetworkInstalls,
            datasets: DatasetFiles::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    pub fn data_sources(&self) -> DataSources {
        DatasetKind::ALL
            .into_iter()
            .fold(DataSources::new(&self.data_dir), |sources, kind| {
                sources.with_file(kind, self.datasets.get(kind))
            })
    }
}

/// Load settings from `path`.
///
/// When `explicit` is false a missing file yields the defaults; an explicitly
/// requested file must exist.
pub fn load_settings(path: &Path, explicit: bool) -> SettingsResult<Settings> {
    if !path.exists() {
        if explicit {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings, overwrite: bool) -> SettingsResult<()> {
    if path.exists() && !overwrite {
        return Err(SettingsError::AlreadyExists(path.to_path_buf()));
    }
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes())?;
    Ok(())
}
