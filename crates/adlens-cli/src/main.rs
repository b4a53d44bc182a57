mod registry;
mod settings;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use adlens_core::{DatasetKind, Value, filter_by, write_csv};
use adlens_engine::pages::{
    AdSpendParams, AdSpendVariant, InstallsParams, PerformanceParams, RevenueParams, ad_spend,
    installs, performance, revenue,
};
use adlens_engine::{DataSources, EngineError, InstallBasis, PageView, render_report};
use clap::{Args, Parser, Subcommand, ValueEnum};
use registry::{RegistryError, RunContext, init_logging, start_run, write_bytes_atomic, write_run};
use settings::{DEFAULT_SETTINGS_FILE, Settings, SettingsError, load_settings, save_settings};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Data(#[from] adlens_core::Error),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Parser, Debug)]
#[command(name = "adlens", version, about = "App install, revenue and ad-spend metrics")]
struct Cli {
    /// Settings file (TOML).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory holding the input CSV files; overrides the settings file.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Key metrics, per-channel bars and scatter series.
    Performance(PerformanceArgs),
    /// Install distribution by dimension and the per-country filter.
    Installs(InstallsArgs),
    /// Distinct users and revenue by dimension.
    Revenue(RevenueArgs),
    /// Ad-spend metrics summed by dimension.
    AdSpend(AdSpendArgs),
    /// Write a dataset, optionally filtered on one field, as CSV.
    Export(ExportArgs),
    /// Print the JSON Schema of page views.
    Schema,
    /// Write a settings file with default values.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output format on stdout.
    #[arg(long, value_enum, default_value_t = Format::Markdown)]
    format: Format,
    /// Also write view.json and report.md into a run directory under DIR.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PerformanceArgs {
    /// Metric shown per channel (label or column name).
    #[arg(long)]
    metric: Option<String>,
    /// Install count used for conversion and install rates; overrides settings.
    #[arg(long, value_enum)]
    basis: Option<Basis>,
    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args, Debug)]
struct InstallsArgs {
    /// Dimension to group installs by.
    #[arg(long)]
    dimension: Option<String>,
    /// Country for the filtered view.
    #[arg(long)]
    country: Option<String>,
    /// Write the filtered country data as CSV (`-` for stdout). Without a
    /// value the file is named after the country.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    export: Option<String>,
    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args, Debug)]
struct RevenueArgs {
    #[arg(long)]
    dimension: Option<String>,
    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args, Debug)]
struct AdSpendArgs {
    #[arg(long, value_enum, default_value_t = Variant::Original)]
    variant: Variant,
    /// Y-axis metric.
    #[arg(long)]
    metric: Option<String>,
    /// X-axis dimension.
    #[arg(long)]
    dimension: Option<String>,
    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, value_enum)]
    dataset: Dataset,
    /// Field to filter on; requires --value.
    #[arg(long, requires = "value")]
    field: Option<String>,
    #[arg(long, requires = "field")]
    value: Option<String>,
    /// Output path; stdout when omitted or `-`.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InitConfigArgs {
    /// Overwrite an existing file.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Markdown,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Basis {
    Installs,
    NetworkInstalls,
}

impl From<Basis> for InstallBasis {
    fn from(value: Basis) -> Self {
        match value {
            Basis::Installs => InstallBasis::Installs,
            Basis::NetworkInstalls => InstallBasis::NetworkInstalls,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Variant {
    Original,
    WithoutOutliers,
}

impl From<Variant> for AdSpendVariant {
    fn from(value: Variant) -> Self {
        match value {
            Variant::Original => AdSpendVariant::Original,
            Variant::WithoutOutliers => AdSpendVariant::WithoutOutliers,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Dataset {
    Installs,
    Revenue,
    AdSpend,
    AdSpendWithoutOutliers,
    AdPerformance,
}

impl From<Dataset> for DatasetKind {
    fn from(value: Dataset) -> Self {
        match value {
            Dataset::Installs => DatasetKind::Installs,
            Dataset::Revenue => DatasetKind::Revenue,
            Dataset::AdSpend => DatasetKind::AdSpend,
            Dataset::AdSpendWithoutOutliers => DatasetKind::AdSpendWithoutOutliers,
            Dataset::AdPerformance => DatasetKind::AdPerformance,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config,
        data_dir,
        command,
    } = cli;

    let explicit = config.is_some();
    let config_path = config.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

    if let Command::InitConfig(args) = &command {
        save_settings(&config_path, &Settings::default(), args.force)?;
        println!("settings_path={}", config_path.display());
        return Ok(());
    }

    let mut settings = load_settings(&config_path, explicit)?;
    if let Some(data_dir) = data_dir {
        settings.data_dir = data_dir;
    }
    init_logging(&settings.logging)?;

    let sources = settings.data_sources();
    tracing::info!(
        event = "command_started",
        data_dir = %sources.data_dir().display()
    );

    match command {
        Command::Performance(args) => {
            let params = PerformanceParams {
                metric: args.metric,
                basis: args.basis.map(InstallBasis::from).unwrap_or(settings.install_basis),
            };
            let view = PageView::Performance(performance::build(&sources, &params)?);
            emit(&view, &args.render, &sources, "performance")
        }
        Command::Installs(args) => run_installs(args, &sources),
        Command::Revenue(args) => {
            let params = RevenueParams {
                dimension: args.dimension,
            };
            let view = PageView::Revenue(revenue::build(&sources, &params)?);
            emit(&view, &args.render, &sources, "revenue")
        }
        Command::AdSpend(args) => {
            let params = AdSpendParams {
                variant: args.variant.into(),
                metric: args.metric,
                dimension: args.dimension,
            };
            let view = PageView::AdSpend(ad_spend::build(&sources, &params)?);
            emit(&view, &args.render, &sources, "ad_spend")
        }
        Command::Export(args) => run_export(args, &sources),
        Command::Schema => {
            let schema = schemars::schema_for!(PageView);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::InitConfig(_) => Ok(()),
    }
}

fn run_installs(args: InstallsArgs, sources: &DataSources) -> Result<(), CliError> {
    let params = InstallsParams {
        dimension: args.dimension,
        country: args.country,
    };
    let view = installs::build(sources, &params)?;

    if let Some(target) = &args.export {
        let detail = view.country.as_ref().ok_or_else(|| {
            CliError::InvalidArgument("no country data available to export".to_string())
        })?;
        let target = if target.is_empty() {
            PathBuf::from(&detail.export_file_name)
        } else {
            PathBuf::from(target)
        };
        write_export(&detail.records, Some(&target))?;
    }

    emit(&PageView::Installs(view), &args.render, sources, "installs")
}

fn run_export(args: ExportArgs, sources: &DataSources) -> Result<(), CliError> {
    let kind = DatasetKind::from(args.dataset);
    let dataset = sources.load(kind)?;

    let dataset = match (args.field, args.value) {
        (Some(field), Some(raw)) => {
            let idx = dataset.require_column(&field)?;
            let field_type = dataset.columns()[idx].field_type;
            let value = Value::parse(field_type, &raw).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "'{raw}' is not {} (field '{field}')",
                    field_type.describe()
                ))
            })?;
            filter_by(&dataset, &field, &value)?
        }
        _ => dataset,
    };

    tracing::info!(event = "export_started", dataset = %kind, rows = dataset.len());
    write_export(&dataset, args.output.as_deref())
}

fn write_export(
    dataset: &adlens_core::Dataset,
    target: Option<&std::path::Path>,
) -> Result<(), CliError> {
    match target {
        Some(path) if path != std::path::Path::new("-") => {
            let mut buffer = Vec::new();
            write_csv(dataset, &mut buffer)?;
            write_bytes_atomic(path, &buffer)?;
            tracing::info!(
                event = "export_written",
                path = %path.display(),
                rows = dataset.len(),
                bytes = buffer.len()
            );
        }
        _ => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_csv(dataset, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn emit(
    view: &PageView,
    render: &RenderArgs,
    sources: &DataSources,
    page: &'static str,
) -> Result<(), CliError> {
    let report = render_report(view);

    match render.format {
        Format::Markdown => println!("{report}"),
        Format::Json => println!("{}", view.to_json_pretty()?),
    }

    if let Some(out_dir) = &render.out {
        let ctx = RunContext {
            run_id: Uuid::new_v4().to_string(),
            started_at: chrono::Utc::now(),
            page,
            out_dir: out_dir.clone(),
            data_dir: sources.data_dir().to_path_buf(),
        };
        let paths = start_run(&ctx)?;
        write_run(&paths, view, &report)?;
        tracing::info!(
            event = "run_written",
            run_id = %ctx.run_id,
            path = %paths.root.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_export_flag_uses_country_file_name() {
        let cli = Cli::try_parse_from(["adlens", "installs", "--country", "France", "--export"])
            .expect("parse");
        let Command::Installs(args) = cli.command else {
            panic!("expected installs command");
        };
        assert_eq!(args.export.as_deref(), Some(""));
        assert_eq!(args.country.as_deref(), Some("France"));
    }

    #[test]
    fn export_filter_needs_field_and_value() {
        let err = Cli::try_parse_from([
            "adlens",
            "export",
            "--dataset",
            "installs",
            "--field",
            "channel",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "adlens",
            "ad-spend",
            "--variant",
            "without-outliers",
            "--data-dir",
            "data/fixtures",
            "--format",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.data_dir, Some(PathBuf::from("data/fixtures")));
        let Command::AdSpend(args) = cli.command else {
            panic!("expected ad-spend command");
        };
        assert!(matches!(args.variant, Variant::WithoutOutliers));
        assert!(matches!(args.render.format, Format::Json));
    }
}
