use std::fs::create_dir_all;
use std::path::PathBuf;

use adlens_engine::PageView;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RegistryResult, write_bytes_atomic, write_json_atomic};

/// Metadata captured when a page build starts.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub page: &'static str,
    pub out_dir: PathBuf,
    pub data_dir: PathBuf,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    page: &'a str,
    data_dir: String,
    cli_version: &'static str,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub view_path: PathBuf,
    pub report_path: PathBuf,
}

/// Create `<out>/<timestamp>__run_<id>/` and record the run config.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx
        .out_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));
    create_dir_all(&root)?;

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        page: ctx.page,
        data_dir: ctx.data_dir.display().to_string(),
        cli_version: env!("CARGO_PKG_VERSION"),
    };
    write_json_atomic(&root.join("config.json"), &config)?;

    Ok(RunPaths {
        view_path: root.join("view.json"),
        report_path: root.join("report.md"),
        root,
    })
}

pub fn write_run(paths: &RunPaths, view: &PageView, report: &str) -> RegistryResult<()> {
    write_json_atomic(&paths.view_path, view)?;
    write_bytes_atomic(&paths.report_path, report.as_bytes())
}

#[cfg(test)]
mod tests {
    use adlens_engine::pages::{RevenueParams, revenue};

    use super::*;

    #[test]
    fn run_directory_holds_view_report_and_config() {
        let mut out_dir = std::env::temp_dir();
        out_dir.push(format!("adlens_runs_{}", uuid::Uuid::new_v4()));
        let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/fixtures");

        let ctx = RunContext {
            run_id: "test-run".to_string(),
            started_at: Utc::now(),
            page: "revenue",
            out_dir,
            data_dir: data_dir.clone(),
        };
        let paths = start_run(&ctx).expect("start run");
        assert!(paths.root.ends_with(
            format!("{}__run_test-run", ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ"))
        ));

        let sources = adlens_engine::DataSources::new(data_dir);
        let view = PageView::Revenue(
            revenue::build(&sources, &RevenueParams::default()).expect("build revenue"),
        );
        write_run(&paths, &view, "# report").expect("write run");

        let stored: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&paths.view_path).expect("read view.json"),
        )
        .expect("parse view.json");
        assert_eq!(stored["page"], "revenue");

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(paths.root.join("config.json")).expect("read config.json"),
        )
        .expect("parse config.json");
        assert_eq!(config["run_id"], "test-run");
        assert_eq!(config["page"], "revenue");
    }
}
