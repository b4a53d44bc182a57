use std::path::PathBuf;

use adlens_engine::pages::{
    AdSpendParams, InstallsParams, PerformanceParams, ad_spend, installs, performance,
};
use adlens_engine::{DataSources, PageView, render_report};

fn sources() -> DataSources {
    DataSources::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/fixtures"))
}

#[test]
fn performance_report_lists_formatted_metrics() {
    let view = performance::build(&sources(), &PerformanceParams::default()).expect("build");
    let report = render_report(&PageView::Performance(view));

    assert!(report.starts_with("# Ad Performance Metrics Dashboard"));
    assert!(report.contains("| Total Revenue | $650.00 |"));
    assert!(report.contains("| Total Impressions | 17,000 |"));
    assert!(report.contains("| Cost per Install (CPI) | $5.00 |"));
    assert!(report.contains("| Conversion Rate | 16.00% |"));
    assert!(report.contains("| Return on Ad Spend (ROAS) | 1.30 |"));
    assert!(report.contains("| Return on Investment (ROI) | 30.00% |"));
    assert!(report.contains("## Revenue on 01.01.2024 per Channel"));
}

#[test]
fn installs_report_explains_fallbacks() {
    let params = InstallsParams {
        dimension: Some("bogus".to_string()),
        country: None,
    };
    let view = installs::build(&sources(), &params).expect("build");
    let report = render_report(&PageView::Installs(view));

    assert!(report.contains("> unknown dimension 'bogus'; showing 'CountryName' instead"));
    assert!(report.contains("## Installations by CountryName"));
    assert!(report.contains("| Germany | 3 |"));
    assert!(report.contains("- France: 2 rows (export: France_installs.csv)"));
    assert!(report.contains("### Summary statistics"));
}

fn unescaped_pipes(line: &str) -> usize {
    line.replace("\\|", "").matches('|').count()
}

#[test]
fn combined_label_rows_keep_two_cells() {
    let params = InstallsParams {
        dimension: Some("channel_campaign_creative".to_string()),
        country: None,
    };
    let view = installs::build(&sources(), &params).expect("build");
    let report = render_report(&PageView::Installs(view));

    assert!(report.contains("| Facebook \\| summer \\| video1 | 2 |"));
    let rows: Vec<&str> = report
        .lines()
        .skip_while(|line| !line.starts_with("## Installations by"))
        .skip(1)
        .take_while(|line| line.starts_with('|'))
        .collect();
    assert_eq!(rows.len(), 7);
    assert!(rows.iter().all(|row| unescaped_pipes(row) == 3));
}

#[test]
fn ad_spend_report_escapes_combined_labels() {
    let params = AdSpendParams {
        dimension: Some("channel_campaign_creative".to_string()),
        ..AdSpendParams::default()
    };
    let view = ad_spend::build(&sources(), &params).expect("build");
    let report = render_report(&PageView::AdSpend(view));

    let data_rows: Vec<&str> = report
        .lines()
        .filter(|line| line.starts_with('|') && line.contains("\\|"))
        .collect();
    assert!(!data_rows.is_empty());
    assert!(data_rows.iter().all(|row| unescaped_pipes(row) == 3));
}
