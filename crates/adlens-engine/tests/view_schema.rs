use std::path::PathBuf;

use adlens_engine::pages::{
    AdSpendParams, InstallsParams, PerformanceParams, RevenueParams, ad_spend, installs,
    performance, revenue,
};
use adlens_engine::{DataSources, PageView};
use jsonschema::JSONSchema;
use schemars::schema_for;

fn sources() -> DataSources {
    DataSources::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/fixtures"))
}

#[test]
fn every_page_view_matches_json_schema() {
    let schema = serde_json::to_value(schema_for!(PageView)).expect("serialize json schema");
    let compiled = JSONSchema::compile(&schema).expect("compile json schema");

    let sources = sources();
    let views = vec![
        PageView::Performance(
            performance::build(&sources, &PerformanceParams::default()).expect("performance"),
        ),
        PageView::Installs(
            installs::build(&sources, &InstallsParams::default()).expect("installs"),
        ),
        PageView::Revenue(
            revenue::build(&sources, &RevenueParams::default()).expect("revenue"),
        ),
        PageView::AdSpend(
            ad_spend::build(&sources, &AdSpendParams::default()).expect("ad spend"),
        ),
    ];

    for view in views {
        let json = serde_json::to_value(&view).expect("serialize view");
        assert!(compiled.is_valid(&json), "{} should match schema", view.title());
    }
}

#[test]
fn summary_serializes_as_metric_map() {
    let view = performance::build(&sources(), &PerformanceParams::default()).expect("build");
    let json = serde_json::to_value(PageView::Performance(view)).expect("serialize view");

    assert_eq!(json["page"], "performance");
    assert_eq!(json["summary"]["cpi"], 5.0);
    assert_eq!(json["summary"]["total_cost"], 500.0);
    assert_eq!(json["install_basis"], "network_installs");
}
