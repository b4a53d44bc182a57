use crate::aggregate::GroupPoint;
use crate::pages::{
    AdSpendView, BarSeries, InstallsView, PageView, PerformanceView, RevenueView, ScatterSeries,
};
use crate::profile::ColumnProfile;
use crate::selection::Selection;
use crate::summary::{InstallBasis, Metric};

/// Render a deterministic markdown report for a page view.
pub fn render_report(view: &PageView) -> String {
    let mut lines = Vec::new();

    lines.push(format!("# {}", view.title()));
    lines.push(String::new());

    match view {
        PageView::Performance(view) => render_performance(&mut lines, view),
        PageView::Installs(view) => render_installs(&mut lines, view),
        PageView::Revenue(view) => render_revenue(&mut lines, view),
        PageView::AdSpend(view) => render_ad_spend(&mut lines, view),
    }

    lines.join("\n")
}

fn render_performance(lines: &mut Vec<String>, view: &PerformanceView) {
    lines.push(format!("- dataset: {} ({} rows)", view.dataset, view.rows));
    let basis = match view.install_basis {
        InstallBasis::Installs => "installs",
        InstallBasis::NetworkInstalls => "network_installs",
    };
    lines.push(format!("- conversion/install rate basis: {basis}"));
    lines.push(String::new());

    lines.push("## Key metrics".to_string());
    lines.push("| metric | value |".to_string());
    lines.push("| --- | --- |".to_string());
    for metric in Metric::ALL {
        let value = view.summary.get(metric);
        lines.push(format!(
            "| {} | {} |",
            escape_cell(metric.label()),
            metric.format().render(value)
        ));
    }
    lines.push(String::new());

    push_selection_notice(lines, &view.metric);
    push_bars(lines, &view.per_channel);
    push_scatter(lines, &view.cost_vs_installs);
    push_scatter(lines, &view.impressions_vs_installs);
}

fn render_installs(lines: &mut Vec<String>, view: &InstallsView) {
    lines.push(format!("- dataset: {} ({} rows)", view.dataset, view.rows));
    lines.push(String::new());

    push_selection_notice(lines, &view.dimension);
    push_bars(lines, &view.distribution);

    lines.push("## Filtered data by country".to_string());
    if let Some(notice) = &view.notice {
        lines.push(format!("> {notice}"));
        lines.push(String::new());
    }
    if let Some(detail) = &view.country {
        push_selection_notice(lines, &detail.selection);
        lines.push(format!(
            "- {}: {} rows (export: {})",
            detail.selection.label, detail.rows, detail.export_file_name
        ));
        lines.push(String::new());
        push_profiles(lines, &detail.profiles);
    }
}

fn render_revenue(lines: &mut Vec<String>, view: &RevenueView) {
    lines.push(format!("- dataset: {} ({} rows)", view.dataset, view.rows));
    lines.push(String::new());

    push_selection_notice(lines, &view.dimension);
    push_bars(lines, &view.users);
    push_bars(lines, &view.revenue);
}

fn render_ad_spend(lines: &mut Vec<String>, view: &AdSpendView) {
    lines.push(format!(
        "- dataset: {} ({} rows, variant {:?})",
        view.dataset, view.rows, view.variant
    ));
    lines.push(String::new());

    push_selection_notice(lines, &view.metric);
    push_selection_notice(lines, &view.dimension);
    push_bars(lines, &view.bars);
}

fn push_selection_notice(lines: &mut Vec<String>, selection: &Selection) {
    if let Some(notice) = &selection.notice {
        lines.push(format!("> {notice}"));
        lines.push(String::new());
    }
}

fn push_bars(lines: &mut Vec<String>, series: &BarSeries) {
    lines.push(format!("## {}", series.title));
    if let Some(notice) = &series.notice {
        lines.push(format!("> {notice}"));
        lines.push(String::new());
        return;
    }
    lines.push(format!(
        "| {} | {} |",
        escape_cell(&series.dimension),
        escape_cell(&series.metric)
    ));
    lines.push("| --- | --- |".to_string());
    for GroupPoint { key, value } in &series.points {
        lines.push(format!(
            "| {} | {} |",
            escape_cell(&key.to_string()),
            format_number(*value)
        ));
    }
    lines.push(String::new());
}

fn push_scatter(lines: &mut Vec<String>, series: &ScatterSeries) {
    lines.push(format!("## {}", series.title));
    lines.push(format!(
        "| {} | {} |",
        escape_cell(&series.x),
        escape_cell(&series.y)
    ));
    lines.push("| --- | --- |".to_string());
    for point in &series.points {
        lines.push(format!(
            "| {} | {} |",
            format_number(point.x),
            format_number(point.y)
        ));
    }
    lines.push(String::new());
}

fn push_profiles(lines: &mut Vec<String>, profiles: &[ColumnProfile]) {
    lines.push("### Summary statistics".to_string());
    lines.push(
        "| column | count | unique | top | freq | mean | std | min | 25% | 50% | 75% | max |"
            .to_string(),
    );
    lines.push(format!("|{}", " --- |".repeat(12)));
    for profile in profiles {
        let cells = [
            profile.unique.map(|value| value.to_string()),
            profile.top.as_ref().map(|value| escape_cell(&value.to_string())),
            profile.freq.map(|value| value.to_string()),
            profile.mean.map(format_number),
            profile.std.map(format_number),
            profile.min.map(format_number),
            profile.p25.map(format_number),
            profile.p50.map(format_number),
            profile.p75.map(format_number),
            profile.max.map(format_number),
        ]
        .map(|cell| cell.unwrap_or_else(|| "-".to_string()));
        lines.push(format!(
            "| {} | {} | {} |",
            escape_cell(&profile.column),
            profile.count,
            cells.join(" | ")
        ));
    }
    lines.push(String::new());
}

/// Keep `|` inside a cell from splitting the row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_have_no_decimals() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.18), "0.1800");
    }

    #[test]
    fn pipes_in_cells_are_escaped() {
        assert_eq!(escape_cell("Facebook | summer"), "Facebook \\| summer");
        assert_eq!(escape_cell("Germany"), "Germany");
    }

    #[test]
    fn empty_series_renders_notice() {
        let mut lines = Vec::new();
        push_bars(&mut lines, &BarSeries::new("Channel", "Cost", Vec::new()));
        assert_eq!(lines[0], "## Cost by Channel");
        assert_eq!(lines[1], "> no records to chart for Channel");
    }
}
