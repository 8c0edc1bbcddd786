use std::collections::BTreeSet;
use std::fmt::Write;

use crate::dataset;
use crate::kpi;
use crate::models::{AggregatedRow, Granularity};

fn format_ratio(active_ratio: f64) -> String {
    if active_ratio.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}%", active_ratio * 100.0)
    }
}

pub fn build_report(
    granularity: Granularity,
    years: &BTreeSet<i32>,
    months: &BTreeSet<u32>,
    rows: &[AggregatedRow],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# CoursNotif Usage KPI Report");
    let year_list: Vec<String> = years.iter().map(|year| year.to_string()).collect();
    let month_list: Vec<String> = months
        .iter()
        .map(|month| {
            dataset::month_name(*month)
                .map(str::to_string)
                .unwrap_or_else(|| month.to_string())
        })
        .collect();
    let _ = writeln!(
        output,
        "{} aggregation over years [{}] and months [{}]",
        granularity.label(),
        year_list.join(", "),
        month_list.join(", ")
    );
    let _ = writeln!(output);

    if rows.is_empty() {
        let _ = writeln!(output, "No data matches the selected filters.");
        return output;
    }

    let _ = writeln!(output, "## Headline");
    if let Some(last) = kpi::headline(rows) {
        let verdict = if kpi::on_target(last.active_ratio) {
            "on target"
        } else {
            "below target"
        };
        let _ = writeln!(output, "- Active users: {}", last.max_active_users);
        let _ = writeln!(output, "- Potential users: {}", last.max_potential_users);
        let _ = writeln!(
            output,
            "- Usage: {} ({}, target {:.0}%)",
            format_ratio(last.active_ratio),
            verdict,
            kpi::TARGET_RATIO * 100.0
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Buckets");
    for row in rows {
        let _ = writeln!(
            output,
            "- {}: active {} / potential {} (usage {}, target {:.0})",
            row.bucket_date,
            row.max_active_users,
            row.max_potential_users,
            format_ratio(row.active_ratio),
            row.target_active
        );
    }

    output
}
