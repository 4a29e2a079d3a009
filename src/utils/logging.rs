use took::Took;

use crate::search::SearchReport;
use crate::solver::comparison::Comparison;
use crate::solver::SolutionRecord;

pub fn format_log_method_record_timed(method: &str, record: &SolutionRecord, took: Took) -> String {
    format!("{method} - {}, took: {took}", format_log_record(record))
}

pub fn format_log_record(record: &SolutionRecord) -> String {
    format!(
        "value {} (capacities: {:?}{})",
        record.value,
        record.capacities,
        record
            .duals
            .as_ref()
            .map(|duals| format!(", {} duals", duals.len()))
            .unwrap_or_default(),
    )
}

pub fn format_log_comparison(comparison: &Comparison) -> String {
    format!(
        "factor {} (difference: {}, edge cost sum: {})",
        comparison.factor, comparison.difference, comparison.edge_cost_sum,
    )
}

pub fn format_log_report(report: &SearchReport) -> String {
    format!(
        "{} trials, worst {}, mean {}, std {} ({} deformed, {} unbounded, {} failed)",
        report.results.len(),
        report.worst_value,
        format_optional(report.mean),
        format_optional(report.std),
        report.deformed.len(),
        report.unbounded,
        report.failures,
    )
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|it| format!("{:.4}", it))
        .unwrap_or_else(|| "-".to_string())
}
