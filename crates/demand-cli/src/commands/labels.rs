use demand_core::config::PriorityLabels;
use demand_core::Priority;

use crate::error::CliError;

pub fn run_labels(labels: &PriorityLabels, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(labels)?);
    } else {
        for line in format_label_lines(labels) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_label_lines(labels: &PriorityLabels) -> Vec<String> {
    Priority::ALL
        .iter()
        .map(|priority| format!("{:<7} {}", priority.as_str(), labels.label_for(*priority)))
        .collect()
}
