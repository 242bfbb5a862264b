//! Console summary printed after a run

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::report::{Summary, TestResult};

const RULE_WIDTH: usize = 60;

/// Render failing cases as a table
pub fn failures_table(failures: &[TestResult]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Group", "Case", "Message"]);
    for failure in failures {
        table.add_row(vec![
            failure.group.clone(),
            failure.name.clone(),
            failure.message.clone(),
        ]);
    }
    table
}

/// Print totals, success rate and every failing case
pub fn print_summary(summary: &Summary, interrupted: bool) {
    let rule = "=".repeat(RULE_WIDTH);
    println!();
    println!("{}", rule);
    println!("{}", "BACKEND API CONFORMANCE SUMMARY".bold());
    println!("{}", rule);

    if interrupted {
        println!("{}", "Test execution interrupted by user.".yellow());
    }

    println!("Total Tests: {}", summary.total);
    println!("Passed: {}", summary.passed.to_string().green());
    println!("Failed: {}", summary.failed.to_string().red());
    println!("Skipped: {}", summary.skipped.to_string().yellow());
    println!("Success Rate: {:.1}%", summary.success_rate());
    println!("Duration: {} ms", summary.duration_ms);

    if !summary.failures.is_empty() {
        println!();
        println!("{}", "FAILED TESTS:".red().bold());
        println!("{}", failures_table(&summary.failures));
    }

    println!();
    println!("{}", rule);
}
