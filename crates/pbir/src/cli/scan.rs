//! Scan command handler

use std::path::PathBuf;

use crate::cli::util;

/// Scan a report folder and print a summary.
/// Returns true on success, false on error
pub fn handle_scan(report_arg: Option<PathBuf>) -> bool {
    let Some(report) = util::load_report(report_arg) else {
        return false;
    };

    println!("Report: {}", report.root().display());
    if let Some(default) = report.default_interaction {
        println!("Report default interaction: {}", default.label());
    }
    println!(
        "{} page(s), {} visual(s)",
        report.pages.len(),
        report.visuals.len()
    );
    println!();

    for page in &report.pages {
        let summary = page.interaction_summary();
        println!("{} ({})", page.display_name, page.id);
        println!(
            "  {} visual(s), {} of {} interaction pair(s) explicit",
            page.visuals.len(),
            summary.explicit,
            summary.pairs
        );
        for visual in &page.visuals {
            println!("    {} [{}]", visual.display_name(), visual.visual_type);
        }
    }
    true
}
