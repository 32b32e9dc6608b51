//! Filter-visibility command handlers

use std::path::PathBuf;

use pbir_core::export::{ExportFormat, export_filters};

use crate::cli::args::FilterCommands;
use crate::cli::util;

/// Dispatch a filters subcommand.
/// Returns true on success, false on error
pub fn handle_filters(command: FilterCommands) -> bool {
    match command {
        FilterCommands::List { report } => handle_list(report),
        FilterCommands::Set {
            report,
            visibility,
            visual,
            dry_run,
        } => handle_set(report, visibility.to_value(), &visual, dry_run),
        FilterCommands::Export {
            report,
            format,
            output,
        } => handle_export(report, format.to_format(), output),
    }
}

fn handle_list(report_arg: Option<PathBuf>) -> bool {
    let Some(report) = util::load_report(report_arg) else {
        return false;
    };

    for visual in &report.visuals {
        println!(
            "{} / {} [{}]: {}",
            visual.page_display_name,
            visual.display_name(),
            visual.visual_type,
            visual.filter_status().label()
        );
        for filter in &visual.filters {
            let state = match filter.hidden_in_view {
                Some(true) => "hidden",
                Some(false) => "visible",
                None => "default",
            };
            if filter.field.is_empty() {
                println!("    {} ({}): {}", filter.name, filter.kind, state);
            } else {
                println!(
                    "    {} on {} ({}): {}",
                    filter.name, filter.field, filter.kind, state
                );
            }
        }
    }
    true
}

fn handle_set(
    report_arg: Option<PathBuf>,
    value: Option<bool>,
    selectors: &[String],
    dry_run: bool,
) -> bool {
    let Some(mut report) = util::load_report(report_arg) else {
        return false;
    };

    let paths = util::select_visual_paths(&report, selectors);
    if paths.is_empty() {
        eprintln!("✗ No visuals selected");
        return false;
    }

    let changed = report.set_filter_visibility(&paths, value);
    println!("{} filter(s) changed", changed);
    if changed == 0 {
        return true;
    }
    util::save_visuals(&mut report, dry_run)
}

fn handle_export(
    report_arg: Option<PathBuf>,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> bool {
    let Some(report) = util::load_report(report_arg) else {
        return false;
    };
    match export_filters(&report, format) {
        Ok(content) => util::write_output(&content, output),
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}
