//! Layer-order command handlers

use std::path::PathBuf;

use pbir_core::export::{ExportFormat, export_layers};

use crate::cli::args::LayerCommands;
use crate::cli::util;

/// Dispatch a layers subcommand.
/// Returns true on success, false on error
pub fn handle_layers(command: LayerCommands) -> bool {
    match command {
        LayerCommands::List { report } => handle_list(report),
        LayerCommands::Set {
            report,
            state,
            visual,
            dry_run,
        } => handle_set(report, state.to_value(), &visual, dry_run),
        LayerCommands::Export {
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
        let state = match visual.keep_layer_order {
            Some(true) => "locked",
            Some(false) => "unlocked",
            None => "default",
        };
        println!(
            "{} / {} [{}]: {}",
            visual.page_display_name,
            visual.display_name(),
            visual.visual_type,
            state
        );
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

    let changed = report.set_layer_order(&paths, value);
    println!("{} visual(s) changed", changed);
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
    match export_layers(&report, format) {
        Ok(content) => util::write_output(&content, output),
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}
