//! Interaction command handlers

use pbir_core::export::{ExportFormat, export_interactions};

use crate::cli::args::InteractionCommands;
use crate::cli::util;

/// Dispatch an interactions subcommand.
/// Returns true on success, false on error
pub fn handle_interactions(command: InteractionCommands) -> bool {
    match command {
        InteractionCommands::List { report, page } => handle_list(report, page),
        InteractionCommands::Matrix { report, page } => handle_matrix(report, &page),
        InteractionCommands::Set {
            report,
            page,
            source,
            target,
            ty,
            dry_run,
        } => handle_set(report, &page, &source, &target, ty.to_type(), dry_run),
        InteractionCommands::SetAll {
            report,
            page,
            ty,
            dry_run,
        } => handle_set_all(report, page, ty.to_type(), dry_run),
        InteractionCommands::Export {
            report,
            format,
            output,
        } => handle_export(report, format.to_format(), output),
    }
}

fn handle_list(report_arg: Option<std::path::PathBuf>, page: Option<String>) -> bool {
    let Some(report) = util::load_report(report_arg) else {
        return false;
    };

    let mut found = false;
    for p in &report.pages {
        if let Some(ref wanted) = page
            && p.id != *wanted
        {
            continue;
        }
        found = true;
        let summary = p.interaction_summary();
        println!("{} ({})", p.display_name, p.id);
        println!(
            "  {} pair(s): {} explicit ({} none, {} filter, {} highlight)",
            summary.pairs,
            summary.explicit,
            summary.no_filter,
            summary.data_filter,
            summary.highlight_filter
        );
        for interaction in &p.interactions {
            println!(
                "    {} -> {}: {}",
                interaction.source,
                interaction.target,
                interaction.ty.label()
            );
        }
    }

    if !found {
        match page {
            Some(wanted) => {
                eprintln!("✗ Page '{}' not found", wanted);
                return false;
            }
            None => println!("No pages found"),
        }
    }
    true
}

fn handle_matrix(report_arg: Option<std::path::PathBuf>, page_id: &str) -> bool {
    let Some(report) = util::load_report(report_arg) else {
        return false;
    };
    let Some(page) = report.page(page_id) else {
        eprintln!("✗ Page '{}' not found", page_id);
        return false;
    };

    println!("{} ({})", page.display_name, page.id);
    for cell in page.interaction_matrix() {
        let label = cell
            .ty
            .map(|ty| ty.label())
            .unwrap_or("Default");
        let marker = if cell.is_explicit() { "*" } else { " " };
        println!(
            " {} {} -> {}: {}",
            marker, cell.source_name, cell.target_name, label
        );
    }
    true
}

fn handle_set(
    report_arg: Option<std::path::PathBuf>,
    page: &str,
    source: &str,
    target: &str,
    ty: Option<pbir_core::capability::InteractionType>,
    dry_run: bool,
) -> bool {
    let Some(mut report) = util::load_report(report_arg) else {
        return false;
    };
    if report.page(page).is_none() {
        eprintln!("✗ Page '{}' not found", page);
        return false;
    }
    if source == target {
        eprintln!("✗ Source and target must be different visuals");
        return false;
    }

    if report.set_interaction(page, source, target, ty) {
        println!(
            "{} -> {}: {}",
            source,
            target,
            ty.map(|t| t.label()).unwrap_or("Default")
        );
    } else {
        println!("Already set; nothing to do");
        return true;
    }
    util::save_interactions(&mut report, dry_run)
}

fn handle_set_all(
    report_arg: Option<std::path::PathBuf>,
    page: Option<String>,
    ty: Option<pbir_core::capability::InteractionType>,
    dry_run: bool,
) -> bool {
    let Some(mut report) = util::load_report(report_arg) else {
        return false;
    };

    let pages: Vec<String> = match page {
        Some(id) => {
            if report.page(&id).is_none() {
                eprintln!("✗ Page '{}' not found", id);
                return false;
            }
            vec![id]
        }
        None => report.pages.iter().map(|p| p.id.clone()).collect(),
    };

    let mut changed = 0;
    let mut fallbacks = 0;
    for id in pages {
        let summary = report.bulk_set_interactions(&id, None, ty);
        changed += summary.changed;
        fallbacks += summary.fallbacks;
    }

    println!("{} pair(s) changed", changed);
    if fallbacks > 0 {
        println!(
            "⚠ {} pair(s) could not use the requested type and were downgraded",
            fallbacks
        );
    }
    if changed == 0 {
        return true;
    }
    util::save_interactions(&mut report, dry_run)
}

fn handle_export(
    report_arg: Option<std::path::PathBuf>,
    format: ExportFormat,
    output: Option<std::path::PathBuf>,
) -> bool {
    let Some(report) = util::load_report(report_arg) else {
        return false;
    };
    match export_interactions(&report, format) {
        Ok(content) => util::write_output(&content, output),
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}
