//! Preset command handlers

use std::path::PathBuf;

use pbir_core::config::Config;
use pbir_core::preset::{
    self, BUILT_IN, PresetAction, PresetSnapshot, apply_built_in, apply_custom,
};

use crate::cli::args::{PresetCommands, PresetKindArg};
use crate::cli::util;

/// Dispatch a preset subcommand.
/// Returns true on success, false on error
pub fn handle_preset(command: PresetCommands) -> bool {
    match command {
        PresetCommands::List => handle_list(),
        PresetCommands::Apply {
            report,
            preset,
            page,
            dry_run,
        } => handle_apply(report, &preset, page.as_deref(), dry_run),
        PresetCommands::Save { report, name, kind } => handle_save(report, &name, kind),
        PresetCommands::Delete { preset } => handle_delete(&preset),
    }
}

fn handle_list() -> bool {
    println!("Built-in presets");
    println!("================");
    for preset in BUILT_IN {
        println!("  {} - {}", preset.id, preset.name);
        println!("      {}", preset.description);
    }

    let config = Config::load().unwrap_or_default();
    if !config.presets.is_empty() {
        println!();
        println!("Custom presets");
        println!("==============");
        for preset in &config.presets {
            let kind = match preset.snapshot {
                PresetSnapshot::Filter { .. } => "filter",
                PresetSnapshot::Layer { .. } => "layer",
            };
            println!(
                "  {} - {} ({}, saved {})",
                preset.id,
                preset.name,
                kind,
                preset.created_at.format("%Y-%m-%d")
            );
        }
    }
    true
}

fn handle_apply(
    report_arg: Option<PathBuf>,
    preset_id: &str,
    page: Option<&str>,
    dry_run: bool,
) -> bool {
    let Some(mut report) = util::load_report(report_arg) else {
        return false;
    };

    if let Some(built_in) = preset::built_in(preset_id) {
        if let Some(id) = page
            && report.page(id).is_none()
        {
            eprintln!("✗ Page '{}' not found", id);
            return false;
        }

        let outcome = apply_built_in(&mut report, built_in, page);
        println!("Applied '{}': {} change(s)", built_in.name, outcome.changed);
        if outcome.fallbacks > 0 {
            println!(
                "⚠ {} pair(s) could not use the requested type and were downgraded",
                outcome.fallbacks
            );
        }
        if outcome.changed == 0 {
            return true;
        }
        return match built_in.action {
            PresetAction::Interaction(_) => util::save_interactions(&mut report, dry_run),
            PresetAction::Filter(_) | PresetAction::Layer(_) => {
                util::save_visuals(&mut report, dry_run)
            }
        };
    }

    let config = Config::load().unwrap_or_default();
    let Some(custom) = config.preset(preset_id) else {
        eprintln!("✗ Preset '{}' not found", preset_id);
        return false;
    };

    let changed = apply_custom(&mut report, custom);
    println!("Applied '{}': {} change(s)", custom.name, changed);
    if changed == 0 {
        return true;
    }
    util::save_visuals(&mut report, dry_run)
}

fn handle_save(report_arg: Option<PathBuf>, name: &str, kind: PresetKindArg) -> bool {
    if name.trim().is_empty() {
        eprintln!("✗ Preset name must not be empty");
        return false;
    }

    let Some(report) = util::load_report(report_arg) else {
        return false;
    };

    let preset = match kind {
        PresetKindArg::Filter => preset::capture_filter_preset(&report, name),
        PresetKindArg::Layer => preset::capture_layer_preset(&report, name),
    };

    let mut config = Config::load().unwrap_or_default();
    config.add_preset(preset);
    match config.save() {
        Ok(()) => {
            println!("✓ Preset '{}' saved", name);
            true
        }
        Err(e) => {
            eprintln!("✗ Failed to save config: {}", e);
            false
        }
    }
}

fn handle_delete(preset_id: &str) -> bool {
    let mut config = Config::load().unwrap_or_default();
    let Some(removed) = config.remove_preset(preset_id) else {
        eprintln!("✗ Preset '{}' not found", preset_id);
        return false;
    };
    match config.save() {
        Ok(()) => {
            println!("✓ Preset '{}' deleted", removed.name);
            true
        }
        Err(e) => {
            eprintln!("✗ Failed to save config: {}", e);
            false
        }
    }
}
