//! Config command handlers

use std::path::PathBuf;

use pbir_core::config::Config;

use crate::cli::args::ConfigCommands;

/// Dispatch a config subcommand (`None` shows the config).
/// Returns true on success, false on error
pub fn handle_config(command: Option<ConfigCommands>) -> bool {
    match command {
        None | Some(ConfigCommands::Show) => show_config(),
        Some(ConfigCommands::SetDefault { report }) => set_default(report),
        Some(ConfigCommands::ClearDefault) => clear_default(),
    }
}

fn show_config() -> bool {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Failed to load config: {}", e);
            return false;
        }
    };

    println!("pbir configuration");
    println!("==================");
    match &config.default_report {
        Some(path) => println!("Default report: {}", path.display()),
        None => println!("Default report: (not set)"),
    }
    println!("Custom presets: {}", config.presets.len());
    if let Some(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
    true
}

fn set_default(report: PathBuf) -> bool {
    if !report.is_dir() {
        eprintln!("✗ '{}' is not a directory", report.display());
        return false;
    }

    let mut config = Config::load().unwrap_or_default();
    config.default_report = Some(report.clone());
    match config.save() {
        Ok(()) => {
            println!("✓ Default report set to {}", report.display());
            true
        }
        Err(e) => {
            eprintln!("✗ Failed to save config: {}", e);
            false
        }
    }
}

fn clear_default() -> bool {
    let mut config = Config::load().unwrap_or_default();
    if config.default_report.take().is_none() {
        println!("Default report was not set");
        return true;
    }
    match config.save() {
        Ok(()) => {
            println!("✓ Default report cleared");
            true
        }
        Err(e) => {
            eprintln!("✗ Failed to save config: {}", e);
            false
        }
    }
}
