#![doc = include_str!("./README.md")]

/// Clap argument definitions
mod args;

/// Config command handlers
mod config;

/// Filter-visibility command handlers
mod filters;

/// Interaction matrix command handlers
mod interactions;

/// Layer-order command handlers
mod layers;

/// Preset command handlers
mod preset;

/// Scan command handler
mod scan;

/// Shared CLI utilities
mod util;

use clap::Parser;

pub use args::Cli;
use args::Commands;

/// Main entry point for the CLI
pub fn run_cli() {
    env_logger::init();

    let cli = Cli::parse();

    let success = match cli.command {
        Commands::Scan { report } => scan::handle_scan(report),

        Commands::Interactions { command } => interactions::handle_interactions(command),

        Commands::Filters { command } => filters::handle_filters(command),

        Commands::Layers { command } => layers::handle_layers(command),

        Commands::Preset { command } => preset::handle_preset(command),

        Commands::Config { command } => config::handle_config(command),
    };

    if !success {
        std::process::exit(1);
    }
}
