#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Interaction capability table and validity/fallback rules
pub mod capability;

/// Configuration options
pub mod config;

/// Error (common error types)
pub mod error;

/// Export (CSV/JSON reports of the current model)
pub mod export;

/// Filesystem abstraction
pub mod fs;

/// Undo history stacks
pub mod history;

/// Page model (interaction overrides and the interaction matrix)
pub mod page;

/// Presets (built-in bulk actions and saved custom snapshots)
pub mod preset;

/// Report (scan a PBIR folder, mutate, save)
pub mod report;

/// Visual model (parsed `visual.json` properties)
pub mod visual;
