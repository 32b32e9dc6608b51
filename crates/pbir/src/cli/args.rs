//! Clap argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pbir_core::capability::InteractionType;
use pbir_core::export::ExportFormat;

/// Manage Power BI Enhanced Report Format (PBIR) folders
#[derive(Parser)]
#[command(name = "pbir", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a report folder and summarize its pages and visuals
    Scan {
        /// Report folder (defaults to the configured default_report)
        report: Option<PathBuf>,
    },

    /// Inspect and edit the cross-visual interaction matrix
    Interactions {
        #[command(subcommand)]
        command: InteractionCommands,
    },

    /// Inspect and edit filter-pane visibility
    Filters {
        #[command(subcommand)]
        command: FilterCommands,
    },

    /// Inspect and edit visual layer locking (keepLayerOrder)
    Layers {
        #[command(subcommand)]
        command: LayerCommands,
    },

    /// Apply built-in presets and manage saved ones
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },

    /// Show or edit tool configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum InteractionCommands {
    /// Summarize explicit interaction overrides per page
    List {
        /// Report folder
        report: Option<PathBuf>,
        /// Only show this page
        #[arg(long)]
        page: Option<String>,
    },

    /// Print the full source/target matrix for one page
    Matrix {
        /// Report folder
        report: Option<PathBuf>,
        /// Page id
        #[arg(long)]
        page: String,
    },

    /// Set one (source, target) pair's interaction
    Set {
        /// Report folder
        report: Option<PathBuf>,
        /// Page id
        #[arg(long)]
        page: String,
        /// Source visual id
        #[arg(long)]
        source: String,
        /// Target visual id
        #[arg(long)]
        target: String,
        /// Interaction to apply
        #[arg(long = "type", value_enum)]
        ty: InteractionArg,
        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply one interaction type to every pair, with capability fallback
    SetAll {
        /// Report folder
        report: Option<PathBuf>,
        /// Limit to one page (all pages when omitted)
        #[arg(long)]
        page: Option<String>,
        /// Interaction to apply
        #[arg(long = "type", value_enum)]
        ty: InteractionArg,
        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the interaction matrix
    Export {
        /// Report folder
        report: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum FilterCommands {
    /// List every filter card with its visibility
    List {
        /// Report folder
        report: Option<PathBuf>,
    },

    /// Set filter-pane visibility on selected visuals
    Set {
        /// Report folder
        report: Option<PathBuf>,
        /// Visibility to apply
        #[arg(long, value_enum)]
        visibility: VisibilityArg,
        /// Visual ids or path fragments to select (all visuals when omitted)
        #[arg(long)]
        visual: Vec<String>,
        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the filter-visibility report
    Export {
        /// Report folder
        report: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum LayerCommands {
    /// List every visual with its keepLayerOrder state
    List {
        /// Report folder
        report: Option<PathBuf>,
    },

    /// Set layer locking on selected visuals
    Set {
        /// Report folder
        report: Option<PathBuf>,
        /// Layer state to apply
        #[arg(long, value_enum)]
        state: LayerArg,
        /// Visual ids or path fragments to select (all visuals when omitted)
        #[arg(long)]
        visual: Vec<String>,
        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the layer-order report
    Export {
        /// Report folder
        report: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PresetCommands {
    /// List built-in and saved custom presets
    List,

    /// Apply a preset by id or name
    Apply {
        /// Report folder
        report: Option<PathBuf>,
        /// Preset id or name
        preset: String,
        /// Limit the preset to one page
        #[arg(long)]
        page: Option<String>,
        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Capture the report's current state as a custom preset
    Save {
        /// Report folder
        report: Option<PathBuf>,
        /// Name for the new preset
        name: String,
        /// What to capture
        #[arg(long, value_enum)]
        kind: PresetKindArg,
    },

    /// Delete a custom preset by id or name
    Delete {
        /// Preset id or name
        preset: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Set the default report folder
    SetDefault {
        /// Report folder
        report: PathBuf,
    },

    /// Clear the default report folder
    ClearDefault,
}

/// Interaction choice on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InteractionArg {
    /// Remove the explicit override (Power BI decides)
    Default,
    /// NoFilter: the source does not affect the target
    None,
    /// DataFilter: the source filters the target
    Filter,
    /// HighlightFilter: the source highlights the target
    Highlight,
}

impl InteractionArg {
    pub fn to_type(self) -> Option<InteractionType> {
        match self {
            InteractionArg::Default => None,
            InteractionArg::None => Some(InteractionType::NoFilter),
            InteractionArg::Filter => Some(InteractionType::DataFilter),
            InteractionArg::Highlight => Some(InteractionType::HighlightFilter),
        }
    }
}

/// Filter-pane visibility choice on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VisibilityArg {
    /// Hide the filter pane from viewers
    Hidden,
    /// Show the filter pane to viewers
    Visible,
    /// Remove the property (Power BI default)
    Default,
}

impl VisibilityArg {
    pub fn to_value(self) -> Option<bool> {
        match self {
            VisibilityArg::Hidden => Some(true),
            VisibilityArg::Visible => Some(false),
            VisibilityArg::Default => None,
        }
    }
}

/// Layer-lock choice on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayerArg {
    /// Keep the defined z-order (keepLayerOrder = true)
    Locked,
    /// Allow visuals to come to front when clicked
    Unlocked,
    /// Remove the property (Power BI default)
    Default,
}

impl LayerArg {
    pub fn to_value(self) -> Option<bool> {
        match self {
            LayerArg::Locked => Some(true),
            LayerArg::Unlocked => Some(false),
            LayerArg::Default => None,
        }
    }
}

/// Export format on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Comma-separated values with a header row
    Csv,
    /// Pretty-printed JSON
    Json,
}

impl FormatArg {
    pub fn to_format(self) -> ExportFormat {
        match self {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

/// What a custom preset captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetKindArg {
    /// Filter-pane visibility pattern
    Filter,
    /// Layer-order pattern
    Layer,
}
