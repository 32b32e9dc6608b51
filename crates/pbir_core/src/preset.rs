//! Built-in and user-saved configuration presets.
//!
//! Built-in presets are uniform one-shot actions ("hide all filters",
//! "disable all interactions"). Custom presets capture the current
//! per-visual filter or layer pattern and replay it later, possibly on a
//! freshly rescanned report; visuals that no longer exist are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::InteractionType;
use crate::report::Report;
use std::path::PathBuf;

/// Tri-state stand-in for `Option<bool>` in preset snapshots. TOML
/// cannot encode a missing value inside an array of tables, so the
/// "unset" state needs its own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    /// Property absent (Power BI default behavior)
    Unset,
    /// Property explicitly `true`
    On,
    /// Property explicitly `false`
    Off,
}

impl From<Option<bool>> for Toggle {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Toggle::Unset,
            Some(true) => Toggle::On,
            Some(false) => Toggle::Off,
        }
    }
}

impl From<Toggle> for Option<bool> {
    fn from(toggle: Toggle) -> Self {
        match toggle {
            Toggle::Unset => None,
            Toggle::On => Some(true),
            Toggle::Off => Some(false),
        }
    }
}

/// What a built-in preset does when applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetAction {
    /// Set filter-pane visibility on every visual
    Filter(Option<bool>),
    /// Set `keepLayerOrder` on every visual
    Layer(Option<bool>),
    /// Bulk-set every interaction pair (subject to capability fallback)
    Interaction(Option<InteractionType>),
}

/// One of the fixed built-in presets
#[derive(Debug, Clone, Copy)]
pub struct BuiltInPreset {
    /// Stable id used on the command line
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// One-sentence description of the effect
    pub description: &'static str,
    /// The action to apply
    pub action: PresetAction,
}

/// The built-in preset catalog
pub const BUILT_IN: &[BuiltInPreset] = &[
    BuiltInPreset {
        id: "hide-all-filters",
        name: "Hide All Filters",
        description: "Hides filter panes from report viewers. Filters still apply to data but are not visible or interactive.",
        action: PresetAction::Filter(Some(true)),
    },
    BuiltInPreset {
        id: "show-all-filters",
        name: "Show All Filters",
        description: "Makes all filter panes visible. Viewers can see and interact with filters.",
        action: PresetAction::Filter(Some(false)),
    },
    BuiltInPreset {
        id: "reset-all-filters",
        name: "Reset All Filters",
        description: "Removes the isHiddenInViewMode property. Restores Power BI default behavior.",
        action: PresetAction::Filter(None),
    },
    BuiltInPreset {
        id: "lock-all-layers",
        name: "Lock All Layers",
        description: "Visuals stay in their defined z-order. Clicking a visual won't bring it to front.",
        action: PresetAction::Layer(Some(true)),
    },
    BuiltInPreset {
        id: "unlock-all-layers",
        name: "Unlock All Layers",
        description: "Visuals can move to front when clicked. Allows dynamic layering during interaction.",
        action: PresetAction::Layer(Some(false)),
    },
    BuiltInPreset {
        id: "reset-all-layers",
        name: "Reset All Layers",
        description: "Removes the keepLayerOrder property. Restores Power BI default behavior.",
        action: PresetAction::Layer(None),
    },
    BuiltInPreset {
        id: "disable-all-interactions",
        name: "Disable All Interactions",
        description: "Clicking one visual won't affect others. No cross-filtering or highlighting between visuals.",
        action: PresetAction::Interaction(Some(InteractionType::NoFilter)),
    },
    BuiltInPreset {
        id: "enable-all-interactions",
        name: "Enable All (Default)",
        description: "Removes explicit settings. Power BI determines how visuals interact with each other.",
        action: PresetAction::Interaction(None),
    },
    BuiltInPreset {
        id: "filter-all-interactions",
        name: "Set All to Filter",
        description: "Clicking a visual filters data in other visuals. Shows only matching data points.",
        action: PresetAction::Interaction(Some(InteractionType::DataFilter)),
    },
    BuiltInPreset {
        id: "highlight-all-interactions",
        name: "Set All to Highlight",
        description: "Clicking a visual highlights related data in other visuals. Non-matching data is dimmed but visible.",
        action: PresetAction::Interaction(Some(InteractionType::HighlightFilter)),
    },
];

/// Look up a built-in preset by id
pub fn built_in(id: &str) -> Option<&'static BuiltInPreset> {
    BUILT_IN.iter().find(|p| p.id == id)
}

/// What applying a preset touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Filter cards, visuals or interaction pairs changed
    pub changed: usize,
    /// Interaction pairs downgraded by capability validation
    pub fallbacks: usize,
}

fn page_visual_paths(report: &Report, page_id: Option<&str>) -> Vec<PathBuf> {
    report
        .visuals
        .iter()
        .filter(|v| page_id.is_none_or(|id| v.page_id == id))
        .map(|v| v.path.clone())
        .collect()
}

/// Apply a built-in preset. When `page_id` is given the preset is scoped
/// to that page's visuals, otherwise it covers the whole report.
pub fn apply_built_in(
    report: &mut Report,
    preset: &BuiltInPreset,
    page_id: Option<&str>,
) -> ApplyOutcome {
    match preset.action {
        PresetAction::Filter(value) => {
            let paths = page_visual_paths(report, page_id);
            ApplyOutcome {
                changed: report.set_filter_visibility(&paths, value),
                fallbacks: 0,
            }
        }
        PresetAction::Layer(value) => {
            let paths = page_visual_paths(report, page_id);
            ApplyOutcome {
                changed: report.set_layer_order(&paths, value),
                fallbacks: 0,
            }
        }
        PresetAction::Interaction(value) => {
            let pages: Vec<String> = match page_id {
                Some(id) => vec![id.to_string()],
                None => report.pages.iter().map(|p| p.id.clone()).collect(),
            };
            let mut outcome = ApplyOutcome::default();
            for page in pages {
                let summary = report.bulk_set_interactions(&page, None, value);
                outcome.changed += summary.changed;
                outcome.fallbacks += summary.fallbacks;
            }
            outcome
        }
    }
}

/// Per-visual filter pattern inside a custom preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    /// `visual.json` path the pattern belongs to
    pub path: PathBuf,
    /// One value per filter card, in document order
    pub filters: Vec<Toggle>,
}

/// Per-visual layer flag inside a custom preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    /// `visual.json` path the flag belongs to
    pub path: PathBuf,
    /// The captured `keepLayerOrder` state
    pub keep_layer_order: Toggle,
}

/// The captured state a custom preset replays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresetSnapshot {
    /// Filter-pane visibility pattern
    Filter {
        /// Captured visuals
        visuals: Vec<FilterSnapshot>,
    },
    /// Layer-order pattern
    Layer {
        /// Captured visuals
        visuals: Vec<LayerSnapshot>,
    },
}

/// A user-saved preset, persisted in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPreset {
    /// Generated unique id
    pub id: String,
    /// User-chosen name
    pub name: String,
    /// When the preset was captured
    pub created_at: DateTime<Utc>,
    /// The captured state
    pub snapshot: PresetSnapshot,
}

fn generate_id() -> String {
    format!("custom-{}", Utc::now().timestamp_millis())
}

/// Capture the report's current filter-visibility pattern
pub fn capture_filter_preset(report: &Report, name: &str) -> CustomPreset {
    CustomPreset {
        id: generate_id(),
        name: name.to_string(),
        created_at: Utc::now(),
        snapshot: PresetSnapshot::Filter {
            visuals: report
                .visuals
                .iter()
                .map(|v| FilterSnapshot {
                    path: v.path.clone(),
                    filters: v.filters.iter().map(|f| f.hidden_in_view.into()).collect(),
                })
                .collect(),
        },
    }
}

/// Capture the report's current layer-order pattern
pub fn capture_layer_preset(report: &Report, name: &str) -> CustomPreset {
    CustomPreset {
        id: generate_id(),
        name: name.to_string(),
        created_at: Utc::now(),
        snapshot: PresetSnapshot::Layer {
            visuals: report
                .visuals
                .iter()
                .map(|v| LayerSnapshot {
                    path: v.path.clone(),
                    keep_layer_order: v.keep_layer_order.into(),
                })
                .collect(),
        },
    }
}

/// Replay a custom preset onto a report. Captured visuals that no longer
/// exist are skipped; returns the number of values changed.
pub fn apply_custom(report: &mut Report, preset: &CustomPreset) -> usize {
    match &preset.snapshot {
        PresetSnapshot::Filter { visuals } => {
            let settings: Vec<(PathBuf, Vec<Option<bool>>)> = visuals
                .iter()
                .map(|s| {
                    (
                        s.path.clone(),
                        s.filters.iter().map(|&t| t.into()).collect(),
                    )
                })
                .collect();
            report.set_filter_pattern(&settings)
        }
        PresetSnapshot::Layer { visuals } => {
            let settings: Vec<(PathBuf, Option<bool>)> = visuals
                .iter()
                .map(|s| (s.path.clone(), s.keep_layer_order.into()))
                .collect();
            report.set_layer_pattern(&settings)
        }
    }
}
