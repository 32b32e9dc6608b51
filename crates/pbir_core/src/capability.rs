//! Visual interaction capabilities based on Power BI's official behavior.
//!
//! Every visual type resolves to a [`VisualCapability`] record stating
//! whether it can act as an interaction source or target for filtering
//! and highlighting. A proposed `(source, target, type)` triple is
//! validated against the table; invalid requests are silently downgraded
//! along the Highlight -> Filter -> None ladder by
//! [`interaction_fallback`], never rejected with an error.
//!
//! The table is an external fact mirrored from Power BI, not derived
//! from it. All functions here are pure and do no I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An explicit cross-visual interaction type.
///
/// The absence of an override for a (source, target) pair means
/// "Default": Power BI (or the report-level setting) decides. That state
/// is modeled as `Option::<InteractionType>::None` throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionType {
    /// Clicking the source has no effect on the target
    NoFilter,
    /// Clicking the source filters the target's data
    DataFilter,
    /// Clicking the source highlights matching data in the target
    HighlightFilter,
}

impl InteractionType {
    /// The wire-format string used in `page.json`
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::NoFilter => "NoFilter",
            InteractionType::DataFilter => "DataFilter",
            InteractionType::HighlightFilter => "HighlightFilter",
        }
    }

    /// Parse a wire-format string, `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NoFilter" => Some(InteractionType::NoFilter),
            "DataFilter" => Some(InteractionType::DataFilter),
            "HighlightFilter" => Some(InteractionType::HighlightFilter),
            _ => None,
        }
    }

    /// Short human-readable label ("None" / "Filter" / "Highlight")
    pub fn label(&self) -> &'static str {
        match self {
            InteractionType::NoFilter => "None",
            InteractionType::DataFilter => "Filter",
            InteractionType::HighlightFilter => "Highlight",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static interaction capabilities of one visual type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisualCapability {
    /// Can act as the source of a data filter
    pub can_filter: bool,
    /// Can act as the source of a highlight
    pub can_highlight: bool,
    /// Can be the target of a data filter
    pub can_be_filter_target: bool,
    /// Can be the target of a highlight
    pub can_be_highlight_target: bool,
}

/// Visuals that can only be filtered (no highlighting)
const FILTER_ONLY: VisualCapability = VisualCapability {
    can_filter: true,
    can_highlight: false,
    can_be_filter_target: true,
    can_be_highlight_target: false,
};

/// Slicers filter other visuals but are never a target
const SLICER: VisualCapability = VisualCapability {
    can_filter: true,
    can_highlight: false,
    can_be_filter_target: false,
    can_be_highlight_target: false,
};

/// Non-data visuals (no interactions at all)
const NON_DATA: VisualCapability = VisualCapability {
    can_filter: false,
    can_highlight: false,
    can_be_filter_target: false,
    can_be_highlight_target: false,
};

/// Default for all other visuals (both filter and highlight)
const DEFAULT: VisualCapability = VisualCapability {
    can_filter: true,
    can_highlight: true,
    can_be_filter_target: true,
    can_be_highlight_target: true,
};

/// Map a raw Power BI visual type string to a normalized capability key.
///
/// Exact alias matches fold combo charts onto `lineChart`; known keys map
/// to themselves; anything else falls through to the literal string
/// (which [`capability_for`] then resolves to the default entry).
pub fn normalize_visual_type(visual_type: &str) -> &str {
    match visual_type {
        "lineChart" | "lineClusteredColumnComboChart" | "lineStackedColumnComboChart" => {
            "lineChart"
        }
        "scatterChart" => "scatterChart",
        "map" => "map",
        "filledMap" => "filledMap",
        "shape" => "shape",
        "slicer" => "slicer",
        "textbox" => "textbox",
        "image" => "image",
        other => other,
    }
}

fn capability_entry(key: &str) -> Option<&'static VisualCapability> {
    match key {
        "lineChart" | "scatterChart" | "map" | "filledMap" | "shape" => Some(&FILTER_ONLY),
        "slicer" => Some(&SLICER),
        "textbox" | "image" => Some(&NON_DATA),
        "default" => Some(&DEFAULT),
        _ => None,
    }
}

/// Resolve the capability record for a raw visual type string.
///
/// Total: every type, known or unknown, resolves to some record.
pub fn capability_for(visual_type: &str) -> &'static VisualCapability {
    let normalized = normalize_visual_type(visual_type);
    capability_entry(normalized).unwrap_or(&DEFAULT)
}

/// Check whether an interaction type is permitted between two visual
/// types. `None` (Default) and `NoFilter` are always permitted.
pub fn is_valid_interaction(
    source_type: &str,
    target_type: &str,
    interaction: Option<InteractionType>,
) -> bool {
    let requested = match interaction {
        None | Some(InteractionType::NoFilter) => return true,
        Some(requested) => requested,
    };

    let source = capability_for(source_type);
    let target = capability_for(target_type);

    match requested {
        InteractionType::DataFilter => source.can_filter && target.can_be_filter_target,
        InteractionType::HighlightFilter => source.can_highlight && target.can_be_highlight_target,
        InteractionType::NoFilter => true,
    }
}

/// Compute the substitute for an interaction type that
/// [`is_valid_interaction`] rejected for this pair.
///
/// Degradation ladder: HighlightFilter tries DataFilter first, then
/// everything bottoms out at NoFilter. The result is never more
/// permissive than the request and never equals an invalid request.
pub fn interaction_fallback(
    source_type: &str,
    target_type: &str,
    requested: InteractionType,
) -> InteractionType {
    if requested == InteractionType::HighlightFilter
        && is_valid_interaction(source_type, target_type, Some(InteractionType::DataFilter))
    {
        return InteractionType::DataFilter;
    }
    InteractionType::NoFilter
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: &[&str] = &[
        "lineChart",
        "scatterChart",
        "map",
        "filledMap",
        "shape",
        "slicer",
        "textbox",
        "image",
        "barChart",
        "someFutureVisual",
    ];

    #[test]
    fn test_unknown_type_resolves_to_default() {
        let caps = capability_for("someFutureVisual");
        assert!(caps.can_filter);
        assert!(caps.can_highlight);
        assert!(caps.can_be_filter_target);
        assert!(caps.can_be_highlight_target);
    }

    #[test]
    fn test_combo_charts_fold_to_line_chart() {
        assert_eq!(
            normalize_visual_type("lineClusteredColumnComboChart"),
            "lineChart"
        );
        assert_eq!(
            normalize_visual_type("lineStackedColumnComboChart"),
            "lineChart"
        );
        assert!(!capability_for("lineClusteredColumnComboChart").can_highlight);
    }

    #[test]
    fn test_default_and_none_always_valid() {
        for source in ALL_KEYS {
            for target in ALL_KEYS {
                assert!(is_valid_interaction(source, target, None));
                assert!(is_valid_interaction(
                    source,
                    target,
                    Some(InteractionType::NoFilter)
                ));
            }
        }
    }

    #[test]
    fn test_non_data_visuals_cannot_source_anything() {
        for source in ["textbox", "image"] {
            for target in ALL_KEYS {
                assert!(!is_valid_interaction(
                    source,
                    target,
                    Some(InteractionType::DataFilter)
                ));
                assert!(!is_valid_interaction(
                    source,
                    target,
                    Some(InteractionType::HighlightFilter)
                ));
            }
        }
    }

    #[test]
    fn test_slicer_is_never_a_target() {
        assert!(!is_valid_interaction(
            "barChart",
            "slicer",
            Some(InteractionType::DataFilter)
        ));
        assert!(!is_valid_interaction(
            "barChart",
            "slicer",
            Some(InteractionType::HighlightFilter)
        ));
        // ...but slicers do filter other visuals
        assert!(is_valid_interaction(
            "slicer",
            "barChart",
            Some(InteractionType::DataFilter)
        ));
    }

    #[test]
    fn test_fallback_highlight_degrades_to_filter() {
        // lineChart cannot highlight and slicer cannot be highlighted,
        // but lineChart -> slicer... slicer is not a filter target either,
        // so check against a plain chart first.
        assert!(!is_valid_interaction(
            "lineChart",
            "barChart",
            Some(InteractionType::HighlightFilter)
        ));
        assert_eq!(
            interaction_fallback("lineChart", "barChart", InteractionType::HighlightFilter),
            InteractionType::DataFilter
        );
    }

    #[test]
    fn test_fallback_highlight_to_slicer_degrades_to_filter() {
        // Scenario from the capability rules: lineChart -> slicer with
        // HighlightFilter. Invalid (no highlight either side), but the
        // DataFilter attempt is... slicer cannot be a filter target.
        assert_eq!(
            interaction_fallback("lineChart", "slicer", InteractionType::HighlightFilter),
            InteractionType::NoFilter
        );
    }

    #[test]
    fn test_fallback_data_filter_goes_straight_to_none() {
        // textbox can never filter; no intermediate step is attempted
        assert!(!is_valid_interaction(
            "textbox",
            "barChart",
            Some(InteractionType::DataFilter)
        ));
        assert_eq!(
            interaction_fallback("textbox", "barChart", InteractionType::DataFilter),
            InteractionType::NoFilter
        );
    }

    #[test]
    fn test_fallback_never_returns_the_invalid_request() {
        for source in ALL_KEYS {
            for target in ALL_KEYS {
                for requested in [InteractionType::DataFilter, InteractionType::HighlightFilter] {
                    if !is_valid_interaction(source, target, Some(requested)) {
                        let fallback = interaction_fallback(source, target, requested);
                        assert_ne!(fallback, requested);
                        assert!(matches!(
                            fallback,
                            InteractionType::DataFilter | InteractionType::NoFilter
                        ));
                        // The substitute itself must be permitted
                        assert!(is_valid_interaction(source, target, Some(fallback)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_wire_format_round_trip() {
        assert_eq!(InteractionType::parse("DataFilter").unwrap().as_str(), "DataFilter");
        assert_eq!(InteractionType::parse("bogus"), None);
        let json = serde_json::to_string(&InteractionType::HighlightFilter).unwrap();
        assert_eq!(json, "\"HighlightFilter\"");
    }
}
