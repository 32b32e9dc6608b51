//! Parsed view of one `page.json` file.
//!
//! A [`Page`] owns an ordered set of visual summaries and the sparse
//! list of explicit [`Interaction`] overrides. A (source, target) pair
//! with no override is in the "Default" state; the override list never
//! contains duplicates or self-pairs.

use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{InteractionType, interaction_fallback, is_valid_interaction};
use crate::history::InteractionChange;
use crate::visual::synthesize_display_name;

/// The slice of a visual a page needs for the interaction matrix
#[derive(Debug, Clone, Serialize)]
pub struct VisualSummary {
    /// Visual id
    pub id: String,
    /// Explicit title or generated name; may be empty
    pub name: String,
    /// Raw visual type string
    pub visual_type: String,
    /// Whether the author gave the visual a title
    pub has_explicit_title: bool,
}

impl VisualSummary {
    /// Name shown in the matrix: the title, or `type (shortid...)`
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        synthesize_display_name(&self.visual_type, &self.id)
    }
}

/// One explicit interaction override, as persisted in `page.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Source visual id
    pub source: String,
    /// Target visual id
    pub target: String,
    /// Explicit interaction type
    #[serde(rename = "type")]
    pub ty: InteractionType,
}

/// One cell of the dense interaction matrix
#[derive(Debug, Clone, Serialize)]
pub struct MatrixCell {
    /// Source visual id
    pub source: String,
    /// Target visual id
    pub target: String,
    /// Source display name
    pub source_name: String,
    /// Target display name
    pub target_name: String,
    /// Whether the source visual has an author-set title
    pub source_has_name: bool,
    /// Whether the target visual has an author-set title
    pub target_has_name: bool,
    /// Explicit override, or `None` for Default
    #[serde(rename = "type")]
    pub ty: Option<InteractionType>,
}

impl MatrixCell {
    /// True when this pair carries an explicit override
    pub fn is_explicit(&self) -> bool {
        self.ty.is_some()
    }
}

/// Summary counts over a page's interaction matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InteractionSummary {
    /// Ordered pairs on the page (N * (N - 1))
    pub pairs: usize,
    /// Pairs with an explicit override
    pub explicit: usize,
    /// Explicit NoFilter overrides
    pub no_filter: usize,
    /// Explicit DataFilter overrides
    pub data_filter: usize,
    /// Explicit HighlightFilter overrides
    pub highlight_filter: usize,
}

/// Result of a bulk interaction mutation
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    /// Every pair whose effective type actually changed
    pub changes: Vec<InteractionChange>,
    /// Pairs where the requested type was invalid and a substitute was
    /// applied (counted even when the substitute equals the old value)
    pub fallbacks: usize,
}

/// One report page, backed by a `page.json` file
#[derive(Debug, Clone)]
pub struct Page {
    /// Path of the `page.json` file as given to the scanner
    pub path: PathBuf,
    /// Page id (the folder name under `pages/`)
    pub id: String,
    /// `displayName` from the document, or the page id
    pub display_name: String,
    /// Visuals on this page, in scan order
    pub visuals: Vec<VisualSummary>,
    /// Sparse explicit overrides; absence means Default
    pub interactions: Vec<Interaction>,
    /// Document as last read from or written to disk
    saved: Value,
    /// Override list at last save, for modification tracking
    saved_interactions: Vec<Interaction>,
}

impl Page {
    /// Build a page from its parsed document
    pub fn from_document(path: PathBuf, id: String, document: Value) -> Self {
        let display_name = document
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or(&id)
            .to_string();
        let interactions = extract_interactions(&document, &path);

        Page {
            path,
            id,
            display_name,
            visuals: Vec::new(),
            saved_interactions: interactions.clone(),
            interactions,
            saved: document,
        }
    }

    /// Explicit override for a pair, `None` when the pair is Default
    pub fn interaction_type(&self, source: &str, target: &str) -> Option<InteractionType> {
        self.interactions
            .iter()
            .find(|i| i.source == source && i.target == target)
            .map(|i| i.ty)
    }

    fn visual(&self, id: &str) -> Option<&VisualSummary> {
        self.visuals.iter().find(|v| v.id == id)
    }

    /// Build the dense N x (N - 1) matrix over all ordered visual pairs.
    /// Self-pairs are never emitted.
    pub fn interaction_matrix(&self) -> Vec<MatrixCell> {
        let mut matrix = Vec::new();
        for source in &self.visuals {
            for target in &self.visuals {
                if source.id == target.id {
                    continue;
                }
                matrix.push(MatrixCell {
                    source: source.id.clone(),
                    target: target.id.clone(),
                    source_name: source.display_name(),
                    target_name: target.display_name(),
                    source_has_name: source.has_explicit_title,
                    target_has_name: target.has_explicit_title,
                    ty: self.interaction_type(&source.id, &target.id),
                });
            }
        }
        matrix
    }

    /// Count pairs and explicit overrides by type
    pub fn interaction_summary(&self) -> InteractionSummary {
        let n = self.visuals.len();
        let mut summary = InteractionSummary {
            pairs: n.saturating_sub(1) * n,
            ..Default::default()
        };
        for interaction in &self.interactions {
            summary.explicit += 1;
            match interaction.ty {
                InteractionType::NoFilter => summary.no_filter += 1,
                InteractionType::DataFilter => summary.data_filter += 1,
                InteractionType::HighlightFilter => summary.highlight_filter += 1,
            }
        }
        summary
    }

    /// All ordered (source, target) id pairs, excluding self-pairs
    pub fn all_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for source in &self.visuals {
            for target in &self.visuals {
                if source.id != target.id {
                    pairs.push((source.id.clone(), target.id.clone()));
                }
            }
        }
        pairs
    }

    /// Set one pair's override without capability validation; `None`
    /// removes the override. Returns the recorded change, or `None` when
    /// nothing changed (including self-pairs, which are rejected).
    pub fn set_interaction(
        &mut self,
        source: &str,
        target: &str,
        new: Option<InteractionType>,
    ) -> Option<InteractionChange> {
        if source == target {
            return None;
        }
        let old = self.interaction_type(source, target);
        if old == new {
            return None;
        }
        self.apply_interaction(source, target, new);
        Some(InteractionChange {
            source: source.to_string(),
            target: target.to_string(),
            old,
            new,
        })
    }

    /// Apply one interaction type to a set of pairs (or the whole page
    /// when `pairs` is `None`), validating each pair against the
    /// capability table and silently substituting the fallback type when
    /// the request is invalid for that pair.
    ///
    /// Unknown visual ids in `pairs` are skipped. The outcome lists
    /// every real change and, separately, how many pairs needed a
    /// fallback substitution.
    pub fn bulk_set_interactions(
        &mut self,
        pairs: Option<&[(String, String)]>,
        requested: Option<InteractionType>,
    ) -> BulkOutcome {
        let targets: Vec<(String, String)> = match pairs {
            Some(pairs) => pairs.to_vec(),
            None => self.all_pairs(),
        };

        let mut outcome = BulkOutcome::default();

        for (source, target) in &targets {
            if source == target {
                continue;
            }
            let (Some(source_visual), Some(target_visual)) =
                (self.visual(source), self.visual(target))
            else {
                continue;
            };

            let mut to_apply = requested;
            if let Some(ty) = requested
                && ty != InteractionType::NoFilter
                && !is_valid_interaction(
                    &source_visual.visual_type,
                    &target_visual.visual_type,
                    Some(ty),
                )
            {
                to_apply = Some(interaction_fallback(
                    &source_visual.visual_type,
                    &target_visual.visual_type,
                    ty,
                ));
                outcome.fallbacks += 1;
            }

            let old = self.interaction_type(source, target);
            if old != to_apply {
                self.apply_interaction(source, target, to_apply);
                outcome.changes.push(InteractionChange {
                    source: source.clone(),
                    target: target.clone(),
                    old,
                    new: to_apply,
                });
            }
        }

        outcome
    }

    /// Write a pair's override state directly (used by undo to restore
    /// old values without re-validating them).
    pub(crate) fn apply_interaction(
        &mut self,
        source: &str,
        target: &str,
        ty: Option<InteractionType>,
    ) {
        let existing = self
            .interactions
            .iter()
            .position(|i| i.source == source && i.target == target);

        match (ty, existing) {
            (None, Some(index)) => {
                self.interactions.remove(index);
            }
            (None, None) => {}
            (Some(ty), Some(index)) => {
                self.interactions[index].ty = ty;
            }
            (Some(ty), None) => {
                self.interactions.push(Interaction {
                    source: source.to_string(),
                    target: target.to_string(),
                    ty,
                });
            }
        }
    }

    /// True when the override list differs from the last-saved state
    pub fn is_modified(&self) -> bool {
        self.interactions != self.saved_interactions
    }

    /// Discard all edits, restoring the last-saved override list
    pub fn revert(&mut self) {
        self.interactions = self.saved_interactions.clone();
    }

    /// Build the document to persist: the saved document with the
    /// override list replaced. An empty list omits the
    /// `visualInteractions` key entirely, never an empty array.
    pub fn build_document(&self) -> Value {
        let mut doc = self.saved.clone();
        let Some(root) = doc.as_object_mut() else {
            return doc;
        };
        root.remove("visualInteractions");
        if !self.interactions.is_empty()
            && let Ok(list) = serde_json::to_value(&self.interactions)
        {
            root.insert("visualInteractions".to_string(), list);
        }
        doc
    }

    /// Record `document` as the new on-disk state after a save
    pub fn mark_saved(&mut self, document: Value) {
        self.saved = document;
        self.saved_interactions = self.interactions.clone();
    }
}

/// Read the override list leniently: malformed entries, self-pairs and
/// duplicate pairs are dropped with a warning instead of failing the
/// whole page.
fn extract_interactions(doc: &Value, path: &std::path::Path) -> Vec<Interaction> {
    let Some(entries) = doc.get("visualInteractions").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut interactions: Vec<Interaction> = Vec::new();
    for entry in entries {
        let parsed: Option<Interaction> = serde_json::from_value(entry.clone()).ok();
        let Some(interaction) = parsed else {
            warn!(
                "Skipping malformed visualInteractions entry in {}",
                path.display()
            );
            continue;
        };
        if interaction.source == interaction.target {
            warn!(
                "Skipping self-interaction for visual '{}' in {}",
                interaction.source,
                path.display()
            );
            continue;
        }
        if interactions
            .iter()
            .any(|i| i.source == interaction.source && i.target == interaction.target)
        {
            warn!(
                "Skipping duplicate interaction {} -> {} in {}",
                interaction.source,
                interaction.target,
                path.display()
            );
            continue;
        }
        interactions.push(interaction);
    }
    interactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(id: &str, visual_type: &str) -> VisualSummary {
        VisualSummary {
            id: id.to_string(),
            name: String::new(),
            visual_type: visual_type.to_string(),
            has_explicit_title: false,
        }
    }

    fn three_visual_page() -> Page {
        let mut page = Page::from_document(
            PathBuf::from("pages/p1/page.json"),
            "p1".to_string(),
            json!({ "displayName": "Overview" }),
        );
        page.visuals = vec![
            summary("a", "lineChart"),
            summary("b", "slicer"),
            summary("c", "textbox"),
        ];
        page
    }

    #[test]
    fn test_matrix_has_no_self_pairs() {
        let page = three_visual_page();
        let matrix = page.interaction_matrix();
        assert_eq!(matrix.len(), 6);
        assert!(matrix.iter().all(|cell| cell.source != cell.target));
        assert!(matrix.iter().all(|cell| cell.ty.is_none()));
    }

    #[test]
    fn test_interaction_type_defaults_to_none() {
        let mut page = three_visual_page();
        assert_eq!(page.interaction_type("a", "b"), None);

        page.set_interaction("a", "b", Some(InteractionType::NoFilter));
        assert_eq!(
            page.interaction_type("a", "b"),
            Some(InteractionType::NoFilter)
        );
        // The reverse direction is untouched
        assert_eq!(page.interaction_type("b", "a"), None);
    }

    #[test]
    fn test_set_interaction_rejects_self_pair() {
        let mut page = three_visual_page();
        assert!(page.set_interaction("a", "a", Some(InteractionType::NoFilter)).is_none());
        assert!(page.interactions.is_empty());
    }

    #[test]
    fn test_set_interaction_none_removes_override() {
        let mut page = three_visual_page();
        page.set_interaction("a", "b", Some(InteractionType::DataFilter));
        assert!(page.is_modified());

        let change = page.set_interaction("a", "b", None).unwrap();
        assert_eq!(change.old, Some(InteractionType::DataFilter));
        assert_eq!(change.new, None);
        assert!(page.interactions.is_empty());
        assert!(!page.is_modified());
    }

    #[test]
    fn test_bulk_no_filter_applies_everywhere_without_fallbacks() {
        let mut page = three_visual_page();
        let outcome = page.bulk_set_interactions(None, Some(InteractionType::NoFilter));

        assert_eq!(outcome.changes.len(), 6);
        assert_eq!(outcome.fallbacks, 0);
        assert_eq!(page.interactions.len(), 6);
        assert!(
            page.interactions
                .iter()
                .all(|i| i.ty == InteractionType::NoFilter)
        );
    }

    #[test]
    fn test_bulk_highlight_degrades_per_capability() {
        let mut page = three_visual_page();
        let outcome = page.bulk_set_interactions(None, Some(InteractionType::HighlightFilter));

        // No visual on this page can highlight, so every pair falls back
        assert_eq!(outcome.fallbacks, 6);
        // lineChart -> slicer: slicer cannot be a filter target either
        assert_eq!(
            page.interaction_type("a", "b"),
            Some(InteractionType::NoFilter)
        );
        // slicer -> lineChart degrades to DataFilter
        assert_eq!(
            page.interaction_type("b", "a"),
            Some(InteractionType::DataFilter)
        );
        // textbox sources nothing
        assert_eq!(
            page.interaction_type("c", "a"),
            Some(InteractionType::NoFilter)
        );
    }

    #[test]
    fn test_bulk_selection_only_touches_selected_pairs() {
        let mut page = three_visual_page();
        let selection = vec![("a".to_string(), "c".to_string())];
        let outcome =
            page.bulk_set_interactions(Some(&selection), Some(InteractionType::NoFilter));

        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(page.interactions.len(), 1);
        assert_eq!(page.interaction_type("a", "b"), None);
    }

    #[test]
    fn test_bulk_skips_unknown_ids() {
        let mut page = three_visual_page();
        let selection = vec![("a".to_string(), "ghost".to_string())];
        let outcome =
            page.bulk_set_interactions(Some(&selection), Some(InteractionType::NoFilter));
        assert!(outcome.changes.is_empty());
        assert_eq!(outcome.fallbacks, 0);
    }

    #[test]
    fn test_bulk_reset_to_default_clears_overrides() {
        let mut page = three_visual_page();
        page.bulk_set_interactions(None, Some(InteractionType::NoFilter));
        let outcome = page.bulk_set_interactions(None, None);

        assert_eq!(outcome.changes.len(), 6);
        assert_eq!(outcome.fallbacks, 0);
        assert!(page.interactions.is_empty());
    }

    #[test]
    fn test_summary_counts_by_type() {
        let mut page = three_visual_page();
        page.set_interaction("a", "b", Some(InteractionType::NoFilter));
        page.set_interaction("b", "a", Some(InteractionType::DataFilter));

        let summary = page.interaction_summary();
        assert_eq!(summary.pairs, 6);
        assert_eq!(summary.explicit, 2);
        assert_eq!(summary.no_filter, 1);
        assert_eq!(summary.data_filter, 1);
        assert_eq!(summary.highlight_filter, 0);
    }

    #[test]
    fn test_build_document_omits_empty_override_list() {
        let mut page = Page::from_document(
            PathBuf::from("pages/p1/page.json"),
            "p1".to_string(),
            json!({
                "displayName": "Overview",
                "visualInteractions": [
                    { "source": "a", "target": "b", "type": "NoFilter" }
                ]
            }),
        );
        page.visuals = vec![summary("a", "barChart"), summary("b", "barChart")];

        page.set_interaction("a", "b", None);
        let doc = page.build_document();
        assert!(doc.get("visualInteractions").is_none());
        assert_eq!(doc["displayName"], json!("Overview"));
    }

    #[test]
    fn test_build_document_serializes_override_list() {
        let mut page = three_visual_page();
        page.set_interaction("a", "b", Some(InteractionType::DataFilter));
        let doc = page.build_document();
        assert_eq!(
            doc["visualInteractions"],
            json!([{ "source": "a", "target": "b", "type": "DataFilter" }])
        );
    }

    #[test]
    fn test_extract_drops_malformed_and_duplicate_entries() {
        let page = Page::from_document(
            PathBuf::from("pages/p1/page.json"),
            "p1".to_string(),
            json!({
                "visualInteractions": [
                    { "source": "a", "target": "b", "type": "NoFilter" },
                    { "source": "a", "target": "b", "type": "DataFilter" },
                    { "source": "a", "target": "a", "type": "NoFilter" },
                    { "source": "x", "type": "NoFilter" },
                    { "source": "b", "target": "a", "type": "Bogus" }
                ]
            }),
        );
        assert_eq!(page.interactions.len(), 1);
        assert_eq!(page.interactions[0].ty, InteractionType::NoFilter);
    }

    #[test]
    fn test_display_name_missing_falls_back_to_id() {
        let page = Page::from_document(
            PathBuf::from("pages/p1/page.json"),
            "p1".to_string(),
            json!({}),
        );
        assert_eq!(page.display_name, "p1");
    }
}
