//! Parsed view of one `visual.json` file.
//!
//! A [`Visual`] keeps the raw document exactly as last saved plus the
//! editable properties extracted from it (filter-card visibility and the
//! `keepLayerOrder` container flag). Edits live only in the model; the
//! document is rebuilt from the model when saving, rather than patched
//! in place as the user types.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value, json};

/// One filter card attached to a visual
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCard {
    /// Filter name from the document, or "Unnamed Filter"
    pub name: String,
    /// Bound column or measure property, empty when unresolvable
    pub field: String,
    /// Filter type string from the document, or "Unknown"
    pub kind: String,
    /// `isHiddenInViewMode`: key absent (`None`), hidden (`Some(true)`)
    /// or explicitly visible (`Some(false)`)
    pub hidden_in_view: Option<bool>,
}

/// Rollup of a visual's filter-pane visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    /// The visual has no filter cards
    NoFilters,
    /// Every filter is explicitly hidden
    Hidden,
    /// Every filter is explicitly visible
    Visible,
    /// No filter sets the property
    Default,
    /// Filters disagree
    Mixed,
}

impl FilterStatus {
    /// Display label for tables and reports
    pub fn label(&self) -> &'static str {
        match self {
            FilterStatus::NoFilters => "No Filters",
            FilterStatus::Hidden => "Hidden",
            FilterStatus::Visible => "Visible",
            FilterStatus::Default => "Default",
            FilterStatus::Mixed => "Mixed",
        }
    }
}

/// One visual on a report page, backed by a `visual.json` file
#[derive(Debug, Clone)]
pub struct Visual {
    /// Path of the `visual.json` file as given to the scanner
    pub path: PathBuf,
    /// Id of the page folder this visual belongs to
    pub page_id: String,
    /// Display name of that page (falls back to the page id)
    pub page_display_name: String,
    /// Visual id (the folder name under `visuals/`)
    pub id: String,
    /// Raw Power BI visual type string, `"unknown"` when undiscoverable
    pub visual_type: String,
    /// Explicit title or Power BI generated name; may be empty
    pub name: String,
    /// Whether the author set a title (generated names don't count)
    pub has_explicit_title: bool,
    /// Filter cards in document order
    pub filters: Vec<FilterCard>,
    /// `keepLayerOrder` container property
    pub keep_layer_order: Option<bool>,
    /// Document as last read from or written to disk
    saved: Value,
}

impl Visual {
    /// Build a visual from its parsed document
    pub fn from_document(
        path: PathBuf,
        page_id: String,
        page_display_name: String,
        id: String,
        document: Value,
    ) -> Self {
        let visual_type = extract_visual_type(&document);
        let title = extract_title(&document);
        let has_explicit_title = title.as_deref().is_some_and(|t| !t.trim().is_empty());
        let name = title
            .or_else(|| {
                document
                    .get("name")
                    .or_else(|| document.get("visual").and_then(|v| v.get("name")))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default();
        let filters = extract_filters(&document);
        let keep_layer_order = extract_keep_layer_order(&document);

        Visual {
            path,
            page_id,
            page_display_name,
            id,
            visual_type,
            name,
            has_explicit_title,
            filters,
            keep_layer_order,
            saved: document,
        }
    }

    /// Name shown in tables: the title, or `type (shortid...)`
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        synthesize_display_name(&self.visual_type, &self.id)
    }

    /// Rollup of filter-pane visibility across this visual's filters
    pub fn filter_status(&self) -> FilterStatus {
        if self.filters.is_empty() {
            return FilterStatus::NoFilters;
        }

        let mut status = None;
        for filter in &self.filters {
            let current = match filter.hidden_in_view {
                Some(true) => FilterStatus::Hidden,
                Some(false) => FilterStatus::Visible,
                None => FilterStatus::Default,
            };
            match status {
                None => status = Some(current),
                Some(previous) if previous != current => return FilterStatus::Mixed,
                Some(_) => {}
            }
        }
        status.unwrap_or(FilterStatus::NoFilters)
    }

    /// Set one filter's visibility. Out-of-range indices are a silent
    /// no-op (stale history references must not panic). Returns the old
    /// value when something actually changed.
    pub fn set_filter_hidden(&mut self, index: usize, value: Option<bool>) -> Option<Option<bool>> {
        let filter = self.filters.get_mut(index)?;
        if filter.hidden_in_view == value {
            return None;
        }
        let old = filter.hidden_in_view;
        filter.hidden_in_view = value;
        Some(old)
    }

    /// Set the `keepLayerOrder` flag; returns the old value when changed
    pub fn set_keep_layer_order(&mut self, value: Option<bool>) -> Option<Option<bool>> {
        if self.keep_layer_order == value {
            return None;
        }
        let old = self.keep_layer_order;
        self.keep_layer_order = value;
        Some(old)
    }

    /// True when any filter card differs from the saved document
    pub fn filter_modified(&self) -> bool {
        extract_filters(&self.saved) != self.filters
    }

    /// True when `keepLayerOrder` differs from the saved document
    pub fn layer_modified(&self) -> bool {
        extract_keep_layer_order(&self.saved) != self.keep_layer_order
    }

    /// True when this visual needs saving
    pub fn is_modified(&self) -> bool {
        self.filter_modified() || self.layer_modified()
    }

    /// Discard filter edits, restoring the last-saved state
    pub fn revert_filters(&mut self) {
        self.filters = extract_filters(&self.saved);
    }

    /// Discard the layer edit, restoring the last-saved state
    pub fn revert_layer(&mut self) {
        self.keep_layer_order = extract_keep_layer_order(&self.saved);
    }

    /// Build the document to persist: the saved document with the
    /// model's filter visibility and layer flag applied.
    pub fn build_document(&self) -> Value {
        let mut doc = self.saved.clone();
        apply_filters(&mut doc, &self.filters);
        apply_keep_layer_order(&mut doc, self.keep_layer_order);
        doc
    }

    /// Record `document` as the new on-disk state after a save
    pub fn mark_saved(&mut self, document: Value) {
        self.saved = document;
    }
}

/// Synthesize a display name from type and id, truncating long ids
pub fn synthesize_display_name(visual_type: &str, id: &str) -> String {
    let short_id = if id.chars().count() > 8 {
        let prefix: String = id.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        id.to_string()
    };
    format!("{visual_type} ({short_id})")
}

/// Discover the visual type, checking the known locations in priority
/// order: `visual.visualType`, `visualType`, `singleVisual.visualType`.
fn extract_visual_type(doc: &Value) -> String {
    doc.get("visual")
        .and_then(|v| v.get("visualType"))
        .or_else(|| doc.get("visualType"))
        .or_else(|| doc.get("singleVisual").and_then(|v| v.get("visualType")))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

/// Extract the author-set title literal, quote-stripped
fn extract_title(doc: &Value) -> Option<String> {
    let literal = doc
        .get("visual")?
        .get("visualContainerObjects")?
        .get("title")?
        .get(0)?
        .get("properties")?
        .get("text")?
        .get("expr")?
        .get("Literal")?
        .get("Value")?
        .as_str()?;
    let stripped = literal.strip_prefix('\'').unwrap_or(literal);
    let stripped = stripped.strip_suffix('\'').unwrap_or(stripped);
    Some(stripped.to_string())
}

fn filter_field(filter: &Value) -> String {
    match filter.get("field") {
        Some(Value::String(s)) => s.clone(),
        Some(field) => field
            .get("Column")
            .or_else(|| field.get("Measure"))
            .and_then(|f| f.get("Property"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    }
}

fn filter_cards_from(array: Option<&Value>, out: &mut Vec<FilterCard>) {
    let Some(filters) = array.and_then(Value::as_array) else {
        return;
    };
    for filter in filters {
        out.push(FilterCard {
            name: filter
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unnamed Filter")
                .to_string(),
            field: filter_field(filter),
            kind: filter
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            hidden_in_view: filter.get("isHiddenInViewMode").and_then(Value::as_bool),
        });
    }
}

/// Collect filter cards from `filterConfig.filters` followed by the
/// legacy top-level `filters` array.
fn extract_filters(doc: &Value) -> Vec<FilterCard> {
    let mut filters = Vec::new();
    filter_cards_from(doc.get("filterConfig").and_then(|c| c.get("filters")), &mut filters);
    filter_cards_from(doc.get("filters"), &mut filters);
    filters
}

/// `visual.visualContainerObjects.general[0].properties.keepLayerOrder`
/// holds a `"true"`/`"false"` string literal.
fn extract_keep_layer_order(doc: &Value) -> Option<bool> {
    let value = doc
        .get("visual")?
        .get("visualContainerObjects")?
        .get("general")?
        .get(0)?
        .get("properties")?
        .get("keepLayerOrder")?
        .get("expr")?
        .get("Literal")?
        .get("Value")?
        .as_str()?;
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Write the model's filter visibility into the document. Card indices
/// map onto `filterConfig.filters` first, then the legacy `filters`
/// array, matching the extraction order.
fn apply_filters(doc: &mut Value, cards: &[FilterCard]) {
    let config_len = doc
        .get("filterConfig")
        .and_then(|c| c.get("filters"))
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    if let Some(filters) = doc
        .get_mut("filterConfig")
        .and_then(|c| c.get_mut("filters"))
        .and_then(Value::as_array_mut)
    {
        for (json_filter, card) in filters.iter_mut().zip(cards.iter().take(config_len)) {
            apply_hidden_flag(json_filter, card.hidden_in_view);
        }
    }

    if let Some(filters) = doc.get_mut("filters").and_then(Value::as_array_mut) {
        for (json_filter, card) in filters.iter_mut().zip(cards.iter().skip(config_len)) {
            apply_hidden_flag(json_filter, card.hidden_in_view);
        }
    }
}

fn apply_hidden_flag(json_filter: &mut Value, hidden: Option<bool>) {
    let Some(obj) = json_filter.as_object_mut() else {
        return;
    };
    match hidden {
        Some(value) => {
            obj.insert("isHiddenInViewMode".to_string(), Value::Bool(value));
        }
        None => {
            obj.remove("isHiddenInViewMode");
        }
    }
}

/// Write or remove the `keepLayerOrder` literal, cleaning up parent
/// objects that become empty on removal.
fn apply_keep_layer_order(doc: &mut Value, value: Option<bool>) {
    let Some(flag) = value else {
        remove_keep_layer_order(doc);
        return;
    };

    let Some(root) = doc.as_object_mut() else {
        return;
    };
    let visual = child_object(root, "visual");
    let vco = child_object(visual, "visualContainerObjects");
    let general = vco
        .entry("general")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Some(items) = general.as_array_mut() else {
        return;
    };
    if items.is_empty() {
        items.push(Value::Object(Map::new()));
    }
    let Some(first) = items[0].as_object_mut() else {
        return;
    };
    let properties = first
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(properties) = properties.as_object_mut() {
        properties.insert(
            "keepLayerOrder".to_string(),
            json!({ "expr": { "Literal": { "Value": flag.to_string() } } }),
        );
    }
}

fn remove_keep_layer_order(doc: &mut Value) {
    let Some(vco) = doc
        .get_mut("visual")
        .and_then(|v| v.get_mut("visualContainerObjects"))
        .and_then(Value::as_object_mut)
    else {
        return;
    };
    let Some(general) = vco.get_mut("general").and_then(Value::as_array_mut) else {
        return;
    };
    if let Some(first) = general.get_mut(0).and_then(Value::as_object_mut) {
        if let Some(properties) = first.get_mut("properties").and_then(Value::as_object_mut) {
            properties.remove("keepLayerOrder");
            if properties.is_empty() {
                first.remove("properties");
            }
        }
        if first.is_empty() {
            general.remove(0);
        }
    }
    if general.is_empty() {
        vco.remove("general");
    }
}

/// Get `map[key]` as a mutable object, creating or replacing as needed
fn child_object<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(obj) => obj,
        _ => unreachable!("entry was just made an object"),
    }
}
