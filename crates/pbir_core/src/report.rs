//! Scan a PBIR folder into an in-memory [`Report`], mutate it, save it.
//!
//! The model is rebuilt from scratch on every scan (no incremental
//! diffing). All edits go through `Report` methods so they land on the
//! undo stacks; saving writes pretty-printed JSON back through the
//! [`FileSystem`] the report was scanned with and resets the
//! modification and undo state.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

use crate::capability::InteractionType;
use crate::error::{PbirError, Result};
use crate::fs::{EntryKind, FileSystem};
use crate::history::{
    FilterChange, FilterEntry, HistoryStack, InteractionEntry, LayerChange, LayerEntry,
};
use crate::page::{Page, VisualSummary};
use crate::visual::Visual;

/// Maximum directory recursion depth. Guards against pathological or
/// circular directory structures, not a correctness requirement.
pub const MAX_SCAN_DEPTH: usize = 50;

/// A non-fatal problem encountered while scanning
#[derive(Debug, Clone)]
pub struct ScanWarning {
    /// File or directory the problem occurred at
    pub path: PathBuf,
    /// Human-readable description
    pub message: String,
}

/// Result of a bulk interaction mutation, for user-facing messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSummary {
    /// Pairs whose effective type changed
    pub changed: usize,
    /// Pairs where the requested type was invalid and a fallback was
    /// substituted (reported separately so the caller can warn)
    pub fallbacks: usize,
}

/// An in-memory PBIR report: pages, visuals, and undo state
pub struct Report {
    root: PathBuf,
    /// Pages in scan order
    pub pages: Vec<Page>,
    /// All visuals in scan order, across pages
    pub visuals: Vec<Visual>,
    /// Report-wide default interaction derived from
    /// `settings.defaultFilterActionIsDataFilter`; display context only,
    /// never consulted during validation
    pub default_interaction: Option<InteractionType>,
    /// Non-fatal problems from the last scan
    pub warnings: Vec<ScanWarning>,
    interaction_history: HistoryStack<InteractionEntry>,
    filter_history: HistoryStack<FilterEntry>,
    layer_history: HistoryStack<LayerEntry>,
}

impl Report {
    /// Scan a PBIR folder into a fresh report.
    ///
    /// Malformed JSON files are skipped with a warning; only a missing
    /// root directory is fatal.
    pub fn scan<FS: FileSystem>(fs: &FS, root: &Path) -> Result<Report> {
        if !fs.is_dir(root) {
            return Err(PbirError::ReportNotFound(root.to_path_buf()));
        }

        let mut warnings = Vec::new();
        let mut page_files = Vec::new();
        let mut visual_files = Vec::new();
        collect_files(
            fs,
            root,
            0,
            &mut page_files,
            &mut visual_files,
            &mut warnings,
        );
        debug!(
            "Scan of {} found {} page file(s), {} visual file(s)",
            root.display(),
            page_files.len(),
            visual_files.len()
        );

        // Pass 1: pages and their display names
        let mut pages = Vec::new();
        let mut display_names: IndexMap<String, String> = IndexMap::new();
        for path in page_files {
            match read_json(fs, &path) {
                Ok(doc) => {
                    let id = page_id_of(&path);
                    let page = Page::from_document(path, id.clone(), doc);
                    display_names.insert(id, page.display_name.clone());
                    pages.push(page);
                }
                Err(warning) => warnings.push(warning),
            }
        }

        // Pass 2: report-level settings
        let default_interaction = read_default_interaction(fs, root, &mut warnings);

        // Pass 3: visuals
        let mut visuals = Vec::new();
        for path in visual_files {
            match read_json(fs, &path) {
                Ok(doc) => {
                    let (page_id, visual_id) = ids_from_path(root, &path);
                    let page_display_name = display_names
                        .get(&page_id)
                        .cloned()
                        .unwrap_or_else(|| page_id.clone());
                    visuals.push(Visual::from_document(
                        path,
                        page_id,
                        page_display_name,
                        visual_id,
                        doc,
                    ));
                }
                Err(warning) => warnings.push(warning),
            }
        }

        // Pass 4: attach visual summaries to their pages
        for page in &mut pages {
            page.visuals = visuals
                .iter()
                .filter(|v| v.page_id == page.id)
                .map(|v| VisualSummary {
                    id: v.id.clone(),
                    name: v.name.clone(),
                    visual_type: v.visual_type.clone(),
                    has_explicit_title: v.has_explicit_title,
                })
                .collect();
        }

        for warning in &warnings {
            warn!("{}: {}", warning.path.display(), warning.message);
        }

        Ok(Report {
            root: root.to_path_buf(),
            pages,
            visuals,
            default_interaction,
            warnings,
            interaction_history: HistoryStack::new(),
            filter_history: HistoryStack::new(),
            layer_history: HistoryStack::new(),
        })
    }

    /// The folder this report was scanned from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a page by id
    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// Look up a visual by its `visual.json` path
    pub fn visual_by_path(&self, path: &Path) -> Option<&Visual> {
        self.visuals.iter().find(|v| v.path == path)
    }

    /// Pages with unsaved interaction edits
    pub fn modified_page_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_modified()).count()
    }

    /// Visuals with unsaved filter or layer edits
    pub fn modified_visual_count(&self) -> usize {
        self.visuals.iter().filter(|v| v.is_modified()).count()
    }

    /// Entries on the interaction undo stack
    pub fn interaction_history_len(&self) -> usize {
        self.interaction_history.len()
    }

    /// Entries on the filter-visibility undo stack
    pub fn filter_history_len(&self) -> usize {
        self.filter_history.len()
    }

    /// Entries on the layer-order undo stack
    pub fn layer_history_len(&self) -> usize {
        self.layer_history.len()
    }

    // ==================== Interaction edits ====================

    /// Set one pair's override on a page (no capability validation, like
    /// a direct cell edit). Unknown pages are a silent no-op. Returns
    /// true when something changed.
    pub fn set_interaction(
        &mut self,
        page_id: &str,
        source: &str,
        target: &str,
        new: Option<InteractionType>,
    ) -> bool {
        let Some(page) = self.pages.iter_mut().find(|p| p.id == page_id) else {
            return false;
        };
        match page.set_interaction(source, target, new) {
            Some(change) => {
                self.interaction_history
                    .push(InteractionEntry::new(page_id.to_string(), vec![change]));
                true
            }
            None => false,
        }
    }

    /// Apply one interaction type to a selection of pairs (or the whole
    /// page when `pairs` is `None`), with capability validation and
    /// fallback substitution. One history entry for the whole gesture.
    pub fn bulk_set_interactions(
        &mut self,
        page_id: &str,
        pairs: Option<&[(String, String)]>,
        requested: Option<InteractionType>,
    ) -> BulkSummary {
        let Some(page) = self.pages.iter_mut().find(|p| p.id == page_id) else {
            return BulkSummary::default();
        };
        let outcome = page.bulk_set_interactions(pairs, requested);
        let summary = BulkSummary {
            changed: outcome.changes.len(),
            fallbacks: outcome.fallbacks,
        };
        if !outcome.changes.is_empty() {
            self.interaction_history
                .push(InteractionEntry::new(page_id.to_string(), outcome.changes));
        }
        summary
    }

    /// Undo the most recent interaction edit. Returns false when there
    /// is nothing to undo or the page no longer exists.
    pub fn undo_interaction(&mut self) -> bool {
        let Some(entry) = self.interaction_history.pop() else {
            return false;
        };
        let Some(page) = self.pages.iter_mut().find(|p| p.id == entry.page_id) else {
            return false;
        };
        for change in &entry.changes {
            page.apply_interaction(&change.source, &change.target, change.old);
        }
        true
    }

    /// Discard the interaction undo stack and reload every page's
    /// override list from its last-saved state.
    pub fn undo_all_interactions(&mut self) -> bool {
        if self.interaction_history.is_empty() {
            return false;
        }
        for page in &mut self.pages {
            page.revert();
        }
        self.interaction_history.clear();
        true
    }

    // ==================== Filter visibility edits ====================

    /// Set `isHiddenInViewMode` on every filter of the selected visuals
    /// (`None` removes the property). One history entry for the gesture.
    /// Returns the number of filter cards changed.
    pub fn set_filter_visibility(&mut self, paths: &[PathBuf], value: Option<bool>) -> usize {
        let mut changes = Vec::new();
        for path in paths {
            let Some(visual) = self.visuals.iter_mut().find(|v| &v.path == path) else {
                continue;
            };
            for index in 0..visual.filters.len() {
                if let Some(old) = visual.set_filter_hidden(index, value) {
                    changes.push(FilterChange {
                        visual_path: path.clone(),
                        filter_index: index,
                        old,
                        new: value,
                    });
                }
            }
        }
        let count = changes.len();
        if count > 0 {
            self.filter_history.push(FilterEntry::new(changes));
        }
        count
    }

    /// Set one filter card's visibility. Returns true when changed.
    pub fn set_single_filter(&mut self, path: &Path, index: usize, value: Option<bool>) -> bool {
        let Some(visual) = self.visuals.iter_mut().find(|v| v.path == path) else {
            return false;
        };
        match visual.set_filter_hidden(index, value) {
            Some(old) => {
                self.filter_history.push(FilterEntry::new(vec![FilterChange {
                    visual_path: path.to_path_buf(),
                    filter_index: index,
                    old,
                    new: value,
                }]));
                true
            }
            None => false,
        }
    }

    /// Apply a per-card visibility pattern (used by custom presets).
    /// Each entry pairs a visual path with one value per filter card;
    /// extra values beyond the visual's card count are ignored. One
    /// history entry for the whole gesture.
    pub fn set_filter_pattern(&mut self, settings: &[(PathBuf, Vec<Option<bool>>)]) -> usize {
        let mut changes = Vec::new();
        for (path, values) in settings {
            let Some(visual) = self.visuals.iter_mut().find(|v| &v.path == path) else {
                continue;
            };
            for (index, value) in values.iter().enumerate().take(visual.filters.len()) {
                if let Some(old) = visual.set_filter_hidden(index, *value) {
                    changes.push(FilterChange {
                        visual_path: path.clone(),
                        filter_index: index,
                        old,
                        new: *value,
                    });
                }
            }
        }
        let count = changes.len();
        if count > 0 {
            self.filter_history.push(FilterEntry::new(changes));
        }
        count
    }

    /// Apply a per-visual layer pattern (used by custom presets)
    pub fn set_layer_pattern(&mut self, settings: &[(PathBuf, Option<bool>)]) -> usize {
        let mut changes = Vec::new();
        for (path, value) in settings {
            let Some(visual) = self.visuals.iter_mut().find(|v| &v.path == path) else {
                continue;
            };
            if let Some(old) = visual.set_keep_layer_order(*value) {
                changes.push(LayerChange {
                    visual_path: path.clone(),
                    old,
                    new: *value,
                });
            }
        }
        let count = changes.len();
        if count > 0 {
            self.layer_history.push(LayerEntry::new(changes));
        }
        count
    }

    /// Undo the most recent filter-visibility edit. Stale visual paths
    /// and out-of-range filter indices are silently skipped.
    pub fn undo_filter(&mut self) -> bool {
        let Some(entry) = self.filter_history.pop() else {
            return false;
        };
        for change in &entry.changes {
            if let Some(visual) = self
                .visuals
                .iter_mut()
                .find(|v| v.path == change.visual_path)
            {
                visual.set_filter_hidden(change.filter_index, change.old);
            }
        }
        true
    }

    /// Discard the filter undo stack and reload every visual's filter
    /// cards from its last-saved state.
    pub fn undo_all_filters(&mut self) -> bool {
        if self.filter_history.is_empty() {
            return false;
        }
        for visual in &mut self.visuals {
            visual.revert_filters();
        }
        self.filter_history.clear();
        true
    }

    // ==================== Layer order edits ====================

    /// Set `keepLayerOrder` on the selected visuals (`None` removes the
    /// property). Returns the number of visuals changed.
    pub fn set_layer_order(&mut self, paths: &[PathBuf], value: Option<bool>) -> usize {
        let mut changes = Vec::new();
        for path in paths {
            let Some(visual) = self.visuals.iter_mut().find(|v| &v.path == path) else {
                continue;
            };
            if let Some(old) = visual.set_keep_layer_order(value) {
                changes.push(LayerChange {
                    visual_path: path.clone(),
                    old,
                    new: value,
                });
            }
        }
        let count = changes.len();
        if count > 0 {
            self.layer_history.push(LayerEntry::new(changes));
        }
        count
    }

    /// Undo the most recent layer-order edit
    pub fn undo_layer(&mut self) -> bool {
        let Some(entry) = self.layer_history.pop() else {
            return false;
        };
        for change in &entry.changes {
            if let Some(visual) = self
                .visuals
                .iter_mut()
                .find(|v| v.path == change.visual_path)
            {
                visual.set_keep_layer_order(change.old);
            }
        }
        true
    }

    /// Discard the layer undo stack and reload every visual's
    /// `keepLayerOrder` from its last-saved state.
    pub fn undo_all_layers(&mut self) -> bool {
        if self.layer_history.is_empty() {
            return false;
        }
        for visual in &mut self.visuals {
            visual.revert_layer();
        }
        self.layer_history.clear();
        true
    }

    // ==================== Saving ====================

    /// Write every modified page back to disk and reset the interaction
    /// undo state. On failure the in-memory state is left intact so the
    /// caller can retry; pages written before the failure stay saved.
    pub fn save_interactions<FS: FileSystem>(&mut self, fs: &FS) -> Result<usize> {
        let mut saved = 0;
        for page in self.pages.iter_mut().filter(|p| p.is_modified()) {
            let doc = page.build_document();
            let content = serde_json::to_string_pretty(&doc)?;
            fs.write_file(&page.path, &content)
                .map_err(|e| PbirError::file_write(page.path.clone(), e))?;
            page.mark_saved(doc);
            saved += 1;
        }
        if saved > 0 {
            self.interaction_history.clear();
        }
        Ok(saved)
    }

    /// Write every modified visual back to disk and reset the filter and
    /// layer undo state. Same failure semantics as
    /// [`Report::save_interactions`].
    pub fn save_visuals<FS: FileSystem>(&mut self, fs: &FS) -> Result<usize> {
        let mut saved = 0;
        for visual in self.visuals.iter_mut().filter(|v| v.is_modified()) {
            let doc = visual.build_document();
            let content = serde_json::to_string_pretty(&doc)?;
            fs.write_file(&visual.path, &content)
                .map_err(|e| PbirError::file_write(visual.path.clone(), e))?;
            visual.mark_saved(doc);
            saved += 1;
        }
        if saved > 0 {
            self.filter_history.clear();
            self.layer_history.clear();
        }
        Ok(saved)
    }
}

fn read_json<FS: FileSystem>(
    fs: &FS,
    path: &Path,
) -> std::result::Result<Value, ScanWarning> {
    let content = fs.read_to_string(path).map_err(|e| ScanWarning {
        path: path.to_path_buf(),
        message: format!("Could not read file: {e}"),
    })?;
    serde_json::from_str(&content).map_err(|e| ScanWarning {
        path: path.to_path_buf(),
        message: format!("Invalid JSON, file skipped: {e}"),
    })
}

/// Depth-first traversal collecting `page.json` and `visual.json` paths
fn collect_files<FS: FileSystem>(
    fs: &FS,
    dir: &Path,
    depth: usize,
    pages: &mut Vec<PathBuf>,
    visuals: &mut Vec<PathBuf>,
    warnings: &mut Vec<ScanWarning>,
) {
    if depth >= MAX_SCAN_DEPTH {
        warn!(
            "Max directory depth ({MAX_SCAN_DEPTH}) reached at {}",
            dir.display()
        );
        return;
    }

    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warnings.push(ScanWarning {
                path: dir.to_path_buf(),
                message: format!("Could not list directory: {err}"),
            });
            return;
        }
    };

    for entry in entries {
        let path = dir.join(&entry.name);
        match entry.kind {
            EntryKind::Directory => {
                collect_files(fs, &path, depth + 1, pages, visuals, warnings)
            }
            EntryKind::File if entry.name == "page.json" => pages.push(path),
            EntryKind::File if entry.name == "visual.json" => visuals.push(path),
            EntryKind::File => {}
        }
    }
}

/// Page id is the name of the folder holding `page.json`
fn page_id_of(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown-page".to_string())
}

/// Derive (page id, visual id) from a `visual.json` path. The canonical
/// layout is `.../pages/<page>/visuals/<visual>/visual.json`; positional
/// fallbacks handle non-standard trees.
fn ids_from_path(root: &Path, path: &Path) -> (String, String) {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let mut page_id = String::new();
    let mut visual_id = String::new();

    if let Some(index) = parts.iter().position(|p| p == "pages")
        && index + 1 < parts.len()
    {
        page_id = parts[index + 1].clone();
    }
    if let Some(index) = parts.iter().position(|p| p == "visuals")
        && index + 1 < parts.len()
    {
        visual_id = parts[index + 1].clone();
    }

    if page_id.is_empty() && parts.len() >= 2 {
        page_id = if parts.len() >= 4 {
            parts[parts.len() - 4].clone()
        } else {
            parts[0].clone()
        };
    }
    if visual_id.is_empty() && parts.len() >= 2 {
        visual_id = parts[parts.len() - 2].clone();
    }
    if page_id.is_empty() {
        page_id = "unknown-page".to_string();
    }
    if visual_id.is_empty() {
        visual_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "visual".to_string());
    }

    (page_id, visual_id)
}

/// `definition/report.json` may carry the report-wide default
/// interaction. A missing file is normal; malformed JSON is a warning.
fn read_default_interaction<FS: FileSystem>(
    fs: &FS,
    root: &Path,
    warnings: &mut Vec<ScanWarning>,
) -> Option<InteractionType> {
    let path = root.join("definition").join("report.json");
    if !fs.exists(&path) {
        debug!("No report.json found (this is normal for many reports)");
        return None;
    }
    let doc = match read_json(fs, &path) {
        Ok(doc) => doc,
        Err(warning) => {
            warnings.push(warning);
            return None;
        }
    };
    doc.get("settings")
        .and_then(|s| s.get("defaultFilterActionIsDataFilter"))
        .and_then(Value::as_bool)
        .map(|is_data_filter| {
            if is_data_filter {
                InteractionType::DataFilter
            } else {
                InteractionType::HighlightFilter
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;
    use serde_json::json;

    fn write_json(fs: &InMemoryFileSystem, path: &str, value: Value) {
        fs.write_file(Path::new(path), &serde_json::to_string_pretty(&value).unwrap())
            .unwrap();
    }

    /// A report with one page of three visuals: a line chart, a slicer
    /// and a textbox.
    fn sample_fs() -> InMemoryFileSystem {
        let fs = InMemoryFileSystem::new();
        write_json(
            &fs,
            "report/definition/report.json",
            json!({ "settings": { "defaultFilterActionIsDataFilter": true } }),
        );
        write_json(
            &fs,
            "report/definition/pages/p1/page.json",
            json!({ "displayName": "Overview" }),
        );
        write_json(
            &fs,
            "report/definition/pages/p1/visuals/a/visual.json",
            json!({
                "visual": { "visualType": "lineChart" },
                "filterConfig": { "filters": [{ "name": "f1" }] }
            }),
        );
        write_json(
            &fs,
            "report/definition/pages/p1/visuals/b/visual.json",
            json!({ "visual": { "visualType": "slicer" } }),
        );
        write_json(
            &fs,
            "report/definition/pages/p1/visuals/c/visual.json",
            json!({ "visual": { "visualType": "textbox" } }),
        );
        fs
    }

    fn scan(fs: &InMemoryFileSystem) -> Report {
        Report::scan(fs, Path::new("report")).unwrap()
    }

    #[test]
    fn test_scan_builds_pages_and_visuals() {
        let fs = sample_fs();
        let report = scan(&fs);

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.visuals.len(), 3);
        assert!(report.warnings.is_empty());

        let page = report.page("p1").unwrap();
        assert_eq!(page.display_name, "Overview");
        assert_eq!(page.visuals.len(), 3);
        assert_eq!(page.visuals[0].id, "a");
        assert_eq!(page.visuals[0].visual_type, "lineChart");

        let visual = report
            .visual_by_path(Path::new("report/definition/pages/p1/visuals/a/visual.json"))
            .unwrap();
        assert_eq!(visual.page_display_name, "Overview");
    }

    #[test]
    fn test_scan_reads_report_default_interaction() {
        let fs = sample_fs();
        let report = scan(&fs);
        assert_eq!(
            report.default_interaction,
            Some(InteractionType::DataFilter)
        );

        // Absent report.json means "unknown", not an error
        let bare = InMemoryFileSystem::new();
        write_json(&bare, "r/pages/p1/page.json", json!({}));
        let report = Report::scan(&bare, Path::new("r")).unwrap();
        assert_eq!(report.default_interaction, None);
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let fs = InMemoryFileSystem::new();
        assert!(matches!(
            Report::scan(&fs, Path::new("nope")),
            Err(PbirError::ReportNotFound(_))
        ));
    }

    #[test]
    fn test_scan_skips_malformed_json_with_warning() {
        let fs = sample_fs();
        fs.write_file(
            Path::new("report/definition/pages/p2/page.json"),
            "{ not json",
        )
        .unwrap();

        let report = scan(&fs);
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("Invalid JSON"));
    }

    #[test]
    fn test_malformed_report_json_is_a_warning() {
        let fs = sample_fs();
        fs.write_file(Path::new("report/definition/report.json"), "oops")
            .unwrap();
        let report = scan(&fs);
        assert_eq!(report.default_interaction, None);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_bulk_set_save_and_rescan_round_trip() {
        let fs = sample_fs();
        let mut report = scan(&fs);

        let summary =
            report.bulk_set_interactions("p1", None, Some(InteractionType::NoFilter));
        assert_eq!(summary.changed, 6);
        assert_eq!(summary.fallbacks, 0);
        assert_eq!(report.modified_page_count(), 1);

        let saved = report.save_interactions(&fs).unwrap();
        assert_eq!(saved, 1);
        assert_eq!(report.modified_page_count(), 0);
        assert_eq!(report.interaction_history_len(), 0);

        let rescanned = scan(&fs);
        let page = rescanned.page("p1").unwrap();
        assert_eq!(page.interactions.len(), 6);
        assert!(
            page.interactions
                .iter()
                .all(|i| i.ty == InteractionType::NoFilter)
        );
    }

    #[test]
    fn test_bulk_highlight_reports_fallbacks() {
        let fs = sample_fs();
        let mut report = scan(&fs);

        let summary =
            report.bulk_set_interactions("p1", None, Some(InteractionType::HighlightFilter));
        // lineChart, slicer and textbox: nothing can highlight here
        assert_eq!(summary.fallbacks, 6);
        assert!(summary.changed > 0);
    }

    #[test]
    fn test_undo_restores_previous_effective_type() {
        let fs = sample_fs();
        let mut report = scan(&fs);

        report.set_interaction("p1", "a", "c", Some(InteractionType::NoFilter));
        report.set_interaction("p1", "a", "c", Some(InteractionType::DataFilter));
        assert_eq!(
            report.page("p1").unwrap().interaction_type("a", "c"),
            Some(InteractionType::DataFilter)
        );

        assert!(report.undo_interaction());
        assert_eq!(
            report.page("p1").unwrap().interaction_type("a", "c"),
            Some(InteractionType::NoFilter)
        );

        assert!(report.undo_interaction());
        assert_eq!(report.page("p1").unwrap().interaction_type("a", "c"), None);
        assert!(!report.undo_interaction());
    }

    #[test]
    fn test_undo_all_restores_last_saved_override_list() {
        let fs = sample_fs();
        let mut report = scan(&fs);

        // Establish a saved baseline with one override
        report.set_interaction("p1", "a", "c", Some(InteractionType::DataFilter));
        report.save_interactions(&fs).unwrap();
        let baseline = report.page("p1").unwrap().interactions.clone();

        // Pile up edits, then undo all
        report.bulk_set_interactions("p1", None, Some(InteractionType::NoFilter));
        report.set_interaction("p1", "b", "a", None);
        assert!(report.undo_all_interactions());

        assert_eq!(report.page("p1").unwrap().interactions, baseline);
        assert_eq!(report.modified_page_count(), 0);
        assert_eq!(report.interaction_history_len(), 0);
    }

    #[test]
    fn test_removing_last_override_omits_key_on_disk() {
        let fs = sample_fs();
        let mut report = scan(&fs);

        report.set_interaction("p1", "a", "c", Some(InteractionType::NoFilter));
        report.save_interactions(&fs).unwrap();

        report.set_interaction("p1", "a", "c", None);
        report.save_interactions(&fs).unwrap();

        let content = fs
            .read_to_string(Path::new("report/definition/pages/p1/page.json"))
            .unwrap();
        let doc: Value = serde_json::from_str(&content).unwrap();
        assert!(doc.get("visualInteractions").is_none());
    }

    #[test]
    fn test_filter_visibility_bulk_and_undo() {
        let fs = sample_fs();
        let mut report = scan(&fs);
        let path = PathBuf::from("report/definition/pages/p1/visuals/a/visual.json");

        let changed = report.set_filter_visibility(&[path.clone()], Some(true));
        assert_eq!(changed, 1);
        assert_eq!(report.modified_visual_count(), 1);

        assert!(report.undo_filter());
        assert_eq!(report.modified_visual_count(), 0);
        assert_eq!(report.filter_history_len(), 0);
    }

    #[test]
    fn test_layer_order_save_round_trip() {
        let fs = sample_fs();
        let mut report = scan(&fs);
        let path = PathBuf::from("report/definition/pages/p1/visuals/b/visual.json");

        assert_eq!(report.set_layer_order(&[path.clone()], Some(true)), 1);
        report.save_visuals(&fs).unwrap();

        let rescanned = scan(&fs);
        let visual = rescanned.visual_by_path(&path).unwrap();
        assert_eq!(visual.keep_layer_order, Some(true));
    }

    #[test]
    fn test_ids_from_path_fallbacks() {
        let root = Path::new("r");
        assert_eq!(
            ids_from_path(root, Path::new("r/definition/pages/p1/visuals/v9/visual.json")),
            ("p1".to_string(), "v9".to_string())
        );
        // No pages/visuals markers: positional fallback
        assert_eq!(
            ids_from_path(root, Path::new("r/x/p2/stuff/v3/visual.json")),
            ("p2".to_string(), "v3".to_string())
        );
    }

    /// A filesystem whose writes always fail, for save-error tests
    struct ReadOnlyFs(InMemoryFileSystem);

    impl FileSystem for ReadOnlyFs {
        fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            self.0.read_to_string(path)
        }
        fn write_file(&self, _path: &Path, _content: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            ))
        }
        fn read_dir(&self, dir: &Path) -> std::io::Result<Vec<crate::fs::DirEntry>> {
            self.0.read_dir(dir)
        }
        fn exists(&self, path: &Path) -> bool {
            self.0.exists(path)
        }
        fn is_dir(&self, path: &Path) -> bool {
            self.0.is_dir(path)
        }
    }

    #[test]
    fn test_failed_save_keeps_state_for_retry() {
        let fs = sample_fs();
        let mut report = scan(&fs);
        report.set_interaction("p1", "a", "c", Some(InteractionType::NoFilter));

        let read_only = ReadOnlyFs(fs.clone());
        let err = report.save_interactions(&read_only).unwrap_err();
        match err {
            PbirError::FileWrite { kind, .. } => {
                assert_eq!(kind, crate::error::SaveErrorKind::PermissionDenied);
            }
            other => panic!("Expected FileWrite, got {other:?}"),
        }

        // Modified state and history survive the failure
        assert_eq!(report.modified_page_count(), 1);
        assert_eq!(report.interaction_history_len(), 1);

        // Retrying against the writable filesystem succeeds
        assert_eq!(report.save_interactions(&fs).unwrap(), 1);
        assert_eq!(report.modified_page_count(), 0);
    }
}
