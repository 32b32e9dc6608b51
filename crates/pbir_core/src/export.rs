//! Export report state for use outside the tool.
//!
//! Three flat row shapes (interactions, filter visibility, layer order)
//! each render to pretty-printed JSON or to CSV. CSV output quotes every
//! field and doubles embedded quotes so titles with commas or newlines
//! survive a spreadsheet import.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::report::Report;

/// Output format for an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON with a small envelope
    Json,
    /// CSV with a header row
    Csv,
}

/// Envelope shared by all JSON exports
#[derive(Debug, Serialize)]
struct Envelope<'a, R: Serialize> {
    report_root: String,
    generated_at: DateTime<Utc>,
    rows: &'a [R],
}

/// One (source, target) pair in the interaction export
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRow {
    /// Page id
    pub page: String,
    /// Page display name
    pub page_name: String,
    /// Source visual id
    pub source: String,
    /// Source display name
    pub source_name: String,
    /// Target visual id
    pub target: String,
    /// Target display name
    pub target_name: String,
    /// "Default", "None", "Filter" or "Highlight"
    pub interaction: String,
}

/// One filter card in the filter-visibility export
#[derive(Debug, Clone, Serialize)]
pub struct FilterRow {
    /// Page display name
    pub page: String,
    /// Visual display name
    pub visual: String,
    /// Raw visual type string
    pub visual_type: String,
    /// Filter card name
    pub filter: String,
    /// Bound field, may be empty
    pub field: String,
    /// Filter type string
    pub kind: String,
    /// "Hidden", "Visible" or "Default"
    pub visibility: String,
}

/// One visual in the layer-order export
#[derive(Debug, Clone, Serialize)]
pub struct LayerRow {
    /// Page display name
    pub page: String,
    /// Visual display name
    pub visual: String,
    /// Raw visual type string
    pub visual_type: String,
    /// "true", "false" or "unset"
    pub keep_layer_order: String,
}

/// Flatten every page's dense matrix into export rows
pub fn interaction_rows(report: &Report) -> Vec<InteractionRow> {
    let mut rows = Vec::new();
    for page in &report.pages {
        for cell in page.interaction_matrix() {
            rows.push(InteractionRow {
                page: page.id.clone(),
                page_name: page.display_name.clone(),
                source: cell.source,
                source_name: cell.source_name,
                target: cell.target,
                target_name: cell.target_name,
                interaction: cell
                    .ty
                    .map(|ty| ty.label().to_string())
                    .unwrap_or_else(|| "Default".to_string()),
            });
        }
    }
    rows
}

/// Flatten every visual's filter cards into export rows
pub fn filter_rows(report: &Report) -> Vec<FilterRow> {
    let mut rows = Vec::new();
    for visual in &report.visuals {
        for card in &visual.filters {
            rows.push(FilterRow {
                page: visual.page_display_name.clone(),
                visual: visual.display_name(),
                visual_type: visual.visual_type.clone(),
                filter: card.name.clone(),
                field: card.field.clone(),
                kind: card.kind.clone(),
                visibility: match card.hidden_in_view {
                    Some(true) => "Hidden",
                    Some(false) => "Visible",
                    None => "Default",
                }
                .to_string(),
            });
        }
    }
    rows
}

/// One export row per visual with its layer flag
pub fn layer_rows(report: &Report) -> Vec<LayerRow> {
    report
        .visuals
        .iter()
        .map(|visual| LayerRow {
            page: visual.page_display_name.clone(),
            visual: visual.display_name(),
            visual_type: visual.visual_type.clone(),
            keep_layer_order: match visual.keep_layer_order {
                Some(flag) => flag.to_string(),
                None => "unset".to_string(),
            },
        })
        .collect()
}

/// Render the interaction export in the requested format
pub fn export_interactions(report: &Report, format: ExportFormat) -> Result<String> {
    let rows = interaction_rows(report);
    match format {
        ExportFormat::Json => to_json(report, &rows),
        ExportFormat::Csv => Ok(to_csv(
            &[
                "page",
                "page_name",
                "source",
                "source_name",
                "target",
                "target_name",
                "interaction",
            ],
            rows.iter().map(|r| {
                vec![
                    r.page.clone(),
                    r.page_name.clone(),
                    r.source.clone(),
                    r.source_name.clone(),
                    r.target.clone(),
                    r.target_name.clone(),
                    r.interaction.clone(),
                ]
            }),
        )),
    }
}

/// Render the filter-visibility export in the requested format
pub fn export_filters(report: &Report, format: ExportFormat) -> Result<String> {
    let rows = filter_rows(report);
    match format {
        ExportFormat::Json => to_json(report, &rows),
        ExportFormat::Csv => Ok(to_csv(
            &[
                "page",
                "visual",
                "visual_type",
                "filter",
                "field",
                "kind",
                "visibility",
            ],
            rows.iter().map(|r| {
                vec![
                    r.page.clone(),
                    r.visual.clone(),
                    r.visual_type.clone(),
                    r.filter.clone(),
                    r.field.clone(),
                    r.kind.clone(),
                    r.visibility.clone(),
                ]
            }),
        )),
    }
}

/// Render the layer-order export in the requested format
pub fn export_layers(report: &Report, format: ExportFormat) -> Result<String> {
    let rows = layer_rows(report);
    match format {
        ExportFormat::Json => to_json(report, &rows),
        ExportFormat::Csv => Ok(to_csv(
            &["page", "visual", "visual_type", "keep_layer_order"],
            rows.iter().map(|r| {
                vec![
                    r.page.clone(),
                    r.visual.clone(),
                    r.visual_type.clone(),
                    r.keep_layer_order.clone(),
                ]
            }),
        )),
    }
}

fn to_json<R: Serialize>(report: &Report, rows: &[R]) -> Result<String> {
    let envelope = Envelope {
        report_root: report.root().display().to_string(),
        generated_at: Utc::now(),
        rows,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn to_csv(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, header.iter().map(|s| s.to_string()));
    for row in rows {
        push_csv_row(&mut out, row.into_iter());
    }
    out
}

fn push_csv_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::InteractionType;
    use crate::fs::{FileSystem, InMemoryFileSystem};
    use serde_json::{Value, json};
    use std::path::Path;

    fn sample_report() -> Report {
        let fs = InMemoryFileSystem::new();
        let write = |path: &str, value: Value| {
            fs.write_file(Path::new(path), &serde_json::to_string(&value).unwrap())
                .unwrap();
        };
        write("r/pages/p1/page.json", json!({ "displayName": "Overview" }));
        write(
            "r/pages/p1/visuals/a/visual.json",
            json!({
                "visualType": "barChart",
                "filterConfig": { "filters": [
                    { "name": "f1", "field": "Region, West", "isHiddenInViewMode": true }
                ]}
            }),
        );
        write(
            "r/pages/p1/visuals/b/visual.json",
            json!({ "visualType": "slicer" }),
        );
        let mut report = Report::scan(&fs, Path::new("r")).unwrap();
        report.set_interaction("p1", "a", "b", Some(InteractionType::NoFilter));
        report
    }

    #[test]
    fn test_interaction_rows_cover_all_pairs() {
        let report = sample_report();
        let rows = interaction_rows(&report);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].interaction, "None");
        assert_eq!(rows[1].interaction, "Default");
        assert!(rows.iter().all(|r| r.page_name == "Overview"));
    }

    #[test]
    fn test_csv_quotes_every_field_and_doubles_quotes() {
        let mut out = String::new();
        push_csv_row(&mut out, vec!["plain".to_string(), "say \"hi\"".to_string()].into_iter());
        assert_eq!(out, "\"plain\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_filter_csv_survives_embedded_commas() {
        let report = sample_report();
        let csv = export_filters(&report, ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"page\",\"visual\""));
        assert!(lines[1].contains("\"Region, West\""));
        assert!(lines[1].contains("\"Hidden\""));
    }

    #[test]
    fn test_json_export_carries_envelope() {
        let report = sample_report();
        let json_out = export_interactions(&report, ExportFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&json_out).unwrap();
        assert_eq!(parsed["report_root"], json!("r"));
        assert!(parsed["generated_at"].is_string());
        assert_eq!(parsed["rows"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_layer_rows_show_unset() {
        let report = sample_report();
        let rows = layer_rows(&report);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.keep_layer_order == "unset"));
    }
}
