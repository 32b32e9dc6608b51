//! Shared utilities for CLI commands

use std::path::PathBuf;

use pbir_core::config::Config;
use pbir_core::fs::RealFileSystem;
use pbir_core::report::Report;

/// Resolve the report folder: the argument wins, then the configured
/// `default_report`
pub fn resolve_report(arg: Option<PathBuf>) -> Option<PathBuf> {
    if arg.is_some() {
        return arg;
    }
    Config::load().ok().and_then(|c| c.default_report)
}

/// Scan a report folder, printing errors on failure
pub fn load_report(arg: Option<PathBuf>) -> Option<Report> {
    let Some(root) = resolve_report(arg) else {
        eprintln!("✗ No report folder given and no default_report configured");
        eprintln!("  Pass the folder as an argument or run 'pbir config set-default <folder>'.");
        return None;
    };

    log::debug!("Scanning report folder {}", root.display());
    match Report::scan(&RealFileSystem, &root) {
        Ok(report) => {
            if !report.warnings.is_empty() {
                eprintln!(
                    "⚠ {} file(s) skipped during scan:",
                    report.warnings.len()
                );
                for warning in &report.warnings {
                    eprintln!("  {}: {}", warning.path.display(), warning.message);
                }
            }
            Some(report)
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            None
        }
    }
}

/// Select visuals by id or path fragment. An empty selection means
/// every visual. Unknown selectors are reported and skipped.
pub fn select_visual_paths(report: &Report, selectors: &[String]) -> Vec<PathBuf> {
    if selectors.is_empty() {
        return report.visuals.iter().map(|v| v.path.clone()).collect();
    }

    let mut paths = Vec::new();
    for selector in selectors {
        let matched: Vec<PathBuf> = report
            .visuals
            .iter()
            .filter(|v| v.id == *selector || v.path.to_string_lossy().contains(selector.as_str()))
            .map(|v| v.path.clone())
            .collect();
        if matched.is_empty() {
            eprintln!("⚠ No visual matches '{}'", selector);
        }
        for path in matched {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

/// Print to stdout or write to a file
pub fn write_output(content: &str, output: Option<PathBuf>) -> bool {
    match output {
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
            true
        }
        Some(path) => match std::fs::write(&path, content) {
            Ok(()) => {
                println!("✓ Wrote {}", path.display());
                true
            }
            Err(e) => {
                eprintln!("✗ Failed to write {}: {}", path.display(), e);
                false
            }
        },
    }
}

/// Save interaction edits unless this is a dry run. Returns false on a
/// save error.
pub fn save_interactions(report: &mut Report, dry_run: bool) -> bool {
    if dry_run {
        println!(
            "Dry run: {} page(s) would be written",
            report.modified_page_count()
        );
        return true;
    }
    match report.save_interactions(&RealFileSystem) {
        Ok(saved) => {
            println!("✓ Saved {} page(s)", saved);
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            if let pbir_core::error::PbirError::FileWrite { kind, .. } = &e {
                eprintln!("  {}", kind.hint());
            }
            false
        }
    }
}

/// Save filter/layer edits unless this is a dry run. Returns false on a
/// save error.
pub fn save_visuals(report: &mut Report, dry_run: bool) -> bool {
    if dry_run {
        println!(
            "Dry run: {} visual(s) would be written",
            report.modified_visual_count()
        );
        return true;
    }
    match report.save_visuals(&RealFileSystem) {
        Ok(saved) => {
            println!("✓ Saved {} visual(s)", saved);
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            if let pbir_core::error::PbirError::FileWrite { kind, .. } = &e {
                eprintln!("  {}", kind.hint());
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbir_core::fs::{FileSystem, InMemoryFileSystem};
    use serde_json::json;
    use std::path::Path;

    fn sample_report() -> Report {
        let fs = InMemoryFileSystem::new();
        let write = |path: &str, value: serde_json::Value| {
            fs.write_file(Path::new(path), &serde_json::to_string(&value).unwrap())
                .unwrap();
        };
        write("r/pages/p1/page.json", json!({ "displayName": "Overview" }));
        write(
            "r/pages/p1/visuals/abc123/visual.json",
            json!({ "visualType": "barChart" }),
        );
        write(
            "r/pages/p1/visuals/def456/visual.json",
            json!({ "visualType": "slicer" }),
        );
        Report::scan(&fs, Path::new("r")).unwrap()
    }

    #[test]
    fn test_select_all_visuals_when_no_selectors() {
        let report = sample_report();
        let paths = select_visual_paths(&report, &[]);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_select_by_visual_id() {
        let report = sample_report();
        let paths = select_visual_paths(&report, &["abc123".to_string()]);
        assert_eq!(
            paths,
            vec![PathBuf::from("r/pages/p1/visuals/abc123/visual.json")]
        );
    }

    #[test]
    fn test_select_by_path_fragment() {
        let report = sample_report();
        // A fragment shared by both paths matches both visuals
        let paths = select_visual_paths(&report, &["pages/p1".to_string()]);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_overlapping_selectors_deduplicate() {
        let report = sample_report();
        let paths = select_visual_paths(
            &report,
            &["abc123".to_string(), "visuals/abc123".to_string()],
        );
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_unknown_selector_is_skipped() {
        let report = sample_report();
        let paths = select_visual_paths(
            &report,
            &["no-such-visual".to_string(), "def456".to_string()],
        );
        assert_eq!(
            paths,
            vec![PathBuf::from("r/pages/p1/visuals/def456/visual.json")]
        );
    }
}
