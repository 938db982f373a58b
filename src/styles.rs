//! Removal of inline `style` statements from diagram text.
//!
//! Presentation lives in the renderer's stylesheet, so `style id ...` lines
//! in stored diagrams are dead weight. Blank lines that only separate style
//! lines go with them, and trailing blank lines are trimmed.

use std::path::Path;

use tracing::{error, info};

use crate::catalog::{DataFile, list_data_files};
use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleStrip {
    pub text: String,
    pub removed: usize,
}

fn is_style(line: &str) -> bool {
    line.trim().starts_with("style ")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Strip `style` lines. Text without style lines is returned unchanged.
pub fn strip_styles(diagram: &str) -> StyleStrip {
    let lines: Vec<&str> = diagram.split('\n').collect();
    let removed = lines.iter().filter(|l| is_style(l)).count();
    if removed == 0 {
        return StyleStrip {
            text: diagram.to_string(),
            removed,
        };
    }

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut after_style = false;
    for (i, line) in lines.iter().enumerate() {
        if is_style(line) {
            after_style = true;
            continue;
        }
        if after_style && is_blank(line) {
            let next_is_style = lines[i + 1..]
                .iter()
                .find(|l| !is_blank(l))
                .is_some_and(|l| is_style(l));
            if next_is_style {
                continue;
            }
            after_style = false;
            if i + 1 < lines.len() {
                kept.push(line);
            }
            continue;
        }
        after_style = false;
        kept.push(line);
    }
    while kept.last().is_some_and(|l| is_blank(l)) {
        kept.pop();
    }
    StyleStrip {
        text: kept.join("\n"),
        removed,
    }
}

// ─── Directory pass ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripSummary {
    pub files_processed: usize,
    pub files_modified: usize,
    pub styles_removed: usize,
    /// (file name, styles removed) for every modified file.
    pub modified: Vec<(String, usize)>,
    pub errors: Vec<String>,
}

/// Strip style lines from every program diagram in `dir`. With `dry_run`
/// the counts are computed but nothing is written.
pub fn strip_dir(dir: impl AsRef<Path>, dry_run: bool) -> Result<StripSummary, CatalogError> {
    let mut summary = StripSummary::default();
    for path in list_data_files(dir)? {
        summary.files_processed += 1;
        let mut file = match DataFile::load(&path) {
            Ok(f) => f,
            Err(e) => {
                error!("{e}");
                summary.errors.push(e.to_string());
                continue;
            }
        };
        let mut removed = 0;
        for program in file.programs.values_mut() {
            let strip = strip_styles(&program.diagram_text);
            if strip.removed > 0 {
                removed += strip.removed;
                program.diagram_text = strip.text;
            }
        }
        if removed == 0 {
            continue;
        }
        let name = file.file_name();
        if !dry_run {
            if let Err(e) = file.save() {
                error!("{e}");
                summary.errors.push(e.to_string());
                continue;
            }
            info!(file = %name, removed, "style lines removed");
        }
        summary.files_modified += 1;
        summary.styles_removed += removed;
        summary.modified.push((name, removed));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_styles_is_identity() {
        let src = "flowchart TD\n  a --> b\n\n";
        let out = strip_styles(src);
        assert_eq!(out.text, src);
        assert_eq!(out.removed, 0);
    }

    #[test]
    fn test_trailing_style_block_removed() {
        let src = "flowchart TD\n  a --> b\n\n  style a fill:#f9f\n  style b fill:#bbf\n";
        let out = strip_styles(src);
        assert_eq!(out.text, "flowchart TD\n  a --> b");
        assert_eq!(out.removed, 2);
    }

    #[test]
    fn test_blank_lines_between_styles_dropped() {
        let src = "a --> b\n  style a x\n\n\n  style b y\n\nb --> c";
        let out = strip_styles(src);
        assert_eq!(out.text, "a --> b\n\nb --> c");
        assert_eq!(out.removed, 2);
    }

    #[test]
    fn test_style_prefix_needs_space() {
        let src = "styled[Styled] --> b\n  style styled x";
        let out = strip_styles(src);
        assert_eq!(out.text, "styled[Styled] --> b");
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn test_strip_dir_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{"p": {"programId": "a", "countryCode": "A", "programName": "A",
            "diagramText": "flowchart TD\n  a[A]\n  style a fill:#f9f", "steps": []}}"#;
        let path = dir.path().join("a.json");
        std::fs::write(&path, json).unwrap();

        let summary = strip_dir(dir.path(), true).unwrap();
        assert_eq!(summary.files_modified, 1);
        assert_eq!(summary.styles_removed, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), json);

        let summary = strip_dir(dir.path(), false).unwrap();
        assert_eq!(summary.styles_removed, 1);
        let file = DataFile::load(&path).unwrap();
        assert_eq!(file.programs["p"].diagram_text, "flowchart TD\n  a[A]");

        let again = strip_dir(dir.path(), false).unwrap();
        assert_eq!(again.files_modified, 0);
        assert_eq!(again.files_processed, 1);
    }

    #[test]
    fn test_strip_dir_touches_only_diagram_text() {
        let dir = tempfile::tempdir().unwrap();
        let src = r#"{"p": {"programId": "a", "countryCode": "A", "programName": "A",
            "mermaidDiagram": "flowchart TD\n  a[A]\n  style a fill:#f9f",
            "officialUrl": "https://example.org",
            "steps": [{"id": "a", "title": "A", "tips": ["bring copies"]}]}}"#;
        let path = dir.path().join("a.json");
        std::fs::write(&path, src).unwrap();

        strip_dir(dir.path(), false).unwrap();

        let after: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let mut expected: serde_json::Value = serde_json::from_str(src).unwrap();
        expected["p"]["mermaidDiagram"] = "flowchart TD\n  a[A]".into();
        assert_eq!(after, expected);
    }
}
