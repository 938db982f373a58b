//! Diagram repair: parse → reconcile → rewrite until the node ids agree
//! with the step ids.
//!
//! The loop is bounded by [`RepairConfig::max_iterations`]. Hitting the
//! bound is reported (`capped`) and logged, and the partially repaired text
//! is still returned.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::catalog::{DataFile, list_data_files};
use crate::config::RepairConfig;
use crate::error::CatalogError;
use crate::model::Program;
use crate::parsers::{FlowchartParser, Parser};
use crate::reconcile::{IdentifierMapping, Reconciler};
use crate::rewrite::rewrite_counted;

// ─── RepairOutcome ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    pub text: String,
    /// Every rename applied, across all passes.
    pub mappings: IdentifierMapping,
    /// Number of rewrite passes performed.
    pub iterations: usize,
    pub replacements: usize,
    /// True when the loop stopped at the iteration bound with work left.
    pub capped: bool,
    /// Node ids that no rule could resolve to a step.
    pub unresolved: Vec<String>,
}

impl RepairOutcome {
    pub fn changed(&self) -> bool {
        self.replacements > 0
    }
}

// ─── Repairer ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Repairer {
    reconciler: Reconciler,
    parser: FlowchartParser,
    max_iterations: usize,
}

impl Default for Repairer {
    fn default() -> Self {
        Self::new(Reconciler::default(), RepairConfig::default())
    }
}

impl Repairer {
    pub fn new(reconciler: Reconciler, config: RepairConfig) -> Self {
        Self {
            reconciler,
            parser: FlowchartParser::new(config.reserved),
            max_iterations: config.max_iterations,
        }
    }

    pub fn repair<S: AsRef<str>>(&self, text: &str, steps: &[S]) -> RepairOutcome {
        let mut current = text.to_string();
        let mut mappings = IdentifierMapping::new();
        let mut iterations = 0;
        let mut replacements = 0;

        loop {
            let parsed = self.parser.parse(&current);
            let plan = self.reconciler.plan(&parsed.node_ids, steps);
            if plan.is_noop() {
                return RepairOutcome {
                    text: current,
                    mappings,
                    iterations,
                    replacements,
                    capped: false,
                    unresolved: plan.unresolved,
                };
            }
            if iterations >= self.max_iterations {
                warn!(
                    iterations,
                    pending = plan.mapping.len(),
                    "repair stopped at iteration limit"
                );
                return RepairOutcome {
                    text: current,
                    mappings,
                    iterations,
                    replacements,
                    capped: true,
                    unresolved: plan.unresolved,
                };
            }
            iterations += 1;
            debug!(iteration = iterations, renames = plan.mapping.len(), "repair pass");
            let rewritten = rewrite_counted(&current, &plan.mapping);
            current = rewritten.text;
            replacements += rewritten.replacements;
            mappings.extend(plan.mapping);
        }
    }

    /// Repair `program.diagram_text` in place against its own steps.
    pub fn repair_program(&self, program: &mut Program) -> RepairOutcome {
        let ids = program.registry().ids();
        let outcome = self.repair(&program.diagram_text, &ids);
        for node in &outcome.unresolved {
            warn!(program = %program.program_id, node = %node, "node id matches no step");
        }
        if outcome.text != program.diagram_text {
            program.diagram_text = outcome.text.clone();
        }
        outcome
    }
}

// ─── Directory repair ────────────────────────────────────────────────────────

/// Per-program entry of a directory repair.
#[derive(Debug, Clone)]
pub struct ProgramRepair {
    pub file: String,
    pub program_key: String,
    pub outcome: RepairOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RepairSummary {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub ids_fixed: usize,
    pub programs: Vec<ProgramRepair>,
    /// Files that could not be read, parsed or written.
    pub errors: Vec<String>,
}

impl RepairSummary {
    pub fn capped(&self) -> impl Iterator<Item = &ProgramRepair> {
        self.programs.iter().filter(|p| p.outcome.capped)
    }

    pub fn unresolved_count(&self) -> usize {
        self.programs.iter().map(|p| p.outcome.unresolved.len()).sum()
    }
}

/// Repair every program of every data file in `dir`, writing back only
/// files whose diagrams changed.
pub fn repair_dir(
    repairer: &Repairer,
    dir: impl AsRef<Path>,
) -> Result<RepairSummary, CatalogError> {
    let mut summary = RepairSummary::default();
    for path in list_data_files(dir)? {
        summary.files_scanned += 1;
        let mut file = match DataFile::load(&path) {
            Ok(f) => f,
            Err(e) => {
                error!("{e}");
                summary.errors.push(e.to_string());
                continue;
            }
        };
        let file_name = file.file_name();
        let mut modified = false;
        for (key, program) in file.programs.iter_mut() {
            let outcome = repairer.repair_program(program);
            if outcome.changed() {
                modified = true;
                summary.ids_fixed += outcome.mappings.len();
            }
            if outcome.changed() || outcome.capped || !outcome.unresolved.is_empty() {
                summary.programs.push(ProgramRepair {
                    file: file_name.clone(),
                    program_key: key.clone(),
                    outcome,
                });
            }
        }
        if modified {
            match file.save() {
                Ok(()) => {
                    info!(file = %file_name, "repaired diagrams written");
                    summary.files_modified += 1;
                }
                Err(e) => {
                    error!("{e}");
                    summary.errors.push(e.to_string());
                }
            }
        }
    }
    Ok(summary)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;
    use crate::parsers::parse;
    use pretty_assertions::assert_eq;

    const LEGACY: &str = "flowchart TD\n  Start([Start]) --> JobOffer[Secure Job Offer]\n  JobOffer --> GatherDocs[Gather]\n  GatherDocs --> Check{OK?}\n  Check -->|Yes| Travel[Travel]\n  Check -->|No| End1([Stop])\n  Travel --> End([End])";

    const STEPS: &[&str] = &["job-offer", "gather-documents", "travel"];

    #[test]
    fn test_concrete_scenario() {
        let src = "flowchart TD\nStart([Start]) --> JobOffer[Secure Job Offer]\nJobOffer --> End([End])";
        let out = Repairer::default().repair(src, &["job-offer"]);
        assert_eq!(
            out.text,
            "flowchart TD\nStart([Start]) --> job-offer[Secure Job Offer]\njob-offer --> End([End])"
        );
        assert_eq!(out.mappings["JobOffer"], "job-offer");
        assert_eq!(out.iterations, 1);
        assert!(!out.capped);
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn test_repair_legacy_diagram() {
        let out = Repairer::default().repair(LEGACY, STEPS);
        let parsed = parse(&out.text);
        assert_eq!(
            parsed.node_ids,
            vec!["job-offer", "gather-documents", "Check", "travel"]
        );
        assert_eq!(out.unresolved, vec!["Check"]);
        assert_eq!(out.mappings.len(), 3);
        assert_eq!(out.replacements, 6);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let r = Repairer::default();
        let once = r.repair(LEGACY, STEPS);
        let twice = r.repair(&once.text, STEPS);
        assert_eq!(twice.text, once.text);
        assert!(twice.mappings.is_empty());
        assert_eq!(twice.iterations, 0);
        assert!(!twice.changed());
    }

    #[test]
    fn test_consistent_diagram_is_untouched() {
        let src = "flowchart TD\n  job-offer[Offer] --> travel[Go]";
        let out = Repairer::default().repair(src, &["job-offer", "travel"]);
        assert_eq!(out.text, src);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn test_iteration_cap_reports_capped() {
        let config = RepairConfig {
            max_iterations: 0,
            ..RepairConfig::default()
        };
        let r = Repairer::new(Reconciler::default(), config);
        let out = r.repair(LEGACY, STEPS);
        assert!(out.capped);
        assert_eq!(out.text, LEGACY);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn test_repair_program_updates_text() {
        let mut program = Program::new("xx_test", "XX", "Test", LEGACY);
        program.steps = STEPS.iter().map(|id| Step::new(*id, *id)).collect();
        let out = Repairer::default().repair_program(&mut program);
        assert!(out.changed());
        assert_eq!(program.diagram_text, out.text);
        assert!(program.diagram_text.contains("job-offer[Secure Job Offer]"));
    }

    #[test]
    fn test_repair_dir_writes_only_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        let clean = r#"{"p": {"programId": "a", "countryCode": "A", "programName": "A",
            "diagramText": "flowchart TD\n  travel[T]", "steps": [{"id": "travel", "title": "T"}]}}"#;
        let legacy = r#"{"p": {"programId": "b", "countryCode": "B", "programName": "B",
            "diagramText": "flowchart TD\n  Travel[T] --> End([E])", "steps": [{"id": "travel", "title": "T"}]}}"#;
        std::fs::write(dir.path().join("a.json"), clean).unwrap();
        std::fs::write(dir.path().join("b.json"), legacy).unwrap();
        std::fs::write(dir.path().join("index.json"), "not json at all").unwrap();

        let summary = repair_dir(&Repairer::default(), dir.path()).unwrap();
        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.files_modified, 1);
        assert_eq!(summary.ids_fixed, 1);
        assert!(summary.errors.is_empty());
        assert_eq!(std::fs::read_to_string(dir.path().join("a.json")).unwrap(), clean);
        let b = DataFile::load(dir.path().join("b.json")).unwrap();
        assert_eq!(b.programs["p"].diagram_text, "flowchart TD\n  travel[T] --> End([E])");
    }

    #[test]
    fn test_repair_dir_continues_past_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{").unwrap();
        let summary = repair_dir(&Repairer::default(), dir.path()).unwrap();
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.errors.len(), 1);
    }

    #[test]
    fn test_repair_dir_touches_only_diagram_text() {
        let dir = tempfile::tempdir().unwrap();
        let src = r#"{"p": {"programId": "b", "countryCode": "B", "programName": "B",
            "officialUrl": "https://example.org/blue-card",
            "diagramText": "flowchart TD\n  Travel[T] --> End([E])",
            "steps": [{"id": "travel", "title": "T", "tips": ["keep receipts"]}]}}"#;
        let path = dir.path().join("b.json");
        std::fs::write(&path, src).unwrap();

        let summary = repair_dir(&Repairer::default(), dir.path()).unwrap();
        assert_eq!(summary.files_modified, 1);

        let after: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let mut expected: serde_json::Value = serde_json::from_str(src).unwrap();
        expected["p"]["diagramText"] = "flowchart TD\n  travel[T] --> End([E])".into();
        assert_eq!(after, expected);
    }
}
