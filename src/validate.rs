//! Consistency checks between a program's diagram, its steps and its graph.

use std::fmt;
use std::path::Path;

use tracing::error;

use crate::catalog::{DataFile, list_data_files};
use crate::error::CatalogError;
use crate::layout::graph::GraphIR;
use crate::model::Program;
use crate::parsers::parse;
use crate::reconcile::to_kebab_case;
use crate::structured::to_structured;

// ─── Issues ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// Node id is the PascalCase spelling of an existing step id.
    CaseMismatch { node_id: String, step_id: String },
    /// Step-bearing node with no matching step. Decision nodes are exempt.
    MissingStep { node_id: String },
    /// Step that no diagram node refers to.
    OrphanedStep { step_id: String },
    /// Edge endpoint that is never defined with a shape.
    UndefinedReference { node_id: String },
    MissingHeader,
    NoConnections,
    GraphPrecondition(String),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::CaseMismatch { .. } | Self::OrphanedStep { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CaseMismatch { .. } => "case-mismatch",
            Self::MissingStep { .. } => "missing-step",
            Self::OrphanedStep { .. } => "orphaned-step",
            Self::UndefinedReference { .. } => "undefined-reference",
            Self::MissingHeader => "missing-header",
            Self::NoConnections => "no-connections",
            Self::GraphPrecondition(_) => "graph-precondition",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaseMismatch { node_id, step_id } => write!(
                f,
                "node \"{node_id}\" uses PascalCase but step uses kebab-case \"{step_id}\""
            ),
            Self::MissingStep { node_id } => {
                write!(f, "node \"{node_id}\" has no matching step definition")
            }
            Self::OrphanedStep { step_id } => {
                write!(f, "step \"{step_id}\" does not appear in the diagram")
            }
            Self::UndefinedReference { node_id } => {
                write!(f, "undefined node referenced: {node_id}")
            }
            Self::MissingHeader => f.write_str("diagram must start with \"flowchart\""),
            Self::NoConnections => f.write_str("diagram must have at least one connection"),
            Self::GraphPrecondition(msg) => write!(f, "graph: {msg}"),
        }
    }
}

// ─── Program validation ──────────────────────────────────────────────────────

pub fn validate_program(program: &Program) -> Vec<Issue> {
    let text = program.diagram_text.as_str();
    let diagram = parse(text);
    let steps = program.registry();
    let mut issues = Vec::new();

    let head = text.trim_start();
    if !(head.starts_with("flowchart") || head.starts_with("graph")) {
        issues.push(Issue::MissingHeader);
    }
    if diagram.edges.is_empty() {
        issues.push(Issue::NoConnections);
    }

    let decisions = diagram.decision_ids();
    for node_id in &diagram.node_ids {
        if steps.contains(node_id) || decisions.contains(&node_id.as_str()) {
            continue;
        }
        let kebab = to_kebab_case(node_id);
        if steps.contains(&kebab) {
            issues.push(Issue::CaseMismatch {
                node_id: node_id.clone(),
                step_id: kebab,
            });
        } else {
            issues.push(Issue::MissingStep {
                node_id: node_id.clone(),
            });
        }
    }

    for step in steps.steps() {
        if !diagram.node_ids.contains(&step.id) {
            issues.push(Issue::OrphanedStep {
                step_id: step.id.clone(),
            });
        }
    }

    let mut undefined: Vec<&str> = Vec::new();
    for edge in &diagram.edges {
        for id in [edge.from_id.as_str(), edge.to_id.as_str()] {
            if !diagram.is_defined(id) && !undefined.contains(&id) {
                undefined.push(id);
            }
        }
    }
    issues.extend(undefined.into_iter().map(|id| Issue::UndefinedReference {
        node_id: id.to_string(),
    }));

    let graph = match &program.structured_graph {
        Some(g) => g.clone(),
        None => to_structured(&diagram, steps),
    };
    if !graph.nodes.is_empty() {
        issues.extend(graph_issues(&GraphIR::from_structured(&graph)));
    }
    issues
}

fn graph_issues(ir: &GraphIR) -> Vec<Issue> {
    let d = ir.diagnostics();
    if d.is_clean() {
        return Vec::new();
    }
    let mut out = Vec::new();
    match d.start_nodes.len() {
        0 => out.push(Issue::GraphPrecondition("no start node".into())),
        1 => {}
        _ => out.push(Issue::GraphPrecondition(format!(
            "multiple start nodes: {}",
            d.start_nodes.join(", ")
        ))),
    }
    for cycle in &d.cycles {
        out.push(Issue::GraphPrecondition(format!("cycle through {}", cycle.join(", "))));
    }
    if !d.unreachable.is_empty() {
        out.push(Issue::GraphPrecondition(format!(
            "unreachable from start: {}",
            d.unreachable.join(", ")
        )));
    }
    if !d.dangling.is_empty() {
        out.push(Issue::GraphPrecondition(format!(
            "edges to missing nodes: {}",
            d.dangling.join(", ")
        )));
    }
    out
}

// ─── Directory validation ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProgramIssues {
    pub file: String,
    pub program_key: String,
    pub program_name: String,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationSummary {
    pub programs_checked: usize,
    pub failed: Vec<ProgramIssues>,
    pub errors: Vec<String>,
}

impl ValidationSummary {
    pub fn issue_count(&self) -> usize {
        self.failed.iter().map(|p| p.issues.len()).sum()
    }

    pub fn count_of(&self, kind: &str) -> usize {
        self.failed
            .iter()
            .flat_map(|p| &p.issues)
            .filter(|i| i.kind() == kind)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.programs_checked - self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.errors.is_empty()
    }
}

pub fn validate_dir(dir: impl AsRef<Path>) -> Result<ValidationSummary, CatalogError> {
    let mut summary = ValidationSummary::default();
    for path in list_data_files(dir)? {
        let file = match DataFile::load(&path) {
            Ok(f) => f,
            Err(e) => {
                error!("{e}");
                summary.errors.push(e.to_string());
                continue;
            }
        };
        let name = file.file_name();
        for (key, program) in &file.programs {
            summary.programs_checked += 1;
            let issues = validate_program(program);
            if !issues.is_empty() {
                summary.failed.push(ProgramIssues {
                    file: name.clone(),
                    program_key: key.clone(),
                    program_name: program.program_name.clone(),
                    issues,
                });
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    fn program(diagram: &str, steps: &[&str]) -> Program {
        let mut p = Program::new("de_test", "DE", "Test", diagram);
        p.steps = steps.iter().map(|s| Step::new(*s, *s)).collect();
        p
    }

    #[test]
    fn test_clean_program() {
        let p = program(
            "flowchart TD\n  Start([Start]) --> job-offer[Offer]\n  job-offer --> check{OK?}\n  check -->|Yes| End([End])",
            &["job-offer"],
        );
        assert_eq!(validate_program(&p), vec![]);
    }

    #[test]
    fn test_case_mismatch_and_missing() {
        let p = program(
            "flowchart TD\n  Start([Start]) --> JobOffer[Offer]\n  JobOffer --> visa[Visa]\n  visa --> End([End])",
            &["job-offer"],
        );
        let issues = validate_program(&p);
        assert!(issues.contains(&Issue::CaseMismatch {
            node_id: "JobOffer".into(),
            step_id: "job-offer".into()
        }));
        assert!(issues.contains(&Issue::MissingStep { node_id: "visa".into() }));
        assert!(issues.contains(&Issue::OrphanedStep { step_id: "job-offer".into() }));
    }

    #[test]
    fn test_syntax_checks() {
        let p = program("a[A]\nb[B]", &["a", "b"]);
        let issues = validate_program(&p);
        assert!(issues.contains(&Issue::MissingHeader));
        assert!(issues.contains(&Issue::NoConnections));
    }

    #[test]
    fn test_undefined_reference() {
        let p = program(
            "flowchart TD\n  Start([Start]) --> a[A]\n  a --> ghost\n  a --> ghost",
            &["a"],
        );
        let issues = validate_program(&p);
        let undefined: Vec<&Issue> = issues
            .iter()
            .filter(|i| matches!(i, Issue::UndefinedReference { .. }))
            .collect();
        assert_eq!(
            undefined,
            vec![&Issue::UndefinedReference { node_id: "ghost".into() }]
        );
    }

    #[test]
    fn test_graph_preconditions() {
        let p = program(
            "flowchart TD\n  Start([Start]) --> a[A]\n  a --> b[B]\n  b --> a\n  island[I] --> End([End])",
            &["a", "b", "island"],
        );
        let messages: Vec<String> = validate_program(&p)
            .iter()
            .filter(|i| i.kind() == "graph-precondition")
            .map(ToString::to_string)
            .collect();
        assert!(messages.contains(&"graph: cycle through a, b".to_string()));
        assert!(messages.contains(&"graph: unreachable from start: island, End".to_string()));
    }

    #[test]
    fn test_severity() {
        assert_eq!(Issue::OrphanedStep { step_id: "x".into() }.severity(), Severity::Warning);
        assert_eq!(Issue::NoConnections.severity(), Severity::Error);
    }
}
