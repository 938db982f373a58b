//! Template step records for diagram nodes that have no step.
//!
//! Repair renames node ids onto existing steps; this module covers the
//! other direction. A node that no reconcile rule can resolve gets a new
//! step built from a per-id template, or a bare record titled after its
//! label.

use std::path::Path;

use regex::Regex;
use tracing::{error, info};

use crate::catalog::{DataFile, list_data_files};
use crate::error::CatalogError;
use crate::model::{Program, Step};
use crate::parsers::parse;
use crate::reconcile::Reconciler;

// ─── Templates ───────────────────────────────────────────────────────────────

struct Template {
    id: &'static str,
    title: &'static str,
    /// Prefer the node label over `title` when the label is not empty.
    title_from_label: bool,
    description: &'static str,
    estimated_duration: &'static str,
    documents: &'static [&'static str],
    notes: &'static [&'static str],
}

const RECEIVE_DOCUMENTS: &[&str] = &["Passport", "Approval notification"];

const TEMPLATES: &[Template] = &[
    Template {
        id: "processing",
        title: "Application Processing",
        title_from_label: false,
        description: "Wait for authorities to process your application",
        estimated_duration: "4-8 weeks",
        documents: &[],
        notes: &[
            "Processing times may vary",
            "You may be contacted for additional information",
        ],
    },
    Template {
        id: "submit-application",
        title: "Submit Application",
        title_from_label: false,
        description: "Submit your completed application to the relevant authorities",
        estimated_duration: "1 day",
        documents: &[
            "Completed application form",
            "All supporting documents",
            "Application fee payment",
        ],
        notes: &[
            "Ensure all documents are complete",
            "Keep copies of everything submitted",
        ],
    },
    Template {
        id: "gather-documents",
        title: "Gather Required Documents",
        title_from_label: false,
        description: "Collect all necessary documentation for your application",
        estimated_duration: "2-4 weeks",
        documents: &[
            "Valid passport",
            "Passport photographs",
            "Proof of accommodation",
            "Health insurance",
            "Criminal background check",
        ],
        notes: &[
            "All documents may need to be translated",
            "Some documents may require apostille",
        ],
    },
    Template {
        id: "receive-visa",
        title: "Receive Visa",
        title_from_label: true,
        description: "Collect your approved visa or residence permit",
        estimated_duration: "1 week",
        documents: RECEIVE_DOCUMENTS,
        notes: &["Check validity dates", "Note any conditions or restrictions"],
    },
    Template {
        id: "receive-permit",
        title: "Receive Permit",
        title_from_label: true,
        description: "Collect your approved residence permit",
        estimated_duration: "1 week",
        documents: RECEIVE_DOCUMENTS,
        notes: &["Check validity dates", "Note any conditions or restrictions"],
    },
    Template {
        id: "receive-card",
        title: "Receive Card",
        title_from_label: true,
        description: "Collect your approved residence card",
        estimated_duration: "1 week",
        documents: RECEIVE_DOCUMENTS,
        notes: &["Check validity dates", "Keep card with you at all times"],
    },
    Template {
        id: "consider-appeal",
        title: "Consider Appeal",
        title_from_label: false,
        description: "If rejected, consider appealing the decision",
        estimated_duration: "Varies",
        documents: &["Rejection letter", "Additional supporting documents"],
        notes: &[
            "Consult with immigration lawyer",
            "Check appeal deadlines",
            "Consider reapplying with stronger application",
        ],
    },
    Template {
        id: "travel",
        title: "Travel and Arrival",
        title_from_label: false,
        description: "Book travel and relocate to your destination",
        estimated_duration: "1-2 weeks",
        documents: &["Valid passport", "Visa/permit", "Proof of accommodation"],
        notes: &[
            "Arrange accommodation in advance",
            "Plan for initial expenses",
        ],
    },
    Template {
        id: "arrival",
        title: "Arrival and Registration",
        title_from_label: false,
        description: "Complete arrival formalities and register your residence",
        estimated_duration: "1-2 weeks",
        documents: &["Passport", "Visa/permit", "Proof of address"],
        notes: &[
            "Register within required timeframe",
            "Keep all documentation",
        ],
    },
    Template {
        id: "registration",
        title: "Residence Registration",
        title_from_label: false,
        description: "Register your residence with local authorities",
        estimated_duration: "1 week",
        documents: &[
            "Passport",
            "Residence permit",
            "Proof of address",
            "Rental contract",
        ],
        notes: &[
            "Must register within specified timeframe",
            "Bring all original documents",
        ],
    },
    Template {
        id: "renewal",
        title: "Permit Renewal",
        title_from_label: false,
        description: "Renew your residence permit before expiration",
        estimated_duration: "2-3 months",
        documents: &[
            "Current permit",
            "Proof of continued eligibility",
            "Updated documents",
        ],
        notes: &[
            "Apply before current permit expires",
            "Requirements may have changed",
        ],
    },
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Label text with `<br>` line breaks flattened to spaces.
pub fn clean_label(label: &str) -> String {
    label
        .replace("<br/>", " ")
        .replace("<br>", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `receive-visa` → `Receive Visa`.
pub fn title_case(id: &str) -> String {
    id.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Duration such as `6 weeks` mentioned in a processing label.
fn weeks_in(label: &str) -> Option<String> {
    let re = Regex::new(r"\d+\s*weeks?").ok()?;
    re.find(label).map(|m| m.as_str().to_string())
}

/// Step for `node_id` from its template, or a bare step titled after the
/// label (or the id when the label is empty).
pub fn template_for(node_id: &str, label: &str) -> Step {
    let label = clean_label(label);
    let Some(t) = TEMPLATES.iter().find(|t| t.id == node_id) else {
        let title = if label.is_empty() || label == node_id {
            title_case(node_id)
        } else {
            label
        };
        return Step::new(node_id, title);
    };

    let title = if t.title_from_label && !label.is_empty() {
        label.clone()
    } else {
        t.title.to_string()
    };
    let duration = match t.id {
        "processing" => weeks_in(&label).unwrap_or_else(|| t.estimated_duration.to_string()),
        _ => t.estimated_duration.to_string(),
    };
    let mut step = Step::new(node_id, title);
    step.description = Some(t.description.to_string());
    step.estimated_duration = Some(duration);
    step.documents = Some(owned(t.documents));
    step.notes = Some(owned(t.notes));
    step
}

// ─── Per program ─────────────────────────────────────────────────────────────

/// Template steps for the step-bearing nodes of `program` that have no step
/// and that no reconcile rule maps onto one. Decision nodes are skipped.
pub fn missing_steps(program: &Program, reconciler: &Reconciler) -> Vec<Step> {
    let diagram = parse(&program.diagram_text);
    let ids = program.registry().ids();
    let decisions = diagram.decision_ids();
    diagram
        .node_ids
        .iter()
        .filter(|id| !decisions.contains(&id.as_str()))
        .filter(|id| reconciler.reconcile(id, &ids).is_none())
        .map(|id| {
            let label = diagram.node(id).map_or("", |n| n.label.as_str());
            template_for(id, label)
        })
        .collect()
}

// ─── Directory pass ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProgramSteps {
    pub file: String,
    pub program_key: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default)]
pub struct MissingStepsSummary {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub programs: Vec<ProgramSteps>,
    pub errors: Vec<String>,
}

impl MissingStepsSummary {
    pub fn step_count(&self) -> usize {
        self.programs.iter().map(|p| p.steps.len()).sum()
    }

    /// Report listing every generated step as JSON, grouped per program.
    pub fn report(&self) -> String {
        let mut out = Vec::new();
        for p in &self.programs {
            out.push(format!("## {} - {}", p.file, p.program_key));
            out.push(format!("Missing {} step(s):", p.steps.len()));
            out.push(String::new());
            for step in &p.steps {
                match serde_json::to_string_pretty(step) {
                    Ok(json) => out.push(json),
                    Err(e) => out.push(format!("// {}: {e}", step.id)),
                }
            }
            out.push(String::new());
        }
        out.join("\n")
    }
}

/// Collect template steps for every program in `dir`. With `write` the
/// steps are appended to each program and changed files are saved.
pub fn fill_dir(
    reconciler: &Reconciler,
    dir: impl AsRef<Path>,
    write: bool,
) -> Result<MissingStepsSummary, CatalogError> {
    let mut summary = MissingStepsSummary::default();
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
        let name = file.file_name();
        let mut added = 0;
        for (key, program) in file.programs.iter_mut() {
            let steps = missing_steps(program, reconciler);
            if steps.is_empty() {
                continue;
            }
            added += steps.len();
            if write {
                program.steps.extend(steps.iter().cloned());
            }
            summary.programs.push(ProgramSteps {
                file: name.clone(),
                program_key: key.clone(),
                steps,
            });
        }
        if !write || added == 0 {
            continue;
        }
        match file.save() {
            Ok(()) => {
                info!(file = %name, added, "template steps written");
                summary.files_modified += 1;
            }
            Err(e) => {
                error!("{e}");
                summary.errors.push(e.to_string());
            }
        }
    }
    Ok(summary)
}
