//! Node id → step id reconciliation.
//!
//! A node id resolves through four rules, first match wins:
//!
//! 1. direct: the id is a step id;
//! 2. case-normalized: the kebab-case form of the id is a step id;
//! 3. synonym: the first table candidate that is a step id;
//! 4. fuzzy: the id (lowercased, hyphens stripped) and a step id (hyphens
//!    stripped) contain one another; first step in list order wins.

pub mod synonyms;

use std::collections::BTreeMap;

use tracing::debug;

pub use synonyms::SynonymTable;

/// Node id → canonical step id, for the ids that need rewriting.
pub type IdentifierMapping = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Direct,
    CaseNormalized,
    Synonym,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub step_id: String,
    pub rule: MatchRule,
}

/// Outcome of reconciling every node id of one diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Only ids whose resolved step id differs from the id itself.
    pub mapping: IdentifierMapping,
    pub unresolved: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.mapping.is_empty()
    }
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Reconciler {
    synonyms: SynonymTable,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(SynonymTable::builtin())
    }
}

impl Reconciler {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn reconcile<S: AsRef<str>>(&self, node_id: &str, steps: &[S]) -> Option<Resolution> {
        let is_step = |id: &str| steps.iter().any(|s| s.as_ref() == id);

        if is_step(node_id) {
            return resolution(node_id, MatchRule::Direct);
        }

        let kebab = to_kebab_case(node_id);
        if is_step(kebab.as_str()) {
            return resolution(&kebab, MatchRule::CaseNormalized);
        }

        if let Some(hit) = self
            .synonyms
            .candidates(node_id)
            .iter()
            .find(|c| is_step(c.as_str()))
        {
            return resolution(hit, MatchRule::Synonym);
        }

        let needle = node_id.to_lowercase().replace('-', "");
        if needle.is_empty() {
            return None;
        }
        steps
            .iter()
            .map(|s| s.as_ref())
            .find(|step| {
                let hay = step.replace('-', "");
                !hay.is_empty() && (hay.contains(&needle) || needle.contains(&hay))
            })
            .and_then(|step| resolution(step, MatchRule::Fuzzy))
    }

    /// Reconcile every node id against `steps`.
    pub fn plan<S: AsRef<str>>(&self, node_ids: &[String], steps: &[S]) -> ReconcilePlan {
        let mut plan = ReconcilePlan::default();
        for node_id in node_ids {
            match self.reconcile(node_id, steps) {
                Some(res) if res.step_id != *node_id => {
                    debug!(
                        node = %node_id,
                        step = %res.step_id,
                        rule = ?res.rule,
                        "node id resolved"
                    );
                    plan.mapping.insert(node_id.clone(), res.step_id);
                }
                Some(_) => {}
                None => plan.unresolved.push(node_id.clone()),
            }
        }
        plan
    }
}

fn resolution(step_id: &str, rule: MatchRule) -> Option<Resolution> {
    Some(Resolution {
        step_id: step_id.to_string(),
        rule,
    })
}

/// `JobOffer` → `job-offer`: hyphen before each uppercase letter, lowercase,
/// drop a leading hyphen.
pub fn to_kebab_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    for ch in id.chars() {
        if ch.is_uppercase() {
            out.push('-');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    match out.strip_prefix('-') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
