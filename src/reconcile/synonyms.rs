//! Synonym table: legacy node id → candidate step ids, in preference order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Immutable lookup table handed to a [`super::Reconciler`].
///
/// Keys are matched exactly (case-sensitive). The builtin table covers the
/// ids that hand-written program diagrams used before step ids were
/// normalized to kebab-case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    entries: IndexMap<String, Vec<String>>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Visa",
        &[
            "receive-visa",
            "visa",
            "receive-blue-card",
            "receive-permit",
            "receive-card",
            "visa-application",
        ],
    ),
    (
        "Card",
        &[
            "receive-card",
            "receive-blue-card",
            "blue-card",
            "e-residency-card",
            "residence-card",
        ],
    ),
    ("Permit", &["receive-permit", "work-permit", "residence-permit", "receive-permit-register"]),
    ("BlueCard", &["receive-blue-card", "blue-card", "receive-card"]),
    ("GoldenVisa", &["receive-golden-visa", "golden-visa", "visa-approval"]),
    ("WaitPermit", &["wait-permit", "permit-processing", "processing"]),
    ("WaitVisa", &["wait-visa", "visa-processing", "processing"]),
    ("Submit", &["submit-application", "submit", "application-submission"]),
    ("GatherDocs", &["gather-documents", "docs", "prepare-documents"]),
    ("Docs", &["gather-documents", "prepare-documents", "docs"]),
    ("Processing", &["processing", "wait-processing", "application-processing"]),
    ("Process", &["processing", "wait-processing", "application-processing"]),
    ("Wait", &["processing", "wait-processing", "waiting-period"]),
    ("Appeal", &["consider-appeal", "appeal", "appeal-process"]),
    (
        "Register",
        &[
            "register",
            "registration",
            "register-business",
            "arrival-registration",
            "residence-registration",
        ],
    ),
    ("registration", &["residence-registration", "register", "arrival-registration"]),
    ("Travel", &["travel", "arrival", "travel-to-hungary", "travel-register"]),
    ("arrival", &["travel", "arrival-registration", "travel-register"]),
    ("BusinessIdea", &["develop-business-idea", "business-idea"]),
    ("Funds", &["verify-funds", "check-funds", "capital"]),
    ("Program", &["apply-to-program", "program-acceptance", "program"]),
    ("Operate", &["operate-business", "business-operations"]),
    ("Remote", &["remote-operations", "operate-remotely"]),
    ("EmployerApply", &["employer-applies", "employer-application"]),
    ("Advertise", &["employer-advertises", "job-advertisement"]),
    ("Property2", &["property-purchase", "purchase-property", "investment"]),
    ("Continue", &["continue-search", "job-search"]),
    ("Return", &["return-home", "end-process"]),
];

impl SynonymTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        BUILTIN
            .iter()
            .fold(Self::empty(), |table, (key, candidates)| {
                table.with_entry(*key, candidates.iter().copied())
            })
    }

    /// Returns a copy of the table with `key` mapped to `candidates`
    /// (replacing any previous entry for `key`).
    pub fn with_entry<I, S>(mut self, key: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(key.into(), candidates.into_iter().map(Into::into).collect());
        self
    }

    pub fn candidates(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_is_ordered() {
        let t = SynonymTable::builtin();
        assert_eq!(t.candidates("BlueCard")[0], "receive-blue-card");
        assert_eq!(t.candidates("Return"), ["return-home", "end-process"]);
        assert_eq!(t.len(), BUILTIN.len());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let t = SynonymTable::builtin();
        assert!(!t.candidates("registration").is_empty());
        assert!(t.candidates("Registration").is_empty());
        assert!(t.candidates("visa").is_empty());
    }

    #[test]
    fn test_with_entry_replaces() {
        let t = SynonymTable::empty()
            .with_entry("Go", ["a"])
            .with_entry("Go", ["b", "c"]);
        assert_eq!(t.candidates("Go"), ["b", "c"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_deserialize_from_json_object() {
        let t: SynonymTable = serde_json::from_str(r#"{"Pay": ["pay-fee", "fee"]}"#).unwrap();
        assert_eq!(t.candidates("Pay"), ["pay-fee", "fee"]);
    }
}
