//! Flowchart data files: one JSON object per country, program key → Program.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::CatalogError;
use crate::model::{Program, Step};

/// Directory the offline tools process when none is given.
pub const DEFAULT_DATA_DIR: &str = "data/flowcharts";

/// Aggregate file in the data directory that the tools never touch.
pub const INDEX_FILE: &str = "index.json";

/// Key the diagram text is written under when a program has neither key.
const DIAGRAM_KEY: &str = "diagramText";
const LEGACY_DIAGRAM_KEY: &str = "mermaidDiagram";
const STEPS_KEY: &str = "steps";

/// One data file. `programs` is the typed view the tools work on; saving
/// patches the changes back into the JSON tree the file was read from, so
/// keys the model does not cover survive untouched.
#[derive(Debug, Clone)]
pub struct DataFile {
    pub path: PathBuf,
    pub programs: IndexMap<String, Program>,
    raw: Map<String, Value>,
}

impl DataFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.clone(),
            source,
        })?;
        let json_err = |source| CatalogError::Json {
            path: path.clone(),
            source,
        };
        let raw: Map<String, Value> = serde_json::from_str(&text).map_err(json_err)?;
        let mut programs = IndexMap::with_capacity(raw.len());
        for (key, value) in &raw {
            let program = Program::deserialize(value).map_err(json_err)?;
            programs.insert(key.clone(), program);
        }
        Ok(Self {
            path,
            programs,
            raw,
        })
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        let json_err = |source| CatalogError::Json {
            path: self.path.clone(),
            source,
        };
        let mut raw = self.raw.clone();
        for (key, program) in &self.programs {
            if let Some(Value::Object(obj)) = raw.get_mut(key) {
                patch_program(obj, program).map_err(json_err)?;
                continue;
            }
            let value = serde_json::to_value(program).map_err(json_err)?;
            raw.insert(key.clone(), value);
        }
        let mut out = serde_json::to_string_pretty(&raw).map_err(json_err)?;
        out.push('\n');
        Ok(out)
    }

    pub fn save(&self) -> Result<(), CatalogError> {
        let json = self.to_json()?;
        fs::write(&self.path, json).map_err(|source| CatalogError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn program(&self, key: &str) -> Result<&Program, CatalogError> {
        self.programs
            .get(key)
            .or_else(|| self.programs.values().find(|p| p.program_id == key))
            .ok_or_else(|| CatalogError::UnknownProgram {
                path: self.path.clone(),
                program: key.to_string(),
            })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Rename program keys that match neither the programId nor the
    /// programId without its country prefix. A rename whose target key is
    /// already taken is skipped. Returns the `(old, new)` pairs applied.
    pub fn normalize_keys(&mut self) -> Vec<(String, String)> {
        let mut renames: Vec<(String, String)> = Vec::new();
        for (key, program) in &self.programs {
            let wanted = program_key(&program.program_id);
            if key == &program.program_id || key == wanted {
                continue;
            }
            let taken = self.programs.contains_key(wanted)
                || renames.iter().any(|(_, new)| new == wanted);
            if taken {
                warn!(key = %key, wanted, "program key left as is, target already in use");
                continue;
            }
            renames.push((key.clone(), wanted.to_string()));
        }
        if renames.is_empty() {
            return renames;
        }

        let renamed = |key: String| -> String {
            renames
                .iter()
                .find(|(old, _)| *old == key)
                .map_or(key, |(_, new)| new.clone())
        };
        self.programs = std::mem::take(&mut self.programs)
            .into_iter()
            .map(|(k, v)| (renamed(k), v))
            .collect();
        self.raw = std::mem::take(&mut self.raw)
            .into_iter()
            .map(|(k, v)| (renamed(k), v))
            .collect();
        renames
    }
}

/// Program key derived from a programId: `de_eu_blue_card` → `eu_blue_card`.
pub fn program_key(program_id: &str) -> &str {
    let b = program_id.as_bytes();
    if b.len() >= 3 && b[2] == b'_' && b[..2].iter().all(u8::is_ascii_lowercase) {
        &program_id[3..]
    } else {
        program_id
    }
}

/// Write the diagram text and steps of `program` into its stored object.
/// Everything else in `obj` is left as read. New steps appended after the
/// stored ones are pushed onto the existing array.
fn patch_program(obj: &mut Map<String, Value>, program: &Program) -> Result<(), serde_json::Error> {
    let text_key = if !obj.contains_key(DIAGRAM_KEY) && obj.contains_key(LEGACY_DIAGRAM_KEY) {
        LEGACY_DIAGRAM_KEY
    } else {
        DIAGRAM_KEY
    };
    if obj.get(text_key).and_then(Value::as_str) != Some(program.diagram_text.as_str()) {
        obj.insert(text_key.to_string(), Value::String(program.diagram_text.clone()));
    }

    let stored = match obj.get(STEPS_KEY) {
        Some(value) => Vec::<Step>::deserialize(value)?,
        None => Vec::new(),
    };
    if stored == program.steps {
        return Ok(());
    }
    match obj.get_mut(STEPS_KEY) {
        Some(Value::Array(items)) if program.steps.starts_with(&stored) => {
            for step in &program.steps[stored.len()..] {
                items.push(serde_json::to_value(step)?);
            }
        }
        _ => {
            obj.insert(STEPS_KEY.to_string(), serde_json::to_value(&program.steps)?);
        }
    }
    Ok(())
}

/// Every `*.json` file in `dir` except the index file, sorted by name.
pub fn list_data_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CatalogError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .filter(|p| p.file_name().is_some_and(|n| n != INDEX_FILE))
        .collect();
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "data files found");
    Ok(files)
}

// ─── Key normalization ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRename {
    pub file: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default)]
pub struct KeySummary {
    pub files_processed: usize,
    pub files_modified: usize,
    pub renames: Vec<KeyRename>,
    pub errors: Vec<String>,
}

/// Apply [`DataFile::normalize_keys`] to every data file in `dir`. With
/// `dry_run` the renames are reported but nothing is written.
pub fn normalize_dir(dir: impl AsRef<Path>, dry_run: bool) -> Result<KeySummary, CatalogError> {
    let mut summary = KeySummary::default();
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
        let renames = file.normalize_keys();
        if renames.is_empty() {
            continue;
        }
        let name = file.file_name();
        if !dry_run {
            if let Err(e) = file.save() {
                error!("{e}");
                summary.errors.push(e.to_string());
                continue;
            }
            info!(file = %name, renamed = renames.len(), "program keys renamed");
        }
        summary.files_modified += 1;
        summary.renames.extend(renames.into_iter().map(|(from, to)| KeyRename {
            file: name.clone(),
            from,
            to,
        }));
    }
    Ok(summary)
}
