//! Tracking of the field paths seen in indexed documents.
//!
//! Paths are dotted (`brewery.name`); array elements share their parent's
//! path. The set is persisted next to the index so that it survives reopen.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;

use crate::errors::IndexError;

/// File name of the persisted field list inside the index directory.
const FIELDS_FILE: &str = "fields.json";

/// Set of known field paths, persisted to disk on change.
pub struct FieldRegistry {
    path: PathBuf,
    known: RwLock<BTreeSet<String>>,
}

impl FieldRegistry {
    /// Load the registry for an index directory, starting empty if no field
    /// list was written yet.
    pub fn load(index_dir: &Path) -> Result<Self, IndexError> {
        let path = index_dir.join(FIELDS_FILE);
        let known = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes)
                .map_err(|e| IndexError::open(format!("Invalid {}: {}", FIELDS_FILE, e)))?
        } else {
            BTreeSet::new()
        };

        Ok(Self {
            path,
            known: RwLock::new(known),
        })
    }

    /// Merge newly seen paths, writing the list out if anything changed.
    pub fn extend(&self, paths: BTreeSet<String>) -> Result<(), IndexError> {
        let mut known = self
            .known
            .write()
            .map_err(|_| IndexError::write("field registry lock poisoned"))?;

        let before = known.len();
        known.extend(paths);
        if known.len() == before {
            return Ok(());
        }

        let bytes = serde_json::to_vec(&*known)
            .map_err(|e| IndexError::write(format!("Failed to encode field list: {}", e)))?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// All known paths, sorted.
    pub fn list(&self) -> Result<Vec<String>, IndexError> {
        let known = self
            .known
            .read()
            .map_err(|_| IndexError::read("field registry lock poisoned"))?;
        Ok(known.iter().cloned().collect())
    }
}

/// Collect the dotted path of every scalar leaf in `value`.
pub fn collect_paths(value: &Value, prefix: &str, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_paths(child, &path, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_paths(item, prefix, out);
            }
        }
        Value::Null => {}
        _ => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string());
            }
        }
    }
}

/// Collect every string and number in `value`, in document order.
pub fn collect_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => map.values().for_each(|child| collect_text(child, out)),
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(_) | Value::Null => {}
    }
}

/// Look up a dotted path in a document.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}
