//! Reading and writing metadata sidecars.
//!
//! Sidecars are treated as best-effort data: a missing file, or one that is
//! not a JSON object, is reported as absent rather than as an error. Fields
//! with unexpected values are read as absent one by one (see
//! [`crate::models`]).
//!
//! Amending goes through the raw JSON object, so whatever the typed view
//! could not read is written back as it was found.

use crate::error::CorpusResult;
use crate::models::MetadataSidecar;
use crate::utils::to_pretty_json;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

/// The sidecar at `path` as a raw JSON object, or `None` when there is no file.
fn read_object(path: &Path) -> CorpusResult<Option<Map<String, Value>>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Load a sidecar, treating a missing or malformed file as absent.
pub fn load(path: &Path) -> Option<MetadataSidecar> {
    let object = match read_object(path) {
        Ok(object) => object?,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed metadata sidecar; ignoring its fields");
            return None;
        }
    };
    match serde_json::from_value(Value::Object(object)) {
        Ok(sidecar) => Some(sidecar),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable metadata sidecar; ignoring its fields");
            None
        }
    }
}

/// Recursively overlay `update` onto `base`. Objects are merged key by key;
/// anything else replaces what was there.
fn merge(base: &mut Value, update: Value) {
    match (base, update) {
        (Value::Object(base), Value::Object(update)) => {
            for (key, value) in update {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, update) => *base = update,
    }
}

/// Amend the sidecar at `path`, creating it when absent.
///
/// `edit` sees the typed view of the file. The fields it sets are merged
/// into the stored object; every other key keeps its stored value, whether
/// or not the typed view could read it. A file that is not a JSON object is
/// an error and is left untouched.
pub fn amend(path: &Path, edit: impl FnOnce(&mut MetadataSidecar)) -> CorpusResult<()> {
    let mut stored = Value::Object(read_object(path)?.unwrap_or_default());
    let mut meta: MetadataSidecar = serde_json::from_value(stored.clone())?;
    edit(&mut meta);
    merge(&mut stored, serde_json::to_value(&meta)?);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_pretty_json(&stored)?)?;
    Ok(())
}

/// Write a sidecar as pretty JSON, creating parent directories.
pub fn save(path: &Path, sidecar: &MetadataSidecar) -> CorpusResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_pretty_json(sidecar)?)?;
    Ok(())
}
