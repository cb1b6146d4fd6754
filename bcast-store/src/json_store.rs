//! JSON-file store for the three persisted collections.
//!
//! Each collection lives in its own file under the data directory and is
//! loaded/saved as a whole on every mutation. Missing files load as empty
//! collections; malformed files are logged and fall back to empty so the
//! process keeps running. Saves write to a temp file and rename into place,
//! so a reader never observes a partial collection.

use std::fs;
use std::path::{Path, PathBuf};

use bcast_core::{Group, StoredMessage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::StorageError;

const MESSAGES_FILE: &str = "messages.json";
const GROUPS_FILE: &str = "groups.json";
const ADMINS_FILE: &str = "admins.json";

/// File-backed store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Creates a store rooted at `dir`; the directory is created if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn load_messages(&self) -> Vec<StoredMessage> {
        let messages: Vec<StoredMessage> = self.load_collection(MESSAGES_FILE);
        info!(count = messages.len(), "Loaded messages");
        messages
    }

    pub fn save_messages(&self, messages: &[StoredMessage]) -> Result<(), StorageError> {
        self.save_collection(MESSAGES_FILE, messages)
    }

    pub fn load_groups(&self) -> Vec<Group> {
        let groups: Vec<Group> = self.load_collection(GROUPS_FILE);
        info!(count = groups.len(), "Loaded groups");
        groups
    }

    pub fn save_groups(&self, groups: &[Group]) -> Result<(), StorageError> {
        self.save_collection(GROUPS_FILE, groups)
    }

    /// Loads the admin list, coercing malformed shapes into a canonical
    /// string list: a scalar becomes a single-element list, anything else
    /// becomes empty. A corrected form is persisted back immediately.
    pub fn load_admins(&self) -> Vec<String> {
        let path = self.dir.join(ADMINS_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read admins, falling back to empty");
                return Vec::new();
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Malformed admins file, falling back to empty");
                return Vec::new();
            }
        };

        let (admins, coerced) = coerce_admins(value);
        if coerced {
            warn!(admins = ?admins, "Admins file had a non-canonical shape, rewriting");
            if let Err(e) = self.save_admins(&admins) {
                error!(error = %e, "Failed to persist coerced admins");
            }
        }
        info!(count = admins.len(), "Loaded admins");
        admins
    }

    pub fn save_admins(&self, admins: &[String]) -> Result<(), StorageError> {
        self.save_collection(ADMINS_FILE, admins)
    }

    fn load_collection<T: DeserializeOwned>(&self, file: &str) -> Vec<T> {
        let path = self.dir.join(file);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read collection, falling back to empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Malformed collection file, falling back to empty");
                Vec::new()
            }
        }
    }

    fn save_collection<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StorageError> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(items)?;
        write_atomic(&path, &json)
    }
}

/// Writes via a sibling temp file and rename so a crash mid-write never
/// leaves a truncated collection behind.
fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(|source| StorageError::Io {
        path: tmp.display().to_string(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StorageError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Canonicalizes raw admin JSON into a string list. Returns the list and
/// whether the input shape differed from the canonical form.
fn coerce_admins(value: Value) -> (Vec<String>, bool) {
    match value {
        Value::Array(items) => {
            let mut admins = Vec::with_capacity(items.len());
            let mut coerced = false;
            for item in items {
                match item {
                    Value::String(s) => admins.push(s),
                    Value::Number(n) => {
                        admins.push(n.to_string());
                        coerced = true;
                    }
                    other => {
                        warn!(value = %other, "Dropping non-scalar admin entry");
                        coerced = true;
                    }
                }
            }
            (admins, coerced)
        }
        Value::String(s) => (vec![s], true),
        Value::Number(n) => (vec![n.to_string()], true),
        other => {
            warn!(value = %other, "Unknown admins shape, using empty list");
            (Vec::new(), true)
        }
    }
}
