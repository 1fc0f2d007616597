//! JSON blob store for the bot's [`Document`].
//!
//! The whole document lives in memory behind a mutex and is written back as
//! one pretty-printed JSON file after every committed mutation. The lock is
//! only ever held inside synchronous closures, never across an `.await`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Document, Project, Task};

pub const DATA_FILE_NAME: &str = "project_data.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file {path} is not a valid document: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct Store {
    path: Option<PathBuf>,
    doc: Arc<Mutex<Document>>,
}

impl Store {
    /// Open the store backed by `path`.
    ///
    /// A missing file starts an empty document. Task and project records
    /// that cannot be read are set aside and kept on save. A file that is not
    /// a document at all is logged and also starts empty; it is overwritten
    /// on the next save.
    pub fn open(path: PathBuf) -> Self {
        let doc = match load_document(&path) {
            Ok(Some(doc)) => {
                tracing::info!(
                    "Loaded {} project(s) from {}",
                    doc.projects.len(),
                    path.display()
                );
                doc
            }
            Ok(None) => {
                tracing::info!("No data file at {}, starting fresh", path.display());
                Document::default()
            }
            Err(e) => {
                tracing::warn!("{}; starting with an empty document", e);
                Document::default()
            }
        };
        Self {
            path: Some(path),
            doc: Arc::new(Mutex::new(doc)),
        }
    }

    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::open(default_path()?))
    }

    /// A store that never touches disk.
    pub fn open_memory() -> Self {
        Self::with_document(Document::default())
    }

    pub fn with_document(doc: Document) -> Self {
        Self {
            path: None,
            doc: Arc::new(Mutex::new(doc)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> Document {
        self.lock().clone()
    }

    /// Apply `f` to a draft of the current document, persist the draft, then
    /// make it current. If `f` or the save fails, nothing changes.
    pub fn update<T, E>(&self, f: impl FnOnce(&mut Document) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut current = self.lock();
        let mut draft = current.clone();
        let out = f(&mut draft)?;
        if let Some(path) = &self.path {
            save_document(path, &draft)?;
        }
        *current = draft;
        Ok(out)
    }

    /// Write the current document to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => save_document(path, &self.lock()),
            None => Ok(()),
        }
    }
}

/// Default data file location in the platform data directory.
pub fn default_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "crewmate")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join(DATA_FILE_NAME))
}

/// Read a document. `Ok(None)` when the file does not exist.
pub fn load_document(path: &Path) -> Result<Option<Document>, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let malformed = |source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    };
    let mut raw: Value = serde_json::from_slice(&bytes).map_err(malformed)?;
    set_aside_unreadable(&mut raw);
    let mut doc: Document = serde_json::from_value(raw).map_err(malformed)?;
    doc.normalize();
    Ok(Some(doc))
}

/// Move task and project records that do not parse into the `unreadable_*`
/// slots, so one bad record cannot cost the rest of the document.
fn set_aside_unreadable(raw: &mut Value) {
    let Some(projects) = raw.get_mut("projects").and_then(Value::as_object_mut) else {
        return;
    };

    let mut unreadable = Map::new();
    let names: Vec<String> = projects.keys().cloned().collect();
    for name in names {
        let Some(record) = projects.get_mut(&name) else {
            continue;
        };
        set_aside_unreadable_tasks(&name, record);
        if let Err(e) = Project::deserialize(&*record) {
            tracing::warn!("Project '{}' is unreadable and was set aside: {}", name, e);
            if let Some(record) = projects.remove(&name) {
                unreadable.insert(name, record);
            }
        }
    }

    if unreadable.is_empty() {
        return;
    }
    if let Some(obj) = raw.as_object_mut() {
        let slot = obj
            .entry("unreadable_projects")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(slot) = slot.as_object_mut() {
            slot.extend(unreadable);
        }
    }
}

fn set_aside_unreadable_tasks(project: &str, record: &mut Value) {
    let Some(obj) = record.as_object_mut() else {
        return;
    };
    let Some(tasks) = obj.get_mut("tasks").and_then(Value::as_array_mut) else {
        return;
    };

    let (good, bad): (Vec<Value>, Vec<Value>) = tasks
        .drain(..)
        .partition(|task| Task::deserialize(task).is_ok());
    *tasks = good;
    if bad.is_empty() {
        return;
    }

    tracing::warn!(
        "Set aside {} unreadable task(s) in project '{}'",
        bad.len(),
        project
    );
    let slot = obj
        .entry("unreadable_tasks")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(slot) = slot.as_array_mut() {
        slot.extend(bad);
    }
}

/// Replace the file at `path` with `doc`, via a sibling temp file and rename.
pub fn save_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_vec_pretty(doc)?;
    let tmp = path.with_extension("json.tmp");
    let mut file = std::fs::File::create(&tmp).map_err(io_err)?;
    file.write_all(&json).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);
    std::fs::rename(&tmp, path).map_err(io_err)?;

    tracing::debug!("Saved document to {}", path.display());
    Ok(())
}
