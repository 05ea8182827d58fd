//! Durable slot for the task collection.
//!
//! The slot holds a single JSON array of tasks and is always overwritten whole.
//! Read and write failures never reach the task list: a bad or missing slot
//! loads as an empty list, and a failed write leaves the in-memory list as the
//! source of truth for the rest of the session.

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};

use crate::core::task::Task;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read task slot: {0}")]
    Read(#[source] io::Error),

    #[error("malformed task slot: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode tasks: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write task slot: {0}")]
    Write(#[source] io::Error),
}

pub fn decode_tasks(content: &str) -> Result<Vec<Task>, StoreError> {
    let tasks: Option<Vec<Task>> = serde_json::from_str(content).map_err(StoreError::Decode)?;
    Ok(tasks.unwrap_or_default())
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, StoreError> {
    serde_json::to_string(tasks).map_err(StoreError::Encode)
}

/// Where the task collection is persisted between sessions.
pub trait TaskStore {
    /// Read the slot. `Ok(None)` means the slot has never been written.
    fn try_load(&self) -> Result<Option<Vec<Task>>, StoreError>;

    /// Replace the slot with `tasks`.
    fn try_save(&self, tasks: &[Task]) -> Result<(), StoreError>;

    fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(Some(tasks)) => {
                log::debug!("Loaded {} tasks", tasks.len());
                tasks
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to load tasks, starting with an empty list: {}", e);
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) {
        if let Err(e) = self.try_save(tasks) {
            log::error!("Failed to save tasks: {}", e);
        }
    }
}

/// A slot backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The slot named `key` inside `dir`.
    pub fn in_dir(dir: &Path, key: &str) -> Self {
        Self::new(dir.join(format!("{}.json", key)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TaskStore for FileStore {
    fn try_load(&self) -> Result<Option<Vec<Task>>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => decode_tasks(&content).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read(e)),
        }
    }

    fn try_save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let json = encode_tasks(tasks)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }
        // Write beside the target and rename so a crash never leaves a half-written slot.
        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(StoreError::Write)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StoreError::Write(e)
        })
    }
}

/// An in-process slot holding the raw JSON text, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RefCell<Option<String>>,
    read_only: bool,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already holds `raw`, valid JSON or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
            ..Self::default()
        }
    }

    /// A slot whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl TaskStore for MemoryStore {
    fn try_load(&self) -> Result<Option<Vec<Task>>, StoreError> {
        match self.raw.borrow().as_deref() {
            Some(content) => decode_tasks(content).map(Some),
            None => Ok(None),
        }
    }

    fn try_save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Write(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "slot is read-only",
            )));
        }
        let json = encode_tasks(tasks)?;
        *self.raw.borrow_mut() = Some(json);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
