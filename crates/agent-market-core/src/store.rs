use std::path::PathBuf;
use std::sync::RwLock;

use tracing::debug;

use crate::catalog::AgentRecord;
use crate::error::{MarketError, Result};

/// Where catalog records live. Records are never updated individually;
/// the whole collection is replaced at seed time.
pub trait AgentRepository: Send + Sync {
    /// All records, in insertion order.
    fn list(&self) -> Result<Vec<AgentRecord>>;

    fn get(&self, id: u32) -> Result<Option<AgentRecord>>;

    /// Drop every record, then insert `records`.
    fn replace_all(&self, records: Vec<AgentRecord>) -> Result<()>;
}

fn poisoned<T>(_: T) -> MarketError {
    MarketError::Other("store lock poisoned".into())
}

/// Process-local store. Starts empty unless built from records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AgentRecord>>,
}

impl MemoryStore {
    pub fn new(records: Vec<AgentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl AgentRepository for MemoryStore {
    fn list(&self) -> Result<Vec<AgentRecord>> {
        Ok(self.records.read().map_err(poisoned)?.clone())
    }

    fn get(&self, id: u32) -> Result<Option<AgentRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    fn replace_all(&self, records: Vec<AgentRecord>) -> Result<()> {
        *self.records.write().map_err(poisoned)? = records;
        Ok(())
    }
}

/// Store backed by a JSON array on disk. Reads go through an in-memory copy;
/// `replace_all` rewrites the file before swapping the copy.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: RwLock<Vec<AgentRecord>>,
}

impl FileStore {
    /// Open `path`, treating a missing file as an empty catalog.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(MarketError::Io(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        debug!(path = %path.display(), "opened catalog file");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }
}

impl AgentRepository for FileStore {
    fn list(&self) -> Result<Vec<AgentRecord>> {
        Ok(self.records.read().map_err(poisoned)?.clone())
    }

    fn get(&self, id: u32) -> Result<Option<AgentRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    fn replace_all(&self, records: Vec<AgentRecord>) -> Result<()> {
        let mut guard = self.records.write().map_err(poisoned)?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    MarketError::Io(format!("failed to create {}: {e}", dir.display()))
                })?;
            }
        }
        // Readers never see a partially written file: write a sibling, then rename.
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&records)?;
        std::fs::write(&tmp, body)
            .map_err(|e| MarketError::Io(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            MarketError::Io(format!("failed to replace {}: {e}", self.path.display()))
        })?;
        *guard = records;
        Ok(())
    }
}
