//! Core PlanStore implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::key::StorageKey;
use crate::plan::Plan;
use crate::{RECORD_EXTENSION, record};

/// A plan read back from storage
#[derive(Debug, Clone)]
pub struct StoredPlanRecord {
    /// Key the record is stored under
    pub key: StorageKey,
    /// Plan parsed from the record
    pub plan: Plan,
    /// Last modification time of the record file
    pub modified: DateTime<Utc>,
}

/// File-backed plan store
///
/// Safe to share between threads: every save writes a private temporary file
/// and renames it into place, so a reader never sees a half-written record.
#[derive(Debug, Clone)]
pub struct PlanStore {
    base_path: PathBuf,
}

impl PlanStore {
    /// Open or create a plan store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| StoreError::io(&base_path, e))?;
        debug!(?base_path, "Opened plan store");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the record for a key
    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.base_path.join(key.file_name())
    }

    /// Persist a plan, overwriting any record with the same key
    pub fn save(&self, plan: &Plan) -> Result<StorageKey> {
        let key = plan.key();
        debug!(%key, step_count = plan.steps.len(), "save: called");

        fs::create_dir_all(&self.base_path).map_err(|e| StoreError::io(&self.base_path, e))?;

        let target = self.path_for(&key);
        let tmp = self.base_path.join(format!(".{}.{}.tmp", key, Uuid::now_v7()));
        fs::write(&tmp, record::format(plan)).map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&target, e));
        }

        info!(%key, path = %target.display(), "Saved plan");
        Ok(key)
    }

    /// Raw text of a stored record
    pub fn read(&self, key: &StorageKey) -> Result<String> {
        debug!(%key, "read: called");
        let path = self.path_for(key);
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::io(&path, e),
        })
    }

    /// All stored plans, most recently modified first
    pub fn list_history(&self) -> Result<Vec<StoredPlanRecord>> {
        debug!(base_path = ?self.base_path, "list_history: called");
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("list_history: store directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.base_path, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.base_path, e))?;
            let path = entry.path();
            let Some(key) = record_key(&path) else {
                continue;
            };

            match load_record(&path, key) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable plan record"),
            }
        }

        records.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.key.cmp(&b.key)));
        debug!(count = records.len(), "list_history: done");
        Ok(records)
    }
}

/// Key for a visible `.txt` record file, `None` for anything else
fn record_key(path: &Path) -> Option<StorageKey> {
    if !path.is_file() {
        return None;
    }
    if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') {
        return None;
    }
    Some(StorageKey::from_file_stem(stem))
}

fn load_record(path: &Path, key: StorageKey) -> Result<StoredPlanRecord> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut plan = record::parse(&text);
    if plan.project_name.is_empty() {
        plan.project_name = key.display_name();
    }

    Ok(StoredPlanRecord {
        key,
        plan,
        modified: DateTime::<Utc>::from(modified),
    })
}
