use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, warn};

use crate::history::HistoryFile;

pub const DEFAULT_HISTORY_FILE: &str = "predictions_history.json";

/// Whole-document storage for the prediction history.
///
/// `load` never fails: a missing or unreadable document is an empty history.
/// The file store moves an unreadable document aside before starting fresh.
/// `save` replaces the whole document.
pub trait HistoryStore {
    fn load(&self) -> HistoryFile;
    fn save(&self, history: &HistoryFile) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Prepares the store location, creating the parent directory if needed.
    /// Fails when there is nowhere writable to keep the history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(anyhow!("history path is empty"));
        }
        if path.is_dir() {
            return Err(anyhow!("history path {} is a directory", path.display()));
        }
        let dir = parent_dir(&path);
        fs::create_dir_all(&dir)
            .with_context(|| format!("create history directory {}", dir.display()))?;
        let meta = fs::metadata(&dir)
            .with_context(|| format!("inspect history directory {}", dir.display()))?;
        if meta.permissions().readonly() {
            return Err(anyhow!("history directory {} is read-only", dir.display()));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> HistoryFile {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            debug!(path = %self.path.display(), "no history file yet, starting fresh");
            return HistoryFile::default();
        };
        match serde_json::from_str::<HistoryFile>(&raw) {
            Ok(history) => history,
            Err(err) => {
                match self.set_aside() {
                    Ok(backup) => warn!(
                        path = %self.path.display(),
                        backup = %backup.display(),
                        error = %err,
                        "history file unreadable, moved aside and starting fresh"
                    ),
                    Err(move_err) => warn!(
                        path = %self.path.display(),
                        error = %err,
                        move_error = %move_err,
                        "history file unreadable and could not be moved aside, starting fresh"
                    ),
                }
                HistoryFile::default()
            }
        }
    }

    fn save(&self, history: &HistoryFile) -> Result<()> {
        let json = serde_json::to_string_pretty(history).context("serialize history")?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file =
            File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("write {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("sync {}", tmp.display()))?;
        drop(file);
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("swap history into {}", self.path.display()))?;
        Ok(())
    }
}

impl JsonFileStore {
    // Unparseable history is kept as `<name>.corrupt-<timestamp>` next to the store.
    fn set_aside(&self) -> Result<PathBuf> {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_HISTORY_FILE.to_string());
        let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S");
        let dir = parent_dir(&self.path);
        let mut backup = dir.join(format!("{name}.corrupt-{stamp}"));
        let mut n = 1u32;
        while backup.exists() {
            backup = dir.join(format!("{name}.corrupt-{stamp}-{n}"));
            n += 1;
        }
        fs::rename(&self.path, &backup)
            .with_context(|| format!("move {} to {}", self.path.display(), backup.display()))?;
        Ok(backup)
    }
}

/// Keeps the document in memory, round-tripping it through JSON so the on-disk
/// shape is exercised the same way as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: &HistoryFile) -> Result<Self> {
        let store = Self::new();
        store.save(history)?;
        Ok(store)
    }

    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: RefCell::new(Some(raw.to_string())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> HistoryFile {
        self.raw
            .borrow()
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    fn save(&self, history: &HistoryFile) -> Result<()> {
        let json = serde_json::to_string_pretty(history).context("serialize history")?;
        *self.raw.borrow_mut() = Some(json);
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
