//! In-memory owner of the month records.
//!
//! Every successful mutation is followed by a notification to each
//! registered [`StoreObserver`] with the full collection, which is how the
//! records reach the database file and the activity log.

use chrono::{DateTime, Local};
use logger::ActivityLog;
use models::{now_millis, MonthData, Settings};
use serde_json::json;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::database::{read_months, write_months};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("month record '{0}' already exists")]
    DuplicateId(String),

    #[error("month record '{0}' not found")]
    NotFound(String),

    #[error("imported records contain duplicate id '{0}'")]
    DuplicateImportId(String),

    #[error("observer '{observer}' failed after {change}: {source}")]
    Observer {
        observer: String,
        change: String,
        #[source]
        source: anyhow::Error,
    },
}

/// What the last mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Appended(String),
    Replaced(String),
    Removed(String),
    Imported(usize),
}

impl Change {
    pub fn action(&self) -> &'static str {
        match self {
            Change::Appended(_) => "append",
            Change::Replaced(_) => "replace",
            Change::Removed(_) => "remove",
            Change::Imported(_) => "import",
        }
    }

    fn detail(&self) -> serde_json::Value {
        match self {
            Change::Appended(id) | Change::Replaced(id) | Change::Removed(id) => json!({ "id": id }),
            Change::Imported(count) => json!({ "count": count }),
        }
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Appended(id) | Change::Replaced(id) | Change::Removed(id) => {
                write!(f, "{} of '{}'", self.action(), id)
            }
            Change::Imported(count) => write!(f, "import of {} records", count),
        }
    }
}

pub trait StoreObserver {
    fn name(&self) -> &str;
    fn on_change(&self, change: &Change, months: &[MonthData]) -> anyhow::Result<()>;
}

/// Mirrors the collection to the months database file.
pub struct DatabaseWriter {
    path: PathBuf,
}

impl DatabaseWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StoreObserver for DatabaseWriter {
    fn name(&self) -> &str {
        "database"
    }

    fn on_change(&self, _change: &Change, months: &[MonthData]) -> anyhow::Result<()> {
        let path = write_months(&self.path, months)?;
        tracing::debug!(count = months.len(), "Persisted month records to {:?}", path);
        Ok(())
    }
}

/// Appends one activity-log line per mutation.
pub struct ActivityRecorder {
    log: ActivityLog,
}

impl ActivityRecorder {
    pub fn new(log: ActivityLog) -> Self {
        Self { log }
    }
}

impl StoreObserver for ActivityRecorder {
    fn name(&self) -> &str {
        "activity-log"
    }

    fn on_change(&self, change: &Change, months: &[MonthData]) -> anyhow::Result<()> {
        let mut detail = change.detail();
        detail["total"] = json!(months.len());
        self.log.append(change.action(), detail)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MonthStore {
    months: Vec<MonthData>,
    observers: Vec<Box<dyn StoreObserver>>,
    last_saved: Option<DateTime<Local>>,
}

impl MonthStore {
    pub fn new(months: Vec<MonthData>) -> Self {
        Self {
            months,
            observers: Vec::new(),
            last_saved: None,
        }
    }

    /// Loads the configured database and wires the database writer plus,
    /// when configured, the activity recorder.
    pub fn open(settings: &Settings) -> anyhow::Result<Self> {
        let months = read_months(&settings.database_path)?;
        let mut store = MonthStore::new(months).with_observer(DatabaseWriter::new(&settings.database_path));
        if let Some(log_path) = &settings.activity_log_path {
            store = store.with_observer(ActivityRecorder::new(ActivityLog::new(log_path)));
        }
        Ok(store)
    }

    pub fn with_observer<O: StoreObserver + 'static>(mut self, observer: O) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn months(&self) -> &[MonthData] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MonthData> {
        self.months.iter().find(|m| m.id == id)
    }

    /// Most recently appended record.
    pub fn latest(&self) -> Option<&MonthData> {
        self.months.last()
    }

    /// Time at which every observer last acknowledged a change.
    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        self.last_saved
    }

    /// Current wall clock in milliseconds, bumped until no record uses it.
    pub fn fresh_id(&self) -> String {
        let mut candidate = now_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    pub fn append(&mut self, month: MonthData) -> Result<(), StoreError> {
        if self.get(&month.id).is_some() {
            return Err(StoreError::DuplicateId(month.id));
        }
        let change = Change::Appended(month.id.clone());
        self.months.push(month);
        self.notify(change)
    }

    /// Swaps in a new version of an existing record, keeping its position.
    /// Returns the previous version.
    pub fn replace(&mut self, month: MonthData) -> Result<MonthData, StoreError> {
        let idx = self
            .position(&month.id)
            .ok_or_else(|| StoreError::NotFound(month.id.clone()))?;
        let change = Change::Replaced(month.id.clone());
        let previous = std::mem::replace(&mut self.months[idx], month);
        self.notify(change)?;
        Ok(previous)
    }

    /// Replace when the id is known, append otherwise.
    pub fn save(&mut self, month: MonthData) -> Result<(), StoreError> {
        if self.get(&month.id).is_some() {
            self.replace(month).map(|_| ())
        } else {
            self.append(month)
        }
    }

    pub fn remove(&mut self, id: &str) -> Result<MonthData, StoreError> {
        let idx = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = self.months.remove(idx);
        self.notify(Change::Removed(removed.id.clone()))?;
        Ok(removed)
    }

    /// Discards the current collection in favour of `months`. A payload
    /// with repeated ids is refused and the prior state is kept.
    pub fn import_all(&mut self, months: Vec<MonthData>) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        if let Some(dup) = months.iter().find(|m| !seen.insert(m.id.as_str())) {
            return Err(StoreError::DuplicateImportId(dup.id.clone()));
        }
        let count = months.len();
        self.months = months;
        self.notify(Change::Imported(count))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.months.iter().position(|m| m.id == id)
    }

    /// The in-memory change stands even when an observer fails; the error
    /// tells the caller which side effect did not happen.
    fn notify(&mut self, change: Change) -> Result<(), StoreError> {
        tracing::info!(total = self.months.len(), "{}", change);
        for observer in &self.observers {
            observer
                .on_change(&change, &self.months)
                .map_err(|source| StoreError::Observer {
                    observer: observer.name().to_string(),
                    change: change.to_string(),
                    source,
                })?;
        }
        self.last_saved = Some(Local::now());
        Ok(())
    }
}
