use crate::error::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const NAME_KEY: &str = "tfUserName";
pub const EMAIL_KEY: &str = "tfUserEmail";
pub const PHONE_KEY: &str = "tfUserPhone";

/// Persisted profile fields shown by the settings page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl SessionRecord {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.phone.is_empty()
    }

    /// Up to two uppercase initials from the name
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// Partial write; unset or empty fields leave the stored value alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl SessionUpdate {
    fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (NAME_KEY, self.name.as_deref()),
            (EMAIL_KEY, self.email.as_deref()),
            (PHONE_KEY, self.phone.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
    }
}

/// Durable client-side storage for the session fields. Last write wins.
pub trait SessionStore: Send + Sync {
    fn set(&self, update: &SessionUpdate) -> Result<()>;
    fn get(&self) -> Result<SessionRecord>;
    fn clear(&self) -> Result<()>;
}

type Entries = BTreeMap<String, String>;

fn apply_update(entries: &mut Entries, update: &SessionUpdate) {
    for (key, value) in update.entries() {
        entries.insert(key.to_string(), value.to_string());
    }
}

fn record_from(entries: &Entries) -> SessionRecord {
    let field = |key: &str| entries.get(key).cloned().unwrap_or_default();
    SessionRecord {
        name: field(NAME_KEY),
        email: field(EMAIL_KEY),
        phone: field(PHONE_KEY),
    }
}

fn remove_session_keys(entries: &mut Entries) {
    for key in [NAME_KEY, EMAIL_KEY, PHONE_KEY] {
        entries.remove(key);
    }
}

/// JSON key/value file, preserving keys it does not own
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        debug!("Session store written to {}", self.path.display());
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn set(&self, update: &SessionUpdate) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        apply_update(&mut entries, update);
        self.write_entries(&entries)?;
        info!("Session fields persisted");
        Ok(())
    }

    fn get(&self) -> Result<SessionRecord> {
        let _guard = self.lock.lock();
        Ok(record_from(&self.read_entries()?))
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        remove_session_keys(&mut entries);
        self.write_entries(&entries)?;
        info!("Session fields cleared");
        Ok(())
    }
}

/// Process-local store, used when nothing should touch disk
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<Entries>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn set(&self, update: &SessionUpdate) -> Result<()> {
        apply_update(&mut self.entries.lock(), update);
        Ok(())
    }

    fn get(&self) -> Result<SessionRecord> {
        Ok(record_from(&self.entries.lock()))
    }

    fn clear(&self) -> Result<()> {
        remove_session_keys(&mut self.entries.lock());
        Ok(())
    }
}
