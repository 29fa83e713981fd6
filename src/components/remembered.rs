//! Remembered attendee names, keyed by client and event id.

use crate::error::InviteResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Request header carrying the browser's own client id
pub const CLIENT_ID_HEADER: &str = "x-inviteday-client";

/// What an attendee chose on a previous visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RememberedAttendee {
    pub name: String,
    pub show_name: bool,
}

/// Get/set/delete contract for remembered attendees.
///
/// Entries belong to one client; a client never sees another client's entry.
/// Implementations may block and are called off the async runtime.
pub trait RememberedStore: Send + Sync + 'static {
    fn get(&self, client_id: &str, event_id: &str) -> InviteResult<Option<RememberedAttendee>>;
    fn set(
        &self,
        client_id: &str,
        event_id: &str,
        attendee: &RememberedAttendee,
    ) -> InviteResult<()>;
    fn delete(&self, client_id: &str, event_id: &str) -> InviteResult<()>;
}

type Entries = BTreeMap<String, BTreeMap<String, RememberedAttendee>>;

/// In-memory implementation (for testing)
#[derive(Debug, Default)]
pub struct InMemoryRememberedStore {
    entries: RwLock<Entries>,
}

impl RememberedStore for InMemoryRememberedStore {
    fn get(&self, client_id: &str, event_id: &str) -> InviteResult<Option<RememberedAttendee>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .get(client_id)
            .and_then(|events| events.get(event_id))
            .cloned())
    }

    fn set(
        &self,
        client_id: &str,
        event_id: &str,
        attendee: &RememberedAttendee,
    ) -> InviteResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(client_id.to_string())
            .or_default()
            .insert(event_id.to_string(), attendee.clone());
        Ok(())
    }

    fn delete(&self, client_id: &str, event_id: &str) -> InviteResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        remove_entry(&mut entries, client_id, event_id);
        Ok(())
    }
}

fn remove_entry(entries: &mut Entries, client_id: &str, event_id: &str) -> bool {
    let Some(events) = entries.get_mut(client_id) else {
        return false;
    };
    let removed = events.remove(event_id).is_some();
    if events.is_empty() {
        entries.remove(client_id);
    }
    removed
}

/// Store backed by a TOML file with one table per client, one entry per event
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    fn read_all(&self) -> InviteResult<Entries> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn write_all(&self, entries: &Entries) -> InviteResult<()> {
        // Create the parent directory if it doesn't exist
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !Path::new(parent).exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_str = toml::to_string(entries)?;
        fs::write(&self.path, toml_str)?;
        debug!("Saved remembered attendees for {} clients", entries.len());

        Ok(())
    }
}

impl RememberedStore for TomlFileStore {
    fn get(&self, client_id: &str, event_id: &str) -> InviteResult<Option<RememberedAttendee>> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        Ok(self
            .read_all()?
            .remove(client_id)
            .and_then(|mut events| events.remove(event_id)))
    }

    fn set(
        &self,
        client_id: &str,
        event_id: &str,
        attendee: &RememberedAttendee,
    ) -> InviteResult<()> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_all()?;
        entries
            .entry(client_id.to_string())
            .or_default()
            .insert(event_id.to_string(), attendee.clone());
        self.write_all(&entries)
    }

    fn delete(&self, client_id: &str, event_id: &str) -> InviteResult<()> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_all()?;
        if remove_entry(&mut entries, client_id, event_id) {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
