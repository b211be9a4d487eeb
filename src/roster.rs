use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::{error::RosterError, objects::{event::EventSnapshot, participant::{FieldUpdates, Participant}}};

pub mod document;

#[cfg(test)]
mod tests;

pub use document::{DocumentStore, FileDocument};

/// Owns the current event snapshot and its durable mirror. Imports and
/// operator edits are serialized through `writer`, readers only ever see a
/// fully built snapshot.
pub struct RosterStore {
    document: Box<dyn DocumentStore>,
    writer: Mutex<()>,
    current: RwLock<Arc<EventSnapshot>>,
}

impl RosterStore {
    /// Reads the durable document. A missing or unreadable document leaves
    /// the roster empty, which is a valid starting state.
    pub fn load(document: Box<dyn DocumentStore>) -> RosterStore {
        let snapshot = match document.read() {
            Ok(Some(contents)) => match serde_json::from_str::<EventSnapshot>(&contents) {
                Ok(snap) => {
                    tracing::info!(count = snap.participants.len(), title = %snap.title, "roster loaded");
                    snap
                },
                Err(e) => {
                    tracing::warn!("unable to parse stored roster, starting empty: {e}");
                    EventSnapshot::default()
                }
            },
            Ok(None) => {
                tracing::info!("no stored roster, starting empty");
                EventSnapshot::default()
            },
            Err(e) => {
                tracing::warn!("unable to read stored roster, starting empty: {e}");
                EventSnapshot::default()
            }
        };
        RosterStore {
            document,
            writer: Mutex::new(()),
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Read-only view of the latest committed roster.
    pub fn snapshot(&self) -> Arc<EventSnapshot> {
        match self.current.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Swaps in a whole new snapshot. The in-memory roster is replaced even
    /// if the durable write fails.
    pub fn replace(&self, snapshot: EventSnapshot) -> Result<(), RosterError> {
        let _guard = self.writer.lock()
            .map_err(|_| RosterError::Persistence(String::from("roster writer lock poisoned")))?;
        let count = snapshot.participants.len();
        let res = self.persist(&snapshot);
        self.publish(snapshot);
        tracing::info!(count, "roster replaced");
        res
    }

    pub fn mutate(&self, number: &str, updates: &FieldUpdates) -> Result<Participant, RosterError> {
        self.mutate_at(number, updates, Utc::now())
    }

    /// Applies operator edits to one participant and stamps it as modified.
    /// Timestamps never move backwards for a participant even if the wall
    /// clock does.
    pub fn mutate_at(&self, number: &str, updates: &FieldUpdates, now: DateTime<Utc>) -> Result<Participant, RosterError> {
        let _guard = self.writer.lock()
            .map_err(|_| RosterError::Persistence(String::from("roster writer lock poisoned")))?;
        let mut snapshot = (*self.snapshot()).clone();
        let participant = match snapshot.participants.iter_mut().find(|p| p.number() == number) {
            Some(p) => p,
            None => return Err(RosterError::NotFound(String::from(number))),
        };
        let stamp = match participant.last_modified() {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        participant.apply(updates, stamp);
        let output = participant.clone();
        let res = self.persist(&snapshot);
        self.publish(snapshot);
        tracing::debug!(number, "participant updated");
        res.map(|_| output)
    }

    pub fn set_session_key(&self, key: Option<String>) -> Result<(), RosterError> {
        let _guard = self.writer.lock()
            .map_err(|_| RosterError::Persistence(String::from("roster writer lock poisoned")))?;
        let mut snapshot = (*self.snapshot()).clone();
        snapshot.session_key = key;
        let res = self.persist(&snapshot);
        self.publish(snapshot);
        res
    }

    fn persist(&self, snapshot: &EventSnapshot) -> Result<(), RosterError> {
        let contents = serde_json::to_string(snapshot)
            .map_err(|e| RosterError::Persistence(format!("unable to serialize roster: {e}")))?;
        if let Err(e) = self.document.write(&contents) {
            tracing::error!("unable to save roster: {e}");
            return Err(e)
        }
        Ok(())
    }

    fn publish(&self, snapshot: EventSnapshot) {
        match self.current.write() {
            Ok(mut current) => *current = Arc::new(snapshot),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(snapshot),
        }
    }
}
