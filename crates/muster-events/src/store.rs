//! Event store adapter: a schema-versioned JSON document collection with
//! atomic whole-file persistence and per-document atomic membership updates.

use std::{
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use muster_core::write_text_atomic;

use crate::{error::EventError, event::Event};

const EVENT_STORE_SCHEMA_VERSION: u32 = 1;

/// Persistence seam between the lifecycle manager and the backing document
/// store. `add_participant` / `remove_participant` are atomic per-document
/// read-modify-writes so concurrent joins and leaves on the same id never
/// lose updates; the manager holds no cross-request locks of its own.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts a new document; `false` when the id is already taken, in
    /// which case the existing document is untouched.
    async fn insert(&self, event: &Event) -> Result<bool, EventError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, EventError>;
    async fn find_all(&self) -> Result<Vec<Event>, EventError>;
    /// Returns true when a document was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, EventError>;
    /// Set-add; `None` when the id is missing, unchanged document otherwise.
    async fn add_participant(&self, id: &str, user_id: &str)
        -> Result<Option<Event>, EventError>;
    /// Set-remove; `None` when the id is missing.
    async fn remove_participant(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Event>, EventError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventCollection {
    schema_version: u32,
    #[serde(default)]
    events: Vec<Event>,
}

impl Default for EventCollection {
    fn default() -> Self {
        Self {
            schema_version: EVENT_STORE_SCHEMA_VERSION,
            events: Vec::new(),
        }
    }
}

/// File-backed event collection. Mutations lock the in-memory state, apply
/// the change, and persist atomically before releasing the lock; the lock is
/// never held across an await point.
pub struct JsonEventStore {
    path: PathBuf,
    state: Mutex<EventCollection>,
}

impl JsonEventStore {
    pub fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read event store {}", path.display()))?;
            serde_json::from_str::<EventCollection>(&raw)
                .with_context(|| format!("failed to parse event store {}", path.display()))?
        } else {
            EventCollection::default()
        };

        if state.schema_version != EVENT_STORE_SCHEMA_VERSION {
            bail!(
                "unsupported event store schema: expected {}, found {}",
                EVENT_STORE_SCHEMA_VERSION,
                state.schema_version
            );
        }

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, EventCollection>, EventError> {
        self.state
            .lock()
            .map_err(|_| EventError::Upstream("event store mutex is poisoned".to_string()))
    }

    fn persist(&self, state: &EventCollection) -> Result<(), EventError> {
        let mut payload = serde_json::to_string_pretty(state).map_err(EventError::upstream)?;
        payload.push('\n');
        write_text_atomic(&self.path, &payload).map_err(EventError::upstream)
    }
}

#[async_trait]
impl EventStore for JsonEventStore {
    async fn insert(&self, event: &Event) -> Result<bool, EventError> {
        let mut state = self.lock_state()?;
        if state.events.iter().any(|entry| entry.id == event.id) {
            return Ok(false);
        }
        state.events.push(event.clone());
        self.persist(&state)?;
        Ok(true)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, EventError> {
        let state = self.lock_state()?;
        Ok(state.events.iter().find(|entry| entry.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Event>, EventError> {
        let state = self.lock_state()?;
        Ok(state.events.clone())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, EventError> {
        let mut state = self.lock_state()?;
        let before = state.events.len();
        state.events.retain(|entry| entry.id != id);
        if state.events.len() == before {
            return Ok(false);
        }
        self.persist(&state)?;
        Ok(true)
    }

    async fn add_participant(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Event>, EventError> {
        let mut state = self.lock_state()?;
        let Some(event) = state.events.iter_mut().find(|entry| entry.id == id) else {
            return Ok(None);
        };
        if event.has_participant(user_id) {
            return Ok(Some(event.clone()));
        }
        event.participants.push(user_id.to_string());
        let updated = event.clone();
        self.persist(&state)?;
        Ok(Some(updated))
    }

    async fn remove_participant(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Event>, EventError> {
        let mut state = self.lock_state()?;
        let Some(event) = state.events.iter_mut().find(|entry| entry.id == id) else {
            return Ok(None);
        };
        if !event.has_participant(user_id) {
            return Ok(Some(event.clone()));
        }
        event.participants.retain(|entry| entry != user_id);
        let updated = event.clone();
        self.persist(&state)?;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn sample_event(id: &str) -> Event {
        Event::new(
            id.to_string(),
            "Pub Night".to_string(),
            None,
            "The Pub".to_string(),
            "2025-12-15T17:30:00Z".parse().unwrap(),
            "U_ALEX".to_string(),
        )
    }

    fn open_store(dir: &tempfile::TempDir) -> JsonEventStore {
        JsonEventStore::load(dir.path().join("events.json")).expect("open store")
    }

    #[tokio::test]
    async fn unit_insert_and_find_round_trip_all_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        let event = sample_event("monday");

        assert!(store.insert(&event).await.expect("insert"));
        let found = store.find_by_id("monday").await.expect("find");
        assert_eq!(found, Some(event));
        assert_eq!(store.find_by_id("friday").await.expect("find"), None);
    }

    #[tokio::test]
    async fn regression_insert_refuses_taken_id_without_overwriting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        assert!(store.insert(&sample_event("monday")).await.expect("insert"));

        let mut rival = sample_event("monday");
        rival.title = "Rival Night".to_string();
        rival.creator_id = "U_RIVAL".to_string();
        assert!(!store.insert(&rival).await.expect("insert rival"));

        let kept = store.find_by_id("monday").await.expect("find").unwrap();
        assert_eq!(kept.title, "Pub Night");
        assert_eq!(kept.creator_id, "U_ALEX");
    }

    #[tokio::test]
    async fn unit_store_state_survives_reload_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.json");
        {
            let store = JsonEventStore::load(path.clone()).expect("open");
            assert!(store.insert(&sample_event("monday")).await.expect("insert"));
        }
        let reopened = JsonEventStore::load(path).expect("reopen");
        let all = reopened.find_all().await.expect("find all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "monday");
    }

    #[tokio::test]
    async fn unit_delete_by_id_reports_missing_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        assert!(store.insert(&sample_event("monday")).await.expect("insert"));

        assert!(store.delete_by_id("monday").await.expect("delete"));
        assert!(!store.delete_by_id("monday").await.expect("delete again"));
        assert_eq!(store.find_by_id("monday").await.expect("find"), None);
    }

    #[tokio::test]
    async fn unit_add_participant_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        assert!(store.insert(&sample_event("monday")).await.expect("insert"));

        for _ in 0..3 {
            store
                .add_participant("monday", "U_SAM")
                .await
                .expect("add")
                .expect("exists");
        }
        let event = store.find_by_id("monday").await.expect("find").unwrap();
        assert_eq!(event.participants, vec!["U_ALEX", "U_SAM"]);
    }

    #[tokio::test]
    async fn unit_remove_absent_participant_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        assert!(store.insert(&sample_event("monday")).await.expect("insert"));

        let event = store
            .remove_participant("monday", "U_NOBODY")
            .await
            .expect("remove")
            .expect("exists");
        assert_eq!(event.participants, vec!["U_ALEX"]);
    }

    #[tokio::test]
    async fn unit_membership_updates_on_missing_id_return_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        assert_eq!(store.add_participant("ghost", "U_SAM").await.expect("add"), None);
        assert_eq!(
            store.remove_participant("ghost", "U_SAM").await.expect("remove"),
            None
        );
    }

    #[tokio::test]
    async fn functional_concurrent_joins_never_lose_updates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(open_store(&dir));
        assert!(store.insert(&sample_event("monday")).await.expect("insert"));

        let mut handles = Vec::new();
        for index in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .add_participant("monday", &format!("U_{index}"))
                    .await
                    .expect("add")
                    .expect("exists");
            }));
        }
        for handle in handles {
            handle.await.expect("join task");
        }

        let event = store.find_by_id("monday").await.expect("find").unwrap();
        assert_eq!(event.participants.len(), 9);
        for index in 0..8 {
            assert!(event.has_participant(&format!("U_{index}")));
        }
    }

    #[test]
    fn regression_load_rejects_unknown_schema_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.json");
        std::fs::write(&path, r#"{"schema_version": 99, "events": []}"#).expect("write");
        assert!(JsonEventStore::load(path).is_err());
    }
}
