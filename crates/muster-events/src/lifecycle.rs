//! Event lifecycle manager: owns entity invariants for creation, membership,
//! deletion authorization, and due-today selection.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, NaiveTime, Utc};

use muster_core::{day_bounds, parse_human_date};

use crate::{
    error::EventError,
    event::{derive_event_id, Event},
    store::EventStore,
};

/// Validated-but-unparsed field set for a new event, as submitted through
/// the creation form. `date` accepts `YYYY-MM-DD` or a human phrase
/// (`tomorrow`, `next friday`); `time` is `HH:MM`.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub creator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub date: String,
    pub time: String,
}

/// Stateless coordinator over the event store. Every operation performs at
/// most one store round trip; membership mutations rely on the store's
/// per-document atomicity rather than any lock held here.
#[derive(Clone)]
pub struct EventLifecycle {
    store: Arc<dyn EventStore>,
}

impl EventLifecycle {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn create_event(
        &self,
        draft: EventDraft,
        now: DateTime<Utc>,
    ) -> Result<Event, EventError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(EventError::Validation(
                "event title must not be empty".to_string(),
            ));
        }
        let date = parse_human_date(&draft.date, now.date_naive()).ok_or_else(|| {
            EventError::Validation(format!("could not understand the date `{}`", draft.date))
        })?;
        let time = NaiveTime::parse_from_str(draft.time.trim(), "%H:%M").map_err(|_| {
            EventError::Validation(format!(
                "could not understand the time `{}` (expected HH:MM)",
                draft.time
            ))
        })?;
        let scheduled_at = date.and_time(time).and_utc();

        let description = draft
            .description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned);
        let mut taken = self
            .store
            .find_all()
            .await?
            .into_iter()
            .map(|event| event.id)
            .collect::<HashSet<_>>();

        // Insert-if-absent, re-deriving on a lost id race.
        loop {
            let id = derive_event_id(scheduled_at, &taken);
            let event = Event::new(
                id.clone(),
                title.to_string(),
                description.clone(),
                draft.location.trim().to_string(),
                scheduled_at,
                draft.creator_id.clone(),
            );
            if self.store.insert(&event).await? {
                return Ok(event);
            }
            taken.insert(id);
        }
    }

    /// Events with `scheduled_at >= now`, ascending. Past events are kept in
    /// the store but excluded here.
    pub async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventError> {
        let mut events = self
            .store
            .find_all()
            .await?
            .into_iter()
            .filter(|event| event.scheduled_at >= now)
            .collect::<Vec<_>>();
        events.sort_by_key(|event| event.scheduled_at);
        Ok(events)
    }

    /// Idempotent: joining an event twice leaves one membership entry.
    pub async fn join_event(&self, event_id: &str, user_id: &str) -> Result<Event, EventError> {
        self.store
            .add_participant(event_id, user_id)
            .await?
            .ok_or(EventError::NotFound)
    }

    /// Idempotent: leaving an event the user is not part of changes nothing.
    /// The creator may leave; the event and its `creator_id` are unchanged.
    pub async fn leave_event(&self, event_id: &str, user_id: &str) -> Result<Event, EventError> {
        self.store
            .remove_participant(event_id, user_id)
            .await?
            .ok_or(EventError::NotFound)
    }

    /// Removes the event permanently; only the creator is authorized. The
    /// permission check never mutates the store.
    pub async fn delete_event(
        &self,
        event_id: &str,
        requester_id: &str,
    ) -> Result<Event, EventError> {
        let event = self
            .store
            .find_by_id(event_id)
            .await?
            .ok_or(EventError::NotFound)?;
        if event.creator_id != requester_id {
            return Err(EventError::Permission);
        }
        if !self.store.delete_by_id(event_id).await? {
            // Lost a race with another delete.
            return Err(EventError::NotFound);
        }
        Ok(event)
    }

    /// Events whose `scheduled_at` falls on the calendar day of `now`,
    /// ascending. Pure read used by the daily notification pass.
    pub async fn events_due_today(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventError> {
        let (start, end) = day_bounds(now);
        let mut events = self
            .store
            .find_all()
            .await?
            .into_iter()
            .filter(|event| event.scheduled_at >= start && event.scheduled_at < end)
            .collect::<Vec<_>>();
        events.sort_by_key(|event| event.scheduled_at);
        Ok(events)
    }
}
