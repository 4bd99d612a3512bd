use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A scheduled gathering: the sole persistent entity.
///
/// `creator_id` is immutable after creation and starts out as the only
/// participant. `participants` carries set semantics; the store enforces
/// duplicate-free membership. Past events stay valid until explicitly
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub scheduled_at: DateTime<Utc>,
    pub creator_id: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Event {
    pub fn new(
        id: String,
        title: String,
        description: Option<String>,
        location: String,
        scheduled_at: DateTime<Utc>,
        creator_id: String,
    ) -> Self {
        let participants = vec![creator_id.clone()];
        Self {
            id,
            title,
            description,
            location,
            scheduled_at,
            creator_id,
            participants,
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|entry| entry == user_id)
    }

    /// Lowercase weekday name of the scheduled day, e.g. `"monday"`.
    pub fn weekday_slug(&self) -> &'static str {
        weekday_slug(self.scheduled_at.weekday())
    }
}

pub fn weekday_slug(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Derives a stable id from the scheduled weekday, the way events are
/// referenced in chat (`/event join monday`). Falls back to weekday-plus-date
/// and then a numeric suffix when the shorter forms are taken.
pub fn derive_event_id(scheduled_at: DateTime<Utc>, taken: &HashSet<String>) -> String {
    let slug = weekday_slug(scheduled_at.weekday());
    if !taken.contains(slug) {
        return slug.to_string();
    }
    let dated = format!("{}-{}", slug, scheduled_at.date_naive());
    if !taken.contains(&dated) {
        return dated;
    }
    let mut counter = 2_u32;
    loop {
        let candidate = format!("{dated}-{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
