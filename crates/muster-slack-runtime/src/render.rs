//! Message rendering for command responses and channel announcements.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use muster_events::Event;
use muster_places::PlaceSuggestion;

pub const JOIN_EVENT_ACTION_ID: &str = "join_event";
pub const LEAVE_EVENT_ACTION_ID: &str = "leave_event";
pub const DELETE_EVENT_ACTION_ID: &str = "delete_event";

fn format_schedule(scheduled_at: DateTime<Utc>) -> String {
    scheduled_at.format("%A %Y-%m-%d at %H:%M UTC").to_string()
}

fn participant_mentions(event: &Event) -> String {
    event
        .participants
        .iter()
        .map(|user| format!("<@{user}>"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn event_summary_line(event: &Event) -> String {
    format!(
        "*{}* (`{}`) at {} on {} with {} going: {}",
        event.title,
        event.id,
        event.location,
        format_schedule(event.scheduled_at),
        event.participants.len(),
        participant_mentions(event)
    )
}

pub fn render_upcoming_list(events: &[Event]) -> String {
    let mut lines = vec!["Upcoming events:".to_string()];
    for event in events {
        lines.push(format!("- {}", event_summary_line(event)));
    }
    lines.push("Join one with `/event join <id>`.".to_string());
    lines.join("\n")
}

pub fn render_event_announcement(event: &Event) -> String {
    let mut lines = vec![format!(
        "<@{}> planned a new event: *{}*",
        event.creator_id, event.title
    )];
    if let Some(description) = &event.description {
        lines.push(description.clone());
    }
    lines.push(format!("Where: {}", event.location));
    lines.push(format!("When: {}", format_schedule(event.scheduled_at)));
    lines.push(format!("Join with `/event join {}`.", event.id));
    lines.join("\n")
}

/// Block Kit rendition of the announcement: the text as a section plus
/// join/leave/delete buttons carrying the event id.
pub fn render_event_announcement_blocks(event: &Event) -> Value {
    let button = |label: &str, action_id: &str, style: Option<&str>| {
        let mut element = json!({
            "type": "button",
            "text": {"type": "plain_text", "text": label},
            "action_id": action_id,
            "value": event.id,
        });
        if let Some(style) = style {
            element["style"] = json!(style);
        }
        element
    };
    json!([
        {
            "type": "section",
            "text": {"type": "mrkdwn", "text": render_event_announcement(event)}
        },
        {
            "type": "actions",
            "block_id": "event_actions",
            "elements": [
                button("Join", JOIN_EVENT_ACTION_ID, Some("primary")),
                button("Leave", LEAVE_EVENT_ACTION_ID, None),
                button("Delete", DELETE_EVENT_ACTION_ID, Some("danger")),
            ]
        }
    ])
}

pub fn render_join_confirmation(event: &Event, user_id: &str) -> String {
    format!(
        "<@{}> is going to *{}* ({} going).",
        user_id,
        event.title,
        event.participants.len()
    )
}

pub fn render_leave_confirmation(event: &Event, user_id: &str) -> String {
    format!(
        "<@{}> is no longer going to *{}* ({} going).",
        user_id,
        event.title,
        event.participants.len()
    )
}

pub fn render_delete_confirmation(event: &Event) -> String {
    format!("The event *{}* (`{}`) was cancelled.", event.title, event.id)
}

pub fn render_suggestions(area: &str, suggestions: &[PlaceSuggestion]) -> String {
    if suggestions.is_empty() {
        return format!("No places found around {area}.");
    }
    let mut lines = vec![format!("Places around {area}:")];
    for (index, suggestion) in suggestions.iter().enumerate() {
        lines.push(format!(
            "{}. {} - {}",
            index + 1,
            suggestion.name,
            suggestion.address
        ));
    }
    lines.join("\n")
}

pub fn render_daily_notification(events: &[Event]) -> String {
    let mut lines = vec!["Reminder: events happening today!".to_string()];
    for event in events {
        lines.push(format!(
            "- *{}* at {} on {} ({} going: {})",
            event.title,
            event.location,
            format_schedule(event.scheduled_at),
            event.participants.len(),
            participant_mentions(event)
        ));
    }
    lines.join("\n")
}
