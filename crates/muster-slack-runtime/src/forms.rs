//! Block Kit form for interactive event creation.
//!
//! The `/event create` command opens this modal; the matching
//! `view_submission` payload is turned back into an [`EventDraft`].

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use muster_events::EventDraft;

pub const CREATE_EVENT_CALLBACK_ID: &str = "muster_create_event";

/// Modal definition for `views.open`. `channel_id` rides along in
/// `private_metadata` so the submission handler knows where to announce.
pub fn create_event_modal(channel_id: &str) -> Value {
    json!({
        "type": "modal",
        "callback_id": CREATE_EVENT_CALLBACK_ID,
        "private_metadata": channel_id,
        "title": {"type": "plain_text", "text": "Plan an event"},
        "submit": {"type": "plain_text", "text": "Create"},
        "close": {"type": "plain_text", "text": "Cancel"},
        "blocks": [
            {
                "type": "input",
                "block_id": "title_block",
                "label": {"type": "plain_text", "text": "Title"},
                "element": {
                    "type": "plain_text_input",
                    "action_id": "title",
                    "placeholder": {"type": "plain_text", "text": "Pub night"}
                }
            },
            {
                "type": "input",
                "block_id": "location_block",
                "label": {"type": "plain_text", "text": "Location"},
                "element": {
                    "type": "plain_text_input",
                    "action_id": "location",
                    "placeholder": {"type": "plain_text", "text": "The Crown, 12 High St"}
                }
            },
            {
                "type": "input",
                "block_id": "date_block",
                "label": {"type": "plain_text", "text": "Date"},
                "element": {"type": "datepicker", "action_id": "date"}
            },
            {
                "type": "input",
                "block_id": "time_block",
                "label": {"type": "plain_text", "text": "Time"},
                "element": {"type": "timepicker", "action_id": "time"}
            },
            {
                "type": "input",
                "block_id": "description_block",
                "optional": true,
                "label": {"type": "plain_text", "text": "Description"},
                "element": {
                    "type": "plain_text_input",
                    "action_id": "description",
                    "multiline": true
                }
            }
        ]
    })
}

/// Channel and draft recovered from a `view_submission` payload.
#[derive(Debug, Clone)]
pub struct CreateEventSubmission {
    pub channel_id: String,
    pub draft: EventDraft,
}

pub fn is_create_event_submission(payload: &Value) -> bool {
    payload["view"]["callback_id"].as_str() == Some(CREATE_EVENT_CALLBACK_ID)
}

pub fn parse_create_event_submission(payload: &Value) -> Result<CreateEventSubmission> {
    let user_id = payload["user"]["id"]
        .as_str()
        .ok_or_else(|| anyhow!("view submission missing user id"))?;
    let view = &payload["view"];
    let channel_id = view["private_metadata"]
        .as_str()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("view submission missing channel metadata"))?;
    let values = &view["state"]["values"];

    let field = |block: &str, action: &str, key: &str| -> Option<String> {
        values[block][action][key]
            .as_str()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
    };

    let title = field("title_block", "title", "value")
        .ok_or_else(|| anyhow!("view submission missing title"))?;
    let location = field("location_block", "location", "value")
        .ok_or_else(|| anyhow!("view submission missing location"))?;
    let date = field("date_block", "date", "selected_date")
        .ok_or_else(|| anyhow!("view submission missing date"))?;
    let time = field("time_block", "time", "selected_time")
        .ok_or_else(|| anyhow!("view submission missing time"))?;
    let description = field("description_block", "description", "value");

    Ok(CreateEventSubmission {
        channel_id: channel_id.to_string(),
        draft: EventDraft {
            creator_id: user_id.to_string(),
            title,
            description,
            location,
            date,
            time,
        },
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn submission_payload() -> serde_json::Value {
        json!({
            "type": "view_submission",
            "user": {"id": "U_CREATOR"},
            "view": {
                "callback_id": CREATE_EVENT_CALLBACK_ID,
                "private_metadata": "C_GENERAL",
                "state": {
                    "values": {
                        "title_block": {"title": {"value": "  Pub Night "}},
                        "location_block": {"location": {"value": "The Crown"}},
                        "date_block": {"date": {"selected_date": "2025-12-15"}},
                        "time_block": {"time": {"selected_time": "18:00"}},
                        "description_block": {"description": {"value": "Monthly meetup"}}
                    }
                }
            }
        })
    }

    #[test]
    fn unit_create_event_modal_carries_channel_in_private_metadata() {
        let view = create_event_modal("C_GENERAL");
        assert_eq!(view["callback_id"], CREATE_EVENT_CALLBACK_ID);
        assert_eq!(view["private_metadata"], "C_GENERAL");
        assert_eq!(view["blocks"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn unit_parse_submission_extracts_trimmed_draft() {
        let parsed = parse_create_event_submission(&submission_payload()).expect("parse");
        assert_eq!(parsed.channel_id, "C_GENERAL");
        assert_eq!(parsed.draft.creator_id, "U_CREATOR");
        assert_eq!(parsed.draft.title, "Pub Night");
        assert_eq!(parsed.draft.location, "The Crown");
        assert_eq!(parsed.draft.date, "2025-12-15");
        assert_eq!(parsed.draft.time, "18:00");
        assert_eq!(parsed.draft.description.as_deref(), Some("Monthly meetup"));
    }

    #[test]
    fn unit_parse_submission_treats_blank_description_as_none() {
        let mut payload = submission_payload();
        payload["view"]["state"]["values"]["description_block"]["description"]["value"] =
            json!("   ");
        let parsed = parse_create_event_submission(&payload).expect("parse");
        assert!(parsed.draft.description.is_none());
    }

    #[test]
    fn regression_parse_submission_rejects_missing_required_fields() {
        let mut payload = submission_payload();
        payload["view"]["state"]["values"]["date_block"] = json!({});
        let error = parse_create_event_submission(&payload).unwrap_err();
        assert!(error.to_string().contains("missing date"));
    }

    #[test]
    fn unit_is_create_event_submission_matches_callback_id_only() {
        assert!(is_create_event_submission(&submission_payload()));
        let other = json!({"view": {"callback_id": "something_else"}});
        assert!(!is_create_event_submission(&other));
    }
}
