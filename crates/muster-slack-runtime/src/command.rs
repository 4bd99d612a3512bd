//! `/event` command parsing and dispatch.
//!
//! Parsing is infallible: unknown or malformed input becomes
//! `EventCommand::Invalid` carrying the usage text, so the bridge always has
//! a response to ack with.

use chrono::{DateTime, Utc};

use muster_events::{EventError, EventLifecycle};
use muster_places::PlaceSuggester;

use crate::render::{
    render_delete_confirmation, render_join_confirmation, render_leave_confirmation,
    render_suggestions, render_upcoming_list,
};

pub const EVENT_COMMAND_USAGE: &str = concat!(
    "Usage:\n",
    "- `/event list` show upcoming events\n",
    "- `/event create` plan a new event\n",
    "- `/event suggest <area>` suggest places around an area\n",
    "- `/event join <id>` join an event\n",
    "- `/event leave <id>` leave an event\n",
    "- `/event delete <id>` cancel an event you created",
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventCommand {
    List,
    Create,
    Suggest { area: String },
    Join { event_id: String },
    Leave { event_id: String },
    Delete { event_id: String },
    Invalid { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Ephemeral, visible only to the invoking user.
    Private,
    /// Posted to the channel for everyone.
    Public,
}

impl Visibility {
    pub fn response_type(self) -> &'static str {
        match self {
            Self::Private => "ephemeral",
            Self::Public => "in_channel",
        }
    }
}

/// What the invoker (and possibly the channel) should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: String,
    pub visibility: Visibility,
}

impl CommandResponse {
    pub fn private(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visibility: Visibility::Private,
        }
    }

    pub fn public(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visibility: Visibility::Public,
        }
    }
}

pub fn parse_event_command(text: &str) -> EventCommand {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return EventCommand::Invalid {
            message: EVENT_COMMAND_USAGE.to_string(),
        };
    }
    let mut parts = trimmed.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
    let rest = parts.collect::<Vec<_>>().join(" ");

    match verb.as_str() {
        "list" => EventCommand::List,
        "create" => EventCommand::Create,
        "suggest" => {
            if rest.is_empty() {
                EventCommand::Invalid {
                    message: "Tell me where to look, e.g. `/event suggest city centre`."
                        .to_string(),
                }
            } else {
                EventCommand::Suggest { area: rest }
            }
        }
        "join" | "leave" | "delete" => {
            let Some(event_id) = single_event_id(&rest) else {
                return EventCommand::Invalid {
                    message: format!("`/event {verb}` needs exactly one event id."),
                };
            };
            match verb.as_str() {
                "join" => EventCommand::Join { event_id },
                "leave" => EventCommand::Leave { event_id },
                _ => EventCommand::Delete { event_id },
            }
        }
        _ => EventCommand::Invalid {
            message: EVENT_COMMAND_USAGE.to_string(),
        },
    }
}

fn single_event_id(rest: &str) -> Option<String> {
    let mut parts = rest.split_whitespace();
    let id = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(id.to_string())
}

/// Runs one parsed command against the lifecycle and place suggester. Errors
/// never escape: each maps to a private response, with upstream details kept
/// in the log rather than the channel.
pub async fn dispatch_event_command(
    lifecycle: &EventLifecycle,
    places: &dyn PlaceSuggester,
    user_id: &str,
    command: EventCommand,
    now: DateTime<Utc>,
) -> CommandResponse {
    match command {
        EventCommand::List => match lifecycle.list_upcoming(now).await {
            Ok(events) if events.is_empty() => {
                CommandResponse::private("There is no upcoming event planned.")
            }
            Ok(events) => CommandResponse::public(render_upcoming_list(&events)),
            Err(error) => error_response(error),
        },
        EventCommand::Create => {
            CommandResponse::private("Please follow the instructions in the dialog!")
        }
        EventCommand::Suggest { area } => match places.suggest(&area).await {
            Ok(suggestions) => CommandResponse::private(render_suggestions(&area, &suggestions)),
            Err(error) => {
                tracing::warn!(error = %error, "place suggestion lookup failed");
                CommandResponse::private(
                    "Could not look up places right now, please try again later.",
                )
            }
        },
        EventCommand::Join { event_id } => match lifecycle.join_event(&event_id, user_id).await {
            Ok(event) => CommandResponse::public(render_join_confirmation(&event, user_id)),
            Err(error) => error_response(error),
        },
        EventCommand::Leave { event_id } => match lifecycle.leave_event(&event_id, user_id).await
        {
            Ok(event) => CommandResponse::public(render_leave_confirmation(&event, user_id)),
            Err(error) => error_response(error),
        },
        EventCommand::Delete { event_id } => {
            match lifecycle.delete_event(&event_id, user_id).await {
                Ok(event) => CommandResponse::public(render_delete_confirmation(&event)),
                Err(error) => error_response(error),
            }
        }
        EventCommand::Invalid { message } => CommandResponse::private(message),
    }
}

fn error_response(error: EventError) -> CommandResponse {
    match error {
        EventError::Validation(message) => CommandResponse::private(message),
        EventError::NotFound => {
            CommandResponse::private("There is no event with that id. Try `/event list`.")
        }
        EventError::Permission => {
            CommandResponse::private("Only the creator can delete this event.")
        }
        EventError::Upstream(details) => {
            tracing::warn!(error = %details, "event store call failed");
            CommandResponse::private("Something went wrong, please try again later.")
        }
    }
}
