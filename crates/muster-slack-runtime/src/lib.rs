//! Slack Socket Mode runtime for Muster.
//!
//! Wires the `/event` slash command, the event-creation modal, and the daily
//! notification pass to the event lifecycle and place suggester. Command
//! responses are delivered through the envelope ack so the invoker always
//! gets an answer, while announcements go through `chat.postMessage`.

mod bridge;
mod command;
mod forms;
mod notify;
mod render;
mod slack_api_client;
mod slack_helpers;

pub use bridge::{run_event_bridge, SlackBridgeConfig};
pub use command::{
    dispatch_event_command, parse_event_command, CommandResponse, EventCommand, Visibility,
    EVENT_COMMAND_USAGE,
};
pub use forms::{create_event_modal, parse_create_event_submission, CREATE_EVENT_CALLBACK_ID};
pub use notify::run_daily_notification;
pub use slack_api_client::{SlackApiClient, SlackPostedMessage};
