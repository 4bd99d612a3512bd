//! Socket Mode bridge: connects to Slack, acks envelopes, and routes slash
//! commands and modal submissions to the event lifecycle.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use muster_events::EventLifecycle;
use muster_places::PlaceSuggester;

use crate::command::{dispatch_event_command, parse_event_command, EventCommand, Visibility};
use crate::forms::{create_event_modal, is_create_event_submission, parse_create_event_submission};
use crate::render::{
    render_event_announcement, render_event_announcement_blocks, DELETE_EVENT_ACTION_ID,
    JOIN_EVENT_ACTION_ID, LEAVE_EVENT_ACTION_ID,
};
use crate::slack_api_client::SlackApiClient;

#[derive(Clone)]
/// Runtime configuration for the Socket Mode transport loop.
pub struct SlackBridgeConfig {
    pub api_base: String,
    pub app_token: String,
    pub bot_token: String,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub reconnect_delay: Duration,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackSocketEnvelope {
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(rename = "type")]
    envelope_type: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct SlashCommandPayload {
    #[serde(default)]
    command: String,
    #[serde(default)]
    text: String,
    user_id: String,
    channel_id: String,
    #[serde(default)]
    trigger_id: Option<String>,
}

/// Runs the bridge until ctrl-c, reconnecting on socket failures.
pub async fn run_event_bridge(
    config: SlackBridgeConfig,
    lifecycle: EventLifecycle,
    places: Arc<dyn PlaceSuggester>,
) -> Result<()> {
    let slack_client = SlackApiClient::new(
        config.api_base.clone(),
        config.app_token.clone(),
        config.bot_token.clone(),
        config.request_timeout_ms,
        config.retry_max_attempts,
        config.retry_base_delay_ms,
    )?;
    let mut runtime = SlackBridgeRuntime {
        config,
        slack_client,
        lifecycle,
        places,
    };
    runtime.run().await
}

struct SlackBridgeRuntime {
    config: SlackBridgeConfig,
    slack_client: SlackApiClient,
    lifecycle: EventLifecycle,
    places: Arc<dyn PlaceSuggester>,
}

impl SlackBridgeRuntime {
    async fn run(&mut self) -> Result<()> {
        loop {
            let socket_url = match self.slack_client.open_socket_connection().await {
                Ok(url) => url,
                Err(error) => {
                    tracing::warn!(error = %error, "failed to open socket connection");
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("shutdown requested");
                            return Ok(());
                        }
                        _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                    }
                    continue;
                }
            };

            tracing::info!("socket connected");
            if let Err(error) = self.run_socket_session(&socket_url).await {
                tracing::warn!(error = %error, "socket session ended with error");
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }
    }

    async fn run_socket_session(&mut self, socket_url: &str) -> Result<()> {
        let (stream, _response) = connect_async(socket_url)
            .await
            .context("failed to connect slack socket mode websocket")?;
        let (mut sink, mut source) = stream.split();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    return Ok(());
                }
                maybe_message = source.next() => {
                    let Some(message_result) = maybe_message else {
                        return Ok(());
                    };
                    let message = message_result.context("failed reading slack websocket message")?;
                    let Some(envelope) = parse_socket_envelope(message)? else {
                        continue;
                    };
                    if envelope.envelope_type == "disconnect" {
                        tracing::info!("slack requested disconnect, reconnecting");
                        return Ok(());
                    }
                    let ack_payload = self.handle_envelope(&envelope).await;
                    if let Some(envelope_id) = envelope.envelope_id.as_deref() {
                        ack_envelope(&mut sink, envelope_id, ack_payload).await?;
                    }
                }
            }
        }
    }

    /// Returns the payload to attach to the envelope ack, if any.
    async fn handle_envelope(&mut self, envelope: &SlackSocketEnvelope) -> Option<Value> {
        match envelope.envelope_type.as_str() {
            "slash_commands" => match serde_json::from_value::<SlashCommandPayload>(
                envelope.payload.clone(),
            ) {
                Ok(payload) => Some(self.handle_slash_command(payload).await),
                Err(error) => {
                    tracing::warn!(error = %error, "failed to decode slash command payload");
                    None
                }
            },
            "interactive" => {
                match envelope.payload["type"].as_str() {
                    Some("view_submission") if is_create_event_submission(&envelope.payload) => {
                        self.handle_create_submission(&envelope.payload).await;
                    }
                    Some("block_actions") => {
                        self.handle_block_action(&envelope.payload).await;
                    }
                    _ => {}
                }
                // Empty ack closes the modal.
                None
            }
            "hello" => {
                tracing::debug!("received socket hello");
                None
            }
            other => {
                tracing::debug!(envelope_type = %other, "ignoring socket envelope");
                None
            }
        }
    }

    async fn handle_slash_command(&mut self, payload: SlashCommandPayload) -> Value {
        let command = parse_event_command(&payload.text);
        tracing::info!(
            command = %payload.command,
            text = %payload.text,
            user = %payload.user_id,
            channel = %payload.channel_id,
            "handling slash command"
        );

        if command == EventCommand::Create {
            self.open_create_dialog(&payload).await;
        }

        let response = dispatch_event_command(
            &self.lifecycle,
            self.places.as_ref(),
            &payload.user_id,
            command,
            Utc::now(),
        )
        .await;
        slash_ack_payload(&response.text, response.visibility)
    }

    async fn open_create_dialog(&self, payload: &SlashCommandPayload) {
        let Some(trigger_id) = payload.trigger_id.as_deref() else {
            tracing::warn!("slash command payload missing trigger_id, cannot open dialog");
            return;
        };
        let view = create_event_modal(&payload.channel_id);
        if let Err(error) = self.slack_client.views_open(trigger_id, &view).await {
            tracing::warn!(error = %error, "failed to open create dialog");
            let _ = self
                .slack_client
                .post_ephemeral(
                    &payload.channel_id,
                    &payload.user_id,
                    "Could not open the dialog, please try again.",
                )
                .await;
        }
    }

    /// Handles join/leave/delete buttons on an announcement. Confirmations
    /// post to the message's channel; rejections go back ephemerally.
    async fn handle_block_action(&mut self, payload: &Value) {
        let Some(user_id) = payload["user"]["id"].as_str() else {
            tracing::warn!("block action payload missing user id");
            return;
        };
        let Some(channel_id) = payload["container"]["channel_id"].as_str() else {
            tracing::warn!("block action payload missing channel id");
            return;
        };
        let action = &payload["actions"][0];
        let action_id = action["action_id"].as_str().unwrap_or_default();
        let Some(event_id) = action["value"].as_str().filter(|value| !value.is_empty()) else {
            tracing::warn!(action_id = %action_id, "block action carries no event id");
            return;
        };

        let command = match action_id {
            JOIN_EVENT_ACTION_ID => EventCommand::Join {
                event_id: event_id.to_string(),
            },
            LEAVE_EVENT_ACTION_ID => EventCommand::Leave {
                event_id: event_id.to_string(),
            },
            DELETE_EVENT_ACTION_ID => EventCommand::Delete {
                event_id: event_id.to_string(),
            },
            other => {
                tracing::debug!(action_id = %other, "ignoring unknown block action");
                return;
            }
        };

        let response = dispatch_event_command(
            &self.lifecycle,
            self.places.as_ref(),
            user_id,
            command,
            Utc::now(),
        )
        .await;
        let delivery = match response.visibility {
            Visibility::Public => self
                .slack_client
                .post_message(channel_id, &response.text, None)
                .await
                .map(|_| ()),
            Visibility::Private => {
                self.slack_client
                    .post_ephemeral(channel_id, user_id, &response.text)
                    .await
            }
        };
        if let Err(error) = delivery {
            tracing::warn!(error = %error, "failed to deliver block action response");
        }
    }

    async fn handle_create_submission(&mut self, payload: &Value) {
        let submission = match parse_create_event_submission(payload) {
            Ok(submission) => submission,
            Err(error) => {
                tracing::warn!(error = %error, "failed to parse create submission");
                return;
            }
        };
        let channel_id = submission.channel_id.clone();
        let creator_id = submission.draft.creator_id.clone();

        match self
            .lifecycle
            .create_event(submission.draft, Utc::now())
            .await
        {
            Ok(event) => {
                tracing::info!(event_id = %event.id, "created event from dialog");
                if let Err(error) = self
                    .slack_client
                    .post_message(
                        &channel_id,
                        &render_event_announcement(&event),
                        Some(&render_event_announcement_blocks(&event)),
                    )
                    .await
                {
                    tracing::warn!(error = %error, "failed to announce new event");
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "event creation from dialog failed");
                let text = match error {
                    muster_events::EventError::Validation(message) => message,
                    _ => "Could not create the event, please try again later.".to_string(),
                };
                let _ = self
                    .slack_client
                    .post_ephemeral(&channel_id, &creator_id, &text)
                    .await;
            }
        }
    }
}

fn slash_ack_payload(text: &str, visibility: Visibility) -> Value {
    json!({
        "response_type": visibility.response_type(),
        "text": text,
    })
}

async fn ack_envelope<S>(sink: &mut S, envelope_id: &str, payload: Option<Value>) -> Result<()>
where
    S: futures_util::Sink<WsMessage> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let mut ack = json!({ "envelope_id": envelope_id });
    if let Some(payload) = payload {
        ack["payload"] = payload;
    }
    sink.send(WsMessage::Text(ack.to_string().into()))
        .await
        .context("failed to send slack socket ack")
}

fn parse_socket_envelope(message: WsMessage) -> Result<Option<SlackSocketEnvelope>> {
    match message {
        WsMessage::Text(text) => {
            let envelope = serde_json::from_str::<SlackSocketEnvelope>(&text)
                .context("failed to parse slack socket envelope")?;
            Ok(Some(envelope))
        }
        WsMessage::Binary(bytes) => {
            let text =
                String::from_utf8(bytes.to_vec()).context("invalid utf-8 slack socket payload")?;
            let envelope = serde_json::from_str::<SlackSocketEnvelope>(&text)
                .context("failed to parse slack socket envelope")?;
            Ok(Some(envelope))
        }
        WsMessage::Ping(_) | WsMessage::Pong(_) => Ok(None),
        WsMessage::Close(_) => Ok(None),
        WsMessage::Frame(_) => Ok(None),
    }
}
