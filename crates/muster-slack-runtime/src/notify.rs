//! Daily notification pass: post one reminder covering everything happening
//! on the current calendar day, or nothing at all.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use muster_events::EventLifecycle;

use crate::render::render_daily_notification;
use crate::slack_api_client::SlackApiClient;

/// Returns the posted message text, or `None` when no event is due today.
/// Reads only; a failed post leaves the store untouched so the pass can be
/// rerun safely.
pub async fn run_daily_notification(
    lifecycle: &EventLifecycle,
    client: &SlackApiClient,
    channel: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let due = lifecycle
        .events_due_today(now)
        .await
        .context("failed to load events due today")?;
    if due.is_empty() {
        tracing::info!("no events due today, skipping notification");
        return Ok(None);
    }

    let text = render_daily_notification(&due);
    let posted = client
        .post_message(channel, &text, None)
        .await
        .context("failed to post daily notification")?;
    tracing::info!(
        channel = %posted.channel,
        ts = %posted.ts,
        events = due.len(),
        "posted daily notification"
    );
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::tempdir;

    use muster_events::{EventDraft, JsonEventStore};

    use super::*;

    fn test_client(base_url: &str) -> SlackApiClient {
        SlackApiClient::new(
            base_url.to_string(),
            "xapp-test".to_string(),
            "xoxb-test".to_string(),
            2_000,
            1,
            1,
        )
        .expect("client")
    }

    async fn lifecycle_with_event(
        dir: &tempfile::TempDir,
        date: &str,
    ) -> EventLifecycle {
        let store = JsonEventStore::load(dir.path().join("events.json")).expect("store");
        let lifecycle = EventLifecycle::new(Arc::new(store));
        lifecycle
            .create_event(
                EventDraft {
                    creator_id: "U_CREATOR".to_string(),
                    title: "Pub Night".to_string(),
                    description: None,
                    location: "The Crown".to_string(),
                    date: date.to_string(),
                    time: "18:00".to_string(),
                },
                Utc.with_ymd_and_hms(2025, 12, 12, 8, 0, 0).unwrap(),
            )
            .await
            .expect("create event");
        lifecycle
    }

    #[tokio::test]
    async fn integration_notification_posts_when_an_event_is_due() {
        let dir = tempdir().expect("tempdir");
        let lifecycle = lifecycle_with_event(&dir, "2025-12-15").await;

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .body_includes("happening today");
            then.status(200)
                .json_body(json!({"ok": true, "channel": "C1", "ts": "1.2"}));
        });

        let posted = run_daily_notification(
            &lifecycle,
            &test_client(&server.base_url()),
            "C1",
            Utc.with_ymd_and_hms(2025, 12, 15, 7, 0, 0).unwrap(),
        )
        .await
        .expect("notification");

        mock.assert();
        let text = posted.expect("text");
        assert!(text.contains("Pub Night"));
        assert!(text.contains("<@U_CREATOR>"));
    }

    #[tokio::test]
    async fn unit_notification_is_skipped_when_nothing_is_due() {
        let dir = tempdir().expect("tempdir");
        let lifecycle = lifecycle_with_event(&dir, "2025-12-15").await;

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/chat.postMessage");
            then.status(200).json_body(json!({"ok": true, "ts": "1"}));
        });

        let posted = run_daily_notification(
            &lifecycle,
            &test_client(&server.base_url()),
            "C1",
            Utc.with_ymd_and_hms(2025, 12, 14, 7, 0, 0).unwrap(),
        )
        .await
        .expect("notification");

        assert!(posted.is_none());
        assert_eq!(mock.calls(), 0);
    }
}
