//! Muster entrypoint: wires config, storage, and the Slack bridge.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use muster_events::{EventLifecycle, JsonEventStore};
use muster_places::GooglePlacesClient;
use muster_slack_runtime::{
    run_daily_notification, run_event_bridge, SlackApiClient, SlackBridgeConfig,
};

mod cli_args;

use cli_args::Cli;

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let store = JsonEventStore::load(cli.state_path.clone())
        .with_context(|| format!("failed to open event store {}", cli.state_path.display()))?;
    let lifecycle = EventLifecycle::new(Arc::new(store));

    if cli.run_daily_notification {
        let slack_client = SlackApiClient::new(
            cli.slack_api_base.clone(),
            cli.app_token.clone(),
            cli.bot_token.clone(),
            cli.request_timeout_ms,
            cli.retry_max_attempts,
            cli.retry_base_delay_ms,
        )?;
        let posted = run_daily_notification(
            &lifecycle,
            &slack_client,
            &cli.broadcast_channel,
            Utc::now(),
        )
        .await?;
        if posted.is_none() {
            println!("no events due today");
        }
        return Ok(());
    }

    let places = GooglePlacesClient::new(
        cli.places_api_base.clone(),
        cli.places_api_key.clone(),
        cli.request_timeout_ms,
        cli.retry_max_attempts,
        cli.retry_base_delay_ms,
    )
    .context("failed to create places client")?;

    let config = SlackBridgeConfig {
        api_base: cli.slack_api_base,
        app_token: cli.app_token,
        bot_token: cli.bot_token,
        request_timeout_ms: cli.request_timeout_ms,
        retry_max_attempts: cli.retry_max_attempts,
        retry_base_delay_ms: cli.retry_base_delay_ms,
        reconnect_delay: Duration::from_millis(cli.reconnect_delay_ms),
    };

    run_event_bridge(config, lifecycle, Arc::new(places)).await
}
