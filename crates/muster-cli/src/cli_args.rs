use std::path::PathBuf;

use clap::Parser;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "muster",
    about = "Slack bot that coordinates channel events: plan, join, and get reminded",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "MUSTER_SLACK_APP_TOKEN",
        help = "Slack app-level token (xapp-...) used to open the Socket Mode connection."
    )]
    pub app_token: String,

    #[arg(
        long,
        env = "MUSTER_SLACK_BOT_TOKEN",
        help = "Slack bot token (xoxb-...) used for Web API calls."
    )]
    pub bot_token: String,

    #[arg(
        long,
        env = "MUSTER_BROADCAST_CHANNEL",
        help = "Channel id that receives event announcements and daily reminders."
    )]
    pub broadcast_channel: String,

    #[arg(
        long,
        env = "MUSTER_STATE_PATH",
        default_value = "muster-events.json",
        help = "Path of the JSON file holding persisted events."
    )]
    pub state_path: PathBuf,

    #[arg(
        long,
        env = "MUSTER_PLACES_API_KEY",
        help = "Google Places API key backing `/event suggest`."
    )]
    pub places_api_key: String,

    #[arg(
        long,
        env = "MUSTER_PLACES_API_BASE",
        default_value = "https://places.googleapis.com/v1",
        help = "Base URL for the Places API."
    )]
    pub places_api_base: String,

    #[arg(
        long,
        env = "MUSTER_SLACK_API_BASE",
        default_value = "https://slack.com/api",
        help = "Base URL for the Slack Web API."
    )]
    pub slack_api_base: String,

    #[arg(
        long,
        env = "MUSTER_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Hard timeout for each outbound HTTP request in milliseconds."
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long,
        env = "MUSTER_RETRY_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = parse_positive_usize,
        help = "Maximum attempts per outbound HTTP request."
    )]
    pub retry_max_attempts: usize,

    #[arg(
        long,
        env = "MUSTER_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base backoff delay between retries in milliseconds."
    )]
    pub retry_base_delay_ms: u64,

    #[arg(
        long,
        env = "MUSTER_RECONNECT_DELAY_MS",
        default_value_t = 5_000,
        value_parser = parse_positive_u64,
        help = "Delay before reopening a dropped Socket Mode connection."
    )]
    pub reconnect_delay_ms: u64,

    #[arg(
        long,
        default_value_t = false,
        help = "Post the reminder for today's events and exit instead of running the bridge."
    )]
    pub run_daily_notification: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    fn base_args() -> Vec<&'static str> {
        vec![
            "muster",
            "--app-token",
            "xapp-1",
            "--bot-token",
            "xoxb-1",
            "--broadcast-channel",
            "C_GENERAL",
            "--places-api-key",
            "places-key",
        ]
    }

    #[test]
    fn unit_cli_defaults_cover_timeouts_and_state_path() {
        let cli = Cli::try_parse_from(base_args()).expect("parse");
        assert_eq!(cli.state_path.to_string_lossy(), "muster-events.json");
        assert_eq!(cli.request_timeout_ms, 30_000);
        assert_eq!(cli.retry_max_attempts, 3);
        assert_eq!(cli.reconnect_delay_ms, 5_000);
        assert!(!cli.run_daily_notification);
    }

    #[test]
    fn unit_cli_accepts_one_shot_notification_flag() {
        let mut args = base_args();
        args.push("--run-daily-notification");
        let cli = Cli::try_parse_from(args).expect("parse");
        assert!(cli.run_daily_notification);
    }

    #[test]
    fn unit_cli_rejects_zero_valued_tuning_knobs() {
        let mut args = base_args();
        args.extend(["--retry-max-attempts", "0"]);
        assert!(Cli::try_parse_from(args).is_err());
    }
}
