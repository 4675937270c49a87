use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MonitorError;

const DEFAULT_TOKEN_URL: &str = "https://api.intra.42.fr/oauth/token";
const DEFAULT_EVENTS_URL: &str = "https://api.intra.42.fr/v2/campus/1/events/";

/// All process configuration, read once at startup and passed by reference
/// to each component constructor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub token_url: String,
    pub events_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub poll_interval: Duration,
    pub snapshot_path: PathBuf,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub recipients: Vec<String>,
    /// Base URL for the per-event link in digest emails. No link line is
    /// rendered when unset.
    pub event_link_base: Option<String>,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, MonitorError> {
        Ok(Self {
            token_url: env::var("TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            events_url: env::var("EVENTS_URL").unwrap_or_else(|_| DEFAULT_EVENTS_URL.to_string()),
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            poll_interval: Duration::from_secs(parse_or("POLL_INTERVAL_SECONDS", 10)?),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("last_result.json")),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: parse_or("SMTP_PORT", 587)?,
            smtp_user: required("SMTP_USER")?,
            smtp_pass: required("SMTP_PASS")?,
            recipients: split_recipients(&required("RECIPIENT_EMAILS")?)?,
            event_link_base: env::var("EVENT_LINK_BASE").ok(),
        })
    }
}

fn required(name: &str) -> Result<String, MonitorError> {
    env::var(name).map_err(|_| MonitorError::Config(format!("{name} must be set")))
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T, MonitorError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| MonitorError::Config(format!("{name} must be a valid number"))),
        Err(_) => Ok(default),
    }
}

fn split_recipients(raw: &str) -> Result<Vec<String>, MonitorError> {
    let recipients: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect();

    if recipients.is_empty() {
        return Err(MonitorError::Config(
            "RECIPIENT_EMAILS must contain at least one address".to_string(),
        ));
    }

    Ok(recipients)
}

#[cfg(test)]
impl MonitorConfig {
    pub fn for_tests() -> Self {
        Self {
            token_url: "https://id.example.com/oauth/token".to_string(),
            events_url: "https://api.example.com/events/".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            poll_interval: Duration::from_secs(10),
            snapshot_path: PathBuf::from("last_result.json"),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_user: "monitor@example.com".to_string(),
            smtp_pass: "password".to_string(),
            recipients: vec!["staff@example.com".to_string()],
            event_link_base: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_recipient_list() {
        let recipients = split_recipients("a@example.com, b@example.com ,c@example.com").unwrap();
        assert_eq!(
            recipients,
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
    }

    #[test]
    fn rejects_empty_recipient_list() {
        assert!(matches!(
            split_recipients(" , "),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn missing_required_var_is_a_config_error() {
        assert!(matches!(
            required("CAMPUS_MONITOR_TEST_UNSET_VAR"),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn parse_or_falls_back_to_default() {
        let value: u64 = parse_or("CAMPUS_MONITOR_TEST_UNSET_INTERVAL", 10).unwrap();
        assert_eq!(value, 10);
    }

    #[test]
    fn parse_or_rejects_garbage() {
        env::set_var("CAMPUS_MONITOR_TEST_BAD_PORT", "not-a-number");
        let result: Result<u16, _> = parse_or("CAMPUS_MONITOR_TEST_BAD_PORT", 587);
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn from_env_reads_required_values_and_defaults() {
        env::set_var("CLIENT_ID", "id");
        env::set_var("CLIENT_SECRET", "secret");
        env::set_var("SMTP_USER", "sender@example.com");
        env::set_var("SMTP_PASS", "app-password");
        env::set_var("RECIPIENT_EMAILS", "one@example.com,two@example.com");

        let config = MonitorConfig::from_env().unwrap();
        assert_eq!(config.client_id, "id");
        assert_eq!(config.recipients.len(), 2);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.snapshot_path, PathBuf::from("last_result.json"));
        assert!(config.event_link_base.is_none());
    }
}
