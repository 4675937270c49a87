use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::mailer::Mailer;

const ALERT_SUBJECT: &str = "Campus API Secret Expiry Alert";

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime of the access token, in seconds.
    expires_in: i64,
    /// Absolute epoch seconds at which the client secret itself expires.
    secret_valid_until: i64,
}

/// Secret-expiry windows, tightest first. Exactly one applies per check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpiryWindow {
    Expired,
    WithinHour,
    WithinDay,
    WithinWeek,
}

impl ExpiryWindow {
    fn label(self) -> &'static str {
        match self {
            ExpiryWindow::Expired => "expired",
            ExpiryWindow::WithinHour => "1 hour",
            ExpiryWindow::WithinDay => "1 day",
            ExpiryWindow::WithinWeek => "1 week",
        }
    }
}

/// Pick the tightest window containing `valid_until`, if any.
fn expiry_window(now: DateTime<Utc>, valid_until: DateTime<Utc>) -> Option<ExpiryWindow> {
    if now > valid_until {
        Some(ExpiryWindow::Expired)
    } else if now + Duration::hours(1) > valid_until {
        Some(ExpiryWindow::WithinHour)
    } else if now + Duration::days(1) > valid_until {
        Some(ExpiryWindow::WithinDay)
    } else if now + Duration::weeks(1) > valid_until {
        Some(ExpiryWindow::WithinWeek)
    } else {
        None
    }
}

/// Owns the OAuth client-credentials token lifecycle.
///
/// The access token is short-lived and refreshed on demand; the client
/// secret is long-lived with its own expiry, which is alerting-only and
/// never blocks operation.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    mailer: Mailer,
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    secret_valid_until: Option<DateTime<Utc>>,
}

impl TokenManager {
    pub fn new(config: &MonitorConfig, http: reqwest::Client, mailer: Mailer) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            mailer,
            access_token: None,
            expires_at: None,
            secret_valid_until: None,
        }
    }

    /// Return an access token that is valid right now, refreshing first when
    /// the stored one is absent or past its expiry instant.
    pub async fn get_valid_token(&mut self) -> Result<&str, MonitorError> {
        let now = Utc::now();

        self.check_secret_expiry(now).await;

        if self.needs_refresh(now) {
            self.refresh_token(now).await?;
        }

        self.access_token
            .as_deref()
            .ok_or_else(|| MonitorError::Auth("no access token after refresh".to_string()))
    }

    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => now >= expires_at,
            _ => true,
        }
    }

    async fn refresh_token(&mut self, now: DateTime<Utc>) -> Result<(), MonitorError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&TokenRequest {
                grant_type: "client_credentials",
                client_id: &self.client_id,
                client_secret: &self.client_secret,
            })
            .send()
            .await
            .map_err(|err| {
                tracing::error!("failed to refresh token: {err}");
                MonitorError::from(err)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("token endpoint returned {status}: {body}");
            return Err(MonitorError::Auth(format!(
                "token endpoint returned {status}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| MonitorError::Parse(format!("malformed token response: {err}")))?;

        let secret_valid_until = DateTime::<Utc>::from_timestamp(token.secret_valid_until, 0)
            .ok_or_else(|| {
                MonitorError::Parse(format!(
                    "secret_valid_until out of range: {}",
                    token.secret_valid_until
                ))
            })?;
        let expires_at = now + Duration::seconds(token.expires_in);

        self.access_token = Some(token.access_token);
        self.expires_at = Some(expires_at);
        self.secret_valid_until = Some(secret_valid_until);

        tracing::info!(
            "access token refreshed (expires at {expires_at}, secret valid until {secret_valid_until})"
        );

        Ok(())
    }

    /// Evaluated on every call, not just on refresh. The tightest matching
    /// window alerts; an already-expired secret only logs, since only
    /// upcoming-expiry windows email. Alerts are not de-duplicated across
    /// checks.
    async fn check_secret_expiry(&self, now: DateTime<Utc>) {
        let Some(valid_until) = self.secret_valid_until else {
            tracing::info!("first token generation");
            return;
        };

        match expiry_window(now, valid_until) {
            Some(ExpiryWindow::Expired) => {
                tracing::warn!("API client secret has expired ({valid_until})");
            }
            Some(window) => {
                tracing::warn!(
                    "API client secret expires within {} ({valid_until})",
                    window.label()
                );
                self.mailer
                    .send(
                        ALERT_SUBJECT,
                        &format!(
                            "The campus API client secret will expire within {} ({valid_until}).",
                            window.label()
                        ),
                    )
                    .await;
            }
            None => {}
        }
    }
}
