use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// A campus event as returned by the events API.
///
/// Identity is the integer id, which the API assigns in increasing order of
/// publication. Events are immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub kind: String,
    pub begin_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// `None` means unlimited participants.
    pub max_people: Option<u32>,
    pub description: Option<String>,
}

/// Client for the remote events endpoint.
pub struct EventsClient {
    http: reqwest::Client,
    endpoint: String,
}

impl EventsClient {
    pub fn new(http: reqwest::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }

    /// Fetch the current event list, newest id first.
    pub async fn fetch_latest(&self, token: &str) -> Result<Vec<Event>, MonitorError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("sort", "-id")])
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let events = response.json::<Vec<Event>>().await?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn event_round_trips_through_the_wire_shape() {
        let raw = r#"{
            "id": 107,
            "name": "Rust workshop",
            "location": "Cluster 1",
            "kind": "pedago_meetup",
            "begin_at": "2026-03-01T18:00:00.000Z",
            "end_at": "2026-03-01T20:00:00.000Z",
            "max_people": null,
            "description": "Hands-on introduction."
        }"#;

        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.id, 107);
        assert_eq!(event.max_people, None);
        assert_eq!(
            event.begin_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
        );
    }

    #[test]
    fn null_optional_fields_deserialize_to_none() {
        let raw = r#"{
            "id": 5,
            "name": "Exam",
            "location": null,
            "kind": "exam",
            "begin_at": "2026-03-02T09:00:00Z",
            "end_at": "2026-03-02T12:00:00Z",
            "max_people": 120,
            "description": null
        }"#;

        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.location, None);
        assert_eq!(event.description, None);
        assert_eq!(event.max_people, Some(120));
    }
}
