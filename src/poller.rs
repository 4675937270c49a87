use crate::digest;
use crate::error::MonitorError;
use crate::events::{Event, EventsClient};
use crate::mailer::Mailer;
use crate::snapshot::SnapshotStore;
use crate::token::TokenManager;

/// What a poll cycle decided to do with a fresh fetch.
#[derive(Debug, PartialEq)]
enum PollAction {
    /// No prior baseline (or an empty one): persist silently.
    EstablishBaseline,
    /// Nothing new, or the fetch was empty and therefore inconclusive.
    NoChange,
    /// Head id changed: persist and notify with the delta.
    Notify(Vec<Event>),
}

/// Compare a fresh fetch against the stored baseline.
fn detect(current: &[Event], last: Option<&[Event]>) -> PollAction {
    let baseline_head = match last.and_then(|snapshot| snapshot.first()) {
        Some(head) => head.id,
        None => return PollAction::EstablishBaseline,
    };

    let Some(current_head) = current.first() else {
        // An empty fetch is inconclusive, not "all events removed".
        return PollAction::NoChange;
    };

    if current_head.id == baseline_head {
        return PollAction::NoChange;
    }

    let new_events = current
        .iter()
        .filter(|event| event.id > baseline_head)
        .cloned()
        .collect();

    PollAction::Notify(new_events)
}

/// Fetches the event list, diffs it against the durable baseline, and sends
/// the digest when new events appeared.
pub struct EventPoller {
    events: EventsClient,
    store: SnapshotStore,
    mailer: Mailer,
    link_base: Option<String>,
}

impl EventPoller {
    pub fn new(
        events: EventsClient,
        store: SnapshotStore,
        mailer: Mailer,
        link_base: Option<String>,
    ) -> Self {
        Self {
            events,
            store,
            mailer,
            link_base,
        }
    }

    /// One full poll cycle.
    pub async fn poll(&self, tokens: &mut TokenManager) -> Result<(), MonitorError> {
        let Some(current) = self.check_api(tokens).await else {
            return Ok(());
        };

        let last = self.store.load()?;
        self.detect_and_notify(current, last).await
    }

    /// Fetch the event list with a valid token. Any failure is logged and
    /// reported as "no result"; the caller retries on the next cycle.
    async fn check_api(&self, tokens: &mut TokenManager) -> Option<Vec<Event>> {
        let token = match tokens.get_valid_token().await {
            Ok(token) => token,
            Err(err) => {
                tracing::error!("API check failed: {err}");
                return None;
            }
        };

        match self.events.fetch_latest(token).await {
            Ok(events) => Some(events),
            Err(err) => {
                tracing::error!("API check failed: {err}");
                None
            }
        }
    }

    async fn detect_and_notify(
        &self,
        current: Vec<Event>,
        last: Option<Vec<Event>>,
    ) -> Result<(), MonitorError> {
        match detect(&current, last.as_deref()) {
            PollAction::NoChange => {
                tracing::debug!("no new events");
            }
            PollAction::EstablishBaseline => {
                self.store.save(&current)?;
                tracing::info!("baseline established ({} events)", current.len());
            }
            PollAction::Notify(new_events) => {
                self.store.save(&current)?;
                tracing::info!("{} new events detected", new_events.len());

                let subject = digest::subject(new_events.len());
                let body = digest::body(&new_events, self.link_base.as_deref());
                self.mailer.send(&subject, &body).await;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: i64) -> Event {
        Event {
            id,
            name: format!("event {id}"),
            location: None,
            kind: "meetup".to_string(),
            begin_at: Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap(),
            max_people: None,
            description: None,
        }
    }

    fn events(ids: &[i64]) -> Vec<Event> {
        ids.iter().copied().map(event).collect()
    }

    fn notified_ids(action: PollAction) -> Vec<i64> {
        match action {
            PollAction::Notify(new_events) => new_events.iter().map(|e| e.id).collect(),
            other => panic!("expected a notification, got {other:?}"),
        }
    }

    #[test]
    fn first_run_establishes_the_baseline_silently() {
        assert_eq!(
            detect(&events(&[105, 104]), None),
            PollAction::EstablishBaseline
        );
    }

    #[test]
    fn first_run_persists_even_an_empty_fetch() {
        assert_eq!(detect(&[], None), PollAction::EstablishBaseline);
    }

    #[test]
    fn empty_stored_baseline_is_treated_as_absent() {
        assert_eq!(
            detect(&events(&[105]), Some(&[][..])),
            PollAction::EstablishBaseline
        );
    }

    #[test]
    fn identical_heads_mean_no_change() {
        let last = events(&[105, 104]);
        assert_eq!(
            detect(&events(&[105, 104]), Some(last.as_slice())),
            PollAction::NoChange
        );
    }

    #[test]
    fn empty_fetch_is_inconclusive() {
        let last = events(&[105, 104]);
        assert_eq!(detect(&[], Some(last.as_slice())), PollAction::NoChange);
    }

    #[test]
    fn delta_is_exactly_the_events_above_the_baseline_head() {
        let last = events(&[105, 104]);
        let current = events(&[107, 106, 105, 104]);

        assert_eq!(notified_ids(detect(&current, Some(last.as_slice()))), vec![107, 106]);
    }

    #[test]
    fn single_new_event_is_notified_alone() {
        let last = events(&[105]);
        assert_eq!(
            notified_ids(detect(&events(&[106, 105]), Some(last.as_slice()))),
            vec![106]
        );
    }

    #[test]
    fn head_moving_backwards_notifies_an_empty_delta() {
        // A changed head whose id is lower than the baseline's produces the
        // (empty) filter result, mirroring the notified-set contract.
        let last = events(&[105, 104]);
        assert_eq!(
            notified_ids(detect(&events(&[103]), Some(last.as_slice()))),
            Vec::<i64>::new()
        );
    }
}
