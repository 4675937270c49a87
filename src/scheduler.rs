use std::time::Duration;

use tokio::time;

use crate::poller::EventPoller;
use crate::token::TokenManager;

/// Drives poll cycles at a fixed interval, indefinitely.
///
/// A failed cycle is logged and the next one runs after the same fixed wait;
/// the loop itself never terminates on error.
pub struct PollingScheduler {
    interval: Duration,
    tokens: TokenManager,
    poller: EventPoller,
}

impl PollingScheduler {
    pub fn new(interval: Duration, tokens: TokenManager, poller: EventPoller) -> Self {
        Self {
            interval,
            tokens,
            poller,
        }
    }

    pub async fn run(&mut self) {
        let mut ticker = time::interval(self.interval);

        tracing::info!("event poller started (interval: {:?})", self.interval);

        loop {
            ticker.tick().await;
            tracing::debug!("running poll cycle");

            if let Err(err) = self.poller.poll(&mut self.tokens).await {
                tracing::error!("poll cycle failed: {err}");
                // Continue polling even on error
            }
        }
    }
}
