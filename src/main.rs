mod config;
mod digest;
mod error;
mod events;
mod mailer;
mod poller;
mod scheduler;
mod snapshot;
mod token;

use anyhow::Result;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::MonitorConfig;
use crate::events::EventsClient;
use crate::mailer::Mailer;
use crate::poller::EventPoller;
use crate::scheduler::PollingScheduler;
use crate::snapshot::SnapshotStore;
use crate::token::TokenManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_events_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting campus events monitor");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = MonitorConfig::from_env()?;

    let http = reqwest::Client::new();
    let mailer = Mailer::new(&config)?;

    let tokens = TokenManager::new(&config, http.clone(), mailer.clone());
    let store = SnapshotStore::new(config.snapshot_path.clone());
    let events = EventsClient::new(http, config.events_url.clone());
    let poller = EventPoller::new(events, store, mailer, config.event_link_base.clone());

    let mut scheduler = PollingScheduler::new(config.poll_interval, tokens, poller);

    tracing::info!("Monitoring for new events. Press Ctrl+C to stop.");

    tokio::select! {
        _ = scheduler.run() => {}
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}
