//! Pharmacy queue watcher.
//!
//! Polls the pharmacy queue at the configured interval and logs each refresh: the entries that
//! pass the filter and the queue-wide counts. Stops cleanly on Ctrl-C.
//!
//! # Environment Variables
//! - `HMS_API_BASE_URL`: backend root (default: "http://localhost:8080/api")
//! - `HMS_API_VERSION`: "none" or "v1"
//! - `HMS_QUEUE_POLL_SECS`: refresh interval in seconds (default: 30)
//! - `HMS_SESSION_FILE`: JSON file holding the session (token, preferences); memory when unset
//! - `HMS_QUEUE_STATUS`, `HMS_QUEUE_PRIORITY`: filter values, or "all"
//! - `HMS_QUEUE_SEARCH`: free-text filter

use hms_client::poller::{QueuePoller, QueueSnapshot};
use hms_client::{ApiClient, ClientConfig, Session};
use hms_core::queue::{QueueFilter, QueueStatistics};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn filter_from_env() -> anyhow::Result<QueueFilter> {
    let mut filter = QueueFilter::default();
    if let Some(status) = non_blank_var("HMS_QUEUE_STATUS") {
        filter.status = status.parse()?;
    }
    if let Some(priority) = non_blank_var("HMS_QUEUE_PRIORITY") {
        filter.priority = priority.parse()?;
    }
    filter.search = non_blank_var("HMS_QUEUE_SEARCH");
    Ok(filter)
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn report(snapshot: &QueueSnapshot, filter: &QueueFilter) {
    if let Some(err) = &snapshot.last_error {
        tracing::warn!("queue refresh #{} failed: {err}", snapshot.refreshes);
        return;
    }
    let stats = QueueStatistics::from_entries(&snapshot.entries);
    let shown = filter.apply(&snapshot.entries);
    tracing::info!(
        "queue refresh #{}: {} shown, {} pending, {} in progress, {} completed, {} urgent",
        snapshot.refreshes,
        shown.len(),
        stats.pending,
        stats.in_progress,
        stats.completed,
        stats.urgent
    );
    for entry in shown {
        tracing::info!(
            "  {} {} [{} / {}] {} item(s){}",
            entry.prescription_number,
            entry.patient_name,
            entry.priority,
            entry.status,
            entry.total_items(),
            if entry.has_stock_shortage() { ", stock shortage" } else { "" }
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let filter = filter_from_env()?;
    let interval = config.queue_poll_interval();
    let session = Session::for_config(&config);
    let api = ApiClient::new(config, session)?;

    tracing::info!(
        "++ Watching pharmacy queue at {} every {}s (status {}, priority {})",
        api.config().api_root(),
        interval.as_secs(),
        filter.status,
        filter.priority
    );

    let prescriptions = api.prescriptions();
    let handle = QueuePoller::spawn(interval, move || {
        let prescriptions = prescriptions.clone();
        async move { prescriptions.pharmacy_queue(&[]).await }
    });

    let mut updates = handle.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                report(&snapshot, &filter);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("-- Stopping queue watcher");
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}
