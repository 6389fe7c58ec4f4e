//! Event reporters.
//!
//! [`QueuedReporter`] never blocks the scheduler: events go onto a
//! channel and a single background task delivers them in order,
//! retrying temporary API failures.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::PlaybackEvent;
use crate::api::{is_permanent_error, ApiClient, ApiError};
use crate::error::ReportError;
use crate::storage::ApiConfig;
use crate::scheduler::EventReporter;

/// How hard to try delivering a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(30),
        }
    }
}

/// Final destination of playback events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: &PlaybackEvent) -> Result<(), ApiError>;
}

/// Posts events to the backend events endpoint.
///
/// Connects on first use when no client was available at startup, and
/// re-authenticates once when the backend rejects the token.
pub struct ApiEventSink {
    settings: ApiConfig,
    client: Mutex<Option<ApiClient>>,
    volume: u8,
}

impl ApiEventSink {
    pub fn new(settings: ApiConfig, client: Option<ApiClient>, volume: u8) -> Self {
        Self {
            settings,
            client: Mutex::new(client),
            volume,
        }
    }
}

#[async_trait]
impl EventSink for ApiEventSink {
    async fn deliver(&self, event: &PlaybackEvent) -> Result<(), ApiError> {
        let mut client = self.client.lock().await;
        if client.is_none() {
            *client = Some(ApiClient::from_config(&self.settings).await?);
            tracing::info!("connected to backend");
        }
        let api = client
            .as_mut()
            .ok_or_else(|| ApiError::temporary("backend client unavailable"))?;

        let details = event.description(self.volume);
        let times = [event.timestamp];
        match api.report_event(&details, &times).await {
            Err(e) if e.is_unauthorized() => {
                tracing::info!("token rejected, re-authenticating");
                api.authenticate().await?;
                api.report_event(&details, &times).await
            }
            result => result,
        }
    }
}

/// Deliver one event, retrying while failures are temporary.
pub async fn deliver_with_retry<K>(
    sink: &K,
    event: &PlaybackEvent,
    policy: &RetryPolicy,
) -> Result<(), ApiError>
where
    K: EventSink + ?Sized,
{
    let mut attempt = 1;
    loop {
        match sink.deliver(event).await {
            Ok(()) => return Ok(()),
            Err(e) if is_permanent_error(&e) || attempt >= policy.max_attempts => return Err(e),
            Err(e) => {
                tracing::debug!(attempt, "temporary failure reporting event: {e}");
                tokio::time::sleep(policy.retry_delay).await;
                attempt += 1;
            }
        }
    }
}

/// Fire-and-forget reporter backed by an ordered delivery task.
#[derive(Debug, Clone)]
pub struct QueuedReporter {
    tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl QueuedReporter {
    /// Start the delivery task on the current tokio runtime.
    ///
    /// The task ends once every `QueuedReporter` clone has been dropped
    /// and the queue is drained.
    pub fn spawn<K>(sink: K, policy: RetryPolicy) -> (Self, JoinHandle<()>)
    where
        K: EventSink + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drain(rx, sink, policy));
        (Self { tx }, handle)
    }
}

impl EventReporter for QueuedReporter {
    fn report(&self, event: PlaybackEvent) -> Result<(), ReportError> {
        self.tx.send(event).map_err(|_| ReportError::QueueClosed)
    }
}

/// Wait up to `grace` for the delivery task to finish sending what is
/// already queued. Returns `false` if events were still pending.
///
/// Every reporter clone must be dropped first or the task never ends.
pub async fn flush_pending(delivery: JoinHandle<()>, grace: Duration) -> bool {
    match tokio::time::timeout(grace, delivery).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!("event delivery task failed: {e}");
            false
        }
        Err(_) => {
            tracing::warn!("events still pending after {grace:?}, giving up");
            false
        }
    }
}

async fn drain<K: EventSink>(
    mut rx: mpsc::UnboundedReceiver<PlaybackEvent>,
    sink: K,
    policy: RetryPolicy,
) {
    while let Some(event) = rx.recv().await {
        match deliver_with_retry(&sink, &event, &policy).await {
            Ok(()) => tracing::debug!(file = %event.file_name, "event reported"),
            Err(e) => tracing::warn!(
                file = %event.file_name,
                permanent = e.is_permanent(),
                "dropping event: {e}"
            ),
        }
    }
}

/// Reporter for devices without a backend: events are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl EventReporter for LogReporter {
    fn report(&self, event: PlaybackEvent) -> Result<(), ReportError> {
        tracing::info!(
            file = %event.file_name,
            at = %event.timestamp.to_rfc3339(),
            "played"
        );
        Ok(())
    }
}
