//! Polling source for the recently-added feed.
//!
//! Polls the connector on a fixed interval and hands each non-empty result
//! to a [`SourceCallback`]. One tick is one round trip; the next tick waits
//! until the previous delivery completed.

use crate::connectors::cookbook::transformer::{records_to_batch, FeedBatch};
use crate::session::Session;
use crate::Connector;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Receives the batches produced by the polling source.
#[async_trait]
pub trait SourceCallback: Send + Sync {
    async fn process(&self, batch: FeedBatch) -> Result<()>;
}

#[async_trait]
impl SourceCallback for mpsc::Sender<FeedBatch> {
    async fn process(&self, batch: FeedBatch) -> Result<()> {
        self.send(batch)
            .await
            .map_err(|_| anyhow!("Feed receiver dropped"))
    }
}

/// Status information for the polling source.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SourceStatus {
    /// Last successful poll timestamp
    pub last_poll: Option<DateTime<Utc>>,
    /// Last error message (if any)
    pub last_error: Option<String>,
    /// Total number of successful polls
    pub poll_count: u64,
    /// Total number of failed polls
    pub error_count: u64,
    /// Total number of records handed to the callback
    pub records_delivered: u64,
}

/// Polling scheduler for a single connector.
pub struct PollingScheduler {
    connector: Arc<dyn Connector>,
    session: Arc<Session>,
    callback: Arc<dyn SourceCallback>,
    status: Arc<Mutex<SourceStatus>>,
}

impl PollingScheduler {
    pub fn new(
        connector: Arc<dyn Connector>,
        session: Arc<Session>,
        callback: Arc<dyn SourceCallback>,
    ) -> Self {
        Self {
            connector,
            session,
            callback,
            status: Arc::new(Mutex::new(SourceStatus::default())),
        }
    }

    /// Returns a clone of the status tracker for external monitoring.
    pub fn status(&self) -> Arc<Mutex<SourceStatus>> {
        Arc::clone(&self.status)
    }

    /// Starts the polling loop (non-blocking).
    ///
    /// Abort the returned handle to stop polling.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let poll_interval = self.connector.poll_interval();
        let connector_name = self.connector.name().to_string();

        tokio::spawn(async move {
            info!(
                connector = %connector_name,
                interval_ms = poll_interval.as_millis() as u64,
                "Starting polling source"
            );

            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }

    /// Runs one poll and records the outcome in the status.
    async fn tick(&self) {
        debug!(connector = %self.connector.name(), "Polling connector");

        let outcome = self.poll_once().await;
        let mut status = self.status.lock().await;
        match outcome {
            Ok(delivered) => {
                status.last_poll = Some(Utc::now());
                status.last_error = None;
                status.poll_count += 1;
                status.records_delivered += delivered as u64;
            }
            Err(e) => {
                error!(
                    connector = %self.connector.name(),
                    error = %e,
                    "Poll failed"
                );
                status.last_error = Some(format!("{:#}", e));
                status.error_count += 1;
            }
        }
    }

    /// Fetches the feed and delivers it; returns the number of records delivered.
    async fn poll_once(&self) -> Result<usize> {
        // Refresh ahead of expiry rather than waiting for a rejected call
        if self.session.needs_refresh().await {
            self.session
                .refresh()
                .await
                .context("Token refresh failed, skipping poll")?;
        }

        let connector = Arc::clone(&self.connector);
        let records = self
            .session
            .run_with_reconnect(|credentials| {
                let connector = Arc::clone(&connector);
                async move { connector.fetch(&credentials).await }
            })
            .await
            .context("Failed to fetch data from connector")?;

        if records.is_empty() {
            debug!(connector = %self.connector.name(), "No records to deliver");
            return Ok(0);
        }

        let batch = records_to_batch(self.connector.name(), records);
        let count = batch.len();

        info!(
            connector = %self.connector.name(),
            batch_id = %batch.batch_id,
            record_count = count,
            "Delivering feed batch"
        );

        self.callback
            .process(batch)
            .await
            .context("Source callback failed")?;

        Ok(count)
    }
}
