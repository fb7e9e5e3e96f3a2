use anyhow::{Context, Result};
use cookbook::config::CookbookConfig;
use cookbook_connector::api::{create_router, ApiState};
use cookbook_connector::connectors::cookbook::transformer::FeedBatch;
use cookbook_connector::{Connector, CookbookConnector, Credentials, PollingScheduler, Session};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cookbook=info,cookbook_connector=info".into()),
        )
        .init();

    info!("Cookbook connector starting...");

    let config = CookbookConfig::load().context("Failed to load configuration")?;
    let credentials = Credentials::from_env()
        .context("COOKBOOK_ACCESS_TOKEN is required (OAuth access token for the cookbook service)")?;

    info!(
        address = %config.service.address,
        polling_enabled = config.polling.enabled,
        poll_interval_ms = config.polling.interval_ms,
        api_port = config.api.port,
        "Configuration loaded"
    );

    let connector = Arc::new(
        CookbookConnector::new(&config).context("Failed to initialize cookbook connector")?,
    );
    let session = Arc::new(Session::new(
        connector.name(),
        connector.oauth_config(),
        credentials,
        connector.http_client().clone(),
    ));

    // Start the polling source, draining batches into the log
    let mut poll_handles = Vec::new();
    let mut status = None;
    if config.polling.enabled {
        let (tx, mut rx) = mpsc::channel::<FeedBatch>(16);
        let scheduler = PollingScheduler::new(
            Arc::clone(&connector) as Arc<dyn Connector>,
            Arc::clone(&session),
            Arc::new(tx),
        );
        status = Some(scheduler.status());
        poll_handles.push(scheduler.start());
        poll_handles.push(tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                info!(
                    batch_id = %batch.batch_id,
                    source = %batch.source,
                    record_count = batch.len(),
                    "Recently added recipes received"
                );
            }
        }));
    } else {
        info!("Polling disabled");
    }

    // Start HTTP API server
    let api_state = ApiState {
        connector: Arc::clone(&connector),
        session: Arc::clone(&session),
        status,
    };
    let router = create_router(api_state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api.port))
        .await
        .context("Failed to bind cookbook API port")?;
    info!(port = config.api.port, "Cookbook API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Cookbook API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    for handle in poll_handles {
        handle.abort();
    }
    info!("Cookbook connector stopped");

    Ok(())
}
