//! Latency Poison server
//!
//! Chaos-injecting reverse proxy: adds latency and synthetic failures in
//! front of real upstreams.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use application::ports::{ConfigStore, RandomSource, UsageRecorder};
use infrastructure::{
    AppConfig, ChannelUsageRecorder, DiscardUsageRecorder, LogFormat, ReqwestForwarder,
    SeededRandom, SqliteConfigStore, ThreadRandom, create_pool, init_tracing,
};
use presentation_http::{AppState, RequestIdLayer, create_router, set_expose_internal_errors};
use tokio::{net::TcpListener, signal, task::JoinHandle};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let log_format = config
        .server
        .log_format
        .parse::<LogFormat>()
        .unwrap_or_default();
    init_tracing(log_format, &config.server.log_filter)?;

    info!("Latency Poison v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let environment = config.environment();
    set_expose_internal_errors(!environment.is_production());

    info!(
        environment = %environment,
        host = %config.server.host,
        port = config.server.port,
        database = %config.database.path,
        "Configuration loaded"
    );

    let pool = create_pool(&config.database).context("Failed to open routing database")?;
    let store: Arc<dyn ConfigStore> = Arc::new(SqliteConfigStore::new(Arc::new(pool)));

    let random: Arc<dyn RandomSource> = match config.chaos.seed {
        Some(seed) => {
            info!(seed, "Chaos draws use a fixed seed");
            Arc::new(SeededRandom::new(seed))
        },
        None => Arc::new(ThreadRandom),
    };

    let (usage, usage_worker): (Arc<dyn UsageRecorder>, Option<JoinHandle<()>>) =
        if config.usage.enabled {
            let (recorder, worker) =
                ChannelUsageRecorder::spawn(Arc::clone(&store), config.usage.queue_capacity);
            (Arc::new(recorder), Some(worker))
        } else {
            info!("Usage counters disabled");
            (Arc::new(DiscardUsageRecorder), None)
        };

    let forwarder = ReqwestForwarder::new(&config.upstream)
        .context("Failed to build upstream HTTP client")?;

    let state = AppState::new(store, usage, random, Arc::new(forwarder))
        .with_body_limit(config.server.max_body_size_bytes);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let app = if config.server.cors_enabled {
        app.layer(cors_layer(&config.server.allowed_origins))
    } else {
        app
    };

    // Outermost, so every log line of a request carries its ID
    let app = app.layer(RequestIdLayer::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(worker) = usage_worker {
        info!("Flushing usage counters...");
        if tokio::time::timeout(shutdown_timeout, worker).await.is_err() {
            warn!(timeout = ?shutdown_timeout, "Usage counters not flushed before timeout");
        }
    }

    info!("Server shutdown complete");

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
