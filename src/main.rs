use anyhow::Context;
use student_registry::{api, config, logging, metrics::RequestMetrics, store::MongoStudentStore};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::init_config().context("Failed to load config from environment")?;
    logging::init_tracing(&config.log_file);

    let store = MongoStudentStore::connect(
        &config.mongodb_url,
        &config.mongodb_db,
        &config.mongodb_collection,
    )
    .await
    .context("Failed to create MongoDB client")?;
    if let Err(error) = store.ping().await {
        tracing::warn!(error = %error, "MongoDB did not answer ping; serving anyway");
    }

    let metrics = Arc::new(RequestMetrics::new());
    let app = api::create_router(Arc::new(store), Arc::clone(&metrics));
    let metrics_app = api::create_metrics_router(metrics);

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind API port {}", config.server_port))?;
    let metrics_listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;

    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);
    tracing::info!(
        "Serving metrics on http://0.0.0.0:{}/metrics",
        config.metrics_port
    );

    let api_server = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };
    let metrics_server = async {
        axum::serve(metrics_listener, metrics_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };
    tokio::try_join!(api_server, metrics_server).context("Server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::warn!("Signal received, starting graceful shutdown");
}
