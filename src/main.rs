use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use mess_menu::{
    create_app, init_observability, repositories::DynamoDbMenuRepository,
    services::MenuService, shutdown_observability, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (basic logging only)
    let config = Config::from_environment()
        .await
        .context("Failed to load configuration")?;
    println!("Configuration loaded successfully");

    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        config.observability.otlp_endpoint.as_deref(),
        &config.observability.log_level,
        config.observability.enable_json_logging,
    )
    .context("Failed to initialize observability")?;

    info!("Starting mess-menu service");
    info!(
        "Service: {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!(
        "Store: region={}, collection_prefix={:?}, id_attribute={}",
        config.store.region, config.store.collection_prefix, config.store.document_id_attribute
    );

    let metrics = Arc::new(Metrics::new()?);

    let dynamodb_client = Arc::new(config.dynamodb_client.clone());
    let menu_repository = Arc::new(DynamoDbMenuRepository::new(
        dynamodb_client,
        config.store.collection_prefix.clone(),
        config.store.document_id_attribute.clone(),
        config.store.region.clone(),
    ));
    let menu_service = Arc::new(MenuService::new(menu_repository, metrics.clone()));
    info!("Services initialized successfully");

    let app = create_app(menu_service, metrics);

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid server host {}", config.server.host))?,
        config.server.port,
    );
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on {}", addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    shutdown_observability().await;
    info!("Server shutdown complete");
    Ok(())
}
