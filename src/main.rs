use std::sync::Arc;

use hydrochill_gateway::broker::MqttPublisher;
use hydrochill_gateway::config::{Settings, load_config};
use hydrochill_gateway::persistence::SledStore;
use hydrochill_gateway::transport::{AppState, build_router, serve};
use hydrochill_gateway::utils::{GatewayError, logging};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // logging is configured from settings, so a config failure can only go to stderr
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&config.server.log_level);

    if let Err(e) = run_server(config).await {
        error!("Gateway failed: {e}");
        std::process::exit(1);
    }
}

async fn run_server(config: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = SledStore::open(&config.store.path).map_err(GatewayError::from)?;
    info!("Document store opened at {}", config.store.path);

    let (publisher, _mqtt_loop) = MqttPublisher::connect(&config.mqtt);

    let state = AppState {
        store: Arc::new(store),
        publisher: Arc::new(publisher),
        record: config.store.record.clone(),
        command_topic: config.mqtt.command_topic.clone(),
    };

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await.map_err(GatewayError::from)?;

    info!("=========================================");
    info!("HYDROCHILL GATEWAY ACTIVE ON {addr}");
    info!("URL: http://localhost:{}", config.server.port);
    info!("=========================================");

    serve(listener, build_router(state), shutdown_signal()).await?;
    info!("Gateway shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let (Ok(mut sigint), Ok(mut sigterm)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) else {
        error!("Failed to install signal handlers, falling back to ctrl-c");
        let _ = tokio::signal::ctrl_c().await;
        return;
    };

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    info!("Shutdown signal received. Exiting gracefully.");
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received. Exiting gracefully.");
}
