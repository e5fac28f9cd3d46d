//! Skylift control plane binary.
//!
//! Hosts the project API, the worker dispatcher, the log relay, and the
//! realtime multiplexer in one process with one shared state object.

use std::sync::Arc;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use skylift_bus::{LogBus, RedisLogBus};
use skylift_proto::LOG_CHANNEL_PATTERN;
use skylift_server::{
    api, relay::run_relay, ChannelMultiplexer, ContainerLauncher, Dispatcher, ServerConfig,
    ServerError,
};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("skylift_server=info".parse().map_err(|e| {
                    ServerError::ConfigParse(format!("invalid log directive: {e}"))
                })?),
        )
        .init();

    info!("skylift control plane starting");

    let config: ServerConfig = Figment::new()
        .merge(Toml::file("skylift.toml"))
        .merge(Env::prefixed("SKYLIFT_").split("__"))
        .extract()?;

    info!(listen_addr = %config.api.listen_addr, "configuration loaded");

    // One bus connection, one multiplexer, one dispatcher per process,
    // shared by reference through the application state.
    let bus = RedisLogBus::connect(&config.bus.url).await?;
    let multiplexer = Arc::new(ChannelMultiplexer::new());

    // The relay is the single wildcard subscriber for the process lifetime.
    let subscription = bus.subscribe_pattern(LOG_CHANNEL_PATTERN).await?;
    tokio::spawn(run_relay(subscription, multiplexer.clone()));

    let launcher = Arc::new(ContainerLauncher::new(config.launch.clone()));
    let dispatcher = Dispatcher::new(launcher);

    let state = Arc::new(api::AppState {
        dispatcher,
        multiplexer,
        deploy: config.deploy.clone(),
    });

    let app = api::router(state);
    let listener = TcpListener::bind(&config.api.listen_addr).await?;
    info!(addr = %config.api.listen_addr, "api listening");

    axum::serve(listener, app).await?;

    Ok(())
}
