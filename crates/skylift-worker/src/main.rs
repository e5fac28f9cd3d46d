//! Skylift build worker binary.
//!
//! Runs once per container: validates the injected environment, builds the
//! cloned source and uploads the output tree. The log stream is the
//! only signal back to the control plane; nothing is returned to the
//! dispatcher.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use skylift_bus::RedisLogBus;
use skylift_worker::deploy::{DeployPaths, Deployment};
use skylift_worker::env::WorkerEnv;
use skylift_worker::publisher::LogPublisher;
use skylift_worker::upload::ArtifactUploader;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("skylift worker starting");

    // Validation happens before any side effect: a missing variable means no
    // bus connection, no build, no upload.
    let env = match WorkerEnv::from_env() {
        Ok(env) => env,
        Err(e) => {
            error!(error = %e, "environment validation failed");
            return ExitCode::FAILURE;
        }
    };

    info!(project = %env.project_id, repository = %env.git_repository_url, "environment validated");

    let bus = match RedisLogBus::connect(&env.redis_url).await {
        Ok(bus) => Arc::new(bus),
        Err(e) => {
            error!(error = %e, "failed to connect to log bus");
            return ExitCode::FAILURE;
        }
    };

    let publisher = LogPublisher::new(bus, &env.project_id);

    let uploader = match ArtifactUploader::from_env(&env) {
        Ok(uploader) => uploader,
        Err(e) => {
            error!(error = %e, "failed to create artifact store client");
            let _ = publisher
                .error(format!("Deployment failed: {e}"))
                .await;
            return ExitCode::FAILURE;
        }
    };

    let paths = DeployPaths::from_env(&env);
    let deployment = Deployment::new(publisher, uploader, paths);

    // Every publish is awaited, so by the time run() returns the final
    // status message is flushed; dropping the bus connection afterwards is
    // the worker's last action.
    match deployment.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "worker run failed");
            ExitCode::FAILURE
        }
    }
}
