//! Configuration types for the control plane.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::Deserialize;

/// Control plane configuration, loaded from `skylift.toml` merged with
/// `SKYLIFT_`-prefixed environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP API configuration.
    pub api: ApiConfig,
    /// Log bus configuration.
    pub bus: BusConfig,
    /// Worker launch configuration.
    pub launch: LaunchConfig,
    /// Deployment presentation configuration.
    pub deploy: DeployConfig,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Address to listen on. Serves both the REST API and `/ws`.
    pub listen_addr: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9000),
        }
    }
}

/// Log bus configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Connection URL.
    pub url: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_owned(),
        }
    }
}

/// Worker launch configuration.
///
/// This is the fixed, process-wide part of a launch, the analogue of a task
/// template. The per-call part is exactly the repository URL and project id.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Container runtime binary (`docker` or `podman`).
    pub runtime: String,
    /// Builder image every worker runs.
    pub image: String,
    /// Optional container network to attach workers to.
    pub network: Option<String>,
    /// Fixed environment injected into every worker (bus address, storage
    /// credentials, bucket name, region).
    pub env: BTreeMap<String, String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_owned(),
            image: "skylift-builder".to_owned(),
            network: None,
            env: BTreeMap::new(),
        }
    }
}

/// Deployment presentation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Host suffix used to build the preview URL returned to clients.
    pub preview_host: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            preview_host: "localhost:8000".to_owned(),
        }
    }
}
