//! Error types for the build worker.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a worker run.
#[derive(Debug, Error)]
pub enum WorkerError {
    // ─────────────────────────────────────────────────────────────────────────
    // Environment errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Required environment variables are missing.
    #[error("missing required environment variables: {}", vars.join(", "))]
    MissingEnv {
        /// Names of every missing variable.
        vars: Vec<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Build errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The populated working directory was not found.
    #[error("output directory not found: {0}")]
    WorkdirMissing(PathBuf),

    /// A build step could not be started.
    #[error("failed to start build step '{step}': {message}")]
    BuildSpawn {
        /// The command that failed to start.
        step: String,
        /// OS error message.
        message: String,
    },

    /// A build step finished with a non-zero exit code.
    #[error("build process exited with code {exit_code}")]
    BuildFailed {
        /// The step's exit code (-1 when terminated by a signal).
        exit_code: i32,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Upload errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The artifact store client could not be created.
    #[error("failed to create artifact store client: {0}")]
    StorageInit(String),

    /// A file path could not be mapped to an object key.
    #[error("invalid object path: {0}")]
    InvalidObjectPath(String),

    /// An upload failed; the whole upload step fails with it.
    #[error("failed to upload {path}: {message}")]
    Upload {
        /// File path relative to the output directory.
        path: String,
        /// Store error message.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // IO and bus errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Filesystem error while reading build output.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The log bus rejected an operation.
    #[error(transparent)]
    Bus(#[from] skylift_bus::BusError),
}
