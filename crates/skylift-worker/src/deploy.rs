//! The worker's forward path: Validate → Build → Upload.

use std::path::PathBuf;
use std::sync::Arc;

use object_store::ObjectStore;
use tracing::{error, info};

use crate::build::{run_build, BUILD_STEPS};
use crate::env::WorkerEnv;
use crate::error::WorkerError;
use crate::publisher::LogPublisher;
use crate::upload::ArtifactUploader;

/// Subdirectory of the working directory holding build output.
const DIST_SUBDIR: &str = "dist";

/// Filesystem layout for one deployment.
#[derive(Debug, Clone)]
pub struct DeployPaths {
    /// Cloned source, populated before the worker starts.
    pub workdir: PathBuf,
    /// Build output to publish.
    pub dist_dir: PathBuf,
}

impl DeployPaths {
    /// Standard layout: source in `output_dir`, build output in
    /// `output_dir/dist`.
    #[must_use]
    pub fn from_env(env: &WorkerEnv) -> Self {
        Self {
            workdir: env.output_dir.clone(),
            dist_dir: env.output_dir.join(DIST_SUBDIR),
        }
    }
}

/// One build-and-deploy run.
pub struct Deployment {
    publisher: LogPublisher,
    uploader: ArtifactUploader,
    paths: DeployPaths,
    build_steps: Vec<String>,
}

impl Deployment {
    /// Assemble a deployment with the fixed build sequence.
    #[must_use]
    pub fn new(publisher: LogPublisher, uploader: ArtifactUploader, paths: DeployPaths) -> Self {
        Self {
            publisher,
            uploader,
            paths,
            build_steps: BUILD_STEPS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Replace the build sequence (tests drive this with shell fixtures).
    #[must_use]
    pub fn with_build_steps(mut self, steps: &[&str]) -> Self {
        self.build_steps = steps.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    /// Create a deployment against an arbitrary object store.
    #[must_use]
    pub fn with_store(
        publisher: LogPublisher,
        store: Arc<dyn ObjectStore>,
        project_id: &str,
        paths: DeployPaths,
    ) -> Self {
        Self::new(
            publisher,
            ArtifactUploader::with_store(store, project_id),
            paths,
        )
    }

    /// Run the forward path.
    ///
    /// Any failure in Build or Upload is terminal: it publishes one
    /// `error`-level `Deployment failed` message and returns the error. A
    /// clean run ends with the per-file upload `success` messages; nothing
    /// is published after them.
    pub async fn run(&self) -> Result<(), WorkerError> {
        match self.execute().await {
            Ok(()) => {
                info!("deployment completed");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "deployment failed");
                self.publisher
                    .error(format!("Deployment failed: {e}"))
                    .await?;
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<(), WorkerError> {
        self.publisher.info("Starting deployment...").await?;

        if !self.paths.workdir.is_dir() {
            return Err(WorkerError::WorkdirMissing(self.paths.workdir.clone()));
        }

        self.publisher.info("Starting build process...").await?;
        let steps: Vec<&str> = self.build_steps.iter().map(String::as_str).collect();
        run_build(&self.paths.workdir, &steps, &self.publisher).await?;

        self.publisher.info("Starting upload to S3...").await?;
        self.uploader
            .upload_dir(&self.paths.dist_dir, &self.publisher)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::path::Path as ObjectPath;
    use skylift_bus::{BusSubscription, InMemoryLogBus, LogBus};
    use skylift_proto::{LogLevel, LogMessage};
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        paths: DeployPaths,
        store: Arc<InMemory>,
        bus: Arc<InMemoryLogBus>,
        sub: BusSubscription,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("output");
        let dist_dir = workdir.join("dist");
        fs::create_dir_all(dist_dir.join("assets")).unwrap();
        fs::write(dist_dir.join("index.html"), "<html></html>").unwrap();
        fs::write(dist_dir.join("assets/app.js"), "console.log(1)").unwrap();

        let bus = Arc::new(InMemoryLogBus::new());
        let sub = bus.subscribe_pattern("logs:*").await.unwrap();

        Fixture {
            paths: DeployPaths {
                workdir,
                dist_dir,
            },
            _dir: dir,
            store: Arc::new(InMemory::new()),
            bus,
            sub,
        }
    }

    async fn drain(sub: &mut BusSubscription) -> Vec<LogMessage> {
        let mut messages = Vec::new();
        while let Ok(Some(event)) =
            tokio::time::timeout(std::time::Duration::from_millis(50), sub.recv()).await
        {
            messages.push(LogMessage::from_payload(&event.payload).unwrap());
        }
        messages
    }

    fn deployment(fx: &Fixture, steps: &[&str]) -> Deployment {
        let publisher = LogPublisher::new(fx.bus.clone(), "brave-otter-42");
        Deployment::with_store(
            publisher,
            fx.store.clone(),
            "brave-otter-42",
            fx.paths.clone(),
        )
        .with_build_steps(steps)
    }

    #[tokio::test]
    async fn successful_run_uploads_the_tree_and_ends_with_upload_messages() {
        let mut fx = fixture().await;

        deployment(&fx, &["true"]).run().await.unwrap();

        fx.store
            .get(&ObjectPath::from("__outputs/brave-otter-42/index.html"))
            .await
            .unwrap();
        fx.store
            .get(&ObjectPath::from("__outputs/brave-otter-42/assets/app.js"))
            .await
            .unwrap();

        let messages = drain(&mut fx.sub).await;
        let logs: Vec<&str> = messages.iter().map(|m| m.log.as_str()).collect();
        assert_eq!(
            logs,
            vec![
                "Starting deployment...",
                "Starting build process...",
                "Build completed successfully",
                "Starting upload to S3...",
                "Found 2 files to upload",
                "Uploaded assets/app.js",
                "Uploaded index.html",
            ]
        );

        // The stream ends with the two upload successes, nothing after.
        let tail: Vec<&LogMessage> = messages.iter().rev().take(2).collect();
        assert!(tail.iter().all(|m| m.level == LogLevel::Success));
    }

    #[tokio::test]
    async fn build_exit_137_publishes_the_code_and_never_uploads() {
        let mut fx = fixture().await;

        let err = deployment(&fx, &["exit 137"]).run().await.unwrap_err();
        assert!(matches!(err, WorkerError::BuildFailed { exit_code: 137 }));

        let messages = drain(&mut fx.sub).await;
        let last = messages.last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert!(last.log.contains("137"));
        assert!(last.log.starts_with("Deployment failed:"));

        // Upload never ran: no objects, no upload messages.
        assert!(fx
            .store
            .get(&ObjectPath::from("__outputs/brave-otter-42/index.html"))
            .await
            .is_err());
        assert!(messages.iter().all(|m| !m.log.starts_with("Uploaded ")));
    }

    #[tokio::test]
    async fn a_missing_workdir_fails_before_the_build() {
        let mut fx = fixture().await;
        fs::remove_dir_all(&fx.paths.workdir).unwrap();

        let err = deployment(&fx, &["true"]).run().await.unwrap_err();
        assert!(matches!(err, WorkerError::WorkdirMissing(_)));

        let messages = drain(&mut fx.sub).await;
        let last = messages.last().unwrap();
        assert!(last.log.contains("output directory not found"));
        assert!(messages.iter().all(|m| m.log != "Starting build process..."));
    }
}
