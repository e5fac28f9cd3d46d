//! Artifact upload.
//!
//! Walks the build's output directory and publishes every regular file to the
//! object store under `__outputs/{project_id}/{relative_path}`.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::env::WorkerEnv;
use crate::error::WorkerError;
use crate::publisher::LogPublisher;

/// Key prefix for deployed artifact trees.
const OUTPUT_PREFIX: &str = "__outputs";

/// Uploads a build's output tree to the artifact store.
pub struct ArtifactUploader {
    store: Arc<dyn ObjectStore>,
    project_id: String,
}

impl ArtifactUploader {
    /// Create an uploader backed by S3 from the worker environment.
    pub fn from_env(env: &WorkerEnv) -> Result<Self, WorkerError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&env.s3_bucket_name)
            .with_region(&env.aws_region)
            .with_access_key_id(&env.aws_access_key_id)
            .with_secret_access_key(&env.aws_secret_access_key);

        if let Some(endpoint) = &env.s3_endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| WorkerError::StorageInit(e.to_string()))?;

        info!(bucket = %env.s3_bucket_name, region = %env.aws_region, "artifact store client created");

        Ok(Self {
            store: Arc::new(store),
            project_id: env.project_id.clone(),
        })
    }

    /// Create an uploader with a pre-configured object store.
    #[must_use]
    pub fn with_store(store: Arc<dyn ObjectStore>, project_id: impl Into<String>) -> Self {
        Self {
            store,
            project_id: project_id.into(),
        }
    }

    /// Upload every regular file under `dist_dir`.
    ///
    /// Directories are skipped, not uploaded as placeholder objects. Files go
    /// up in sorted walk order so the log stream is deterministic. Each
    /// success publishes one `success` message naming the file; the first
    /// failure publishes an `error` message and fails the whole step, with no
    /// partial recovery.
    pub async fn upload_dir(
        &self,
        dist_dir: &Path,
        publisher: &LogPublisher,
    ) -> Result<(), WorkerError> {
        let files = collect_files(dist_dir)?;
        publisher
            .info(format!("Found {} files to upload", files.len()))
            .await?;

        for relative in &files {
            match self.upload_file(dist_dir, relative).await {
                Ok(()) => publisher.success(format!("Uploaded {relative}")).await?,
                Err(e) => {
                    publisher
                        .error(format!("Failed to upload {relative}: {e}"))
                        .await?;
                    return Err(e);
                }
            }
        }

        info!(project = %self.project_id, count = files.len(), "artifact tree uploaded");
        Ok(())
    }

    async fn upload_file(&self, dist_dir: &Path, relative: &str) -> Result<(), WorkerError> {
        let key = format!("{OUTPUT_PREFIX}/{}/{relative}", self.project_id);
        let path =
            ObjectPath::parse(&key).map_err(|e| WorkerError::InvalidObjectPath(e.to_string()))?;

        let local = dist_dir.join(relative);
        let content_type = mime_guess::from_path(&local)
            .first_or_octet_stream()
            .to_string();

        let data = tokio::fs::read(&local).await?;
        let size = data.len();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.clone().into());

        self.store
            .put_opts(
                &path,
                Bytes::from(data).into(),
                PutOptions {
                    attributes,
                    ..PutOptions::default()
                },
            )
            .await
            .map_err(|e| WorkerError::Upload {
                path: relative.to_owned(),
                message: e.to_string(),
            })?;

        debug!(key = %key, size, content_type = %content_type, "uploaded");
        Ok(())
    }
}

/// Relative paths of every regular file under `dist_dir`, sorted, with `/`
/// separators regardless of platform.
fn collect_files(dist_dir: &Path) -> Result<Vec<String>, WorkerError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dist_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            WorkerError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other("walk entry lost its underlying error")
            }))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dist_dir)
            .map_err(|e| WorkerError::InvalidObjectPath(e.to_string()))?;

        let parts: Vec<&str> = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        files.push(parts.join("/"));
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use skylift_bus::{InMemoryLogBus, LogBus};
    use skylift_proto::{LogLevel, LogMessage};
    use std::fs;

    fn dist_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        dir
    }

    #[test]
    fn collects_regular_files_with_forward_slashes() {
        let dir = dist_fixture();
        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files, vec!["assets/app.js", "index.html"]);
    }

    #[tokio::test]
    async fn uploads_under_the_project_scoped_prefix() {
        let dir = dist_fixture();
        let store = Arc::new(InMemory::new());
        let uploader = ArtifactUploader::with_store(store.clone(), "brave-otter-42");

        let bus = Arc::new(InMemoryLogBus::new());
        let publisher = LogPublisher::new(bus, "brave-otter-42");

        uploader.upload_dir(dir.path(), &publisher).await.unwrap();

        let index = store
            .get(&ObjectPath::from("__outputs/brave-otter-42/index.html"))
            .await
            .unwrap();
        assert_eq!(index.bytes().await.unwrap(), Bytes::from("<html></html>"));

        store
            .get(&ObjectPath::from("__outputs/brave-otter-42/assets/app.js"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn publishes_one_success_message_per_file() {
        let dir = dist_fixture();
        let store = Arc::new(InMemory::new());
        let uploader = ArtifactUploader::with_store(store, "brave-otter-42");

        let bus = Arc::new(InMemoryLogBus::new());
        let mut sub = bus.subscribe_pattern("logs:*").await.unwrap();
        let publisher = LogPublisher::new(bus, "brave-otter-42");

        uploader.upload_dir(dir.path(), &publisher).await.unwrap();

        let first = LogMessage::from_payload(&sub.recv().await.unwrap().payload).unwrap();
        assert_eq!(first.log, "Found 2 files to upload");
        assert_eq!(first.level, LogLevel::Info);

        let second = LogMessage::from_payload(&sub.recv().await.unwrap().payload).unwrap();
        assert_eq!(second.log, "Uploaded assets/app.js");
        assert_eq!(second.level, LogLevel::Success);

        let third = LogMessage::from_payload(&sub.recv().await.unwrap().payload).unwrap();
        assert_eq!(third.log, "Uploaded index.html");
        assert_eq!(third.level, LogLevel::Success);
    }

    #[tokio::test]
    async fn an_empty_dist_uploads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemory::new());
        let uploader = ArtifactUploader::with_store(store, "brave-otter-42");

        let bus = Arc::new(InMemoryLogBus::new());
        let mut sub = bus.subscribe_pattern("logs:*").await.unwrap();
        let publisher = LogPublisher::new(bus, "brave-otter-42");

        uploader.upload_dir(dir.path(), &publisher).await.unwrap();

        let only = LogMessage::from_payload(&sub.recv().await.unwrap().payload).unwrap();
        assert_eq!(only.log, "Found 0 files to upload");
    }

    #[tokio::test]
    async fn content_type_is_inferred_from_the_extension() {
        let dir = dist_fixture();
        let store = Arc::new(InMemory::new());
        let uploader = ArtifactUploader::with_store(store.clone(), "brave-otter-42");

        let bus = Arc::new(InMemoryLogBus::new());
        let publisher = LogPublisher::new(bus, "brave-otter-42");
        uploader.upload_dir(dir.path(), &publisher).await.unwrap();

        let result = store
            .get(&ObjectPath::from("__outputs/brave-otter-42/index.html"))
            .await
            .unwrap();
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.to_string());
        assert_eq!(content_type.as_deref(), Some("text/html"));
    }
}
