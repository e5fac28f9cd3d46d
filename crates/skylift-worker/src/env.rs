//! Environment validation for the build worker.
//!
//! The worker's entire contract arrives as environment variables injected by
//! the dispatcher and the container template. Every required variable is
//! checked up front; a missing one fails the run before any side effect.

use std::path::PathBuf;

use crate::error::WorkerError;

/// Required environment variables, validated as a set.
const REQUIRED_VARS: &[&str] = &[
    "GIT_REPOSITORY_URL",
    "PROJECT_ID",
    "AWS_REGION",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "REDIS_URL",
    "S3_BUCKET_NAME",
];

/// Default working directory the clone step populates.
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Validated worker environment.
#[derive(Debug, Clone)]
pub struct WorkerEnv {
    /// Repository the clone step checked out.
    pub git_repository_url: String,
    /// Project id: log channel name and artifact key prefix.
    pub project_id: String,
    /// Storage region.
    pub aws_region: String,
    /// Storage credentials.
    pub aws_access_key_id: String,
    /// Storage credentials.
    pub aws_secret_access_key: String,
    /// Log bus address.
    pub redis_url: String,
    /// Artifact bucket.
    pub s3_bucket_name: String,
    /// Optional endpoint for S3-compatible stores.
    pub s3_endpoint: Option<String>,
    /// Directory holding the cloned source (`OUTPUT_DIR`, optional).
    pub output_dir: PathBuf,
}

impl WorkerEnv {
    /// Read and validate the process environment.
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Validate against an arbitrary variable source.
    ///
    /// Collects every missing required name into one error so a misconfigured
    /// task template shows the full damage at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WorkerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|name| lookup(name).map_or(true, |v| v.is_empty()))
            .map(|name| (*name).to_owned())
            .collect();

        if !missing.is_empty() {
            return Err(WorkerError::MissingEnv { vars: missing });
        }

        let get = |name: &str| lookup(name).unwrap_or_default();

        Ok(Self {
            git_repository_url: get("GIT_REPOSITORY_URL"),
            project_id: get("PROJECT_ID"),
            aws_region: get("AWS_REGION"),
            aws_access_key_id: get("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            redis_url: get("REDIS_URL"),
            s3_bucket_name: get("S3_BUCKET_NAME"),
            s3_endpoint: lookup("S3_ENDPOINT").filter(|v| !v.is_empty()),
            output_dir: lookup("OUTPUT_DIR")
                .filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("GIT_REPOSITORY_URL", "https://example.com/repo.git"),
            ("PROJECT_ID", "brave-otter-42"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_ACCESS_KEY_ID", "AKIA..."),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("REDIS_URL", "redis://bus:6379"),
            ("S3_BUCKET_NAME", "skylift-artifacts"),
        ])
    }

    #[test]
    fn accepts_a_complete_environment() {
        let vars = full_env();
        let env = WorkerEnv::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned())).unwrap();

        assert_eq!(env.project_id, "brave-otter-42");
        assert_eq!(env.s3_bucket_name, "skylift-artifacts");
        assert_eq!(env.output_dir, PathBuf::from("output"));
        assert!(env.s3_endpoint.is_none());
    }

    #[test]
    fn collects_every_missing_variable() {
        let mut vars = full_env();
        vars.remove("PROJECT_ID");
        vars.remove("S3_BUCKET_NAME");

        let err =
            WorkerEnv::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned())).unwrap_err();

        match err {
            WorkerError::MissingEnv { vars } => {
                assert_eq!(vars, vec!["PROJECT_ID", "S3_BUCKET_NAME"]);
            }
            other => panic!("expected MissingEnv, got {other:?}"),
        }
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut vars = full_env();
        vars.insert("REDIS_URL", "");

        let err =
            WorkerEnv::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned())).unwrap_err();

        match err {
            WorkerError::MissingEnv { vars } => assert_eq!(vars, vec!["REDIS_URL"]),
            other => panic!("expected MissingEnv, got {other:?}"),
        }
    }

    #[test]
    fn optional_overrides_are_honoured() {
        let mut vars = full_env();
        vars.insert("S3_ENDPOINT", "http://minio:9000");
        vars.insert("OUTPUT_DIR", "/workspace/source");

        let env = WorkerEnv::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned())).unwrap();
        assert_eq!(env.s3_endpoint.as_deref(), Some("http://minio:9000"));
        assert_eq!(env.output_dir, PathBuf::from("/workspace/source"));
    }
}
