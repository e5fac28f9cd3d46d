//! Build execution.
//!
//! Runs the fixed build sequence in the populated working directory and
//! streams every output line to the project's log channel as it appears.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::error::WorkerError;
use crate::publisher::LogPublisher;

/// The fixed two-step build sequence: dependency install, then build.
pub const BUILD_STEPS: &[&str] = &["npm install", "npm run build"];

/// Run the build sequence in `workdir`.
///
/// Steps run in order via `sh -c`; the first non-zero exit code is terminal.
/// stdout and stderr are drained concurrently; each stdout line publishes an
/// `info` message, each stderr line an `error` one, ordered per stream. A
/// clean run publishes one `success` message at the end.
pub async fn run_build(
    workdir: &Path,
    steps: &[&str],
    publisher: &LogPublisher,
) -> Result<(), WorkerError> {
    for step in steps {
        run_step(workdir, step, publisher).await?;
    }

    publisher.success("Build completed successfully").await?;
    info!("build completed");
    Ok(())
}

async fn run_step(workdir: &Path, step: &str, publisher: &LogPublisher) -> Result<(), WorkerError> {
    info!(step = %step, "running build step");

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(step)
        .current_dir(workdir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| WorkerError::BuildSpawn {
            step: step.to_owned(),
            message: e.to_string(),
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let mut stdout_reader = stdout.map(|s| BufReader::new(s).lines());
    let mut stderr_reader = stderr.map(|s| BufReader::new(s).lines());

    let mut stdout_done = stdout_reader.is_none();
    let mut stderr_done = stderr_reader.is_none();

    // Drain both streams concurrently; ordering holds per stream only.
    while !stdout_done || !stderr_done {
        tokio::select! {
            line = async {
                match stdout_reader.as_mut() {
                    Some(reader) => reader.next_line().await,
                    None => std::future::pending().await,
                }
            }, if !stdout_done => {
                match line {
                    Ok(Some(line)) => publisher.info(line).await?,
                    Ok(None) => stdout_done = true,
                    Err(e) => {
                        warn!(error = %e, "error reading build stdout");
                        stdout_done = true;
                    }
                }
            }
            line = async {
                match stderr_reader.as_mut() {
                    Some(reader) => reader.next_line().await,
                    None => std::future::pending().await,
                }
            }, if !stderr_done => {
                match line {
                    Ok(Some(line)) => publisher.error(line).await?,
                    Ok(None) => stderr_done = true,
                    Err(e) => {
                        warn!(error = %e, "error reading build stderr");
                        stderr_done = true;
                    }
                }
            }
        }
    }

    let status = child.wait().await?;

    if !status.success() {
        let exit_code = status.code().unwrap_or(-1);
        error!(step = %step, exit_code, "build step failed");
        return Err(WorkerError::BuildFailed { exit_code });
    }

    Ok(())
}
