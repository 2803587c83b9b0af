// src/install/npm.rs

//! npm subprocess driver
//!
//! Runs `npm install` with the plan's arguments in the project directory.
//! stdout is passed straight through; stderr is echoed as it arrives and
//! also captured so a failure can carry it. The exit status is always
//! collected, even when stderr can't be read.

use super::PackageInstaller;
use super::plan::InstallPlan;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Installs plans by spawning npm
#[derive(Debug, Clone)]
pub struct NpmInstaller {
    program: PathBuf,
    working_dir: PathBuf,
}

impl NpmInstaller {
    /// Find `npm` on PATH
    pub fn locate(working_dir: &Path) -> Result<Self> {
        let program = which::which("npm")
            .map_err(|e| Error::ToolNotFound(format!("npm ({e})")))?;
        debug!("Using npm at {}", program.display());
        Ok(Self::with_program(program, working_dir))
    }

    /// Use an explicit executable
    pub fn with_program(program: impl Into<PathBuf>, working_dir: &Path) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.to_path_buf(),
        }
    }
}

#[async_trait]
impl PackageInstaller for NpmInstaller {
    fn command_line(&self, plan: &InstallPlan) -> String {
        std::iter::once("npm".to_string())
            .chain(plan.install_args())
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn install(&self, plan: &InstallPlan) -> Result<()> {
        let args = plan.install_args();
        info!("Running {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::CommandFailed(format!(
                    "Unable to run '{} {}': {e}",
                    self.program.display(),
                    args.join(" ")
                ))
            })?;

        // npm and install scripts may write in any encoding; decode lossily
        let mut captured = Vec::new();
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end_matches(['\n', '\r']);
                        eprintln!("{line}");
                        captured.push(line.to_string());
                    }
                    Err(e) => {
                        warn!("Stopped reading npm stderr: {}", e);
                        break;
                    }
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(Error::CommandFailed(format!(
                "npm install exited with {status}\n{}",
                captured.join("\n")
            )));
        }

        Ok(())
    }
}
