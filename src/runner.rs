//! Command execution seam.
//!
//! Every shell-out and host probe goes through [`CommandRunner`] so the
//! sequencer and installers can be exercised against a scripted host in
//! tests. [`SystemRunner`] is the real implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Result, RigError};

/// Captured result of one shell command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Stdout with surrounding whitespace trimmed.
    pub fn trimmed(&self) -> String {
        self.stdout.trim().to_string()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command line through `sh -c`, capturing output.
    async fn run_shell(&self, cmd: &str) -> Result<CommandOutput>;

    /// Resolve a binary on the current search path.
    fn which(&self, binary: &str) -> Option<PathBuf>;

    /// Whether a path exists on the host filesystem.
    fn path_exists(&self, path: &Path) -> bool;

    /// Read a file; `None` when it does not exist.
    fn read_file(&self, path: &Path) -> Result<Option<String>>;

    /// Write a file atomically (temp file + rename, never in-place).
    fn write_file_atomic(&self, path: &Path, contents: &str) -> Result<()>;

    /// The invoking user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Runs commands against the live host.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run_shell(&self, cmd: &str) -> Result<CommandOutput> {
        tracing::debug!(%cmd, "exec");
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .output()
            .await
            .map_err(RigError::Io)?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn which(&self, binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::fs::write(tmp.path(), contents)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}
