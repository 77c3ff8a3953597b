//! Run configuration.
//!
//! The entire configuration surface is four settings, each overridable
//! via environment variable (wired through clap's `env` attribute in the
//! CLI layer). There is no config file. Resolved once at startup and
//! immutable for the run.

use std::path::PathBuf;

use crate::error::{Result, RigError};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_RUNTIME_VERSION: &str = "22";
const DEFAULT_DIR: &str = "~/dev";

#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Repository to clone after the tool phase. `None` means prompt once
    /// (interactive) or skip the repo phase entirely.
    pub repo_url: Option<String>,
    /// Directory under which the repository is checked out.
    pub install_dir: PathBuf,
    /// Branch to clone / keep checked out.
    pub branch: String,
    /// Pinned Node.js version the managed runtime must end up on.
    pub runtime_version: String,
}

impl ProvisionConfig {
    pub fn resolve(
        repo_url: Option<String>,
        dir: Option<String>,
        branch: Option<String>,
        runtime_version: Option<String>,
    ) -> Result<Self> {
        let dir = dir.unwrap_or_else(|| DEFAULT_DIR.to_string());
        let install_dir = PathBuf::from(shellexpand::tilde(&dir).to_string());
        if install_dir.as_os_str().is_empty() {
            return Err(RigError::Config("install directory is empty".to_string()));
        }

        Ok(Self {
            repo_url: repo_url.filter(|u| !u.trim().is_empty()),
            install_dir,
            branch: branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            runtime_version: runtime_version
                .unwrap_or_else(|| DEFAULT_RUNTIME_VERSION.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_when_nothing_supplied() {
        let config = ProvisionConfig::resolve(None, None, None, None).unwrap();
        assert_eq!(config.branch, "main");
        assert_eq!(config.runtime_version, "22");
        assert!(config.repo_url.is_none());
        assert!(config.install_dir.ends_with("dev"));
    }

    #[test]
    fn tilde_is_expanded() {
        let config =
            ProvisionConfig::resolve(None, Some("~/work".to_string()), None, None).unwrap();
        assert!(!config.install_dir.to_string_lossy().contains('~'));
        assert!(config.install_dir.ends_with("work"));
    }

    #[test]
    fn blank_repo_url_treated_as_absent() {
        let config =
            ProvisionConfig::resolve(Some("   ".to_string()), None, None, None).unwrap();
        assert!(config.repo_url.is_none());
    }

    #[test]
    fn explicit_values_survive() {
        let config = ProvisionConfig::resolve(
            Some("git@github.com:acme/app.git".to_string()),
            Some("/opt/src".to_string()),
            Some("develop".to_string()),
            Some("20".to_string()),
        )
        .unwrap();
        assert_eq!(config.repo_url.as_deref(), Some("git@github.com:acme/app.git"));
        assert_eq!(config.install_dir, PathBuf::from("/opt/src"));
        assert_eq!(config.branch, "develop");
        assert_eq!(config.runtime_version, "20");
    }
}
