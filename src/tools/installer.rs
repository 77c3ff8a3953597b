//! Installer - presence probes and install dispatch for every tool.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use super::common::CommonTools;
use super::linux::LinuxTools;
use super::macos::MacTools;
use super::{ToolId, ToolSpec};
use crate::config::ProvisionConfig;
use crate::error::{Result, RigError};
use crate::host::HostProfile;
use crate::runner::{CommandOutput, CommandRunner};

/// Bounded readiness poll for the container runtime (macOS).
pub(crate) const READINESS_ATTEMPTS: u32 = 30;
pub(crate) const READINESS_INTERVAL: Duration = Duration::from_secs(2);

pub struct Installer {
    pub(crate) profile: HostProfile,
    pub(crate) config: ProvisionConfig,
    pub(crate) runner: Arc<dyn CommandRunner>,
}

impl Installer {
    pub fn new(
        profile: HostProfile,
        config: ProvisionConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            profile,
            config,
            runner,
        }
    }

    /// Side-effect-free probe: does the tool's success criterion already
    /// hold on the host? Reflects host state, never run state.
    pub async fn is_present(&self, id: ToolId) -> bool {
        match id {
            ToolId::DeveloperTools => self.shell_succeeds("xcode-select -p").await,
            // PATH visibility only. A brew sitting at a known prefix
            // without being on PATH is not "present": the install path
            // registers it instead of reinstalling.
            ToolId::Homebrew => self.runner.which("brew").is_some(),
            ToolId::Rosetta => self.shell_succeeds("pgrep -q oahd").await,
            ToolId::Git => self.runner.which("git").is_some(),
            ToolId::Docker => {
                if self.profile.is_macos() {
                    self.runner
                        .path_exists(PathBuf::from("/Applications/Docker.app").as_path())
                } else {
                    self.runner.which("docker").is_some()
                }
            }
            ToolId::Runtime => self.runtime_at_pinned_version().await,
            ToolId::ShellSetup => self.shell_setup_applied(),
            ToolId::Browser => self
                .runner
                .path_exists(PathBuf::from("/Applications/Google Chrome.app").as_path()),
            ToolId::Terminal => self
                .runner
                .path_exists(PathBuf::from("/Applications/iTerm.app").as_path()),
        }
    }

    /// Run the tool's install procedure, then re-validate its presence
    /// criterion before declaring success.
    pub async fn install(&self, spec: &ToolSpec) -> Result<()> {
        match spec.id {
            ToolId::DeveloperTools => MacTools::new(self).install_developer_tools().await?,
            ToolId::Homebrew => MacTools::new(self).install_homebrew().await?,
            ToolId::Rosetta => MacTools::new(self).install_rosetta().await?,
            ToolId::Git => {
                if self.profile.is_macos() {
                    MacTools::new(self).install_git().await?
                } else {
                    LinuxTools::new(self).install_git().await?
                }
            }
            ToolId::Docker => {
                if self.profile.is_macos() {
                    MacTools::new(self).install_docker().await?
                } else {
                    LinuxTools::new(self).install_docker().await?
                }
            }
            ToolId::Runtime => CommonTools::new(self).install_runtime().await?,
            ToolId::ShellSetup => CommonTools::new(self).install_shell_setup().await?,
            ToolId::Browser => MacTools::new(self).install_browser().await?,
            ToolId::Terminal => MacTools::new(self).install_terminal().await?,
        }

        let satisfied = match spec.id {
            // Registration makes brew reachable for future shells; the
            // current process PATH may still not see it.
            ToolId::Homebrew => self.brew_binary().is_some(),
            _ => self.is_present(spec.id).await,
        };
        if satisfied {
            Ok(())
        } else {
            Err(RigError::InstallationFailed {
                tool: spec.name.to_string(),
                source: anyhow!("presence check still fails after installation"),
            })
        }
    }

    // ---- helpers shared by the platform installers ----

    pub(crate) async fn shell(&self, cmd: &str) -> Result<CommandOutput> {
        self.runner.run_shell(cmd).await
    }

    pub(crate) async fn shell_succeeds(&self, cmd: &str) -> bool {
        matches!(self.runner.run_shell(cmd).await, Ok(out) if out.success)
    }

    /// Run a command, mapping failure to `InstallationFailed` for `tool`.
    pub(crate) async fn shell_ok(&self, tool: &str, cmd: &str) -> Result<CommandOutput> {
        let out = self.runner.run_shell(cmd).await?;
        if out.success {
            Ok(out)
        } else {
            Err(RigError::InstallationFailed {
                tool: tool.to_string(),
                source: anyhow!("`{}` failed: {}", cmd, out.stderr.trim()),
            })
        }
    }

    pub(crate) fn home(&self) -> Result<PathBuf> {
        self.runner
            .home_dir()
            .ok_or_else(|| RigError::Config("cannot determine home directory".to_string()))
    }

    /// The brew binary: on PATH, or at a known prefix even when the shell
    /// environment does not expose it yet.
    pub(crate) fn brew_binary(&self) -> Option<String> {
        if self.runner.which("brew").is_some() {
            return Some("brew".to_string());
        }
        for prefix in ["/opt/homebrew/bin/brew", "/usr/local/bin/brew"] {
            if self.runner.path_exists(PathBuf::from(prefix).as_path()) {
                return Some(prefix.to_string());
            }
        }
        None
    }

    /// The mise binary: on PATH, or at its default user-space location.
    pub(crate) fn mise_binary(&self) -> Option<String> {
        if self.runner.which("mise").is_some() {
            return Some("mise".to_string());
        }
        let local = self.home().ok()?.join(".local/bin/mise");
        if self.runner.path_exists(&local) {
            return Some(local.to_string_lossy().to_string());
        }
        None
    }

    /// Active-version check: the manager being installed is not enough,
    /// the pinned runtime version must be the active one.
    async fn runtime_at_pinned_version(&self) -> bool {
        let Some(mise) = self.mise_binary() else {
            return false;
        };
        match self.shell(&format!("{} current node", mise)).await {
            Ok(out) if out.success => {
                runtime_version_matches(&out.trimmed(), &self.config.runtime_version)
            }
            _ => false,
        }
    }

    fn shell_setup_applied(&self) -> bool {
        let Ok(home) = self.home() else { return false };
        if !self.runner.path_exists(&home.join(".oh-my-zsh")) {
            return false;
        }
        match self.runner.read_file(&home.join(".zshrc")) {
            Ok(Some(contents)) => {
                contents.contains(super::common::ZSH_THEME_LINE)
                    && contents.contains(super::common::LOCALE_MARKER)
            }
            _ => false,
        }
    }

    /// Poll the container runtime's readiness endpoint with a bounded
    /// retry count. Exhaustion is a timeout, not an error.
    pub(crate) async fn wait_for_docker_ready(&self) -> bool {
        let spinner = indicatif::ProgressBar::new_spinner();
        spinner.set_message("Waiting for Docker to become responsive...");
        spinner.enable_steady_tick(Duration::from_millis(120));

        for attempt in 0..READINESS_ATTEMPTS {
            if self.shell_succeeds("docker info >/dev/null 2>&1").await {
                spinner.finish_and_clear();
                return true;
            }
            tracing::debug!(attempt, "docker not ready yet");
            tokio::time::sleep(READINESS_INTERVAL).await;
        }

        spinner.finish_and_clear();
        false
    }
}

/// Whether the active runtime version satisfies the pinned one. The pin
/// must match whole version segments: pinning "22" accepts "22" and
/// "22.14.0" but not "220.1.0", and pinning "2" never accepts "22.x".
pub(crate) fn runtime_version_matches(active: &str, pinned: &str) -> bool {
    !active.is_empty()
        && (active == pinned || active.starts_with(&format!("{}.", pinned)))
}

#[cfg(test)]
mod tests {
    use super::runtime_version_matches;

    #[test]
    fn pin_matches_whole_segments_only() {
        assert!(runtime_version_matches("22.14.0", "22"));
        assert!(runtime_version_matches("22", "22"));
        assert!(runtime_version_matches("22.14.0", "22.14"));

        assert!(!runtime_version_matches("22.14.0", "2"));
        assert!(!runtime_version_matches("220.1.0", "22"));
        assert!(!runtime_version_matches("22.140.1", "22.14"));
        assert!(!runtime_version_matches("", "22"));
    }
}
