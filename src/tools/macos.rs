//! macOS installers (Command Line Tools, Homebrew, Rosetta, Docker
//! Desktop, Chrome, iTerm2, dock and default-browser integration).

use std::path::PathBuf;

use anyhow::anyhow;

use super::installer::Installer;
use crate::error::{Result, RigError};
use crate::shellcfg;

const CLT_TRIGGER: &str = "/tmp/.com.apple.dt.CommandLineTools.installondemand.in-progress";
const BREW_SHELLENV_MARKER: &str = "brew shellenv";

pub struct MacTools<'a> {
    installer: &'a Installer,
}

impl<'a> MacTools<'a> {
    pub fn new(installer: &'a Installer) -> Self {
        Self { installer }
    }

    /// Unattended Command Line Tools install via softwareupdate. When no
    /// package label can be found, falls back to the interactive
    /// `xcode-select --install` dialog and reports that manual completion
    /// is required instead of hanging on the GUI.
    pub async fn install_developer_tools(&self) -> Result<()> {
        // The trigger file makes softwareupdate list the CLT package.
        self.installer
            .shell(&format!("touch {}", CLT_TRIGGER))
            .await?;

        let label = self
            .installer
            .shell(
                "softwareupdate -l 2>/dev/null | \
                 grep -o 'Label: Command Line Tools[^\\n]*' | tail -1 | sed 's/^Label: //'",
            )
            .await?
            .trimmed();

        let result = if label.is_empty() {
            self.installer.shell("xcode-select --install").await.ok();
            Err(RigError::ManualInterventionRequired {
                tool: "Xcode Command Line Tools".to_string(),
                instructions: "softwareupdate found no Command Line Tools package. \
                               An interactive installer dialog was opened; complete it, \
                               then re-run rigup."
                    .to_string(),
            })
        } else {
            self.installer
                .shell_ok(
                    "Xcode Command Line Tools",
                    &format!("softwareupdate -i \"{}\" --verbose", label),
                )
                .await
                .map(|_| ())
        };

        self.installer
            .shell(&format!("rm -f {}", CLT_TRIGGER))
            .await
            .ok();
        result
    }

    /// Official Homebrew installer, non-interactive. A pre-existing
    /// installation at a known prefix is registered on the search path
    /// (zprofile shellenv line) rather than reinstalled.
    pub async fn install_homebrew(&self) -> Result<()> {
        if self.installer.brew_binary().is_none() {
            self.installer
                .shell_ok(
                    "Homebrew",
                    "NONINTERACTIVE=1 /bin/bash -c \
                     \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\"",
                )
                .await?;
        }

        let brew = self.installer.brew_binary().ok_or_else(|| {
            RigError::InstallationFailed {
                tool: "Homebrew".to_string(),
                source: anyhow!("brew not found at any known prefix after install"),
            }
        })?;

        // Register brew for future shells; repeat runs find the marker.
        if brew != "brew" {
            let zprofile = self.installer.home()?.join(".zprofile");
            shellcfg::edit_file(self.installer.runner.as_ref(), &zprofile, |contents| {
                shellcfg::append_block_if_absent(
                    contents,
                    BREW_SHELLENV_MARKER,
                    &format!("eval \"$({} shellenv)\"", brew),
                )
            })?;
        }

        Ok(())
    }

    /// Git normally arrives with the Command Line Tools; brew is the
    /// fallback when it did not.
    pub async fn install_git(&self) -> Result<()> {
        if self.installer.runner.which("git").is_some() {
            return Ok(());
        }
        let brew = self.require_brew("Git")?;
        self.installer
            .shell_ok("Git", &format!("{} install git", brew))
            .await?;
        Ok(())
    }

    pub async fn install_rosetta(&self) -> Result<()> {
        self.installer
            .shell_ok(
                "Rosetta 2",
                "softwareupdate --install-rosetta --agree-to-license",
            )
            .await?;
        Ok(())
    }

    /// Docker Desktop via brew cask, then launch and poll readiness.
    /// Poll exhaustion is a warning, not a failure: the app is installed,
    /// the daemon just is not responsive yet.
    pub async fn install_docker(&self) -> Result<()> {
        let brew = self.require_brew("Docker Desktop")?;
        self.installer
            .shell_ok("Docker Desktop", &format!("{} install --cask docker", brew))
            .await?;

        self.installer.shell("open -ga Docker").await.ok();

        if !self.installer.wait_for_docker_ready().await {
            tracing::warn!(
                "Docker Desktop installed but not responsive yet; \
                 it may still be starting up"
            );
        }

        Ok(())
    }

    /// Three independently idempotent effects: the app bundle, the
    /// default-browser assignment, and the dock entry. The latter two are
    /// cosmetic; their failures are logged, never fatal.
    pub async fn install_browser(&self) -> Result<()> {
        let app = PathBuf::from("/Applications/Google Chrome.app");
        if !self.installer.runner.path_exists(&app) {
            let brew = self.require_brew("Google Chrome")?;
            self.installer
                .shell_ok(
                    "Google Chrome",
                    &format!("{} install --cask google-chrome", brew),
                )
                .await?;
        }

        if let Err(e) = self.ensure_default_browser().await {
            tracing::warn!("could not set default browser: {}", e);
        }
        if let Err(e) = self.ensure_dock_entry("Google Chrome").await {
            tracing::warn!("could not add Chrome to the dock: {}", e);
        }

        Ok(())
    }

    pub async fn install_terminal(&self) -> Result<()> {
        let app = PathBuf::from("/Applications/iTerm.app");
        if !self.installer.runner.path_exists(&app) {
            let brew = self.require_brew("iTerm2")?;
            self.installer
                .shell_ok("iTerm2", &format!("{} install --cask iterm2", brew))
                .await?;
        }

        if let Err(e) = self.ensure_dock_entry("iTerm").await {
            tracing::warn!("could not add iTerm to the dock: {}", e);
        }

        Ok(())
    }

    async fn ensure_default_browser(&self) -> Result<()> {
        if self.installer.runner.which("defaultbrowser").is_none() {
            let brew = self.require_brew("defaultbrowser helper")?;
            self.installer
                .shell_ok(
                    "defaultbrowser helper",
                    &format!("{} install defaultbrowser", brew),
                )
                .await?;
        }

        // `defaultbrowser` marks the current default with an asterisk.
        let current = self
            .installer
            .shell("defaultbrowser | grep '^\\*' || true")
            .await?
            .trimmed();
        if current.contains("chrome") {
            return Ok(());
        }

        self.installer
            .shell_ok("default browser", "defaultbrowser chrome")
            .await?;
        Ok(())
    }

    /// Adds an app to the dock only when the dock plist does not already
    /// mention it, so repeat runs never create duplicate entries.
    async fn ensure_dock_entry(&self, app_name: &str) -> Result<()> {
        let already = self
            .installer
            .shell_succeeds(&format!(
                "defaults read com.apple.dock persistent-apps | grep -q '{}'",
                app_name
            ))
            .await;
        if already {
            return Ok(());
        }

        let entry = format!(
            "<dict><key>tile-data</key><dict><key>file-data</key><dict>\
             <key>_CFURLString</key><string>/Applications/{}.app</string>\
             <key>_CFURLStringType</key><integer>0</integer>\
             </dict></dict></dict>",
            app_name
        );
        self.installer
            .shell_ok(
                "dock entry",
                &format!(
                    "defaults write com.apple.dock persistent-apps -array-add '{}' && killall Dock",
                    entry
                ),
            )
            .await?;
        Ok(())
    }

    fn require_brew(&self, tool: &str) -> Result<String> {
        self.installer
            .brew_binary()
            .ok_or_else(|| RigError::InstallationFailed {
                tool: tool.to_string(),
                source: anyhow!("Homebrew is not available"),
            })
    }
}
