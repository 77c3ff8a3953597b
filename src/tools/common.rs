//! Cross-platform installers: the managed runtime (mise + pinned Node)
//! and the zsh customization.

use super::installer::Installer;
use crate::error::Result;
use crate::shellcfg;

pub(crate) const ZSH_THEME_LINE: &str = "ZSH_THEME=\"agnoster\"";
pub(crate) const LOCALE_MARKER: &str = "# rigup: locale";
const LOCALE_BLOCK: &str = "# rigup: locale\nexport LANG=en_US.UTF-8\nexport LC_ALL=en_US.UTF-8";

pub struct CommonTools<'a> {
    installer: &'a Installer,
}

impl<'a> CommonTools<'a> {
    pub fn new(installer: &'a Installer) -> Self {
        Self { installer }
    }

    /// Install the version manager when absent, then pin the runtime as
    /// the global default. The presence criterion is the active version,
    /// so a host with mise but the wrong Node still lands here.
    pub async fn install_runtime(&self) -> Result<()> {
        if self.installer.mise_binary().is_none() {
            self.installer
                .shell_ok("mise", "curl -fsSL https://mise.run | sh")
                .await?;
        }

        let mise = self
            .installer
            .mise_binary()
            .unwrap_or_else(|| "mise".to_string());
        let version = &self.installer.config.runtime_version;
        self.installer
            .shell_ok(
                "Node.js",
                &format!("{} use --global node@{}", mise, version),
            )
            .await?;
        Ok(())
    }

    /// oh-my-zsh plus theme and locale edits to `.zshrc`. The edits are
    /// pure transforms written back atomically; repeat runs change
    /// nothing.
    pub async fn install_shell_setup(&self) -> Result<()> {
        let home = self.installer.home()?;

        if !self.installer.runner.path_exists(&home.join(".oh-my-zsh")) {
            self.installer
                .shell_ok(
                    "oh-my-zsh",
                    "sh -c \"$(curl -fsSL https://raw.githubusercontent.com/ohmyzsh/ohmyzsh/master/tools/install.sh)\" \"\" --unattended",
                )
                .await?;
        }

        let theme_re = regex_lite::Regex::new(r#"^ZSH_THEME=.*"#)
            .map_err(|e| anyhow::anyhow!("theme pattern: {}", e))?;

        shellcfg::edit_file(
            self.installer.runner.as_ref(),
            &home.join(".zshrc"),
            |contents| {
                let with_theme =
                    shellcfg::replace_line_matching(contents, &theme_re, ZSH_THEME_LINE);
                // A zshrc without any theme line gets one appended.
                let with_theme =
                    shellcfg::append_block_if_absent(&with_theme, "ZSH_THEME", ZSH_THEME_LINE);
                shellcfg::append_block_if_absent(&with_theme, LOCALE_MARKER, LOCALE_BLOCK)
            },
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ProvisionConfig;
    use crate::host::{Arch, HostProfile, OsFamily, PackageManager};
    use crate::runner::testing::ScriptedRunner;
    use crate::tools::{Installer, ToolId};

    fn installer_with(runner: ScriptedRunner) -> (Installer, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        let profile = HostProfile {
            os: OsFamily::Linux,
            package_manager: Some(PackageManager::Apt),
            arch: Arch::X86_64,
        };
        let config = ProvisionConfig::resolve(None, None, None, None).unwrap();
        (Installer::new(profile, config, runner.clone()), runner)
    }

    #[tokio::test]
    async fn runtime_probe_compares_active_version_not_manager_presence() {
        // mise installed, but the active Node is not the pinned major.
        let (installer, _) = installer_with(
            ScriptedRunner::new()
                .with_binary("mise")
                .with_stdout("current node", "18.20.1"),
        );
        assert!(!installer.is_present(ToolId::Runtime).await);

        let (installer, _) = installer_with(
            ScriptedRunner::new()
                .with_binary("mise")
                .with_stdout("current node", "22.14.0"),
        );
        assert!(installer.is_present(ToolId::Runtime).await);
    }

    #[tokio::test]
    async fn runtime_probe_matches_whole_version_segments() {
        // Pinning major "2" must not accept an active 22.x.
        let runner = Arc::new(
            ScriptedRunner::new()
                .with_binary("mise")
                .with_stdout("current node", "22.1.0"),
        );
        let profile = HostProfile {
            os: OsFamily::Linux,
            package_manager: Some(PackageManager::Apt),
            arch: Arch::X86_64,
        };
        let config =
            ProvisionConfig::resolve(None, None, None, Some("2".to_string())).unwrap();
        let installer = Installer::new(profile, config, runner);
        assert!(!installer.is_present(ToolId::Runtime).await);
    }

    #[tokio::test]
    async fn runtime_install_skips_manager_bootstrap_when_present() {
        let (installer, runner) = installer_with(
            ScriptedRunner::new()
                .with_binary("mise")
                .with_stdout("current node", "18.20.1"),
        );
        CommonTools::new(&installer).install_runtime().await.unwrap();

        assert_eq!(runner.invocation_count("mise.run"), 0);
        assert_eq!(runner.invocation_count("use --global node@22"), 1);
    }

    #[tokio::test]
    async fn runtime_install_bootstraps_manager_when_absent() {
        let (installer, runner) =
            installer_with(ScriptedRunner::new().providing("mise.run", "mise"));
        CommonTools::new(&installer).install_runtime().await.unwrap();

        assert_eq!(runner.invocation_count("mise.run"), 1);
        assert_eq!(runner.invocation_count("use --global node@22"), 1);
    }

    #[tokio::test]
    async fn shell_setup_is_idempotent_on_zshrc() {
        let (installer, runner) = installer_with(
            ScriptedRunner::new()
                .with_path("/home/dev/.oh-my-zsh")
                .with_file("/home/dev/.zshrc", "ZSH_THEME=\"robbyrussell\"\nplugins=(git)\n"),
        );
        let tools = CommonTools::new(&installer);
        tools.install_shell_setup().await.unwrap();
        tools.install_shell_setup().await.unwrap();

        let zshrc = runner.file_contents("/home/dev/.zshrc").unwrap();
        assert_eq!(zshrc.matches("ZSH_THEME").count(), 1);
        assert_eq!(zshrc.matches(LOCALE_MARKER).count(), 1);
        assert!(zshrc.contains(ZSH_THEME_LINE));
        assert!(!zshrc.contains("robbyrussell"));
        assert!(zshrc.contains("plugins=(git)"));
    }

    #[tokio::test]
    async fn shell_setup_installs_oh_my_zsh_only_when_missing() {
        let (installer, runner) = installer_with(
            ScriptedRunner::new().providing_path("ohmyzsh", "/home/dev/.oh-my-zsh"),
        );
        let tools = CommonTools::new(&installer);
        tools.install_shell_setup().await.unwrap();
        tools.install_shell_setup().await.unwrap();

        assert_eq!(runner.invocation_count("ohmyzsh/master/tools/install.sh"), 1);
    }

    #[tokio::test]
    async fn shell_setup_presence_requires_both_edits() {
        let (installer, _) = installer_with(
            ScriptedRunner::new()
                .with_path("/home/dev/.oh-my-zsh")
                .with_file("/home/dev/.zshrc", "ZSH_THEME=\"agnoster\"\n"),
        );
        // Theme applied but locale block missing: not yet satisfied.
        assert!(!installer.is_present(ToolId::ShellSetup).await);
    }
}
