//! Linux installers (git via the system package manager, Docker via the
//! vendor convenience script).

use super::installer::Installer;
use crate::error::Result;

pub struct LinuxTools<'a> {
    installer: &'a Installer,
}

impl<'a> LinuxTools<'a> {
    pub fn new(installer: &'a Installer) -> Self {
        Self { installer }
    }

    /// Dispatches to the install command of whichever package manager the
    /// classifier found. No recognized manager is a `MissingCapability`.
    pub async fn install_git(&self) -> Result<()> {
        let manager = self.installer.profile.require_package_manager()?;
        self.installer
            .shell_ok("Git", &manager.install_command("git"))
            .await?;
        Ok(())
    }

    /// Vendor convenience script, then group membership for the invoking
    /// user, then service start. A host without systemd is tolerated; the
    /// daemon just has to be started by other means.
    pub async fn install_docker(&self) -> Result<()> {
        self.installer
            .shell_ok("Docker Engine", "curl -fsSL https://get.docker.com | sh")
            .await?;

        if let Err(e) = self
            .installer
            .shell_ok("docker group", "sudo usermod -aG docker \"$(id -un)\"")
            .await
        {
            tracing::warn!("could not add user to the docker group: {}", e);
        }

        if self.installer.runner.which("systemctl").is_some() {
            if let Err(e) = self
                .installer
                .shell_ok("docker service", "sudo systemctl enable --now docker")
                .await
            {
                tracing::warn!("could not enable the docker service: {}", e);
            }
        } else {
            tracing::info!("no systemctl on this host; skipping docker service setup");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ProvisionConfig;
    use crate::error::RigError;
    use crate::host::{Arch, HostProfile, OsFamily, PackageManager};
    use crate::runner::testing::ScriptedRunner;
    use crate::tools::Installer;

    fn linux_installer(
        runner: ScriptedRunner,
        manager: Option<PackageManager>,
    ) -> (Installer, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        let profile = HostProfile {
            os: OsFamily::Linux,
            package_manager: manager,
            arch: Arch::X86_64,
        };
        let config = ProvisionConfig::resolve(None, None, None, None).unwrap();
        (Installer::new(profile, config, runner.clone()), runner)
    }

    #[tokio::test]
    async fn git_install_uses_the_classified_manager() {
        let (installer, runner) =
            linux_installer(ScriptedRunner::new(), Some(PackageManager::Dnf));
        LinuxTools::new(&installer).install_git().await.unwrap();
        assert_eq!(runner.invocation_count("dnf install -y git"), 1);
        assert_eq!(runner.invocation_count("apt-get"), 0);
    }

    #[tokio::test]
    async fn git_install_without_manager_names_the_missing_capability() {
        let (installer, _) = linux_installer(ScriptedRunner::new(), None);
        let err = LinuxTools::new(&installer).install_git().await.unwrap_err();
        assert!(matches!(err, RigError::MissingCapability(_)));
        assert!(err.to_string().contains("package manager"));
    }

    #[tokio::test]
    async fn docker_install_runs_vendor_script_group_and_service() {
        let (installer, runner) = linux_installer(
            ScriptedRunner::new().with_binary("systemctl"),
            Some(PackageManager::Apt),
        );
        LinuxTools::new(&installer).install_docker().await.unwrap();

        assert_eq!(runner.invocation_count("get.docker.com"), 1);
        assert_eq!(runner.invocation_count("usermod -aG docker"), 1);
        assert_eq!(runner.invocation_count("systemctl enable --now docker"), 1);
    }

    #[tokio::test]
    async fn docker_install_tolerates_missing_service_manager() {
        let (installer, runner) =
            linux_installer(ScriptedRunner::new(), Some(PackageManager::Apt));
        LinuxTools::new(&installer).install_docker().await.unwrap();
        assert_eq!(runner.invocation_count("systemctl"), 0);
    }

    #[tokio::test]
    async fn docker_install_survives_group_failure() {
        let (installer, runner) = linux_installer(
            ScriptedRunner::new().failing("usermod"),
            Some(PackageManager::Apt),
        );
        LinuxTools::new(&installer).install_docker().await.unwrap();
        assert_eq!(runner.invocation_count("get.docker.com"), 1);
    }
}
