//! Orchestration sequencer.
//!
//! Drives the tool registry in declared order for the classified
//! platform, then hands off to the repository bootstrapper. States:
//! Init -> ClassifyEnv -> InstallTools -> SetupRepo -> Done, with
//! Aborted reachable from ClassifyEnv (unsupported platform) and
//! InstallTools (fatal tool failure). Strictly sequential: no step starts
//! before the previous outcome is known.

use std::sync::Arc;

use console::style;

use crate::config::ProvisionConfig;
use crate::error::{Result, RigError};
use crate::host::{HostProfile, OsFamily};
use crate::outcome::{InstallOutcome, RunReport};
use crate::repo::{self, RepoTarget};
use crate::runner::CommandRunner;
use crate::tools::{registry, Installer, ToolSpec};

pub struct Sequencer {
    profile: HostProfile,
    config: ProvisionConfig,
    installer: Installer,
    runner: Arc<dyn CommandRunner>,
}

impl Sequencer {
    pub fn new(
        profile: HostProfile,
        config: ProvisionConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let installer = Installer::new(profile.clone(), config.clone(), runner.clone());
        Self {
            profile,
            config,
            installer,
            runner,
        }
    }

    /// The full provisioning run. `Ok` corresponds to the Done state
    /// (exit 0), `Err` to Aborted (non-zero), and every `Err` is preceded
    /// by an error line naming the failing step.
    ///
    /// `resolve_target` supplies the optional repository target (this is
    /// where the CLI hangs its one interactive prompt). It is called at
    /// the SetupRepo transition, never earlier: an aborted tool phase
    /// must not prompt anyone for a repository.
    pub async fn run<F>(&self, resolve_target: F) -> Result<RunReport>
    where
        F: FnOnce(&ProvisionConfig) -> Result<Option<RepoTarget>>,
    {
        let mut report = RunReport {
            started_at: Some(chrono::Utc::now()),
            ..Default::default()
        };

        // ClassifyEnv
        if let OsFamily::Unsupported(name) = &self.profile.os {
            let err = RigError::UnsupportedPlatform(name.clone());
            eprintln!("{} {}", style("✗").red(), err);
            return Err(err);
        }
        println!(
            "{} Provisioning {} ({}{})",
            style("→").cyan(),
            self.profile.os,
            self.profile.arch,
            self.profile
                .package_manager
                .map(|pm| format!(", {}", pm))
                .unwrap_or_default(),
        );

        // InstallTools + SetupRepo; the aggregated report is printed on
        // the Done and Aborted paths alike.
        let result = self.drive(resolve_target, &mut report).await;
        self.print_summary(&report);
        result?;

        report.completed_at = Some(chrono::Utc::now());
        Ok(report)
    }

    async fn drive<F>(&self, resolve_target: F, report: &mut RunReport) -> Result<()>
    where
        F: FnOnce(&ProvisionConfig) -> Result<Option<RepoTarget>>,
    {
        let tools = registry(&self.profile);
        self.install_tools(&tools, report).await?;

        // SetupRepo (unconditional; a missing target is a no-op)
        match resolve_target(&self.config)? {
            Some(target) => {
                println!(
                    "{} Setting up repository {}",
                    style("→").cyan(),
                    style(&target.url).bold()
                );
                repo::bootstrap(&target, self.runner.as_ref())
                    .await
                    .inspect_err(|e| eprintln!("{} {}", style("✗").red(), e))?;
            }
            None => tracing::info!("no repository target supplied; skipping repo setup"),
        }

        Ok(())
    }

    async fn install_tools(
        &self,
        tools: &[&'static ToolSpec],
        report: &mut RunReport,
    ) -> Result<()> {
        for spec in tools {
            self.run_tool(spec, tools, report).await?;
        }
        Ok(())
    }

    async fn run_tool(
        &self,
        spec: &ToolSpec,
        tools: &[&'static ToolSpec],
        report: &mut RunReport,
    ) -> Result<()> {
        // Prerequisite gate: only AlreadyPresent/Installed satisfy.
        let unsatisfied = spec.prerequisites.iter().find(|p| {
            !report
                .outcome_of(**p)
                .is_some_and(|o| o.satisfies_prerequisite())
        });
        if let Some(prereq) = unsatisfied {
            let prereq_name = tools
                .iter()
                .find(|s| s.id == *prereq)
                .map(|s| s.name)
                .unwrap_or("unknown");
            let reason = format!("prerequisite '{}' not satisfied", prereq_name);
            report.record(spec.id, spec.name, InstallOutcome::Skipped {
                reason: reason.clone(),
            });

            if spec.fatal {
                let err = RigError::PrerequisiteNotSatisfied {
                    tool: spec.name.to_string(),
                    prerequisite: prereq_name.to_string(),
                };
                eprintln!("{} {}", style("✗").red(), err);
                return Err(err);
            }
            println!("{} {}: skipped ({})", style("⚠").yellow(), spec.name, reason);
            return Ok(());
        }

        if self.installer.is_present(spec.id).await {
            report.record(spec.id, spec.name, InstallOutcome::AlreadyPresent);
            println!("{} {} already installed", style("✓").green(), spec.name);
            return Ok(());
        }

        println!("{} Installing {}...", style("→").cyan(), spec.name);
        match self.installer.install(spec).await {
            Ok(()) => {
                report.record(spec.id, spec.name, InstallOutcome::Installed);
                println!("{} {} installed", style("✓").green(), spec.name);
                Ok(())
            }
            Err(e) => {
                report.record(spec.id, spec.name, InstallOutcome::Failed {
                    cause: e.to_string(),
                });
                if spec.fatal {
                    eprintln!("{} {}", style("✗").red(), e);
                    Err(e)
                } else {
                    tracing::warn!("{} failed (best-effort): {}", spec.name, e);
                    println!(
                        "{} {} failed (continuing): {}",
                        style("⚠").yellow(),
                        spec.name,
                        e
                    );
                    Ok(())
                }
            }
        }
    }

    /// One aggregated line plus a detail line per failure. Printed on
    /// both the Done and the Aborted path.
    fn print_summary(&self, report: &RunReport) {
        if report.tools.is_empty() {
            return;
        }

        let count = |pred: fn(&InstallOutcome) -> bool| {
            report.tools.iter().filter(|t| pred(&t.outcome)).count()
        };
        println!(
            "\n{} {} installed, {} already present, {} skipped, {} failed",
            style("Summary:").bold(),
            count(|o| matches!(o, InstallOutcome::Installed)),
            count(|o| matches!(o, InstallOutcome::AlreadyPresent)),
            count(|o| matches!(o, InstallOutcome::Skipped { .. })),
            count(|o| matches!(o, InstallOutcome::Failed { .. })),
        );
        for tool in &report.tools {
            if let InstallOutcome::Failed { cause } = &tool.outcome {
                println!("  {} {}: {}", style("✗").red(), tool.name, cause);
            }
        }
    }
}
