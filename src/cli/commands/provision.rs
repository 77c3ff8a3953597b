use std::sync::Arc;

use console::style;
use dialoguer::Input;

use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::host::HostProfile;
use crate::repo::RepoTarget;
use crate::runner::{CommandRunner, SystemRunner};
use crate::sequencer::Sequencer;

pub async fn execute(
    repo: Option<String>,
    dir: Option<String>,
    branch: Option<String>,
    runtime_version: Option<String>,
) -> Result<()> {
    let config = ProvisionConfig::resolve(repo, dir, branch, runtime_version)?;
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let profile = HostProfile::detect(runner.as_ref());

    let sequencer = Sequencer::new(profile, config, runner);
    sequencer.run(resolve_repo_target).await?;

    println!(
        "\n{} Provisioning complete.",
        style("✓").green().bold()
    );

    Ok(())
}

/// Resolve the optional repository target, prompting exactly once when no
/// URL was configured and the session is interactive. An empty answer
/// skips the repo phase. The sequencer calls this after the tool phase,
/// so an aborted run never prompts.
fn resolve_repo_target(config: &ProvisionConfig) -> Result<Option<RepoTarget>> {
    let url = match &config.repo_url {
        Some(url) => Some(url.clone()),
        None if console::user_attended() => {
            let answer: String = Input::new()
                .with_prompt("Repository to clone (blank to skip)")
                .allow_empty(true)
                .interact_text()?;
            let answer = answer.trim().to_string();
            if answer.is_empty() {
                None
            } else {
                Some(answer)
            }
        }
        None => None,
    };

    Ok(url.map(|u| RepoTarget::resolve(config, u)))
}
