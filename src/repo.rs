//! Repository bootstrapper.
//!
//! Runs after the tool phase: clone the target repository (or update an
//! existing checkout of it), then hand off to the repository's own
//! `setup.sh` when it has one. A directory at the target path that is not
//! a git checkout is a configuration error, reported distinctly from
//! clone failures.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use console::style;

use crate::config::ProvisionConfig;
use crate::error::{Result, RigError};
use crate::runner::CommandRunner;

/// Fixed-path setup script looked for inside the checkout.
const SETUP_SCRIPT: &str = "setup.sh";

/// Resolved once at the end of the tool phase, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RepoTarget {
    pub url: String,
    pub dir: PathBuf,
    pub branch: String,
}

impl RepoTarget {
    pub fn resolve(config: &ProvisionConfig, url: String) -> Self {
        let dir = config.install_dir.join(repo_name(&url));
        Self {
            url,
            dir,
            branch: config.branch.clone(),
        }
    }
}

/// The checkout directory name implied by a clone URL.
fn repo_name(url: &str) -> String {
    let tail = url
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(url);
    tail.to_string()
}

/// Clone or update the target, then run its setup script if present.
pub async fn bootstrap(target: &RepoTarget, runner: &dyn CommandRunner) -> Result<()> {
    if !runner.path_exists(&target.dir) {
        fresh_clone(target, runner).await?;
    } else if runner.path_exists(&target.dir.join(".git")) {
        update_checkout(target, runner).await?;
    } else {
        return Err(RigError::PathCollision(target.dir.clone()));
    }

    run_setup_script(&target.dir, runner).await
}

async fn fresh_clone(target: &RepoTarget, runner: &dyn CommandRunner) -> Result<()> {
    let parent = target
        .dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let cmd = format!(
        "mkdir -p '{}' && git clone --branch '{}' '{}' '{}'",
        parent.display(),
        target.branch,
        target.url,
        target.dir.display()
    );
    let out = runner.run_shell(&cmd).await?;
    if !out.success {
        return Err(RigError::NetworkOrAuth(out.stderr.trim().to_string()));
    }
    tracing::info!(url = %target.url, dir = %target.dir.display(), "cloned repository");
    Ok(())
}

/// Fetch + checkout + pull of the exact configured branch. Cross-branch
/// merges and detached-HEAD recovery are out of scope.
async fn update_checkout(target: &RepoTarget, runner: &dyn CommandRunner) -> Result<()> {
    let dir = target.dir.display();
    let cmd = format!(
        "git -C '{dir}' fetch origin && \
         git -C '{dir}' checkout '{branch}' && \
         git -C '{dir}' pull origin '{branch}'",
        dir = dir,
        branch = target.branch
    );
    let out = runner.run_shell(&cmd).await?;
    if !out.success {
        return Err(RigError::NetworkOrAuth(out.stderr.trim().to_string()));
    }
    tracing::info!(dir = %target.dir.display(), branch = %target.branch, "updated checkout");
    Ok(())
}

async fn run_setup_script(dir: &Path, runner: &dyn CommandRunner) -> Result<()> {
    let script = dir.join(SETUP_SCRIPT);
    if !runner.path_exists(&script) {
        tracing::info!(dir = %dir.display(), "no {} in checkout; nothing to hand off to", SETUP_SCRIPT);
        return Ok(());
    }

    println!(
        "{} Running {} from the checkout",
        style("→").cyan(),
        SETUP_SCRIPT
    );
    let cmd = format!(
        "cd '{}' && chmod +x {script} && ./{script}",
        dir.display(),
        script = SETUP_SCRIPT
    );
    let out = runner.run_shell(&cmd).await?;
    if !out.success {
        return Err(RigError::InstallationFailed {
            tool: "repository setup script".to_string(),
            source: anyhow!("{} exited non-zero: {}", SETUP_SCRIPT, out.stderr.trim()),
        });
    }
    Ok(())
}
