pub mod commands;

use clap::{Parser, Subcommand};

use crate::error::Result;

#[derive(Parser)]
#[command(name = "rigup")]
#[command(version)]
#[command(about = "Provision a fresh workstation into a working dev environment")]
#[command(
    long_about = "Detects your platform, installs the baseline toolchain in dependency \
                  order, then optionally clones a repository and runs its setup script.\n\n\
                  Every step checks whether it already happened, so re-running is always safe."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install the baseline tools, then clone and set up a repository
    Provision {
        /// Repository to clone after provisioning (prompted once if omitted)
        #[arg(long, env = "RIGUP_REPO")]
        repo: Option<String>,

        /// Directory the repository is checked out under
        #[arg(long, env = "RIGUP_DIR")]
        dir: Option<String>,

        /// Branch to clone / keep checked out
        #[arg(long, env = "RIGUP_BRANCH")]
        branch: Option<String>,

        /// Node.js version the managed runtime is pinned to
        #[arg(long, env = "RIGUP_RUNTIME_VERSION")]
        runtime_version: Option<String>,
    },

    /// Show the host classification and what is already installed
    Doctor,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Provision {
                repo,
                dir,
                branch,
                runtime_version,
            } => commands::provision::execute(repo, dir, branch, runtime_version).await,
            Commands::Doctor => commands::doctor::execute().await,
        }
    }
}
