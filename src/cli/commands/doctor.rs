use std::sync::Arc;

use console::style;

use crate::config::ProvisionConfig;
use crate::error::{Result, RigError};
use crate::host::{HostProfile, OsFamily};
use crate::runner::{CommandRunner, SystemRunner};
use crate::tools::{registry, Installer};

/// Read-only host report: classification plus the presence probe of every
/// applicable tool. Mutates nothing.
pub async fn execute() -> Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let profile = HostProfile::detect(runner.as_ref());

    println!("{}", style("Host").bold());
    println!("  OS:              {}", profile.os);
    println!("  Architecture:    {}", profile.arch);
    match (&profile.os, profile.package_manager) {
        (OsFamily::Linux, Some(pm)) => println!("  Package manager: {}", pm),
        (OsFamily::Linux, None) => {
            println!("  Package manager: {}", style("none recognized").yellow())
        }
        _ => {}
    }

    if let OsFamily::Unsupported(name) = &profile.os {
        return Err(RigError::UnsupportedPlatform(name.clone()));
    }

    let config = ProvisionConfig::resolve(None, None, None, None)?;
    let installer = Installer::new(profile.clone(), config, runner);

    println!("\n{}", style("Tools").bold());
    for spec in registry(&profile) {
        let mark = if installer.is_present(spec.id).await {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {}", mark, spec.name);
    }

    Ok(())
}
