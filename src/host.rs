//! Host classification.
//!
//! Computed once at startup and immutable afterwards: OS family, the
//! system package manager (Linux), and the CPU architecture (macOS cares,
//! because arm64 machines need Rosetta 2 before some tools will run).

use std::fmt;

use crate::error::{Result, RigError};
use crate::runner::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsFamily {
    MacOs,
    Linux,
    Unsupported(String),
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::MacOs => write!(f, "macOS"),
            OsFamily::Linux => write!(f, "Linux"),
            OsFamily::Unsupported(name) => write!(f, "unsupported ({})", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
}

impl PackageManager {
    /// Probe priority order; the first binary found on PATH wins.
    pub const PROBE_ORDER: [PackageManager; 5] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
    ];

    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
        }
    }

    /// Shell command installing a single package, non-interactively.
    pub fn install_command(&self, package: &str) -> String {
        match self {
            PackageManager::Apt => format!("sudo apt-get update -qq && sudo apt-get install -y {}", package),
            PackageManager::Dnf => format!("sudo dnf install -y {}", package),
            PackageManager::Yum => format!("sudo yum install -y {}", package),
            PackageManager::Pacman => format!("sudo pacman -S --noconfirm {}", package),
            PackageManager::Zypper => format!("sudo zypper install -y {}", package),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Arm64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86_64 => write!(f, "x86_64"),
            Arch::Arm64 => write!(f, "arm64"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HostProfile {
    pub os: OsFamily,
    pub package_manager: Option<PackageManager>,
    pub arch: Arch,
}

impl HostProfile {
    /// Classify the live host.
    pub fn detect(runner: &dyn CommandRunner) -> Self {
        classify(std::env::consts::OS, std::env::consts::ARCH, runner)
    }

    pub fn is_macos(&self) -> bool {
        self.os == OsFamily::MacOs
    }

    /// The package manager, or a descriptive error naming the missing
    /// capability. Callers on the Linux path must go through this.
    pub fn require_package_manager(&self) -> Result<PackageManager> {
        self.package_manager.ok_or_else(|| {
            RigError::MissingCapability(
                "no recognized system package manager (looked for apt-get, dnf, yum, pacman, zypper)"
                    .to_string(),
            )
        })
    }
}

/// Pure classification core, testable with scripted probes.
pub fn classify(os: &str, arch: &str, runner: &dyn CommandRunner) -> HostProfile {
    let os_family = match os.to_ascii_lowercase().as_str() {
        "macos" | "darwin" => OsFamily::MacOs,
        "linux" => OsFamily::Linux,
        other => OsFamily::Unsupported(other.to_string()),
    };

    let package_manager = if os_family == OsFamily::Linux {
        PackageManager::PROBE_ORDER
            .iter()
            .find(|pm| runner.which(pm.binary()).is_some())
            .copied()
    } else {
        None
    };

    let arch = match arch.to_ascii_lowercase().as_str() {
        "aarch64" | "arm64" => Arch::Arm64,
        _ => Arch::X86_64,
    };

    HostProfile {
        os: os_family,
        package_manager,
        arch,
    }
}
