//! The tool registry.
//!
//! Each entry is declarative: identity, prerequisites, and failure policy.
//! The per-platform lists are hand-ordered so every tool appears after its
//! prerequisites; the sequencer walks them front to back (no dependency
//! solver, the lists are small).

mod common;
mod installer;
mod linux;
mod macos;

pub use installer::Installer;

use serde::Serialize;

use crate::host::{Arch, HostProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    DeveloperTools,
    Homebrew,
    Git,
    Rosetta,
    Docker,
    Runtime,
    ShellSetup,
    Browser,
    Terminal,
}

/// One installable capability. `fatal` controls whether a failed install
/// aborts the whole run or is downgraded to a warning.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub id: ToolId,
    pub name: &'static str,
    pub prerequisites: &'static [ToolId],
    pub fatal: bool,
}

const MACOS_TOOLS: &[ToolSpec] = &[
    ToolSpec {
        id: ToolId::DeveloperTools,
        name: "Xcode Command Line Tools",
        prerequisites: &[],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::Homebrew,
        name: "Homebrew",
        prerequisites: &[ToolId::DeveloperTools],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::Git,
        name: "Git",
        prerequisites: &[ToolId::DeveloperTools],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::Rosetta,
        name: "Rosetta 2",
        prerequisites: &[],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::Docker,
        name: "Docker Desktop",
        prerequisites: &[ToolId::Homebrew],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::Runtime,
        name: "Node.js (via mise)",
        prerequisites: &[],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::ShellSetup,
        name: "Zsh setup",
        prerequisites: &[],
        fatal: false,
    },
    ToolSpec {
        id: ToolId::Browser,
        name: "Google Chrome",
        prerequisites: &[ToolId::Homebrew],
        fatal: false,
    },
    ToolSpec {
        id: ToolId::Terminal,
        name: "iTerm2",
        prerequisites: &[ToolId::Homebrew],
        fatal: false,
    },
];

const LINUX_TOOLS: &[ToolSpec] = &[
    ToolSpec {
        id: ToolId::Git,
        name: "Git",
        prerequisites: &[],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::Docker,
        name: "Docker Engine",
        prerequisites: &[],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::Runtime,
        name: "Node.js (via mise)",
        prerequisites: &[],
        fatal: true,
    },
    ToolSpec {
        id: ToolId::ShellSetup,
        name: "Zsh setup",
        prerequisites: &[],
        fatal: false,
    },
];

/// The tools applicable to this host, in installation order.
pub fn registry(profile: &HostProfile) -> Vec<&'static ToolSpec> {
    if profile.is_macos() {
        MACOS_TOOLS
            .iter()
            // Rosetta only exists on Apple silicon; Intel Macs skip the
            // entry entirely rather than recording a no-op.
            .filter(|spec| spec.id != ToolId::Rosetta || profile.arch == Arch::Arm64)
            .collect()
    } else {
        LINUX_TOOLS.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostProfile, OsFamily, PackageManager};

    fn mac(arch: Arch) -> HostProfile {
        HostProfile {
            os: OsFamily::MacOs,
            package_manager: None,
            arch,
        }
    }

    fn linux() -> HostProfile {
        HostProfile {
            os: OsFamily::Linux,
            package_manager: Some(PackageManager::Apt),
            arch: Arch::X86_64,
        }
    }

    #[test]
    fn every_prerequisite_is_listed_earlier() {
        for tools in [MACOS_TOOLS, LINUX_TOOLS] {
            for (idx, spec) in tools.iter().enumerate() {
                for prereq in spec.prerequisites {
                    let pos = tools.iter().position(|s| s.id == *prereq);
                    assert!(
                        matches!(pos, Some(p) if p < idx),
                        "{:?} must come after its prerequisite {:?}",
                        spec.id,
                        prereq
                    );
                }
            }
        }
    }

    #[test]
    fn rosetta_only_on_apple_silicon() {
        let arm = registry(&mac(Arch::Arm64));
        assert!(arm.iter().any(|s| s.id == ToolId::Rosetta));

        let intel = registry(&mac(Arch::X86_64));
        assert!(!intel.iter().any(|s| s.id == ToolId::Rosetta));
    }

    #[test]
    fn linux_registry_has_no_desktop_tools() {
        let tools = registry(&linux());
        assert!(!tools.iter().any(|s| s.id == ToolId::Browser));
        assert!(!tools.iter().any(|s| s.id == ToolId::Homebrew));
        assert!(tools.iter().any(|s| s.id == ToolId::Docker));
    }

    #[test]
    fn desktop_integration_is_best_effort() {
        for spec in MACOS_TOOLS {
            match spec.id {
                ToolId::ShellSetup | ToolId::Browser | ToolId::Terminal => {
                    assert!(!spec.fatal, "{:?} should be best-effort", spec.id)
                }
                _ => assert!(spec.fatal, "{:?} should be fatal", spec.id),
            }
        }
    }
}
