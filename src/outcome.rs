//! Per-tool outcomes and the aggregated run report.

use serde::Serialize;

use crate::tools::ToolId;

/// Result of one tool's pass through the sequencer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    /// Presence probe held before any work was done.
    AlreadyPresent,
    /// Installer ran and re-validated its presence criterion.
    Installed,
    /// Not attempted (unsatisfied prerequisite, or not applicable).
    Skipped { reason: String },
    /// Installer ran and failed.
    Failed { cause: String },
}

impl InstallOutcome {
    /// Whether this outcome satisfies a dependent tool's prerequisite.
    pub fn satisfies_prerequisite(&self) -> bool {
        matches!(self, InstallOutcome::AlreadyPresent | InstallOutcome::Installed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolReport {
    pub id: ToolId,
    pub name: &'static str,
    pub outcome: InstallOutcome,
}

/// Everything that happened during one provisioning run.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RunReport {
    pub tools: Vec<ToolReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl RunReport {
    pub fn record(&mut self, id: ToolId, name: &'static str, outcome: InstallOutcome) {
        self.tools.push(ToolReport { id, name, outcome });
    }

    pub fn outcome_of(&self, id: ToolId) -> Option<&InstallOutcome> {
        self.tools.iter().find(|t| t.id == id).map(|t| &t.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&InstallOutcome::AlreadyPresent).unwrap(),
            "\"already_present\""
        );
        assert_eq!(
            serde_json::to_string(&InstallOutcome::Installed).unwrap(),
            "\"installed\""
        );
        let skipped = InstallOutcome::Skipped {
            reason: "prerequisite 'git' not satisfied".to_string(),
        };
        assert!(serde_json::to_string(&skipped).unwrap().contains("skipped"));
    }

    #[test]
    fn only_present_and_installed_satisfy_prerequisites() {
        assert!(InstallOutcome::AlreadyPresent.satisfies_prerequisite());
        assert!(InstallOutcome::Installed.satisfies_prerequisite());
        assert!(!InstallOutcome::Skipped {
            reason: "x".into()
        }
        .satisfies_prerequisite());
        assert!(!InstallOutcome::Failed { cause: "x".into() }.satisfies_prerequisite());
    }

    #[test]
    fn report_lookup_by_tool() {
        let mut report = RunReport::default();
        report.record(ToolId::Git, "Git", InstallOutcome::Installed);
        assert_eq!(
            report.outcome_of(ToolId::Git),
            Some(&InstallOutcome::Installed)
        );
        assert!(report.outcome_of(ToolId::Docker).is_none());
    }
}
