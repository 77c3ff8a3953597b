use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Missing capability: {0}")]
    MissingCapability(String),

    #[error("Cannot install {tool}: prerequisite '{prerequisite}' is not satisfied")]
    PrerequisiteNotSatisfied { tool: String, prerequisite: String },

    #[error("Installation of {tool} failed: {source}")]
    InstallationFailed {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{tool} requires manual completion:\n{instructions}")]
    ManualInterventionRequired { tool: String, instructions: String },

    #[error("Path collision: {0} exists but is not a git checkout")]
    PathCollision(PathBuf),

    #[error("Clone/fetch failed (network or authentication): {0}")]
    NetworkOrAuth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RigError>;
