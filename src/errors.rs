// src/errors.rs

//! Crate-wide error type, categories and helpers.

use thiserror::Error;

/// Broad classification of a failure, used by the reactor when recording
/// results and by the summary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Static misconfiguration: never retried, never recoverable.
    Configuration,
    /// A plugin, goal or plugin version could not be found.
    Resolution,
    /// The mojo itself reported failure (e.g. failing tests).
    BuildLogic,
    /// The engine or a collaborator malfunctioned while executing.
    Execution,
}

#[derive(Error, Debug)]
pub enum BuildcycleError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Phase '{phase}' is defined in more than one lifecycle: '{lifecycle}' and '{previous}'")]
    DuplicatePhase {
        phase: String,
        lifecycle: String,
        previous: String,
    },

    #[error("Unable to find lifecycle for phase '{0}'")]
    NoLifecycleForPhase(String),

    #[error("Cannot find lifecycle mapping for packaging: '{0}', and there is no default")]
    MissingLifecycleMapping(String),

    #[error(
        "Invalid task '{0}': you must specify a valid lifecycle phase, or a goal in the format \
         plugin:goal or pluginGroupId:pluginArtifactId[:pluginVersion]:goal"
    )]
    MalformedTask(String),

    #[error("Mojo: '{goal}' requires direct invocation. It cannot be used as part of {context}")]
    DirectInvocationOnly { goal: String, context: String },

    #[error(
        "Mapped-prefix lookup of mojos is only supported from direct invocation. Please use \
         groupId:artifactId[:version]:goal instead. (Offending mojo: '{task}', invoked via: '{invoked_via}')"
    )]
    PrefixNotAllowed { task: String, invoked_via: String },

    #[error("Cycle detected in reactor: {0}")]
    ReactorCycle(String),

    #[error("A required plugin was not found: {0}")]
    PluginNotFound(String),

    #[error("Required goal not found: {goal} in {plugin}")]
    MojoNotFound { goal: String, plugin: String },

    #[error("Plugin version resolution failed: {0}")]
    VersionResolution(String),

    #[error("Invalid plugin: {0}")]
    InvalidPlugin(String),

    #[error("Build failure: {0}")]
    BuildFailure(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Interpolation error: {0}")]
    Interpolation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildcycleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BuildcycleError::ConfigError(_)
            | BuildcycleError::DuplicatePhase { .. }
            | BuildcycleError::NoLifecycleForPhase(_)
            | BuildcycleError::MissingLifecycleMapping(_)
            | BuildcycleError::MalformedTask(_)
            | BuildcycleError::DirectInvocationOnly { .. }
            | BuildcycleError::PrefixNotAllowed { .. }
            | BuildcycleError::ReactorCycle(_)
            | BuildcycleError::TomlError(_) => ErrorCategory::Configuration,
            BuildcycleError::PluginNotFound(_)
            | BuildcycleError::MojoNotFound { .. }
            | BuildcycleError::VersionResolution(_)
            | BuildcycleError::InvalidPlugin(_) => ErrorCategory::Resolution,
            BuildcycleError::BuildFailure(_) => ErrorCategory::BuildLogic,
            BuildcycleError::Execution(_)
            | BuildcycleError::Interpolation(_)
            | BuildcycleError::IoError(_)
            | BuildcycleError::Other(_) => ErrorCategory::Execution,
        }
    }

    /// Whether an optional lookup may swallow this error and carry on.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BuildcycleError::PluginNotFound(_) | BuildcycleError::MojoNotFound { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildcycleError>;
