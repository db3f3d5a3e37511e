// src/plugin/mod.rs

//! Plugin loading and mojo execution.
//!
//! The engine only talks to plugins through [`PluginManager`]. The
//! production implementation is [`catalog::CatalogPluginManager`], which
//! serves descriptors from the `[[plugin]]` sections of the build file and
//! runs mojo commands through the shell.

pub mod catalog;
pub mod command;

use std::sync::Arc;

use thiserror::Error;

use crate::errors::BuildcycleError;
use crate::model::{MojoExecution, Plugin, PluginDescriptor, Report};
use crate::project::Project;
use crate::session::BuildSession;

pub use catalog::CatalogPluginManager;

/// Failure to obtain a plugin descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("plugin '{0}' not found")]
    NotFound(String),

    #[error("cannot resolve version of plugin '{plugin}': {reason}")]
    VersionResolution { plugin: String, reason: String },

    #[error("plugin '{plugin}' is invalid: {reason}")]
    Invalid { plugin: String, reason: String },

    #[error("internal plugin manager error for '{plugin}': {reason}")]
    Internal { plugin: String, reason: String },
}

impl From<PluginError> for BuildcycleError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::NotFound(plugin) => BuildcycleError::PluginNotFound(plugin),
            PluginError::VersionResolution { plugin, reason } => {
                BuildcycleError::VersionResolution(format!("{plugin}: {reason}"))
            }
            PluginError::Invalid { plugin, reason } => {
                BuildcycleError::InvalidPlugin(format!("{plugin}: {reason}"))
            }
            PluginError::Internal { plugin, reason } => BuildcycleError::Execution(format!(
                "Internal error in the plugin manager getting plugin '{plugin}': {reason}"
            )),
        }
    }
}

/// Failure raised while running a mojo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MojoError {
    /// The mojo ran and reported a build failure (failing tests, etc.).
    #[error("{0}")]
    Failure(String),

    #[error("{0}")]
    Execution(String),

    #[error("invalid mojo configuration: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Everything the engine needs from the plugin subsystem.
pub trait PluginManager: Send + Sync + std::fmt::Debug {
    /// Load (and cache) the descriptor for a plugin declaration. A missing
    /// version selects the newest known one.
    fn load_plugin_descriptor(
        &self,
        plugin: &Plugin,
        project: &Project,
        session: &BuildSession,
    ) -> Result<Arc<PluginDescriptor>, PluginError>;

    /// Global index of already-loaded descriptors by goal prefix.
    fn descriptor_for_prefix(&self, prefix: &str) -> Option<Arc<PluginDescriptor>>;

    /// Repository search for a plugin providing `prefix`.
    fn plugin_definition_for_prefix(
        &self,
        prefix: &str,
        project: &Project,
        session: &BuildSession,
    ) -> Option<Plugin>;

    fn execute_mojo(
        &self,
        project: &Project,
        execution: &MojoExecution,
        session: &BuildSession,
    ) -> Result<(), MojoError>;

    /// Report produced by a reporting execution, `None` if the mojo is not a
    /// report.
    fn get_report(
        &self,
        project: &Project,
        execution: &MojoExecution,
        session: &BuildSession,
    ) -> Result<Option<Report>, PluginError>;
}
