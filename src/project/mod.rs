// src/project/mod.rs

//! Runtime view of a reactor project.
//!
//! A [`Project`] wraps the immutable declared model and carries the state
//! the engine derives while building: the concrete (interpolated) model,
//! plugins injected by goal resolution, the artifact handler picked from
//! extensions, and the execution-project clone used by forks.

pub mod interpolation;
pub mod provider;

use std::sync::Arc;

use tracing::debug;

use crate::model::{ArtifactHandler, Plugin, PluginKey, ProjectId, ProjectModel, ReportPlugin};

pub use interpolation::{
    ConfigurationInterpolator, InterpolationContext, InterpolationError,
    RegexConfigurationInterpolator,
};
pub use provider::{InterpolatingModelProvider, ProjectModelProvider};

#[derive(Debug, Clone)]
pub struct Project {
    id: ProjectId,
    declared: Arc<ProjectModel>,
    concrete: Option<ProjectModel>,
    resolved_plugins: Vec<Plugin>,
    artifact_handler: Option<ArtifactHandler>,
    /// Clone that forked lifecycles run against.
    pub execution_project: Option<Box<Project>>,
}

impl Project {
    pub fn new(id: impl Into<ProjectId>, model: ProjectModel) -> Self {
        Self {
            id: id.into(),
            declared: Arc::new(model),
            concrete: None,
            resolved_plugins: Vec::new(),
            artifact_handler: None,
            execution_project: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn declared(&self) -> &ProjectModel {
        &self.declared
    }

    /// The concrete model when one has been computed, else the declared one.
    pub fn model(&self) -> &ProjectModel {
        self.concrete.as_ref().unwrap_or(&self.declared)
    }

    pub fn is_concrete(&self) -> bool {
        self.concrete.is_some()
    }

    pub fn set_concrete(&mut self, model: ProjectModel) {
        self.concrete = Some(model);
    }

    pub fn name(&self) -> &str {
        &self.model().name
    }

    pub fn packaging(&self) -> &str {
        &self.model().packaging
    }

    pub fn dependencies(&self) -> &[ProjectId] {
        &self.declared.dependencies
    }

    pub fn build_plugins(&self) -> &[Plugin] {
        &self.model().build_plugins
    }

    pub fn declared_plugin(&self, key: &PluginKey) -> Option<&Plugin> {
        self.model().build_plugin(key)
    }

    pub fn report_plugins(&self) -> &[ReportPlugin] {
        &self.model().report_plugins
    }

    pub fn exclude_default_reports(&self) -> bool {
        self.model().exclude_default_reports
    }

    /// Apply the project's plugin-management entry for `plugin`, if any.
    pub fn inject_plugin_management(&self, plugin: &mut Plugin) {
        if let Some(managed) = self.model().managed_plugin(&plugin.key()) {
            debug!(project = %self.id, plugin = %plugin.key(), "applying plugin management");
            plugin.merge_management(managed);
        }
    }

    /// Record a plugin used by goal resolution that the project does not
    /// already declare.
    pub fn add_plugin(&mut self, plugin: Plugin) {
        let key = plugin.key();
        let known = self.declared_plugin(&key).is_some()
            || self.resolved_plugins.iter().any(|p| p.key() == key);
        if !known {
            self.resolved_plugins.push(plugin);
        }
    }

    pub fn resolved_plugins(&self) -> &[Plugin] {
        &self.resolved_plugins
    }

    pub fn artifact_handler(&self) -> Option<&ArtifactHandler> {
        self.artifact_handler.as_ref()
    }

    pub fn set_artifact_handler(&mut self, handler: ArtifactHandler) {
        self.artifact_handler = Some(handler);
    }

    pub fn execution_project(&self) -> Option<&Project> {
        self.execution_project.as_deref()
    }

    /// Fresh copy for a fork: same declared model and resolved plugins, no
    /// concrete state and no nested execution project.
    pub fn execution_clone(&self) -> Project {
        Project {
            id: self.id.clone(),
            declared: Arc::clone(&self.declared),
            concrete: None,
            resolved_plugins: self.resolved_plugins.clone(),
            artifact_handler: self.artifact_handler.clone(),
            execution_project: None,
        }
    }
}
