// src/model/project.rs

//! Declared project model: what a `[project.<key>]` section says, before any
//! interpolation. The runtime view lives in [`crate::project::Project`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::ProjectId;
use super::configuration::{Configuration, merge, merge_optional};
use super::coordinate::PluginKey;

fn default_true() -> bool {
    true
}

fn default_execution_id() -> String {
    "default".to_string()
}

/// A plugin as declared in a project's build section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plugin {
    pub group_id: String,
    pub artifact_id: String,

    #[serde(default)]
    pub version: Option<String>,

    /// Plugin contributes extension components (lifecycle mappings, artifact
    /// handlers).
    #[serde(default)]
    pub extensions: bool,

    /// Cleared when the declaration was inherited from a parent and must
    /// not be applied to this project.
    #[serde(default = "default_true", rename = "inherited")]
    pub inheritance_applied: bool,

    #[serde(default)]
    pub configuration: Option<Configuration>,

    #[serde(default)]
    pub executions: Vec<PluginExecution>,
}

impl Plugin {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            extensions: false,
            inheritance_applied: true,
            configuration: None,
            executions: Vec::new(),
        }
    }

    pub fn from_key(key: &PluginKey) -> Self {
        Self::new(key.group_id.clone(), key.artifact_id.clone())
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn key(&self) -> PluginKey {
        PluginKey::new(self.group_id.clone(), self.artifact_id.clone())
    }

    /// Fill unset parts of this declaration from a plugin-management entry.
    ///
    /// The declaration stays dominant: an explicit version wins, explicit
    /// configuration is merged over the managed one, and managed executions
    /// are only added when no execution with the same id exists.
    pub fn merge_management(&mut self, managed: &Plugin) {
        if self.version.is_none() {
            self.version = managed.version.clone();
        }
        self.configuration =
            merge_optional(self.configuration.as_ref(), managed.configuration.as_ref());

        for managed_exec in &managed.executions {
            match self.executions.iter_mut().find(|e| e.id == managed_exec.id) {
                Some(existing) => {
                    if let Some(cfg) = &managed_exec.configuration {
                        existing.configuration = Some(match &existing.configuration {
                            Some(own) => merge(own, Some(cfg)),
                            None => cfg.clone(),
                        });
                    }
                }
                None => self.executions.push(managed_exec.clone()),
            }
        }
    }
}

/// An explicit `<execution>` of a plugin inside a project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginExecution {
    #[serde(default = "default_execution_id")]
    pub id: String,

    #[serde(default)]
    pub phase: Option<String>,

    #[serde(default)]
    pub goals: Vec<String>,

    #[serde(default = "default_true", rename = "inherited")]
    pub inheritance_applied: bool,

    #[serde(default)]
    pub configuration: Option<Configuration>,
}

impl PluginExecution {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase: None,
            goals: Vec::new(),
            inheritance_applied: true,
            configuration: None,
        }
    }
}

/// A plugin declared in the project's reporting section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportPlugin {
    pub group_id: String,
    pub artifact_id: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub report_sets: Vec<ReportSet>,
}

impl ReportPlugin {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            report_sets: Vec::new(),
        }
    }

    pub fn key(&self) -> PluginKey {
        PluginKey::new(self.group_id.clone(), self.artifact_id.clone())
    }

    pub fn as_plugin(&self) -> Plugin {
        Plugin::new(self.group_id.clone(), self.artifact_id.clone())
            .with_version(self.version.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportSet {
    #[serde(default = "default_execution_id")]
    pub id: String,

    #[serde(default)]
    pub reports: Vec<String>,
}

/// Everything the engine knows about a project before interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectModel {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub name: String,
    pub packaging: String,
    /// Reactor projects this project depends on.
    pub dependencies: Vec<ProjectId>,
    pub default_goal: Option<String>,
    pub properties: BTreeMap<String, String>,
    /// Project directory, relative to the build file.
    pub path: Option<PathBuf>,
    pub build_plugins: Vec<Plugin>,
    pub plugin_management: Vec<Plugin>,
    pub report_plugins: Vec<ReportPlugin>,
    pub exclude_default_reports: bool,
}

impl ProjectModel {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let artifact_id = artifact_id.into();
        Self {
            group_id: group_id.into(),
            name: artifact_id.clone(),
            artifact_id,
            version: version.into(),
            packaging: "jar".to_string(),
            dependencies: Vec::new(),
            default_goal: None,
            properties: BTreeMap::new(),
            path: None,
            build_plugins: Vec::new(),
            plugin_management: Vec::new(),
            report_plugins: Vec::new(),
            exclude_default_reports: false,
        }
    }

    /// `groupId:artifactId:version`
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    pub fn build_plugin(&self, key: &PluginKey) -> Option<&Plugin> {
        self.build_plugins.iter().find(|p| &p.key() == key)
    }

    pub fn managed_plugin(&self, key: &PluginKey) -> Option<&Plugin> {
        self.plugin_management.iter().find(|p| &p.key() == key)
    }
}
