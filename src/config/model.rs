// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::lifecycle::mapping::LifecycleMapping;
use crate::model::coordinate::default_goal_prefix;
use crate::model::{
    ArtifactHandler, Configuration, LifecycleOverlay, Plugin, ProjectModel, ReportPlugin,
};
use crate::types::FailureBehaviour;

/// Raw build file as read from TOML, before validation.
///
/// ```toml
/// [settings]
/// failure_behaviour = "fail-at-end"
///
/// [project.app]
/// group_id = "com.example"
/// version = "1.0"
/// dependencies = ["core"]
///
/// [[plugin]]
/// group_id = "org.apache.maven.plugins"
/// artifact_id = "maven-compiler-plugin"
/// version = "3.1"
///
/// [[plugin.mojo]]
/// goal = "compile"
/// phase = "compile"
/// cmd = "echo compiling ${project.artifactId}"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub settings: SettingsSection,

    /// Properties shared by every project (project properties win).
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Reactor projects from `[project.<key>]`, in declaration order.
    #[serde(default)]
    pub project: toml::map::Map<String, toml::Value>,

    /// Plugin catalog from `[[plugin]]`.
    #[serde(default)]
    pub plugin: Vec<PluginConfig>,

    /// Extra packaging mappings from `[packaging.<name>]`.
    #[serde(default)]
    pub packaging: BTreeMap<String, LifecycleMapping>,
}

/// Validated build file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: SettingsSection,
    pub properties: BTreeMap<String, String>,
    /// `(key, project)` in declaration order.
    pub project: Vec<(String, ProjectConfig)>,
    pub plugin: Vec<PluginConfig>,
    pub packaging: BTreeMap<String, LifecycleMapping>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        settings: SettingsSection,
        properties: BTreeMap<String, String>,
        project: Vec<(String, ProjectConfig)>,
        plugin: Vec<PluginConfig>,
        packaging: BTreeMap<String, LifecycleMapping>,
    ) -> Self {
        Self {
            settings,
            properties,
            project,
            plugin,
            packaging,
        }
    }
}

/// `[settings]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsSection {
    #[serde(default)]
    pub offline: bool,

    #[serde(default)]
    pub failure_behaviour: FailureBehaviour,

    /// Report plugins added to every reporting mojo, as
    /// `groupId:artifactId[:version]`.
    #[serde(default)]
    pub default_reports: Vec<String>,

    /// Top-level project key; defaults to the first project in build order.
    #[serde(default)]
    pub root: Option<String>,
}

fn default_packaging() -> String {
    "jar".to_string()
}

/// `[project.<key>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub group_id: String,

    /// Defaults to the project key.
    #[serde(default)]
    pub artifact_id: Option<String>,

    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_packaging")]
    pub packaging: String,

    /// Directory of the project, relative to the build file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Keys of reactor projects this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub default_goal: Option<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(default)]
    pub plugins: Vec<Plugin>,

    #[serde(default)]
    pub plugin_management: Vec<Plugin>,

    #[serde(default)]
    pub reports: Vec<ReportPlugin>,

    #[serde(default)]
    pub exclude_default_reports: bool,
}

impl ProjectConfig {
    /// Declared model for this project. Build-file properties are merged
    /// underneath the project's own.
    pub fn to_model(&self, key: &str, shared: &BTreeMap<String, String>) -> ProjectModel {
        let artifact_id = self.artifact_id.clone().unwrap_or_else(|| key.to_string());
        let mut model = ProjectModel::new(self.group_id.clone(), artifact_id, self.version.clone());

        if let Some(name) = &self.name {
            model.name = name.clone();
        }
        model.packaging = self.packaging.clone();
        model.path = self.path.clone();
        model.dependencies = self.dependencies.clone();
        model.default_goal = self.default_goal.clone();

        let mut properties = shared.clone();
        properties.extend(self.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        model.properties = properties;

        model.build_plugins = self.plugins.clone();
        model.plugin_management = self.plugin_management.clone();
        model.report_plugins = self.reports.clone();
        model.exclude_default_reports = self.exclude_default_reports;
        model
    }
}

fn default_true() -> bool {
    true
}

/// `[[plugin]]` catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,

    /// Defaults to the prefix implied by the artifact id.
    #[serde(default)]
    pub goal_prefix: Option<String>,

    #[serde(default = "default_true")]
    pub inherited_by_default: bool,

    #[serde(default)]
    pub mojo: Vec<MojoConfig>,

    #[serde(default)]
    pub lifecycle: Vec<LifecycleOverlay>,

    /// Packaging mappings contributed when the plugin is used with
    /// `extensions = true`.
    #[serde(default)]
    pub lifecycle_mappings: BTreeMap<String, LifecycleMapping>,

    #[serde(default)]
    pub artifact_handlers: Vec<ArtifactHandler>,
}

impl PluginConfig {
    pub fn effective_goal_prefix(&self) -> String {
        self.goal_prefix
            .clone()
            .unwrap_or_else(|| default_goal_prefix(&self.artifact_id))
    }
}

/// `[[plugin.mojo]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MojoConfig {
    pub goal: String,

    #[serde(default)]
    pub phase: Option<String>,

    #[serde(default)]
    pub execute_phase: Option<String>,

    #[serde(default)]
    pub execute_goal: Option<String>,

    #[serde(default)]
    pub execute_lifecycle: Option<String>,

    #[serde(default)]
    pub aggregator: bool,

    #[serde(default = "default_true")]
    pub requires_project: bool,

    #[serde(default)]
    pub requires_reports: bool,

    #[serde(default)]
    pub requires_online: bool,

    #[serde(default)]
    pub direct_invocation_only: bool,

    #[serde(default = "default_true")]
    pub inherited_by_default: bool,

    #[serde(default)]
    pub report: bool,

    /// Shell command executed when the mojo runs.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Default configuration, merged under execution configuration.
    #[serde(default)]
    pub configuration: Option<Configuration>,
}
