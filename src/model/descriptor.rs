// src/model/descriptor.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::configuration::Configuration;
use super::coordinate::PluginKey;
use crate::lifecycle::mapping::LifecycleMapping;

/// Identity of a mojo: its plugin key plus goal name. Used by the fork stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MojoId {
    pub plugin: PluginKey,
    pub goal: String,
}

impl fmt::Display for MojoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.plugin, self.goal)
    }
}

/// Static metadata of one goal.
#[derive(Debug, Clone, PartialEq)]
pub struct MojoDescriptor {
    pub plugin: PluginKey,
    pub goal_prefix: String,
    pub goal: String,
    /// Default phase the goal binds to when an execution names none.
    pub phase: Option<String>,
    pub execute_phase: Option<String>,
    pub execute_goal: Option<String>,
    pub execute_lifecycle: Option<String>,
    pub aggregator: bool,
    pub requires_project: bool,
    pub requires_reports: bool,
    pub requires_online: bool,
    pub direct_invocation_only: bool,
    pub inherited_by_default: bool,
    /// The goal produces a report when attached to a reporting mojo.
    pub report: bool,
    /// Shell command run by the catalog plugin manager.
    pub command: Option<String>,
    pub configuration: Option<Configuration>,
}

impl MojoDescriptor {
    pub fn new(plugin: PluginKey, goal_prefix: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            plugin,
            goal_prefix: goal_prefix.into(),
            goal: goal.into(),
            phase: None,
            execute_phase: None,
            execute_goal: None,
            execute_lifecycle: None,
            aggregator: false,
            requires_project: true,
            requires_reports: false,
            requires_online: false,
            direct_invocation_only: false,
            inherited_by_default: true,
            report: false,
            command: None,
            configuration: None,
        }
    }

    pub fn id(&self) -> MojoId {
        MojoId {
            plugin: self.plugin.clone(),
            goal: self.goal.clone(),
        }
    }

    /// `prefix:goal`
    pub fn full_goal_name(&self) -> String {
        format!("{}:{}", self.goal_prefix, self.goal)
    }

    pub fn forks(&self) -> bool {
        self.execute_phase.is_some() || self.execute_goal.is_some()
    }
}

/// Plugin metadata as returned by a plugin manager.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescriptor {
    pub key: PluginKey,
    pub version: String,
    pub goal_prefix: String,
    pub inherited_by_default: bool,
    pub mojos: Vec<Arc<MojoDescriptor>>,
    pub lifecycles: Vec<LifecycleOverlay>,
    /// Packaging -> lifecycle mapping contributed as an extension component.
    pub lifecycle_mappings: BTreeMap<String, LifecycleMapping>,
    pub artifact_handlers: Vec<ArtifactHandler>,
}

impl PluginDescriptor {
    pub fn new(key: PluginKey, version: impl Into<String>, goal_prefix: impl Into<String>) -> Self {
        Self {
            key,
            version: version.into(),
            goal_prefix: goal_prefix.into(),
            inherited_by_default: true,
            mojos: Vec::new(),
            lifecycles: Vec::new(),
            lifecycle_mappings: BTreeMap::new(),
            artifact_handlers: Vec::new(),
        }
    }

    /// `groupId:artifactId:version`
    pub fn id(&self) -> String {
        format!("{}:{}", self.key, self.version)
    }

    pub fn mojo(&self, goal: &str) -> Option<&Arc<MojoDescriptor>> {
        self.mojos.iter().find(|m| m.goal == goal)
    }

    pub fn lifecycle_overlay(&self, id: &str) -> Option<&LifecycleOverlay> {
        self.lifecycles.iter().find(|l| l.id == id)
    }
}

/// A plugin-supplied lifecycle overlay used by forking mojos.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LifecycleOverlay {
    pub id: String,
    #[serde(default)]
    pub phases: Vec<OverlayPhase>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlayPhase {
    pub id: String,
    #[serde(default)]
    pub configuration: Option<Configuration>,
    #[serde(default)]
    pub executions: Vec<OverlayExecution>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlayExecution {
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub configuration: Option<Configuration>,
}

/// Describes the artifact a packaging type produces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactHandler {
    pub packaging: String,
    pub extension: String,
    #[serde(default)]
    pub language: Option<String>,
}
