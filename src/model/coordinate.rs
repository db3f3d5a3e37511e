// src/model/coordinate.rs

use std::fmt;

/// Group used when a prefix cannot be resolved to any known plugin.
pub const DEFAULT_PLUGIN_GROUP_ID: &str = "org.apache.maven.plugins";

/// Artifact id implied by a bare goal prefix (`compiler` -> `maven-compiler-plugin`).
pub fn default_plugin_artifact_id(prefix: &str) -> String {
    format!("maven-{prefix}-plugin")
}

/// Goal prefix implied by a plugin artifact id when a descriptor does not
/// declare one explicitly.
pub fn default_goal_prefix(artifact_id: &str) -> String {
    if let Some(rest) = artifact_id.strip_prefix("maven-")
        && let Some(prefix) = rest.strip_suffix("-plugin")
    {
        return prefix.to_string();
    }
    if let Some(prefix) = artifact_id.strip_suffix("-maven-plugin") {
        return prefix.to_string();
    }
    artifact_id.to_string()
}

/// Version-less plugin identity (`groupId:artifactId`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey {
    pub group_id: String,
    pub artifact_id: String,
}

impl PluginKey {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Key for the conventional plugin implied by a goal prefix.
    pub fn for_prefix(prefix: &str) -> Self {
        Self::new(DEFAULT_PLUGIN_GROUP_ID, default_plugin_artifact_id(prefix))
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}
