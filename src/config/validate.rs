// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, PluginConfig, ProjectConfig, RawConfigFile};
use crate::errors::{BuildcycleError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BuildcycleError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let projects = parse_projects(&raw)?;
        validate_config(&raw, &projects)?;
        Ok(ConfigFile::new_unchecked(
            raw.settings,
            raw.properties,
            projects,
            raw.plugin,
            raw.packaging,
        ))
    }
}

fn parse_projects(raw: &RawConfigFile) -> Result<Vec<(String, ProjectConfig)>> {
    raw.project
        .iter()
        .map(|(key, value)| {
            let project: ProjectConfig = value.clone().try_into().map_err(|e| {
                BuildcycleError::ConfigError(format!("invalid [project.{key}] section: {e}"))
            })?;
            Ok((key.clone(), project))
        })
        .collect()
}

pub fn validate_config(raw: &RawConfigFile, projects: &[(String, ProjectConfig)]) -> Result<()> {
    ensure_has_projects(projects)?;
    validate_settings(raw, projects)?;
    validate_project_dependencies(projects)?;
    validate_reactor(projects)?;
    validate_plugin_catalog(&raw.plugin)?;
    Ok(())
}

fn ensure_has_projects(projects: &[(String, ProjectConfig)]) -> Result<()> {
    if projects.is_empty() {
        return Err(BuildcycleError::ConfigError(
            "config must contain at least one [project.<key>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_settings(raw: &RawConfigFile, projects: &[(String, ProjectConfig)]) -> Result<()> {
    if let Some(root) = &raw.settings.root
        && !projects.iter().any(|(key, _)| key == root)
    {
        return Err(BuildcycleError::ConfigError(format!(
            "[settings].root refers to unknown project '{root}'"
        )));
    }
    Ok(())
}

fn validate_project_dependencies(projects: &[(String, ProjectConfig)]) -> Result<()> {
    let keys: HashSet<&str> = projects.iter().map(|(k, _)| k.as_str()).collect();
    for (key, project) in projects {
        for dep in &project.dependencies {
            if dep == key {
                return Err(BuildcycleError::ConfigError(format!(
                    "project '{key}' cannot depend on itself in `dependencies`"
                )));
            }
            if !keys.contains(dep.as_str()) {
                return Err(BuildcycleError::ConfigError(format!(
                    "project '{key}' has unknown dependency '{dep}' in `dependencies`"
                )));
            }
        }
    }
    Ok(())
}

fn validate_reactor(projects: &[(String, ProjectConfig)]) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for (key, _) in projects {
        graph.add_node(key.as_str());
    }
    for (key, project) in projects {
        for dep in &project.dependencies {
            graph.add_edge(dep.as_str(), key.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(BuildcycleError::ReactorCycle(format!(
            "cycle detected in project dependencies involving project '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_plugin_catalog(plugins: &[PluginConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for plugin in plugins {
        let id = format!("{}:{}:{}", plugin.group_id, plugin.artifact_id, plugin.version);
        if !seen.insert(id.clone()) {
            return Err(BuildcycleError::ConfigError(format!(
                "plugin '{id}' is declared more than once in [[plugin]]"
            )));
        }

        let mut goals = HashSet::new();
        for mojo in &plugin.mojo {
            if mojo.goal.trim().is_empty() || mojo.goal.contains(':') {
                return Err(BuildcycleError::ConfigError(format!(
                    "plugin '{id}' has an invalid goal name '{}'",
                    mojo.goal
                )));
            }
            if !goals.insert(mojo.goal.as_str()) {
                return Err(BuildcycleError::ConfigError(format!(
                    "plugin '{id}' declares goal '{}' more than once",
                    mojo.goal
                )));
            }
            if let Some(overlay) = &mojo.execute_lifecycle
                && !plugin.lifecycle.iter().any(|l| &l.id == overlay)
            {
                return Err(BuildcycleError::ConfigError(format!(
                    "goal '{}' of plugin '{id}' forks lifecycle '{overlay}', which the plugin does not define",
                    mojo.goal
                )));
            }
        }
    }
    Ok(())
}
