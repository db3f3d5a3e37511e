// src/plugin/catalog.rs

//! Plugin manager backed by the `[[plugin]]` catalog of the build file.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::config::model::{ConfigFile, MojoConfig, PluginConfig};
use crate::model::configuration::{flatten, merge_optional};
use crate::model::{
    MojoDescriptor, MojoExecution, Plugin, PluginDescriptor, PluginKey, Report,
};
use crate::plugin::command::{CommandOutcome, run_mojo_command};
use crate::plugin::{MojoError, PluginError, PluginManager};
use crate::project::{InterpolationContext, Project};
use crate::session::BuildSession;

#[derive(Debug)]
pub struct CatalogPluginManager {
    /// Known versions per plugin, in declaration order (last = newest).
    catalog: BTreeMap<PluginKey, Vec<Arc<PluginDescriptor>>>,
    /// Descriptors loaded so far, indexed by goal prefix.
    loaded: Mutex<HashMap<String, Arc<PluginDescriptor>>>,
    root_dir: PathBuf,
}

impl CatalogPluginManager {
    pub fn new(descriptors: Vec<PluginDescriptor>, root_dir: impl Into<PathBuf>) -> Self {
        let mut catalog: BTreeMap<PluginKey, Vec<Arc<PluginDescriptor>>> = BTreeMap::new();
        for descriptor in descriptors {
            catalog
                .entry(descriptor.key.clone())
                .or_default()
                .push(Arc::new(descriptor));
        }
        Self {
            catalog,
            loaded: Mutex::new(HashMap::new()),
            root_dir: root_dir.into(),
        }
    }

    pub fn from_config(cfg: &ConfigFile, root_dir: impl Into<PathBuf>) -> Self {
        let descriptors = cfg.plugin.iter().map(descriptor_from_config).collect();
        Self::new(descriptors, root_dir)
    }

    fn remember(&self, descriptor: &Arc<PluginDescriptor>) {
        if let Ok(mut loaded) = self.loaded.lock() {
            loaded
                .entry(descriptor.goal_prefix.clone())
                .or_insert_with(|| Arc::clone(descriptor));
        }
    }

    fn project_dir(&self, project: &Project) -> PathBuf {
        match &project.model().path {
            Some(path) => self.root_dir.join(path),
            None => self.root_dir.clone(),
        }
    }
}

pub fn descriptor_from_config(cfg: &PluginConfig) -> PluginDescriptor {
    let key = PluginKey::new(cfg.group_id.clone(), cfg.artifact_id.clone());
    let prefix = cfg.effective_goal_prefix();

    let mut descriptor = PluginDescriptor::new(key.clone(), cfg.version.clone(), prefix.clone());
    descriptor.inherited_by_default = cfg.inherited_by_default;
    descriptor.mojos = cfg
        .mojo
        .iter()
        .map(|m| Arc::new(mojo_from_config(&key, &prefix, m)))
        .collect();
    descriptor.lifecycles = cfg.lifecycle.clone();
    descriptor.lifecycle_mappings = cfg.lifecycle_mappings.clone();
    descriptor.artifact_handlers = cfg.artifact_handlers.clone();
    descriptor
}

fn mojo_from_config(plugin: &PluginKey, prefix: &str, cfg: &MojoConfig) -> MojoDescriptor {
    let mut mojo = MojoDescriptor::new(plugin.clone(), prefix, cfg.goal.clone());
    mojo.phase = cfg.phase.clone();
    mojo.execute_phase = cfg.execute_phase.clone();
    mojo.execute_goal = cfg.execute_goal.clone();
    mojo.execute_lifecycle = cfg.execute_lifecycle.clone();
    mojo.aggregator = cfg.aggregator;
    mojo.requires_project = cfg.requires_project;
    mojo.requires_reports = cfg.requires_reports;
    mojo.requires_online = cfg.requires_online;
    mojo.direct_invocation_only = cfg.direct_invocation_only;
    mojo.inherited_by_default = cfg.inherited_by_default;
    mojo.report = cfg.report;
    mojo.command = cfg.cmd.clone();
    mojo.configuration = cfg.configuration.clone();
    mojo
}

impl PluginManager for CatalogPluginManager {
    fn load_plugin_descriptor(
        &self,
        plugin: &Plugin,
        _project: &Project,
        _session: &BuildSession,
    ) -> Result<Arc<PluginDescriptor>, PluginError> {
        let key = plugin.key();
        let versions = self
            .catalog
            .get(&key)
            .ok_or_else(|| PluginError::NotFound(key.to_string()))?;

        let descriptor = match &plugin.version {
            Some(version) => versions
                .iter()
                .find(|d| &d.version == version)
                .ok_or_else(|| PluginError::VersionResolution {
                    plugin: key.to_string(),
                    reason: format!("version '{version}' is not in the catalog"),
                })?,
            None => versions.last().ok_or_else(|| PluginError::VersionResolution {
                plugin: key.to_string(),
                reason: "no versions available".to_string(),
            })?,
        };

        if descriptor.mojos.is_empty() && descriptor.lifecycle_mappings.is_empty() {
            warn!(plugin = %descriptor.id(), "plugin declares no goals");
        }

        self.remember(descriptor);
        debug!(plugin = %descriptor.id(), "loaded plugin descriptor");
        Ok(Arc::clone(descriptor))
    }

    fn descriptor_for_prefix(&self, prefix: &str) -> Option<Arc<PluginDescriptor>> {
        self.loaded
            .lock()
            .ok()
            .and_then(|loaded| loaded.get(prefix).cloned())
    }

    fn plugin_definition_for_prefix(
        &self,
        prefix: &str,
        _project: &Project,
        _session: &BuildSession,
    ) -> Option<Plugin> {
        self.catalog
            .iter()
            .find(|(_, versions)| versions.iter().any(|d| d.goal_prefix == prefix))
            .map(|(key, _)| Plugin::from_key(key))
    }

    fn execute_mojo(
        &self,
        project: &Project,
        execution: &MojoExecution,
        session: &BuildSession,
    ) -> Result<(), MojoError> {
        let mojo = execution.descriptor();
        let Some(cmd) = &mojo.command else {
            debug!(
                project = %project.id(),
                goal = %mojo.full_goal_name(),
                "mojo has no command; nothing to run"
            );
            return Ok(());
        };

        let mut ctx =
            InterpolationContext::for_project(project.model(), project.artifact_handler(), session);

        // Mojo defaults have not been interpolated yet.
        let configuration = merge_optional(execution.configuration(), mojo.configuration.as_ref())
            .unwrap_or_default();
        let configuration = ctx
            .interpolate_configuration(&configuration)
            .map_err(|e| MojoError::Configuration(e.to_string()))?;
        let flat = flatten(&configuration);

        for (key, value) in &flat {
            ctx.insert(&format!("config.{}", key.to_lowercase()), value);
        }
        let cmd = ctx
            .interpolate(cmd)
            .map_err(|e| MojoError::Configuration(e.to_string()))?;

        let mut env = vec![
            ("BUILDCYCLE_PROJECT".to_string(), project.id().to_string()),
            ("BUILDCYCLE_GOAL".to_string(), mojo.full_goal_name()),
            (
                "BUILDCYCLE_EXECUTION_ID".to_string(),
                execution.execution_id().to_string(),
            ),
            (
                "BUILDCYCLE_OFFLINE".to_string(),
                session.settings.offline.to_string(),
            ),
        ];
        env.extend(
            flat.into_iter()
                .map(|(k, v)| (format!("BUILDCYCLE_CONFIG_{k}"), v)),
        );
        if !execution.reports().is_empty() {
            let reports: Vec<String> = execution
                .reports()
                .iter()
                .map(|r| r.mojo.to_string())
                .collect();
            env.push(("BUILDCYCLE_REPORTS".to_string(), reports.join(",")));
        }

        let outcome =
            run_mojo_command(&mojo.full_goal_name(), &cmd, &self.project_dir(project), &env)
                .map_err(|e| MojoError::Execution(format!("{e:#}")))?;

        match outcome {
            CommandOutcome::Success => Ok(()),
            CommandOutcome::Failed(code) => Err(MojoError::Failure(format!(
                "goal '{}' exited with status {code}",
                mojo.full_goal_name()
            ))),
        }
    }

    fn get_report(
        &self,
        _project: &Project,
        execution: &MojoExecution,
        _session: &BuildSession,
    ) -> Result<Option<Report>, PluginError> {
        let mojo = execution.descriptor();
        if !mojo.report {
            return Ok(None);
        }
        Ok(Some(Report {
            mojo: mojo.id(),
            execution_id: execution.execution_id().to_string(),
        }))
    }
}
