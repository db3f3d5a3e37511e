// src/lifecycle/bindings.rs

//! Phase -> mojo execution bindings for one project and lifecycle.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{BuildcycleError, Result};
use crate::lifecycle::fork::ForkStack;
use crate::lifecycle::mapping::{LifecycleMapping, LifecycleMappingProvider};
use crate::lifecycle::registry::Lifecycle;
use crate::lifecycle::resolver::{PluginResolver, ResolveRequest};
use crate::model::configuration::{Configuration, merge, merge_optional};
use crate::model::{MojoExecution, MojoHandle, Plugin, PluginDescriptor, PluginExecution};
use crate::plugin::PluginManager;
use crate::project::Project;
use crate::session::BuildSession;

/// Mojo executions bound to each phase, in binding order.
#[derive(Debug, Clone, Default)]
pub struct LifecycleBindings {
    phases: HashMap<String, Vec<MojoExecution>>,
}

impl LifecycleBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an execution to `phase`. When offline, mojos that need the
    /// network are dropped with a warning. Returns whether it was added.
    pub fn add(&mut self, phase: &str, execution: MojoExecution, offline: bool) -> bool {
        let list = self.phases.entry(phase.to_string()).or_default();

        let mojo = execution.descriptor();
        if offline && mojo.requires_online {
            let goal = mojo.full_goal_name();
            warn!(
                "{goal} requires online mode, but the build is currently offline. Disabling {goal}."
            );
            return false;
        }

        list.push(execution);
        true
    }

    pub fn executions_for(&self, phase: &str) -> &[MojoExecution] {
        self.phases.get(phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.phases.values().all(Vec::is_empty)
    }

    /// Executions of every phase of `lifecycle` up to and including
    /// `target`, in phase order. Empty when `target` is not in the lifecycle.
    pub fn goal_chain(&self, target: &str, lifecycle: &Lifecycle) -> Vec<MojoExecution> {
        let Some(end) = lifecycle.index_of(target) else {
            return Vec::new();
        };
        lifecycle.phases()[..=end]
            .iter()
            .flat_map(|phase| self.executions_for(phase).iter().cloned())
            .collect()
    }

    /// Drop every execution whose mojo is currently forking, so a fork cannot
    /// re-enter itself.
    pub fn remove_fork_entry_points(&mut self, forks: &ForkStack) -> usize {
        let mut removed = 0;
        for executions in self.phases.values_mut() {
            executions.retain(|execution| {
                let id = execution.descriptor().id();
                if forks.contains(&id) {
                    warn!(
                        "Removing: {} from forked lifecycle, to prevent recursive invocation.",
                        execution.descriptor().goal
                    );
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        removed
    }

    /// Merge `configuration` as dominant into every bound execution.
    pub fn apply_configuration(&mut self, configuration: &Configuration) {
        for execution in self.phases.values_mut().flatten() {
            let merged = merge(configuration, execution.configuration());
            execution.set_configuration(Some(merged));
        }
    }
}

/// Builds [`LifecycleBindings`] from packaging mappings and the project's
/// declared plugin executions.
#[derive(Debug, Clone)]
pub struct BindingBuilder {
    resolver: PluginResolver,
    plugins: Arc<dyn PluginManager>,
    mappings: Arc<dyn LifecycleMappingProvider>,
}

impl BindingBuilder {
    pub fn new(
        plugins: Arc<dyn PluginManager>,
        mappings: Arc<dyn LifecycleMappingProvider>,
    ) -> Self {
        Self {
            resolver: PluginResolver::new(Arc::clone(&plugins)),
            plugins,
            mappings,
        }
    }

    pub fn resolver(&self) -> &PluginResolver {
        &self.resolver
    }

    /// Packaging bindings up to `target_phase`, then every declared plugin
    /// execution on top.
    pub fn construct_lifecycle_mappings(
        &self,
        session: &BuildSession,
        target_phase: &str,
        project: &mut Project,
        lifecycle: &Lifecycle,
    ) -> Result<LifecycleBindings> {
        let mut bindings =
            self.bind_lifecycle_for_packaging(session, target_phase, project, lifecycle)?;

        let declared: Vec<Plugin> = project.build_plugins().to_vec();
        for plugin in &declared {
            self.bind_plugin_to_lifecycle(plugin, session, &mut bindings, project)?;
        }

        Ok(bindings)
    }

    fn bind_lifecycle_for_packaging(
        &self,
        session: &BuildSession,
        target_phase: &str,
        project: &mut Project,
        lifecycle: &Lifecycle,
    ) -> Result<LifecycleBindings> {
        let mappings = self.find_mappings_for_lifecycle(session, project, lifecycle)?;
        let optional = self.find_optional_mojos(session, project, lifecycle)?;
        let packaging = project.packaging().to_string();

        let mut bindings = LifecycleBindings::new();
        for phase in lifecycle.phases() {
            if let Some(goals) = mappings.get(phase) {
                for goal in goals.split(',').map(str::trim).filter(|g| !g.is_empty()) {
                    let request =
                        ResolveRequest::mapped(goal, target_phase, optional.contains(goal));
                    let Some(handle) = self.resolver.resolve(request, project, session)? else {
                        continue;
                    };

                    if handle.mojo.direct_invocation_only {
                        return Err(BuildcycleError::DirectInvocationOnly {
                            goal: goal.to_string(),
                            context: format!("the lifecycle mapping for packaging: '{packaging}'"),
                        });
                    }

                    let configuration = project
                        .declared_plugin(&handle.mojo.plugin)
                        .and_then(|p| p.configuration.clone());
                    bindings.add(
                        phase,
                        MojoExecution::new(handle).with_configuration(configuration),
                        session.settings.offline,
                    );
                }
            }

            if phase == target_phase {
                break;
            }
        }

        Ok(bindings)
    }

    /// Extension plugins first, then registered packaging mappings, then the
    /// lifecycle's default phases.
    fn find_mappings_for_lifecycle(
        &self,
        session: &BuildSession,
        project: &Project,
        lifecycle: &Lifecycle,
    ) -> Result<BTreeMap<String, String>> {
        let packaging = project.packaging();

        let from_extension = self.find_extension_mapping(session, project)?;
        let phases = from_extension
            .as_ref()
            .and_then(|m| m.phases_for(lifecycle.id()))
            .or_else(|| {
                self.mappings
                    .mapping_for(packaging)
                    .and_then(|m| m.phases_for(lifecycle.id()))
            })
            .or_else(|| lifecycle.default_phases());

        match phases {
            Some(phases) => Ok(phases.clone()),
            None => Err(BuildcycleError::MissingLifecycleMapping(packaging.to_string())),
        }
    }

    fn find_optional_mojos(
        &self,
        session: &BuildSession,
        project: &Project,
        lifecycle: &Lifecycle,
    ) -> Result<HashSet<String>> {
        let from_extension = self.find_extension_mapping(session, project)?;
        let optional = match &from_extension {
            Some(mapping) => mapping.optional_mojos_for(lifecycle.id()),
            None => self
                .mappings
                .mapping_for(project.packaging())
                .and_then(|m| m.optional_mojos_for(lifecycle.id())),
        };
        Ok(optional
            .map(|goals| goals.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// First extension plugin of the project that maps its packaging.
    fn find_extension_mapping(
        &self,
        session: &BuildSession,
        project: &Project,
    ) -> Result<Option<LifecycleMapping>> {
        for plugin in project.build_plugins().iter().filter(|p| p.extensions) {
            let descriptor = self
                .plugins
                .load_plugin_descriptor(plugin, project, session)
                .map_err(BuildcycleError::from)?;
            if let Some(mapping) = descriptor.lifecycle_mappings.get(project.packaging()) {
                debug!(
                    project = %project.id(),
                    plugin = %descriptor.id(),
                    packaging = project.packaging(),
                    "using lifecycle mapping from extension plugin"
                );
                return Ok(Some(mapping.clone()));
            }
        }
        Ok(None)
    }

    fn bind_plugin_to_lifecycle(
        &self,
        plugin: &Plugin,
        session: &BuildSession,
        bindings: &mut LifecycleBindings,
        project: &Project,
    ) -> Result<()> {
        let descriptor = self.resolver.verify_plugin(plugin, project, session)?;
        if descriptor.mojos.is_empty() {
            return Ok(());
        }
        if !(plugin.inheritance_applied || descriptor.inherited_by_default) {
            debug!(plugin = %descriptor.id(), "plugin not inherited; skipping its executions");
            return Ok(());
        }

        for execution in &plugin.executions {
            self.bind_execution_to_lifecycle(&descriptor, plugin, execution, bindings, session)?;
        }
        Ok(())
    }

    fn bind_execution_to_lifecycle(
        &self,
        descriptor: &Arc<PluginDescriptor>,
        plugin: &Plugin,
        execution: &PluginExecution,
        bindings: &mut LifecycleBindings,
        session: &BuildSession,
    ) -> Result<()> {
        for goal in &execution.goals {
            let mojo = descriptor.mojo(goal).ok_or_else(|| {
                BuildcycleError::ConfigError(format!(
                    "'{goal}' was specified in an execution, but not found in the plugin {}",
                    descriptor.id()
                ))
            })?;

            if !(execution.inheritance_applied || mojo.inherited_by_default) {
                debug!(
                    goal = %mojo.full_goal_name(),
                    execution_id = %execution.id,
                    "goal not inherited; skipping"
                );
                continue;
            }

            let Some(phase) = execution.phase.as_ref().or(mojo.phase.as_ref()) else {
                debug!(
                    goal = %mojo.full_goal_name(),
                    execution_id = %execution.id,
                    "execution has no phase; not bound"
                );
                continue;
            };

            if mojo.direct_invocation_only {
                return Err(BuildcycleError::DirectInvocationOnly {
                    goal: mojo.full_goal_name(),
                    context: "the lifecycle (it was included via the project model)".to_string(),
                });
            }

            let configuration = merge_optional(
                execution.configuration.as_ref(),
                plugin.configuration.as_ref(),
            );
            let handle = MojoHandle::new(Arc::clone(descriptor), Arc::clone(mojo));
            bindings.add(
                phase,
                MojoExecution::with_id(handle, execution.id.clone())
                    .with_configuration(configuration),
                session.settings.offline,
            );
        }
        Ok(())
    }
}
