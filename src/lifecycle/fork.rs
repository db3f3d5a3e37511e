// src/lifecycle/fork.rs

//! Forked lifecycles: the fork-entry-point stack, lifecycle overlays and the
//! fork drivers on [`LifecycleExecutor`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{BuildcycleError, Result};
use crate::lifecycle::bindings::LifecycleBindings;
use crate::lifecycle::executor::{LifecycleExecutor, log_line};
use crate::lifecycle::resolver::{TaskRef, mojo_in_plugin};
use crate::model::configuration::merge;
use crate::model::execution::DEFAULT_EXEC_ID_PREFIX;
use crate::model::{MojoExecution, MojoHandle, MojoId, Plugin, PluginDescriptor};
use crate::project::Project;
use crate::session::BuildSession;

/// Mojos whose forks are currently in progress, innermost last.
#[derive(Debug, Clone, Default)]
pub struct ForkStack {
    entries: Vec<MojoId>,
}

impl ForkStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: MojoId) {
        self.entries.push(id);
    }

    pub fn pop(&mut self) -> Option<MojoId> {
        self.entries.pop()
    }

    pub fn contains(&self, id: &MojoId) -> bool {
        self.entries.contains(id)
    }
}

impl LifecycleExecutor {
    /// Run the fork requested by `handle` for the current project, or for
    /// every reactor project when the mojo aggregates.
    pub(crate) fn fork_lifecycle(
        &self,
        handle: &MojoHandle,
        forks: &mut ForkStack,
        session: &mut BuildSession,
        project: &mut Project,
        execution_id: &str,
    ) -> Result<()> {
        info!("Preparing {}", handle.mojo.full_goal_name());

        if !handle.mojo.aggregator {
            return self.fork_with_execution_project(handle, forks, session, project, execution_id);
        }

        let ids: Vec<String> = session.reactor().sorted_ids().to_vec();
        for id in ids {
            log_line();
            if id == project.id() {
                info!("Building {}", project.name());
                log_line();
                self.fork_with_execution_project(handle, forks, session, project, execution_id)?;
                continue;
            }

            let Some(mut reactor_project) = session.reactor().project(&id).cloned() else {
                continue;
            };
            info!("Building {}", reactor_project.name());
            log_line();
            let outcome = self.fork_with_execution_project(
                handle,
                forks,
                session,
                &mut reactor_project,
                execution_id,
            );
            session.reactor_mut().replace(reactor_project);
            outcome?;
        }
        Ok(())
    }

    /// Fork against `project`'s execution project, creating one if needed.
    fn fork_with_execution_project(
        &self,
        handle: &MojoHandle,
        forks: &mut ForkStack,
        session: &mut BuildSession,
        project: &mut Project,
        execution_id: &str,
    ) -> Result<()> {
        let mut execution_project = match project.execution_project.take() {
            Some(existing) => existing,
            None => Box::new(self.create_execution_project(project, session, false)?),
        };
        let outcome = self.fork_project_lifecycle(
            handle,
            forks,
            session,
            &mut execution_project,
            execution_id,
        );
        project.execution_project = Some(execution_project);
        outcome
    }

    fn fork_project_lifecycle(
        &self,
        handle: &MojoHandle,
        forks: &mut ForkStack,
        session: &mut BuildSession,
        project: &mut Project,
        execution_id: &str,
    ) -> Result<()> {
        let mojo = &handle.mojo;

        if let Some(target) = &mojo.execute_phase {
            let lifecycle = self.registry.lifecycle_for_phase(target)?;
            let mut bindings = self
                .bindings
                .construct_lifecycle_mappings(session, target, project, lifecycle)?;

            if let Some(overlay) = &mojo.execute_lifecycle {
                self.apply_lifecycle_overlay(
                    &mut bindings,
                    &handle.plugin,
                    overlay,
                    project,
                    session,
                    execution_id,
                )?;
            }

            bindings.remove_fork_entry_points(forks);
            return self.execute_goal_with_lifecycle(
                target, forks, session, &bindings, project, lifecycle,
            );
        }

        if let Some(goal) = &mojo.execute_goal {
            let forked = mojo_in_plugin(&handle.plugin, goal)?;
            if forks.contains(&forked.mojo.id()) {
                warn!("Removing: {goal} from forked goal, to prevent recursive invocation.");
                return Ok(());
            }
            let execution = MojoExecution::with_id(forked, goal.clone());
            return self.execute_goals(vec![execution], forks, session, project);
        }

        Ok(())
    }

    /// Bind the goals of a plugin-supplied lifecycle overlay on top of
    /// `bindings`.
    fn apply_lifecycle_overlay(
        &self,
        bindings: &mut LifecycleBindings,
        plugin: &Arc<PluginDescriptor>,
        overlay_id: &str,
        project: &Project,
        session: &BuildSession,
        execution_id: &str,
    ) -> Result<()> {
        let overlay = plugin.lifecycle_overlay(overlay_id).ok_or_else(|| {
            BuildcycleError::Execution(format!(
                "Lifecycle '{overlay_id}' not found in plugin {}",
                plugin.id()
            ))
        })?;

        for phase in &overlay.phases {
            for overlay_execution in &phase.executions {
                for goal in &overlay_execution.goals {
                    let handle = self.overlay_goal(plugin, goal, project, session)?;

                    let configuration = match &phase.configuration {
                        Some(phase_cfg) => {
                            Some(merge(phase_cfg, overlay_execution.configuration.as_ref()))
                        }
                        None => overlay_execution.configuration.clone(),
                    };

                    let execution = if execution_id.starts_with(DEFAULT_EXEC_ID_PREFIX) {
                        MojoExecution::new(handle)
                    } else {
                        MojoExecution::with_id(handle, execution_id)
                    };
                    bindings.add(
                        &phase.id,
                        execution.with_configuration(configuration),
                        session.settings.offline,
                    );
                }
            }

            if let Some(phase_cfg) = &phase.configuration {
                bindings.apply_configuration(phase_cfg);
            }
        }
        Ok(())
    }

    /// Resolve an overlay goal: fully qualified goals load their own plugin,
    /// bare goals come from the overlay's plugin.
    fn overlay_goal(
        &self,
        plugin: &Arc<PluginDescriptor>,
        goal: &str,
        project: &Project,
        session: &BuildSession,
    ) -> Result<MojoHandle> {
        if !goal.contains(':') {
            return mojo_in_plugin(plugin, goal);
        }

        match TaskRef::parse(goal)? {
            TaskRef::Coordinate {
                group_id,
                artifact_id,
                version,
                goal: name,
            } => {
                let target =
                    Plugin::new(group_id.clone(), artifact_id.clone()).with_version(version);
                let descriptor = self
                    .bindings
                    .resolver()
                    .verify_plugin(&target, project, session)
                    .map_err(|err| match err {
                        BuildcycleError::PluginNotFound(_) => BuildcycleError::Execution(format!(
                            "Unable to find plugin {group_id}:{artifact_id} used in lifecycle '{goal}'"
                        )),
                        other => other,
                    })?;
                mojo_in_plugin(&descriptor, &name)
            }
            TaskRef::Prefixed { .. } => mojo_in_plugin(plugin, goal),
        }
    }
}
