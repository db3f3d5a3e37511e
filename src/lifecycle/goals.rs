// src/lifecycle/goals.rs

//! Goal chain execution: phases expand to their bound mojos, each mojo gets
//! fresh concrete project state, its forks and reports, then runs.

use tracing::{debug, info};

use crate::errors::{BuildcycleError, Result};
use crate::lifecycle::bindings::LifecycleBindings;
use crate::lifecycle::executor::LifecycleExecutor;
use crate::lifecycle::fork::ForkStack;
use crate::lifecycle::registry::Lifecycle;
use crate::lifecycle::resolver::ResolveRequest;
use crate::model::configuration::references_session_or_reactor;
use crate::model::execution::CLI_EXECUTION_ID;
use crate::model::MojoExecution;
use crate::plugin::MojoError;
use crate::project::Project;
use crate::session::BuildSession;

impl LifecycleExecutor {
    /// Run one requested task (phase or goal) against `project`.
    pub fn execute_goal(
        &self,
        task: &str,
        session: &mut BuildSession,
        project: &mut Project,
    ) -> Result<()> {
        let mut forks = ForkStack::new();

        if self.registry.is_phase(task) {
            let lifecycle = self.registry.lifecycle_for_phase(task)?;
            let bindings = self
                .bindings
                .construct_lifecycle_mappings(session, task, project, lifecycle)?;
            self.execute_goal_with_lifecycle(
                task,
                &mut forks,
                session,
                &bindings,
                project,
                lifecycle,
            )
        } else {
            self.execute_standalone_goal(task, &mut forks, session, project)
        }
    }

    pub(crate) fn execute_goal_with_lifecycle(
        &self,
        task: &str,
        forks: &mut ForkStack,
        session: &mut BuildSession,
        bindings: &LifecycleBindings,
        project: &mut Project,
        lifecycle: &Lifecycle,
    ) -> Result<()> {
        let goals = bindings.goal_chain(task, lifecycle);
        if goals.is_empty() {
            info!("No goals needed for project - skipping");
            return Ok(());
        }
        self.execute_goals(goals, forks, session, project)
    }

    fn execute_standalone_goal(
        &self,
        task: &str,
        forks: &mut ForkStack,
        session: &mut BuildSession,
        project: &mut Project,
    ) -> Result<()> {
        let handle = self
            .bindings
            .resolver()
            .resolve(ResolveRequest::direct(task), project, session)?
            .ok_or_else(|| BuildcycleError::MojoNotFound {
                goal: task.to_string(),
                plugin: "(unresolved)".to_string(),
            })?;

        let configuration = project
            .declared_plugin(&handle.mojo.plugin)
            .and_then(|p| p.configuration.clone());
        let execution =
            MojoExecution::with_id(handle, CLI_EXECUTION_ID).with_configuration(configuration);
        self.execute_goals(vec![execution], forks, session, project)
    }

    pub(crate) fn execute_goals(
        &self,
        goals: Vec<MojoExecution>,
        forks: &mut ForkStack,
        session: &mut BuildSession,
        project: &mut Project,
    ) -> Result<()> {
        for mut execution in goals {
            let handle = execution.handle().clone();
            let mojo = &handle.mojo;

            let uses_reactor = mojo.aggregator
                || execution
                    .configuration()
                    .is_some_and(references_session_or_reactor)
                || mojo
                    .configuration
                    .as_ref()
                    .is_some_and(references_session_or_reactor);

            if uses_reactor {
                self.calculate_all_concrete_states(session, project)?;
            } else {
                self.calculate_concrete_state(project, session, true)?;
            }

            if let Some(configuration) = execution.configuration() {
                let interpolated = self
                    .interpolator
                    .interpolate(configuration, project, session)
                    .map_err(|e| {
                        BuildcycleError::Interpolation(format!(
                            "Error interpolating configuration of '{}': {e}",
                            mojo.full_goal_name()
                        ))
                    })?;
                execution.set_configuration(Some(interpolated));
            }

            let report_executions = if mojo.requires_reports {
                self.report_executions(project, forks, &execution, session)?
            } else {
                Vec::new()
            };

            let has_fork =
                mojo.forks() || report_executions.iter().any(|r| r.descriptor().forks());

            if has_fork {
                if uses_reactor {
                    self.create_all_execution_projects(session, project)?;
                } else {
                    let clone = self.create_execution_project(project, session, true)?;
                    project.execution_project = Some(Box::new(clone));
                }

                if mojo.forks() {
                    forks.push(mojo.id());
                    let outcome = self.fork_lifecycle(
                        &handle,
                        forks,
                        session,
                        project,
                        execution.execution_id(),
                    );
                    forks.pop();
                    outcome?;
                }
            }

            if mojo.requires_reports {
                let reports = self.get_reports(&report_executions, forks, session, project)?;
                execution.set_reports(reports);
            }

            if has_fork {
                self.refresh_execution_projects(session, project, uses_reactor)?;
            }

            self.invoke_mojo(project, &execution, session)?;
        }
        Ok(())
    }

    fn invoke_mojo(
        &self,
        project: &Project,
        execution: &MojoExecution,
        session: &BuildSession,
    ) -> Result<()> {
        let mojo = execution.descriptor();
        info!(
            "[{} {{execution: {}}}]",
            mojo.full_goal_name(),
            execution.execution_id()
        );
        debug!(
            project = %project.id(),
            goal = %mojo.full_goal_name(),
            execution_id = %execution.execution_id(),
            "invoking mojo"
        );

        self.plugins
            .execute_mojo(project, execution, session)
            .map_err(|err| {
                let goal_id = format!("{}:{}", execution.plugin().id(), mojo.goal);
                match err {
                    MojoError::Failure(message) => BuildcycleError::BuildFailure(message),
                    other => BuildcycleError::Execution(format!("{goal_id}: {other}")),
                }
            })
    }

    /// Recompute the concrete model of `project`; with `process_references`
    /// the reactor projects it depends on are refreshed too.
    pub(crate) fn calculate_concrete_state(
        &self,
        project: &mut Project,
        session: &mut BuildSession,
        process_references: bool,
    ) -> Result<()> {
        let model = self
            .model_provider
            .calculate_concrete_state(project, session)
            .map_err(|e| concrete_state_error(project.id(), e))?;
        project.set_concrete(model);

        if process_references {
            for dep in project.dependencies().to_vec() {
                let Some(reactor_project) = session.reactor().project(&dep) else {
                    continue;
                };
                let model = self
                    .model_provider
                    .calculate_concrete_state(reactor_project, session)
                    .map_err(|e| concrete_state_error(&dep, e))?;
                if let Some(reactor_project) = session.reactor_mut().project_mut(&dep) {
                    reactor_project.set_concrete(model);
                }
            }
        }
        Ok(())
    }

    /// Concrete state for every reactor project; `current` is the working
    /// copy of the project being built and stands in for its reactor entry.
    fn calculate_all_concrete_states(
        &self,
        session: &mut BuildSession,
        current: &mut Project,
    ) -> Result<()> {
        for id in session.reactor().sorted_ids().to_vec() {
            if id == current.id() {
                self.calculate_concrete_state(current, session, false)?;
                continue;
            }
            let Some(project) = session.reactor().project(&id) else {
                continue;
            };
            let model = self
                .model_provider
                .calculate_concrete_state(project, session)
                .map_err(|e| concrete_state_error(&id, e))?;
            if let Some(project) = session.reactor_mut().project_mut(&id) {
                project.set_concrete(model);
            }
        }
        Ok(())
    }

    pub(crate) fn create_execution_project(
        &self,
        project: &Project,
        session: &mut BuildSession,
        process_references: bool,
    ) -> Result<Project> {
        let mut clone = project.execution_clone();
        self.calculate_concrete_state(&mut clone, session, process_references)?;
        Ok(clone)
    }

    fn create_all_execution_projects(
        &self,
        session: &mut BuildSession,
        current: &mut Project,
    ) -> Result<()> {
        for id in session.reactor().sorted_ids().to_vec() {
            if id == current.id() {
                let clone = self.create_execution_project(current, session, false)?;
                current.execution_project = Some(Box::new(clone));
                continue;
            }
            let Some(project) = session.reactor().project(&id).cloned() else {
                continue;
            };
            let clone = self.create_execution_project(&project, session, false)?;
            if let Some(project) = session.reactor_mut().project_mut(&id) {
                project.execution_project = Some(Box::new(clone));
            }
        }
        Ok(())
    }

    /// Forked builds may leave execution projects stale; recompute them
    /// before the forking mojo runs.
    fn refresh_execution_projects(
        &self,
        session: &mut BuildSession,
        current: &mut Project,
        reactor_wide: bool,
    ) -> Result<()> {
        if let Some(mut execution_project) = current.execution_project.take() {
            let outcome = self.calculate_concrete_state(&mut execution_project, session, false);
            current.execution_project = Some(execution_project);
            outcome?;
        }
        if !reactor_wide {
            return Ok(());
        }

        for id in session.reactor().sorted_ids().to_vec() {
            if id == current.id() {
                continue;
            }
            let taken = session
                .reactor_mut()
                .project_mut(&id)
                .and_then(|p| p.execution_project.take());
            let Some(mut execution_project) = taken else {
                continue;
            };
            let outcome = self.calculate_concrete_state(&mut execution_project, session, false);
            if let Some(project) = session.reactor_mut().project_mut(&id) {
                project.execution_project = Some(execution_project);
            }
            outcome?;
        }
        Ok(())
    }
}

fn concrete_state_error(id: &str, err: crate::project::InterpolationError) -> BuildcycleError {
    BuildcycleError::Interpolation(format!(
        "Failed to calculate concrete state for project {id}: {err}"
    ))
}
