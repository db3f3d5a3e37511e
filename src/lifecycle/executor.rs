// src/lifecycle/executor.rs

//! Top-level build driver: segments the requested tasks, walks the reactor
//! and applies the failure policy.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::errors::{BuildcycleError, Result};
use crate::events::{BuildEvent, EventSink, PROJECT_EXECUTION};
use crate::lifecycle::bindings::BindingBuilder;
use crate::lifecycle::mapping::{DefaultLifecycleMappings, LifecycleMappingProvider};
use crate::lifecycle::registry::LifecycleRegistry;
use crate::lifecycle::resolver::ResolveRequest;
use crate::lifecycle::segment::{TaskSegment, segment_tasks};
use crate::model::ArtifactHandler;
use crate::plugin::PluginManager;
use crate::project::{
    ConfigurationInterpolator, InterpolatingModelProvider, ProjectModelProvider,
    RegexConfigurationInterpolator,
};
use crate::reactor::ReactorManager;
use crate::session::BuildSession;

const SEPARATOR: &str =
    "------------------------------------------------------------------------";

pub(crate) fn log_line() {
    info!("{SEPARATOR}");
}

/// Executes build tasks over a reactor.
///
/// All collaborators are injected at construction; the executor itself
/// holds no per-build state.
#[derive(Debug, Clone)]
pub struct LifecycleExecutor {
    pub(crate) registry: Arc<LifecycleRegistry>,
    pub(crate) plugins: Arc<dyn PluginManager>,
    pub(crate) bindings: BindingBuilder,
    pub(crate) model_provider: Arc<dyn ProjectModelProvider>,
    pub(crate) interpolator: Arc<dyn ConfigurationInterpolator>,
    pub(crate) default_reports: Vec<String>,
}

impl LifecycleExecutor {
    /// Executor with the standard packaging table, the interpolating model
    /// provider and no default reports.
    pub fn new(registry: Arc<LifecycleRegistry>, plugins: Arc<dyn PluginManager>) -> Self {
        let mappings: Arc<dyn LifecycleMappingProvider> =
            Arc::new(DefaultLifecycleMappings::standard());
        Self {
            bindings: BindingBuilder::new(Arc::clone(&plugins), mappings),
            registry,
            plugins,
            model_provider: Arc::new(InterpolatingModelProvider),
            interpolator: Arc::new(RegexConfigurationInterpolator),
            default_reports: Vec::new(),
        }
    }

    pub fn with_mapping_provider(mut self, mappings: Arc<dyn LifecycleMappingProvider>) -> Self {
        self.bindings = BindingBuilder::new(Arc::clone(&self.plugins), mappings);
        self
    }

    pub fn with_model_provider(mut self, provider: Arc<dyn ProjectModelProvider>) -> Self {
        self.model_provider = provider;
        self
    }

    pub fn with_interpolator(mut self, interpolator: Arc<dyn ConfigurationInterpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Report plugins (`groupId:artifactId[:version]`) added to every
    /// reporting mojo unless the project opts out.
    pub fn with_default_reports(mut self, reports: Vec<String>) -> Self {
        self.default_reports = reports;
        self
    }

    pub fn registry(&self) -> &LifecycleRegistry {
        &self.registry
    }

    pub fn bindings(&self) -> &BindingBuilder {
        &self.bindings
    }

    /// Run the session's goals (or the top-level project's default goal)
    /// over the whole reactor. Outcomes are recorded in `reactor_manager`;
    /// an error is returned only when the failure policy aborts the build or
    /// the task list itself is invalid.
    pub fn execute(
        &self,
        session: &mut BuildSession,
        reactor_manager: &mut ReactorManager,
        sink: &dyn EventSink,
    ) -> Result<()> {
        let segments = self.plan(session)?;
        self.find_extensions(session)?;
        self.execute_task_segments(&segments, session, reactor_manager, sink)
    }

    /// Task segments the session would run, without running anything.
    pub fn plan(&self, session: &mut BuildSession) -> Result<Vec<TaskSegment>> {
        let goals = self.requested_goals(session)?;
        self.segment_task_list(&goals, session)
    }

    fn requested_goals(&self, session: &BuildSession) -> Result<Vec<String>> {
        if !session.goals.is_empty() {
            return Ok(session.goals.clone());
        }

        let default_goal = session
            .top_level_project()
            .and_then(|p| p.model().default_goal.clone());
        if let Some(goal) = default_goal {
            let goals: Vec<String> = goal.split_whitespace().map(str::to_string).collect();
            if !goals.is_empty() {
                debug!(?goals, "using default goal of top-level project");
                return Ok(goals);
            }
        }

        let phases: Vec<&str> = self
            .registry
            .lifecycles()
            .iter()
            .flat_map(|l| l.phases().iter().map(String::as_str))
            .collect();
        Err(BuildcycleError::ConfigError(format!(
            "You must specify at least one goal or lifecycle phase to perform build steps. \
             Available lifecycle phases are: {}",
            phases.join(", ")
        )))
    }

    fn segment_task_list(
        &self,
        tasks: &[String],
        session: &mut BuildSession,
    ) -> Result<Vec<TaskSegment>> {
        let Some(mut root) = session.top_level_project().cloned() else {
            return segment_tasks(tasks, false, |t| self.registry.is_phase(t), |_| Ok(false));
        };

        let resolver = self.bindings.resolver();
        let snapshot: &BuildSession = session;
        let segments = segment_tasks(
            tasks,
            true,
            |t| self.registry.is_phase(t),
            |task| match resolver.resolve(ResolveRequest::direct(task), &mut root, snapshot) {
                Ok(Some(handle)) => Ok(handle.mojo.aggregator || !handle.mojo.requires_project),
                Ok(None) => Ok(false),
                Err(err) if err.is_not_found() => {
                    info!(
                        "Cannot find mojo descriptor for: '{task}' - Treating as non-aggregator."
                    );
                    debug!(error = %err, "aggregator lookup failed");
                    Ok(false)
                }
                Err(err) => Err(err),
            },
        );

        session.reactor_mut().replace(root);
        segments
    }

    /// Give every project the artifact handler of its packaging, taken from
    /// the extension plugins seen so far. The first registered handler for a
    /// packaging wins.
    fn find_extensions(&self, session: &mut BuildSession) -> Result<()> {
        let mut handlers: Vec<ArtifactHandler> = Vec::new();
        let mut assignments: Vec<(String, ArtifactHandler)> = Vec::new();

        for project in session.reactor().projects() {
            for plugin in project.build_plugins().iter().filter(|p| p.extensions) {
                let descriptor = self
                    .plugins
                    .load_plugin_descriptor(plugin, project, session)
                    .map_err(|err| {
                        BuildcycleError::Execution(format!(
                            "Error getting extensions from the plugin '{}': {err}",
                            plugin.key()
                        ))
                    })?;
                handlers.extend(descriptor.artifact_handlers.iter().cloned());
            }

            if let Some(handler) = handlers.iter().find(|h| h.packaging == project.packaging()) {
                debug!(
                    project = %project.id(),
                    extension = %handler.extension,
                    "artifact handler from extension"
                );
                assignments.push((project.id().to_string(), handler.clone()));
            }
        }

        for (id, handler) in assignments {
            if let Some(project) = session.reactor_mut().project_mut(&id) {
                project.set_artifact_handler(handler);
            }
        }
        Ok(())
    }

    fn execute_task_segments(
        &self,
        segments: &[TaskSegment],
        session: &mut BuildSession,
        reactor_manager: &mut ReactorManager,
        sink: &dyn EventSink,
    ) -> Result<()> {
        for segment in segments {
            let targets: Vec<String> = if segment.is_aggregate() {
                session.reactor().top_level_id().map(str::to_string).into_iter().collect()
            } else {
                session.reactor().sorted_ids().to_vec()
            };

            for id in targets {
                if reactor_manager.is_blacklisted(&id) {
                    let name = session
                        .reactor()
                        .project(&id)
                        .map(|p| p.name().to_string())
                        .unwrap_or_else(|| id.clone());
                    log_line();
                    info!("SKIPPING {name}");
                    info!("  {segment}");
                    info!(
                        "  This project has been banned from further executions \
                         due to previous failures."
                    );
                    log_line();
                    continue;
                }

                self.build_project_segment(&id, segment, session, reactor_manager, sink)?;
            }
        }
        Ok(())
    }

    /// Run one segment for one project. Returns an error only when the
    /// failure policy aborts the build.
    fn build_project_segment(
        &self,
        id: &str,
        segment: &TaskSegment,
        session: &mut BuildSession,
        reactor_manager: &mut ReactorManager,
        sink: &dyn EventSink,
    ) -> Result<()> {
        let Some(mut project) = session.reactor().project(id).cloned() else {
            return Err(BuildcycleError::ConfigError(format!(
                "project '{id}' is not part of the reactor"
            )));
        };

        log_line();
        info!("Building {}", project.name());
        info!("  {segment}");
        log_line();

        let target = format!("{} ({} )", project.model().coordinate(), segment);
        let start = Instant::now();
        sink.dispatch(BuildEvent::Start {
            event: PROJECT_EXECUTION.to_string(),
            target: target.clone(),
        });

        let mut failed = false;
        let mut abort = None;
        for task in segment.tasks() {
            if let Err(err) = self.execute_goal(task, session, &mut project) {
                failed = true;
                sink.dispatch(BuildEvent::Error {
                    event: PROJECT_EXECUTION.to_string(),
                    target: target.clone(),
                    message: err.to_string(),
                });
                if reactor_manager.handle_execution_failure(id, &err, task, start.elapsed()) {
                    abort = Some(err);
                    break;
                }
                if reactor_manager.is_blacklisted(id) {
                    break;
                }
            }
        }
        session.reactor_mut().replace(project);

        if let Some(err) = abort {
            return Err(err);
        }
        if !failed {
            reactor_manager.register_success(id, start.elapsed());
        }
        sink.dispatch(BuildEvent::End {
            event: PROJECT_EXECUTION.to_string(),
            target,
        });
        Ok(())
    }
}
