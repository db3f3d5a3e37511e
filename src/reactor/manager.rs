// src/reactor/manager.rs

//! Per-project build state and the reactor failure policy.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::{BuildcycleError, ErrorCategory};
use crate::model::ProjectId;
use crate::reactor::graph::ReactorGraph;
use crate::reactor::summary::{BuildSummary, ProjectResult};
use crate::reactor::Reactor;
use crate::types::FailureBehaviour;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectBuildState {
    NotBuilt,
    Succeeded,
    Failed,
    Blacklisted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildFailureRecord {
    pub project: ProjectId,
    pub task: String,
    pub elapsed: Duration,
    pub message: String,
    pub category: ErrorCategory,
}

/// Tracks the outcome of every project and decides, per failure, whether the
/// build aborts.
#[derive(Debug, Clone)]
pub struct ReactorManager {
    behaviour: FailureBehaviour,
    graph: ReactorGraph,
    states: HashMap<ProjectId, ProjectBuildState>,
    blacklist: HashSet<ProjectId>,
    successes: HashMap<ProjectId, Duration>,
    failures: Vec<BuildFailureRecord>,
}

impl ReactorManager {
    pub fn new(reactor: &Reactor, behaviour: FailureBehaviour) -> Self {
        let states = reactor
            .sorted_ids()
            .iter()
            .map(|id| (id.clone(), ProjectBuildState::NotBuilt))
            .collect();

        Self {
            behaviour,
            graph: reactor.graph().clone(),
            states,
            blacklist: HashSet::new(),
            successes: HashMap::new(),
            failures: Vec::new(),
        }
    }

    pub fn failure_behaviour(&self) -> FailureBehaviour {
        self.behaviour
    }

    pub fn state_of(&self, id: &str) -> ProjectBuildState {
        self.states
            .get(id)
            .copied()
            .unwrap_or(ProjectBuildState::NotBuilt)
    }

    pub fn is_blacklisted(&self, id: &str) -> bool {
        self.blacklist.contains(id)
    }

    /// Mark `id` and everything depending on it as not buildable.
    pub fn blacklist(&mut self, id: &str) {
        self.blacklist.insert(id.to_string());
        for dependent in self.graph.transitive_dependents(id) {
            if self.blacklist.insert(dependent.clone()) {
                debug!(
                    project = %dependent,
                    upstream = %id,
                    "blacklisting dependent of failed project"
                );
            }
            if let Some(state) = self.states.get_mut(&dependent)
                && *state != ProjectBuildState::Failed
            {
                *state = ProjectBuildState::Blacklisted;
            }
        }
    }

    /// Record a successful segment. A project that already failed or was
    /// blacklisted keeps that state.
    pub fn register_success(&mut self, id: &str, elapsed: Duration) {
        let state = self
            .states
            .entry(id.to_string())
            .or_insert(ProjectBuildState::NotBuilt);
        if matches!(
            *state,
            ProjectBuildState::NotBuilt | ProjectBuildState::Succeeded
        ) {
            *state = ProjectBuildState::Succeeded;
            *self.successes.entry(id.to_string()).or_default() += elapsed;
        }
    }

    pub fn register_failure(
        &mut self,
        id: &str,
        error: &BuildcycleError,
        task: &str,
        elapsed: Duration,
    ) {
        self.states
            .insert(id.to_string(), ProjectBuildState::Failed);
        self.failures.push(BuildFailureRecord {
            project: id.to_string(),
            task: task.to_string(),
            elapsed,
            message: error.to_string(),
            category: error.category(),
        });
    }

    /// Record a failure and apply the policy. Returns `true` when the build
    /// must abort.
    pub fn handle_execution_failure(
        &mut self,
        id: &str,
        error: &BuildcycleError,
        task: &str,
        elapsed: Duration,
    ) -> bool {
        self.register_failure(id, error, task, elapsed);

        match self.behaviour {
            FailureBehaviour::FailFast => {
                warn!(project = %id, task, "build failed; aborting (fail-fast)");
                true
            }
            FailureBehaviour::FailAtEnd => {
                self.blacklist(id);
                info!(
                    project = %id,
                    task,
                    "build failed; skipping dependent projects (fail-at-end)"
                );
                false
            }
            FailureBehaviour::FailNever => {
                info!(project = %id, task, "build failed; continuing (fail-never)");
                false
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[BuildFailureRecord] {
        &self.failures
    }

    pub fn summary(&self, order: &[ProjectId]) -> BuildSummary {
        let results = order
            .iter()
            .map(|id| {
                let result = match self.state_of(id) {
                    ProjectBuildState::Succeeded => ProjectResult::Success {
                        elapsed: self.successes.get(id).copied().unwrap_or_default(),
                    },
                    ProjectBuildState::Failed => {
                        match self.failures.iter().find(|f| &f.project == id) {
                            Some(f) => ProjectResult::Failed {
                                task: f.task.clone(),
                                elapsed: f.elapsed,
                                message: f.message.clone(),
                                category: f.category,
                            },
                            None => ProjectResult::NotBuilt,
                        }
                    }
                    ProjectBuildState::Blacklisted => ProjectResult::Skipped,
                    ProjectBuildState::NotBuilt => ProjectResult::NotBuilt,
                };
                (id.clone(), result)
            })
            .collect();

        BuildSummary { results }
    }
}
