// src/reactor/mod.rs

//! The set of projects built together, and the bookkeeping of their
//! outcomes.
//!
//! - [`graph`]: dependency graph and build order.
//! - [`manager`]: per-project build state and failure policy.
//! - [`summary`]: final per-project report.

pub mod graph;
pub mod manager;
pub mod summary;

use std::collections::HashMap;

use crate::config::model::ConfigFile;
use crate::errors::{BuildcycleError, Result};
use crate::model::ProjectId;
use crate::project::Project;

pub use graph::ReactorGraph;
pub use manager::{ProjectBuildState, ReactorManager};
pub use summary::{BuildSummary, ProjectResult};

/// All projects of a build, keyed by id, plus their build order.
#[derive(Debug, Clone)]
pub struct Reactor {
    projects: HashMap<ProjectId, Project>,
    graph: ReactorGraph,
    top_level: Option<ProjectId>,
}

impl Reactor {
    /// Build a reactor from projects in declaration order.
    ///
    /// The top-level project is `root` when given, else the first project in
    /// build order.
    pub fn new(projects: Vec<Project>, root: Option<&str>) -> Result<Self> {
        let edges: Vec<(ProjectId, Vec<ProjectId>)> = projects
            .iter()
            .map(|p| (p.id().to_string(), p.dependencies().to_vec()))
            .collect();

        let mut map = HashMap::with_capacity(projects.len());
        for project in projects {
            let id = project.id().to_string();
            if map.insert(id.clone(), project).is_some() {
                return Err(BuildcycleError::ConfigError(format!(
                    "project '{id}' is declared more than once"
                )));
            }
        }
        let graph = ReactorGraph::new(&edges)?;

        let top_level = match root {
            Some(root) if !map.contains_key(root) => {
                return Err(BuildcycleError::ConfigError(format!(
                    "root project '{root}' is not part of the reactor"
                )));
            }
            Some(root) => Some(root.to_string()),
            None => graph.sorted().first().cloned(),
        };

        Ok(Self {
            projects: map,
            graph,
            top_level,
        })
    }

    /// Reactor of every `[project.<key>]` in a validated build file.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let projects = cfg
            .project
            .iter()
            .map(|(key, project)| Project::new(key.clone(), project.to_model(key, &cfg.properties)))
            .collect();
        Self::new(projects, cfg.settings.root.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn graph(&self) -> &ReactorGraph {
        &self.graph
    }

    pub fn sorted_ids(&self) -> &[ProjectId] {
        self.graph.sorted()
    }

    pub fn top_level_id(&self) -> Option<&str> {
        self.top_level.as_deref()
    }

    pub fn top_level(&self) -> Option<&Project> {
        self.top_level.as_deref().and_then(|id| self.projects.get(id))
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn project_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.get_mut(id)
    }

    /// Projects in build order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.graph
            .sorted()
            .iter()
            .filter_map(|id| self.projects.get(id))
    }

    /// Put a project back after it was built from a working copy.
    pub fn replace(&mut self, project: Project) {
        self.projects.insert(project.id().to_string(), project);
    }
}
