// src/reactor/graph.rs

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{BuildcycleError, Result};
use crate::model::ProjectId;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct ReactorNode {
    deps: Vec<ProjectId>,
    dependents: Vec<ProjectId>,
}

/// Inter-project dependency graph of the reactor.
///
/// Holds adjacency for dependent lookups plus the build order: a
/// topological order that keeps declaration order among projects that do
/// not depend on each other.
#[derive(Debug, Clone)]
pub struct ReactorGraph {
    nodes: HashMap<ProjectId, ReactorNode>,
    order: Vec<ProjectId>,
}

impl ReactorGraph {
    /// Build from `(project, direct dependencies)` pairs in declaration order.
    ///
    /// Fails on unknown or self dependencies and on cycles.
    pub fn new(projects: &[(ProjectId, Vec<ProjectId>)]) -> Result<Self> {
        let mut nodes: HashMap<ProjectId, ReactorNode> = projects
            .iter()
            .map(|(id, deps)| {
                (
                    id.clone(),
                    ReactorNode {
                        deps: deps.clone(),
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        for (id, deps) in projects {
            for dep in deps {
                if dep == id {
                    return Err(BuildcycleError::ConfigError(format!(
                        "project '{id}' cannot depend on itself"
                    )));
                }
                match nodes.get_mut(dep) {
                    Some(node) => node.dependents.push(id.clone()),
                    None => {
                        return Err(BuildcycleError::ConfigError(format!(
                            "project '{id}' has unknown dependency '{dep}'"
                        )));
                    }
                }
            }
        }

        check_acyclic(projects)?;
        let order = stable_topological_order(projects);

        Ok(Self { nodes, order })
    }

    /// Projects in build order (dependencies first).
    pub fn sorted(&self) -> &[ProjectId] {
        &self.order
    }

    pub fn dependencies_of(&self, id: &str) -> &[ProjectId] {
        self.nodes.get(id).map(|n| n.deps.as_slice()).unwrap_or(&[])
    }

    pub fn dependents_of(&self, id: &str) -> &[ProjectId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Every project that depends on `id`, directly or transitively.
    pub fn transitive_dependents(&self, id: &str) -> Vec<ProjectId> {
        let mut stack: Vec<ProjectId> = self.dependents_of(id).to_vec();
        let mut visited: HashSet<ProjectId> = HashSet::new();
        let mut out = Vec::new();

        while let Some(next) = stack.pop() {
            if !visited.insert(next.clone()) {
                continue;
            }
            stack.extend(self.dependents_of(&next).iter().cloned());
            out.push(next);
        }

        // Report in build order.
        out.sort_by_key(|p| self.order.iter().position(|o| o == p));
        out
    }
}

fn check_acyclic(projects: &[(ProjectId, Vec<ProjectId>)]) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (id, _) in projects {
        graph.add_node(id.as_str());
    }
    for (id, deps) in projects {
        for dep in deps {
            graph.add_edge(dep.as_str(), id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => Err(BuildcycleError::ReactorCycle(format!(
            "cycle detected in project dependencies involving '{}'",
            cycle.node_id()
        ))),
    }
}

/// Kahn-style ordering that always picks the earliest declared ready project.
/// Assumes the graph is acyclic.
fn stable_topological_order(projects: &[(ProjectId, Vec<ProjectId>)]) -> Vec<ProjectId> {
    let mut placed: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(projects.len());

    while order.len() < projects.len() {
        let next = projects.iter().find(|(id, deps)| {
            !placed.contains(id.as_str()) && deps.iter().all(|d| placed.contains(d.as_str()))
        });
        match next {
            Some((id, _)) => {
                placed.insert(id.as_str());
                order.push(id.clone());
            }
            None => break,
        }
    }
    order
}
