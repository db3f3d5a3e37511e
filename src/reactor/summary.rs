// src/reactor/summary.rs

use std::fmt;
use std::time::Duration;

use crate::errors::ErrorCategory;
use crate::model::ProjectId;

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectResult {
    Success {
        elapsed: Duration,
    },
    Failed {
        task: String,
        elapsed: Duration,
        message: String,
        category: ErrorCategory,
    },
    /// Blacklisted because it depends on a failed project.
    Skipped,
    NotBuilt,
}

/// Per-project outcome of a build, in reactor build order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub results: Vec<(ProjectId, ProjectResult)>,
}

impl BuildSummary {
    pub fn result_of(&self, id: &str) -> Option<&ProjectResult> {
        self.results.iter().find(|(p, _)| p == id).map(|(_, r)| r)
    }

    pub fn is_success(&self) -> bool {
        !self
            .results
            .iter()
            .any(|(_, r)| matches!(r, ProjectResult::Failed { .. } | ProjectResult::Skipped))
    }

    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, ProjectResult::Failed { .. }))
            .count()
    }
}

impl fmt::Display for ProjectResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectResult::Success { elapsed } => {
                write!(f, "SUCCESS [{:.3}s]", elapsed.as_secs_f64())
            }
            ProjectResult::Failed { task, elapsed, .. } => {
                write!(f, "FAILED [{:.3}s] in '{task}'", elapsed.as_secs_f64())
            }
            ProjectResult::Skipped => write!(f, "SKIPPED (dependencies failed)"),
            ProjectResult::NotBuilt => write!(f, "NOT BUILT"),
        }
    }
}
