// src/lifecycle/registry.rs

//! Lifecycles and the phase -> lifecycle index.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{BuildcycleError, Result};

/// A named, ordered sequence of phases.
///
/// `default_phases` is the binding used when no packaging mapping covers the
/// lifecycle (clean and site have one; default does not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    id: String,
    phases: Vec<String>,
    default_phases: Option<BTreeMap<String, String>>,
}

impl Lifecycle {
    pub fn new<I, S>(id: impl Into<String>, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            phases: phases.into_iter().map(Into::into).collect(),
            default_phases: None,
        }
    }

    pub fn with_default_phase(mut self, phase: &str, goals: &str) -> Self {
        self.default_phases
            .get_or_insert_with(BTreeMap::new)
            .insert(phase.to_string(), goals.to_string());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    pub fn default_phases(&self) -> Option<&BTreeMap<String, String>> {
        self.default_phases.as_ref()
    }

    pub fn index_of(&self, phase: &str) -> Option<usize> {
        self.phases.iter().position(|p| p == phase)
    }
}

/// All known lifecycles, with every phase mapped to exactly one of them.
///
/// Built eagerly: construction fails if a phase appears in two lifecycles,
/// so lookups after construction never fail for structural reasons.
#[derive(Debug, Clone)]
pub struct LifecycleRegistry {
    lifecycles: Vec<Arc<Lifecycle>>,
    phase_index: HashMap<String, usize>,
}

impl LifecycleRegistry {
    pub fn new(lifecycles: Vec<Lifecycle>) -> Result<Self> {
        let mut phase_index: HashMap<String, usize> = HashMap::new();

        for (idx, lifecycle) in lifecycles.iter().enumerate() {
            let mut seen = HashSet::new();
            for phase in lifecycle.phases() {
                if !seen.insert(phase.as_str()) {
                    return Err(BuildcycleError::ConfigError(format!(
                        "phase '{phase}' appears more than once in lifecycle '{}'",
                        lifecycle.id()
                    )));
                }
                if let Some(&previous) = phase_index.get(phase) {
                    return Err(BuildcycleError::DuplicatePhase {
                        phase: phase.clone(),
                        lifecycle: lifecycle.id().to_string(),
                        previous: lifecycles[previous].id().to_string(),
                    });
                }
                phase_index.insert(phase.clone(), idx);
            }
        }

        debug!(
            lifecycles = lifecycles.len(),
            phases = phase_index.len(),
            "built lifecycle registry"
        );

        Ok(Self {
            lifecycles: lifecycles.into_iter().map(Arc::new).collect(),
            phase_index,
        })
    }

    /// The clean, default and site lifecycles.
    pub fn standard() -> Result<Self> {
        Self::new(vec![clean_lifecycle(), default_lifecycle(), site_lifecycle()])
    }

    pub fn lifecycles(&self) -> &[Arc<Lifecycle>] {
        &self.lifecycles
    }

    pub fn lifecycle(&self, id: &str) -> Option<&Arc<Lifecycle>> {
        self.lifecycles.iter().find(|l| l.id() == id)
    }

    pub fn is_phase(&self, task: &str) -> bool {
        self.phase_index.contains_key(task)
    }

    pub fn lifecycle_for_phase(&self, phase: &str) -> Result<&Arc<Lifecycle>> {
        self.phase_index
            .get(phase)
            .map(|&idx| &self.lifecycles[idx])
            .ok_or_else(|| BuildcycleError::NoLifecycleForPhase(phase.to_string()))
    }

    /// Phase -> lifecycle id, for diagnostics and dry runs.
    pub fn phase_to_lifecycle(&self) -> BTreeMap<&str, &str> {
        self.phase_index
            .iter()
            .map(|(phase, &idx)| (phase.as_str(), self.lifecycles[idx].id()))
            .collect()
    }
}

fn clean_lifecycle() -> Lifecycle {
    Lifecycle::new("clean", ["pre-clean", "clean", "post-clean"])
        .with_default_phase("clean", "org.apache.maven.plugins:maven-clean-plugin:clean")
}

fn default_lifecycle() -> Lifecycle {
    Lifecycle::new(
        "default",
        [
            "validate",
            "initialize",
            "generate-sources",
            "process-sources",
            "generate-resources",
            "process-resources",
            "compile",
            "process-classes",
            "generate-test-sources",
            "process-test-sources",
            "generate-test-resources",
            "process-test-resources",
            "test-compile",
            "process-test-classes",
            "test",
            "prepare-package",
            "package",
            "pre-integration-test",
            "integration-test",
            "post-integration-test",
            "verify",
            "install",
            "deploy",
        ],
    )
}

fn site_lifecycle() -> Lifecycle {
    Lifecycle::new("site", ["pre-site", "site", "post-site", "site-deploy"])
        .with_default_phase("site", "org.apache.maven.plugins:maven-site-plugin:site")
        .with_default_phase(
            "site-deploy",
            "org.apache.maven.plugins:maven-site-plugin:deploy",
        )
}
