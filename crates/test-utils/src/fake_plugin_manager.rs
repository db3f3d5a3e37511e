#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use buildcycle::model::{
    Configuration, MojoExecution, Plugin, PluginDescriptor, Report,
};
use buildcycle::plugin::{MojoError, PluginError, PluginManager};
use buildcycle::project::Project;
use buildcycle::session::BuildSession;

use crate::builders::{MojoBuilder, PluginDescriptorBuilder};

/// One recorded mojo invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedMojo {
    pub project: String,
    /// `prefix:goal`
    pub goal: String,
    pub execution_id: String,
    pub configuration: Option<Configuration>,
    /// `g:a:goal` of every attached report.
    pub reports: Vec<String>,
}

#[derive(Debug, Clone)]
enum FakeFailure {
    Build(String),
    Error(String),
}

/// In-memory plugin manager that records invocations instead of running
/// anything.
#[derive(Debug, Default)]
pub struct FakePluginManager {
    catalog: Vec<Arc<PluginDescriptor>>,
    prefix_index: HashMap<String, Arc<PluginDescriptor>>,
    /// Keyed by `project/prefix:goal`.
    failures: HashMap<String, FakeFailure>,
    executed: Arc<Mutex<Vec<ExecutedMojo>>>,
}

impl FakePluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plugin(mut self, descriptor: PluginDescriptor) -> Self {
        self.catalog.push(Arc::new(descriptor));
        self
    }

    /// Plugins for every goal bound by the built-in lifecycles and the
    /// `jar` / `pom` / `war` packagings.
    pub fn with_standard_plugins() -> Self {
        Self::new()
            .with_plugin(
                PluginDescriptorBuilder::new("maven-clean-plugin", "3.3", "clean")
                    .mojo(MojoBuilder::new("clean").phase("clean"))
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-resources-plugin", "3.3", "resources")
                    .mojo(MojoBuilder::new("resources").phase("process-resources"))
                    .mojo(MojoBuilder::new("testResources").phase("process-test-resources"))
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-compiler-plugin", "3.13", "compiler")
                    .mojo(MojoBuilder::new("compile").phase("compile"))
                    .mojo(MojoBuilder::new("testCompile").phase("test-compile"))
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-surefire-plugin", "3.2", "surefire")
                    .mojo(MojoBuilder::new("test").phase("test"))
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-jar-plugin", "3.4", "jar")
                    .mojo(MojoBuilder::new("jar").phase("package"))
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-war-plugin", "3.4", "war")
                    .mojo(MojoBuilder::new("war").phase("package"))
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-install-plugin", "3.1", "install")
                    .mojo(MojoBuilder::new("install").phase("install"))
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-deploy-plugin", "3.1", "deploy")
                    .mojo(MojoBuilder::new("deploy").phase("deploy").requires_online())
                    .build(),
            )
            .with_plugin(
                PluginDescriptorBuilder::new("maven-site-plugin", "4.0", "site")
                    .mojo(MojoBuilder::new("site").phase("site"))
                    .mojo(MojoBuilder::new("deploy").phase("site-deploy"))
                    .mojo(MojoBuilder::new("attach-descriptor").phase("package"))
                    .build(),
            )
    }

    /// Put the catalog plugin using `prefix` into the global prefix index,
    /// as if it had been loaded earlier in the build.
    pub fn index_prefix(mut self, prefix: &str) -> Self {
        let descriptor = self
            .catalog
            .iter()
            .find(|d| d.goal_prefix == prefix)
            .cloned()
            .expect("prefix must belong to a catalog plugin");
        self.prefix_index.insert(prefix.to_string(), descriptor);
        self
    }

    /// `goal` (as `prefix:goal`) reports a build failure in `project`.
    pub fn fail_goal(mut self, project: &str, goal: &str) -> Self {
        self.failures.insert(
            format!("{project}/{goal}"),
            FakeFailure::Build(format!("{goal} failed")),
        );
        self
    }

    /// `goal` (as `prefix:goal`) errors out while executing in `project`.
    pub fn error_goal(mut self, project: &str, goal: &str) -> Self {
        self.failures.insert(
            format!("{project}/{goal}"),
            FakeFailure::Error(format!("{goal} crashed")),
        );
        self
    }

    pub fn executed(&self) -> Vec<ExecutedMojo> {
        self.executed.lock().unwrap().clone()
    }

    /// `project/prefix:goal` for every invocation, in order.
    pub fn executed_goals(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .map(|m| format!("{}/{}", m.project, m.goal))
            .collect()
    }

    /// `prefix:goal` for every invocation in `project`, in order.
    pub fn executed_goals_for(&self, project: &str) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|m| m.project == project)
            .map(|m| m.goal)
            .collect()
    }
}

impl PluginManager for FakePluginManager {
    fn load_plugin_descriptor(
        &self,
        plugin: &Plugin,
        _project: &Project,
        _session: &BuildSession,
    ) -> Result<Arc<PluginDescriptor>, PluginError> {
        let key = plugin.key();
        let versions: Vec<&Arc<PluginDescriptor>> =
            self.catalog.iter().filter(|d| d.key == key).collect();
        if versions.is_empty() {
            return Err(PluginError::NotFound(key.to_string()));
        }
        let found = match &plugin.version {
            Some(version) => versions.into_iter().find(|d| &d.version == version),
            None => versions.last().copied(),
        };
        found.cloned().ok_or_else(|| PluginError::VersionResolution {
            plugin: key.to_string(),
            reason: "unknown version".to_string(),
        })
    }

    fn descriptor_for_prefix(&self, prefix: &str) -> Option<Arc<PluginDescriptor>> {
        self.prefix_index.get(prefix).cloned()
    }

    fn plugin_definition_for_prefix(
        &self,
        prefix: &str,
        _project: &Project,
        _session: &BuildSession,
    ) -> Option<Plugin> {
        self.catalog
            .iter()
            .find(|d| d.goal_prefix == prefix)
            .map(|d| Plugin::from_key(&d.key))
    }

    fn execute_mojo(
        &self,
        project: &Project,
        execution: &MojoExecution,
        _session: &BuildSession,
    ) -> Result<(), MojoError> {
        let goal = execution.descriptor().full_goal_name();
        self.executed.lock().unwrap().push(ExecutedMojo {
            project: project.id().to_string(),
            goal: goal.clone(),
            execution_id: execution.execution_id().to_string(),
            configuration: execution.configuration().cloned(),
            reports: execution.reports().iter().map(|r| r.mojo.to_string()).collect(),
        });

        match self.failures.get(&format!("{}/{goal}", project.id())) {
            Some(FakeFailure::Build(msg)) => Err(MojoError::Failure(msg.clone())),
            Some(FakeFailure::Error(msg)) => Err(MojoError::Execution(msg.clone())),
            None => Ok(()),
        }
    }

    fn get_report(
        &self,
        _project: &Project,
        execution: &MojoExecution,
        _session: &BuildSession,
    ) -> Result<Option<Report>, PluginError> {
        let mojo = execution.descriptor();
        Ok(mojo.report.then(|| Report {
            mojo: mojo.id(),
            execution_id: execution.execution_id().to_string(),
        }))
    }
}
