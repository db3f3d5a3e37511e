#![allow(dead_code)]

use std::sync::Arc;

use buildcycle::lifecycle::LifecycleMapping;
use buildcycle::model::{
    ArtifactHandler, Configuration, LifecycleOverlay, MojoDescriptor, Plugin, PluginDescriptor,
    PluginExecution, PluginKey, ProjectModel, ReportPlugin, ReportSet,
};
use buildcycle::project::Project;

pub const GROUP: &str = "org.apache.maven.plugins";

/// Parse a TOML snippet into a configuration tree.
pub fn config(toml_src: &str) -> Configuration {
    toml::from_str(toml_src).expect("valid TOML configuration")
}

/// Builder for a reactor `Project`.
pub struct ProjectBuilder {
    id: String,
    model: ProjectModel,
}

impl ProjectBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            model: ProjectModel::new("com.example", id, "1.0"),
        }
    }

    pub fn packaging(mut self, packaging: &str) -> Self {
        self.model.packaging = packaging.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.model.version = version.to_string();
        self
    }

    pub fn depends_on(mut self, id: &str) -> Self {
        self.model.dependencies.push(id.to_string());
        self
    }

    pub fn default_goal(mut self, goal: &str) -> Self {
        self.model.default_goal = Some(goal.to_string());
        self
    }

    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.model
            .properties
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.model.build_plugins.push(plugin);
        self
    }

    pub fn managed_plugin(mut self, plugin: Plugin) -> Self {
        self.model.plugin_management.push(plugin);
        self
    }

    pub fn report_plugin(mut self, plugin: ReportPlugin) -> Self {
        self.model.report_plugins.push(plugin);
        self
    }

    pub fn exclude_default_reports(mut self) -> Self {
        self.model.exclude_default_reports = true;
        self
    }

    pub fn build(self) -> Project {
        Project::new(self.id, self.model)
    }
}

/// Builder for a declared build `Plugin`.
pub struct PluginBuilder {
    plugin: Plugin,
}

impl PluginBuilder {
    pub fn new(artifact_id: &str) -> Self {
        Self::with_group(GROUP, artifact_id)
    }

    pub fn with_group(group_id: &str, artifact_id: &str) -> Self {
        Self {
            plugin: Plugin::new(group_id, artifact_id),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.plugin.version = Some(version.to_string());
        self
    }

    pub fn extensions(mut self) -> Self {
        self.plugin.extensions = true;
        self
    }

    pub fn not_inherited(mut self) -> Self {
        self.plugin.inheritance_applied = false;
        self
    }

    pub fn configuration(mut self, cfg: Configuration) -> Self {
        self.plugin.configuration = Some(cfg);
        self
    }

    pub fn execution(mut self, execution: PluginExecution) -> Self {
        self.plugin.executions.push(execution);
        self
    }

    pub fn build(self) -> Plugin {
        self.plugin
    }
}

/// Builder for a `PluginExecution`.
pub struct ExecutionBuilder {
    execution: PluginExecution,
}

impl ExecutionBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            execution: PluginExecution::new(id),
        }
    }

    pub fn phase(mut self, phase: &str) -> Self {
        self.execution.phase = Some(phase.to_string());
        self
    }

    pub fn goal(mut self, goal: &str) -> Self {
        self.execution.goals.push(goal.to_string());
        self
    }

    pub fn not_inherited(mut self) -> Self {
        self.execution.inheritance_applied = false;
        self
    }

    pub fn configuration(mut self, cfg: Configuration) -> Self {
        self.execution.configuration = Some(cfg);
        self
    }

    pub fn build(self) -> PluginExecution {
        self.execution
    }
}

/// Report plugin with optional report sets.
pub fn report_plugin(artifact_id: &str, sets: Vec<(&str, Vec<&str>)>) -> ReportPlugin {
    let mut plugin = ReportPlugin::new(GROUP, artifact_id);
    plugin.report_sets = sets
        .into_iter()
        .map(|(id, reports)| ReportSet {
            id: id.to_string(),
            reports: reports.iter().map(|r| r.to_string()).collect(),
        })
        .collect();
    plugin
}

/// Builder for a `MojoDescriptor`; the plugin key and prefix are filled in
/// by [`PluginDescriptorBuilder::mojo`].
pub struct MojoBuilder {
    mojo: MojoDescriptor,
}

impl MojoBuilder {
    pub fn new(goal: &str) -> Self {
        Self {
            mojo: MojoDescriptor::new(PluginKey::new("", ""), "", goal),
        }
    }

    pub fn phase(mut self, phase: &str) -> Self {
        self.mojo.phase = Some(phase.to_string());
        self
    }

    pub fn aggregator(mut self) -> Self {
        self.mojo.aggregator = true;
        self
    }

    pub fn no_project(mut self) -> Self {
        self.mojo.requires_project = false;
        self
    }

    pub fn requires_online(mut self) -> Self {
        self.mojo.requires_online = true;
        self
    }

    pub fn requires_reports(mut self) -> Self {
        self.mojo.requires_reports = true;
        self
    }

    pub fn report(mut self) -> Self {
        self.mojo.report = true;
        self
    }

    pub fn direct_invocation_only(mut self) -> Self {
        self.mojo.direct_invocation_only = true;
        self
    }

    pub fn not_inherited_by_default(mut self) -> Self {
        self.mojo.inherited_by_default = false;
        self
    }

    pub fn forks_phase(mut self, phase: &str) -> Self {
        self.mojo.execute_phase = Some(phase.to_string());
        self
    }

    pub fn forks_goal(mut self, goal: &str) -> Self {
        self.mojo.execute_goal = Some(goal.to_string());
        self
    }

    pub fn forks_lifecycle(mut self, overlay: &str) -> Self {
        self.mojo.execute_lifecycle = Some(overlay.to_string());
        self
    }

    pub fn configuration(mut self, cfg: Configuration) -> Self {
        self.mojo.configuration = Some(cfg);
        self
    }

    pub fn command(mut self, cmd: &str) -> Self {
        self.mojo.command = Some(cmd.to_string());
        self
    }
}

/// Builder for a `PluginDescriptor`.
pub struct PluginDescriptorBuilder {
    descriptor: PluginDescriptor,
}

impl PluginDescriptorBuilder {
    pub fn new(artifact_id: &str, version: &str, prefix: &str) -> Self {
        Self::with_group(GROUP, artifact_id, version, prefix)
    }

    pub fn with_group(group_id: &str, artifact_id: &str, version: &str, prefix: &str) -> Self {
        Self {
            descriptor: PluginDescriptor::new(
                PluginKey::new(group_id, artifact_id),
                version,
                prefix,
            ),
        }
    }

    pub fn mojo(mut self, builder: MojoBuilder) -> Self {
        let mut mojo = builder.mojo;
        mojo.plugin = self.descriptor.key.clone();
        mojo.goal_prefix = self.descriptor.goal_prefix.clone();
        self.descriptor.mojos.push(Arc::new(mojo));
        self
    }

    pub fn not_inherited_by_default(mut self) -> Self {
        self.descriptor.inherited_by_default = false;
        self
    }

    pub fn lifecycle(mut self, overlay: LifecycleOverlay) -> Self {
        self.descriptor.lifecycles.push(overlay);
        self
    }

    pub fn lifecycle_mapping(mut self, packaging: &str, mapping: LifecycleMapping) -> Self {
        self.descriptor
            .lifecycle_mappings
            .insert(packaging.to_string(), mapping);
        self
    }

    pub fn artifact_handler(mut self, packaging: &str, extension: &str) -> Self {
        self.descriptor.artifact_handlers.push(ArtifactHandler {
            packaging: packaging.to_string(),
            extension: extension.to_string(),
            language: None,
        });
        self
    }

    pub fn build(self) -> PluginDescriptor {
        self.descriptor
    }
}
