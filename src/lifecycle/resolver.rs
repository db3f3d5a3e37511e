// src/lifecycle/resolver.rs

//! Turns task strings into resolved mojos.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{BuildcycleError, Result};
use crate::model::{MojoHandle, Plugin, PluginDescriptor, PluginKey};
use crate::plugin::PluginManager;
use crate::project::Project;
use crate::session::BuildSession;

/// Parsed form of a non-phase task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    /// `prefix:goal`
    Prefixed { prefix: String, goal: String },
    /// `groupId:artifactId[:version]:goal`
    Coordinate {
        group_id: String,
        artifact_id: String,
        version: Option<String>,
        goal: String,
    },
}

impl TaskRef {
    /// Split on `:`, ignoring empty tokens.
    pub fn parse(task: &str) -> Result<Self> {
        let tokens: Vec<&str> = task.split(':').filter(|t| !t.is_empty()).collect();
        match tokens.as_slice() {
            [prefix, goal] => Ok(TaskRef::Prefixed {
                prefix: prefix.to_string(),
                goal: goal.to_string(),
            }),
            [group, artifact, goal] => Ok(TaskRef::Coordinate {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: None,
                goal: goal.to_string(),
            }),
            [group, artifact, version, goal] => Ok(TaskRef::Coordinate {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: Some(version.to_string()),
                goal: goal.to_string(),
            }),
            _ => Err(BuildcycleError::MalformedTask(task.to_string())),
        }
    }

    pub fn goal(&self) -> &str {
        match self {
            TaskRef::Prefixed { goal, .. } | TaskRef::Coordinate { goal, .. } => goal,
        }
    }
}

/// One resolution request.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub task: &'a str,
    /// Phase or goal that caused the lookup, for error messages.
    pub invoked_via: &'a str,
    /// Prefix form is only allowed for direct invocation.
    pub can_use_prefix: bool,
    /// Missing plugins or goals yield `None` instead of an error.
    pub optional: bool,
}

impl<'a> ResolveRequest<'a> {
    /// A goal typed by the user.
    pub fn direct(task: &'a str) -> Self {
        Self {
            task,
            invoked_via: task,
            can_use_prefix: true,
            optional: false,
        }
    }

    /// A goal named in a packaging mapping.
    pub fn mapped(task: &'a str, invoked_via: &'a str, optional: bool) -> Self {
        Self {
            task,
            invoked_via,
            can_use_prefix: false,
            optional,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PluginResolver {
    plugins: Arc<dyn PluginManager>,
}

impl PluginResolver {
    pub fn new(plugins: Arc<dyn PluginManager>) -> Self {
        Self { plugins }
    }

    /// Resolve a task to its mojo, recording the plugin on `project`.
    ///
    /// Returns `Ok(None)` only for optional requests whose plugin or goal
    /// is missing.
    pub fn resolve(
        &self,
        request: ResolveRequest<'_>,
        project: &mut Project,
        session: &BuildSession,
    ) -> Result<Option<MojoHandle>> {
        match self.resolve_inner(request, project, session) {
            Err(err) if request.optional && err.is_not_found() => {
                info!("Skipping missing optional mojo: {}", request.task);
                debug!(task = request.task, error = %err, "optional mojo lookup failed");
                Ok(None)
            }
            other => other,
        }
    }

    fn resolve_inner(
        &self,
        request: ResolveRequest<'_>,
        project: &mut Project,
        session: &BuildSession,
    ) -> Result<Option<MojoHandle>> {
        let task_ref = TaskRef::parse(request.task)?;

        let (mut plugin, descriptor) = match &task_ref {
            TaskRef::Prefixed { prefix, .. } => {
                if !request.can_use_prefix {
                    return Err(BuildcycleError::PrefixNotAllowed {
                        task: request.task.to_string(),
                        invoked_via: request.invoked_via.to_string(),
                    });
                }
                self.plugin_for_prefix(prefix, project, session)?
            }
            TaskRef::Coordinate {
                group_id,
                artifact_id,
                version,
                ..
            } => (
                Plugin::new(group_id.clone(), artifact_id.clone()).with_version(version.clone()),
                None,
            ),
        };

        if plugin.version.is_none() {
            if let Some(declared) = project.declared_plugin(&plugin.key()) {
                plugin = declared.clone();
            }
            project.inject_plugin_management(&mut plugin);
        }

        let descriptor = match descriptor {
            Some(descriptor) => descriptor,
            None => self.verify_plugin(&plugin, project, session)?,
        };

        project.add_plugin(plugin);

        let goal = task_ref.goal();
        match descriptor.mojo(goal) {
            Some(mojo) => Ok(Some(MojoHandle::new(Arc::clone(&descriptor), Arc::clone(mojo)))),
            None => Err(BuildcycleError::MojoNotFound {
                goal: request.task.to_string(),
                plugin: descriptor.id(),
            }),
        }
    }

    /// Prefix lookup order: loaded-descriptor index, the project's own build
    /// plugins, a repository search, then the conventional coordinate.
    fn plugin_for_prefix(
        &self,
        prefix: &str,
        project: &Project,
        session: &BuildSession,
    ) -> Result<(Plugin, Option<Arc<PluginDescriptor>>)> {
        if let Some(descriptor) = self.plugins.descriptor_for_prefix(prefix) {
            let plugin =
                Plugin::from_key(&descriptor.key).with_version(Some(descriptor.version.clone()));
            return Ok((plugin, Some(descriptor)));
        }

        for declared in project.build_plugins() {
            match self.verify_plugin(declared, project, session) {
                Ok(descriptor) if descriptor.goal_prefix == prefix => {
                    return Ok((declared.clone(), Some(descriptor)));
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(
                        plugin = %declared.key(),
                        error = %err,
                        "skipping unloadable plugin during prefix search"
                    );
                }
            }
        }

        if let Some(plugin) = self.plugins.plugin_definition_for_prefix(prefix, project, session) {
            return Ok((plugin, None));
        }

        debug!(prefix, "no plugin found for prefix; using default coordinate");
        Ok((Plugin::from_key(&PluginKey::for_prefix(prefix)), None))
    }

    /// Load the descriptor for a plugin declaration.
    pub fn verify_plugin(
        &self,
        plugin: &Plugin,
        project: &Project,
        session: &BuildSession,
    ) -> Result<Arc<PluginDescriptor>> {
        self.plugins
            .load_plugin_descriptor(plugin, project, session)
            .map_err(BuildcycleError::from)
    }
}

/// Look up `goal` in an already-loaded plugin, hinting when the goal was
/// written with the plugin's own prefix.
pub fn mojo_in_plugin(plugin: &Arc<PluginDescriptor>, goal: &str) -> Result<MojoHandle> {
    if let Some(mojo) = plugin.mojo(goal) {
        return Ok(MojoHandle::new(Arc::clone(plugin), Arc::clone(mojo)));
    }

    let hint = match goal.split_once(':') {
        Some((prefix, rest)) if prefix == plugin.goal_prefix => {
            format!(" (goals should not be prefixed - try '{rest}')")
        }
        _ => String::new(),
    };
    Err(BuildcycleError::MojoNotFound {
        goal: goal.to_string(),
        plugin: format!("plugin '{}'{hint}", plugin.goal_prefix),
    })
}
