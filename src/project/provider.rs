// src/project/provider.rs

use tracing::trace;

use crate::model::{Plugin, ProjectModel};
use crate::project::Project;
use crate::project::interpolation::{InterpolationContext, InterpolationError};
use crate::session::BuildSession;

/// Computes the concrete (fully interpolated) model of a project.
///
/// The declared model is never touched; callers store the result on the
/// project with [`Project::set_concrete`].
pub trait ProjectModelProvider: Send + Sync + std::fmt::Debug {
    fn calculate_concrete_state(
        &self,
        project: &Project,
        session: &BuildSession,
    ) -> Result<ProjectModel, InterpolationError>;
}

/// Interpolates every string-valued part of the declared model.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolatingModelProvider;

impl ProjectModelProvider for InterpolatingModelProvider {
    fn calculate_concrete_state(
        &self,
        project: &Project,
        session: &BuildSession,
    ) -> Result<ProjectModel, InterpolationError> {
        let declared = project.declared();
        let ctx =
            InterpolationContext::for_project(declared, project.artifact_handler(), session);

        let mut model = declared.clone();
        model.version = ctx.interpolate(&declared.version)?;
        model.name = ctx.interpolate(&declared.name)?;
        for value in model.properties.values_mut() {
            *value = ctx.interpolate(value)?;
        }
        if let Some(goal) = model.default_goal.as_mut() {
            *goal = ctx.interpolate(goal)?;
        }
        for plugin in model
            .build_plugins
            .iter_mut()
            .chain(model.plugin_management.iter_mut())
        {
            interpolate_plugin(plugin, &ctx)?;
        }
        for report in &mut model.report_plugins {
            if let Some(version) = report.version.as_mut() {
                *version = ctx.interpolate(version)?;
            }
        }

        trace!(project = %project.id(), "calculated concrete state");
        Ok(model)
    }
}

fn interpolate_plugin(
    plugin: &mut Plugin,
    ctx: &InterpolationContext,
) -> Result<(), InterpolationError> {
    if let Some(version) = plugin.version.as_mut() {
        *version = ctx.interpolate(version)?;
    }
    if let Some(cfg) = plugin.configuration.as_ref() {
        plugin.configuration = Some(ctx.interpolate_configuration(cfg)?);
    }
    for execution in &mut plugin.executions {
        if let Some(cfg) = execution.configuration.as_ref() {
            execution.configuration = Some(ctx.interpolate_configuration(cfg)?);
        }
        if let Some(phase) = execution.phase.as_mut() {
            *phase = ctx.interpolate(phase)?;
        }
    }
    Ok(())
}
