// src/lifecycle/reports.rs

//! Report executions for mojos that require reports.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{BuildcycleError, Result};
use crate::lifecycle::executor::LifecycleExecutor;
use crate::lifecycle::fork::ForkStack;
use crate::model::{MojoExecution, MojoHandle, PluginDescriptor, Report, ReportPlugin};
use crate::project::Project;
use crate::session::BuildSession;

impl LifecycleExecutor {
    /// Report plugins of the project plus the default reports, expanded to
    /// one execution per selected report mojo.
    pub(crate) fn report_executions(
        &self,
        project: &Project,
        forks: &ForkStack,
        execution: &MojoExecution,
        session: &BuildSession,
    ) -> Result<Vec<MojoExecution>> {
        let mut report_plugins: Vec<ReportPlugin> = project.report_plugins().to_vec();
        if !project.exclude_default_reports() {
            for coordinate in &self.default_reports {
                let Some(default) = parse_default_report(coordinate) else {
                    warn!(
                        "Invalid default report ignored: '{coordinate}' \
                         (must be groupId:artifactId[:version])"
                    );
                    continue;
                };
                if !report_plugins.iter().any(|r| r.key() == default.key()) {
                    report_plugins.push(default);
                }
            }
        }

        let mut executions = Vec::new();
        for report_plugin in &report_plugins {
            let descriptor = self
                .bindings
                .resolver()
                .verify_plugin(&report_plugin.as_plugin(), project, session)?;

            if report_plugin.report_sets.is_empty() {
                executions.extend(report_mojos(&descriptor, None, forks, execution));
            } else {
                for set in &report_plugin.report_sets {
                    executions.extend(report_mojos(
                        &descriptor,
                        Some(set.reports.as_slice()),
                        forks,
                        execution,
                    ));
                }
            }
        }
        Ok(executions)
    }

    /// Run forks requested by report mojos, then materialise the reports.
    pub(crate) fn get_reports(
        &self,
        report_executions: &[MojoExecution],
        forks: &mut ForkStack,
        session: &mut BuildSession,
        project: &mut Project,
    ) -> Result<Vec<Report>> {
        let mut reports = Vec::new();
        for report_execution in report_executions {
            let mojo = report_execution.descriptor();

            if mojo.forks() {
                forks.push(mojo.id());
                let outcome = self.fork_lifecycle(
                    report_execution.handle(),
                    forks,
                    session,
                    project,
                    report_execution.execution_id(),
                );
                forks.pop();
                outcome?;
            }

            match self
                .plugins
                .get_report(project, report_execution, session)
                .map_err(BuildcycleError::from)?
            {
                Some(report) => reports.push(report),
                None => debug!(goal = %mojo.full_goal_name(), "not a report; skipped"),
            }
        }
        Ok(reports)
    }
}

fn parse_default_report(coordinate: &str) -> Option<ReportPlugin> {
    let tokens: Vec<&str> = coordinate.split(':').collect();
    let (group, artifact, version) = match tokens.as_slice() {
        [group, artifact] => (*group, *artifact, None),
        [group, artifact, version] => (*group, *artifact, Some(version.to_string())),
        _ => return None,
    };
    let mut plugin = ReportPlugin::new(group, artifact);
    plugin.version = version;
    Some(plugin)
}

fn report_mojos(
    descriptor: &Arc<PluginDescriptor>,
    selected: Option<&[String]>,
    forks: &ForkStack,
    execution: &MojoExecution,
) -> Vec<MojoExecution> {
    descriptor
        .mojos
        .iter()
        .filter(|m| selected.is_none_or(|goals| goals.contains(&m.goal)))
        .filter(|m| !forks.contains(&m.id()))
        .map(|m| {
            let handle = MojoHandle::new(Arc::clone(descriptor), Arc::clone(m));
            if execution.is_default_execution() {
                MojoExecution::new(handle)
            } else {
                MojoExecution::with_id(handle, execution.execution_id())
            }
        })
        .collect()
}
