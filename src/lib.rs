// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod plugin;
pub mod project;
pub mod reactor;
pub mod session;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::errors::BuildcycleError;
use crate::events::TracingEventSink;
use crate::lifecycle::{DefaultLifecycleMappings, LifecycleExecutor, LifecycleRegistry};
use crate::plugin::CatalogPluginManager;
use crate::reactor::{BuildSummary, ProjectResult, Reactor, ReactorManager};
use crate::session::{BuildSession, Settings};
use crate::types::FailureBehaviour;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - build file loading and validation
/// - the plugin catalog and packaging mappings
/// - the reactor, session and failure policy
/// - the lifecycle executor and the final summary
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root_dir = config_root_dir(&config_path);

    let executor = build_executor(&cfg, root_dir)?;

    let properties = args.define.iter().cloned().collect();
    let settings = Settings {
        offline: args.offline || cfg.settings.offline,
    };
    let reactor = Reactor::from_config(&cfg)?;
    let mut session =
        BuildSession::new(args.goals.clone(), settings, reactor).with_user_properties(properties);

    if args.dry_run {
        print_dry_run(&executor, &mut session)?;
        return Ok(());
    }

    let behaviour = args
        .failure_behaviour()
        .unwrap_or(cfg.settings.failure_behaviour);
    let mut reactor_manager = ReactorManager::new(session.reactor(), behaviour);

    let outcome = executor.execute(&mut session, &mut reactor_manager, &TracingEventSink);

    let summary = reactor_manager.summary(session.reactor().sorted_ids());
    log_summary(&summary);

    outcome?;
    if reactor_manager.has_failures() {
        if reactor_manager.failure_behaviour() == FailureBehaviour::FailNever {
            warn!("Build failures were ignored.");
            return Ok(());
        }
        return Err(BuildcycleError::BuildFailure(format!(
            "{} project(s) failed",
            summary.failure_count()
        ))
        .into());
    }
    Ok(())
}

/// Executor wired to the catalog plugin manager and the packaging table of
/// the build file.
pub fn build_executor(cfg: &ConfigFile, root_dir: PathBuf) -> Result<LifecycleExecutor> {
    let registry = Arc::new(LifecycleRegistry::standard()?);
    let plugins = Arc::new(CatalogPluginManager::from_config(cfg, root_dir));

    let mut mappings = DefaultLifecycleMappings::standard();
    for (packaging, mapping) in &cfg.packaging {
        debug!(packaging = %packaging, "registering packaging mapping from build file");
        mappings.register(packaging.clone(), mapping.clone());
    }

    Ok(LifecycleExecutor::new(registry, plugins)
        .with_mapping_provider(Arc::new(mappings))
        .with_default_reports(cfg.settings.default_reports.clone()))
}

/// Directory the build file lives in; project paths are relative to it.
///
/// A bare filename like "Buildcycle.toml" (parent = "") falls back to the
/// current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn log_summary(summary: &BuildSummary) {
    info!("------------------------------------------------------------------------");
    info!("Reactor Summary:");
    for (id, result) in &summary.results {
        match result {
            ProjectResult::Failed { message, .. } => {
                error!("{id} {result}");
                error!("  {message}");
            }
            _ => info!("{id} {result}"),
        }
    }
    info!("------------------------------------------------------------------------");
    if summary.is_success() {
        info!("BUILD SUCCESSFUL");
    } else {
        error!("BUILD FAILED");
    }
}

/// Dry-run output: reactor order, task segments and the goal chain every
/// phase expands to, without running anything.
fn print_dry_run(executor: &LifecycleExecutor, session: &mut BuildSession) -> Result<()> {
    println!("buildcycle dry-run");
    println!("  offline = {}", session.settings.offline);
    println!();

    println!("reactor build order ({}):", session.reactor().len());
    for project in session.reactor().projects() {
        println!("  - {} ({})", project.id(), project.model().coordinate());
        let deps = session.reactor().graph().dependencies_of(project.id());
        if !deps.is_empty() {
            println!("      depends on: {deps:?}");
        }
    }
    println!();

    let segments = executor.plan(session)?;
    for segment in &segments {
        println!("{segment}");

        let targets: Vec<String> = if segment.is_aggregate() {
            session
                .reactor()
                .top_level_id()
                .map(str::to_string)
                .into_iter()
                .collect()
        } else {
            session.reactor().sorted_ids().to_vec()
        };

        for id in targets {
            let Some(mut project) = session.reactor().project(&id).cloned() else {
                continue;
            };
            println!("  {id}:");
            for task in segment.tasks() {
                if !executor.registry().is_phase(task) {
                    println!("    {task}");
                    continue;
                }
                let lifecycle = executor.registry().lifecycle_for_phase(task)?;
                let bindings = executor
                    .bindings()
                    .construct_lifecycle_mappings(session, task, &mut project, lifecycle)?;
                println!("    {task}:");
                for execution in bindings.goal_chain(task, lifecycle) {
                    println!(
                        "      {} {{execution: {}}}",
                        execution.descriptor().full_goal_name(),
                        execution.execution_id()
                    );
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
