// src/model/mod.rs

//! Value types shared by every part of the engine.
//!
//! - [`coordinate`]: plugin keys and the default plugin naming convention.
//! - [`configuration`]: structured mojo configuration trees and merging.
//! - [`project`]: the declared project model (as written in the build file).
//! - [`descriptor`]: plugin and mojo descriptors, lifecycle overlays.
//! - [`execution`]: mojo executions produced by binding and resolution.

pub mod configuration;
pub mod coordinate;
pub mod descriptor;
pub mod execution;
pub mod project;

/// Canonical project identifier used throughout the reactor (the key of a
/// `[project.<key>]` section).
pub type ProjectId = String;

pub use configuration::Configuration;
pub use coordinate::PluginKey;
pub use descriptor::{
    ArtifactHandler, LifecycleOverlay, MojoDescriptor, MojoId, OverlayExecution, OverlayPhase,
    PluginDescriptor,
};
pub use execution::{MojoExecution, MojoHandle, Report};
pub use project::{Plugin, PluginExecution, ProjectModel, ReportPlugin, ReportSet};
