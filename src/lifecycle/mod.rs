// src/lifecycle/mod.rs

//! Lifecycle engine.
//!
//! - [`registry`]: lifecycles and the phase index.
//! - [`mapping`]: packaging -> phase -> goals tables.
//! - [`resolver`]: task string -> mojo resolution.
//! - [`bindings`]: per-project phase bindings.
//! - [`segment`]: splitting the task list into aggregate / per-project runs.
//! - [`executor`], [`goals`], [`fork`], [`reports`]: the execution engine.

pub mod bindings;
pub mod executor;
pub mod fork;
pub mod goals;
pub mod mapping;
pub mod registry;
pub mod reports;
pub mod resolver;
pub mod segment;

pub use bindings::{BindingBuilder, LifecycleBindings};
pub use executor::LifecycleExecutor;
pub use fork::ForkStack;
pub use mapping::{DefaultLifecycleMappings, LifecycleMapping, LifecycleMappingProvider};
pub use registry::{Lifecycle, LifecycleRegistry};
pub use resolver::{PluginResolver, ResolveRequest, TaskRef};
pub use segment::{TaskSegment, segment_tasks};
