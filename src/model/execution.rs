// src/model/execution.rs

use std::sync::Arc;

use super::configuration::Configuration;
use super::descriptor::{MojoDescriptor, MojoId, PluginDescriptor};

/// Prefix of execution ids synthesized by the engine.
pub const DEFAULT_EXEC_ID_PREFIX: &str = "default-";

/// Execution id given to goals invoked directly from the command line.
pub const CLI_EXECUTION_ID: &str = "default-cli";

/// A resolved mojo together with the plugin that provides it.
#[derive(Debug, Clone)]
pub struct MojoHandle {
    pub plugin: Arc<PluginDescriptor>,
    pub mojo: Arc<MojoDescriptor>,
}

impl MojoHandle {
    pub fn new(plugin: Arc<PluginDescriptor>, mojo: Arc<MojoDescriptor>) -> Self {
        Self { plugin, mojo }
    }
}

/// Report produced by a reporting mojo.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub mojo: MojoId,
    pub execution_id: String,
}

/// A mojo scheduled to run, with the configuration it runs with.
#[derive(Debug, Clone)]
pub struct MojoExecution {
    handle: MojoHandle,
    execution_id: String,
    configuration: Option<Configuration>,
    reports: Vec<Report>,
}

impl MojoExecution {
    /// Execution with the synthesized `default-<goal>` id.
    pub fn new(handle: MojoHandle) -> Self {
        let id = format!("{DEFAULT_EXEC_ID_PREFIX}{}", handle.mojo.goal);
        Self::with_id(handle, id)
    }

    pub fn with_id(handle: MojoHandle, execution_id: impl Into<String>) -> Self {
        Self {
            handle,
            execution_id: execution_id.into(),
            configuration: None,
            reports: Vec::new(),
        }
    }

    pub fn with_configuration(mut self, configuration: Option<Configuration>) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn handle(&self) -> &MojoHandle {
        &self.handle
    }

    pub fn descriptor(&self) -> &Arc<MojoDescriptor> {
        &self.handle.mojo
    }

    pub fn plugin(&self) -> &Arc<PluginDescriptor> {
        &self.handle.plugin
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn is_default_execution(&self) -> bool {
        self.execution_id.starts_with(DEFAULT_EXEC_ID_PREFIX)
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_ref()
    }

    pub fn set_configuration(&mut self, configuration: Option<Configuration>) {
        self.configuration = configuration;
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn set_reports(&mut self, reports: Vec<Report>) {
        self.reports = reports;
    }
}
