// src/project/interpolation.rs

//! `${...}` expression resolution for project models and mojo configuration.
//!
//! Expressions are looked up in a flat context built from the project
//! coordinates, project properties, session user properties and `env.*`.
//! Resolved values may themselves contain expressions; those are resolved
//! recursively and self-referencing chains are rejected. Unknown
//! expressions are left verbatim so downstream consumers (such as
//! `${session.*}` references) still see them.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use toml::Value;

use crate::model::{ArtifactHandler, Configuration, ProjectModel};
use crate::project::Project;
use crate::session::BuildSession;

static EXPRESSION: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("unterminated expression in '{0}'")]
    Unterminated(String),

    #[error("expression '${{{0}}}' references itself")]
    Recursive(String),

    #[error("invalid expression pattern: {0}")]
    Pattern(String),
}

#[derive(Debug, Clone, Default)]
pub struct InterpolationContext {
    values: BTreeMap<String, String>,
}

impl InterpolationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a project model within a session. Later sources override
    /// earlier ones: coordinates, then project properties, then session
    /// user properties.
    pub fn for_project(
        model: &ProjectModel,
        handler: Option<&ArtifactHandler>,
        session: &BuildSession,
    ) -> Self {
        let mut ctx = Self::new();
        ctx.insert("project.groupId", &model.group_id);
        ctx.insert("project.artifactId", &model.artifact_id);
        ctx.insert("project.version", &model.version);
        ctx.insert("project.name", &model.name);
        ctx.insert("project.packaging", &model.packaging);

        let basedir = model
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ".".to_string());
        ctx.insert("project.basedir", &basedir);
        ctx.insert("basedir", &basedir);

        let extension = handler
            .map(|h| h.extension.as_str())
            .unwrap_or(model.packaging.as_str());
        ctx.insert("project.artifact.extension", extension);
        ctx.insert("settings.offline", &session.settings.offline.to_string());

        for (key, value) in &model.properties {
            ctx.insert(key, value);
        }
        for (key, value) in &session.user_properties {
            ctx.insert(key, value);
        }
        ctx
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn lookup(&self, expression: &str) -> Option<String> {
        if let Some(value) = self.values.get(expression) {
            return Some(value.clone());
        }
        expression
            .strip_prefix("env.")
            .and_then(|name| std::env::var(name).ok())
    }

    pub fn interpolate(&self, input: &str) -> Result<String, InterpolationError> {
        let mut stack = Vec::new();
        self.interpolate_with(input, &mut stack)
    }

    fn interpolate_with(
        &self,
        input: &str,
        stack: &mut Vec<String>,
    ) -> Result<String, InterpolationError> {
        if let Some(pos) = input.rfind("${")
            && !input[pos..].contains('}')
        {
            return Err(InterpolationError::Unterminated(input.to_string()));
        }

        let regex = EXPRESSION
            .as_ref()
            .map_err(|e| InterpolationError::Pattern(e.to_string()))?;

        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in regex.captures_iter(input) {
            let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&input[last..whole.start()]);
            last = whole.end();

            let expression = expr.as_str().trim();
            match self.lookup(expression) {
                Some(raw) => {
                    if stack.iter().any(|e| e == expression) {
                        return Err(InterpolationError::Recursive(expression.to_string()));
                    }
                    stack.push(expression.to_string());
                    let resolved = self.interpolate_with(&raw, stack)?;
                    stack.pop();
                    out.push_str(&resolved);
                }
                None => out.push_str(whole.as_str()),
            }
        }
        out.push_str(&input[last..]);
        Ok(out)
    }

    pub fn interpolate_configuration(
        &self,
        configuration: &Configuration,
    ) -> Result<Configuration, InterpolationError> {
        configuration
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.interpolate_value(value)?)))
            .collect()
    }

    fn interpolate_value(&self, value: &Value) -> Result<Value, InterpolationError> {
        Ok(match value {
            Value::String(s) => Value::String(self.interpolate(s)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.interpolate_value(v))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Table(table) => Value::Table(self.interpolate_configuration(table)?),
            other => other.clone(),
        })
    }
}

/// Resolves `${...}` expressions in a mojo configuration immediately before
/// the mojo runs.
pub trait ConfigurationInterpolator: Send + Sync + std::fmt::Debug {
    fn interpolate(
        &self,
        configuration: &Configuration,
        project: &Project,
        session: &BuildSession,
    ) -> Result<Configuration, InterpolationError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexConfigurationInterpolator;

impl ConfigurationInterpolator for RegexConfigurationInterpolator {
    fn interpolate(
        &self,
        configuration: &Configuration,
        project: &Project,
        session: &BuildSession,
    ) -> Result<Configuration, InterpolationError> {
        InterpolationContext::for_project(project.model(), project.artifact_handler(), session)
            .interpolate_configuration(configuration)
    }
}
