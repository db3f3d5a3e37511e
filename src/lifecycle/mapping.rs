// src/lifecycle/mapping.rs

//! Packaging -> (lifecycle -> phase -> goals) tables.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Phase bindings for one packaging type.
///
/// Goal lists are comma-separated `groupId:artifactId[:version]:goal`
/// strings. `optional_mojos` lists goals that may be silently skipped when
/// their plugin or goal cannot be found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LifecycleMapping {
    #[serde(default)]
    pub phases: BTreeMap<String, BTreeMap<String, String>>,

    #[serde(default)]
    pub optional_mojos: BTreeMap<String, Vec<String>>,
}

impl LifecycleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, lifecycle: &str, phase: &str, goals: &str) -> Self {
        self.phases
            .entry(lifecycle.to_string())
            .or_default()
            .insert(phase.to_string(), goals.to_string());
        self
    }

    pub fn optional(mut self, lifecycle: &str, goal: &str) -> Self {
        self.optional_mojos
            .entry(lifecycle.to_string())
            .or_default()
            .push(goal.to_string());
        self
    }

    pub fn phases_for(&self, lifecycle: &str) -> Option<&BTreeMap<String, String>> {
        self.phases.get(lifecycle)
    }

    pub fn optional_mojos_for(&self, lifecycle: &str) -> Option<&[String]> {
        self.optional_mojos.get(lifecycle).map(Vec::as_slice)
    }
}

/// Source of packaging mappings outside of plugin extensions.
pub trait LifecycleMappingProvider: Send + Sync + std::fmt::Debug {
    fn mapping_for(&self, packaging: &str) -> Option<&LifecycleMapping>;
}

/// Built-in packaging table, extendable from the `[packaging.<name>]`
/// sections of the build file.
#[derive(Debug, Clone, Default)]
pub struct DefaultLifecycleMappings {
    mappings: HashMap<String, LifecycleMapping>,
}

impl DefaultLifecycleMappings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mappings for `jar`, `pom`, `war` and `maven-plugin`.
    pub fn standard() -> Self {
        let mut mappings = Self::empty();
        mappings.register("jar", jar_mapping());
        mappings.register("pom", pom_mapping());
        mappings.register("war", war_mapping());
        mappings.register("maven-plugin", plugin_mapping());
        mappings
    }

    /// Register (or replace) the mapping for a packaging.
    pub fn register(&mut self, packaging: impl Into<String>, mapping: LifecycleMapping) {
        self.mappings.insert(packaging.into(), mapping);
    }
}

impl LifecycleMappingProvider for DefaultLifecycleMappings {
    fn mapping_for(&self, packaging: &str) -> Option<&LifecycleMapping> {
        self.mappings.get(packaging)
    }
}

const RESOURCES: &str = "org.apache.maven.plugins:maven-resources-plugin:resources";
const TEST_RESOURCES: &str = "org.apache.maven.plugins:maven-resources-plugin:testResources";
const COMPILE: &str = "org.apache.maven.plugins:maven-compiler-plugin:compile";
const TEST_COMPILE: &str = "org.apache.maven.plugins:maven-compiler-plugin:testCompile";
const TEST: &str = "org.apache.maven.plugins:maven-surefire-plugin:test";
const INSTALL: &str = "org.apache.maven.plugins:maven-install-plugin:install";
const DEPLOY: &str = "org.apache.maven.plugins:maven-deploy-plugin:deploy";
const ATTACH_DESCRIPTOR: &str = "org.apache.maven.plugins:maven-site-plugin:attach-descriptor";

fn compiled_mapping(package_goals: &str) -> LifecycleMapping {
    LifecycleMapping::new()
        .bind("default", "process-resources", RESOURCES)
        .bind("default", "compile", COMPILE)
        .bind("default", "process-test-resources", TEST_RESOURCES)
        .bind("default", "test-compile", TEST_COMPILE)
        .bind("default", "test", TEST)
        .bind("default", "package", package_goals)
        .bind("default", "install", INSTALL)
        .bind("default", "deploy", DEPLOY)
}

fn jar_mapping() -> LifecycleMapping {
    compiled_mapping("org.apache.maven.plugins:maven-jar-plugin:jar")
}

fn war_mapping() -> LifecycleMapping {
    compiled_mapping("org.apache.maven.plugins:maven-war-plugin:war")
}

fn plugin_mapping() -> LifecycleMapping {
    compiled_mapping(
        "org.apache.maven.plugins:maven-jar-plugin:jar,\
         org.apache.maven.plugins:maven-plugin-plugin:addPluginArtifactMetadata",
    )
    .bind(
        "default",
        "generate-resources",
        "org.apache.maven.plugins:maven-plugin-plugin:descriptor",
    )
}

fn pom_mapping() -> LifecycleMapping {
    LifecycleMapping::new()
        .bind("default", "package", ATTACH_DESCRIPTOR)
        .bind("default", "install", INSTALL)
        .bind("default", "deploy", DEPLOY)
        .optional("default", ATTACH_DESCRIPTOR)
}
