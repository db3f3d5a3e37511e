// tests/task_resolution.rs

use std::error::Error;
use std::sync::Arc;

use buildcycle::errors::BuildcycleError;
use buildcycle::lifecycle::resolver::mojo_in_plugin;
use buildcycle::lifecycle::{PluginResolver, ResolveRequest, TaskRef};
use buildcycle::model::PluginKey;
use buildcycle::plugin::PluginManager;
use buildcycle_test_utils::builders::{
    MojoBuilder, PluginBuilder, PluginDescriptorBuilder, ProjectBuilder,
};
use buildcycle_test_utils::{FakePluginManager, init_tracing, session_with};

type TestResult = Result<(), Box<dyn Error>>;

fn resolver(plugins: FakePluginManager) -> PluginResolver {
    let plugins: Arc<dyn PluginManager> = Arc::new(plugins);
    PluginResolver::new(plugins)
}

#[test]
fn task_strings_parse_by_token_count() -> TestResult {
    assert_eq!(
        TaskRef::parse("compiler:compile")?,
        TaskRef::Prefixed {
            prefix: "compiler".into(),
            goal: "compile".into()
        }
    );
    assert_eq!(
        TaskRef::parse("org.example:gen-plugin:run")?,
        TaskRef::Coordinate {
            group_id: "org.example".into(),
            artifact_id: "gen-plugin".into(),
            version: None,
            goal: "run".into()
        }
    );
    assert_eq!(
        TaskRef::parse("org.example:gen-plugin:2.1:run")?,
        TaskRef::Coordinate {
            group_id: "org.example".into(),
            artifact_id: "gen-plugin".into(),
            version: Some("2.1".into()),
            goal: "run".into()
        }
    );
    // Empty tokens are ignored.
    assert_eq!(TaskRef::parse("::jar:jar")?.goal(), "jar");

    assert!(matches!(
        TaskRef::parse("compile"),
        Err(BuildcycleError::MalformedTask(_))
    ));
    assert!(matches!(
        TaskRef::parse("a:b:c:d:e"),
        Err(BuildcycleError::MalformedTask(_))
    ));
    Ok(())
}

#[test]
fn prefix_resolves_through_repository_search_and_records_plugin() -> TestResult {
    init_tracing();
    let resolver = resolver(FakePluginManager::with_standard_plugins());
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&[], vec![project.clone()]);

    let handle = resolver
        .resolve(ResolveRequest::direct("compiler:compile"), &mut project, &session)?
        .expect("mojo resolved");

    assert_eq!(handle.mojo.goal, "compile");
    assert_eq!(handle.plugin.key.artifact_id, "maven-compiler-plugin");
    assert!(
        project
            .resolved_plugins()
            .iter()
            .any(|p| p.artifact_id == "maven-compiler-plugin")
    );
    Ok(())
}

#[test]
fn loaded_prefix_index_wins_over_repository_search() -> TestResult {
    let plugins = FakePluginManager::new()
        .with_plugin(
            PluginDescriptorBuilder::with_group("org.example", "gen-plugin", "1.0", "gen")
                .mojo(MojoBuilder::new("run"))
                .build(),
        )
        .with_plugin(
            PluginDescriptorBuilder::with_group("org.example", "gen-plugin", "2.0", "gen")
                .mojo(MojoBuilder::new("run"))
                .build(),
        )
        .index_prefix("gen");
    let resolver = resolver(plugins);
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&[], vec![project.clone()]);

    let handle = resolver
        .resolve(ResolveRequest::direct("gen:run"), &mut project, &session)?
        .expect("mojo resolved");

    assert_eq!(handle.plugin.version, "1.0");
    Ok(())
}

#[test]
fn declared_and_managed_versions_are_used_when_task_has_none() -> TestResult {
    let plugins = FakePluginManager::new()
        .with_plugin(
            PluginDescriptorBuilder::new("maven-compiler-plugin", "3.1", "compiler")
                .mojo(MojoBuilder::new("compile"))
                .build(),
        )
        .with_plugin(
            PluginDescriptorBuilder::new("maven-compiler-plugin", "3.13", "compiler")
                .mojo(MojoBuilder::new("compile"))
                .build(),
        );
    let resolver = resolver(plugins);

    let mut declared = ProjectBuilder::new("declared")
        .plugin(PluginBuilder::new("maven-compiler-plugin").version("3.1").build())
        .build();
    let mut managed = ProjectBuilder::new("managed")
        .managed_plugin(PluginBuilder::new("maven-compiler-plugin").version("3.1").build())
        .build();
    let mut plain = ProjectBuilder::new("plain").build();
    let session = session_with(&[], vec![declared.clone(), managed.clone(), plain.clone()]);

    let task = "org.apache.maven.plugins:maven-compiler-plugin:compile";
    for project in [&mut declared, &mut managed] {
        let handle = resolver
            .resolve(ResolveRequest::direct(task), project, &session)?
            .expect("mojo resolved");
        assert_eq!(handle.plugin.version, "3.1", "project {}", project.id());
    }

    let handle = resolver
        .resolve(ResolveRequest::direct(task), &mut plain, &session)?
        .expect("mojo resolved");
    assert_eq!(handle.plugin.version, "3.13");
    Ok(())
}

#[test]
fn explicit_version_in_task_wins() -> TestResult {
    let plugins = FakePluginManager::new()
        .with_plugin(
            PluginDescriptorBuilder::new("maven-jar-plugin", "2.0", "jar")
                .mojo(MojoBuilder::new("jar"))
                .build(),
        )
        .with_plugin(
            PluginDescriptorBuilder::new("maven-jar-plugin", "3.0", "jar")
                .mojo(MojoBuilder::new("jar"))
                .build(),
        );
    let resolver = resolver(plugins);
    let mut project = ProjectBuilder::new("core")
        .plugin(PluginBuilder::new("maven-jar-plugin").version("3.0").build())
        .build();
    let session = session_with(&[], vec![project.clone()]);

    let handle = resolver
        .resolve(
            ResolveRequest::direct("org.apache.maven.plugins:maven-jar-plugin:2.0:jar"),
            &mut project,
            &session,
        )?
        .expect("mojo resolved");
    assert_eq!(handle.plugin.version, "2.0");
    Ok(())
}

#[test]
fn prefix_form_is_rejected_outside_direct_invocation() {
    let resolver = resolver(FakePluginManager::with_standard_plugins());
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&[], vec![project.clone()]);

    let result = resolver.resolve(
        ResolveRequest::mapped("compiler:compile", "package", false),
        &mut project,
        &session,
    );

    match result {
        Err(BuildcycleError::PrefixNotAllowed { task, invoked_via }) => {
            assert_eq!(task, "compiler:compile");
            assert_eq!(invoked_via, "package");
        }
        other => panic!("expected PrefixNotAllowed, got {other:?}"),
    }
}

#[test]
fn missing_goal_fails_unless_optional() -> TestResult {
    let resolver = resolver(FakePluginManager::with_standard_plugins());
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&[], vec![project.clone()]);
    let task = "org.apache.maven.plugins:maven-compiler-plugin:nothing";

    match resolver.resolve(ResolveRequest::direct(task), &mut project, &session) {
        Err(err @ BuildcycleError::MojoNotFound { .. }) => assert!(err.is_not_found()),
        other => panic!("expected MojoNotFound, got {other:?}"),
    }

    let skipped = resolver.resolve(
        ResolveRequest::mapped(task, "compile", true),
        &mut project,
        &session,
    )?;
    assert!(skipped.is_none());

    let missing_plugin = "org.example:absent-plugin:run";
    let skipped = resolver.resolve(
        ResolveRequest::mapped(missing_plugin, "compile", true),
        &mut project,
        &session,
    )?;
    assert!(skipped.is_none());

    match resolver.resolve(ResolveRequest::direct(missing_plugin), &mut project, &session) {
        Err(BuildcycleError::PluginNotFound(plugin)) => {
            assert_eq!(plugin, "org.example:absent-plugin")
        }
        other => panic!("expected PluginNotFound, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_prefix_falls_back_to_conventional_coordinate() {
    let resolver = resolver(FakePluginManager::with_standard_plugins());
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&[], vec![project.clone()]);

    match resolver.resolve(ResolveRequest::direct("dependency:tree"), &mut project, &session) {
        Err(BuildcycleError::PluginNotFound(plugin)) => {
            assert_eq!(plugin, "org.apache.maven.plugins:maven-dependency-plugin")
        }
        other => panic!("expected PluginNotFound, got {other:?}"),
    }
    assert_eq!(
        PluginKey::for_prefix("dependency").to_string(),
        "org.apache.maven.plugins:maven-dependency-plugin"
    );
}

#[test]
fn prefixed_goal_inside_plugin_gets_a_hint() {
    let descriptor = Arc::new(
        PluginDescriptorBuilder::new("maven-compiler-plugin", "3.13", "compiler")
            .mojo(MojoBuilder::new("compile"))
            .build(),
    );

    assert!(mojo_in_plugin(&descriptor, "compile").is_ok());

    let err = mojo_in_plugin(&descriptor, "compiler:compile").expect_err("prefixed goal");
    assert!(err.to_string().contains("try 'compile'"), "got: {err}");
}
