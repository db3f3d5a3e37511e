// tests/lifecycle_bindings.rs

use std::error::Error;
use std::sync::Arc;

use buildcycle::errors::BuildcycleError;
use buildcycle::lifecycle::{LifecycleBindings, LifecycleExecutor, LifecycleMapping};
use buildcycle::project::Project;
use buildcycle::session::BuildSession;
use buildcycle_test_utils::builders::{
    ExecutionBuilder, MojoBuilder, PluginBuilder, PluginDescriptorBuilder, ProjectBuilder, config,
};
use buildcycle_test_utils::{FakePluginManager, executor_with, init_tracing, session_with};

type TestResult = Result<(), Box<dyn Error>>;

fn bind(
    executor: &LifecycleExecutor,
    session: &BuildSession,
    project: &mut Project,
    phase: &str,
) -> Result<(LifecycleBindings, Vec<String>), BuildcycleError> {
    let lifecycle = executor.registry().lifecycle_for_phase(phase)?;
    let bindings = executor
        .bindings()
        .construct_lifecycle_mappings(session, phase, project, lifecycle)?;
    let chain = bindings
        .goal_chain(phase, lifecycle)
        .iter()
        .map(|e| format!("{} {}", e.descriptor().full_goal_name(), e.execution_id()))
        .collect();
    Ok((bindings, chain))
}

fn codegen_plugin() -> FakePluginManager {
    FakePluginManager::with_standard_plugins().with_plugin(
        PluginDescriptorBuilder::with_group("org.example", "codegen-plugin", "1.0", "codegen")
            .mojo(MojoBuilder::new("generate").phase("generate-sources"))
            .mojo(MojoBuilder::new("check"))
            .mojo(MojoBuilder::new("internal").not_inherited_by_default().phase("validate"))
            .mojo(MojoBuilder::new("release").direct_invocation_only().phase("deploy"))
            .build(),
    )
}

#[test]
fn jar_packaging_binds_standard_goals_in_phase_order() -> TestResult {
    init_tracing();
    let plugins = Arc::new(FakePluginManager::with_standard_plugins());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&["package"], vec![project.clone()]);

    let (_, chain) = bind(&executor, &session, &mut project, "package")?;

    assert_eq!(
        chain,
        vec![
            "resources:resources default-resources",
            "compiler:compile default-compile",
            "resources:testResources default-testResources",
            "compiler:testCompile default-testCompile",
            "surefire:test default-test",
            "jar:jar default-jar",
        ]
    );
    Ok(())
}

#[test]
fn binding_stops_at_the_target_phase() -> TestResult {
    let plugins = Arc::new(FakePluginManager::with_standard_plugins());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&["compile"], vec![project.clone()]);

    let (bindings, chain) = bind(&executor, &session, &mut project, "compile")?;

    assert_eq!(chain.len(), 2);
    assert!(bindings.executions_for("test").is_empty());
    assert!(bindings.executions_for("install").is_empty());
    Ok(())
}

#[test]
fn clean_and_site_use_lifecycle_defaults() -> TestResult {
    let plugins = Arc::new(FakePluginManager::with_standard_plugins());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core").packaging("ear").build();
    let session = session_with(&["clean"], vec![project.clone()]);

    let (_, clean) = bind(&executor, &session, &mut project, "clean")?;
    assert_eq!(clean, vec!["clean:clean default-clean"]);

    let (_, site) = bind(&executor, &session, &mut project, "site-deploy")?;
    assert_eq!(site, vec!["site:site default-site", "site:deploy default-deploy"]);
    Ok(())
}

#[test]
fn unknown_packaging_has_no_default_lifecycle_mapping() {
    let plugins = Arc::new(FakePluginManager::with_standard_plugins());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core").packaging("ear").build();
    let session = session_with(&["install"], vec![project.clone()]);

    match bind(&executor, &session, &mut project, "install") {
        Err(BuildcycleError::MissingLifecycleMapping(packaging)) => assert_eq!(packaging, "ear"),
        other => panic!("expected MissingLifecycleMapping, got {other:?}"),
    }
}

#[test]
fn missing_optional_mojo_is_skipped() -> TestResult {
    let plugins = Arc::new(
        FakePluginManager::new()
            .with_plugin(
                PluginDescriptorBuilder::new("maven-install-plugin", "3.1", "install")
                    .mojo(MojoBuilder::new("install"))
                    .build(),
            ),
    );
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("parent").packaging("pom").build();
    let session = session_with(&["install"], vec![project.clone()]);

    let (_, chain) = bind(&executor, &session, &mut project, "install")?;
    assert_eq!(chain, vec!["install:install default-install"]);
    Ok(())
}

#[test]
fn missing_required_mojo_fails_binding() {
    let plugins = Arc::new(FakePluginManager::new());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core").build();
    let session = session_with(&["compile"], vec![project.clone()]);

    assert!(matches!(
        bind(&executor, &session, &mut project, "compile"),
        Err(BuildcycleError::PluginNotFound(_))
    ));
}

#[test]
fn offline_build_drops_mojos_that_need_the_network() -> TestResult {
    let plugins = Arc::new(FakePluginManager::with_standard_plugins());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core").build();
    let mut session = session_with(&["deploy"], vec![project.clone()]);

    let (_, online) = bind(&executor, &session, &mut project, "deploy")?;
    assert_eq!(online.last().map(String::as_str), Some("deploy:deploy default-deploy"));

    session.settings.offline = true;
    let (_, offline) = bind(&executor, &session, &mut project, "deploy")?;
    assert_eq!(offline.len(), online.len() - 1);
    assert_eq!(offline.last().map(String::as_str), Some("install:install default-install"));
    Ok(())
}

#[test]
fn declared_executions_are_bound_after_packaging_goals() -> TestResult {
    let plugins = Arc::new(codegen_plugin());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core")
        .plugin(
            PluginBuilder::with_group("org.example", "codegen-plugin")
                .configuration(config("style = \"plain\"\nlevel = 1"))
                .execution(ExecutionBuilder::new("sources").goal("generate").build())
                .execution(
                    ExecutionBuilder::new("verify-compile")
                        .phase("compile")
                        .goal("check")
                        .configuration(config("level = 2"))
                        .build(),
                )
                .execution(ExecutionBuilder::new("unbound").goal("check").build())
                .build(),
        )
        .build();
    let session = session_with(&["compile"], vec![project.clone()]);

    let (bindings, chain) = bind(&executor, &session, &mut project, "compile")?;

    assert_eq!(
        chain,
        vec![
            "codegen:generate sources",
            "resources:resources default-resources",
            "compiler:compile default-compile",
            "codegen:check verify-compile",
        ]
    );

    let check = &bindings.executions_for("compile")[1];
    let cfg = check.configuration().expect("merged configuration");
    assert_eq!(cfg.get("level").and_then(|v| v.as_integer()), Some(2));
    assert_eq!(cfg.get("style").and_then(|v| v.as_str()), Some("plain"));
    Ok(())
}

#[test]
fn declared_plugin_configuration_reaches_packaging_goals() -> TestResult {
    let plugins = Arc::new(FakePluginManager::with_standard_plugins());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core")
        .plugin(
            PluginBuilder::new("maven-compiler-plugin")
                .configuration(config("release = \"21\""))
                .build(),
        )
        .build();
    let session = session_with(&["compile"], vec![project.clone()]);

    let (bindings, _) = bind(&executor, &session, &mut project, "compile")?;
    let compile = &bindings.executions_for("compile")[0];
    assert_eq!(
        compile
            .configuration()
            .and_then(|c| c.get("release"))
            .and_then(|v| v.as_str()),
        Some("21")
    );
    Ok(())
}

#[test]
fn inheritance_flags_gate_execution_binding() -> TestResult {
    let plugins = Arc::new(codegen_plugin());
    let executor = executor_with(&plugins);

    // Plugin-level: the plugin inherits by default, so a non-inherited
    // declaration is still bound.
    let mut inherited = ProjectBuilder::new("inherited")
        .plugin(
            PluginBuilder::with_group("org.example", "codegen-plugin")
                .not_inherited()
                .execution(ExecutionBuilder::new("gen").goal("generate").build())
                .build(),
        )
        .build();
    // Execution-level: the mojo does not inherit by default and the
    // execution is marked not inherited.
    let mut gated = ProjectBuilder::new("gated")
        .plugin(
            PluginBuilder::with_group("org.example", "codegen-plugin")
                .execution(ExecutionBuilder::new("hidden").goal("internal").not_inherited().build())
                .execution(ExecutionBuilder::new("shown").goal("internal").build())
                .build(),
        )
        .build();
    let session = session_with(&["validate"], vec![inherited.clone(), gated.clone()]);

    let (_, chain) = bind(&executor, &session, &mut inherited, "generate-sources")?;
    assert_eq!(chain, vec!["codegen:generate gen"]);

    let (_, chain) = bind(&executor, &session, &mut gated, "validate")?;
    assert_eq!(chain, vec!["codegen:internal shown"]);
    Ok(())
}

#[test]
fn non_inherited_plugin_without_default_inheritance_is_skipped() -> TestResult {
    let plugins = Arc::new(
        FakePluginManager::with_standard_plugins().with_plugin(
            PluginDescriptorBuilder::with_group("org.example", "local-plugin", "1.0", "local")
                .not_inherited_by_default()
                .mojo(MojoBuilder::new("run").phase("validate"))
                .build(),
        ),
    );
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core")
        .plugin(
            PluginBuilder::with_group("org.example", "local-plugin")
                .not_inherited()
                .execution(ExecutionBuilder::new("once").goal("run").build())
                .build(),
        )
        .build();
    let session = session_with(&["validate"], vec![project.clone()]);

    let (bindings, _) = bind(&executor, &session, &mut project, "validate")?;
    assert!(bindings.is_empty());
    Ok(())
}

#[test]
fn execution_naming_an_unknown_goal_is_a_configuration_error() {
    let plugins = Arc::new(codegen_plugin());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core")
        .plugin(
            PluginBuilder::with_group("org.example", "codegen-plugin")
                .execution(ExecutionBuilder::new("typo").phase("compile").goal("generat").build())
                .build(),
        )
        .build();
    let session = session_with(&["compile"], vec![project.clone()]);

    match bind(&executor, &session, &mut project, "compile") {
        Err(BuildcycleError::ConfigError(msg)) => assert!(msg.contains("'generat'")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn direct_invocation_only_mojo_cannot_be_bound() {
    let plugins = Arc::new(codegen_plugin());
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core")
        .plugin(
            PluginBuilder::with_group("org.example", "codegen-plugin")
                .execution(ExecutionBuilder::new("ship").goal("release").build())
                .build(),
        )
        .build();
    let session = session_with(&["deploy"], vec![project.clone()]);

    assert!(matches!(
        bind(&executor, &session, &mut project, "deploy"),
        Err(BuildcycleError::DirectInvocationOnly { .. })
    ));
}

#[test]
fn extension_plugin_supplies_mapping_for_custom_packaging() -> TestResult {
    let bundle = LifecycleMapping::new()
        .bind("default", "compile", "org.example:bundle-plugin:build")
        .bind("default", "package", "org.example:bundle-plugin:pack,org.example:bundle-plugin:sign")
        .optional("default", "org.example:bundle-plugin:sign");
    let plugins = Arc::new(
        FakePluginManager::with_standard_plugins().with_plugin(
            PluginDescriptorBuilder::with_group("org.example", "bundle-plugin", "1.0", "bundle")
                .mojo(MojoBuilder::new("build"))
                .mojo(MojoBuilder::new("pack"))
                .lifecycle_mapping("bundle", bundle)
                .artifact_handler("bundle", "zip")
                .build(),
        ),
    );
    let executor = executor_with(&plugins);
    let mut project = ProjectBuilder::new("core")
        .packaging("bundle")
        .plugin(
            PluginBuilder::with_group("org.example", "bundle-plugin")
                .extensions()
                .build(),
        )
        .build();
    let session = session_with(&["package"], vec![project.clone()]);

    let (_, chain) = bind(&executor, &session, &mut project, "package")?;
    assert_eq!(chain, vec!["bundle:build default-build", "bundle:pack default-pack"]);
    Ok(())
}
