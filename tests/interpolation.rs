// tests/interpolation.rs

use std::error::Error;

use buildcycle::model::ArtifactHandler;
use buildcycle::project::{
    InterpolatingModelProvider, InterpolationContext, InterpolationError, ProjectModelProvider,
};
use buildcycle_test_utils::builders::{PluginBuilder, ProjectBuilder, config};
use buildcycle_test_utils::session_with;

type TestResult = Result<(), Box<dyn Error>>;

fn context(pairs: &[(&str, &str)]) -> InterpolationContext {
    let mut ctx = InterpolationContext::new();
    for (key, value) in pairs {
        ctx.insert(key, value);
    }
    ctx
}

#[test]
fn expressions_resolve_recursively() -> TestResult {
    let ctx = context(&[("name", "core"), ("label", "${name}-lib"), ("title", "[${label}]")]);

    assert_eq!(ctx.interpolate("${title} / ${name}")?, "[core-lib] / core");
    assert_eq!(ctx.interpolate("no expressions")?, "no expressions");
    Ok(())
}

#[test]
fn unknown_expressions_are_left_untouched() -> TestResult {
    let ctx = context(&[("known", "yes")]);
    assert_eq!(
        ctx.interpolate("${known} ${session.executionRootDirectory}")?,
        "yes ${session.executionRootDirectory}"
    );
    Ok(())
}

#[test]
fn self_referencing_expressions_are_rejected() {
    let ctx = context(&[("a", "${b}"), ("b", "x${a}")]);
    assert!(matches!(
        ctx.interpolate("${a}"),
        Err(InterpolationError::Recursive(_))
    ));
}

#[test]
fn unterminated_expression_is_an_error() {
    let ctx = context(&[("a", "1")]);
    assert!(matches!(
        ctx.interpolate("${a} and ${b"),
        Err(InterpolationError::Unterminated(_))
    ));
}

#[test]
fn environment_variables_are_available_under_env() -> TestResult {
    let ctx = InterpolationContext::new();
    match std::env::var("PATH") {
        Ok(path) => assert_eq!(ctx.interpolate("${env.PATH}")?, path),
        Err(_) => assert_eq!(ctx.interpolate("${env.PATH}")?, "${env.PATH}"),
    }
    Ok(())
}

#[test]
fn project_context_layers_coordinates_properties_and_user_properties() -> TestResult {
    let project = ProjectBuilder::new("core")
        .packaging("bundle")
        .property("encoding", "UTF-8")
        .property("mode", "dev")
        .build();
    let session = session_with(&[], vec![project.clone()]).with_user_properties(
        [("mode".to_string(), "release".to_string())].into_iter().collect(),
    );
    let handler = ArtifactHandler {
        packaging: "bundle".to_string(),
        extension: "zip".to_string(),
        language: None,
    };

    let ctx = InterpolationContext::for_project(project.model(), Some(&handler), &session);

    assert_eq!(
        ctx.interpolate("${project.groupId}:${project.artifactId}:${project.version}")?,
        "com.example:core:1.0"
    );
    assert_eq!(ctx.interpolate("${project.artifact.extension}")?, "zip");
    assert_eq!(ctx.interpolate("${encoding}/${mode}")?, "UTF-8/release");
    assert_eq!(ctx.interpolate("${settings.offline}")?, "false");
    Ok(())
}

#[test]
fn configuration_trees_are_interpolated_in_place() -> TestResult {
    let ctx = context(&[("dir", "target"), ("level", "3")]);
    let cfg = config(
        r#"
output = "${dir}/classes"
retries = 2
flags = ["-O${level}", "plain"]

[nested]
path = "${dir}/nested"
"#,
    );

    let out = ctx.interpolate_configuration(&cfg)?;

    assert_eq!(out.get("output").and_then(|v| v.as_str()), Some("target/classes"));
    assert_eq!(out.get("retries").and_then(|v| v.as_integer()), Some(2));
    let flags: Vec<&str> = out
        .get("flags")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(flags, vec!["-O3", "plain"]);
    assert_eq!(
        out.get("nested")
            .and_then(|v| v.get("path"))
            .and_then(|v| v.as_str()),
        Some("target/nested")
    );
    Ok(())
}

#[test]
fn concrete_state_interpolates_the_declared_model() -> TestResult {
    let project = ProjectBuilder::new("core")
        .version("${revision}")
        .property("revision", "4.2")
        .property("compiler.version", "3.13")
        .default_goal("install")
        .plugin(
            PluginBuilder::new("maven-compiler-plugin")
                .version("${compiler.version}")
                .configuration(config("release = \"${revision}\""))
                .build(),
        )
        .build();
    let session = session_with(&[], vec![project.clone()]);

    let model = InterpolatingModelProvider.calculate_concrete_state(&project, &session)?;

    assert_eq!(model.version, "4.2");
    assert_eq!(model.build_plugins[0].version.as_deref(), Some("3.13"));
    assert_eq!(
        model.build_plugins[0]
            .configuration
            .as_ref()
            .and_then(|c| c.get("release"))
            .and_then(|v| v.as_str()),
        Some("4.2")
    );
    // The declared model is untouched.
    assert_eq!(project.declared().version, "${revision}");
    Ok(())
}
