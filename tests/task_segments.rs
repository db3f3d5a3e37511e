// tests/task_segments.rs

use std::error::Error;
use std::sync::Arc;

use buildcycle::errors::BuildcycleError;
use buildcycle::lifecycle::segment_tasks;
use buildcycle_test_utils::builders::{MojoBuilder, PluginDescriptorBuilder, ProjectBuilder};
use buildcycle_test_utils::{FakePluginManager, executor_with, init_tracing, session_with};

type TestResult = Result<(), Box<dyn Error>>;

fn tasks(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn with_report_plugin() -> Arc<FakePluginManager> {
    Arc::new(
        FakePluginManager::with_standard_plugins().with_plugin(
            PluginDescriptorBuilder::with_group("org.example", "report-plugin", "1.0", "report")
                .mojo(MojoBuilder::new("aggregate").aggregator())
                .mojo(MojoBuilder::new("standalone").no_project())
                .mojo(MojoBuilder::new("single"))
                .build(),
        ),
    )
}

#[test]
fn consecutive_tasks_with_same_mode_share_a_segment() -> TestResult {
    let segments = segment_tasks(
        &tasks(&["clean", "agg:run", "other:agg", "test", "x:y"]),
        true,
        |t| !t.contains(':'),
        |t| Ok(t.contains("agg")),
    )?;

    let shape: Vec<(bool, Vec<String>)> = segments
        .iter()
        .map(|s| (s.is_aggregate(), s.tasks().to_vec()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (false, tasks(&["clean"])),
            (true, tasks(&["agg:run", "other:agg"])),
            (false, tasks(&["test", "x:y"])),
        ]
    );
    Ok(())
}

#[test]
fn without_a_project_everything_is_one_plain_segment() -> TestResult {
    let segments = segment_tasks(
        &tasks(&["clean", "agg:run"]),
        false,
        |_| false,
        |_| panic!("aggregation is not consulted without a project"),
    )?;
    assert_eq!(segments.len(), 1);
    assert!(!segments[0].is_aggregate());
    assert_eq!(segments[0].tasks(), tasks(&["clean", "agg:run"]).as_slice());

    let empty = segment_tasks(&[], false, |_| false, |_| Ok(false))?;
    assert!(empty.is_empty());
    Ok(())
}

#[test]
fn segment_display_lists_tasks_and_mode() -> TestResult {
    let segments = segment_tasks(&tasks(&["agg:run"]), true, |_| false, |_| Ok(true))?;
    assert_eq!(
        segments[0].to_string(),
        " task-segment: [agg:run] (aggregator-style)"
    );
    Ok(())
}

#[test]
fn plan_splits_around_aggregating_goals() -> TestResult {
    init_tracing();
    let plugins = with_report_plugin();
    let executor = executor_with(&plugins);
    let mut session = session_with(
        &["clean", "report:aggregate", "report:standalone", "install", "report:single"],
        vec![
            ProjectBuilder::new("core").build(),
            ProjectBuilder::new("app").depends_on("core").build(),
        ],
    );

    let segments = executor.plan(&mut session)?;

    let shape: Vec<(bool, Vec<String>)> = segments
        .iter()
        .map(|s| (s.is_aggregate(), s.tasks().to_vec()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (false, tasks(&["clean"])),
            (true, tasks(&["report:aggregate", "report:standalone"])),
            (false, tasks(&["install", "report:single"])),
        ]
    );
    Ok(())
}

#[test]
fn unresolvable_goal_is_treated_as_non_aggregating() -> TestResult {
    let plugins = with_report_plugin();
    let executor = executor_with(&plugins);
    let mut session = session_with(
        &["clean", "nowhere:goal"],
        vec![ProjectBuilder::new("core").build()],
    );

    let segments = executor.plan(&mut session)?;
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].tasks(), tasks(&["clean", "nowhere:goal"]).as_slice());
    Ok(())
}

#[test]
fn malformed_goal_fails_planning() {
    let plugins = with_report_plugin();
    let executor = executor_with(&plugins);
    let mut session = session_with(&["not-a-phase"], vec![ProjectBuilder::new("core").build()]);

    assert!(matches!(
        executor.plan(&mut session),
        Err(BuildcycleError::MalformedTask(_))
    ));
}

#[test]
fn default_goal_of_top_level_project_is_used_when_no_goals_are_given() -> TestResult {
    let plugins = with_report_plugin();
    let executor = executor_with(&plugins);
    let mut session = session_with(
        &[],
        vec![
            ProjectBuilder::new("parent").default_goal("clean  install").build(),
            ProjectBuilder::new("child").depends_on("parent").build(),
        ],
    );

    let segments = executor.plan(&mut session)?;
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].tasks(), tasks(&["clean", "install"]).as_slice());
    Ok(())
}

#[test]
fn no_goals_and_no_default_goal_is_a_configuration_error() {
    let plugins = with_report_plugin();
    let executor = executor_with(&plugins);
    let mut session = session_with(&[], vec![ProjectBuilder::new("core").build()]);

    match executor.plan(&mut session) {
        Err(BuildcycleError::ConfigError(msg)) => {
            assert!(msg.contains("at least one goal or lifecycle phase"));
            assert!(msg.contains("validate, initialize"));
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}
