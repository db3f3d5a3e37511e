pub mod builders;
pub mod fake_plugin_manager;
pub mod recording_sink;

use std::sync::{Arc, Once};
use tracing_subscriber::{fmt, EnvFilter};

use buildcycle::lifecycle::{LifecycleExecutor, LifecycleRegistry};
use buildcycle::plugin::PluginManager;
use buildcycle::project::Project;
use buildcycle::reactor::Reactor;
use buildcycle::session::{BuildSession, Settings};

pub use fake_plugin_manager::{ExecutedMojo, FakePluginManager};
pub use recording_sink::RecordingEventSink;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Executor over the standard lifecycles backed by `plugins`.
pub fn executor_with(plugins: &Arc<FakePluginManager>) -> LifecycleExecutor {
    let registry = LifecycleRegistry::standard().expect("standard lifecycles are valid");
    let plugins: Arc<dyn PluginManager> = plugins.clone();
    LifecycleExecutor::new(Arc::new(registry), plugins)
}

/// Online session over `projects` (first project is the top level).
pub fn session_with(goals: &[&str], projects: Vec<Project>) -> BuildSession {
    let reactor = Reactor::new(projects, None).expect("valid reactor");
    BuildSession::new(
        goals.iter().map(|g| g.to_string()).collect(),
        Settings::default(),
        reactor,
    )
}
