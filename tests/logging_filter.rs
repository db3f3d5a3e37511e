// tests/logging_filter.rs

use buildcycle::cli::LogLevel;
use buildcycle::logging::filter_directive;

#[test]
fn cli_level_wins_over_environment() {
    assert_eq!(
        filter_directive(Some(LogLevel::Debug), Some("trace")),
        "warn,buildcycle=debug"
    );
}

#[test]
fn bare_environment_level_is_scoped_to_the_crate() {
    assert_eq!(filter_directive(None, Some(" WARNING ")), "warn,buildcycle=warn");
    assert_eq!(filter_directive(None, Some("trace")), "warn,buildcycle=trace");
}

#[test]
fn environment_directive_is_used_verbatim() {
    assert_eq!(
        filter_directive(None, Some("buildcycle::lifecycle=trace,info")),
        "buildcycle::lifecycle=trace,info"
    );
}

#[test]
fn default_is_info_for_the_crate() {
    assert_eq!(filter_directive(None, None), "warn,buildcycle=info");
    assert_eq!(filter_directive(None, Some("  ")), "warn,buildcycle=info");
}
