use std::str::FromStr;
use serde::Deserialize;

/// How the reactor reacts when a project fails to build.
///
/// - `FailFast`: stop the whole build at the first failure (default).
/// - `FailAtEnd`: keep building projects that do not depend on a failed
///   project; dependents of the failed project are skipped.
/// - `FailNever`: record failures but keep building everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureBehaviour {
    FailFast,
    FailAtEnd,
    FailNever,
}

impl Default for FailureBehaviour {
    fn default() -> Self {
        FailureBehaviour::FailFast
    }
}

impl FromStr for FailureBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "fail-fast" => Ok(FailureBehaviour::FailFast),
            "fail-at-end" => Ok(FailureBehaviour::FailAtEnd),
            "fail-never" => Ok(FailureBehaviour::FailNever),
            other => Err(format!(
                "invalid failure_behaviour: {other} (expected \"fail-fast\", \"fail-at-end\" or \"fail-never\")"
            )),
        }
    }
}
