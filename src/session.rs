// src/session.rs

use std::collections::BTreeMap;

use crate::project::Project;
use crate::reactor::Reactor;

/// Build-wide flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Mojos that require network access are dropped from bindings.
    pub offline: bool,
}

/// One build invocation: requested goals, settings, properties and the
/// reactor being built.
#[derive(Debug, Clone)]
pub struct BuildSession {
    pub goals: Vec<String>,
    pub settings: Settings,
    /// `-D key=value` properties; they override project properties.
    pub user_properties: BTreeMap<String, String>,
    reactor: Reactor,
}

impl BuildSession {
    pub fn new(goals: Vec<String>, settings: Settings, reactor: Reactor) -> Self {
        Self {
            goals,
            settings,
            user_properties: BTreeMap::new(),
            reactor,
        }
    }

    pub fn with_user_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.user_properties = properties;
        self
    }

    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    pub fn reactor_mut(&mut self) -> &mut Reactor {
        &mut self.reactor
    }

    pub fn top_level_project(&self) -> Option<&Project> {
        self.reactor.top_level()
    }
}
