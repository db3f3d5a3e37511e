// src/lifecycle/segment.rs

use std::fmt;

use crate::errors::Result;

/// A maximal run of consecutive tasks that share the same aggregation mode.
///
/// Aggregating segments run once against the top-level project; the others
/// run once per reactor project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSegment {
    tasks: Vec<String>,
    aggregate: bool,
}

impl TaskSegment {
    pub fn new(aggregate: bool) -> Self {
        Self {
            tasks: Vec::new(),
            aggregate,
        }
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    pub fn add(&mut self, task: impl Into<String>) {
        self.tasks.push(task.into());
    }
}

impl fmt::Display for TaskSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " task-segment: [{}]", self.tasks.join(", "))?;
        if self.aggregate {
            write!(f, " (aggregator-style)")?;
        }
        Ok(())
    }
}

/// Split `tasks` into segments.
///
/// Phases are never aggregating. Every other task asks `is_aggregator`,
/// which is only consulted when a project is available; without one every
/// task lands in a single non-aggregating segment.
pub fn segment_tasks<P, A>(
    tasks: &[String],
    has_project: bool,
    is_phase: P,
    mut is_aggregator: A,
) -> Result<Vec<TaskSegment>>
where
    P: Fn(&str) -> bool,
    A: FnMut(&str) -> Result<bool>,
{
    if !has_project {
        let mut segment = TaskSegment::new(false);
        for task in tasks {
            segment.add(task.clone());
        }
        return Ok(if segment.tasks.is_empty() {
            Vec::new()
        } else {
            vec![segment]
        });
    }

    let mut segments: Vec<TaskSegment> = Vec::new();
    for task in tasks {
        let aggregate = if is_phase(task) {
            false
        } else {
            is_aggregator(task)?
        };

        match segments.last_mut() {
            Some(current) if current.aggregate == aggregate => current.add(task.clone()),
            _ => {
                let mut segment = TaskSegment::new(aggregate);
                segment.add(task.clone());
                segments.push(segment);
            }
        }
    }
    Ok(segments)
}
