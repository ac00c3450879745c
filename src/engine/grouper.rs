// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::config::find_cycle;
use crate::models::{TaskDefinition, TaskGroup};
use crate::observability::messages::grouping::{
    CircularDependencyDetected, GroupsComputed, UnresolvedDependency,
};
use crate::observability::messages::StructuredLog;

/// Output of [`DependencyGrouper::group`].
///
/// Grouping never fails outright. When it stalls, `groups` holds whatever was
/// formed and `unplaced` the tasks that could not be scheduled; callers must
/// check [`Grouping::is_complete`] before trusting coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub groups: Vec<TaskGroup>,
    pub unplaced: Vec<TaskDefinition>,
    /// A concrete loop among the unplaced tasks, when one exists.
    pub cycle: Option<Vec<String>>,
    pub total: usize,
}

impl Grouping {
    pub fn placed(&self) -> usize {
        self.groups.iter().map(TaskGroup::len).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.placed() == self.total
    }

    /// Index of the group holding `task_id`.
    pub fn group_index_of(&self, task_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(task_id))
    }
}

/// Partitions a task set into sequential groups of concurrently runnable tasks.
///
/// Tasks are scanned in `sequence` order. A task joins the group being built
/// when all of its dependencies sit in earlier groups and either the group is
/// empty, or the task and every current member are parallel and no member
/// depends on it. A non-parallel task therefore always runs alone.
///
/// A group only ever gets harder to join as it fills, so one scan per group
/// reaches the same fixpoint as rescanning until nothing changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyGrouper;

impl DependencyGrouper {
    pub fn new() -> Self {
        Self
    }

    pub fn group(&self, tasks: &[TaskDefinition]) -> Grouping {
        let mut sorted: Vec<&TaskDefinition> = tasks.iter().collect();
        // stable: equal sequences keep input order
        sorted.sort_by_key(|t| t.sequence);

        let mut placed: HashSet<&str> = HashSet::new();
        let mut groups: Vec<TaskGroup> = Vec::new();

        while placed.len() < sorted.len() {
            let mut group: Vec<&TaskDefinition> = Vec::new();

            for &task in &sorted {
                if placed.contains(task.id.as_str()) || group.iter().any(|g| g.id == task.id) {
                    continue;
                }
                let ready = task
                    .dependencies
                    .iter()
                    .all(|d| placed.contains(d.as_str()));
                if ready && Self::can_join(&group, task) {
                    group.push(task);
                }
            }

            if group.is_empty() {
                break;
            }

            for task in group.iter().copied() {
                placed.insert(task.id.as_str());
            }
            groups.push(TaskGroup(group.into_iter().cloned().collect()));
        }

        let unplaced: Vec<TaskDefinition> = sorted
            .iter()
            .filter(|t| !placed.contains(t.id.as_str()))
            .map(|t| (*t).clone())
            .collect();

        let cycle = if unplaced.is_empty() {
            None
        } else {
            Self::report_stall(tasks, &unplaced)
        };

        let grouping = Grouping {
            groups,
            unplaced,
            cycle,
            total: tasks.len(),
        };

        GroupsComputed {
            group_count: grouping.groups.len(),
            placed: grouping.placed(),
            total: grouping.total,
        }
        .log();

        grouping
    }

    fn can_join(group: &[&TaskDefinition], task: &TaskDefinition) -> bool {
        if group.is_empty() {
            return true;
        }
        task.is_parallel
            && group
                .iter()
                .all(|member| member.is_parallel && !member.depends_on(&task.id))
    }

    /// Log why grouping stalled and return the loop, if there is one.
    fn report_stall(tasks: &[TaskDefinition], unplaced: &[TaskDefinition]) -> Option<Vec<String>> {
        let known: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        for task in unplaced {
            for dependency in &task.dependencies {
                if !known.contains(dependency.as_str()) {
                    UnresolvedDependency {
                        task_id: &task.id,
                        missing_dependency: dependency,
                    }
                    .log();
                }
            }
        }

        let cycle = find_cycle(unplaced);
        let unplaced_ids: Vec<&str> = unplaced.iter().map(|t| t.id.as_str()).collect();
        CircularDependencyDetected {
            unplaced: &unplaced_ids,
            cycle: cycle.as_deref(),
        }
        .log();
        cycle
    }
}
