//! Structural validation of a run's task definitions.
//!
//! The catalog is expected to always produce a well-formed task set, but the
//! engine checks before grouping so a broken table surfaces as an
//! infrastructure error rather than a silently short run.
//!
//! # Checks
//!
//! 1. **Uniqueness**: every task id appears once
//! 2. **References**: every dependency names a scheduled task
//! 3. **Cycles**: DFS with a recursion stack, returning the loop path
//!
//! Only duplicate ids are fatal to the engine. Unresolved references and
//! cycles leave tasks unplaced by the grouper, which the engine reports as
//! failed tasks; [`find_cycle`] exists so that report can name the loop.

use std::collections::{HashMap, HashSet};

use crate::errors::ValidationError;
use crate::models::TaskDefinition;

/// Run every structural check, accumulating all errors found.
///
/// Cycle detection is skipped when references are broken, since it needs a
/// closed graph.
pub fn validate_task_definitions(tasks: &[TaskDefinition]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_task_ids(tasks) {
        errors.extend(duplicate_errors);
    }

    if let Err(unresolved_errors) = validate_dependency_references(tasks) {
        errors.extend(unresolved_errors);
    }

    if errors.is_empty() {
        if let Some(cycle) = find_cycle(tasks) {
            errors.push(ValidationError::CyclicDependency { cycle });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_task_ids(tasks: &[TaskDefinition]) -> Result<(), Vec<ValidationError>> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for task in tasks {
        if !seen_ids.insert(task.id.as_str()) {
            errors.push(ValidationError::DuplicateTaskId {
                task_id: task.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_dependency_references(tasks: &[TaskDefinition]) -> Result<(), Vec<ValidationError>> {
    let task_ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut errors = Vec::new();

    for task in tasks {
        for dependency in &task.dependencies {
            if !task_ids.contains(dependency.as_str()) {
                errors.push(ValidationError::UnresolvedDependency {
                    task_id: task.id.clone(),
                    missing_dependency: dependency.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Find one dependency cycle, returned as a closed path (`a -> b -> a`).
///
/// Edges point from a dependency to its dependents. Dependencies that name
/// unknown tasks are ignored. Tasks are visited in `sequence` order so the
/// reported path is deterministic.
pub fn find_cycle(tasks: &[TaskDefinition]) -> Option<Vec<String>> {
    let mut graph: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        graph.entry(task.id.as_str()).or_default();
    }
    for task in tasks {
        for dependency in &task.dependencies {
            if let Some(dependents) = graph.get_mut(dependency.as_str()) {
                dependents.push(task.id.as_str());
            }
        }
    }

    let mut ordered: Vec<&TaskDefinition> = tasks.iter().collect();
    ordered.sort_by_key(|t| t.sequence);

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for task in ordered {
        if !visited.contains(task.id.as_str()) {
            if let Some(cycle) =
                dfs_cycle_detection(&task.id, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                return Some(cycle);
            }
        }
    }

    None
}

/// Three-colour DFS: a back edge to a node still on the recursion stack closes
/// a cycle, which is cut out of the current path.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|&x| x == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[cycle_start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
