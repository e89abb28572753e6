// src/task/dependency.rs

//! Non-owning dependency edges between tasks.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::errors::{Result, TaskError};
use crate::state::{TaskCore, TaskId};
use crate::task::TaskHandle;

#[derive(Debug)]
struct DependencyEdge {
    id: TaskId,
    name: String,
    target: Weak<TaskCore>,
}

/// The set of tasks one task waits on.
///
/// Edges hold `Weak` references; the owner of the graph keeps tasks alive.
/// Edits are only accepted while the owning task has not started, so
/// steady-state readiness checks only ever take the read lock.
#[derive(Debug, Default)]
pub struct DependencySet {
    edges: RwLock<Vec<DependencyEdge>>,
}

impl DependencySet {
    /// Add an edge `owner -> dependency`.
    ///
    /// Returns `Ok(false)` if the edge already existed.
    pub fn add(&self, owner: &TaskCore, dependency: &TaskHandle) -> Result<bool> {
        if dependency.id() == owner.id() {
            let err = TaskError::SelfDependency {
                task: owner.name().to_string(),
            };
            warn!(task = %owner.name(), id = %owner.id(), error = %err, "dependency rejected");
            return Err(err);
        }

        let mut edges = self.edges.write();
        ensure_not_started(owner, dependency.name())?;

        if edges.iter().any(|edge| edge.id == dependency.id()) {
            return Ok(false);
        }

        edges.push(DependencyEdge {
            id: dependency.id(),
            name: dependency.name().to_string(),
            target: Arc::downgrade(dependency.core()),
        });
        debug!(
            task = %owner.name(),
            dependency = %dependency.name(),
            "dependency added"
        );
        Ok(true)
    }

    /// Remove the edge to `dependency`.
    ///
    /// Returns `Ok(false)` if there was no such edge.
    pub fn remove(&self, owner: &TaskCore, dependency: TaskId) -> Result<bool> {
        let mut edges = self.edges.write();

        let Some(pos) = edges.iter().position(|edge| edge.id == dependency) else {
            return Ok(false);
        };
        ensure_not_started(owner, &edges[pos].name)?;

        let edge = edges.remove(pos);
        debug!(
            task = %owner.name(),
            dependency = %edge.name,
            "dependency removed"
        );
        Ok(true)
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.edges.read().iter().map(|edge| edge.id).collect()
    }

    pub fn len(&self) -> usize {
        self.edges.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.read().is_empty()
    }

    /// Dependencies that have not reached `Finished`.
    ///
    /// A dependency that has been dropped counts as unfinished.
    pub fn unfinished(&self, owner: &TaskCore) -> Vec<TaskId> {
        self.edges
            .read()
            .iter()
            .filter(|edge| !edge_finished(owner, edge))
            .map(|edge| edge.id)
            .collect()
    }

    pub fn all_finished(&self, owner: &TaskCore) -> bool {
        self.edges
            .read()
            .iter()
            .all(|edge| edge_finished(owner, edge))
    }
}

fn edge_finished(owner: &TaskCore, edge: &DependencyEdge) -> bool {
    match edge.target.upgrade() {
        Some(dep) => dep.is_finished(),
        None => {
            warn!(
                task = %owner.name(),
                dependency = %edge.name,
                "dependency dropped while still referenced; treating as unsatisfied"
            );
            false
        }
    }
}

fn ensure_not_started(owner: &TaskCore, dependency: &str) -> Result<()> {
    if owner.has_started() {
        let err = TaskError::DependencyAfterStart {
            task: owner.name().to_string(),
            dependency: dependency.to_string(),
        };
        warn!(task = %owner.name(), id = %owner.id(), error = %err, "dependency change rejected");
        return Err(err);
    }
    Ok(())
}
