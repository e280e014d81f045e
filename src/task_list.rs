/* SPDX-License-Identifier: MIT */

use crate::mem::{MemoryContext, TableSource};
use crate::util::locking::{LockGuard, SpinLock};

use alloc::vec::Vec;
use x86_64::addr::PhysAddr;

/// Process identifier as supplied by the caller, unvalidated until lookup
pub type ProcessId = u32;

/// No task for the pid, or the task has no usable memory context
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextNotFound;

/// Resolve a process id to its memory context.
///
/// Implementations are read-only: a resolution must not alter the task
/// records it consults.
pub trait ProcessContextLookup {
    fn resolve_context(&self, pid: ProcessId) -> Result<MemoryContext<'_>, ContextNotFound>;
}

#[derive(Clone, Copy, Debug)]
struct TaskInfo {
    pid: ProcessId,
    mm: Option<PhysAddr>,
    active_mm: Option<PhysAddr>,
}

/// Task records of one process-identifier namespace.
///
/// Each record carries the primary page-table root (`mm`) and, for tasks
/// that currently run with another's address space, the borrowed one
/// (`active_mm`). The primary root always wins when both exist.
pub struct TaskTable<'a> {
    tables: &'a dyn TableSource,
    tasks: SpinLock<Vec<TaskInfo>>,
}

impl<'a> TaskTable<'a> {
    pub fn new(tables: &'a dyn TableSource) -> Self {
        TaskTable {
            tables,
            tasks: SpinLock::new(Vec::new()),
        }
    }

    /// Record a task and the roots of its memory contexts.
    pub fn register_task(
        &self,
        pid: ProcessId,
        mm: Option<PhysAddr>,
        active_mm: Option<PhysAddr>,
    ) {
        let mut tasks: LockGuard<Vec<TaskInfo>> = self.tasks.lock();
        tasks.push(TaskInfo {
            pid,
            mm,
            active_mm,
        });
    }

    /// Drop the record for `pid`. Returns false if it was never registered.
    pub fn remove_task(&self, pid: ProcessId) -> bool {
        let mut tasks: LockGuard<Vec<TaskInfo>> = self.tasks.lock();

        for i in 0..tasks.len() {
            if tasks[i].pid == pid {
                tasks.swap_remove(i);
                return true;
            }
        }

        false
    }

    fn root_for(&self, pid: ProcessId) -> Option<PhysAddr> {
        let tasks: LockGuard<Vec<TaskInfo>> = self.tasks.lock();

        for i in 0..tasks.len() {
            if tasks[i].pid == pid {
                return tasks[i].mm.or(tasks[i].active_mm);
            }
        }

        None
    }
}

impl ProcessContextLookup for TaskTable<'_> {
    fn resolve_context(&self, pid: ProcessId) -> Result<MemoryContext<'_>, ContextNotFound> {
        match self.root_for(pid) {
            Some(root) => Ok(MemoryContext::new(root, self.tables)),
            None => {
                log::debug!("no memory context for pid {}", pid);
                Err(ContextNotFound)
            }
        }
    }
}
