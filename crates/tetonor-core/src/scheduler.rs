//! Deferred tasks for the single-threaded event loop
//!
//! Adjudication runs a short while after a selection completes. Instead of
//! a timer callback the game keeps the work here, and the front end drives
//! it with `take_due` on every tick. Tests use `drain` to run everything at
//! once.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Identifier of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Shared flag that stops a scheduled task from running
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug)]
struct Pending<T> {
    id: TaskId,
    due: Instant,
    token: CancellationToken,
    task: T,
}

/// Queue of tasks waiting for their due time
#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Schedule `task` to run at `due`
    pub fn schedule(&mut self, task: T, due: Instant) -> (TaskId, CancellationToken) {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let token = CancellationToken::new();
        self.pending.push(Pending {
            id,
            due,
            token: token.clone(),
            task,
        });
        (id, token)
    }

    /// Cancel a task by id. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.pending.iter().find(|p| p.id == id) {
            Some(p) if !p.token.is_cancelled() => {
                p.token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        for p in &self.pending {
            p.token.cancel();
        }
        self.pending.clear();
    }

    /// Remove and return tasks due at or before `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        self.take_where(|p| p.due <= now)
    }

    /// Remove and return every live task regardless of due time
    pub fn drain(&mut self) -> Vec<T> {
        self.take_where(|_| true)
    }

    /// Whether any task is still waiting to run
    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(|p| !p.token.is_cancelled())
    }

    /// Due time of the earliest live task
    pub fn next_due(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter(|p| !p.token.is_cancelled())
            .map(|p| p.due)
            .min()
    }

    fn take_where(&mut self, ready: impl Fn(&Pending<T>) -> bool) -> Vec<T> {
        self.pending.retain(|p| !p.token.is_cancelled());

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| ready(p));
        self.pending = waiting;

        due.sort_by_key(|p| (p.due, p.id));
        due.into_iter().map(|p| p.task).collect()
    }
}
