//! The intrusive doubly linked circular queue the kernel threads tasks
//! through.
//!
//! A [`Queue`] never owns its nodes. It stores only a head handle; the
//! `prev`/`next` links live on the node itself, inside the task arena, the
//! same way the distilled source embeds a link struct in every TCB rather
//! than wrapping tasks in an owned container. Nodes carry no back-pointer to
//! the queue header — callers are responsible for knowing which queue a
//! handle is currently in, exactly as the invariant in the data model
//! requires.
//!
//! All operations are O(1) except [`Queue::foreach`].

use crate::task_manager::task::TaskId;

/// Gives a [`Queue`] access to the `prev`/`next` link fields stored on each
/// node. Implemented by the task arena so the queue itself stays free of any
/// knowledge of what a "task" is.
pub(crate) trait LinkedArena {
    fn prev(&self, id: TaskId) -> Option<TaskId>;
    fn next(&self, id: TaskId) -> Option<TaskId>;
    fn set_prev(&mut self, id: TaskId, prev: Option<TaskId>);
    fn set_next(&mut self, id: TaskId, next: Option<TaskId>);
}

/// An intrusive circular list of [`TaskId`] handles.
#[derive(Debug)]
pub(crate) struct Queue {
    head: Option<TaskId>,
}

impl Queue {
    pub const fn new() -> Self {
        Queue { head: None }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<TaskId> {
        self.head
    }

    /// Links `id` onto the tail of the queue. `id` must not already be
    /// linked into any queue.
    pub fn insert_tail<A: LinkedArena>(&mut self, arena: &mut A, id: TaskId) {
        match self.head {
            None => {
                arena.set_next(id, Some(id));
                arena.set_prev(id, Some(id));
                self.head = Some(id);
            }
            Some(head) => {
                let tail = arena.prev(head).expect("queue head is always linked");
                arena.set_next(tail, Some(id));
                arena.set_prev(id, Some(tail));
                arena.set_next(id, Some(head));
                arena.set_prev(head, Some(id));
            }
        }
    }

    /// Unlinks `id` from wherever it sits in this queue. `id` must currently
    /// be linked in this queue; the realization panics rather than
    /// corrupting memory if it is not, since there is no raw pointer to
    /// silently misuse.
    pub fn remove<A: LinkedArena>(&mut self, arena: &mut A, id: TaskId) {
        let prev = arena.prev(id).expect("remove: node is not linked");
        let next = arena.next(id).expect("remove: node is not linked");
        if prev == id {
            self.head = None;
        } else {
            arena.set_next(prev, Some(next));
            arena.set_prev(next, Some(prev));
            if self.head == Some(id) {
                self.head = Some(next);
            }
        }
        arena.set_prev(id, None);
        arena.set_next(id, None);
    }

    /// Makes `id` the logical tail: the next call to [`Queue::head`] returns
    /// `id`'s successor. Used by the scheduler for round-robin fairness.
    pub fn rotate<A: LinkedArena>(&mut self, arena: &A, id: TaskId) {
        if let Some(next) = arena.next(id) {
            self.head = Some(next);
        }
    }

    /// Visits every node once, starting from the head.
    pub fn foreach<A: LinkedArena>(&self, arena: &A, mut f: impl FnMut(TaskId)) {
        let Some(head) = self.head else { return };
        let mut cur = head;
        loop {
            f(cur);
            let next = arena.next(cur).expect("linked node must have a successor");
            if next == head {
                break;
            }
            cur = next;
        }
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}
