//! Non-recursive, non-tracking mutual-exclusion lock.
//!
//! Mirrors the distilled source's `mutexLock`/`mutexUnlock`: the lock bit
//! never moves without interrupts disabled, and `unlock` on a contended
//! mutex hands the held bit directly to the longest-waiting task rather
//! than dropping it back to unlocked for someone to race for.

use crate::ports::CriticalSection;
use crate::queue::Queue;
use crate::task_manager::{block_current_on, wake_first_waiter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unlocked,
    Locked,
}

/// A binary lock with a FIFO wait queue.
///
/// Not recursive, does not record its owner, and has no timeout variant —
/// unlocking a mutex the calling task never locked is a programmer error
/// and is not detected.
pub struct Mutex {
    status: Status,
    waiting: Queue,
}

impl Mutex {
    pub const fn new() -> Self {
        Mutex {
            status: Status::Unlocked,
            waiting: Queue::new(),
        }
    }

    /// Acquires the lock, blocking the calling task if it is already held.
    ///
    /// Returns immediately if the mutex was unlocked. Otherwise suspends
    /// the current task onto the wait queue and does not return until some
    /// later `unlock` hands the lock to it.
    pub fn lock(&mut self) {
        let _cs = CriticalSection::enter();
        if self.status == Status::Locked {
            block_current_on(&mut self.waiting);
        } else {
            self.status = Status::Locked;
        }
    }

    /// Releases the lock.
    ///
    /// If a task is waiting, the lock stays held and ownership passes
    /// directly to the longest-waiting task; otherwise the mutex becomes
    /// unlocked. Calling this without holding the lock is undefined.
    pub fn unlock(&mut self) {
        let _cs = CriticalSection::enter();
        if wake_first_waiter(&mut self.waiting).is_none() {
            self.status = Status::Unlocked;
        }
    }

    /// Whether the mutex is currently held by some task.
    pub fn is_locked(&self) -> bool {
        self.status == Status::Locked
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_manager::test_support;
    use sequential_test::sequential;

    #[test]
    #[sequential]
    fn lock_uncontended_succeeds_immediately() {
        test_support::reset();
        let mut m = Mutex::new();
        assert!(!m.is_locked());
        m.lock();
        assert!(m.is_locked());
    }

    #[test]
    #[sequential]
    fn unlock_with_no_waiters_unlocks() {
        test_support::reset();
        let mut m = Mutex::new();
        m.lock();
        m.unlock();
        assert!(!m.is_locked());
    }

    #[test]
    #[sequential]
    fn unlock_with_waiter_keeps_held_and_wakes_it() {
        test_support::reset();
        let mut m = Mutex::new();
        m.lock();

        let waiter = test_support::spawn_blocked_on(&mut m.waiting);
        assert!(test_support::is_suspended(waiter));

        m.unlock();

        assert!(m.is_locked());
        assert!(test_support::is_ready(waiter));
    }

    #[test]
    #[sequential]
    fn waiters_acquire_in_fifo_order() {
        test_support::reset();
        let mut m = Mutex::new();
        m.lock();

        let t1 = test_support::spawn_blocked_on(&mut m.waiting);
        let t2 = test_support::spawn_blocked_on(&mut m.waiting);
        let t3 = test_support::spawn_blocked_on(&mut m.waiting);

        m.unlock();
        assert!(test_support::is_ready(t1));
        assert!(test_support::is_suspended(t2));
        assert!(test_support::is_suspended(t3));

        m.unlock();
        assert!(test_support::is_ready(t2));
        assert!(test_support::is_suspended(t3));

        m.unlock();
        assert!(test_support::is_ready(t3));

        m.unlock();
        assert!(!m.is_locked());
    }
}
