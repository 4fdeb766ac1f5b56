//! Counting semaphore.

use crate::ports::CriticalSection;
use crate::queue::Queue;
use crate::task_manager::{block_current_on, wake_first_waiter};

/// A counting semaphore with a FIFO wait queue, re-derived over the same
/// waiter-queue pattern as [`crate::mutex::Mutex`] rather than the
/// distilled source's task-list scan.
pub struct Semaphore {
    count: i32,
    waiters: Queue,
}

impl Semaphore {
    pub const fn new(initial: i32) -> Self {
        Semaphore {
            count: initial,
            waiters: Queue::new(),
        }
    }

    /// Acquires a permit, blocking the calling task while none are
    /// available.
    ///
    /// Mirrors [`crate::mutex::Mutex::lock`]: a woken waiter does not
    /// recheck `count` after resuming, it simply returns holding the
    /// permit handed to it directly by [`Semaphore::post`]. Rechecking
    /// would deadlock, since `post` deliberately leaves `count` unchanged
    /// on handoff.
    pub fn wait(&mut self) {
        let _cs = CriticalSection::enter();
        if self.count > 0 {
            self.count -= 1;
        } else {
            block_current_on(&mut self.waiters);
        }
    }

    /// Releases a permit.
    ///
    /// If a task is already waiting, the permit passes directly to the
    /// longest-waiting one and `count` is left unchanged — there is no
    /// `count` transition to assume a waiter exists for, unlike the
    /// distilled source's unlock path. Only when nothing is waiting does
    /// `count` actually increment.
    pub fn post(&mut self) {
        let _cs = CriticalSection::enter();
        if wake_first_waiter(&mut self.waiters).is_none() {
            self.count += 1;
        }
    }

    pub fn count(&self) -> i32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_manager::test_support;
    use sequential_test::sequential;

    #[test]
    #[sequential]
    fn wait_with_permits_available_decrements() {
        test_support::reset();
        let mut s = Semaphore::new(2);
        s.wait();
        assert_eq!(s.count(), 1);
    }

    #[test]
    #[sequential]
    fn post_with_no_waiters_increments_count() {
        test_support::reset();
        let mut s = Semaphore::new(0);
        s.post();
        assert_eq!(s.count(), 1);
    }

    #[test]
    #[sequential]
    fn post_with_waiter_wakes_it_without_changing_count() {
        test_support::reset();
        let mut s = Semaphore::new(0);

        let waiter = test_support::spawn_blocked_on(&mut s.waiters);
        assert!(test_support::is_suspended(waiter));

        s.post();

        assert_eq!(s.count(), 0);
        assert!(test_support::is_ready(waiter));
    }

    #[test]
    #[sequential]
    fn waiters_are_woken_fifo() {
        test_support::reset();
        let mut s = Semaphore::new(0);

        let t1 = test_support::spawn_blocked_on(&mut s.waiters);
        let t2 = test_support::spawn_blocked_on(&mut s.waiters);

        s.post();
        assert!(test_support::is_ready(t1));
        assert!(test_support::is_suspended(t2));

        s.post();
        assert!(test_support::is_ready(t2));
    }
}
