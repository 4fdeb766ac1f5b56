//! Fixed-capacity ring-buffer message queue.

use crate::ports::CriticalSection;
use crate::queue::Queue;
use crate::task_manager::{block_current_on, wake_first_waiter};
use core::mem::MaybeUninit;

/// A fixed-capacity ring buffer of `Copy` items, guarded by the same
/// suspend/wake discipline as [`crate::mutex::Mutex`].
///
/// `N` is the ring's capacity in items. Blocked senders and receivers are
/// tracked on two separate FIFOs rather than by scanning the task list, so
/// posting or pending never loops looking for a match.
pub struct MessageQueue<T: Copy, const N: usize> {
    buf: [MaybeUninit<T>; N],
    head: usize,
    len: usize,
    receivers: Queue,
    senders: Queue,
}

impl<T: Copy, const N: usize> MessageQueue<T, N> {
    pub const fn new() -> Self {
        MessageQueue {
            buf: [MaybeUninit::uninit(); N],
            head: 0,
            len: 0,
            receivers: Queue::new(),
            senders: Queue::new(),
        }
    }

    fn tail(&self) -> usize {
        (self.head + self.len) % N
    }

    /// Pushes `item`, blocking the calling task if the ring is already
    /// full.
    ///
    /// The retry loop re-checks `self.len` after every wakeup rather than
    /// trusting the wakeup to mean "there is now room": `block_current_on`
    /// performs a genuine suspend, so by the time this task is dispatched
    /// again another sender may already have raced in and refilled the slot
    /// a `pend` just freed. The loop is safe to re-enter because a blocked
    /// task's call stack is truly parked — there is no way for a task
    /// already on `self.senders` to call back into `block_current_on` a
    /// second time before it is woken and actually resumes here.
    pub fn post(&mut self, item: T) {
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.len < N {
                    let tail = self.tail();
                    self.buf[tail] = MaybeUninit::new(item);
                    self.len += 1;
                    wake_first_waiter(&mut self.receivers);
                    return;
                }
            }
            block_current_on(&mut self.senders);
        }
    }

    /// Pops the oldest item, blocking the calling task if the ring is
    /// empty.
    pub fn pend(&mut self) -> T {
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.len > 0 {
                    // SAFETY: a slot within `len` of `head` was written by
                    // a prior `post` and never read since.
                    let item = unsafe { self.buf[self.head].assume_init() };
                    self.head = (self.head + 1) % N;
                    self.len -= 1;
                    wake_first_waiter(&mut self.senders);
                    return item;
                }
            }
            block_current_on(&mut self.receivers);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }
}

impl<T: Copy, const N: usize> Default for MessageQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
