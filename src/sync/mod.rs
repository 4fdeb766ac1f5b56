//! Synchronization primitives built on the same suspend/wake discipline as
//! [`crate::mutex`], feature-gated separately because not every build needs
//! them.
//!
//! Both primitives here are supplemental: the distilled source sketches a
//! counting semaphore and a message queue as an `ifdef`-gated afterthought,
//! each implemented as a global array scanned linearly for a waiting task.
//! That scan is also where the source's two documented bugs live — the
//! semaphore assumes a waiter always exists when it shouldn't, and the
//! queue's post loop can spin forever. Both primitives below instead keep
//! one ordered FIFO of genuinely-blocked tasks per instance, the same
//! structure [`crate::mutex::Mutex`] already uses for its waiters, so "wake
//! the first match" is just "pop the queue head" — the scan never happens.

pub mod message_queue;
pub mod semaphore;

pub use message_queue::MessageQueue;
pub use semaphore::Semaphore;
