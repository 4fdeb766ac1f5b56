//! A minimal real-time kernel for a single-core microcontroller: a static
//! task arena, intrusive round-robin ready/sleeping/suspended queues, a
//! tick-driven scheduler, and FIFO-handoff blocking primitives (mutex,
//! semaphore, message queue) built over the same suspend/wake discipline.
//!
//! `no_std` on the real hardware targets. The host port backs its genuine
//! task suspend/resume with real OS threads (see
//! [`ports::mok::switch`](crate::ports::mok::switch)), so it needs the
//! standard library both for `cargo test` and for the separate `tests/*.rs`
//! integration binaries, which link this crate's normal (non-`#[cfg(test)]`)
//! build.
#![cfg_attr(any(target_arch = "riscv32", target_arch = "xtensa"), no_std)]

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
#[global_allocator]
static ALLOCATOR: esp_alloc::EspHeap = esp_alloc::EspHeap::empty();

pub mod config;
pub mod error;
pub mod mutex;
pub mod ports;
pub mod queue;
#[cfg(feature = "sync")]
pub mod sync;
pub mod task_manager;
pub mod timer;

#[cfg(feature = "c-library")]
pub mod c_api;

pub use error::KernelError;
pub use mutex::Mutex;
#[cfg(feature = "sync")]
pub use sync::{MessageQueue, Semaphore};
