//! Genuine suspend/resume for the host port.
//!
//! The host has no timer interrupt that can preempt arbitrary code between
//! instructions, so a task cannot be suspended and resumed by copying a
//! register file the way the real hardware port does. Instead every task
//! created by [`Mok`](super::Mok) gets its own native OS thread; scheduling
//! one task is "give its thread the baton and wait for it to hand the baton
//! back", which is exactly the suspend/resume contract
//! [`crate::ports::PortTrait`] asks every port for, just implemented with
//! `std::thread`/`Condvar` instead of a hand-rolled stack switch.
//!
//! Only one thread ever holds the baton at a time, so this reproduces the
//! single-CPU, non-reentrant execution model the rest of the kernel assumes
//! even though, physically, several OS threads exist.

use crate::task_manager::task::{TaskFn, TaskId};
use std::sync::{Condvar, Mutex};

/// Who currently holds the baton. `Generation` lets a fresh [`reset`] make
/// every thread spawned by a previous `cargo test` run permanently
/// irrelevant instead of racing a same-numbered `TaskId` from the new run.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Turn {
    Scheduler,
    Task(TaskId, u64),
}

struct Baton {
    turn: Mutex<Turn>,
    cv: Condvar,
}

static BATON: Baton = Baton {
    turn: Mutex::new(Turn::Scheduler),
    cv: Condvar::new(),
};

static GENERATION: Mutex<u64> = Mutex::new(0);

fn generation() -> u64 {
    *GENERATION.lock().unwrap()
}

/// Invalidates every task thread spawned before this call. Called by
/// `task_manager::test_reset` so a fresh `cargo test` doesn't hand the baton
/// to a thread left over, permanently parked, from a previous test.
pub fn reset() {
    *GENERATION.lock().unwrap() += 1;
    *BATON.turn.lock().unwrap() = Turn::Scheduler;
}

/// A raw pointer is not `Send`, but the task thread we hand `arg` to is the
/// only place that ever reads it, exactly once, before calling `entry`.
struct SendPtr(*mut u8);
unsafe impl Send for SendPtr {}

/// Encodes `(generation, id)` as the opaque `saved_sp` the generic scheduler
/// threads through `setup_stack`/`suspend`/`resume` without ever looking at
/// its bits itself.
fn encode(id: TaskId, gen: u64) -> *mut u8 {
    (((gen as usize) << 8) | id.0 as usize) as *mut u8
}

fn decode(sp: *mut u8) -> (TaskId, u64) {
    let raw = sp as usize;
    (TaskId(raw as u8), (raw >> 8) as u64)
}

/// Spawns the OS thread backing a brand-new task and returns its encoded
/// `saved_sp`. The thread parks immediately, waiting for its first turn.
///
/// Unlike a real port, the host needs the `TaskId` the kernel already
/// allocated for this task *before* it can build anything (the thread's
/// identity on the baton is the id itself), so this takes `id` directly
/// rather than deriving it from the stack slab like `setup_stack` elsewhere.
pub fn setup_stack(id: TaskId, entry: TaskFn, arg: *mut u8) -> *mut u8 {
    let gen = generation();
    let send_arg = SendPtr(arg);
    std::thread::Builder::new()
        .name(alloc_task_thread_name(id))
        .spawn(move || {
            let send_arg = send_arg;
            wait_for_turn(id, gen);
            (entry)(send_arg.0);
            log::warn!(
                "task {} entry function returned; it will never be dispatched again",
                id.0
            );
            park_forever();
        })
        .expect("failed to spawn host task thread");
    encode(id, gen)
}

fn alloc_task_thread_name(id: TaskId) -> String {
    std::format!("picokernel-task-{}", id.0)
}

fn wait_for_turn(id: TaskId, gen: u64) {
    let mut turn = BATON.turn.lock().unwrap();
    while *turn != Turn::Task(id, gen) {
        turn = BATON.cv.wait(turn).unwrap();
    }
}

fn park_forever() -> ! {
    let mut turn = BATON.turn.lock().unwrap();
    loop {
        turn = BATON.cv.wait(turn).unwrap();
    }
}

/// Hands the baton to `sp`'s task and blocks the caller (the scheduler
/// thread) until that task hands the baton back via [`suspend`].
///
/// # Safety
/// `sp` must have been produced by [`setup_stack_for`] or [`suspend`] for a
/// task that is not already holding the baton.
pub unsafe fn resume(sp: *mut u8) {
    let (id, gen) = decode(sp);
    {
        let mut turn = BATON.turn.lock().unwrap();
        *turn = Turn::Task(id, gen);
        BATON.cv.notify_all();
    }
    let mut turn = BATON.turn.lock().unwrap();
    while *turn != Turn::Scheduler {
        turn = BATON.cv.wait(turn).unwrap();
    }
}

/// Hands the baton back to the scheduler thread and blocks the calling
/// task's own thread until it is dispatched again, i.e. until some later
/// [`resume`] targets `*saved_sp` once more.
///
/// # Safety
/// Must be called from the task thread matching `*saved_sp`.
pub unsafe fn suspend(saved_sp: &mut *mut u8) {
    let (id, gen) = decode(*saved_sp);
    {
        let mut turn = BATON.turn.lock().unwrap();
        *turn = Turn::Scheduler;
        BATON.cv.notify_all();
    }
    wait_for_turn(id, gen);
    *saved_sp = encode(id, gen);
}
