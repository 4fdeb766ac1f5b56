//! Task Manager Module
//!
//! This module owns the kernel's three tightly coupled subsystems: the task
//! arena and its ready/sleeping/suspended queues, the round-robin scheduler,
//! and the tick handler that drives sleepers and involuntary preemption. It
//! is the direct descendant of Martos's task manager, generalized from a
//! priority-array cooperative scheduler and a separate stack-based
//! preemptive one into a single kernel where every dispatch, voluntary or
//! not, is a genuine context switch: a blocked task's call stack really
//! stops running and really resumes where it left off, the same guarantee
//! Martos's own preemptive scheduler gives real hardware, now honored on
//! every port including the host one.
//!
//! # Usage
//!
//! ```rust,no_run
//! use picokernel::task_manager::{task_create, task_init, task_start};
//!
//! extern "C" fn read_sensor(_arg: *mut u8) {
//!     loop {
//!         // ... read the sensor, then give other tasks a turn ...
//!         picokernel::task_manager::task_yield();
//!     }
//! }
//!
//! task_init();
//! task_create(read_sensor, core::ptr::null_mut()).unwrap();
//! task_start();
//! ```

pub mod task;

use crate::error::KernelError;
use crate::ports::{CriticalSection, Port, PortTrait};
use crate::queue::Queue;
use crate::task_manager::task::{TaskArena, TaskFn, TaskId, TaskStatus};

#[cfg(feature = "tick-accounting")]
use crate::timer::TickAccounting;

/// The kernel's global, process-wide state: the task arena plus the three
/// queues every task moves between. There is exactly one of these; it is
/// not meant to be handed across threads, because there are no threads —
/// only tasks sharing one CPU (the host port's per-task OS threads are an
/// implementation detail of how it *simulates* that single CPU, not a
/// second source of concurrent access — see
/// [`crate::ports::mok::switch`](crate::ports::mok::switch)).
struct Kernel {
    arena: TaskArena,
    ready: Queue,
    sleeping: Queue,
    suspended: Queue,
    current: Option<TaskId>,
    tick_counter: u64,
    #[cfg(feature = "tick-accounting")]
    tick_accounting: TickAccounting,
}

impl Kernel {
    const fn new() -> Self {
        Kernel {
            arena: TaskArena::new(),
            ready: Queue::new(),
            sleeping: Queue::new(),
            suspended: Queue::new(),
            current: None,
            tick_counter: 0,
            #[cfg(feature = "tick-accounting")]
            tick_accounting: TickAccounting::new(),
        }
    }
}

/// Global kernel instance. All access must happen with interrupts disabled
/// or from the tick ISR itself — see [`crate::ports::CriticalSection`].
static mut KERNEL: Kernel = Kernel::new();

fn kernel() -> &'static Kernel {
    unsafe { &KERNEL }
}

fn kernel_mut() -> &'static mut Kernel {
    unsafe { &mut KERNEL }
}

/// Initializes the kernel: arms the heap and the tick timer. Not safe to
/// call twice.
pub fn task_init() {
    Port::init_heap();
    Port::setup_hardware_timer();
    #[cfg(feature = "tick-accounting")]
    kernel_mut().tick_accounting.init(0);
    log::debug!("kernel initialized");
}

/// Allocates a TCB and a stack slab for a new task and appends it to the
/// ready queue. Must be called before [`task_start`].
///
/// `entry` is run with `arg` delivered unchanged on its first dispatch,
/// matching the distilled source's `taskCreate(TaskFunction fn, void *data)`
/// exactly; there is no separate setup/loop/stop-condition split. `entry` is
/// expected to run forever, yielding the CPU itself via [`task_yield`],
/// [`task_sleep`], [`task_suspend`], or a blocking call into
/// [`crate::mutex`]/[`crate::sync`] — nothing re-invokes it from the top.
///
/// Fails with [`KernelError::TaskArenaExhausted`] once [`crate::config::MAX_TASKS`]
/// tasks already exist.
pub fn task_create(entry: TaskFn, arg: *mut u8) -> Result<TaskId, KernelError> {
    let _cs = CriticalSection::enter();
    let kernel = kernel_mut();
    let index = kernel
        .arena
        .tasks
        .iter()
        .position(|tcb| tcb.is_free())
        .ok_or(KernelError::TaskArenaExhausted)?;
    let id = TaskId(index as u8);

    let tcb = kernel.arena.get_mut(id);
    tcb.entry = Some(entry);
    tcb.arg = arg;
    tcb.status = TaskStatus::Ready;
    tcb.delay = 0;
    tcb.saved_sp = Port::setup_stack(id, &mut tcb.stack, entry, arg);

    kernel.ready.insert_tail(&mut kernel.arena, id);
    log::trace!("task {} created", id.0);
    Ok(id)
}

/// Returns the handle of the task whose context is presently live, or
/// `None` if called outside any task (e.g. before the scheduler's first
/// dispatch).
pub fn task_current() -> Option<TaskId> {
    kernel().current
}

/// Voluntarily releases the CPU. The task's status and queue membership are
/// untouched — it remains ready — so the next scheduler pass simply gives
/// another ready task a turn first; when this task is dispatched again,
/// execution resumes right after this call.
pub fn task_yield() {
    let Some(id) = task_current() else { return };
    let tcb = kernel_mut().arena.get_mut(id);
    unsafe { Port::suspend(&mut tcb.saved_sp) };
}

/// Blocks the current task for at least `ceil(ms / MS_PER_TICK)` ticks. Does
/// not return until [`tick`] has counted down that many ticks and moved the
/// task back onto the ready queue.
///
/// # Panics
///
/// Panics if called with no current task — suspending with nothing running
/// is a programmer error the kernel does not otherwise guard against.
pub fn task_sleep(ms: u32) {
    let ticks = crate::config::ms_to_ticks(ms).max(1);
    let id = {
        let _cs = CriticalSection::enter();
        let kernel = kernel_mut();
        let id = kernel
            .current
            .expect("task_sleep: no current task to suspend");
        kernel.ready.remove(&mut kernel.arena, id);
        let tcb = kernel.arena.get_mut(id);
        tcb.delay = ticks;
        tcb.status = TaskStatus::Sleeping;
        kernel.sleeping.insert_tail(&mut kernel.arena, id);
        id
    };
    let tcb = kernel_mut().arena.get_mut(id);
    unsafe { Port::suspend(&mut tcb.saved_sp) };
}

/// Moves the current task into the global suspended queue and yields. On
/// wakeup, execution resumes at the instruction after this call.
///
/// # Panics
///
/// Panics if called with no current task.
pub fn task_suspend() {
    let id = {
        let _cs = CriticalSection::enter();
        let kernel = kernel_mut();
        let id = kernel
            .current
            .expect("task_suspend: no current task to suspend");
        kernel.ready.remove(&mut kernel.arena, id);
        kernel.arena.get_mut(id).status = TaskStatus::Suspended;
        kernel.suspended.insert_tail(&mut kernel.arena, id);
        id
    };
    let tcb = kernel_mut().arena.get_mut(id);
    unsafe { Port::suspend(&mut tcb.saved_sp) };
}

/// Moves `t` back onto the ready queue. Safe to call from task or ISR
/// context. Waking an already-ready task is a no-op; it does not requeue it
/// a second time.
///
/// Only valid for a task suspended via [`task_suspend`] or sleeping via
/// [`task_sleep`] — both of those park a task on a queue this function
/// already knows how to address by status. A task blocked on a
/// [`crate::mutex::Mutex`] or [`crate::sync`] primitive sits on that
/// primitive's own private waiter queue instead; only its matching
/// `wake_first_waiter` call knows how to unlink it correctly.
pub fn task_wakeup(t: TaskId) {
    let _cs = CriticalSection::enter();
    let kernel = kernel_mut();
    match kernel.arena.get(t).status {
        TaskStatus::Sleeping => kernel.sleeping.remove(&mut kernel.arena, t),
        TaskStatus::Suspended => kernel.suspended.remove(&mut kernel.arena, t),
        TaskStatus::Ready | TaskStatus::Running => return,
    }
    let tcb = kernel.arena.get_mut(t);
    tcb.delay = 0;
    tcb.status = TaskStatus::Ready;
    kernel.ready.insert_tail(&mut kernel.arena, t);
}

/// Suspends the current task onto an arbitrary waiter queue owned by a
/// synchronization primitive (mutex, semaphore, message queue) rather than
/// the kernel's own suspended queue, then yields. Does not return until
/// some later [`wake_first_waiter`] moves this exact task back to the ready
/// queue and the scheduler dispatches it again — at that point execution
/// resumes right after this call, holding whatever the waking primitive
/// handed it, e.g. a [`crate::mutex::Mutex`] that is already locked on this
/// task's behalf. Used internally by [`crate::mutex`] and [`crate::sync`].
pub(crate) fn block_current_on(waiters: &mut Queue) -> TaskId {
    let id = {
        let _cs = CriticalSection::enter();
        let kernel = kernel_mut();
        let id = kernel
            .current
            .expect("block_current_on: no current task to suspend");
        kernel.ready.remove(&mut kernel.arena, id);
        kernel.arena.get_mut(id).status = TaskStatus::Suspended;
        waiters.insert_tail(&mut kernel.arena, id);
        id
    };
    let tcb = kernel_mut().arena.get_mut(id);
    unsafe { Port::suspend(&mut tcb.saved_sp) };
    id
}

/// Wakes the longest-waiting task on `waiters`, moving it to the ready
/// queue. Returns its handle, or `None` if `waiters` was empty. Used
/// internally by [`crate::mutex`] and [`crate::sync`] for FIFO handoff.
pub(crate) fn wake_first_waiter(waiters: &mut Queue) -> Option<TaskId> {
    let _cs = CriticalSection::enter();
    let kernel = kernel_mut();
    let id = waiters.head()?;
    waiters.remove(&mut kernel.arena, id);
    let tcb = kernel.arena.get_mut(id);
    tcb.delay = 0;
    tcb.status = TaskStatus::Ready;
    kernel.ready.insert_tail(&mut kernel.arena, id);
    Some(id)
}

/// Advances the tick counter, advances the optional second/ms/µs
/// accumulators, and wakes every sleeping task whose delay has reached
/// zero. Invoked once per tick, either by the real timer ISR or, on the
/// host port, by a test driving the tick path directly.
///
/// Sleepers are snapshotted into a fixed-size buffer before any queue is
/// mutated, rather than walked and unlinked in the same pass — the
/// distilled source's `queue_post` advanced its scan cursor only inside a
/// conditional branch, which could loop forever; collecting first and
/// mutating second sidesteps that class of bug entirely.
pub fn tick() {
    let _cs = CriticalSection::enter();
    let kernel = kernel_mut();
    kernel.tick_counter += 1;
    #[cfg(feature = "tick-accounting")]
    kernel.tick_accounting.on_tick();

    let mut due: [Option<TaskId>; crate::config::MAX_TASKS] = [None; crate::config::MAX_TASKS];
    let mut count = 0;
    kernel.sleeping.foreach(&kernel.arena, |id| {
        due[count] = Some(id);
        count += 1;
    });

    for slot in due.iter().take(count) {
        let id = slot.expect("collected sleeper handle");
        let tcb = kernel.arena.get_mut(id);
        tcb.delay = tcb.delay.saturating_sub(1);
        if tcb.delay == 0 {
            kernel.sleeping.remove(&mut kernel.arena, id);
            kernel.arena.get_mut(id).status = TaskStatus::Ready;
            kernel.ready.insert_tail(&mut kernel.arena, id);
        }
    }
}

/// The kernel's logical tick count, distinct from the raw hardware timer
/// exposed by [`crate::timer::Timer`].
pub fn tick_counter() -> u64 {
    kernel().tick_counter
}

#[cfg(feature = "tick-accounting")]
pub fn milliseconds_elapsed() -> u64 {
    kernel().tick_accounting.milliseconds()
}

#[cfg(feature = "tick-accounting")]
pub fn microseconds_elapsed() -> u64 {
    kernel().tick_accounting.microseconds()
}

/// Arms the seconds countdown: [`tick`] decrements it once per tick, and
/// [`seconds_elapsed`] increments every time it reaches zero. Matches the
/// distilled source's `taskSetSecond`; an application calls this to start
/// counting whole seconds from whatever tick it happens to be at, rather
/// than from `task_init`.
#[cfg(feature = "tick-accounting")]
pub fn task_set_second(seconds: u32) {
    let _cs = CriticalSection::enter();
    kernel_mut().tick_accounting.set_seconds_countdown(seconds);
}

#[cfg(feature = "tick-accounting")]
pub fn seconds_elapsed() -> u32 {
    kernel().tick_accounting.seconds_elapsed()
}

/// Picks the next ready task, round-robin, and dispatches it via
/// [`PortTrait::resume`]: a genuine switch onto that task's own saved
/// context, not a re-invocation of its entry function. Does not return
/// until the task itself gives up the CPU (by calling [`task_yield`] and
/// friends, or by blocking on a [`crate::mutex::Mutex`]/[`crate::sync`]
/// primitive), at which point its status is demoted back to `Ready` unless
/// the task already moved itself to `Sleeping`/`Suspended` on the way out.
/// Returns `false` if the ready queue was empty.
///
/// Used directly only by the host port's [`task_start`] loop; real hardware
/// never calls this; it dispatches exclusively through [`tick_from_isr`].
fn dispatch_one() -> bool {
    let id = {
        let _cs = CriticalSection::enter();
        let kernel = kernel_mut();
        let id = match kernel.ready.head() {
            Some(id) => id,
            None => return false,
        };
        kernel.ready.rotate(&kernel.arena, id);
        kernel.current = Some(id);
        kernel.arena.get_mut(id).status = TaskStatus::Running;
        id
    };

    let sp = kernel().arena.get(id).saved_sp;
    unsafe { Port::resume(sp) };

    let _cs = CriticalSection::enter();
    let kernel = kernel_mut();
    if kernel.arena.get(id).status == TaskStatus::Running {
        kernel.arena.get_mut(id).status = TaskStatus::Ready;
    }
    kernel.current = None;
    true
}

/// Runs the tick ISR: saves the interrupted task's context, runs
/// [`tick`], and dispatches whichever task the scheduler now picks by
/// loading its saved context into the trap frame. This is the *only*
/// dispatch path on real hardware — a task's very first run, like every
/// subsequent one, happens because this handler loads its initial context
/// (built by [`PortTrait::setup_stack`]) into the interrupted frame, never
/// because anything calls [`PortTrait::resume`] directly.
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub(crate) fn tick_from_isr(isr_ctx: &mut <Port as PortTrait>::TrapFrame) {
    let kernel = kernel_mut();
    if let Some(running) = kernel.current {
        let tcb = kernel.arena.get_mut(running);
        let saved = tcb.saved_sp as *mut <Port as PortTrait>::TrapFrame;
        unsafe { Port::save_ctx(&mut *saved, isr_ctx) };
        if kernel.arena.get(running).status == TaskStatus::Running {
            kernel.arena.get_mut(running).status = TaskStatus::Ready;
        }
    }
    tick();
    let kernel = kernel_mut();
    if let Some(next) = kernel.ready.head() {
        kernel.ready.rotate(&kernel.arena, next);
        kernel.current = Some(next);
        kernel.arena.get_mut(next).status = TaskStatus::Running;
        let tcb = kernel.arena.get(next);
        let saved = tcb.saved_sp as *const <Port as PortTrait>::TrapFrame;
        unsafe { Port::load_ctx(&*saved, isr_ctx) };
    }
}

/// Arms the tick interrupt and enters the scheduling loop. Never returns.
///
/// On real hardware, every dispatch happens inside the tick ISR (see
/// [`tick_from_isr`]); this just arms the interrupt and idles. The host
/// port has no real interrupt source, so it drives [`dispatch_one`] in a
/// plain loop instead, falling back to [`idle`] whenever the ready queue is
/// empty.
pub fn task_start() -> ! {
    #[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
    {
        Port::setup_interrupt();
        loop {
            idle();
        }
    }
    #[cfg(not(any(target_arch = "riscv32", target_arch = "xtensa")))]
    {
        loop {
            if !dispatch_one() {
                idle();
            }
        }
    }
}

// Interrupts must stay enabled across the idle wait so the tick ISR can
// still fire; this is the one place the scheduler intentionally does not
// hold a `CriticalSection` across its whole body.
fn idle() {
    Port::restore_interrupts(true);
    core::hint::spin_loop();
    Port::disable_interrupts();
}

/// Runs up to `max_steps` dispatches, stopping early once the ready queue
/// empties with nothing due to wake. A host build has no real idle/ISR
/// loop to drive the scheduler through, so integration tests need a
/// bounded driver instead of `task_start`'s `!`; this plays the same role
/// Martos's own `test_start_task_manager` played for its tests, always
/// compiled rather than hidden behind `cfg(test)` so integration tests in
/// `tests/` can call it too.
pub fn test_run_scheduler(max_steps: usize) -> usize {
    let mut ran = 0;
    for _ in 0..max_steps {
        if dispatch_one() {
            ran += 1;
        } else {
            break;
        }
    }
    ran
}

/// Resets the kernel's process-wide singleton to its initial, empty state,
/// and invalidates every task thread the host port spawned before this
/// call. Tests that share it must run under `#[sequential_test::sequential]`
/// and call this first, mirroring Martos's own `reset_task_manager`.
pub fn test_reset() {
    *kernel_mut() = Kernel::new();
    #[cfg(not(any(target_arch = "riscv32", target_arch = "xtensa")))]
    crate::ports::mok::switch::reset();
}
