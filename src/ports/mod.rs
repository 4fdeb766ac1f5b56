//! Hardware abstraction seam.
//!
//! Everything target-specific — the tick timer, the heap, interrupt
//! masking, and the context switch that makes a blocked task resumable —
//! sits behind [`PortTrait`]. The kernel's scheduler, queues, and mutex never
//! reference a register or an interrupt vector directly; they only call
//! through `Port`, the type alias selected below by `cfg_if!` the same way
//! Martos picked between its targets.
//!
//! `xtensa_esp32` is the real target, built against `esp-hal`, and dispatches
//! every task exclusively through its tick-timer interrupt handler (see
//! `xtensa_esp32::preempt`), the same way Martos's own preemptive scheduler
//! does. `mok` is the host/test stand-in: it has no real interrupt source, so
//! it simulates genuine suspend/resume with real OS threads handed off one at
//! a time, which is what lets `cargo test` exercise actual blocking
//! (`Mutex::lock`, `Semaphore::wait`, `MessageQueue::post`/`pend`) rather than
//! just arena bookkeeping.

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod xtensa_esp32;

#[cfg(not(any(target_arch = "riscv32", target_arch = "xtensa")))]
pub mod mok;

cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))] {
        pub type Port = xtensa_esp32::XtensaEsp32;
    } else {
        pub type Port = mok::Mok;
    }
}

/// Contract every hardware target must satisfy for the kernel to run on it.
///
/// `TrapFrame` is an associated type rather than a fixed struct because the
/// saved register set is inherently target-specific; each port pairs it with
/// a local `pub type TrapFrame = ...` alias of the same name so its own
/// `save_ctx`/`load_ctx` signatures read naturally.
pub trait PortTrait {
    /// The saved-register image a context switch moves between a task's
    /// stack and the live CPU.
    type TrapFrame;

    #[cfg(feature = "uart")]
    type Uart2Type;
    #[cfg(feature = "uart")]
    type IoType;

    /// Initializes the global allocator's backing region. Called once from
    /// `task_init`.
    fn init_heap();

    /// Configures and arms the periodic tick timer at `MS_PER_TICK` cadence.
    fn setup_hardware_timer();

    /// Raw hardware timer tick count, for diagnostics; distinct from the
    /// kernel's own logical `tick_counter`.
    fn get_tick_counter() -> crate::timer::TickType;

    /// Wires the tick timer's interrupt vector to the kernel's ISR entry
    /// point. Real hardware dispatches every task exclusively through this
    /// interrupt; the host port has nothing to wire up.
    fn setup_interrupt();

    /// Builds the initial, resumable state for a brand-new task so that a
    /// later [`PortTrait::resume`] jumps into `entry(arg)` with interrupts
    /// enabled. Returns the opaque `saved_sp` handle `resume` consumes.
    ///
    /// `id` is the slot the kernel already allocated for this task; a port
    /// may fold it into the returned handle (the host port does, since its
    /// "stack" is an OS thread identified by this same id) or ignore it.
    fn setup_stack(
        id: crate::task_manager::task::TaskId,
        stack: &mut [u8],
        entry: crate::task_manager::task::TaskFn,
        arg: *mut u8,
    ) -> *mut u8;

    /// Copies the interrupted task's live context out of the ISR's frame and
    /// into its saved slot.
    fn save_ctx(saved: &mut Self::TrapFrame, isr_ctx: &Self::TrapFrame);

    /// Copies a task's saved context into the ISR's frame so the return
    /// path resumes it.
    fn load_ctx(saved: &Self::TrapFrame, isr_ctx: &mut Self::TrapFrame);

    /// Disables interrupts and reports whether they had been enabled, so
    /// the caller can restore exactly that prior state rather than blindly
    /// re-enabling.
    fn disable_interrupts() -> bool;

    /// Restores the interrupt-enable state captured by a matching
    /// `disable_interrupts` call.
    fn restore_interrupts(was_enabled: bool);

    /// Requests an immediate reschedule. A real target reloads the tick
    /// timer with a near-zero delay so the existing tick ISR fires and
    /// performs the actual context switch; the host port has no real
    /// interrupts, so it performs the switch itself (see
    /// [`PortTrait::suspend`]) and this is a no-op there.
    fn request_reschedule();

    /// Suspends the calling task on behalf of the kernel: does not return
    /// until some later dispatch resumes this exact task. Called with
    /// interrupts disabled; `saved_sp` is the task's own arena slot, updated
    /// in place so the next [`PortTrait::resume`] targeting it continues
    /// from here.
    ///
    /// # Safety
    ///
    /// Must only be called from `task_manager` with `saved_sp` pointing at
    /// the currently-running task's own TCB slot.
    unsafe fn suspend(saved_sp: &mut *mut u8);

    /// Dispatches a task from a `saved_sp` previously produced by
    /// [`PortTrait::setup_stack`] or updated by [`PortTrait::suspend`]. Does
    /// not return until that task suspends again.
    ///
    /// # Safety
    ///
    /// `sp` must be a handle this same port previously produced for a task
    /// that is not already running.
    unsafe fn resume(sp: *mut u8);

    #[cfg(feature = "uart")]
    fn setup_uart();
    #[cfg(feature = "uart")]
    fn get_uart2() -> Self::Uart2Type;
    #[cfg(feature = "uart")]
    fn get_io() -> Self::IoType;
}

/// RAII guard that disables interrupts on construction and restores the
/// prior state on drop. Every public kernel entry point that touches a queue
/// wraps its body in one of these instead of pairing raw disable/restore
/// calls by hand.
pub(crate) struct CriticalSection {
    was_enabled: bool,
}

impl CriticalSection {
    pub fn enter() -> Self {
        CriticalSection {
            was_enabled: Port::disable_interrupts(),
        }
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        Port::restore_interrupts(self.was_enabled);
    }
}
