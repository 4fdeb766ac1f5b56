//! Host/test port.
//!
//! Most operations here are plain-Rust bookkeeping backed by `std`, the same
//! way Martos's own mock port stands in for real hardware. The one place
//! this port is not trivial is context switching: [`switch`] gives every
//! task a real OS thread and hands a single baton between them, so
//! `cargo test` exercises genuine suspend/resume — a task blocked on a
//! [`crate::mutex::Mutex`] really does stop running, and `unlock` really
//! does hand the CPU to the task it wakes — rather than only updating queue
//! bookkeeping.

pub mod hardware_timer;
pub mod memory_manager;
pub mod switch;
#[cfg(feature = "uart")]
pub mod uart;

use crate::ports::PortTrait;
use crate::task_manager::task::{TaskFn, TaskId};
use core::sync::atomic::{AtomicBool, Ordering};

/// Tracks the simulated interrupt-enable flag for the host port. Real
/// targets read this out of the status register; here it is just a static
/// so `disable_interrupts`/`restore_interrupts` nesting is still observable
/// by tests.
static INTERRUPTS_ENABLED: AtomicBool = AtomicBool::new(true);

/// `PortTrait` implementation for the host/test platform.
pub struct Mok;

/// The host port has no interrupt frame to copy registers through; a real
/// context switch here is the thread baton in [`switch`], not a saved
/// register image.
pub type TrapFrame = ();

impl PortTrait for Mok {
    type TrapFrame = TrapFrame;

    #[cfg(feature = "uart")]
    type Uart2Type = uart::MockUart2;
    #[cfg(feature = "uart")]
    type IoType = uart::MockIo;

    fn init_heap() {
        memory_manager::init_heap();
    }

    fn setup_hardware_timer() {
        hardware_timer::setup_hardware_timer();
    }

    fn get_tick_counter() -> crate::timer::TickType {
        hardware_timer::get_tick_counter()
    }

    fn setup_interrupt() {}

    fn setup_stack(id: TaskId, _stack: &mut [u8], entry: TaskFn, arg: *mut u8) -> *mut u8 {
        switch::setup_stack(id, entry, arg)
    }

    fn save_ctx(_saved: &mut TrapFrame, _isr_ctx: &TrapFrame) {}

    fn load_ctx(_saved: &TrapFrame, _isr_ctx: &mut TrapFrame) {}

    fn disable_interrupts() -> bool {
        INTERRUPTS_ENABLED.swap(false, Ordering::SeqCst)
    }

    fn restore_interrupts(was_enabled: bool) {
        INTERRUPTS_ENABLED.store(was_enabled, Ordering::SeqCst);
    }

    /// The host has no real timer interrupt to reload; genuine suspension
    /// happens synchronously inside [`PortTrait::suspend`] instead.
    fn request_reschedule() {}

    unsafe fn suspend(saved_sp: &mut *mut u8) {
        unsafe { switch::suspend(saved_sp) }
    }

    unsafe fn resume(sp: *mut u8) {
        unsafe { switch::resume(sp) }
    }

    #[cfg(feature = "uart")]
    fn setup_uart() {
        uart::setup_uart();
    }

    #[cfg(feature = "uart")]
    fn get_uart2() -> Self::Uart2Type {
        uart::get_uart2()
    }

    #[cfg(feature = "uart")]
    fn get_io() -> Self::IoType {
        uart::get_io()
    }
}
