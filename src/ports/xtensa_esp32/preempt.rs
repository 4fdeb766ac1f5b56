//! Esp32/Xtensa context-switch primitives.
//!
//! This is the one genuinely target-specific piece of the kernel: the rest
//! of the scheduler only ever calls through [`crate::ports::PortTrait`].
//! `esp_hal::trapframe::TrapFrame` already holds the full register file the
//! CPU pushes on interrupt entry, so `save_ctx`/`load_ctx` are a plain copy
//! rather than hand-written push/pop sequences — `esp-hal`'s trap handler
//! did the pushing for us.

use crate::ports::xtensa_esp32::hardware_timer::{self, TIMER00};
use crate::task_manager::task::TaskFn;
use esp_hal::interrupt::{self, InterruptHandler, Priority};
use esp_hal::peripherals::Interrupt;
use esp_hal::prelude::*;
use esp_hal::trapframe::TrapFrame;

/// `PS` bit controlling whether interrupts above `PS.INTLEVEL` are masked.
/// A freshly built task must start with interrupts unmasked, the same way
/// the distilled source's `taskInitializeInternal` starts every new task
/// with its saved status register's interrupt-enable bit set.
const PS_INTLEVEL_ENABLED: u32 = 0;

pub fn setup_interrupt() {
    unsafe {
        if let Some(timer00) = TIMER00.as_mut() {
            timer00.set_interrupt_handler(InterruptHandler::new(tick_handler, Priority::Priority1));
            timer00.enable_interrupt(true);
        }
    }
    interrupt::enable(Interrupt::TG0_T0_LEVEL, Priority::Priority1).ok();
    // The timer was only loaded and armed with auto-reload by
    // `setup_hardware_timer`; it never actually starts counting, and its
    // interrupt never actually fires, until `start()`/`listen()` are called.
    hardware_timer::start_hardware_timer();
}

extern "C" fn tick_handler(ctx: &mut TrapFrame) {
    unsafe {
        if let Some(timer00) = TIMER00.as_mut() {
            timer00.clear_interrupt();
        }
    }
    crate::task_manager::tick_from_isr(ctx);
}

/// Lays out `stack` so that a later `load_ctx` dispatches into `entry(arg)`
/// with interrupts enabled, mirroring the distilled source's
/// `taskInitializeInternal` — which plants the entry address as a fake
/// return address, zeroes the general registers, marks the saved status
/// register interrupt-enabled, and puts `data` where the calling convention
/// expects the first argument.
///
/// The task's `TrapFrame` itself is carved out of the top of its own stack
/// slab (the same slab `A1` is pointed below), so the returned `saved_sp` —
/// later handed back unchanged to `save_ctx`/`load_ctx` — is simply a
/// pointer at that frame.
pub fn setup_stack(stack: &mut [u8], entry: TaskFn, arg: *mut u8) -> *mut u8 {
    let frame_size = core::mem::size_of::<TrapFrame>();
    let frame_align = core::mem::align_of::<TrapFrame>();
    assert!(
        stack.len() > frame_size + frame_align,
        "task stack slab too small to hold a TrapFrame"
    );

    let base = stack.as_mut_ptr() as usize;
    let frame_addr = (base + stack.len() - frame_size) & !(frame_align - 1);
    let frame_ptr = frame_addr as *mut TrapFrame;

    unsafe {
        frame_ptr.write(TrapFrame::default());
        let frame = &mut *frame_ptr;
        frame.PC = entry as usize as u32;
        frame.A0 = 0; // fake return address; a task entry is never expected to return
        frame.A1 = frame_addr as u32; // stack pointer, below the frame we just carved out
        frame.A2 = arg as u32; // first argument register, per the call0 ABI
        frame.PS = PS_INTLEVEL_ENABLED;
    }

    frame_ptr as *mut u8
}

pub fn save_ctx(saved: &mut TrapFrame, isr_ctx: &TrapFrame) {
    *saved = *isr_ctx;
}

pub fn load_ctx(saved: &TrapFrame, isr_ctx: &mut TrapFrame) {
    *isr_ctx = *saved;
}

/// Forces the tick timer to fire on its next tick boundary instead of
/// waiting out the full period, so a voluntary `task_yield`/`task_sleep`
/// reschedules promptly through the same ISR path as an involuntary tick.
pub fn request_reschedule() {
    unsafe {
        if let Some(timer00) = TIMER00.as_mut() {
            timer00.load_value(1u64 * 1u64.micros()).ok();
        }
    }
}

/// Voluntary suspend on real hardware goes through the exact same path as
/// an involuntary one: [`request_reschedule`] makes the tick fire almost
/// immediately, and [`tick_handler`] does the actual context swap by
/// overwriting the live register file with the next task's saved one. This
/// function's caller runs a handful more instructions before that swap
/// lands — harmless, since they are only the return path back out through
/// `task_yield`/`block_current_on`'s enclosing critical section, which does
/// not touch anything the wakeup depends on — and does not resume until
/// `tick_handler` schedules this exact task again.
///
/// `saved_sp` is unused here: on this port a task's context lives in the
/// `TrapFrame` `setup_stack` carved out of its own stack slab, copied to and
/// from the ISR's live frame by `save_ctx`/`load_ctx`, not in the opaque
/// pointer itself.
pub fn suspend(saved_sp: &mut *mut u8) {
    let _ = saved_sp;
    request_reschedule();
}

/// Never called: on real hardware, dispatch happens exclusively inside
/// [`tick_handler`] via `save_ctx`/`load_ctx` on the interrupted register
/// file, not by an explicit jump to a `sp` handle.
pub fn resume(sp: *mut u8) -> ! {
    let _ = sp;
    unreachable!("xtensa_esp32 dispatches only through its tick interrupt handler")
}
