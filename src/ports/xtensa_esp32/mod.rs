pub mod hardware_timer;
pub mod memory_manager;
mod preempt;
#[cfg(feature = "uart")]
pub mod uart;

use crate::ports::PortTrait;
use crate::task_manager::task::{TaskFn, TaskId};

pub type TrapFrame = esp_hal::trapframe::TrapFrame;

/// `PortTrait` implementation for the ESP32/Xtensa target.
pub struct XtensaEsp32;

impl PortTrait for XtensaEsp32 {
    type TrapFrame = TrapFrame;

    #[cfg(feature = "uart")]
    type Uart2Type = uart::Uart2Type;
    #[cfg(feature = "uart")]
    type IoType = uart::IoType;

    fn init_heap() {
        memory_manager::init_heap();
    }

    fn setup_hardware_timer() {
        hardware_timer::setup_hardware_timer();
    }

    fn get_tick_counter() -> crate::timer::TickType {
        hardware_timer::get_tick_counter()
    }

    fn setup_interrupt() {
        preempt::setup_interrupt();
    }

    fn setup_stack(_id: TaskId, stack: &mut [u8], entry: TaskFn, arg: *mut u8) -> *mut u8 {
        preempt::setup_stack(stack, entry, arg)
    }

    fn save_ctx(saved: &mut TrapFrame, isr_ctx: &TrapFrame) {
        preempt::save_ctx(saved, isr_ctx)
    }

    fn load_ctx(saved: &TrapFrame, isr_ctx: &mut TrapFrame) {
        preempt::load_ctx(saved, isr_ctx)
    }

    fn disable_interrupts() -> bool {
        let prev = esp_hal::xtensa_lx::interrupt::disable();
        prev != 0
    }

    fn restore_interrupts(was_enabled: bool) {
        if was_enabled {
            unsafe {
                esp_hal::xtensa_lx::interrupt::enable_mask(
                    esp_hal::xtensa_lx::interrupt::get_mask(),
                );
            }
        }
    }

    fn request_reschedule() {
        preempt::request_reschedule();
    }

    unsafe fn suspend(saved_sp: &mut *mut u8) {
        preempt::suspend(saved_sp)
    }

    unsafe fn resume(sp: *mut u8) {
        preempt::resume(sp)
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
