use crate::config::MS_PER_TICK;
use crate::timer::TickType;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use esp_hal::peripherals::*;
use esp_hal::prelude::*;
use esp_hal::timer::timg::{Timer, Timer0, TimerGroup};

pub static mut TIMER00: Option<Timer<Timer0<TIMG0>, esp_hal::Blocking>> = None;

static TIMER_BUSY: AtomicBool = AtomicBool::new(false);

/// Esp32 hardware timer setup. Arms `TIMG0`'s timer 0 in auto-reload mode at
/// `MS_PER_TICK` cadence — the CTC-mode equivalent on this target. Does not
/// start the timer counting or wire its interrupt vector; that is
/// [`super::preempt::setup_interrupt`]'s job, called later from
/// [`crate::task_manager::task_start`].
pub fn setup_hardware_timer() {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timer_group0 = TimerGroup::new(peripherals.TIMG0);
    let mut timer00 = timer_group0.timer0;

    timer00.load_value((MS_PER_TICK as u64).millis()).ok();
    timer00.enable_auto_reload(true);

    unsafe {
        TIMER00 = Some(timer00);
    }
}

/// Esp32 attempt to acquire the tick timer. Guards against double-arming.
pub fn try_acquire_timer() -> bool {
    TIMER_BUSY
        .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
        .is_ok()
}

/// Esp32 start hardware timer.
pub fn start_hardware_timer() {
    unsafe {
        if let Some(timer00) = TIMER00.as_mut() {
            timer00.start();
            timer00.listen();
        }
    }
}

/// Esp32 change the period of the tick timer.
pub fn change_period_timer(period: Duration) {
    unsafe {
        if let Some(timer00) = TIMER00.as_mut() {
            timer00.load_value(period.as_micros() as u64 * 1u64.micros()).ok();
        }
    }
}

/// Esp32 getting wall-clock value of hardware timer.
pub fn get_time() -> Duration {
    unsafe {
        match TIMER00.as_ref() {
            Some(timer00) => Duration::from_micros(timer00.now().ticks()),
            None => Duration::new(0, 0),
        }
    }
}

/// Esp32 raw tick count, read straight off the timer's free-running
/// counter rather than the kernel's own logical `tick_counter`.
pub fn get_tick_counter() -> TickType {
    unsafe {
        match TIMER00.as_ref() {
            Some(timer00) => timer00.now().ticks() as TickType,
            None => 0,
        }
    }
}

/// Esp32 release hardware timer.
pub fn release_hardware_timer() {
    TIMER_BUSY.store(false, Ordering::Release);
}
