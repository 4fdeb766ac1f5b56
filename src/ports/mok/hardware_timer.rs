use crate::timer::TickType;
use core::sync::atomic::{AtomicI64, Ordering};
use core::time::Duration;

static TICKS: AtomicI64 = AtomicI64::new(0);

/// Mok hardware timer setup.
pub fn setup_hardware_timer() {
    TICKS.store(0, Ordering::SeqCst);
}

/// Mok start hardware timer.
pub fn start_hardware_timer() {}

/// Mok change operating mode of hardware timer.
pub fn set_reload_mode(_auto_reload: bool) {}

/// Mok change the period of hardware timer.
pub fn change_period_timer(_period: Duration) {}

/// Mok getting counter value of hardware timer.
pub fn get_time() -> Duration {
    Duration::new(0, 0)
}

/// Mok raw hardware tick count. Advanced manually by tests that drive the
/// tick ISR path without a real timer interrupt.
pub fn get_tick_counter() -> TickType {
    TICKS.load(Ordering::SeqCst)
}

/// Advances the mok hardware timer by one tick. Exposed for tests that
/// simulate the ISR firing.
pub fn advance_tick() -> TickType {
    TICKS.fetch_add(1, Ordering::SeqCst) + 1
}

/// Mok release hardware timer.
pub fn release_hardware_timer() {}
