//! `extern "C"` surface, mirroring Martos's own C bindings: task lifecycle
//! and the raw tick counter. The mutex and the `sync` primitives stay
//! Rust-only for now, the same as in the distilled source's own C API.

use crate::task_manager;
use crate::task_manager::task::TaskFn;
use crate::timer::{TickType, Timer};

#[no_mangle]
pub extern "C" fn task_init() {
    task_manager::task_init();
}

/// Returns `true` on success, `false` if the task arena is full. `entry` is
/// run with `arg` delivered unchanged on its first dispatch, matching the
/// distilled source's `taskCreate(TaskFunction fn, void *data)` exactly.
#[no_mangle]
pub extern "C" fn task_create(entry: TaskFn, arg: *mut u8) -> bool {
    task_manager::task_create(entry, arg).is_ok()
}

#[no_mangle]
pub extern "C" fn task_start() -> ! {
    task_manager::task_start()
}

#[no_mangle]
pub extern "C" fn task_yield() {
    task_manager::task_yield();
}

#[no_mangle]
pub extern "C" fn task_sleep(ms: u32) {
    task_manager::task_sleep(ms);
}

#[no_mangle]
pub extern "C" fn task_suspend() {
    task_manager::task_suspend();
}

#[no_mangle]
pub extern "C" fn get_tick_counter() -> TickType {
    Timer::get_tick_counter()
}
