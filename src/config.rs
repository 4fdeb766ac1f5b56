//! Compile-time kernel budgets.
//!
//! These live as plain `const` items so a port can be tuned without touching
//! kernel logic, the same way Martos gated behaviour through `cfg_if` rather
//! than runtime configuration structs.

/// Maximum number of tasks the static TCB arena can hold.
pub const MAX_TASKS: usize = 16;

/// Bytes reserved per task stack slab. 256 is the floor the distilled source
/// recommends for an 8-bit target; ports with more RAM may raise it.
pub const STACK_SLAB_SIZE: usize = 256;

/// Milliseconds per tick. The hardware timer is programmed to this cadence.
pub const MS_PER_TICK: u32 = 2;

/// Converts a millisecond duration into a tick count, rounding up so that
/// `task_sleep` never wakes a task early.
pub const fn ms_to_ticks(ms: u32) -> u32 {
    (ms + MS_PER_TICK - 1) / MS_PER_TICK
}
