//! Host/test heap setup.
//!
//! The host port runs under `std`, so there is no custom global allocator to
//! arm here; this exists only so `Mok::init_heap` has something to call,
//! mirroring the real ports' `init_heap` entry point.

pub fn init_heap() {}
