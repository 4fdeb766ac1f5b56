use core::mem::MaybeUninit;

/// Initializes the heap backing the crate's `#[global_allocator]` (declared
/// once in `lib.rs`, not here — a single binary may only register one).
pub fn init_heap() {
    const HEAP_SIZE: usize = 32 * 1024;
    static mut HEAP: MaybeUninit<[u8; HEAP_SIZE]> = MaybeUninit::uninit();

    unsafe {
        crate::ALLOCATOR.init(HEAP.as_mut_ptr() as *mut u8, HEAP_SIZE);
    }
}
