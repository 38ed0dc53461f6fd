//! Static object registration.
//!
//! Zephyr represents a `static` kernel object as zero-initialized memory
//! plus an atomic tracking whether it has been handed its one-time `init()`
//! call yet (see `StaticKernelObject<T>` in the teacher crate). This module
//! generalizes that pattern from "a raw Zephyr FFI struct" to "any `T` a
//! process network needs at `'static` storage duration" — channels and
//! alternatives in the demos are declared as `static` [`StaticCell`]s and
//! initialized once, during network construction, before any process runs.
//!
//! # Initialization tracking
//!
//! A `StaticCell` starts uninitialized. [`StaticCell::init_with`] runs its
//! closure exactly once; a second call panics, the same way the teacher's
//! `init_help` panics on "Duplicate kobject initialization".

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use portable_atomic::{AtomicU8, Ordering};

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const INITIALIZED: u8 = 2;

/// A lazily-initialized, `'static`-friendly cell.
///
/// Safe to declare as a `static` because `new()` is `const` and performs no
/// initialization of `T` itself; the real value is written in
/// [`StaticCell::init_with`].
pub struct StaticCell<T> {
    value: UnsafeCell<MaybeUninit<T>>,
    state: AtomicU8,
}

// StaticCells are only used to publish channel/alt state that is itself
// Sync (guarded by its own internal mutex); the cell's job is purely to
// provide 'static storage plus one-time-init tracking.
unsafe impl<T: Sync> Sync for StaticCell<T> {}

impl<T> StaticCell<T> {
    /// Construct an empty cell. Safe: no `T` is materialized until
    /// [`init_with`](Self::init_with) runs.
    pub const fn new() -> StaticCell<T> {
        StaticCell {
            value: UnsafeCell::new(MaybeUninit::uninit()),
            state: AtomicU8::new(UNINITIALIZED),
        }
    }

    /// Run `f` to produce the value if this cell is uninitialized, and
    /// return a `'static`-lifetime-shaped reference to it. Panics if called
    /// more than once on the same cell.
    pub fn init_with(&self, f: impl FnOnce() -> T) -> &T {
        match self.state.compare_exchange(
            UNINITIALIZED,
            INITIALIZING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                let value = f();
                unsafe {
                    (*self.value.get()).write(value);
                }
                self.state.store(INITIALIZED, Ordering::Release);
                self.get()
            }
            Err(_) => panic!("StaticCell initialized twice"),
        }
    }

    /// Borrow the value. Panics if [`init_with`](Self::init_with) has not
    /// completed yet (mirrors the teacher's `CONFIG_RUST_CHECK_KOBJ_INIT`
    /// checking, which this crate always performs since the cost is a
    /// single atomic load, not worth gating behind a feature).
    pub fn get(&self) -> &T {
        if self.state.load(Ordering::Acquire) != INITIALIZED {
            panic!("StaticCell used before initialization");
        }
        unsafe { &*(self.value.get() as *const T) }
    }
}

impl<T> Default for StaticCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_get() {
        static CELL: StaticCell<u32> = StaticCell::new();
        let v = CELL.init_with(|| 42);
        assert_eq!(*v, 42);
        assert_eq!(*CELL.get(), 42);
    }

    #[test]
    #[should_panic(expected = "used before initialization")]
    fn get_before_init_panics() {
        let cell: StaticCell<u32> = StaticCell::new();
        let _ = cell.get();
    }

    #[test]
    #[should_panic(expected = "initialized twice")]
    fn double_init_panics() {
        let cell: StaticCell<u32> = StaticCell::new();
        cell.init_with(|| 1);
        cell.init_with(|| 2);
    }
}
