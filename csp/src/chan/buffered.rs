//! Bounded-capacity asynchronous channels.
//!
//! Unlike [`super::rendezvous::RendezvousChannel`], a [`BufferedChannel`]
//! decouples reader and writer timing: a writer only blocks when the ring
//! buffer is full, a reader only blocks when it is empty. It reuses the
//! same [`Slot`]-and-event-group notification idiom as the rendezvous core,
//! but the slot carries no data pointer — the ring buffer itself holds the
//! values, so a slot here only needs to say "wake me when there's room" or
//! "wake me when there's data".
//!
//! Each side has exactly one reader and one writer, so (unlike the
//! rendezvous core) there is no cross-party race to guard against here:
//! only this channel's own reader can ever drain `len`, and only its own
//! writer can ever grow it. An ALT guard's `enable`/`disable` can therefore
//! safely peek `len` to decide readiness — that observation cannot be
//! invalidated by anything except this same guard's later `activate`, so
//! the actual push/pop is deferred there without risk of it racing out
//! from under the guard.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CspError, Result};
use crate::guard::Guard;
use crate::kernel::{EventBit, Kernel};

use super::sync_core::{Slot, SlotOwner};

/// A capacity-`N` FIFO channel of `T`. `N` must be at least 1; use
/// [`RendezvousChannel`](super::rendezvous::RendezvousChannel) for a
/// zero-capacity channel instead of asking for `N = 0` here.
pub struct BufferedChannel<T: Copy, K: Kernel, const N: usize> {
    mutex: K::Mutex,
    buf: UnsafeCell<[MaybeUninit<T>; N]>,
    head: UnsafeCell<usize>,
    len: UnsafeCell<usize>,
    reader_wait: UnsafeCell<Option<Slot<(), K>>>,
    writer_wait: UnsafeCell<Option<Slot<(), K>>>,
    taken: AtomicBool,
}

unsafe impl<T: Send + Copy, K: Kernel, const N: usize> Sync for BufferedChannel<T, K, N> {}

impl<T: Copy, K: Kernel, const N: usize> BufferedChannel<T, K, N> {
    /// Construct a new empty channel. Debug-asserts `N >= 1`: a
    /// zero-capacity `BufferedChannel` would have to rendezvous exactly
    /// like [`super::rendezvous::RendezvousChannel`] but without that
    /// type's single-slot-per-side simplicity, so it is rejected here
    /// rather than given degenerate buffered semantics.
    pub fn new() -> Self {
        debug_assert!(N >= 1, "BufferedChannel requires capacity N >= 1");
        BufferedChannel {
            mutex: K::mutex_new(),
            buf: UnsafeCell::new([MaybeUninit::uninit(); N]),
            head: UnsafeCell::new(0),
            len: UnsafeCell::new(0),
            reader_wait: UnsafeCell::new(None),
            writer_wait: UnsafeCell::new(None),
            taken: AtomicBool::new(false),
        }
    }

    /// Fallible constructor, for callers that build capacity from a
    /// runtime value rather than a compile-time const generic.
    pub fn try_new() -> Result<Self> {
        if N == 0 {
            return Err(CspError::ZeroCapacity);
        }
        Ok(Self::new())
    }

    pub fn split(&self) -> (BufReader<'_, T, K, N>, BufWriter<'_, T, K, N>) {
        if self.taken.swap(true, Ordering::AcqRel) {
            panic!("BufferedChannel::split called twice");
        }
        (BufReader { chan: self }, BufWriter { chan: self })
    }

    fn lock(&self) {
        K::mutex_lock(&self.mutex);
    }

    fn unlock(&self) {
        K::mutex_unlock(&self.mutex);
    }

    /// Push while holding the lock; caller guarantees `len < N`.
    unsafe fn push_locked(&self, value: T) {
        let head = unsafe { *self.head.get() };
        let len = unsafe { *self.len.get() };
        let idx = (head + len) % N;
        unsafe { (*self.buf.get())[idx].write(value) };
        unsafe { *self.len.get() += 1 };
    }

    /// Pop while holding the lock; caller guarantees `len > 0`.
    unsafe fn pop_locked(&self) -> T {
        let head = unsafe { *self.head.get() };
        let value = unsafe { (*self.buf.get())[head].assume_init() };
        unsafe { *self.head.get() = (head + 1) % N };
        unsafe { *self.len.get() -= 1 };
        value
    }

    /// Attempt to push `value`. On success, wakes a waiting reader if any.
    /// On failure (full), installs a writer-wait slot. Returns whether the
    /// push happened. Used only by the plain blocking `write()` retry loop.
    fn try_push(&self, value: T, eg: &K::EventGroup, bit: EventBit) -> bool {
        self.lock();
        let pushed = if unsafe { *self.len.get() } < N {
            unsafe { self.push_locked(value) };
            if let Some(slot) = unsafe { (*self.reader_wait.get()).take() } {
                slot.notify();
            }
            true
        } else {
            unsafe {
                *self.writer_wait.get() =
                    Some(Slot::new(core::ptr::null_mut(), eg, bit, SlotOwner::Blocking))
            };
            false
        };
        self.unlock();
        pushed
    }

    /// ALT-subscribe for a writer guard (`enable`): ready if there is room,
    /// without pushing; otherwise installs a writer-wait slot so a reader's
    /// later pop can wake it.
    fn writer_subscribe(&self, eg: &K::EventGroup, bit: EventBit) -> bool {
        self.lock();
        let ready = unsafe { *self.len.get() } < N;
        if !ready {
            unsafe {
                *self.writer_wait.get() =
                    Some(Slot::new(core::ptr::null_mut(), eg, bit, SlotOwner::Guard))
            };
        }
        self.unlock();
        ready
    }

    /// ALT-unsubscribe for a writer guard (`disable`): unconditionally
    /// clears any writer-wait slot installed by `writer_subscribe`, then
    /// re-checks for room. Never pushes — see `writer_commit`.
    fn writer_unsubscribe(&self) -> bool {
        self.lock();
        unsafe { (*self.writer_wait.get()).take() };
        let ready = unsafe { *self.len.get() } < N;
        self.unlock();
        ready
    }

    /// ALT-commit for a writer guard (`activate`, called at most once per
    /// cycle and only on the guard selection chose): push `value` for real
    /// and wake a waiting reader.
    fn writer_commit(&self, value: T) {
        self.lock();
        debug_assert!(
            unsafe { *self.len.get() } < N,
            "writer guard activated with buffer full"
        );
        unsafe { self.push_locked(value) };
        if let Some(slot) = unsafe { (*self.reader_wait.get()).take() } {
            slot.notify();
        }
        self.unlock();
    }

    /// Attempt to pop a value. On success, wakes a waiting writer if any.
    /// Returns `Some(value)` if the pop happened. Used only by the plain
    /// blocking `read()` retry loop.
    fn try_pop(&self, eg: &K::EventGroup, bit: EventBit) -> Option<T> {
        self.lock();
        let result = if unsafe { *self.len.get() } > 0 {
            let value = unsafe { self.pop_locked() };
            if let Some(slot) = unsafe { (*self.writer_wait.get()).take() } {
                slot.notify();
            }
            Some(value)
        } else {
            unsafe {
                *self.reader_wait.get() =
                    Some(Slot::new(core::ptr::null_mut(), eg, bit, SlotOwner::Blocking))
            };
            None
        };
        self.unlock();
        result
    }

    /// ALT-subscribe for a reader guard (`enable`). Symmetric to
    /// `writer_subscribe`.
    fn reader_subscribe(&self, eg: &K::EventGroup, bit: EventBit) -> bool {
        self.lock();
        let ready = unsafe { *self.len.get() } > 0;
        if !ready {
            unsafe {
                *self.reader_wait.get() =
                    Some(Slot::new(core::ptr::null_mut(), eg, bit, SlotOwner::Guard))
            };
        }
        self.unlock();
        ready
    }

    /// ALT-unsubscribe for a reader guard (`disable`). Symmetric to
    /// `writer_unsubscribe`.
    fn reader_unsubscribe(&self) -> bool {
        self.lock();
        unsafe { (*self.reader_wait.get()).take() };
        let ready = unsafe { *self.len.get() } > 0;
        self.unlock();
        ready
    }

    /// ALT-commit for a reader guard (`activate`). Symmetric to
    /// `writer_commit`.
    fn reader_commit(&self) -> T {
        self.lock();
        debug_assert!(
            unsafe { *self.len.get() } > 0,
            "reader guard activated with buffer empty"
        );
        let value = unsafe { self.pop_locked() };
        if let Some(slot) = unsafe { (*self.writer_wait.get()).take() } {
            slot.notify();
        }
        self.unlock();
        value
    }
}

impl<T: Copy, K: Kernel, const N: usize> Default for BufferedChannel<T, K, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The read half of a [`BufferedChannel`].
pub struct BufReader<'a, T: Copy, K: Kernel, const N: usize> {
    chan: &'a BufferedChannel<T, K, N>,
}

/// The write half of a [`BufferedChannel`].
pub struct BufWriter<'a, T: Copy, K: Kernel, const N: usize> {
    chan: &'a BufferedChannel<T, K, N>,
}

impl<'a, T: Copy, K: Kernel, const N: usize> BufReader<'a, T, K, N> {
    /// Block until the buffer is non-empty, then pop a value.
    pub fn read(&mut self) -> T {
        let eg = K::event_group_new();
        loop {
            if let Some(value) = self.chan.try_pop(&eg, 0) {
                return value;
            }
            K::event_group_wait_any(&eg, 1, None);
        }
    }

    /// Build an ALT guard that becomes ready when the buffer is non-empty.
    pub fn guard<'g>(&'g mut self, storage: &'g mut MaybeUninit<T>) -> BufInGuard<'g, T, K, N> {
        BufInGuard {
            chan: self.chan,
            storage,
            ready: false,
        }
    }
}

impl<'a, T: Copy, K: Kernel, const N: usize> BufWriter<'a, T, K, N> {
    /// Block until the buffer is non-full, then push `value`.
    pub fn write(&mut self, value: T) {
        let eg = K::event_group_new();
        loop {
            if self.chan.try_push(value, &eg, 0) {
                return;
            }
            K::event_group_wait_any(&eg, 1, None);
        }
    }

    /// Build an ALT guard that becomes ready when the buffer is non-full.
    pub fn guard(&mut self, value: T) -> BufOutGuard<'_, T, K, N> {
        BufOutGuard {
            chan: self.chan,
            value,
            ready: false,
        }
    }
}

/// ALT guard: ready when a [`BufferedChannel`] is non-empty.
pub struct BufInGuard<'a, T: Copy, K: Kernel, const N: usize> {
    chan: &'a BufferedChannel<T, K, N>,
    storage: &'a mut MaybeUninit<T>,
    ready: bool,
}

impl<'a, T: Copy, K: Kernel, const N: usize> Guard<K> for BufInGuard<'a, T, K, N> {
    fn enable(&mut self, eg: &K::EventGroup, bit: EventBit) -> bool {
        self.ready = self.chan.reader_subscribe(eg, bit);
        self.ready
    }

    fn disable(&mut self) -> bool {
        if self.ready {
            return true;
        }
        self.ready = self.chan.reader_unsubscribe();
        self.ready
    }

    fn activate(&mut self) {
        self.storage.write(self.chan.reader_commit());
    }
}

/// ALT guard: ready when a [`BufferedChannel`] is non-full.
pub struct BufOutGuard<'a, T: Copy, K: Kernel, const N: usize> {
    chan: &'a BufferedChannel<T, K, N>,
    value: T,
    ready: bool,
}

impl<'a, T: Copy, K: Kernel, const N: usize> Guard<K> for BufOutGuard<'a, T, K, N> {
    fn enable(&mut self, eg: &K::EventGroup, bit: EventBit) -> bool {
        self.ready = self.chan.writer_subscribe(eg, bit);
        self.ready
    }

    fn disable(&mut self) -> bool {
        if self.ready {
            return true;
        }
        self.ready = self.chan.writer_unsubscribe();
        self.ready
    }

    fn activate(&mut self) {
        self.chan.writer_commit(self.value);
    }
}
