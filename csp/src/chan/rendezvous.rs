//! Zero-capacity synchronous channels.
//!
//! A [`RendezvousChannel`] never buffers a value: a writer and a reader
//! must both be present for a transfer to occur. A blocking call commits
//! the moment it finds a peer that is itself unconditionally completing;
//! an ALT guard never commits on its own — it only records readiness in
//! `enable`/`disable` and leaves the actual copy to `activate`, called only
//! if selection chooses it (see [`super::sync_core`] for why). This is the
//! direct generalization of the original `RendezvousChannel`/
//! `AltChanChannelSync` pair.

use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::guard::Guard;
use crate::kernel::{EventBit, Kernel};

use super::sync_core::SyncCore;

/// A zero-capacity channel of `T`. Construct one, then call
/// [`RendezvousChannel::split`] exactly once to obtain its [`Reader`] and
/// [`Writer`] halves.
pub struct RendezvousChannel<T: Copy, K: Kernel> {
    core: SyncCore<T, K>,
    taken: AtomicBool,
}

impl<T: Copy, K: Kernel> RendezvousChannel<T, K> {
    pub fn new() -> Self {
        RendezvousChannel {
            core: SyncCore::new(),
            taken: AtomicBool::new(false),
        }
    }

    /// Split into owned reader and writer endpoints borrowed from `self`.
    /// Neither endpoint is `Clone`, so at most one task ever holds each
    /// side — panics if called more than once, the same way
    /// [`crate::object::StaticCell::init_with`] panics on reinitialization.
    pub fn split(&self) -> (Reader<'_, T, K>, Writer<'_, T, K>) {
        if self.taken.swap(true, Ordering::AcqRel) {
            panic!("RendezvousChannel::split called twice");
        }
        (Reader { core: &self.core }, Writer { core: &self.core })
    }
}

impl<T: Copy, K: Kernel> Default for RendezvousChannel<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

/// The read half of a [`RendezvousChannel`]. Not `Clone`: a channel has
/// exactly one reader.
pub struct Reader<'a, T: Copy, K: Kernel> {
    core: &'a SyncCore<T, K>,
}

/// The write half of a [`RendezvousChannel`]. Not `Clone`: a channel has
/// exactly one writer.
pub struct Writer<'a, T: Copy, K: Kernel> {
    core: &'a SyncCore<T, K>,
}

impl<'a, T: Copy, K: Kernel> Reader<'a, T, K> {
    /// Block until a writer is present, and return its value.
    pub fn read(&mut self) -> T {
        let mut dst = MaybeUninit::<T>::uninit();
        let eg = K::event_group_new();
        if !self.core.reader_offer_blocking(dst.as_mut_ptr(), &eg, 0) {
            SyncCore::<T, K>::wait_resolved(&eg);
        }
        unsafe { dst.assume_init() }
    }

    /// Build an ALT guard that becomes ready when a writer is present,
    /// writing the received value into `storage` once selected.
    pub fn guard<'g>(&'g mut self, storage: &'g mut MaybeUninit<T>) -> ChanInGuard<'g, T, K> {
        ChanInGuard {
            core: self.core,
            dst: storage.as_mut_ptr(),
            ready: false,
        }
    }
}

impl<'a, T: Copy, K: Kernel> Writer<'a, T, K> {
    /// Block until a reader is present, then hand it `value`.
    pub fn write(&mut self, value: T) {
        let mut value = value;
        let eg = K::event_group_new();
        if !self.core.writer_offer_blocking(&mut value as *mut T, &eg, 0) {
            SyncCore::<T, K>::wait_resolved(&eg);
        }
    }

    /// Build an ALT guard that becomes ready when a reader is present,
    /// handing it `*value` once selected. `value` must remain valid until
    /// the owning [`crate::alt::Alternative`] completes selection.
    pub fn guard<'g>(&'g mut self, value: &'g mut T) -> ChanOutGuard<'g, T, K> {
        ChanOutGuard {
            core: self.core,
            src: value as *mut T,
            ready: false,
        }
    }
}

/// ALT guard: ready when a writer is already present on a
/// [`RendezvousChannel`]'s reader side.
pub struct ChanInGuard<'a, T: Copy, K: Kernel> {
    core: &'a SyncCore<T, K>,
    dst: *mut T,
    ready: bool,
}

impl<'a, T: Copy, K: Kernel> Guard<K> for ChanInGuard<'a, T, K> {
    fn enable(&mut self, eg: &K::EventGroup, bit: EventBit) -> bool {
        self.ready = self.core.reader_subscribe(self.dst, eg, bit);
        self.ready
    }

    fn disable(&mut self) -> bool {
        if self.ready {
            return true;
        }
        self.ready = self.core.reader_unsubscribe();
        self.ready
    }

    fn activate(&mut self) {
        self.core.reader_commit(self.dst);
    }
}

/// ALT guard: ready when a reader is already present on a
/// [`RendezvousChannel`]'s writer side.
pub struct ChanOutGuard<'a, T: Copy, K: Kernel> {
    core: &'a SyncCore<T, K>,
    src: *mut T,
    ready: bool,
}

impl<'a, T: Copy, K: Kernel> Guard<K> for ChanOutGuard<'a, T, K> {
    fn enable(&mut self, eg: &K::EventGroup, bit: EventBit) -> bool {
        self.ready = self.core.writer_subscribe(self.src, eg, bit);
        self.ready
    }

    fn disable(&mut self) -> bool {
        if self.ready {
            return true;
        }
        self.ready = self.core.writer_unsubscribe();
        self.ready
    }

    fn activate(&mut self) {
        self.core.writer_commit(self.src);
    }
}
