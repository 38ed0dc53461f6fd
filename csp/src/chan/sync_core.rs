//! Shared single-reader/single-writer rendezvous bookkeeping.
//!
//! This is the generalized form of the original C++ `AltChanChannelSync`:
//! a channel's endpoint state is just "is anyone waiting to complete a
//! transfer on this side, and if so, how do I reach them" — one slot for
//! the reader side, one for the writer side, both protected by one mutex.
//! [`RendezvousChannel`](super::rendezvous::RendezvousChannel) uses the
//! slot's data pointer directly for the zero-buffer handoff.
//! [`BufferedChannel`](super::buffered::BufferedChannel) reuses the same
//! slot type to track "a reader is blocked on empty" / "a writer is
//! blocked on full" without a data pointer (the ring buffer holds the
//! data), by instantiating `Slot<(), K>`.
//!
//! A blocking (non-ALT) call and an ALT guard's subscription both install
//! the same [`Slot`], but they are *not* interchangeable once installed:
//! a blocking call is unconditionally going to complete, so whichever
//! party discovers its slot may safely finish the transfer right away.
//! An ALT guard's slot, installed by [`Guard::enable`](crate::guard::Guard::enable)
//! when no peer is present yet, is only a tentative subscription — the
//! `Alternative` that owns the guard might not choose it this cycle. Per
//! the "Race with two arrivals" invariant, discovering such a slot must
//! never itself complete a transfer; only that guard's own
//! [`Guard::activate`](crate::guard::Guard::activate), called at most once
//! and only on the chosen guard, may consume it. [`SlotOwner`] is the tag
//! that tells a discoverer which rule applies.
//!
//! # Safety
//!
//! Slots store raw pointers (to the caller's data and to the caller's
//! event group) rather than borrowing, because their lifetime is tied to a
//! call's stack frame, not to the channel's `'static` one. This is sound
//! because every code path that installs a slot also guarantees the slot
//! is removed — either by this module when the transfer completes, or by
//! the installer itself — strictly before that stack frame returns: a
//! blocking call only returns after being woken by whoever commits the
//! transfer; an ALT guard is unconditionally `disable`d, which withdraws
//! any slot still installed, before the `Alternative` that owns it returns
//! control to its caller.

use core::cell::UnsafeCell;

use crate::kernel::{EventBit, Kernel};

/// Who installed a [`Slot`], and therefore who is allowed to consume it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotOwner {
    /// A plain, unconditionally-completing `read()`/`write()` call. Safe
    /// for any discoverer to commit against immediately.
    Blocking,
    /// An ALT guard's tentative subscription. Only that guard's own
    /// `activate` may consume it; everyone else must leave it alone.
    Guard,
}

/// One side's outstanding offer to transfer `T`: where the data lives (or a
/// dangling pointer, for buffered channels where the ring buffer already
/// holds the data), where to signal once the transfer completes, and who
/// is allowed to make that happen.
pub(crate) struct Slot<T, K: Kernel> {
    data: *mut T,
    event_group: *const K::EventGroup,
    bit: EventBit,
    owner: SlotOwner,
}

impl<T, K: Kernel> Slot<T, K> {
    pub(crate) fn new(
        data: *mut T,
        event_group: &K::EventGroup,
        bit: EventBit,
        owner: SlotOwner,
    ) -> Self {
        Slot {
            data,
            event_group: event_group as *const K::EventGroup,
            bit,
            owner,
        }
    }

    pub(crate) fn notify(&self) {
        unsafe { K::event_group_set(&*self.event_group, self.bit) };
    }
}

/// Single-reader, single-writer rendezvous state for one channel.
pub(crate) struct SyncCore<T, K: Kernel> {
    mutex: K::Mutex,
    reader: UnsafeCell<Option<Slot<T, K>>>,
    writer: UnsafeCell<Option<Slot<T, K>>>,
}

// Access to `reader`/`writer` is always performed under `mutex`; the raw
// pointers inside a `Slot` are only ever dereferenced by the single other
// endpoint under that same lock, never read from multiple tasks at once.
unsafe impl<T: Send, K: Kernel> Sync for SyncCore<T, K> {}

impl<T, K: Kernel> SyncCore<T, K> {
    pub(crate) fn new() -> Self {
        SyncCore {
            mutex: K::mutex_new(),
            reader: UnsafeCell::new(None),
            writer: UnsafeCell::new(None),
        }
    }

    /// Offer `src` for a plain blocking `write()`. If a reader offer is
    /// already present and unconditionally completing (`SlotOwner::Blocking`),
    /// copies directly into its destination and wakes it, returning `true`
    /// (transfer complete, no slot left behind). If the reader side instead
    /// holds only an ALT guard's tentative subscription (`SlotOwner::Guard`),
    /// or nothing at all, installs a writer slot and returns `false` — the
    /// caller must wait for `bit` of `eg` to be set, at which point the
    /// transfer (performed by whoever commits against this slot) is already
    /// complete.
    pub(crate) fn writer_offer_blocking(&self, src: *mut T, eg: &K::EventGroup, bit: EventBit) -> bool {
        K::mutex_lock(&self.mutex);
        let commit_now =
            matches!(unsafe { &*self.reader.get() }, Some(slot) if slot.owner == SlotOwner::Blocking);
        let done = if commit_now {
            let slot = unsafe { (*self.reader.get()).take() }.expect("checked Some above");
            unsafe { core::ptr::copy_nonoverlapping(src, slot.data, 1) };
            slot.notify();
            true
        } else {
            unsafe { *self.writer.get() = Some(Slot::new(src, eg, bit, SlotOwner::Blocking)) };
            false
        };
        K::mutex_unlock(&self.mutex);
        done
    }

    /// Offer `dst` for a plain blocking `read()`. Symmetric to
    /// [`writer_offer_blocking`](Self::writer_offer_blocking).
    pub(crate) fn reader_offer_blocking(&self, dst: *mut T, eg: &K::EventGroup, bit: EventBit) -> bool {
        K::mutex_lock(&self.mutex);
        let commit_now =
            matches!(unsafe { &*self.writer.get() }, Some(slot) if slot.owner == SlotOwner::Blocking);
        let done = if commit_now {
            let slot = unsafe { (*self.writer.get()).take() }.expect("checked Some above");
            unsafe { core::ptr::copy_nonoverlapping(slot.data, dst, 1) };
            slot.notify();
            true
        } else {
            unsafe { *self.reader.get() = Some(Slot::new(dst, eg, bit, SlotOwner::Blocking)) };
            false
        };
        K::mutex_unlock(&self.mutex);
        done
    }

    /// ALT guard subscribe, for [`Guard::enable`](crate::guard::Guard::enable):
    /// ready if a reader offer is already present — of either ownership,
    /// since this never consumes what it finds — otherwise installs this
    /// side's own `SlotOwner::Guard` offer.
    pub(crate) fn writer_subscribe(&self, src: *mut T, eg: &K::EventGroup, bit: EventBit) -> bool {
        K::mutex_lock(&self.mutex);
        let ready = unsafe { (*self.reader.get()).is_some() };
        if !ready {
            unsafe { *self.writer.get() = Some(Slot::new(src, eg, bit, SlotOwner::Guard)) };
        }
        K::mutex_unlock(&self.mutex);
        ready
    }

    /// ALT guard subscribe for the reader side. Symmetric to
    /// [`writer_subscribe`](Self::writer_subscribe).
    pub(crate) fn reader_subscribe(&self, dst: *mut T, eg: &K::EventGroup, bit: EventBit) -> bool {
        K::mutex_lock(&self.mutex);
        let ready = unsafe { (*self.writer.get()).is_some() };
        if !ready {
            unsafe { *self.reader.get() = Some(Slot::new(dst, eg, bit, SlotOwner::Guard)) };
        }
        K::mutex_unlock(&self.mutex);
        ready
    }

    /// ALT guard withdraw, for [`Guard::disable`](crate::guard::Guard::disable):
    /// unconditionally removes this side's own subscription (installed by
    /// `writer_subscribe`, if any — required by the raw-pointer safety
    /// argument in the module docs), then reports whether a reader offer is
    /// (still, or now) present. Never touches the peer's slot: only
    /// `writer_commit` does that, and only for the guard selection chooses.
    pub(crate) fn writer_unsubscribe(&self) -> bool {
        K::mutex_lock(&self.mutex);
        unsafe { (*self.writer.get()).take() };
        let ready = unsafe { (*self.reader.get()).is_some() };
        K::mutex_unlock(&self.mutex);
        ready
    }

    /// ALT guard withdraw for the reader side. Symmetric to
    /// [`writer_unsubscribe`](Self::writer_unsubscribe).
    pub(crate) fn reader_unsubscribe(&self) -> bool {
        K::mutex_lock(&self.mutex);
        unsafe { (*self.reader.get()).take() };
        let ready = unsafe { (*self.writer.get()).is_some() };
        K::mutex_unlock(&self.mutex);
        ready
    }

    /// ALT guard commit, for [`Guard::activate`](crate::guard::Guard::activate):
    /// take the reader's offer — of either ownership — copy `src` into it,
    /// and notify it. Called at most once per ALT cycle, only on the guard
    /// selection chose, at which point the reader offer this guard observed
    /// during `enable`/`disable` is guaranteed still present (nothing but
    /// this call ever consumes a reader slot).
    pub(crate) fn writer_commit(&self, src: *mut T) {
        K::mutex_lock(&self.mutex);
        let slot = unsafe { (*self.reader.get()).take() }
            .expect("writer guard activated with no reader offer present");
        unsafe { core::ptr::copy_nonoverlapping(src, slot.data, 1) };
        slot.notify();
        K::mutex_unlock(&self.mutex);
    }

    /// ALT guard commit for the reader side. Symmetric to
    /// [`writer_commit`](Self::writer_commit).
    pub(crate) fn reader_commit(&self, dst: *mut T) {
        K::mutex_lock(&self.mutex);
        let slot = unsafe { (*self.writer.get()).take() }
            .expect("reader guard activated with no writer offer present");
        unsafe { core::ptr::copy_nonoverlapping(slot.data, dst, 1) };
        slot.notify();
        K::mutex_unlock(&self.mutex);
    }

    /// Block the calling task on its own single-bit event group until the
    /// peer side resolves the offer installed via `writer_offer_blocking`/
    /// `reader_offer_blocking`. Used by the plain (non-ALT) blocking
    /// read/write paths, which never time out.
    pub(crate) fn wait_resolved(eg: &K::EventGroup) {
        K::event_group_wait_any(eg, 1, None);
    }
}
