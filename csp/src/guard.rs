//! The guard protocol used by [`crate::alt::Alternative`].
//!
//! A guard is anything ALT can wait on: a channel ready to be read from
//! (`ChanInGuard`/`BufInGuard`), a channel ready to be written to
//! (`ChanOutGuard`/`BufOutGuard`), or a bare timeout
//! ([`crate::alt::TimeoutGuard`]). Selection runs every guard through the
//! same three-phase protocol, mirroring `Guard::enable`/`disable`/`schedule`
//! in the C++ original this crate is derived from:
//!
//! 1. **enable** — try to become ready without blocking; if not ready yet,
//!    subscribe for notification on a bit of the caller's event group.
//! 2. **wait** (performed by the `Alternative`, not the guard) — block on
//!    the event group until some subscribed bit fires.
//! 3. **disable** — withdraw the subscription unconditionally, for every
//!    guard, including the one that fired. This is what lets a guard that
//!    raced to readiness after another guard already won hand that
//!    readiness back cleanly instead of leaking a subscription.
//!
//! The guard chosen by the `Alternative` then has
//! [`Guard::activate`] called on it to actually perform the transfer.

use crate::kernel::{EventBit, Kernel};

/// A waitable condition inside an [`crate::alt::Alternative`].
///
/// Implemented by the per-channel-endpoint guard types in [`crate::chan`]
/// and by [`crate::alt::TimeoutGuard`]. Not implemented by application code
/// directly — a `Reader`/`Writer` endpoint constructs the right guard type
/// for you.
pub trait Guard<K: Kernel> {
    /// Try to become ready immediately. If not ready, subscribe to be
    /// notified by setting `bit` in `eg` once this guard's condition is met.
    ///
    /// Returns `true` if the guard is ready right now. [`crate::alt::pri_select`]
    /// stops enabling further guards the moment one reports ready here, so
    /// `enable` must not have already-visible side effects beyond the
    /// subscription itself — the actual data transfer happens later, in
    /// [`Guard::activate`].
    fn enable(&mut self, eg: &K::EventGroup, bit: EventBit) -> bool;

    /// Withdraw this guard's subscription, called unconditionally on every
    /// guard after the wait phase ends, in reverse order of `enable`.
    ///
    /// Returns whether the guard's condition is (still, or now) satisfied.
    /// A guard not chosen by selection may still report `true` here if its
    /// peer arrived during the wait — that readiness is simply left for the
    /// guard's next `enable` to pick back up.
    fn disable(&mut self) -> bool;

    /// Commit: perform this guard's actual effect (the rendezvous copy, the
    /// buffer push/pop, or nothing at all for a timeout). Called exactly
    /// once, only on the guard selection chose.
    fn activate(&mut self);
}

/// A record of an ALT subscription left on a channel's shared state: which
/// event group and bit to signal when the channel becomes ready for the
/// subscribing guard.
///
/// Channels hold at most one `AltSubscriber` per direction — `T: Clone`
/// endpoints are not supported (see [`crate::chan`]), so there is never
/// more than one ALT-er to notify on either side of a channel.
#[derive(Clone, Copy)]
pub struct AltSubscriber<'a, K: Kernel> {
    pub event_group: &'a K::EventGroup,
    pub bit: EventBit,
}

impl<'a, K: Kernel> AltSubscriber<'a, K> {
    pub fn new(event_group: &'a K::EventGroup, bit: EventBit) -> Self {
        AltSubscriber { event_group, bit }
    }

    /// Signal this subscriber that its condition has been met.
    pub fn notify(&self) {
        K::event_group_set(self.event_group, self.bit);
    }
}
