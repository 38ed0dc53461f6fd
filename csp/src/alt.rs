//! Guarded alternation (ALT): waiting on several [`Guard`]s at once and
//! proceeding with exactly one.
//!
//! [`Alternative`] runs the same three-phase protocol as the original
//! `Alternative`/`AltChanChannelSync` pair it is derived from — clear the
//! shared event group, enable each guard in turn (stopping the moment one
//! reports ready), wait if none did, then unconditionally disable every
//! guard that was enabled this round and commit to exactly one of the
//! ones that came back ready.
//!
//! [`Alternative::pri_select`] always prefers the lowest-indexed ready
//! guard; [`Alternative::fair_select`] remembers a rotor and starts looking
//! from the guard after whichever one it chose last time, so no guard can
//! starve the others under sustained simultaneous readiness.

use crate::error::{CspError, Result};
use crate::guard::Guard;
use crate::kernel::{EventBit, Kernel};
use crate::time::{Time, Tick};

/// An `Alternative` supports at most this many simultaneous guards — each
/// occupies one bit of a `u32` event-group mask.
pub const MAX_GUARDS: usize = 16;

/// A set of guards to select among. Built once per `Alternative` value and
/// typically kept resident across many `pri_select`/`fair_select` calls in
/// a process's main loop, the way a CSP process re-ALTs the same guard set
/// every iteration.
pub struct Alternative<'a, K: Kernel> {
    guards: &'a mut [&'a mut dyn Guard<K>],
    event_group: K::EventGroup,
    rotor: usize,
}

impl<'a, K: Kernel> Alternative<'a, K> {
    /// Build an `Alternative` over `guards`. Fails if more than
    /// [`MAX_GUARDS`] were given; a caller assembling zero guards is a
    /// construction mistake, not a recoverable condition, so that case is
    /// only checked in debug builds.
    pub fn new(guards: &'a mut [&'a mut dyn Guard<K>]) -> Result<Self> {
        debug_assert!(!guards.is_empty(), "Alternative built with no guards");
        if guards.len() > MAX_GUARDS {
            return Err(CspError::TooManyGuards);
        }
        Ok(Alternative {
            guards,
            event_group: K::event_group_new(),
            rotor: 0,
        })
    }

    /// Select strictly by priority: the lowest-indexed ready guard always
    /// wins.
    pub fn pri_select(&mut self) -> usize {
        self.select(0, false)
    }

    /// Select fairly: starts looking from the guard after whichever one
    /// was chosen last time, wrapping around.
    pub fn fair_select(&mut self) -> usize {
        let start = self.rotor;
        let chosen = self.select(start, true);
        self.rotor = (chosen + 1) % self.guards.len();
        chosen
    }

    /// Like `pri_select`, but gives up and returns `None` once `timeout`
    /// has elapsed with no guard ready. A [`super::alt::TimeoutGuard`]
    /// appended to `guards` achieves the same effect while still
    /// participating in fair rotation; this is the simpler form for a
    /// one-off bounded wait.
    pub fn pri_select_timeout(&mut self, timeout: Time) -> Option<usize> {
        self.select_timeout(0, timeout)
    }

    fn select(&mut self, start_offset: usize, fair: bool) -> usize {
        let n = self.guards.len();
        let all_bits = mask(n);
        K::event_group_clear(&self.event_group, all_bits);

        let mut enabled = 0usize; // how many guards (in rotated order) were enabled
        let mut ready_mask: u32 = 0;

        for i in 0..n {
            let idx = (start_offset + i) % n;
            let bit = idx as EventBit;
            enabled = i + 1;
            if self.guards[idx].enable(&self.event_group, bit) {
                ready_mask |= 1 << bit;
                break;
            }
        }

        if ready_mask == 0 {
            let wait_mask = (0..enabled).fold(0u32, |m, i| m | (1 << ((start_offset + i) % n)));
            K::event_group_wait_any(&self.event_group, wait_mask, None);
        }

        for i in 0..enabled {
            let idx = (start_offset + i) % n;
            if self.guards[idx].disable() {
                ready_mask |= 1 << (idx as EventBit);
            }
        }

        let chosen = if fair {
            (0..n)
                .map(|i| (start_offset + i) % n)
                .find(|idx| ready_mask & (1 << (*idx as EventBit)) != 0)
                .expect("fair_select: no guard reported ready after disable phase")
        } else {
            (0..n)
                .find(|idx| ready_mask & (1 << (*idx as EventBit)) != 0)
                .expect("pri_select: no guard reported ready after disable phase")
        };

        self.guards[chosen].activate();
        chosen
    }

    fn select_timeout(&mut self, start_offset: usize, timeout: Time) -> Option<usize> {
        let n = self.guards.len();
        let all_bits = mask(n);
        K::event_group_clear(&self.event_group, all_bits);

        let mut enabled = 0usize;
        let mut ready_mask: u32 = 0;

        for i in 0..n {
            let idx = (start_offset + i) % n;
            let bit = idx as EventBit;
            enabled = i + 1;
            if self.guards[idx].enable(&self.event_group, bit) {
                ready_mask |= 1 << bit;
                break;
            }
        }

        if ready_mask == 0 {
            let wait_mask = (0..enabled).fold(0u32, |m, i| m | (1 << ((start_offset + i) % n)));
            K::event_group_wait_any(&self.event_group, wait_mask, Some(timeout.to_default_ticks()));
        }

        for i in 0..enabled {
            let idx = (start_offset + i) % n;
            if self.guards[idx].disable() {
                ready_mask |= 1 << (idx as EventBit);
            }
        }

        let chosen = (0..n).find(|idx| ready_mask & (1 << (*idx as EventBit)) != 0);
        if let Some(idx) = chosen {
            self.guards[idx].activate();
        }
        chosen
    }
}

fn mask(n: usize) -> u32 {
    if n >= 32 {
        u32::MAX
    } else {
        (1u32 << n) - 1
    }
}

/// A guard that becomes ready once a fixed delay has elapsed.
///
/// Grounded on `RelTimeoutGuard` in the source this crate is derived from:
/// a resident guard, built once and re-armed on every `enable`, rather than
/// a one-shot future. `Time::ZERO` is always immediately ready (a
/// non-blocking poll of the other guards in the same `Alternative`).
pub struct TimeoutGuard<K: Kernel> {
    timer: K::Timer,
    delay: Time,
    armed: Option<(*const K::EventGroup, EventBit)>,
}

impl<K: Kernel> TimeoutGuard<K> {
    pub fn new(delay: Time) -> Self {
        TimeoutGuard {
            timer: K::timer_new(),
            delay,
            armed: None,
        }
    }

    /// Change the delay used on the next `enable`. Does not affect a timer
    /// already armed from a prior selection round.
    pub fn set_delay(&mut self, delay: Time) {
        self.delay = delay;
    }
}

impl<K: Kernel> Guard<K> for TimeoutGuard<K> {
    fn enable(&mut self, eg: &K::EventGroup, bit: EventBit) -> bool {
        if self.delay == Time::ZERO {
            return true;
        }
        K::timer_start(&self.timer, self.delay.to_default_ticks(), eg, bit);
        self.armed = Some((eg as *const K::EventGroup, bit));
        false
    }

    fn disable(&mut self) -> bool {
        K::timer_stop(&self.timer);
        match self.armed.take() {
            Some((eg, bit)) => {
                let observed = unsafe { K::event_group_wait_any(&*eg, 1 << bit, Some(0 as Tick)) };
                observed & (1 << bit) != 0
            }
            None => true,
        }
    }

    fn activate(&mut self) {}
}
