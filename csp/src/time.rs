//! A nonnegative, tick-convertible duration.
//!
//! Modeled after the original `csp::Time` (see `RelTimeoutGuard(csp::Time
//! delay)` in the source this crate is derived from) and, per the teacher
//! crate's own declared dependency on `fugit` (`zephyr/Cargo.toml`), built
//! on [`fugit::MicrosDurationU64`] rather than a hand-rolled microsecond
//! counter: the fixed-point duration type the rest of the Rust embedded
//! ecosystem passes across RTOS/HAL boundaries.
//!
//! `fugit`'s `Duration<T, NOM, DENOM>` is a compile-time-fixed-rate type —
//! its conversions between rates (e.g. `MicrosDurationU64` to
//! `MillisDurationU64`) are all resolved at compile time via its const
//! generics. A kernel tick rate, by contrast, is a *runtime* quantity
//! (`CSP_TICK_RATE_HZ`, read at build time but not a `fugit`-representable
//! ratio in general), so the microseconds-to-ticks conversion below stays
//! manual arithmetic over the duration's raw tick count rather than a
//! `fugit` rate conversion.

// Bring in the build-time generated tick rate default.
include!(concat!(env!("OUT_DIR"), "/build_config.rs"));

use fugit::MicrosDurationU64;

/// A single kernel tick, however long that is on the target.
pub type Tick = u64;

/// A nonnegative duration, constructed from milliseconds, microseconds, or
/// raw ticks, and converted to ticks against a caller-supplied tick rate.
///
/// `Time` is monotonic with respect to its constructor arguments: larger
/// inputs to `from_millis`/`from_micros`/`from_ticks` always produce a
/// `Time` that converts to a larger-or-equal tick count at any fixed rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time {
    micros: MicrosDurationU64,
}

impl Time {
    /// The zero duration. `enable`s backed by this never block.
    pub const ZERO: Time = Time {
        micros: MicrosDurationU64::from_ticks(0),
    };

    /// Construct from a millisecond count.
    pub const fn from_millis(ms: u64) -> Time {
        Time {
            micros: MicrosDurationU64::from_ticks(ms.saturating_mul(1_000)),
        }
    }

    /// Construct from a microsecond count.
    pub const fn from_micros(us: u64) -> Time {
        Time {
            micros: MicrosDurationU64::from_ticks(us),
        }
    }

    /// Construct from a tick count at a given tick rate (Hz).
    pub const fn from_ticks(ticks: Tick, tick_rate_hz: u64) -> Time {
        // ticks / rate seconds, in microseconds: ticks * 1_000_000 / rate.
        let micros = (ticks as u128 * 1_000_000u128) / (tick_rate_hz as u128);
        Time {
            micros: MicrosDurationU64::from_ticks(micros as u64),
        }
    }

    /// Convert to a tick count at the given tick rate (Hz), rounding up so
    /// that a timeout guard never fires before the requested duration has
    /// elapsed (P6, timeout monotonicity).
    pub const fn to_ticks(&self, tick_rate_hz: u64) -> Tick {
        let numerator = self.micros.ticks() as u128 * tick_rate_hz as u128;
        let ticks = numerator.div_ceil(1_000_000u128);
        ticks as Tick
    }

    /// Convert to ticks using the build-time configured default tick rate
    /// (`CSP_TICK_RATE_HZ`, defaulting to 1000 Hz).
    pub const fn to_default_ticks(&self) -> Tick {
        self.to_ticks(DEFAULT_TICK_RATE_HZ)
    }

    /// This duration in whole milliseconds (truncating).
    pub const fn as_millis(&self) -> u64 {
        self.micros.ticks() / 1_000
    }

    /// This duration in microseconds.
    pub const fn as_micros(&self) -> u64 {
        self.micros.ticks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_round_trip_at_1khz() {
        let t = Time::from_millis(150);
        assert_eq!(t.to_ticks(1000), 150);
    }

    #[test]
    fn to_ticks_rounds_up_never_short() {
        // 1500us at 1000Hz (1 tick = 1000us) must round up to 2 ticks, not 1,
        // so a timeout guard never fires early.
        let t = Time::from_micros(1500);
        assert_eq!(t.to_ticks(1000), 2);
    }

    #[test]
    fn monotonic_in_constructor_args() {
        assert!(Time::from_millis(10) < Time::from_millis(20));
        assert!(Time::from_micros(999) < Time::from_millis(1));
    }

    #[test]
    fn zero_never_blocks() {
        assert_eq!(Time::ZERO.to_ticks(1000), 0);
    }
}
