//! Error taxonomy.
//!
//! Matches the three classes from the spec's error-handling design:
//! construction-time-fatal conditions are the only ones that reach this
//! type at all. Programmer-error preconditions (sharing an endpoint,
//! re-ALTing a resident guard) and transient ready-races are either
//! undetected by design or silently absorbed by the protocol, never
//! surfaced here.

use core::fmt;

/// Construction-time-fatal conditions.
///
/// Channel and ALT operations never return this type; it only appears at
/// the boundary where a network is being assembled (building an
/// [`crate::alt::Alternative`], creating a buffered channel).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CspError {
    /// An `Alternative` was built from more than `MAX_GUARDS` guards.
    TooManyGuards,
    /// A buffered channel was asked to have zero capacity.
    ZeroCapacity,
    /// The underlying `Kernel` could not allocate a mutex, event group, or
    /// timer for a channel/ALT under construction.
    KernelResourceExhausted,
}

impl fmt::Display for CspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CspError::TooManyGuards => "alternative built with more guards than MAX_GUARDS",
            CspError::ZeroCapacity => "buffered channel requires capacity >= 1",
            CspError::KernelResourceExhausted => "kernel primitive allocation failed",
        };
        f.write_str(msg)
    }
}

/// Result alias used at construction boundaries only.
pub type Result<T> = core::result::Result<T, CspError>;
