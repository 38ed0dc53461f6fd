//! The `Kernel` trait: the seam between this crate's synchronization
//! algorithms and a concrete RTOS.
//!
//! The teacher crate wraps a *specific* RTOS (Zephyr) behind thin newtypes
//! (`sys::Mutex`, `sys::Condvar`, `sys::Thread`) that call straight through
//! to `extern "C"` kernel functions. This crate needs the same shape of
//! wrapper, but genericized: `chan`, `alt`, and `process` are written once,
//! against `K: Kernel`, and a concrete `K` is supplied per target — a real
//! RTOS binding for firmware, and a `std`-backed simulation (`csp-host`) for
//! tests and desktop demos.
//!
//! Four primitives are required, matching exactly what the synchronization
//! core and the ALT engine need and nothing more:
//!
//! - a [`Kernel::Mutex`] guarding each channel's small shared state record
//! - a [`Kernel::EventGroup`] — a bitset a task can `wait_any`/`wait_all` on,
//!   used both for plain blocking rendezvous (one reserved bit per blocked
//!   task) and for ALT's simultaneous multi-guard wait
//! - a [`Kernel::Timer`] — a one-shot, relative timer that sets a bit in an
//!   event group when it fires, used only by [`crate::alt::TimeoutGuard`]
//! - task spawn, for [`crate::process::Process`] execution
//!
//! There is deliberately no generic task-notification/semaphore primitive
//! beyond the event group: one mechanism serves both plain rendezvous and
//! ALT, rather than maintaining two.

use crate::time::Tick;

/// An index into a [`Kernel::EventGroup`]'s bitset.
///
/// Valid range is implementation-defined but must cover at least
/// `0..32`; [`crate::alt::Alternative`] never uses more than
/// `MAX_GUARDS` (16) simultaneously.
pub type EventBit = u32;

/// RTOS services this crate's channel and ALT engine are built on.
///
/// Implementations must be zero-sized or reference a single underlying RTOS
/// instance; all associated types are created and used through `&self`-free
/// associated functions because, as with the teacher's `StaticKernelObject`
/// pattern, the *objects* (mutexes, event groups, timers) carry their own
/// identity and the `Kernel` type itself is just a namespace for operating
/// on them.
pub trait Kernel {
    /// A schedulable unit of execution, spawned by [`Kernel::spawn`].
    type TaskHandle;

    /// A mutual-exclusion lock sized for a single channel's or ALT's shared
    /// state record.
    type Mutex;

    /// A bitset a task can block on, waiting for any or all of a mask of
    /// bits to become set.
    type EventGroup;

    /// A one-shot relative timer.
    type Timer;

    /// Construct a new, unlocked mutex.
    fn mutex_new() -> Self::Mutex;

    /// Acquire `m`, blocking the calling task if necessary.
    fn mutex_lock(m: &Self::Mutex);

    /// Release `m`. Must only be called by the task holding it.
    fn mutex_unlock(m: &Self::Mutex);

    /// Construct a new event group with all bits clear.
    fn event_group_new() -> Self::EventGroup;

    /// Atomically set every bit in `bits`, waking any task whose
    /// `wait_any`/`wait_all` this satisfies.
    fn event_group_set(eg: &Self::EventGroup, bits: u32);

    /// Atomically clear every bit in `bits`.
    fn event_group_clear(eg: &Self::EventGroup, bits: u32);

    /// Block until at least one bit in `bits` is set, or `timeout_ticks`
    /// elapses (`None` blocks forever, `Some(0)` polls without blocking).
    /// Returns the subset of `bits` observed set at wakeup (possibly empty,
    /// on timeout or a zero-duration poll that found nothing set).
    fn event_group_wait_any(
        eg: &Self::EventGroup,
        bits: u32,
        timeout_ticks: Option<Tick>,
    ) -> u32;

    /// Block until every bit in `bits` is set, or `timeout_ticks` elapses.
    /// Returns the subset of `bits` observed set at wakeup.
    fn event_group_wait_all(
        eg: &Self::EventGroup,
        bits: u32,
        timeout_ticks: Option<Tick>,
    ) -> u32;

    /// Construct a new, unarmed timer.
    fn timer_new() -> Self::Timer;

    /// Arm `timer` to set `bit` in `eg` after `delay_ticks`, one time only.
    /// Starting an already-armed timer rearms it.
    fn timer_start(timer: &Self::Timer, delay_ticks: Tick, eg: &Self::EventGroup, bit: EventBit);

    /// Disarm `timer`. A no-op if it already fired or was never started.
    /// Racing a fire that has already set its bit is resolved by the caller
    /// re-checking the event group state, not by this call.
    fn timer_stop(timer: &Self::Timer);

    /// Spawn `f` as a new task and return a handle to it. `stack_size_hint`
    /// is advisory; implementations backed by a fixed-stack RTOS may ignore
    /// it in favor of a static allocation chosen at image build time.
    fn spawn<F>(stack_size_hint: usize, f: F) -> Self::TaskHandle
    where
        F: FnOnce() + Send + 'static;
}
