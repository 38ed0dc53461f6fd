//! Processes and static process networks.
//!
//! A CSP process is just a loop that reads and writes channel endpoints; it
//! has no special status beyond being the `FnOnce` (or `Fn` loop body) given
//! to [`crate::kernel::Kernel::spawn`]. [`Process`] exists only to name the
//! convention — a zero-argument, non-returning (or error-returning) unit of
//! work — and [`in_parallel!`] is the declarative-macro stand-in for the
//! original's variadic `Run(...)`/`StaticNetwork` template composition,
//! which Rust has no direct equivalent for.

use crate::kernel::{EventBit, Kernel};

/// A unit of work suitable for running as one node of a static process
/// network. Implemented by closures automatically; most call sites never
/// name this trait directly and just pass a closure to [`in_parallel!`].
pub trait Process {
    fn run(self);
}

impl<F: FnOnce()> Process for F {
    fn run(self) {
        self()
    }
}

/// A completing process's handle to its reserved bit of the run's join
/// `EventGroup`, carried into the spawned task's closure. `G` does not
/// implement `Send` in general (it may contain platform mutex/condvar
/// internals), but this pointer is only ever dereferenced by [`fire`]
/// before `in_parallel!`'s `wait_all` returns, while the referent is still
/// live on the launching task's stack.
///
/// Public only because `in_parallel!` expands outside this module; not
/// part of this crate's supported API.
#[doc(hidden)]
pub struct JoinSignal<G>(*const G, EventBit);

unsafe impl<G> Send for JoinSignal<G> {}

impl<G> JoinSignal<G> {
    #[doc(hidden)]
    pub fn new(eg: &G, bit: EventBit) -> Self {
        JoinSignal(eg as *const G, bit)
    }

    #[doc(hidden)]
    pub fn fire<K: Kernel<EventGroup = G>>(&self) {
        K::event_group_set(unsafe { &*self.0 }, 1 << self.1);
    }
}

/// Spawn every given expression as its own task under `$kernel: K` and block
/// the caller until all of them have returned — the Static Process Network
/// model's `InParallel(p1, p2, ..)`, §4.7: a run-scoped `EventGroup` gives
/// every process one reserved bit, each process body sets its own bit as its
/// last act, and the caller `wait_all`s the full mask before returning.
///
/// ```ignore
/// in_parallel!(K; stack_size;
///     move || relay(reader_a, writer_b),
///     move || relay(reader_b, writer_c),
/// );
/// ```
///
/// Grounded on the teacher crate's `Thread::spawn`/`StaticThread::spawn`
/// call shape (`Thread::spawn(name, move || { .. })`), generalized across
/// an arbitrary number of process bodies via `macro_rules!` repetition
/// instead of Zephyr's per-sample hand-written spawn calls; the join barrier
/// reuses the same `EventGroup` idiom `csp::chan`/`csp::alt` block on rather
/// than introducing a separate join primitive on `Kernel::TaskHandle`.
#[macro_export]
macro_rules! in_parallel {
    ($kernel:ty; $stack_size:expr; $($body:expr),+ $(,)?) => {{
        type K = $kernel;
        let done = <K as $crate::Kernel>::event_group_new();
        let mut bit: $crate::kernel::EventBit = 0;
        let mut mask: u32 = 0;
        let _handles = [
            $(
                {
                    let my_bit = bit;
                    mask |= 1 << my_bit;
                    bit += 1;
                    let signal = $crate::process::JoinSignal::new(&done, my_bit);
                    let body = $body;
                    <K as $crate::Kernel>::spawn($stack_size, move || {
                        $crate::process::Process::run(body);
                        signal.fire::<K>();
                    })
                }
            ),+
        ];
        <K as $crate::Kernel>::event_group_wait_all(&done, mask, None);
    }};
}
