//! A `std`-backed [`csp::Kernel`] implementor.
//!
//! Runs `csp` process networks as native OS threads rather than on a real
//! RTOS — this is the crate the teacher crate's own `samples/` would reach
//! for if it needed a host-side stand-in, the way projects commonly keep a
//! "sim" backend alongside the real target backend for fast desktop
//! testing. Every `csp` demo and integration test in this workspace runs
//! against [`HostKernel`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use csp::kernel::{EventBit, Kernel};
use csp::time::Tick;

/// The std-backed [`Kernel`] implementor.
pub struct HostKernel;

/// A busy-wait lock. Simple by design: this backend exists for tests and
/// demos, not for production deployment, and the channel/ALT critical
/// sections it guards are always short (a handful of field reads and an
/// `Option::take`).
pub struct HostMutex {
    locked: AtomicBool,
}

impl HostMutex {
    fn new() -> Self {
        HostMutex {
            locked: AtomicBool::new(false),
        }
    }

    fn lock(&self) {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::thread::yield_now();
        }
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// A 32-bit event group: bits a task can set, clear, and block on any/all
/// of, backed by a `Mutex`+`Condvar` pair.
pub struct HostEventGroup {
    state: Mutex<u32>,
    cv: Condvar,
}

impl HostEventGroup {
    fn new() -> Self {
        HostEventGroup {
            state: Mutex::new(0),
            cv: Condvar::new(),
        }
    }

    fn set(&self, bits: u32) {
        let mut state = self.state.lock().unwrap();
        *state |= bits;
        self.cv.notify_all();
    }

    fn clear(&self, bits: u32) {
        let mut state = self.state.lock().unwrap();
        *state &= !bits;
    }

    fn wait_matching(&self, bits: u32, timeout: Option<Tick>, all: bool) -> u32 {
        let mut state = self.state.lock().unwrap();
        let satisfied = |s: u32| if all { (s & bits) == bits } else { (s & bits) != 0 };
        let deadline = timeout.map(|t| Instant::now() + ticks_to_duration(t));

        loop {
            if satisfied(*state) {
                return *state & bits;
            }
            match deadline {
                None => {
                    state = self.cv.wait(state).unwrap();
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return *state & bits;
                    }
                    let (new_state, result) =
                        self.cv.wait_timeout(state, deadline - now).unwrap();
                    state = new_state;
                    if result.timed_out() && !satisfied(*state) {
                        return *state & bits;
                    }
                }
            }
        }
    }
}

fn ticks_to_duration(ticks: Tick) -> Duration {
    let rate = csp::time::DEFAULT_TICK_RATE_HZ;
    Duration::from_secs_f64(ticks as f64 / rate as f64)
}

struct SendPtr<T>(*const T);
unsafe impl<T> Send for SendPtr<T> {}

/// A one-shot relative timer. Backed by a detached sleeping thread and a
/// generation counter so that `timer_stop` racing against the thread's
/// wakeup is resolved deterministically: both sides serialize on the same
/// `Mutex<u64>`, so a stop that completes always either preceded the fire
/// (which then never happens) or followed it (which had already used the
/// event group while it was still guaranteed live).
pub struct HostTimer {
    generation: Arc<Mutex<u64>>,
}

impl HostTimer {
    fn new() -> Self {
        HostTimer {
            generation: Arc::new(Mutex::new(0)),
        }
    }

    fn start(&self, delay_ticks: Tick, eg: &HostEventGroup, bit: EventBit) {
        let generation = self.generation.clone();
        let my_generation = {
            let mut g = generation.lock().unwrap();
            *g += 1;
            *g
        };
        let eg_ptr = SendPtr(eg as *const HostEventGroup);
        let duration = ticks_to_duration(delay_ticks);
        std::thread::spawn(move || {
            std::thread::sleep(duration);
            let g = generation.lock().unwrap();
            if *g == my_generation {
                let SendPtr(ptr) = eg_ptr;
                unsafe { &*ptr }.set(1 << bit);
            }
        });
    }

    fn stop(&self) {
        let mut g = self.generation.lock().unwrap();
        *g += 1;
    }
}

impl Kernel for HostKernel {
    type TaskHandle = std::thread::JoinHandle<()>;
    type Mutex = HostMutex;
    type EventGroup = HostEventGroup;
    type Timer = HostTimer;

    fn mutex_new() -> Self::Mutex {
        HostMutex::new()
    }

    fn mutex_lock(m: &Self::Mutex) {
        m.lock();
    }

    fn mutex_unlock(m: &Self::Mutex) {
        m.unlock();
    }

    fn event_group_new() -> Self::EventGroup {
        HostEventGroup::new()
    }

    fn event_group_set(eg: &Self::EventGroup, bits: u32) {
        eg.set(bits);
    }

    fn event_group_clear(eg: &Self::EventGroup, bits: u32) {
        eg.clear(bits);
    }

    fn event_group_wait_any(eg: &Self::EventGroup, bits: u32, timeout_ticks: Option<Tick>) -> u32 {
        eg.wait_matching(bits, timeout_ticks, false)
    }

    fn event_group_wait_all(eg: &Self::EventGroup, bits: u32, timeout_ticks: Option<Tick>) -> u32 {
        eg.wait_matching(bits, timeout_ticks, true)
    }

    fn timer_new() -> Self::Timer {
        HostTimer::new()
    }

    fn timer_start(timer: &Self::Timer, delay_ticks: Tick, eg: &Self::EventGroup, bit: EventBit) {
        timer.start(delay_ticks, eg, bit);
    }

    fn timer_stop(timer: &Self::Timer) {
        timer.stop();
    }

    fn spawn<F>(stack_size_hint: usize, f: F) -> Self::TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        std::thread::Builder::new()
            .stack_size(stack_size_hint.max(64 * 1024))
            .spawn(f)
            .expect("failed to spawn host thread")
    }
}

/// A [`csp::log::Sink`] that writes to stderr, for demos and tests that
/// enable the `csp` crate's `log` feature.
pub struct StderrSink;

impl csp::log::Sink for StderrSink {
    fn write_str(&self, s: &str) {
        eprint!("{s}");
    }
}

static STDERR_SINK: StderrSink = StderrSink;

/// Install [`StderrSink`] as the global `csp` log sink. Call once at the
/// start of `main`/a test.
pub fn install_stderr_log_sink() {
    unsafe {
        csp::log::set_sink(&STDERR_SINK);
    }
}

static INIT_GUARD: AtomicU64 = AtomicU64::new(0);

/// Idempotent variant of [`install_stderr_log_sink`], safe to call from
/// every test function without risking the "called concurrently" hazard
/// `set_sink` otherwise carries.
pub fn ensure_stderr_log_sink() {
    if INIT_GUARD
        .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        install_stderr_log_sink();
    }
}
