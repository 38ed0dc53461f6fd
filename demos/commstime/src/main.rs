//! The classic CSP COMMSTIME benchmark: a four-process ring measuring
//! average per-cycle communication and context-switch cost.
//!
//! Grounded on `csp4cmsis_comstime/tests.cpp`: `Prefix` seeds the ring with
//! `0`, `Delta` fans each value out to `Successor` (closing the ring) and
//! to a `Consumer`, and `Successor` increments and feeds back into
//! `Prefix`. `Consumer` times a fixed number of cycles and reports the
//! average.
//!
//! Two legs of the ring (`delta` -> `successor` -> `prefix`) run over
//! `BufferedChannel` instead of `RendezvousChannel`, so a momentary stall
//! in one process doesn't immediately lock-step every other stage. The
//! consumer reads its tap through an `Alternative` ALTing between the data
//! guard and a `TimeoutGuard`, logging (without losing or skipping) any
//! cycle whose next value is slower to arrive than the timeout —
//! demonstrating ALT+timeout rather than a bare blocking read.

use std::mem::MaybeUninit;
use std::time::{Duration, Instant};

use csp::alt::{Alternative, TimeoutGuard};
use csp::guard::Guard;
use csp::object::StaticCell;
use csp::time::Time;
use csp::{csp_logln, BufReader, BufWriter, BufferedChannel, Reader, RendezvousChannel, Writer};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;
const RING_BUFFER_CAPACITY: usize = 4;
type BufChan = BufferedChannel<i32, K, RING_BUFFER_CAPACITY>;

const CYCLES: usize = 100_000;
const TAP_TIMEOUT: Time = Time::from_micros(50);

static PREFIX_TO_DELTA: StaticCell<Chan> = StaticCell::new();
static DELTA_TO_SUCCESSOR: StaticCell<BufChan> = StaticCell::new();
static SUCCESSOR_TO_PREFIX: StaticCell<BufChan> = StaticCell::new();
static DELTA_TO_CONSUMER: StaticCell<Chan> = StaticCell::new();

fn prefix(
    mut input: BufReader<'static, i32, K, RING_BUFFER_CAPACITY>,
    mut output: Writer<'static, i32, K>,
) {
    output.write(0);
    loop {
        let v = input.read();
        output.write(v);
    }
}

fn delta(
    mut input: Reader<'static, i32, K>,
    mut to_successor: BufWriter<'static, i32, K, RING_BUFFER_CAPACITY>,
    mut to_consumer: Writer<'static, i32, K>,
) {
    loop {
        let v = input.read();
        to_successor.write(v);
        to_consumer.write(v);
    }
}

fn successor(
    mut input: BufReader<'static, i32, K, RING_BUFFER_CAPACITY>,
    mut output: BufWriter<'static, i32, K, RING_BUFFER_CAPACITY>,
) {
    loop {
        let v = input.read();
        output.write(v.wrapping_add(1));
    }
}

/// ALTs between the consumer's data tap and a recurring timeout, so a cycle
/// that's slow to arrive is logged rather than silently stalling with no
/// visibility. Returns the total time spent once `cycles` values have been
/// received, plus how many rounds timed out along the way — the data
/// stream itself is unaffected by a timeout, since the same data guard is
/// simply re-enabled next round.
fn consumer(mut input: Reader<'static, i32, K>, cycles: usize) -> (Duration, usize) {
    let mut storage = MaybeUninit::uninit();
    let mut data_guard = input.guard(&mut storage);
    let mut timeout_guard = TimeoutGuard::<K>::new(TAP_TIMEOUT);
    let mut guards: [&mut dyn Guard<K>; 2] = [&mut data_guard, &mut timeout_guard];
    let mut alt = Alternative::<K>::new(&mut guards).unwrap();

    let mut timeouts = 0usize;

    // Prime: consume the ring's seed value before starting the clock.
    loop {
        match alt.pri_select_timeout(TAP_TIMEOUT) {
            Some(0) => break,
            Some(1) | None => timeouts += 1,
            Some(other) => unreachable!("unexpected guard index {other}"),
        }
    }

    let start = Instant::now();
    let mut received = 0usize;
    while received < cycles {
        match alt.pri_select_timeout(TAP_TIMEOUT) {
            Some(0) => received += 1,
            Some(1) | None => {
                timeouts += 1;
                csp_logln!("commstime: consumer tap timed out waiting for cycle {received}");
            }
            Some(other) => unreachable!("unexpected guard index {other}"),
        }
    }
    (start.elapsed(), timeouts)
}

fn main() {
    csp_host::ensure_stderr_log_sink();

    let prefix_to_delta = PREFIX_TO_DELTA.init_with(Chan::new);
    let delta_to_successor = DELTA_TO_SUCCESSOR.init_with(BufChan::new);
    let successor_to_prefix = SUCCESSOR_TO_PREFIX.init_with(BufChan::new);
    let delta_to_consumer = DELTA_TO_CONSUMER.init_with(Chan::new);

    let (r_prefix_in, w_prefix_in) = successor_to_prefix.split();
    let (r_delta_in, w_delta_in) = prefix_to_delta.split();
    let (r_successor_in, w_successor_in) = delta_to_successor.split();
    let (r_consumer_in, w_consumer_in) = delta_to_consumer.split();

    // Each ring process loops forever, so these run as independent
    // background tasks rather than an `in_parallel!` run, which joins on
    // termination (see `csp::process`).
    let _ring = [
        <K as csp::Kernel>::spawn(32 * 1024, move || prefix(r_prefix_in, w_delta_in)),
        <K as csp::Kernel>::spawn(32 * 1024, move || {
            delta(r_delta_in, w_successor_in, w_consumer_in)
        }),
        <K as csp::Kernel>::spawn(32 * 1024, move || successor(r_successor_in, w_prefix_in)),
    ];

    let (elapsed, timeouts) = consumer(r_consumer_in, CYCLES);
    let per_cycle = elapsed / CYCLES as u32;
    csp_logln!(
        "commstime: {} cycles in {:?} ({:?}/cycle, {:?}/context-switch), {} tap timeouts",
        CYCLES,
        elapsed,
        per_cycle,
        per_cycle / 4,
        timeouts,
    );
}
