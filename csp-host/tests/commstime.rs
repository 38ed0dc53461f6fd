//! The COMMSTIME ring completes a bounded number of cycles and every value
//! the consumer sees increases by exactly one per cycle — including across
//! the ring's buffered legs, and whether or not the consumer's tap ALT
//! happens to time out along the way.
//!
//! Grounded on `csp4cmsis_comstime/tests.cpp`. Shortened from the
//! benchmark's usual six-figure cycle count so the test runs quickly.

use std::mem::MaybeUninit;

use csp::alt::{Alternative, TimeoutGuard};
use csp::guard::Guard;
use csp::object::StaticCell;
use csp::time::Time;
use csp::{BufReader, BufWriter, BufferedChannel, Kernel, Reader, RendezvousChannel, Writer};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;
const RING_BUFFER_CAPACITY: usize = 4;
type BufChan = BufferedChannel<i32, K, RING_BUFFER_CAPACITY>;

const CYCLES: usize = 200;
const TAP_TIMEOUT: Time = Time::from_micros(20);

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

#[test]
fn ring_advances_by_one_every_cycle() {
    let prefix_to_delta = PREFIX_TO_DELTA.init_with(Chan::new);
    let delta_to_successor = DELTA_TO_SUCCESSOR.init_with(BufChan::new);
    let successor_to_prefix = SUCCESSOR_TO_PREFIX.init_with(BufChan::new);
    let delta_to_consumer = DELTA_TO_CONSUMER.init_with(Chan::new);

    let (r_prefix_in, w_prefix_in) = successor_to_prefix.split();
    let (r_delta_in, w_delta_in) = prefix_to_delta.split();
    let (r_successor_in, w_successor_in) = delta_to_successor.split();
    let (mut r_consumer_in, w_consumer_in) = delta_to_consumer.split();

    // Each ring process loops forever, so these run as independent
    // background tasks rather than an `in_parallel!` run, which joins on
    // termination.
    let _ring = [
        K::spawn(32 * 1024, move || prefix(r_prefix_in, w_delta_in)),
        K::spawn(32 * 1024, move || {
            delta(r_delta_in, w_successor_in, w_consumer_in)
        }),
        K::spawn(32 * 1024, move || successor(r_successor_in, w_prefix_in)),
    ];

    // `data_guard` holds an exclusive borrow of `storage` for as long as
    // `alt` is in use (it's re-enabled every round across the whole loop
    // below), so the received value is read back through this raw pointer
    // taken before the guard is built, rather than through `storage` by
    // name — the same raw-pointer idiom `ChanInGuard::activate` itself uses
    // to write it.
    let mut storage = MaybeUninit::<i32>::uninit();
    let storage_ptr = storage.as_mut_ptr();
    let mut data_guard = r_consumer_in.guard(&mut storage);
    let mut timeout_guard = TimeoutGuard::<K>::new(TAP_TIMEOUT);
    let mut guards: [&mut dyn Guard<K>; 2] = [&mut data_guard, &mut timeout_guard];
    let mut alt = Alternative::<K>::new(&mut guards).unwrap();

    let mut next_value = || loop {
        match alt.pri_select_timeout(TAP_TIMEOUT) {
            Some(0) => return unsafe { storage_ptr.read() },
            Some(1) | None => continue,
            Some(other) => unreachable!("unexpected guard index {other}"),
        }
    };

    let mut previous = next_value();
    for _ in 0..CYCLES {
        let v = next_value();
        assert_eq!(v, previous.wrapping_add(1));
        previous = v;
    }
}
