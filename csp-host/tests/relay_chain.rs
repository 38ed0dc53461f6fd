//! A chain of relay processes forwards every value, in order, unmodified.
//!
//! Grounded on `csp4cmsis_chain_test/tests.cpp`.

use csp::object::StaticCell;
use csp::{Kernel, Reader, RendezvousChannel, Writer};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;

const RELAY_COUNT: usize = 5;
const VALUE_COUNT: i32 = 1000;

static CHAN_0: StaticCell<Chan> = StaticCell::new();
static CHAN_1: StaticCell<Chan> = StaticCell::new();
static CHAN_2: StaticCell<Chan> = StaticCell::new();
static CHAN_3: StaticCell<Chan> = StaticCell::new();
static CHAN_4: StaticCell<Chan> = StaticCell::new();
static CHAN_5: StaticCell<Chan> = StaticCell::new();

fn relay(mut input: Reader<'static, i32, K>, mut output: Writer<'static, i32, K>) {
    loop {
        let v = input.read();
        output.write(v);
    }
}

#[test]
fn values_arrive_in_order_unmodified() {
    let chans = [
        CHAN_0.init_with(Chan::new),
        CHAN_1.init_with(Chan::new),
        CHAN_2.init_with(Chan::new),
        CHAN_3.init_with(Chan::new),
        CHAN_4.init_with(Chan::new),
        CHAN_5.init_with(Chan::new),
    ];

    let mut readers = Vec::with_capacity(chans.len());
    let mut writers = Vec::with_capacity(chans.len());
    for c in chans {
        let (r, w) = c.split();
        readers.push(r);
        writers.push(w);
    }

    let [r0, r1, r2, r3, r4, mut r5]: [Reader<'static, i32, K>; RELAY_COUNT + 1] =
        readers.try_into().unwrap_or_else(|_| unreachable!());
    let [w0, w1, w2, w3, w4, w5]: [Writer<'static, i32, K>; RELAY_COUNT + 1] =
        writers.try_into().unwrap_or_else(|_| unreachable!());

    // Relays never return, so these run as independent background tasks
    // rather than an `in_parallel!` run (which joins on termination).
    let _relays = [
        K::spawn(32 * 1024, move || relay(r0, w1)),
        K::spawn(32 * 1024, move || relay(r1, w2)),
        K::spawn(32 * 1024, move || relay(r2, w3)),
        K::spawn(32 * 1024, move || relay(r3, w4)),
        K::spawn(32 * 1024, move || relay(r4, w5)),
    ];

    let mut w0 = w0;
    let gen_handle = K::spawn(32 * 1024, move || {
        for v in 0..VALUE_COUNT {
            w0.write(v);
        }
    });

    for expected in 0..VALUE_COUNT {
        assert_eq!(r5.read(), expected);
    }

    gen_handle.join().unwrap();
}
