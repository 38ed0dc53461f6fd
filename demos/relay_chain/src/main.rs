//! A fixed chain of `RELAY_COUNT` relay processes, each reading one value
//! and forwarding it straight to the next channel.
//!
//! Grounded on `csp4cmsis_chain_test/tests.cpp`'s `Relay` process chain:
//! the original wires a `Generator -> Relay -> Relay -> ... -> Terminator`
//! network over `RendezvousChannel`s and checks every value arrives
//! unmodified and in order.

use csp::object::StaticCell;
use csp::{csp_logln, Kernel, Reader, RendezvousChannel, Writer};
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

fn main() {
    csp_host::ensure_stderr_log_sink();

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

    let [r0, r1, r2, r3, r4, r5]: [Reader<'static, i32, K>; RELAY_COUNT + 1] =
        readers.try_into().unwrap_or_else(|_| unreachable!());
    let [w0, w1, w2, w3, w4, w5]: [Writer<'static, i32, K>; RELAY_COUNT + 1] =
        writers.try_into().unwrap_or_else(|_| unreachable!());

    // `in_parallel!` joins its whole run, which doesn't fit a relay chain —
    // these processes never return, so each is its own background task
    // instead (the composition this crate's `in_parallel!` models is one
    // that terminates; see `csp::process`).
    let _relays = [
        <K as Kernel>::spawn(32 * 1024, move || relay(r0, w1)),
        <K as Kernel>::spawn(32 * 1024, move || relay(r1, w2)),
        <K as Kernel>::spawn(32 * 1024, move || relay(r2, w3)),
        <K as Kernel>::spawn(32 * 1024, move || relay(r3, w4)),
        <K as Kernel>::spawn(32 * 1024, move || relay(r4, w5)),
    ];

    let mut w0 = w0;
    let gen_handle = <K as Kernel>::spawn(32 * 1024, move || {
        for v in 0..VALUE_COUNT {
            w0.write(v);
        }
    });

    let mut r5 = r5;
    let mut last = -1;
    for _ in 0..VALUE_COUNT {
        let v = r5.read();
        assert_eq!(v, last + 1, "relay chain reordered or dropped a value");
        last = v;
    }
    csp_logln!("relay_chain: {} values through {} relays, last = {}", VALUE_COUNT, RELAY_COUNT, last);

    let _ = gen_handle.join();
}
