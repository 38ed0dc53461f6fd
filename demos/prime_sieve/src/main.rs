//! A fixed chain of prime filters, in the style of the classic CSP sieve of
//! Eratosthenes.
//!
//! Grounded on `csp4cmsis_sieve/tests.cpp`: a `Generator` emits candidates
//! `2..50`, and each of five `Filter` processes is seeded with one of the
//! first five primes and only forwards values not divisible by it. What
//! survives all five filters are exactly the primes between 11 and 50.

use csp::object::StaticCell;
use csp::{csp_logln, Kernel, Reader, RendezvousChannel, Writer};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;

const PRIMES: [i32; 5] = [2, 3, 5, 7, 11];
const RANGE_START: i32 = 2;
const RANGE_END: i32 = 50; // exclusive

static CHAN_0: StaticCell<Chan> = StaticCell::new();
static CHAN_1: StaticCell<Chan> = StaticCell::new();
static CHAN_2: StaticCell<Chan> = StaticCell::new();
static CHAN_3: StaticCell<Chan> = StaticCell::new();
static CHAN_4: StaticCell<Chan> = StaticCell::new();
static CHAN_5: StaticCell<Chan> = StaticCell::new();

fn filter(prime: i32, mut input: Reader<'static, i32, K>, mut output: Writer<'static, i32, K>) {
    loop {
        let v = input.read();
        if v % prime != 0 {
            output.write(v);
        }
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

    let [r0, r1, r2, r3, r4, r5]: [Reader<'static, i32, K>; PRIMES.len() + 1] =
        readers.try_into().unwrap_or_else(|_| unreachable!());
    let [w0, w1, w2, w3, w4, w5]: [Writer<'static, i32, K>; PRIMES.len() + 1] =
        writers.try_into().unwrap_or_else(|_| unreachable!());

    // Each filter runs forever, so these are independent background tasks
    // rather than an `in_parallel!` run (which joins on termination).
    let _filters = [
        <K as Kernel>::spawn(32 * 1024, move || filter(PRIMES[0], r0, w1)),
        <K as Kernel>::spawn(32 * 1024, move || filter(PRIMES[1], r1, w2)),
        <K as Kernel>::spawn(32 * 1024, move || filter(PRIMES[2], r2, w3)),
        <K as Kernel>::spawn(32 * 1024, move || filter(PRIMES[3], r3, w4)),
        <K as Kernel>::spawn(32 * 1024, move || filter(PRIMES[4], r4, w5)),
    ];

    let mut w0 = w0;
    let gen_handle = <K as Kernel>::spawn(32 * 1024, move || {
        for v in RANGE_START..RANGE_END {
            w0.write(v);
        }
    });

    // Only 10 of the 48 candidates survive all five filters, so the sink
    // reads exactly that many values rather than one per generator value.
    let mut r5 = r5;
    let mut survivors = Vec::new();
    let expected = [13, 17, 19, 23, 29, 31, 37, 41, 43, 47];
    for _ in 0..expected.len() {
        survivors.push(r5.read());
    }

    assert_eq!(survivors, expected, "prime sieve produced an unexpected set");
    csp_logln!("prime_sieve: survivors = {:?}", survivors);

    let _ = gen_handle.join();
}
