//! A fixed chain of prime filters passes through exactly the primes not
//! divisible by any of the seed primes.
//!
//! Grounded on `csp4cmsis_sieve/tests.cpp`.

use csp::object::StaticCell;
use csp::{Kernel, Reader, RendezvousChannel, Writer};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;

const PRIMES: [i32; 5] = [2, 3, 5, 7, 11];

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

#[test]
fn survivors_are_the_primes_above_eleven() {
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

    let [r0, r1, r2, r3, r4, mut r5]: [Reader<'static, i32, K>; PRIMES.len() + 1] =
        readers.try_into().unwrap_or_else(|_| unreachable!());
    let [w0, w1, w2, w3, w4, w5]: [Writer<'static, i32, K>; PRIMES.len() + 1] =
        writers.try_into().unwrap_or_else(|_| unreachable!());

    // Filters never return, so these run as independent background tasks
    // rather than an `in_parallel!` run (which joins on termination).
    let _filters = [
        K::spawn(32 * 1024, move || filter(PRIMES[0], r0, w1)),
        K::spawn(32 * 1024, move || filter(PRIMES[1], r1, w2)),
        K::spawn(32 * 1024, move || filter(PRIMES[2], r2, w3)),
        K::spawn(32 * 1024, move || filter(PRIMES[3], r3, w4)),
        K::spawn(32 * 1024, move || filter(PRIMES[4], r4, w5)),
    ];

    let mut w0 = w0;
    let gen_handle = K::spawn(32 * 1024, move || {
        for v in 2..50 {
            w0.write(v);
        }
    });

    let expected = [13, 17, 19, 23, 29, 31, 37, 41, 43, 47];
    let mut survivors = Vec::new();
    for _ in 0..expected.len() {
        survivors.push(r5.read());
    }

    assert_eq!(survivors, expected);
    gen_handle.join().unwrap();
}
