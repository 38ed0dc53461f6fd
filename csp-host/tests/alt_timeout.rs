//! Timeout precedence: a channel guard that becomes ready before a
//! `TimeoutGuard` fires wins the selection, and the timeout guard wins when
//! nothing else becomes ready in its window.

use core::mem::MaybeUninit;
use std::thread;
use std::time::Duration;

use csp::alt::{Alternative, TimeoutGuard};
use csp::guard::Guard;
use csp::object::StaticCell;
use csp::time::Time;
use csp::{Kernel, RendezvousChannel};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;

static CHAN_READY: StaticCell<Chan> = StaticCell::new();
static CHAN_IDLE: StaticCell<Chan> = StaticCell::new();

#[test]
fn channel_ready_before_timeout_wins() {
    let chan = CHAN_READY.init_with(Chan::new);
    let (mut reader, mut writer) = chan.split();

    let sender = K::spawn(32 * 1024, move || {
        thread::sleep(Duration::from_millis(20));
        writer.write(42);
    });

    let mut storage = MaybeUninit::uninit();
    let mut chan_guard = reader.guard(&mut storage);
    let mut timeout_guard = TimeoutGuard::<K>::new(Time::from_millis(150));

    let mut guards: [&mut dyn Guard<K>; 2] = [&mut chan_guard, &mut timeout_guard];
    let mut alt = Alternative::<K>::new(&mut guards).unwrap();
    let chosen = alt.pri_select();

    assert_eq!(chosen, 0, "channel guard should win once its write arrives");
    assert_eq!(unsafe { storage.assume_init() }, 42);

    sender.join().unwrap();
}

#[test]
fn timeout_fires_when_nothing_else_becomes_ready() {
    let chan = CHAN_IDLE.init_with(Chan::new);
    let (mut reader, _writer) = chan.split();

    let mut storage = MaybeUninit::uninit();
    let mut chan_guard = reader.guard(&mut storage);
    let mut timeout_guard = TimeoutGuard::<K>::new(Time::from_millis(100));

    let mut guards: [&mut dyn Guard<K>; 2] = [&mut chan_guard, &mut timeout_guard];
    let mut alt = Alternative::<K>::new(&mut guards).unwrap();

    let started = std::time::Instant::now();
    let chosen = alt.pri_select();
    let elapsed = started.elapsed();

    assert_eq!(chosen, 1, "timeout guard should win when no writer ever arrives");
    assert!(
        elapsed >= Duration::from_millis(90) && elapsed < Duration::from_millis(250),
        "timeout fired outside its expected window: {elapsed:?}"
    );
}
