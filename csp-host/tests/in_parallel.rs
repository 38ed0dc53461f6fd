//! `in_parallel!` blocks the caller until every spawned process has
//! returned, rather than handing back immediately with unjoined handles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use csp::in_parallel;
use csp_host::HostKernel;

type K = HostKernel;

#[test]
fn waits_for_every_process_to_terminate() {
    let done = Arc::new(AtomicUsize::new(0));
    let a = done.clone();
    let b = done.clone();
    let c = done.clone();

    in_parallel!(K; 32 * 1024;
        move || {
            thread::sleep(Duration::from_millis(30));
            a.fetch_add(1, Ordering::SeqCst);
        },
        move || {
            thread::sleep(Duration::from_millis(60));
            b.fetch_add(1, Ordering::SeqCst);
        },
        move || {
            c.fetch_add(1, Ordering::SeqCst);
        },
    );

    // If `in_parallel!` returned before every process finished, this would
    // observe fewer than 3 — in particular the slowest (60ms) process.
    assert_eq!(done.load(Ordering::SeqCst), 3);
}
