//! `fair_select` distributes selections evenly across guards that are
//! ready on every round, instead of always favoring the lowest-indexed one
//! the way `pri_select` does.

use csp::alt::Alternative;
use csp::guard::Guard;
use csp::kernel::{EventBit, Kernel};
use csp_host::HostKernel;

type K = HostKernel;

/// A guard that is ready on every `enable` call, used to exercise the
/// selection algorithm itself without involving real channel timing.
struct AlwaysReady;

impl Guard<K> for AlwaysReady {
    fn enable(&mut self, _eg: &<K as Kernel>::EventGroup, _bit: EventBit) -> bool {
        true
    }

    fn disable(&mut self) -> bool {
        true
    }

    fn activate(&mut self) {}
}

const ROUNDS: usize = 1000;

#[test]
fn fair_select_alternates_between_two_always_ready_guards() {
    let mut a = AlwaysReady;
    let mut b = AlwaysReady;
    let mut guards: [&mut dyn Guard<K>; 2] = [&mut a, &mut b];
    let mut alt = Alternative::<K>::new(&mut guards).unwrap();

    let mut chosen_a = 0usize;
    let mut chosen_b = 0usize;
    for _ in 0..ROUNDS {
        match alt.fair_select() {
            0 => chosen_a += 1,
            1 => chosen_b += 1,
            other => panic!("fair_select returned out-of-range index {other}"),
        }
    }

    assert_eq!(chosen_a, ROUNDS / 2);
    assert_eq!(chosen_b, ROUNDS / 2);
}

#[test]
fn pri_select_always_favors_the_lowest_index_when_both_are_ready() {
    let mut a = AlwaysReady;
    let mut b = AlwaysReady;
    let mut guards: [&mut dyn Guard<K>; 2] = [&mut a, &mut b];
    let mut alt = Alternative::<K>::new(&mut guards).unwrap();

    for _ in 0..ROUNDS {
        assert_eq!(alt.pri_select(), 0);
    }
}
