//! A 3x3 systolic processing-element (PE) array computing `C = A * B`.
//!
//! Grounded on `csp4cmsis_matrix_multiplication/tests.cpp`'s `Feeder`/`PE`/
//! `Sink` network. Row `i` of `A` is fed in at `PE(i, 0)` and forwarded
//! unchanged eastward; column `j` of `B` is fed in at `PE(0, j)` and
//! forwarded unchanged southward. Because every hop is a blocking
//! rendezvous, the synchronous handshakes alone impose the skewed
//! systolic timing — no explicit delay bookkeeping is needed: `PE(i, j)`
//! simply accumulates the product of whatever it reads, three times, and
//! that is exactly `A[i][k] * B[k][j]` summed over `k`.

use csp::object::StaticCell;
use csp::{csp_logln, Reader, RendezvousChannel, Writer};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;

const N: usize = 3;

const A: [[i32; N]; N] = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
const B: [[i32; N]; N] = [[9, 8, 7], [6, 5, 4], [3, 2, 1]];

// A_CHANS[i][s]: s=0 feeds row i in, s=1/s=2 carry it PE(i,0)->PE(i,1)->PE(i,2).
static A_CHANS: [[StaticCell<Chan>; N]; N] = [
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
];
// B_CHANS[j][s]: s=0 feeds column j in, s=1/s=2 carry it PE(0,j)->PE(1,j)->PE(2,j).
static B_CHANS: [[StaticCell<Chan>; N]; N] = [
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
];
static RESULT_CHANS: [[StaticCell<Chan>; N]; N] = [
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
];

fn pe(
    mut a_in: Reader<'static, i32, K>,
    mut a_out: Option<Writer<'static, i32, K>>,
    mut b_in: Reader<'static, i32, K>,
    mut b_out: Option<Writer<'static, i32, K>>,
    mut result: Writer<'static, i32, K>,
) {
    let mut acc = 0;
    for _ in 0..N {
        let a = a_in.read();
        let b = b_in.read();
        acc += a * b;
        if let Some(w) = a_out.as_mut() {
            w.write(a);
        }
        if let Some(w) = b_out.as_mut() {
            w.write(b);
        }
    }
    result.write(acc);
}

fn feeder_row(row: usize, mut output: Writer<'static, i32, K>) {
    for k in 0..N {
        output.write(A[row][k]);
    }
}

fn feeder_col(col: usize, mut output: Writer<'static, i32, K>) {
    for k in 0..N {
        output.write(B[k][col]);
    }
}

fn main() {
    csp_host::ensure_stderr_log_sink();

    let mut a_splits: [[Option<(Reader<'static, i32, K>, Writer<'static, i32, K>)>; N]; N] =
        Default::default();
    let mut b_splits: [[Option<(Reader<'static, i32, K>, Writer<'static, i32, K>)>; N]; N] =
        Default::default();
    let mut result_splits: [[Option<(Reader<'static, i32, K>, Writer<'static, i32, K>)>; N]; N] =
        Default::default();

    for i in 0..N {
        for s in 0..N {
            a_splits[i][s] = Some(A_CHANS[i][s].init_with(Chan::new).split());
            b_splits[i][s] = Some(B_CHANS[i][s].init_with(Chan::new).split());
            result_splits[i][s] = Some(RESULT_CHANS[i][s].init_with(Chan::new).split());
        }
    }

    let mut pe_handles = Vec::with_capacity(N * N);
    let mut row_feeders = Vec::with_capacity(N);
    let mut col_feeders = Vec::with_capacity(N);
    let mut result_readers: Vec<Vec<Reader<'static, i32, K>>> =
        (0..N).map(|_| Vec::with_capacity(N)).collect();

    for i in 0..N {
        let (_, feed_a_writer) = a_splits[i][0].take().unwrap();
        row_feeders.push((i, feed_a_writer));
        let (_, feed_b_writer) = b_splits[i][0].take().unwrap();
        col_feeders.push((i, feed_b_writer));
    }

    for i in 0..N {
        for j in 0..N {
            let (a_in, _) = a_splits[i][j].take().unwrap();
            let a_out = if j + 1 < N {
                Some(a_splits[i][j + 1].take().unwrap().1)
            } else {
                None
            };
            let (b_in, _) = b_splits[j][i].take().unwrap();
            let b_out = if i + 1 < N {
                Some(b_splits[j][i + 1].take().unwrap().1)
            } else {
                None
            };
            let (result_reader, result_writer) = result_splits[i][j].take().unwrap();
            result_readers[i].push(result_reader);

            pe_handles.push(<K as csp::Kernel>::spawn(32 * 1024, move || {
                pe(a_in, a_out, b_in, b_out, result_writer)
            }));
        }
    }

    for (row, writer) in row_feeders {
        pe_handles.push(<K as csp::Kernel>::spawn(32 * 1024, move || {
            feeder_row(row, writer)
        }));
    }
    for (col, writer) in col_feeders {
        pe_handles.push(<K as csp::Kernel>::spawn(32 * 1024, move || {
            feeder_col(col, writer)
        }));
    }

    let mut c = [[0i32; N]; N];
    for (i, row) in result_readers.iter_mut().enumerate() {
        for (j, reader) in row.iter_mut().enumerate() {
            c[i][j] = reader.read();
        }
    }

    let expected = [[30, 24, 18], [84, 69, 54], [138, 114, 90]];
    assert_eq!(c, expected, "systolic array produced an unexpected product");
    csp_logln!("systolic: C = {:?}", c);

    for h in pe_handles {
        let _ = h.join();
    }
}
