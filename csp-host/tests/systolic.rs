//! A 3x3 systolic PE array computes the correct matrix product.
//!
//! Grounded on `csp4cmsis_matrix_multiplication/tests.cpp`.

use csp::object::StaticCell;
use csp::{Kernel, Reader, RendezvousChannel, Writer};
use csp_host::HostKernel;

type K = HostKernel;
type Chan = RendezvousChannel<i32, K>;

const N: usize = 3;

const A: [[i32; N]; N] = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
const B: [[i32; N]; N] = [[9, 8, 7], [6, 5, 4], [3, 2, 1]];

static A_CHANS: [[StaticCell<Chan>; N]; N] = [
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
    [StaticCell::new(), StaticCell::new(), StaticCell::new()],
];
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

#[test]
fn product_matches_scalar_reference() {
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

    let mut pe_handles = Vec::with_capacity(N * N + 2 * N);
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

            pe_handles.push(K::spawn(32 * 1024, move || {
                pe(a_in, a_out, b_in, b_out, result_writer)
            }));
        }
    }

    for (row, writer) in row_feeders {
        pe_handles.push(K::spawn(32 * 1024, move || feeder_row(row, writer)));
    }
    for (col, writer) in col_feeders {
        pe_handles.push(K::spawn(32 * 1024, move || feeder_col(col, writer)));
    }

    let mut c = [[0i32; N]; N];
    for (i, row) in result_readers.iter_mut().enumerate() {
        for (j, reader) in row.iter_mut().enumerate() {
            c[i][j] = reader.read();
        }
    }

    let mut expected = [[0i32; N]; N];
    for i in 0..N {
        for j in 0..N {
            expected[i][j] = (0..N).map(|k| A[i][k] * B[k][j]).sum();
        }
    }

    assert_eq!(c, expected);

    for h in pe_handles {
        h.join().unwrap();
    }
}
