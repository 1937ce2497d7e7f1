extern crate ndarray;
extern crate ndarray_linalg;

use ndarray::*;

use std::ops::MulAssign;

///Scales row i of `a` by `b[i]`.
pub fn scale_rows(a : ArrayView2<f64>, b : ArrayView1<f64>) -> Array2<f64> {
    let mut result = a.to_owned();
    let n = a.shape()[0];
    for i in 0..n {
        let scale = b[[i,]];
        let mut row = result.row_mut(i);
        row.mul_assign(scale);
    }
    result
}

///Index of the largest entry of `v`. Ties resolve to the earliest index.
pub fn argmax(v : ArrayView1<f64>) -> usize {
    let mut result = 0;
    for i in 1..v.shape()[0] {
        if v[[i,]] > v[[result,]] {
            result = i;
        }
    }
    result
}
