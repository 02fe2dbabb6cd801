// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Level 2: matrix-vector routines.

use crate::{BlasFloat, KernelError, Matrix, Order, Strided, StridedMut, Transpose};

/// General matrix-vector product `y := alpha·op(A)·x + beta·y`.
///
/// `A` is stored `m × n` in `order`; `op(A)` is `A` or `Aᵀ` per `trans`, so
/// `x` has `n` entries and `y` has `m` (or the reverse when transposed).
///
/// With `beta == 0` the prior contents of `y` are never read, so NaN or
/// garbage in `y` cannot leak into the result. With `alpha == 0` neither `A`
/// nor `x` is read, but both are still validated before `y` is written.
#[allow(clippy::too_many_arguments)]
pub fn gemv<T: BlasFloat>(
    order: Order,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: Matrix<'_, T>,
    x: Strided<'_, T>,
    beta: T,
    mut y: StridedMut<'_, T>,
) -> Result<(), KernelError> {
    let (rows, cols) = if trans.is_transposed() { (n, m) } else { (m, n) };
    if rows == 0 {
        return Ok(());
    }
    y.check("gemv", "y", rows)?;
    x.check("gemv", "x", cols)?;
    let access = a.access("gemv", "A", order, trans, rows, cols)?;
    let acc = (alpha != T::zero() && cols > 0).then_some(access);

    for i in 0..rows {
        let prior = if beta == T::zero() {
            T::zero()
        } else {
            beta * y.at(i)
        };
        let product = match acc {
            Some(acc) => {
                let sum = (0..cols).fold(T::zero(), |s, j| s + a.data[acc.index(i, j)] * x.at(j));
                alpha * sum
            }
            None => T::zero(),
        };
        *y.at_mut(i) = prior + product;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // A = [[1, 2], [3, 4]], x = [1, 1].
    const A: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

    #[test]
    fn test_gemv_row_major() {
        let x = [1.0, 1.0];
        let mut y = [0.0; 2];
        gemv(
            Order::RowMajor,
            Transpose::NoTrans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Strided::contiguous(&x),
            0.0,
            StridedMut::contiguous(&mut y),
        )
        .unwrap();
        assert_eq!(y, [3.0, 7.0]);
    }

    #[test]
    fn test_gemv_transposed_equals_col_major() {
        let x = [1.0, 1.0];
        let mut t = [0.0; 2];
        let mut c = [0.0; 2];
        gemv(
            Order::RowMajor,
            Transpose::Trans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Strided::contiguous(&x),
            0.0,
            StridedMut::contiguous(&mut t),
        )
        .unwrap();
        gemv(
            Order::ColMajor,
            Transpose::NoTrans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Strided::contiguous(&x),
            0.0,
            StridedMut::contiguous(&mut c),
        )
        .unwrap();
        assert_eq!(t, [4.0, 6.0]);
        assert_eq!(t, c);
    }

    #[test]
    fn test_gemv_beta_zero_ignores_nan() {
        let x = [1.0, 1.0];
        let mut y = [f64::NAN, f64::NAN];
        gemv(
            Order::RowMajor,
            Transpose::NoTrans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Strided::contiguous(&x),
            0.0,
            StridedMut::contiguous(&mut y),
        )
        .unwrap();
        assert_eq!(y, [3.0, 7.0]);
    }

    #[test]
    fn test_gemv_alpha_zero_skips_reads() {
        // NaN in A and x never reaches y when alpha == 0.
        let a = [f64::NAN; 6];
        let x = [f64::NAN; 3];
        let mut y = [1.0, 2.0];
        gemv(
            Order::RowMajor,
            Transpose::NoTrans,
            2,
            3,
            0.0,
            Matrix::new(&a, 0, 3),
            Strided::contiguous(&x),
            2.0,
            StridedMut::contiguous(&mut y),
        )
        .unwrap();
        assert_eq!(y, [2.0, 4.0]);
    }

    #[test]
    fn test_gemv_alpha_zero_still_validates_a() {
        let short = [0.0f64];
        let x = [1.0, 1.0];
        let mut y = [1.0, 2.0];
        let err = gemv(
            Order::RowMajor,
            Transpose::NoTrans,
            2,
            2,
            0.0,
            Matrix::new(&short, 0, 2),
            Strided::contiguous(&x),
            0.0,
            StridedMut::contiguous(&mut y),
        );
        assert!(matches!(
            err,
            Err(KernelError::BufferTooSmall { operand: "A", .. })
        ));
        assert_eq!(y, [1.0, 2.0]);
    }

    #[test]
    fn test_gemv_short_y_rejected_untouched() {
        let x = [1.0, 1.0];
        let mut y = [9.0];
        let err = gemv(
            Order::RowMajor,
            Transpose::NoTrans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Strided::contiguous(&x),
            0.0,
            StridedMut::contiguous(&mut y),
        );
        assert!(err.is_err());
        assert_eq!(y, [9.0]);
    }
}
