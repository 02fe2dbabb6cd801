// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Level 3: matrix-matrix routines.

use crate::layout::Access;
use crate::{BlasFloat, KernelError, Matrix, MatrixMut, Order, Side, Transpose, Uplo};

/// General matrix multiply `C := alpha·op(A)·op(B) + beta·C`.
///
/// `op(A)` is `m × k`, `op(B)` is `k × n`, `C` is `m × n`. The transpose
/// flags are independent; `beta == 0` overwrites `C` without reading it.
/// Every operand is validated even when `alpha == 0` or `k == 0` leaves
/// `A` and `B` unread.
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: BlasFloat>(
    order: Order,
    trans_a: Transpose,
    trans_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: Matrix<'_, T>,
    b: Matrix<'_, T>,
    beta: T,
    c: MatrixMut<'_, T>,
) -> Result<(), KernelError> {
    if m == 0 || n == 0 {
        return Ok(());
    }
    let ca = c.access("gemm", "C", order, m, n)?;
    let aa = a.access("gemm", "A", order, trans_a, m, k)?;
    let ba = b.access("gemm", "B", order, trans_b, k, n)?;
    let reads_ab = alpha != T::zero() && k > 0;
    scale_block(c.data, ca, m, n, beta, |_, _| true);
    if reads_ab {
        accumulate(alpha, a.data, aa, b.data, ba, c.data, ca, m, n, k);
    }
    Ok(())
}

/// `C := beta·C` over the `(i, j)` positions `keep` selects.
fn scale_block<T: BlasFloat>(
    c: &mut [T],
    ca: Access,
    m: usize,
    n: usize,
    beta: T,
    keep: impl Fn(usize, usize) -> bool,
) {
    if beta == T::one() {
        return;
    }
    for i in 0..m {
        for j in (0..n).filter(|&j| keep(i, j)) {
            let slot = &mut c[ca.index(i, j)];
            *slot = if beta == T::zero() { T::zero() } else { beta * *slot };
        }
    }
}

/// `C += alpha·A·B` in i-p-j order so the innermost loop walks a row of C.
#[allow(clippy::too_many_arguments)]
fn accumulate<T: BlasFloat>(
    alpha: T,
    a: &[T],
    aa: Access,
    b: &[T],
    ba: Access,
    c: &mut [T],
    ca: Access,
    m: usize,
    n: usize,
    k: usize,
) {
    for i in 0..m {
        for p in 0..k {
            let a_ip = alpha * a[aa.index(i, p)];
            for j in 0..n {
                c[ca.index(i, j)] = c[ca.index(i, j)] + a_ip * b[ba.index(p, j)];
            }
        }
    }
}

/// Symmetric matrix multiply.
///
/// `Side::Left`: `C := alpha·A·B + beta·C` with `A` `m × m`.
/// `Side::Right`: `C := alpha·B·A + beta·C` with `A` `n × n`.
/// Only the `uplo` triangle of `A` is read; the other half is mirrored.
#[allow(clippy::too_many_arguments)]
pub fn symm<T: BlasFloat>(
    order: Order,
    side: Side,
    uplo: Uplo,
    m: usize,
    n: usize,
    alpha: T,
    a: Matrix<'_, T>,
    b: Matrix<'_, T>,
    beta: T,
    c: MatrixMut<'_, T>,
) -> Result<(), KernelError> {
    if m == 0 || n == 0 {
        return Ok(());
    }
    let ca = c.access("symm", "C", order, m, n)?;
    let dim = match side {
        Side::Left => m,
        Side::Right => n,
    };
    let aa = a.access("symm", "A", order, Transpose::NoTrans, dim, dim)?;
    let ba = b.access("symm", "B", order, Transpose::NoTrans, m, n)?;
    scale_block(c.data, ca, m, n, beta, |_, _| true);
    if alpha == T::zero() {
        return Ok(());
    }
    let sym = |i: usize, j: usize| {
        if uplo.contains(i, j) {
            a.data[aa.index(i, j)]
        } else {
            a.data[aa.index(j, i)]
        }
    };
    for i in 0..m {
        for j in 0..n {
            let sum = match side {
                Side::Left => (0..m).fold(T::zero(), |s, p| s + sym(i, p) * b.data[ba.index(p, j)]),
                Side::Right => (0..n).fold(T::zero(), |s, p| s + b.data[ba.index(i, p)] * sym(p, j)),
            };
            let slot = &mut c.data[ca.index(i, j)];
            *slot = *slot + alpha * sum;
        }
    }
    Ok(())
}

/// Symmetric rank-k update, touching only the `uplo` triangle of `C`.
///
/// `NoTrans`: `C := alpha·A·Aᵀ + beta·C` with `A` `n × k`.
/// `Trans`: `C := alpha·Aᵀ·A + beta·C` with `A` `k × n`.
#[allow(clippy::too_many_arguments)]
pub fn syrk<T: BlasFloat>(
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: Matrix<'_, T>,
    beta: T,
    c: MatrixMut<'_, T>,
) -> Result<(), KernelError> {
    if n == 0 {
        return Ok(());
    }
    let ca = c.access("syrk", "C", order, n, n)?;
    let aa = a.access("syrk", "A", order, trans, n, k)?;
    scale_block(c.data, ca, n, n, beta, |i, j| uplo.contains(i, j));
    if alpha == T::zero() || k == 0 {
        return Ok(());
    }
    for i in 0..n {
        for j in (0..n).filter(|&j| uplo.contains(i, j)) {
            let sum = (0..k).fold(T::zero(), |s, p| {
                s + a.data[aa.index(i, p)] * a.data[aa.index(j, p)]
            });
            let slot = &mut c.data[ca.index(i, j)];
            *slot = *slot + alpha * sum;
        }
    }
    Ok(())
}

/// Symmetric rank-2k update, touching only the `uplo` triangle of `C`.
///
/// `NoTrans`: `C := alpha·(A·Bᵀ + B·Aᵀ) + beta·C` with `A`, `B` `n × k`.
/// `Trans`: `C := alpha·(Aᵀ·B + Bᵀ·A) + beta·C` with `A`, `B` `k × n`.
#[allow(clippy::too_many_arguments)]
pub fn syr2k<T: BlasFloat>(
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: Matrix<'_, T>,
    b: Matrix<'_, T>,
    beta: T,
    c: MatrixMut<'_, T>,
) -> Result<(), KernelError> {
    if n == 0 {
        return Ok(());
    }
    let ca = c.access("syr2k", "C", order, n, n)?;
    let aa = a.access("syr2k", "A", order, trans, n, k)?;
    let ba = b.access("syr2k", "B", order, trans, n, k)?;
    scale_block(c.data, ca, n, n, beta, |i, j| uplo.contains(i, j));
    if alpha == T::zero() || k == 0 {
        return Ok(());
    }
    for i in 0..n {
        for j in (0..n).filter(|&j| uplo.contains(i, j)) {
            let sum = (0..k).fold(T::zero(), |s, p| {
                s + a.data[aa.index(i, p)] * b.data[ba.index(j, p)]
                    + b.data[ba.index(i, p)] * a.data[aa.index(j, p)]
            });
            let slot = &mut c.data[ca.index(i, j)];
            *slot = *slot + alpha * sum;
        }
    }
    Ok(())
}

/// Cartesian batched multiply: `C[a·q + b] := alpha·A[a]·B[b]` for every
/// `(a, b)` in `0..p × 0..q`.
///
/// Batch `a` of `A` starts `a·stride_a` elements past `A.offset` and is
/// `m × k`; batch `b` of `B` starts `b·stride_b` past `B.offset` and is
/// `k × n`. The `p·q` output blocks are `stride_c` apart and are overwritten.
/// This is the product of *every* pair, not an aligned batch.
#[allow(clippy::too_many_arguments)]
pub fn gemm3<T: BlasFloat>(
    order: Order,
    p: usize,
    q: usize,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: Matrix<'_, T>,
    stride_a: usize,
    b: Matrix<'_, T>,
    stride_b: usize,
    c: MatrixMut<'_, T>,
    stride_c: usize,
) -> Result<(), KernelError> {
    if p == 0 || q == 0 || m == 0 || n == 0 {
        return Ok(());
    }
    // Validating the last batch of each operand covers all earlier ones.
    let last_c = MatrixMut {
        data: &mut *c.data,
        offset: c.offset + (p * q - 1) * stride_c,
        ld: c.ld,
    };
    last_c.access("gemm3", "C", order, m, n)?;
    let ca = c.access("gemm3", "C", order, m, n)?;
    let last_a = Matrix::new(a.data, a.offset + (p - 1) * stride_a, a.ld);
    let last_b = Matrix::new(b.data, b.offset + (q - 1) * stride_b, b.ld);
    last_a.access("gemm3", "A", order, Transpose::NoTrans, m, k)?;
    last_b.access("gemm3", "B", order, Transpose::NoTrans, k, n)?;
    let aa = a.access("gemm3", "A", order, Transpose::NoTrans, m, k)?;
    let ba = b.access("gemm3", "B", order, Transpose::NoTrans, k, n)?;
    let reads_ab = alpha != T::zero() && k > 0;
    for ia in 0..p {
        for ib in 0..q {
            let block = ca.shifted((ia * q + ib) * stride_c);
            scale_block(c.data, block, m, n, T::zero(), |_, _| true);
            if reads_ab {
                accumulate(
                    alpha,
                    a.data,
                    aa.shifted(ia * stride_a),
                    b.data,
                    ba.shifted(ib * stride_b),
                    c.data,
                    block,
                    m,
                    n,
                    k,
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
    const B: [f64; 4] = [5.0, 6.0, 7.0, 8.0];

    fn gemm_2x2(order: Order, ta: Transpose, tb: Transpose) -> [f64; 4] {
        let mut c = [f64::NAN; 4];
        gemm(
            order,
            ta,
            tb,
            2,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Matrix::new(&B, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        )
        .unwrap();
        c
    }

    #[test]
    fn test_gemm_all_transpose_combinations() {
        use Transpose::{NoTrans, Trans};
        // A·B, Aᵀ·B, A·Bᵀ, Aᵀ·Bᵀ in row-major.
        assert_eq!(gemm_2x2(Order::RowMajor, NoTrans, NoTrans), [19.0, 22.0, 43.0, 50.0]);
        assert_eq!(gemm_2x2(Order::RowMajor, Trans, NoTrans), [26.0, 30.0, 38.0, 44.0]);
        assert_eq!(gemm_2x2(Order::RowMajor, NoTrans, Trans), [17.0, 23.0, 39.0, 53.0]);
        assert_eq!(gemm_2x2(Order::RowMajor, Trans, Trans), [23.0, 31.0, 34.0, 46.0]);
    }

    #[test]
    fn test_gemm_col_major_is_transposed_row_major() {
        use Transpose::{NoTrans, Trans};
        // Column-major reading of the same data is the transpose, and the
        // result is written column-major too: (Aᵀ·Bᵀ)ᵀ = B·A.
        assert_eq!(gemm_2x2(Order::ColMajor, NoTrans, NoTrans), [23.0, 34.0, 31.0, 46.0]);
        assert_eq!(
            gemm_2x2(Order::ColMajor, Trans, Trans),
            [19.0, 43.0, 22.0, 50.0]
        );
    }

    #[test]
    fn test_gemm_beta_accumulates() {
        let mut c = [1.0; 4];
        gemm(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            2,
            2.0,
            Matrix::new(&A, 0, 2),
            Matrix::new(&B, 0, 2),
            -1.0,
            MatrixMut::new(&mut c, 0, 2),
        )
        .unwrap();
        assert_eq!(c, [37.0, 43.0, 85.0, 99.0]);
    }

    #[test]
    fn test_gemm_rectangular() {
        // [2x3] · [3x2], the classic fixture.
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0f32, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut c = [0.0f32; 4];
        gemm(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            3,
            1.0,
            Matrix::new(&a, 0, 3),
            Matrix::new(&b, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        )
        .unwrap();
        assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_gemm_bad_ldc_leaves_c_untouched() {
        let mut c = [7.0; 4];
        let err = gemm(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Matrix::new(&B, 0, 1),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        );
        assert!(matches!(err, Err(KernelError::InvalidArgument { .. })));
        assert_eq!(c, [7.0; 4]);
    }

    #[test]
    fn test_symm_reads_one_triangle() {
        // Upper triangle holds the symmetric matrix [[2, 1], [1, 3]];
        // the lower entry is garbage that must never be read.
        let a = [2.0, 1.0, f64::NAN, 3.0];
        let b = [1.0, 0.0, 0.0, 1.0];
        let mut left = [0.0; 4];
        symm(
            Order::RowMajor,
            Side::Left,
            Uplo::Upper,
            2,
            2,
            1.0,
            Matrix::new(&a, 0, 2),
            Matrix::new(&b, 0, 2),
            0.0,
            MatrixMut::new(&mut left, 0, 2),
        )
        .unwrap();
        assert_eq!(left, [2.0, 1.0, 1.0, 3.0]);

        let bb = [1.0, 2.0];
        let mut right = [0.0; 2];
        symm(
            Order::RowMajor,
            Side::Right,
            Uplo::Upper,
            1,
            2,
            1.0,
            Matrix::new(&a, 0, 2),
            Matrix::new(&bb, 0, 2),
            0.0,
            MatrixMut::new(&mut right, 0, 2),
        )
        .unwrap();
        assert_eq!(right, [4.0, 7.0]);
    }

    #[test]
    fn test_syrk_writes_only_triangle() {
        // A = [[1, 2], [3, 4]]: A·Aᵀ = [[5, 11], [11, 25]].
        let mut c = [-1.0; 4];
        syrk(
            Order::RowMajor,
            Uplo::Lower,
            Transpose::NoTrans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        )
        .unwrap();
        assert_eq!(c, [5.0, -1.0, 11.0, 25.0]);

        // Aᵀ·A = [[10, 14], [14, 20]].
        let mut u = [0.0; 4];
        syrk(
            Order::RowMajor,
            Uplo::Upper,
            Transpose::Trans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            0.0,
            MatrixMut::new(&mut u, 0, 2),
        )
        .unwrap();
        assert_eq!(u, [10.0, 14.0, 0.0, 20.0]);
    }

    #[test]
    fn test_syr2k() {
        // A·Bᵀ + B·Aᵀ with A, B above: [[34, 62], [62, 106]].
        let mut c = [0.0; 4];
        syr2k(
            Order::RowMajor,
            Uplo::Upper,
            Transpose::NoTrans,
            2,
            2,
            1.0,
            Matrix::new(&A, 0, 2),
            Matrix::new(&B, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        )
        .unwrap();
        assert_eq!(c, [34.0, 62.0, 0.0, 106.0]);
    }

    #[test]
    fn test_gemm3_cartesian() {
        // Two 1x1 "matrices" on each side: C is the outer product.
        let a = [2.0f64, 3.0];
        let b = [5.0f64, 7.0];
        let mut c = [0.0f64; 4];
        gemm3(
            Order::RowMajor,
            2,
            2,
            1,
            1,
            1,
            1.0,
            Matrix::new(&a, 0, 1),
            1,
            Matrix::new(&b, 0, 1),
            1,
            MatrixMut::new(&mut c, 0, 1),
            1,
        )
        .unwrap();
        assert_eq!(c, [10.0, 14.0, 15.0, 21.0]);
    }

    #[test]
    fn test_gemm3_matches_gemm_per_pair() {
        let a = [1.0f64, 2.0, 3.0, 4.0, 0.5, -1.0, 2.0, 0.0];
        let b = [5.0f64, 6.0, 7.0, 8.0];
        let mut c = [f64::NAN; 8];
        gemm3(
            Order::RowMajor,
            2,
            1,
            2,
            2,
            2,
            1.0,
            Matrix::new(&a, 0, 2),
            4,
            Matrix::new(&b, 0, 2),
            4,
            MatrixMut::new(&mut c, 0, 2),
            4,
        )
        .unwrap();
        assert_eq!(&c[..4], &[19.0, 22.0, 43.0, 50.0]);
        assert_eq!(&c[4..], &[-4.5, -5.0, 10.0, 12.0]);
    }

    #[test]
    fn test_gemm3_short_output_rejected() {
        let a = [1.0f64; 2];
        let b = [1.0f64; 2];
        let mut c = [0.0f64; 3];
        let err = gemm3(
            Order::RowMajor,
            2,
            2,
            1,
            1,
            1,
            1.0,
            Matrix::new(&a, 0, 1),
            1,
            Matrix::new(&b, 0, 1),
            1,
            MatrixMut::new(&mut c, 0, 1),
            1,
        );
        assert!(matches!(err, Err(KernelError::BufferTooSmall { operand: "C", .. })));
        assert_eq!(c, [0.0; 3]);
    }

    #[test]
    fn test_gemm_alpha_zero_still_validates_operands() {
        let short = [0.0f64];
        let mut c = [9.0f64; 4];
        let err = gemm(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            2,
            0.0,
            Matrix::new(&short, 0, 2),
            Matrix::new(&short, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        );
        assert!(matches!(
            err,
            Err(KernelError::BufferTooSmall { operand: "A", .. })
        ));
        assert_eq!(c, [9.0; 4]);
    }

    #[test]
    fn test_rank_updates_alpha_zero_still_validate() {
        let short = [0.0f64];
        let mut c = [9.0f64; 4];
        let err = syrk(
            Order::RowMajor,
            Uplo::Upper,
            Transpose::NoTrans,
            2,
            2,
            0.0,
            Matrix::new(&short, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        );
        assert!(err.is_err());
        let err = syr2k(
            Order::RowMajor,
            Uplo::Lower,
            Transpose::NoTrans,
            2,
            2,
            0.0,
            Matrix::new(&A, 0, 2),
            Matrix::new(&short, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        );
        assert!(matches!(
            err,
            Err(KernelError::BufferTooSmall { operand: "B", .. })
        ));
        assert_eq!(c, [9.0; 4]);
    }

    #[test]
    fn test_gemm3_alpha_zero_still_validates_last_batch() {
        let a = [1.0f64; 2];
        let b = [1.0f64];
        let mut c = [9.0f64; 4];
        let err = gemm3(
            Order::RowMajor,
            2,
            2,
            1,
            1,
            1,
            0.0,
            Matrix::new(&a, 0, 1),
            1,
            Matrix::new(&b, 0, 1),
            1,
            MatrixMut::new(&mut c, 0, 1),
            1,
        );
        assert!(matches!(
            err,
            Err(KernelError::BufferTooSmall { operand: "B", .. })
        ));
        assert_eq!(c, [9.0; 4]);
    }

    #[test]
    fn test_gemm_zero_inner_dimension_overwrites_c() {
        let empty: [f64; 0] = [];
        let mut c = [f64::NAN; 4];
        gemm(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            0,
            1.0,
            Matrix::new(&empty, 0, 1),
            Matrix::new(&empty, 0, 2),
            0.0,
            MatrixMut::new(&mut c, 0, 2),
        )
        .unwrap();
        assert_eq!(c, [0.0; 4]);
    }
}
