// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property tests for the reference kernels.
//!
//! Inputs are small integers stored as floats, so every sum is exact and
//! results can be compared with `==`.

use blas_kernels::*;
use proptest::prelude::*;

fn matrix(rows: usize, cols: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-8i32..8).prop_map(f64::from), rows * cols)
}

fn naive(a: &[f64], b: &[f64], m: usize, n: usize, k: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            c[i * n + j] = (0..k).map(|p| a[i * k + p] * b[p * n + j]).sum();
        }
    }
    c
}

fn transpose(a: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut t = vec![0.0; a.len()];
    for i in 0..rows {
        for j in 0..cols {
            t[j * rows + i] = a[i * cols + j];
        }
    }
    t
}

fn dims() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..5, 1usize..5, 1usize..5)
}

proptest! {
    #[test]
    fn gemm_matches_naive_product(
        (m, n, k, a, b) in dims().prop_flat_map(|(m, n, k)| (Just(m), Just(n), Just(k), matrix(m, k), matrix(k, n)))
    ) {
        let mut c = vec![f64::NAN; m * n];
        gemm(
            Order::RowMajor, Transpose::NoTrans, Transpose::NoTrans, m, n, k, 1.0,
            Matrix::new(&a, 0, k), Matrix::new(&b, 0, n), 0.0, MatrixMut::new(&mut c, 0, n),
        ).unwrap();
        prop_assert_eq!(c, naive(&a, &b, m, n, k));
    }

    #[test]
    fn gemm_transpose_flags_agree_with_explicit_transpose(
        (m, n, k, a, b) in dims().prop_flat_map(|(m, n, k)| (Just(m), Just(n), Just(k), matrix(m, k), matrix(k, n)))
    ) {
        // Store Aᵀ and Bᵀ, ask gemm to transpose them back.
        let at = transpose(&a, m, k);
        let bt = transpose(&b, k, n);
        let mut c = vec![0.0; m * n];
        gemm(
            Order::RowMajor, Transpose::Trans, Transpose::Trans, m, n, k, 1.0,
            Matrix::new(&at, 0, m), Matrix::new(&bt, 0, k), 0.0, MatrixMut::new(&mut c, 0, n),
        ).unwrap();
        prop_assert_eq!(c, naive(&a, &b, m, n, k));
    }

    #[test]
    fn col_major_gemm_is_row_major_on_transposes(
        (m, n, k, a, b) in dims().prop_flat_map(|(m, n, k)| (Just(m), Just(n), Just(k), matrix(m, k), matrix(k, n)))
    ) {
        let a_cm = transpose(&a, m, k);
        let b_cm = transpose(&b, k, n);
        let mut c_cm = vec![0.0; m * n];
        gemm(
            Order::ColMajor, Transpose::NoTrans, Transpose::NoTrans, m, n, k, 1.0,
            Matrix::new(&a_cm, 0, m), Matrix::new(&b_cm, 0, k), 0.0, MatrixMut::new(&mut c_cm, 0, m),
        ).unwrap();
        prop_assert_eq!(transpose(&c_cm, n, m), naive(&a, &b, m, n, k));
    }

    #[test]
    fn gemv_is_single_column_gemm(
        (m, n, a, x) in (1usize..6, 1usize..6).prop_flat_map(|(m, n)| (Just(m), Just(n), matrix(m, n), matrix(n, 1)))
    ) {
        let mut y = vec![0.0; m];
        gemv(
            Order::RowMajor, Transpose::NoTrans, m, n, 1.0,
            Matrix::new(&a, 0, n), Strided::contiguous(&x), 0.0, StridedMut::contiguous(&mut y),
        ).unwrap();
        prop_assert_eq!(y, naive(&a, &x, m, 1, n));
    }

    #[test]
    fn syrk_matches_gemm_on_triangle(
        (n, k, a) in (1usize..5, 1usize..5).prop_flat_map(|(n, k)| (Just(n), Just(k), matrix(n, k)))
    ) {
        let mut full = vec![0.0; n * n];
        let at = transpose(&a, n, k);
        gemm(
            Order::RowMajor, Transpose::NoTrans, Transpose::NoTrans, n, n, k, 1.0,
            Matrix::new(&a, 0, k), Matrix::new(&at, 0, n), 0.0, MatrixMut::new(&mut full, 0, n),
        ).unwrap();
        let sentinel = -1234.0;
        let mut tri = vec![sentinel; n * n];
        syrk(
            Order::RowMajor, Uplo::Upper, Transpose::NoTrans, n, k, 1.0,
            Matrix::new(&a, 0, k), 0.0, MatrixMut::new(&mut tri, 0, n),
        ).unwrap();
        for i in 0..n {
            for j in 0..n {
                let expected = if j >= i { full[i * n + j] } else { sentinel };
                prop_assert_eq!(tri[i * n + j], expected);
            }
        }
    }

    #[test]
    fn rotg_produces_unit_rotation(a in -1.0e3f64..1.0e3, b in -1.0e3f64..1.0e3) {
        let g = rotg(a, b);
        prop_assert!((g.c * g.c + g.s * g.s - 1.0).abs() < 1e-12 || (a == 0.0 && b == 0.0));
        prop_assert!((-g.s * a + g.c * b).abs() <= 1e-9 * (a.abs() + b.abs()).max(1.0));
        let bigger = if a.abs() > b.abs() { a } else { b };
        prop_assert!(g.r == 0.0 || g.r.signum() == bigger.signum());
    }

    #[test]
    fn iamax_returns_first_maximum(x in prop::collection::vec(-5i32..5, 1..20)) {
        let xs: Vec<f64> = x.iter().map(|&v| f64::from(v)).collect();
        let idx = iamax(xs.len(), Strided::contiguous(&xs)).unwrap();
        let max = xs.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        prop_assert_eq!(xs[idx].abs(), max);
        prop_assert!(xs[..idx].iter().all(|v| v.abs() < max));
    }

    #[test]
    fn axpy_alpha_one_fast_path_is_bit_identical(
        pairs in prop::collection::vec((any::<f64>(), any::<f64>()), 1..16)
    ) {
        let x: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let y0: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        let mut y = y0.clone();
        axpy(x.len(), 1.0, Strided::contiguous(&x), StridedMut::contiguous(&mut y)).unwrap();
        for i in 0..x.len() {
            let general = 1.0f64 * x[i] + y0[i];
            prop_assert!(y[i].to_bits() == general.to_bits() || (y[i].is_nan() && general.is_nan()));
        }
    }
}
