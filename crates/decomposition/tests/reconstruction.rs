// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property tests: every decomposition rebuilds its input.

use array_core::ArrayView;
use decomposition::{svd, ReferenceSvd, SvdOptions, SvdProvider};
use proptest::prelude::*;

fn matrix() -> impl Strategy<Value = (usize, usize, Vec<f64>)> {
    (1usize..7, 1usize..7).prop_flat_map(|(m, n)| {
        (
            Just(m),
            Just(n),
            prop::collection::vec(-10.0f64..10.0, m * n),
        )
    })
}

/// `‖X‖_F` of a row-major slice.
fn frobenius(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}

proptest! {
    #[test]
    fn reconstruction_matches_input((m, n, data) in matrix()) {
        let a = ArrayView::from_vec([m, n], data.clone()).unwrap();
        let f = svd(&a, &SvdOptions::default()).unwrap();
        prop_assert!(f.converged);
        let back = f.reconstruct().unwrap().to_vec::<f64>().unwrap();
        let err: Vec<f64> = back.iter().zip(&data).map(|(x, y)| x - y).collect();
        prop_assert!(frobenius(&err) <= 1e-9 * frobenius(&data).max(1.0));
    }

    #[test]
    fn singular_values_sorted_and_non_negative((m, n, data) in matrix()) {
        let a = ArrayView::from_vec([m, n], data).unwrap();
        let s = svd(&a, &SvdOptions::default()).unwrap().singular_values();
        prop_assert_eq!(s.len(), m.min(n));
        prop_assert!(s.iter().all(|&v| v >= 0.0));
        prop_assert!(s.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn left_vectors_are_orthonormal((m, n, data) in matrix()) {
        let a = ArrayView::from_vec([m, n], data).unwrap();
        let f = ReferenceSvd.svd(&a, &SvdOptions::default()).unwrap();
        let k = m.min(n);
        let u = f.u.to_vec::<f64>().unwrap();
        let s = f.singular_values();
        // Columns paired with a non-zero singular value are unit length and
        // mutually orthogonal.
        for p in 0..k {
            for q in p..k {
                if s[p] < 1e-8 || s[q] < 1e-8 {
                    continue;
                }
                let d: f64 = (0..m).map(|r| u[r * k + p] * u[r * k + q]).sum();
                let expected = if p == q { 1.0 } else { 0.0 };
                prop_assert!((d - expected).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn frobenius_norm_is_preserved((m, n, data) in matrix()) {
        let a = ArrayView::from_vec([m, n], data.clone()).unwrap();
        let s = svd(&a, &SvdOptions::default()).unwrap().singular_values();
        let lhs = frobenius(&data);
        let rhs = frobenius(&s);
        prop_assert!((lhs - rhs).abs() <= 1e-9 * lhs.max(1.0));
    }
}
