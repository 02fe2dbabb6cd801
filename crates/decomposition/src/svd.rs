// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Singular value decomposition.
//!
//! The classic one-sided Golub-Kahan-Reinsch scheme:
//!
//! ```text
//!   A (m×n, m ≥ n)
//!     │  Householder reflections from the left and right
//!     ▼
//!   upper bidiagonal (w on the diagonal, rv1 above it)
//!     │  accumulate right reflections into V, left ones into U
//!     ▼
//!   implicit-shift QR sweeps on the bidiagonal, Givens rotations
//!   applied to U and V in lock-step, until every rv1 entry deflates
//!     │
//!     ▼
//!   sign fix-up, then sort descending
//! ```

use std::ops::{Index, IndexMut};

use array_core::{ArrayError, ArrayView, DType, Shape};
use blas_kernels::{Matrix, MatrixMut, Order, Transpose};
use tracing::{debug, warn};

use crate::DecompError;

/// Machine epsilon used for the deflation tests.
pub const EPSILON: f64 = 2.22045e-16;

/// Default sweep limit per singular value.
pub const DEFAULT_MAX_SWEEPS: usize = 30;

/// Knobs for an SVD call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvdOptions {
    /// QR sweeps allowed per singular value before giving up. Must be at
    /// least 1.
    pub max_sweeps: usize,
    /// Fail with [`DecompError::NoConvergence`] instead of returning the
    /// last iterate.
    pub strict: bool,
}

impl Default for SvdOptions {
    fn default() -> Self {
        Self {
            max_sweeps: DEFAULT_MAX_SWEEPS,
            strict: false,
        }
    }
}

/// The factors `A = U·diag(S)·VT`, with `k = min(m, n)`.
#[derive(Debug, Clone)]
pub struct Svd {
    /// `m × k` left singular vectors.
    pub u: ArrayView,
    /// `k` singular values, descending and non-negative.
    pub s: ArrayView,
    /// `k × n` right singular vectors, transposed.
    pub vt: ArrayView,
    /// `false` if some singular value hit the sweep limit.
    pub converged: bool,
    /// Largest number of sweeps any single singular value needed.
    pub sweeps: usize,
}

impl Svd {
    /// The singular values as a plain vector.
    pub fn singular_values(&self) -> Vec<f64> {
        self.s.to_vec::<f64>().unwrap_or_default()
    }

    /// Number of singular values that are still non-zero after rounding to
    /// four decimals.
    pub fn numerical_rank(&self) -> usize {
        self.singular_values()
            .iter()
            .filter(|&&s| (s * 1.0e4).round() / 1.0e4 > 0.0)
            .count()
    }

    /// Smallest number of leading singular values whose sum reaches `mass`
    /// (a fraction in `[0, 1]`) of the total.
    pub fn truncation_index(&self, mass: f64) -> usize {
        let s = self.singular_values();
        let total: f64 = s.iter().sum();
        if total <= 0.0 {
            return 0;
        }
        let target = mass.clamp(0.0, 1.0) * total;
        let mut acc = 0.0;
        for (i, v) in s.iter().enumerate() {
            if acc >= target {
                return i;
            }
            acc += v;
        }
        s.len()
    }

    /// Rebuilds `U·diag(S)·VT` as an `m × n` `F64` array.
    pub fn reconstruct(&self) -> Result<ArrayView, DecompError> {
        let (m, k) = (self.u.dims()[0], self.u.dims()[1]);
        let n = self.vt.dims()[1];
        let s = self.singular_values();
        let mut us = self.u.to_vec::<f64>()?;
        for row in us.chunks_mut(k.max(1)) {
            for (x, sv) in row.iter_mut().zip(&s) {
                *x *= sv;
            }
        }
        let vt = self.vt.to_vec::<f64>()?;
        let mut out = vec![0.0; m * n];
        blas_kernels::gemm(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            m,
            n,
            k,
            1.0,
            Matrix::new(&us, 0, k.max(1)),
            Matrix::new(&vt, 0, n.max(1)),
            0.0,
            MatrixMut::new(&mut out, 0, n.max(1)),
        )?;
        Ok(ArrayView::from_vec([m, n], out)?)
    }
}

/// A source of singular value decompositions.
pub trait SvdProvider: Send + Sync {
    fn name(&self) -> &str {
        "reference"
    }

    /// `true` for hardware-accelerated backends.
    fn is_accelerated(&self) -> bool {
        false
    }

    /// Decomposes a real rank-2 array.
    fn svd(&self, a: &ArrayView, options: &SvdOptions) -> Result<Svd, DecompError>;
}

/// The pure-software decomposition in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceSvd;

impl SvdProvider for ReferenceSvd {
    fn svd(&self, a: &ArrayView, options: &SvdOptions) -> Result<Svd, DecompError> {
        svd(a, options)
    }
}

/// Decomposes `a` with the reference algorithm.
///
/// Any real dtype is accepted and computed in `f64`. Complex input is
/// [`ArrayError::UnsupportedDtype`], any rank other than 2 is
/// [`ArrayError::ShapeMismatch`]. A zero sweep limit is
/// [`DecompError::InvalidOptions`].
///
/// # Examples
/// ```
/// use array_core::ArrayView;
/// use decomposition::{svd, SvdOptions};
/// let a = ArrayView::from_vec([2, 2], vec![3.0f64, 0.0, 0.0, -2.0]).unwrap();
/// let f = svd(&a, &SvdOptions::default()).unwrap();
/// assert_eq!(f.singular_values(), vec![3.0, 2.0]);
/// ```
pub fn svd(a: &ArrayView, options: &SvdOptions) -> Result<Svd, DecompError> {
    if options.max_sweeps == 0 {
        return Err(DecompError::InvalidOptions(
            "max_sweeps must be at least 1".to_string(),
        ));
    }
    if a.dtype().is_complex() {
        return Err(ArrayError::UnsupportedDtype {
            op: "svd",
            dtype: a.dtype(),
        }
        .into());
    }
    if a.rank() != 2 {
        return Err(ArrayError::ShapeMismatch {
            op: "svd",
            lhs: a.shape().clone(),
            rhs: Shape::matrix(0, 0),
        }
        .into());
    }
    let (m, n) = (a.dims()[0], a.dims()[1]);
    let values: Vec<f64> = a.scalars().iter().map(|s| s.as_f64()).collect();
    let input = Dense::from_vec(m, n, values);
    debug!(m, n, "svd");

    let tall = m >= n;
    let work = if tall { input } else { input.transposed() };
    let mut outcome = golub_kahan(work, options.max_sweeps);

    if let Some(index) = outcome.stalled {
        warn!(
            index,
            sweeps = options.max_sweeps,
            "svd did not converge; keeping last iterate"
        );
        if options.strict {
            return Err(DecompError::NoConvergence {
                index,
                sweeps: options.max_sweeps,
            });
        }
    }
    fix_signs(&mut outcome);
    sort_descending(&mut outcome);

    let k = outcome.w.len();
    // For m < n the factors of Aᵀ swap roles: U = V', VT = U'ᵀ.
    let (u, vt) = if tall {
        (outcome.u, outcome.v.transposed())
    } else {
        (outcome.v, outcome.u.transposed())
    };
    Ok(Svd {
        u: ArrayView::from_vec([m, k], u.data)?,
        s: ArrayView::from_vec([k], outcome.w)?,
        vt: ArrayView::from_vec([k, n], vt.data)?,
        converged: outcome.stalled.is_none(),
        sweeps: outcome.sweeps,
    })
}

/// Row-major dense scratch matrix.
#[derive(Debug, Clone)]
struct Dense {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Dense {
    fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_vec(rows, cols, vec![0.0; rows * cols])
    }

    fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        Self { rows, cols, data }
    }

    fn transposed(&self) -> Dense {
        let mut t = Dense::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    fn swap_columns(&mut self, a: usize, b: usize) {
        for r in 0..self.rows {
            self.data.swap(r * self.cols + a, r * self.cols + b);
        }
    }
}

impl Index<(usize, usize)> for Dense {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Dense {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

/// Raw output of the iteration: `A = U·diag(w)·Vᵀ`, unsorted.
struct Outcome {
    u: Dense,
    w: Vec<f64>,
    v: Dense,
    stalled: Option<usize>,
    sweeps: usize,
}

/// `|a|` carrying the sign of `b`.
fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 {
        a.abs()
    } else {
        -a.abs()
    }
}

/// Applies the rotation `[c s; -s c]` to columns `p` and `q` of `mat`.
fn rotate_columns(mat: &mut Dense, p: usize, q: usize, c: f64, s: f64) {
    for r in 0..mat.rows {
        let (y, z) = (mat[(r, p)], mat[(r, q)]);
        mat[(r, p)] = y * c + z * s;
        mat[(r, q)] = z * c - y * s;
    }
}

/// Bidiagonalization plus QR diagonalization of `a` (`m ≥ n`).
fn golub_kahan(mut a: Dense, max_sweeps: usize) -> Outcome {
    let (m, n) = (a.rows, a.cols);
    let mut w = vec![0.0; n];
    let mut rv1 = vec![0.0; n];
    let mut v = Dense::zeros(n, n);
    let (mut g, mut scale, mut anorm) = (0.0f64, 0.0f64, 0.0f64);

    // Householder reduction to bidiagonal form.
    for i in 0..n {
        let l = i + 1;
        rv1[i] = scale * g;
        g = 0.0;
        scale = 0.0;
        let mut s = 0.0;
        if i < m {
            scale = (i..m).map(|k| a[(k, i)].abs()).sum();
            if scale != 0.0 {
                for k in i..m {
                    a[(k, i)] /= scale;
                    s += a[(k, i)] * a[(k, i)];
                }
                let f = a[(i, i)];
                g = -sign(s.sqrt(), f);
                let h = f * g - s;
                a[(i, i)] = f - g;
                for j in l..n {
                    let s: f64 = (i..m).map(|k| a[(k, i)] * a[(k, j)]).sum();
                    let f = s / h;
                    for k in i..m {
                        a[(k, j)] += f * a[(k, i)];
                    }
                }
                for k in i..m {
                    a[(k, i)] *= scale;
                }
            }
        }
        w[i] = scale * g;
        g = 0.0;
        scale = 0.0;
        s = 0.0;
        if i < m && i + 1 != n {
            scale = (l..n).map(|k| a[(i, k)].abs()).sum();
            if scale != 0.0 {
                for k in l..n {
                    a[(i, k)] /= scale;
                    s += a[(i, k)] * a[(i, k)];
                }
                let f = a[(i, l)];
                g = -sign(s.sqrt(), f);
                let h = f * g - s;
                a[(i, l)] = f - g;
                for k in l..n {
                    rv1[k] = a[(i, k)] / h;
                }
                for j in l..m {
                    let s: f64 = (l..n).map(|k| a[(j, k)] * a[(i, k)]).sum();
                    for k in l..n {
                        a[(j, k)] += s * rv1[k];
                    }
                }
                for k in l..n {
                    a[(i, k)] *= scale;
                }
            }
        }
        anorm = anorm.max(w[i].abs() + rv1[i].abs());
    }

    // Right-hand reflections into V, last column first.
    let mut l = n;
    for i in (0..n).rev() {
        if i + 1 < n {
            if g != 0.0 {
                for j in l..n {
                    // Double division avoids a possible underflow.
                    v[(j, i)] = (a[(i, j)] / a[(i, l)]) / g;
                }
                for j in l..n {
                    let s: f64 = (l..n).map(|k| a[(i, k)] * v[(k, j)]).sum();
                    for k in l..n {
                        v[(k, j)] += s * v[(k, i)];
                    }
                }
            }
            for j in l..n {
                v[(i, j)] = 0.0;
                v[(j, i)] = 0.0;
            }
        }
        v[(i, i)] = 1.0;
        g = rv1[i];
        l = i;
    }

    // Left-hand reflections into U (held in `a`).
    for i in (0..m.min(n)).rev() {
        let l = i + 1;
        let mut g = w[i];
        for j in l..n {
            a[(i, j)] = 0.0;
        }
        if g != 0.0 {
            g = 1.0 / g;
            for j in l..n {
                let s: f64 = (l..m).map(|k| a[(k, i)] * a[(k, j)]).sum();
                let f = (s / a[(i, i)]) * g;
                for k in i..m {
                    a[(k, j)] += f * a[(k, i)];
                }
            }
            for j in i..m {
                a[(j, i)] *= g;
            }
        } else {
            for j in i..m {
                a[(j, i)] = 0.0;
            }
        }
        a[(i, i)] += 1.0;
    }

    // Diagonalization of the bidiagonal form.
    let threshold = EPSILON * anorm;
    let mut stalled = None;
    let mut sweeps = 0;
    for k in (0..n).rev() {
        for its in 0..max_sweeps {
            sweeps = sweeps.max(its + 1);
            // Find the split point l: rv1[l] negligible, or w[l-1] negligible
            // (which needs a cancellation pass first).
            let mut l = k;
            let mut cancel = true;
            loop {
                if l == 0 || rv1[l].abs() <= threshold {
                    cancel = false;
                    break;
                }
                if w[l - 1].abs() <= threshold {
                    break;
                }
                l -= 1;
            }
            if cancel {
                let nm = l - 1;
                let (mut c, mut s) = (0.0, 1.0);
                for i in l..=k {
                    let f = s * rv1[i];
                    rv1[i] *= c;
                    if f.abs() <= threshold {
                        break;
                    }
                    let g = w[i];
                    let h = f.hypot(g);
                    w[i] = h;
                    c = g / h;
                    s = -f / h;
                    rotate_columns(&mut a, nm, i, c, s);
                }
            }
            let z = w[k];
            if l == k {
                break;
            }
            if its + 1 == max_sweeps {
                if stalled.is_none() {
                    stalled = Some(k);
                }
                break;
            }

            // Shift from the bottom 2×2 minor.
            let mut x = w[l];
            let nm = k - 1;
            let mut y = w[nm];
            let mut g = rv1[nm];
            let mut h = rv1[k];
            let mut f = ((y - z) * (y + z) + (g - h) * (g + h)) / (2.0 * h * y);
            g = f.hypot(1.0);
            f = ((x - z) * (x + z) + h * ((y / (f + sign(g, f))) - h)) / x;

            // Next QR transformation.
            let (mut c, mut s) = (1.0, 1.0);
            for j in l..=nm {
                let i = j + 1;
                g = rv1[i];
                y = w[i];
                h = s * g;
                g *= c;
                let mut z = f.hypot(h);
                rv1[j] = z;
                c = f / z;
                s = h / z;
                f = x * c + g * s;
                g = g * c - x * s;
                h = y * s;
                y *= c;
                rotate_columns(&mut v, j, i, c, s);
                z = f.hypot(h);
                w[j] = z;
                if z != 0.0 {
                    c = f / z;
                    s = h / z;
                }
                f = c * g + s * y;
                x = c * y - s * g;
                rotate_columns(&mut a, j, i, c, s);
            }
            rv1[l] = 0.0;
            rv1[k] = f;
            w[k] = x;
        }
    }

    Outcome {
        u: a,
        w,
        v,
        stalled,
        sweeps,
    }
}

/// Makes every singular value non-negative by flipping the matching
/// column of V.
fn fix_signs(out: &mut Outcome) {
    for k in 0..out.w.len() {
        if out.w[k] < 0.0 {
            out.w[k] = -out.w[k];
            for r in 0..out.v.rows {
                out.v[(r, k)] = -out.v[(r, k)];
            }
        }
    }
}

/// Insertion sort by descending singular value, permuting the columns of
/// U and V along with it.
fn sort_descending(out: &mut Outcome) {
    for i in 1..out.w.len() {
        let mut j = i;
        while j > 0 && out.w[j - 1] < out.w[j] {
            out.w.swap(j - 1, j);
            out.u.swap_columns(j - 1, j);
            out.v.swap_columns(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
    }

    fn decompose(shape: [usize; 2], data: Vec<f64>) -> Svd {
        let a = ArrayView::from_vec(shape, data).unwrap();
        svd(&a, &SvdOptions::default()).unwrap()
    }

    #[test]
    fn test_diagonal_with_negative_entry() {
        let f = decompose([2, 2], vec![3.0, 0.0, 0.0, -2.0]);
        assert_eq!(f.singular_values(), vec![3.0, 2.0]);
        assert!(f.converged);
        // The negative entry is absorbed by a sign flip in one of the
        // singular vectors.
        let u = f.u.to_vec::<f64>().unwrap();
        let vt = f.vt.to_vec::<f64>().unwrap();
        assert!((u[3] * vt[3] + 1.0).abs() < 1e-12);
        let back = f.reconstruct().unwrap().to_vec::<f64>().unwrap();
        assert!(close(&back, &[3.0, 0.0, 0.0, -2.0], 1e-12));
    }

    #[test]
    fn test_shapes_tall_and_wide() {
        let tall = decompose([3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(tall.u.dims(), &[3, 2]);
        assert_eq!(tall.s.dims(), &[2]);
        assert_eq!(tall.vt.dims(), &[2, 2]);

        let wide = decompose([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(wide.u.dims(), &[2, 2]);
        assert_eq!(wide.vt.dims(), &[2, 3]);
        let back = wide.reconstruct().unwrap().to_vec::<f64>().unwrap();
        assert!(close(&back, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 1e-10));
        // Transposition does not change the spectrum.
        assert!(close(&wide.singular_values(), &tall.singular_values(), 1e-10));
    }

    #[test]
    fn test_rank_deficient() {
        // Second row is twice the first.
        let f = decompose([2, 2], vec![1.0, 2.0, 2.0, 4.0]);
        assert_eq!(f.numerical_rank(), 1);
        let s = f.singular_values();
        assert!((s[0] - 5.0).abs() < 1e-12);
        assert!(s[1].abs() < 1e-12);
    }

    #[test]
    fn test_truncation_index() {
        let f = decompose([3, 3], vec![5.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(f.singular_values(), vec![5.0, 4.0, 1.0]);
        assert_eq!(f.truncation_index(0.9), 2);
        assert_eq!(f.truncation_index(0.5), 1);
        assert_eq!(f.truncation_index(1.0), 3);
        assert_eq!(f.truncation_index(0.0), 0);
    }

    #[test]
    fn test_integer_input_coerced() {
        let a = ArrayView::from_vec([2, 2], vec![2i32, 0, 0, 1]).unwrap();
        let f = svd(&a, &SvdOptions::default()).unwrap();
        assert_eq!(f.s.dtype(), DType::F64);
        assert_eq!(f.singular_values(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_rejects_complex_and_wrong_rank() {
        let c = ArrayView::zeros([2, 2], DType::C128);
        assert!(matches!(
            svd(&c, &SvdOptions::default()),
            Err(DecompError::Array(ArrayError::UnsupportedDtype { .. }))
        ));
        let v = ArrayView::zeros([4], DType::F64);
        assert!(matches!(
            svd(&v, &SvdOptions::default()),
            Err(DecompError::Array(ArrayError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_sweep_limit_reports_non_convergence() {
        let data = vec![4.0, 1.0, 0.5, 1.0, 3.0, 0.25, 0.5, 0.25, 2.0];
        let a = ArrayView::from_vec([3, 3], data).unwrap();
        let lax = SvdOptions {
            max_sweeps: 1,
            strict: false,
        };
        let f = svd(&a, &lax).unwrap();
        assert!(!f.converged);
        let strict = SvdOptions {
            max_sweeps: 1,
            strict: true,
        };
        assert!(matches!(
            svd(&a, &strict),
            Err(DecompError::NoConvergence { sweeps: 1, .. })
        ));
    }

    #[test]
    fn test_zero_sweep_limit_rejected() {
        // No sweep means nothing is diagonalized.
        let a = ArrayView::from_vec([2, 2], vec![4.0, 1.0, 1.0, 3.0]).unwrap();
        for strict in [false, true] {
            let options = SvdOptions {
                max_sweeps: 0,
                strict,
            };
            assert!(matches!(
                svd(&a, &options),
                Err(DecompError::InvalidOptions(_))
            ));
        }
    }

    #[test]
    fn test_single_sweep_limit_still_decomposes_diagonal() {
        let a = ArrayView::from_vec([2, 2], vec![2.0, 0.0, 0.0, 5.0]).unwrap();
        let options = SvdOptions {
            max_sweeps: 1,
            strict: true,
        };
        let f = svd(&a, &options).unwrap();
        assert!(f.converged);
        assert_eq!(f.singular_values(), vec![5.0, 2.0]);
    }

    #[test]
    fn test_empty_matrix() {
        let a = ArrayView::zeros([0, 3], DType::F64);
        let f = svd(&a, &SvdOptions::default()).unwrap();
        assert_eq!(f.s.dims(), &[0]);
        assert_eq!(f.u.dims(), &[0, 0]);
        assert_eq!(f.vt.dims(), &[0, 3]);
    }
}
