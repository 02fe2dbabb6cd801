// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Level 1: vector-vector routines.

use crate::{BlasFloat, KernelError, Strided, StridedMut};

/// `x := alpha * x`.
pub fn scal<T: BlasFloat>(n: usize, alpha: T, mut x: StridedMut<'_, T>) -> Result<(), KernelError> {
    if n == 0 {
        return Ok(());
    }
    x.check("scal", "x", n)?;
    for i in 0..n {
        let v = x.at_mut(i);
        *v = alpha * *v;
    }
    Ok(())
}

/// `y := alpha * x + y`.
///
/// `alpha == 1` skips the multiply; the result is bit-identical to the
/// general path since `1 * x == x` exactly.
pub fn axpy<T: BlasFloat>(
    n: usize,
    alpha: T,
    x: Strided<'_, T>,
    mut y: StridedMut<'_, T>,
) -> Result<(), KernelError> {
    if n == 0 {
        return Ok(());
    }
    x.check("axpy", "x", n)?;
    y.check("axpy", "y", n)?;
    if alpha == T::one() {
        for i in 0..n {
            *y.at_mut(i) = x.at(i) + y.at(i);
        }
    } else {
        for i in 0..n {
            *y.at_mut(i) = alpha * x.at(i) + y.at(i);
        }
    }
    Ok(())
}

/// `Σ x_i * y_i`.
pub fn dot<T: BlasFloat>(n: usize, x: Strided<'_, T>, y: Strided<'_, T>) -> Result<T, KernelError> {
    if n == 0 {
        return Ok(T::zero());
    }
    x.check("dot", "x", n)?;
    y.check("dot", "y", n)?;
    Ok((0..n).fold(T::zero(), |acc, i| acc + x.at(i) * y.at(i)))
}

/// `Σ |x_i|`.
pub fn asum<T: BlasFloat>(n: usize, x: Strided<'_, T>) -> Result<T, KernelError> {
    if n == 0 {
        return Ok(T::zero());
    }
    x.check("asum", "x", n)?;
    Ok((0..n).map(|i| x.at(i).abs()).sum())
}

/// Euclidean norm `√Σ x_i²`, without overflow scaling.
pub fn nrm2<T: BlasFloat>(n: usize, x: Strided<'_, T>) -> Result<T, KernelError> {
    if n == 0 {
        return Ok(T::zero());
    }
    x.check("nrm2", "x", n)?;
    Ok((0..n).map(|i| x.at(i) * x.at(i)).sum::<T>().sqrt())
}

/// `y := x`.
pub fn copy<T: BlasFloat>(
    n: usize,
    x: Strided<'_, T>,
    mut y: StridedMut<'_, T>,
) -> Result<(), KernelError> {
    if n == 0 {
        return Ok(());
    }
    x.check("copy", "x", n)?;
    y.check("copy", "y", n)?;
    for i in 0..n {
        *y.at_mut(i) = x.at(i);
    }
    Ok(())
}

/// Exchanges `x` and `y`.
pub fn swap<T: BlasFloat>(
    n: usize,
    mut x: StridedMut<'_, T>,
    mut y: StridedMut<'_, T>,
) -> Result<(), KernelError> {
    if n == 0 {
        return Ok(());
    }
    x.check("swap", "x", n)?;
    y.check("swap", "y", n)?;
    for i in 0..n {
        std::mem::swap(x.at_mut(i), y.at_mut(i));
    }
    Ok(())
}

/// Index of the first element of largest magnitude; 0 when `n == 0`.
pub fn iamax<T: BlasFloat>(n: usize, x: Strided<'_, T>) -> Result<usize, KernelError> {
    extreme_index("iamax", n, x, |candidate, best| candidate > best)
}

/// Index of the first element of smallest magnitude; 0 when `n == 0`.
pub fn iamin<T: BlasFloat>(n: usize, x: Strided<'_, T>) -> Result<usize, KernelError> {
    extreme_index("iamin", n, x, |candidate, best| candidate < best)
}

fn extreme_index<T: BlasFloat>(
    routine: &'static str,
    n: usize,
    x: Strided<'_, T>,
    better: impl Fn(T, T) -> bool,
) -> Result<usize, KernelError> {
    if n == 0 {
        return Ok(0);
    }
    x.check(routine, "x", n)?;
    let mut best = 0;
    let mut best_mag = x.at(0).abs();
    for i in 1..n {
        let mag = x.at(i).abs();
        // Strict comparison: ties keep the earlier index.
        if better(mag, best_mag) {
            best = i;
            best_mag = mag;
        }
    }
    Ok(best)
}

/// A Givens rotation as produced by [`rotg`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Givens<T> {
    /// The rotated length, signed like the larger-magnitude input.
    pub r: T,
    /// Reconstruction value encoding `c` and `s` in one number.
    pub z: T,
    pub c: T,
    pub s: T,
}

/// Constructs the rotation zeroing `b`:
/// `[c s; -s c] · [a; b] = [r; 0]`.
pub fn rotg<T: BlasFloat>(a: T, b: T) -> Givens<T> {
    let roe = if a.abs() > b.abs() { a } else { b };
    let scale = a.abs() + b.abs();
    if scale == T::zero() {
        return Givens {
            r: T::zero(),
            z: T::zero(),
            c: T::one(),
            s: T::zero(),
        };
    }
    let (sa, sb) = (a / scale, b / scale);
    let r = scale * (sa * sa + sb * sb).sqrt();
    let r = if roe < T::zero() { -r } else { r };
    let c = a / r;
    let s = b / r;
    let z = if a.abs() > b.abs() {
        s
    } else if c != T::zero() {
        T::one() / c
    } else {
        T::one()
    };
    Givens { r, z, c, s }
}

/// Applies a plane rotation:
/// `x_i := c·x_i + s·y_i`, `y_i := c·y_i − s·x_i`.
pub fn rot<T: BlasFloat>(
    n: usize,
    mut x: StridedMut<'_, T>,
    mut y: StridedMut<'_, T>,
    c: T,
    s: T,
) -> Result<(), KernelError> {
    if n == 0 {
        return Ok(());
    }
    x.check("rot", "x", n)?;
    y.check("rot", "y", n)?;
    for i in 0..n {
        let (xi, yi) = (x.at(i), y.at(i));
        *x.at_mut(i) = c * xi + s * yi;
        *y.at_mut(i) = c * yi - s * xi;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scal_strided() {
        let mut x = [1.0f64, 9.0, 2.0, 9.0, 3.0];
        scal(3, 2.0, StridedMut::new(&mut x, 0, 2)).unwrap();
        assert_eq!(x, [2.0, 9.0, 4.0, 9.0, 6.0]);
    }

    #[test]
    fn test_axpy_alpha_one_bit_identical() {
        let x = [0.1f64, -3.7, 1.0e-300, 7.25];
        let y0 = [2.2f64, 0.3, -1.0e-300, 1.0e10];
        let mut fast = y0;
        axpy(4, 1.0, Strided::contiguous(&x), StridedMut::contiguous(&mut fast)).unwrap();
        for i in 0..4 {
            let general = 1.0f64 * x[i] + y0[i];
            assert_eq!(fast[i].to_bits(), general.to_bits());
        }
    }

    #[test]
    fn test_axpy_general() {
        let x = [1.0f32, 2.0];
        let mut y = [10.0f32, 20.0];
        axpy(2, -2.0, Strided::contiguous(&x), StridedMut::contiguous(&mut y)).unwrap();
        assert_eq!(y, [8.0, 16.0]);
    }

    #[test]
    fn test_axpy_validates_before_writing() {
        let x = [1.0f64; 2];
        let mut y = [5.0f64; 3];
        let err = axpy(3, 1.0, Strided::contiguous(&x), StridedMut::contiguous(&mut y));
        assert!(matches!(err, Err(KernelError::BufferTooSmall { operand: "x", .. })));
        assert_eq!(y, [5.0; 3]);
    }

    #[test]
    fn test_dot_asum_nrm2() {
        let x = [3.0f64, -4.0];
        let y = [1.0f64, 2.0];
        assert_eq!(dot(2, Strided::contiguous(&x), Strided::contiguous(&y)).unwrap(), -5.0);
        assert_eq!(asum(2, Strided::contiguous(&x)).unwrap(), 7.0);
        assert_eq!(nrm2(2, Strided::contiguous(&x)).unwrap(), 5.0);
        assert_eq!(nrm2(0, Strided::contiguous(&x)).unwrap(), 0.0);
    }

    #[test]
    fn test_copy_and_swap() {
        let x = [1.0f32, 2.0, 3.0];
        let mut y = [0.0f32; 3];
        copy(3, Strided::new(&x, 0, 1), StridedMut::new(&mut y, 0, 1)).unwrap();
        assert_eq!(y, x);

        let mut a = [1.0f64, 2.0];
        let mut b = [3.0f64, 4.0];
        swap(2, StridedMut::contiguous(&mut a), StridedMut::contiguous(&mut b)).unwrap();
        assert_eq!(a, [3.0, 4.0]);
        assert_eq!(b, [1.0, 2.0]);
    }

    #[test]
    fn test_iamax_first_occurrence() {
        let x = [1.0f64, -5.0, 5.0, 2.0];
        assert_eq!(iamax(4, Strided::contiguous(&x)).unwrap(), 1);
        let y = [3.0f64, 1.0, -1.0];
        assert_eq!(iamin(3, Strided::contiguous(&y)).unwrap(), 1);
        assert_eq!(iamax(0, Strided::contiguous(&y)).unwrap(), 0);
    }

    #[test]
    fn test_rotg_zeroes_b() {
        let g = rotg(3.0f64, 4.0);
        assert!((g.r - 5.0).abs() < 1e-12);
        assert!((g.c - 0.6).abs() < 1e-12);
        assert!((g.s - 0.8).abs() < 1e-12);
        assert!((-g.s * 3.0 + g.c * 4.0).abs() < 1e-12);

        let h = rotg(-4.0f64, 3.0);
        assert!(h.r < 0.0, "sign follows the larger-magnitude input");

        let z = rotg(0.0f64, 0.0);
        assert_eq!((z.c, z.s, z.r), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rot_applies_rotation() {
        let g = rotg(3.0f64, 4.0);
        let mut x = [3.0f64];
        let mut y = [4.0f64];
        rot(1, StridedMut::contiguous(&mut x), StridedMut::contiguous(&mut y), g.c, g.s).unwrap();
        assert!((x[0] - 5.0).abs() < 1e-12);
        assert!(y[0].abs() < 1e-12);
    }
}
