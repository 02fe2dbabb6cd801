// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`KernelProvider`] capability trait and the [`KernelSet`] registry.

use crate::{
    level1, level2, level3, BlasFloat, Diag, Givens, KernelError, Matrix, MatrixMut, Order, Side,
    Strided, StridedMut, Transpose, Uplo,
};

/// A source of BLAS kernels for one element type.
///
/// Every method has a default that runs the reference kernel, so an
/// accelerated backend overrides only the routines it actually speeds up.
/// Providers are purely computational (no I/O, no allocation) and must
/// honour the same validate-before-write contract as the reference code.
#[allow(clippy::too_many_arguments)]
pub trait KernelProvider<T: BlasFloat>: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str {
        "reference"
    }

    /// `true` for hardware-accelerated backends.
    fn is_accelerated(&self) -> bool {
        false
    }

    fn scal(&self, n: usize, alpha: T, x: StridedMut<'_, T>) -> Result<(), KernelError> {
        level1::scal(n, alpha, x)
    }

    fn axpy(
        &self,
        n: usize,
        alpha: T,
        x: Strided<'_, T>,
        y: StridedMut<'_, T>,
    ) -> Result<(), KernelError> {
        level1::axpy(n, alpha, x, y)
    }

    fn dot(&self, n: usize, x: Strided<'_, T>, y: Strided<'_, T>) -> Result<T, KernelError> {
        level1::dot(n, x, y)
    }

    fn asum(&self, n: usize, x: Strided<'_, T>) -> Result<T, KernelError> {
        level1::asum(n, x)
    }

    fn nrm2(&self, n: usize, x: Strided<'_, T>) -> Result<T, KernelError> {
        level1::nrm2(n, x)
    }

    fn copy(&self, n: usize, x: Strided<'_, T>, y: StridedMut<'_, T>) -> Result<(), KernelError> {
        level1::copy(n, x, y)
    }

    fn swap(
        &self,
        n: usize,
        x: StridedMut<'_, T>,
        y: StridedMut<'_, T>,
    ) -> Result<(), KernelError> {
        level1::swap(n, x, y)
    }

    fn iamax(&self, n: usize, x: Strided<'_, T>) -> Result<usize, KernelError> {
        level1::iamax(n, x)
    }

    fn iamin(&self, n: usize, x: Strided<'_, T>) -> Result<usize, KernelError> {
        level1::iamin(n, x)
    }

    fn rotg(&self, a: T, b: T) -> Givens<T> {
        level1::rotg(a, b)
    }

    fn rot(
        &self,
        n: usize,
        x: StridedMut<'_, T>,
        y: StridedMut<'_, T>,
        c: T,
        s: T,
    ) -> Result<(), KernelError> {
        level1::rot(n, x, y, c, s)
    }

    fn gemv(
        &self,
        order: Order,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: T,
        a: Matrix<'_, T>,
        x: Strided<'_, T>,
        beta: T,
        y: StridedMut<'_, T>,
    ) -> Result<(), KernelError> {
        level2::gemv(order, trans, m, n, alpha, a, x, beta, y)
    }

    fn gemm(
        &self,
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
        level3::gemm(order, trans_a, trans_b, m, n, k, alpha, a, b, beta, c)
    }

    fn symm(
        &self,
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
        level3::symm(order, side, uplo, m, n, alpha, a, b, beta, c)
    }

    fn syrk(
        &self,
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
        level3::syrk(order, uplo, trans, n, k, alpha, a, beta, c)
    }

    fn syr2k(
        &self,
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
        level3::syr2k(order, uplo, trans, n, k, alpha, a, b, beta, c)
    }

    fn gemm3(
        &self,
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
        level3::gemm3(order, p, q, m, n, k, alpha, a, stride_a, b, stride_b, c, stride_c)
    }

    /// Triangular matrix multiply. Not provided by the reference kernels.
    fn trmm(
        &self,
        _order: Order,
        _side: Side,
        _uplo: Uplo,
        _trans: Transpose,
        _diag: Diag,
        _m: usize,
        _n: usize,
        _alpha: T,
        _a: Matrix<'_, T>,
        _b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        Err(KernelError::Unimplemented { routine: "trmm" })
    }

    /// Triangular solve. Not provided by the reference kernels.
    fn trsm(
        &self,
        _order: Order,
        _side: Side,
        _uplo: Uplo,
        _trans: Transpose,
        _diag: Diag,
        _m: usize,
        _n: usize,
        _alpha: T,
        _a: Matrix<'_, T>,
        _b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        Err(KernelError::Unimplemented { routine: "trsm" })
    }
}

/// Pure-software kernels: the trait defaults, with no overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernels;

impl KernelProvider<f32> for ReferenceKernels {}
impl KernelProvider<f64> for ReferenceKernels {}

/// One provider per float element type.
pub struct KernelSet {
    pub(crate) f32: Box<dyn KernelProvider<f32>>,
    pub(crate) f64: Box<dyn KernelProvider<f64>>,
}

impl KernelSet {
    /// Reference kernels for both element types.
    pub fn reference() -> Self {
        Self {
            f32: Box::new(ReferenceKernels),
            f64: Box::new(ReferenceKernels),
        }
    }

    /// Replaces the `f32` provider.
    pub fn with_f32(mut self, provider: Box<dyn KernelProvider<f32>>) -> Self {
        self.f32 = provider;
        self
    }

    /// Replaces the `f64` provider.
    pub fn with_f64(mut self, provider: Box<dyn KernelProvider<f64>>) -> Self {
        self.f64 = provider;
        self
    }

    /// The provider serving element type `T`.
    ///
    /// # Examples
    /// ```
    /// use blas_kernels::{KernelSet, Strided};
    /// let set = KernelSet::reference();
    /// let x = [3.0f64, 4.0];
    /// let norm = set.provider::<f64>().nrm2(2, Strided::contiguous(&x)).unwrap();
    /// assert_eq!(norm, 5.0);
    /// ```
    pub fn provider<T: BlasFloat>(&self) -> &dyn KernelProvider<T> {
        T::provider(self)
    }
}

impl Default for KernelSet {
    fn default() -> Self {
        Self::reference()
    }
}

impl std::fmt::Debug for KernelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelSet")
            .field("f32", &self.f32.name())
            .field("f64", &self.f64.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Overrides `dot` only; everything else falls through to the defaults.
    struct CountingDot;

    impl KernelProvider<f64> for CountingDot {
        fn name(&self) -> &str {
            "counting"
        }

        fn is_accelerated(&self) -> bool {
            true
        }

        fn dot(&self, _n: usize, _x: Strided<'_, f64>, _y: Strided<'_, f64>) -> Result<f64, KernelError> {
            Ok(42.0)
        }
    }

    #[test]
    fn test_reference_set() {
        let set = KernelSet::reference();
        assert_eq!(set.provider::<f32>().name(), "reference");
        assert!(!set.provider::<f64>().is_accelerated());
    }

    #[test]
    fn test_partial_override() {
        let set = KernelSet::reference().with_f64(Box::new(CountingDot));
        let x = [1.0f64, 2.0];
        let p = set.provider::<f64>();
        assert!(p.is_accelerated());
        assert_eq!(p.dot(2, Strided::contiguous(&x), Strided::contiguous(&x)).unwrap(), 42.0);
        assert_eq!(p.asum(2, Strided::contiguous(&x)).unwrap(), 3.0);
        // The f32 side is untouched.
        assert_eq!(set.provider::<f32>().name(), "reference");
    }

    #[test]
    fn test_triangular_routines_unimplemented() {
        let a = [1.0f64];
        let mut b = [1.0f64];
        let err = KernelProvider::<f64>::trsm(
            &ReferenceKernels,
            Order::RowMajor,
            Side::Left,
            Uplo::Upper,
            Transpose::NoTrans,
            Diag::NonUnit,
            1,
            1,
            1.0,
            Matrix::new(&a, 0, 1),
            MatrixMut::new(&mut b, 0, 1),
        );
        assert_eq!(err, Err(KernelError::Unimplemented { routine: "trsm" }));
    }
}
