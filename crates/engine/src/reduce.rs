// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Whole-array reductions over the flattened view.

use array_core::{ArrayError, ArrayView, Element, Scalar};
use blas_kernels::{BlasFloat, KernelProvider, Strided};

use crate::linalg::operand;
use crate::{Engine, EngineError};

/// Which end of the magnitude order [`extremum`] looks for.
#[derive(Clone, Copy)]
enum Extremum {
    Max,
    Min,
}

impl Engine {
    /// Sum of all elements, in the compute dtype.
    pub fn sum(&self, x: &ArrayView) -> Result<Scalar, EngineError> {
        self.dispatch("sum", x.dtype(), |_| sum::<f32>(x), |_| sum::<f64>(x))
    }

    /// Arithmetic mean; NaN for an empty array.
    pub fn mean(&self, x: &ArrayView) -> Result<Scalar, EngineError> {
        self.dispatch("mean", x.dtype(), |_| mean::<f32>(x), |_| mean::<f64>(x))
    }

    /// Inner product of two arrays with the same number of elements.
    pub fn dot(&self, x: &ArrayView, y: &ArrayView) -> Result<Scalar, EngineError> {
        self.dispatch(
            "dot",
            x.dtype().promote(y.dtype()),
            |k| dot::<f32>(k, x, y),
            |k| dot::<f64>(k, x, y),
        )
    }

    /// Euclidean norm.
    pub fn norm(&self, x: &ArrayView) -> Result<Scalar, EngineError> {
        self.dispatch(
            "norm",
            x.dtype(),
            |k| unary::<f32>(x, |n, s| k.nrm2(n, s)),
            |k| unary::<f64>(x, |n, s| k.nrm2(n, s)),
        )
    }

    /// Sum of absolute values.
    pub fn asum(&self, x: &ArrayView) -> Result<Scalar, EngineError> {
        self.dispatch(
            "asum",
            x.dtype(),
            |k| unary::<f32>(x, |n, s| k.asum(n, s)),
            |k| unary::<f64>(x, |n, s| k.asum(n, s)),
        )
    }

    /// Flat index of the element with the largest magnitude (first on
    /// ties).
    ///
    /// # Errors
    /// [`ArrayError::OutOfRangeIndex`] for an empty array.
    pub fn argmax(&self, x: &ArrayView) -> Result<usize, EngineError> {
        self.dispatch(
            "argmax",
            x.dtype(),
            |k| extremum::<f32>(k, x, Extremum::Max),
            |k| extremum::<f64>(k, x, Extremum::Max),
        )
    }

    /// Flat index of the element with the smallest magnitude (first on
    /// ties).
    pub fn argmin(&self, x: &ArrayView) -> Result<usize, EngineError> {
        self.dispatch(
            "argmin",
            x.dtype(),
            |k| extremum::<f32>(k, x, Extremum::Min),
            |k| extremum::<f64>(k, x, Extremum::Min),
        )
    }
}

fn sum<T: BlasFloat + Element>(x: &ArrayView) -> Result<Scalar, EngineError> {
    let v = operand::<T>(x)?;
    Ok(v.iter().copied().sum::<T>().to_scalar())
}

fn mean<T: BlasFloat + Element>(x: &ArrayView) -> Result<Scalar, EngineError> {
    let v = operand::<T>(x)?;
    let n = T::from_scalar(Scalar::U64(v.len() as u64));
    Ok((v.iter().copied().sum::<T>() / n).to_scalar())
}

fn dot<T: BlasFloat + Element>(
    kernels: &dyn KernelProvider<T>,
    x: &ArrayView,
    y: &ArrayView,
) -> Result<Scalar, EngineError> {
    if x.size() != y.size() {
        return Err(ArrayError::LengthMismatch {
            expected: x.size(),
            actual: y.size(),
        }
        .into());
    }
    let (xv, yv) = (operand::<T>(x)?, operand::<T>(y)?);
    let d = kernels.dot(xv.len(), Strided::contiguous(&xv), Strided::contiguous(&yv))?;
    Ok(d.to_scalar())
}

fn unary<T: BlasFloat + Element>(
    x: &ArrayView,
    kernel: impl FnOnce(usize, Strided<'_, T>) -> Result<T, blas_kernels::KernelError>,
) -> Result<Scalar, EngineError> {
    let v = operand::<T>(x)?;
    Ok(kernel(v.len(), Strided::contiguous(&v))?.to_scalar())
}

fn extremum<T: BlasFloat + Element>(
    kernels: &dyn KernelProvider<T>,
    x: &ArrayView,
    which: Extremum,
) -> Result<usize, EngineError> {
    if x.size() == 0 {
        return Err(ArrayError::OutOfRangeIndex { index: 0, len: 0 }.into());
    }
    let v = operand::<T>(x)?;
    let s = Strided::contiguous(&v);
    let index = match which {
        Extremum::Max => kernels.iamax(v.len(), s)?,
        Extremum::Min => kernels.iamin(v.len(), s)?,
    };
    Ok(index)
}
