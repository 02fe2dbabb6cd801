// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Batched products: [`Engine::cross`] and [`Engine::transform`].

use array_core::{ArrayError, ArrayView, Element, Shape};
use blas_kernels::{
    BlasFloat, KernelProvider, Matrix, MatrixMut, Order, Strided, StridedMut, Transpose,
};
use tracing::debug;

use crate::{Engine, EngineError};

/// Copies `view` out in element type `T`. Kernels only ever read from
/// these copies, so outputs can never alias an input.
pub(crate) fn operand<T: Element>(view: &ArrayView) -> Result<Vec<T>, ArrayError> {
    if view.dtype() == T::DTYPE {
        view.to_vec()
    } else {
        view.astype(T::DTYPE).to_vec()
    }
}

/// The two trailing dimensions of a rank ≥ 2 shape.
fn matrix_dims(shape: &Shape) -> (usize, usize) {
    let d = shape.dims();
    (d[d.len() - 2], d[d.len() - 1])
}

fn lead(shape: &Shape) -> Shape {
    Shape::from(shape.batch_dims(2))
}

impl Engine {
    /// Generalized matrix product.
    ///
    /// | `a` rank | `b` rank | kernel | result shape |
    /// |---|---|---|---|
    /// | ≥ 2 | 2 | one `gemm` over the stacked batches of `a` | `a.lead ++ [m, n]` |
    /// | ≥ 2 | ≥ 3 | `gemm3` over every `(a, b)` batch pair | `a.lead ++ b.lead ++ [m, n]` |
    /// | ≥ 2 | 1 | `gemv` per batch of `a` | `a.lead ++ [m]` |
    /// | 1 | ≥ 2 | transposed `gemv` per batch of `b` | `b.lead ++ [n]` |
    /// | 1 | 1 | `dot` | `[]` |
    ///
    /// Batching is Cartesian: every batch of `a` meets every batch of `b`.
    ///
    /// # Errors
    /// [`ArrayError::ShapeMismatch`] for rank-0 operands or disagreeing
    /// inner dimensions, [`ArrayError::UnsupportedDtype`] for complex input.
    pub fn cross(&self, a: &ArrayView, b: &ArrayView) -> Result<ArrayView, EngineError> {
        self.dispatch(
            "cross",
            a.dtype().promote(b.dtype()),
            |k| cross_typed::<f32>(k, a, b),
            |k| cross_typed::<f64>(k, a, b),
        )
    }

    /// Applies the `m × n` matrix `m` to every length-`n` vector along the
    /// last axis of `x` with a single `gemm`. The result has shape
    /// `x.lead ++ [m]`.
    pub fn transform(&self, m: &ArrayView, x: &ArrayView) -> Result<ArrayView, EngineError> {
        self.dispatch(
            "transform",
            m.dtype().promote(x.dtype()),
            |k| transform_typed::<f32>(k, m, x),
            |k| transform_typed::<f64>(k, m, x),
        )
    }
}

fn cross_typed<T: BlasFloat + Element>(
    kernels: &dyn KernelProvider<T>,
    a: &ArrayView,
    b: &ArrayView,
) -> Result<ArrayView, EngineError> {
    let mismatch = || ArrayError::ShapeMismatch {
        op: "cross",
        lhs: a.shape().clone(),
        rhs: b.shape().clone(),
    };
    if a.rank() == 0 || b.rank() == 0 {
        return Err(mismatch().into());
    }
    let av = operand::<T>(a)?;
    let bv = operand::<T>(b)?;

    match (a.rank(), b.rank()) {
        (1, 1) => {
            if a.size() != b.size() {
                return Err(mismatch().into());
            }
            debug!(n = a.size(), "cross: dot");
            let d = kernels.dot(a.size(), Strided::contiguous(&av), Strided::contiguous(&bv))?;
            Ok(ArrayView::from_vec(Shape::scalar(), vec![d])?)
        }
        (_, 1) => {
            let (m, k) = matrix_dims(a.shape());
            if k != b.size() {
                return Err(mismatch().into());
            }
            let p = a.shape().batch_count(2);
            debug!(batches = p, m, k, "cross: batched gemv");
            let mut out = vec![T::zero(); p * m];
            for i in 0..p {
                kernels.gemv(
                    Order::RowMajor,
                    Transpose::NoTrans,
                    m,
                    k,
                    T::one(),
                    Matrix::new(&av, i * m * k, k.max(1)),
                    Strided::contiguous(&bv),
                    T::zero(),
                    StridedMut::new(&mut out, i * m, 1),
                )?;
            }
            Ok(ArrayView::from_vec(lead(a.shape()).concat(&Shape::vector(m)), out)?)
        }
        (1, _) => {
            let (k, n) = matrix_dims(b.shape());
            if k != a.size() {
                return Err(mismatch().into());
            }
            let q = b.shape().batch_count(2);
            debug!(batches = q, k, n, "cross: batched transposed gemv");
            let mut out = vec![T::zero(); q * n];
            for j in 0..q {
                kernels.gemv(
                    Order::RowMajor,
                    Transpose::Trans,
                    k,
                    n,
                    T::one(),
                    Matrix::new(&bv, j * k * n, n.max(1)),
                    Strided::contiguous(&av),
                    T::zero(),
                    StridedMut::new(&mut out, j * n, 1),
                )?;
            }
            Ok(ArrayView::from_vec(lead(b.shape()).concat(&Shape::vector(n)), out)?)
        }
        _ => {
            let (m, k) = matrix_dims(a.shape());
            let (kb, n) = matrix_dims(b.shape());
            if k != kb {
                return Err(mismatch().into());
            }
            let p = a.shape().batch_count(2);
            let q = b.shape().batch_count(2);
            let tail = Shape::matrix(m, n);
            if b.rank() == 2 {
                // Stacking a's batches turns the whole call into one gemm.
                debug!(rows = p * m, n, k, "cross: stacked gemm");
                let mut out = vec![T::zero(); p * m * n];
                kernels.gemm(
                    Order::RowMajor,
                    Transpose::NoTrans,
                    Transpose::NoTrans,
                    p * m,
                    n,
                    k,
                    T::one(),
                    Matrix::new(&av, 0, k.max(1)),
                    Matrix::new(&bv, 0, n.max(1)),
                    T::zero(),
                    MatrixMut::new(&mut out, 0, n.max(1)),
                )?;
                Ok(ArrayView::from_vec(lead(a.shape()).concat(&tail), out)?)
            } else {
                debug!(p, q, m, n, k, "cross: gemm3");
                let mut out = vec![T::zero(); p * q * m * n];
                kernels.gemm3(
                    Order::RowMajor,
                    p,
                    q,
                    m,
                    n,
                    k,
                    T::one(),
                    Matrix::new(&av, 0, k.max(1)),
                    m * k,
                    Matrix::new(&bv, 0, n.max(1)),
                    k * n,
                    MatrixMut::new(&mut out, 0, n.max(1)),
                    m * n,
                )?;
                let shape = lead(a.shape()).concat(&lead(b.shape())).concat(&tail);
                Ok(ArrayView::from_vec(shape, out)?)
            }
        }
    }
}

fn transform_typed<T: BlasFloat + Element>(
    kernels: &dyn KernelProvider<T>,
    m: &ArrayView,
    x: &ArrayView,
) -> Result<ArrayView, EngineError> {
    let mismatch = || ArrayError::ShapeMismatch {
        op: "transform",
        lhs: m.shape().clone(),
        rhs: x.shape().clone(),
    };
    if m.rank() != 2 || x.rank() == 0 {
        return Err(mismatch().into());
    }
    let (rows_m, n) = matrix_dims(m.shape());
    if x.dims()[x.rank() - 1] != n {
        return Err(mismatch().into());
    }
    let vectors = x.shape().batch_count(1);
    debug!(vectors, m = rows_m, n, "transform: gemm with transposed B");

    let mv = operand::<T>(m)?;
    let xv = operand::<T>(x)?;
    let mut out = vec![T::zero(); vectors * rows_m];
    kernels.gemm(
        Order::RowMajor,
        Transpose::NoTrans,
        Transpose::Trans,
        vectors,
        rows_m,
        n,
        T::one(),
        Matrix::new(&xv, 0, n.max(1)),
        Matrix::new(&mv, 0, n.max(1)),
        T::zero(),
        MatrixMut::new(&mut out, 0, rows_m.max(1)),
    )?;
    let shape = Shape::from(x.shape().batch_dims(1)).concat(&Shape::vector(rows_m));
    Ok(ArrayView::from_vec(shape, out)?)
}
