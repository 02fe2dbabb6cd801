// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise operator dispatch with restricted broadcasting.
//!
//! The lower-rank operand of a binary operation is repeated along the outer
//! axes of the higher-rank one, and only when its shape equals the trailing
//! dimensions of the other. Size-1 dimensions are never stretched.

use array_core::{ArrayError, ArrayView, Buffer, DType, Element, Scalar, Shape, Value};
use blas_kernels::{BlasFloat, KernelSet, Strided, StridedMut};
use tracing::{debug, trace};

use crate::{arith, AssignOp, BroadcastError, Operator};

/// One side of an elementwise loop: a repeated scalar or a snapshot of an
/// array's elements.
pub(crate) enum Operand {
    Scalar(Scalar),
    Elements(Vec<Scalar>),
}

impl Operand {
    pub(crate) fn of(value: &Value) -> Self {
        match value {
            Value::Scalar(s) => Operand::Scalar(*s),
            Value::Array(a) => Operand::Elements(a.scalars()),
        }
    }

    pub(crate) fn get(&self, index: usize) -> Scalar {
        match self {
            Operand::Scalar(s) => *s,
            Operand::Elements(v) => v[index],
        }
    }
}

/// Applies `op` to `x` and `y`.
///
/// When `out` is given it must have the result shape; results are cast into
/// its dtype and `out` is returned. Otherwise a fresh array is allocated in
/// the promoted dtype (`Bool` for comparisons). Two scalars with no `out`
/// yield a scalar.
///
/// Dispatch, first match wins:
/// 1. same-shape float `+`/`-` runs `copy` then `axpy` with α = ±1;
/// 2. arrays of unequal rank recurse over the leading axis of the larger;
/// 3. a float array times a scalar, or divided by one, runs `copy` then
///    `scal` (an exact zero divisor is an error on this path);
/// 4. anything else is a plain loop in the promoted dtype.
///
/// # Errors
/// [`ArrayError::ShapeMismatch`] for shapes that do not broadcast or a
/// wrong-shaped `out`, [`ArrayError::DivisionByZero`] for integer division
/// by zero and [`ArrayError::UnsupportedDtype`] for ordered comparisons or
/// `%` on complex values. Nothing is written when an error is returned.
///
/// # Examples
/// ```
/// use array_core::{ArrayView, Value};
/// use blas_kernels::KernelSet;
/// use broadcast::{apply, Operator};
///
/// let kernels = KernelSet::reference();
/// let x = ArrayView::from_vec([2, 2], vec![1.0f64, 2.0, 3.0, 4.0]).unwrap();
/// let y = ArrayView::from_vec([2], vec![10.0f64, 20.0]).unwrap();
/// let sum = apply(&kernels, &x.into(), Operator::Add, &y.into(), None).unwrap();
/// let sum = sum.into_array().to_vec::<f64>().unwrap();
/// assert_eq!(sum, vec![11.0, 22.0, 13.0, 24.0]);
/// ```
pub fn apply(
    kernels: &KernelSet,
    x: &Value,
    op: Operator,
    y: &Value,
    out: Option<&ArrayView>,
) -> Result<Value, BroadcastError> {
    let promoted = x.dtype().promote(y.dtype());
    let result_dtype = if op.is_comparison() { DType::Bool } else { promoted };

    if let (Value::Scalar(a), Value::Scalar(b), None) = (x, y, out) {
        return Ok(Value::Scalar(arith::binary(op, *a, *b, promoted)?));
    }

    let shape = broadcast_shape(x, y)?;
    let out = prepare_out(out, &shape, result_dtype)?;
    let (x, y) = (detach(x, &out), detach(y, &out));
    dispatch(kernels, &x, op, &y, &out, promoted)?;
    Ok(Value::Array(out))
}

/// Snapshots an operand that overlaps `out` without being exactly `out`,
/// since writes through `out` would otherwise feed back into later reads.
fn detach(value: &Value, out: &ArrayView) -> Value {
    match value {
        Value::Array(a)
            if a.shares_buffer(out) && (a.offset() != out.offset() || a.shape() != out.shape()) =>
        {
            Value::Array(a.duplicate())
        }
        _ => value.clone(),
    }
}

/// In-place `x op= y`, with results cast into `x`'s dtype.
///
/// `y` may be a scalar, an array of `x`'s shape, or a lower-rank array whose
/// shape equals `x`'s trailing dimensions.
pub fn apply_assign(
    kernels: &KernelSet,
    x: &ArrayView,
    op: AssignOp,
    y: &Value,
) -> Result<(), BroadcastError> {
    match op.operator() {
        Some(op) => {
            apply(kernels, &Value::Array(x.clone()), op, y, Some(x))?;
            Ok(())
        }
        None => assign(x, y),
    }
}

fn assign(x: &ArrayView, y: &Value) -> Result<(), BroadcastError> {
    match y {
        Value::Scalar(s) => Ok(x.fill(*s)?),
        Value::Array(src) if src.rank() == x.rank() => Ok(x.copy_from(src)?),
        Value::Array(src) => {
            if !src.shape().is_suffix_of(x.shape()) {
                return Err(mismatch("assign", x.shape(), src.shape()));
            }
            let src = if src.shares_buffer(x) { src.duplicate() } else { src.clone() };
            let block = src.size();
            for i in 0..x.size().checked_div(block).unwrap_or(0) {
                Buffer::copy_range(
                    src.buffer(),
                    src.offset(),
                    x.buffer(),
                    x.offset() + i * block,
                    block,
                )?;
            }
            Ok(())
        }
    }
}

fn mismatch(op: &'static str, lhs: &Shape, rhs: &Shape) -> BroadcastError {
    ArrayError::ShapeMismatch {
        op,
        lhs: lhs.clone(),
        rhs: rhs.clone(),
    }
    .into()
}

/// Result shape of `x op y`, or a mismatch when the lower-rank shape is not
/// a suffix of the higher-rank one.
fn broadcast_shape(x: &Value, y: &Value) -> Result<Shape, BroadcastError> {
    let (xs, ys) = (x.shape(), y.shape());
    match (x, y) {
        (Value::Scalar(_), _) => Ok(ys),
        (_, Value::Scalar(_)) => Ok(xs),
        _ if ys.is_suffix_of(&xs) => Ok(xs),
        _ if xs.is_suffix_of(&ys) => Ok(ys),
        _ => Err(mismatch("broadcast", &xs, &ys)),
    }
}

fn prepare_out(
    out: Option<&ArrayView>,
    shape: &Shape,
    dtype: DType,
) -> Result<ArrayView, BroadcastError> {
    match out {
        Some(out) if out.shape() != shape => Err(mismatch("output", out.shape(), shape)),
        Some(out) => Ok(out.clone()),
        None => Ok(ArrayView::zeros(shape.clone(), dtype)),
    }
}

/// Writes `x op y` into `out`, whose shape has already been validated.
fn dispatch(
    kernels: &KernelSet,
    x: &Value,
    op: Operator,
    y: &Value,
    out: &ArrayView,
    promoted: DType,
) -> Result<(), BroadcastError> {
    if let (Value::Array(a), Value::Array(b)) = (x, y) {
        if a.shape() == b.shape()
            && a.dtype() == b.dtype()
            && out.dtype() == a.dtype()
            && matches!(op, Operator::Add | Operator::Sub)
        {
            let sub = op == Operator::Sub;
            match a.dtype() {
                DType::F32 => {
                    debug!(op = %op, size = a.size(), "axpy path");
                    return axpy_path::<f32>(kernels, a, b, sub, out);
                }
                DType::F64 => {
                    debug!(op = %op, size = a.size(), "axpy path");
                    return axpy_path::<f64>(kernels, a, b, sub, out);
                }
                _ => {}
            }
        }
        if a.rank() != b.rank() {
            return leading_axis(kernels, a, op, b, out, promoted);
        }
    }

    if let Some((array, factor, divide)) = scal_candidate(x, op, y) {
        if array.dtype() == promoted && out.dtype() == promoted {
            match promoted {
                DType::F32 => {
                    debug!(op = %op, size = array.size(), "scal path");
                    return scal_path::<f32>(kernels, array, factor, divide, out);
                }
                DType::F64 => {
                    debug!(op = %op, size = array.size(), "scal path");
                    return scal_path::<f64>(kernels, array, factor, divide, out);
                }
                _ => {}
            }
        }
    }

    trace!(op = %op, dtype = %promoted, size = out.size(), "elementwise loop");
    elementwise(x, op, y, out, promoted)
}

/// Restricted broadcasting: one sub-result per leading index of the
/// higher-rank operand. Shapes were validated by the caller.
fn leading_axis(
    kernels: &KernelSet,
    a: &ArrayView,
    op: Operator,
    b: &ArrayView,
    out: &ArrayView,
    promoted: DType,
) -> Result<(), BroadcastError> {
    let leading = out.dims()[0];
    trace!(op = %op, leading, "recursing on leading axis");
    for i in 0..leading {
        let sub_out = out.at(i)?;
        let (sub_a, sub_b) = if a.rank() > b.rank() {
            (Value::Array(a.at(i)?), Value::Array(b.clone()))
        } else {
            (Value::Array(a.clone()), Value::Array(b.at(i)?))
        };
        dispatch(kernels, &sub_a, op, &sub_b, &sub_out, promoted)?;
    }
    Ok(())
}

/// The array, scalar factor and direction for the `scal` path, if `op` is a
/// scalar multiply or a division by a scalar.
fn scal_candidate<'a>(
    x: &'a Value,
    op: Operator,
    y: &'a Value,
) -> Option<(&'a ArrayView, Scalar, bool)> {
    match (x, op, y) {
        (Value::Array(a), Operator::Mul, Value::Scalar(s))
        | (Value::Scalar(s), Operator::Mul, Value::Array(a)) => Some((a, *s, false)),
        (Value::Array(a), Operator::Div, Value::Scalar(s)) => Some((a, *s, true)),
        _ => None,
    }
}

fn axpy_path<T: BlasFloat + Element>(
    kernels: &KernelSet,
    x: &ArrayView,
    y: &ArrayView,
    subtract: bool,
    out: &ArrayView,
) -> Result<(), BroadcastError> {
    // axpy reads y while writing out, so y must not live in out's buffer.
    let y = if y.shares_buffer(out) { y.duplicate() } else { y.clone() };
    out.copy_from(x)?;
    let alpha = if subtract { -T::one() } else { T::one() };
    let n = out.size();
    let provider = kernels.provider::<T>();
    y.read(|ys: &[T]| {
        out.write(|os: &mut [T]| {
            provider.axpy(n, alpha, Strided::contiguous(ys), StridedMut::contiguous(os))
        })
    })???;
    Ok(())
}

fn scal_path<T: BlasFloat + Element>(
    kernels: &KernelSet,
    array: &ArrayView,
    factor: Scalar,
    divide: bool,
    out: &ArrayView,
) -> Result<(), BroadcastError> {
    let alpha = if divide {
        if factor.is_zero() {
            return Err(ArrayError::DivisionByZero { op: "/" }.into());
        }
        T::one() / T::from_scalar(factor)
    } else {
        T::from_scalar(factor)
    };
    out.copy_from(array)?;
    let n = out.size();
    let provider = kernels.provider::<T>();
    out.write(|os: &mut [T]| provider.scal(n, alpha, StridedMut::contiguous(os)))??;
    Ok(())
}

/// The general path: every result is computed before `out` is written, so
/// a mid-loop error leaves `out` untouched and aliasing inputs are safe.
fn elementwise(
    x: &Value,
    op: Operator,
    y: &Value,
    out: &ArrayView,
    promoted: DType,
) -> Result<(), BroadcastError> {
    let (lhs, rhs) = (Operand::of(x), Operand::of(y));
    let results = (0..out.size())
        .map(|i| arith::binary(op, lhs.get(i), rhs.get(i), promoted))
        .collect::<Result<Vec<_>, _>>()?;
    out.set_scalars(&results)?;
    Ok(())
}
