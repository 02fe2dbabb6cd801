// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scalar-or-array operand type.

use num_complex::{Complex32, Complex64};

use crate::{ArrayView, DType, Scalar, Shape, F16};

/// Either a bare scalar or an array view.
///
/// Indexed reads return `Value::Scalar` when they address a single element
/// and `Value::Array` otherwise; arithmetic accepts either on both sides.
#[derive(Debug, Clone)]
pub enum Value {
    Scalar(Scalar),
    Array(ArrayView),
}

impl Value {
    pub fn dtype(&self) -> DType {
        match self {
            Value::Scalar(s) => s.dtype(),
            Value::Array(a) => a.dtype(),
        }
    }

    /// Shape of the value; scalars are rank 0.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Scalar(_) => Shape::scalar(),
            Value::Array(a) => a.shape().clone(),
        }
    }

    pub fn rank(&self) -> usize {
        match self {
            Value::Scalar(_) => 0,
            Value::Array(a) => a.rank(),
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Scalar(s) => Some(*s),
            Value::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView> {
        match self {
            Value::Scalar(_) => None,
            Value::Array(a) => Some(a),
        }
    }

    /// Converts into a view; scalars become a fresh rank-0 array.
    pub fn into_array(self) -> ArrayView {
        match self {
            Value::Scalar(s) => ArrayView::scalar(s),
            Value::Array(a) => a,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<ArrayView> for Value {
    fn from(a: ArrayView) -> Self {
        Value::Array(a)
    }
}

impl From<&ArrayView> for Value {
    fn from(a: &ArrayView) -> Self {
        Value::Array(a.clone())
    }
}

macro_rules! value_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

value_from_primitive!(bool, i8, u8, i16, u16, i32, u32, i64, u64, F16, f32, f64, Complex32, Complex64);
