// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for array construction, indexing and serialization.

use crate::{DType, Shape};

/// Errors that can occur while building, indexing or converting arrays.
#[derive(Debug, thiserror::Error)]
pub enum ArrayError {
    /// Two shapes are incompatible for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// The number of supplied elements does not match the shape.
    #[error("length mismatch: shape needs {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// An index (or inclusive range bound) lies outside the indexed dimension.
    #[error("index {index} out of range for dimension of length {len}")]
    OutOfRangeIndex { index: usize, len: usize },

    /// A view would address memory past the end of its buffer.
    #[error("buffer too small: view needs {required} elements, buffer holds {len}")]
    BufferTooSmall { required: usize, len: usize },

    /// The requested data type is not supported for this operation.
    #[error("unsupported dtype {dtype} for operation {op}")]
    UnsupportedDtype { op: &'static str, dtype: DType },

    /// Division (or remainder) by an exact zero where no IEEE result applies.
    #[error("division by zero in {op}")]
    DivisionByZero { op: &'static str },

    /// A serialized buffer could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ArrayError {
    fn from(e: serde_json::Error) -> Self {
        ArrayError::Serialization(e.to_string())
    }
}
