// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for matrix decompositions.

use array_core::ArrayError;
use blas_kernels::KernelError;

/// Errors that can occur while decomposing a matrix.
#[derive(Debug, thiserror::Error)]
pub enum DecompError {
    /// The input is not a real rank-2 array, or a view operation failed.
    #[error(transparent)]
    Array(#[from] ArrayError),

    /// A kernel rejected its operands.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// The options cannot drive a decomposition (e.g. a zero sweep limit).
    #[error("invalid svd options: {0}")]
    InvalidOptions(String),

    /// The QR iteration for singular value `index` did not settle within
    /// the sweep limit. Only raised in strict mode.
    #[error("singular value {index} did not converge in {sweeps} sweeps")]
    NoConvergence { index: usize, sweeps: usize },
}
