// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for elementwise and indexed operations.

use array_core::ArrayError;
use blas_kernels::KernelError;

/// Errors raised by [`apply`](crate::apply), [`select`](crate::select) and
/// friends. Every variant is raised before the target is written.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// Shape, dtype, index or division failure from the array layer.
    #[error(transparent)]
    Array(#[from] ArrayError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// A mask list that cannot index the target array.
    #[error("invalid mask: {0}")]
    InvalidMask(String),

    /// An operator token that is not recognised.
    #[error("unknown operator `{0}`")]
    InvalidOperator(String),
}
