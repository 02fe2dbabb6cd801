// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the array engine.

use array_core::ArrayError;
use blas_kernels::KernelError;
use broadcast::BroadcastError;
use decomposition::DecompError;

/// Errors that can occur while running an engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid shapes, dtypes or indices.
    #[error(transparent)]
    Array(#[from] ArrayError),

    /// A kernel rejected its operands.
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// The decomposition failed.
    #[error("decomposition error: {0}")]
    Decomposition(#[from] DecompError),

    /// An elementwise or indexed operation failed.
    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
