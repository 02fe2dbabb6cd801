// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for kernel argument validation.

/// Errors raised by kernels. Every one of them is detected before the
/// first write, so a failed call leaves all operands untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    /// An operand slice is too short for the requested extent.
    #[error("{routine}: operand {operand} needs {required} elements, slice holds {len}")]
    BufferTooSmall {
        routine: &'static str,
        operand: &'static str,
        required: usize,
        len: usize,
    },

    /// A stride or leading dimension is out of range.
    #[error("{routine}: invalid argument: {detail}")]
    InvalidArgument {
        routine: &'static str,
        detail: String,
    },

    /// The provider does not implement this routine.
    #[error("{routine} is not implemented by this kernel provider")]
    Unimplemented { routine: &'static str },
}
