// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # blas-kernels
//!
//! Reference BLAS-style kernels over plain slices.
//!
//! This crate provides:
//! - Level 1: [`scal`], [`axpy`], [`dot`], [`asum`], [`nrm2`], [`copy`],
//!   [`swap`], [`iamax`], [`iamin`], [`rotg`], [`rot`].
//! - Level 2: [`gemv`].
//! - Level 3: [`gemm`], [`symm`], [`syrk`], [`syr2k`] and the Cartesian
//!   batched [`gemm3`].
//! - [`KernelProvider`] — the capability trait an accelerated backend
//!   implements, with the reference kernels as its defaults.
//!
//! # Design Goals
//! - No allocation in any kernel.
//! - Every operand is validated before the first write.
//! - Storage order and transposition remap strides; nothing is transposed
//!   in memory.

mod error;
mod layout;
mod level1;
mod level2;
mod level3;
mod provider;

pub use error::KernelError;
pub use layout::{
    BlasFloat, Diag, Matrix, MatrixMut, Order, Side, Strided, StridedMut, Transpose, Uplo,
};
pub use level1::{asum, axpy, copy, dot, iamax, iamin, nrm2, rot, rotg, scal, swap, Givens};
pub use level2::gemv;
pub use level3::{gemm, gemm3, symm, syr2k, syrk};
pub use provider::{KernelProvider, KernelSet, ReferenceKernels};
