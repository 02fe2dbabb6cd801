// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # decomposition
//!
//! Matrix decompositions over [`array_core::ArrayView`].
//!
//! Currently a single one: the singular value decomposition [`svd`], with
//! the [`SvdProvider`] seam for plugging in an accelerated implementation.

mod error;
mod svd;

pub use error::DecompError;
pub use svd::{
    svd, ReferenceSvd, Svd, SvdOptions, SvdProvider, DEFAULT_MAX_SWEEPS, EPSILON,
};
