// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # broadcast
//!
//! Elementwise arithmetic over [`array_core::Value`]s.
//!
//! This crate provides:
//! - [`Operator`] / [`AssignOp`] — closed operator enums parsed from their
//!   tokens (`"**"`, `"+="`, ...).
//! - [`apply`] / [`apply_assign`] — binary operations with restricted
//!   broadcasting, routed to BLAS kernels where a fast path exists.
//! - [`select`] / [`update`] — boolean and integer fancy indexing.

mod arith;
mod elementwise;
mod error;
mod fancy;
mod operator;

pub use elementwise::{apply, apply_assign};
pub use error::BroadcastError;
pub use fancy::{select, update};
pub use operator::{AssignOp, Operator};
