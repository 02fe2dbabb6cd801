// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # array-core
//!
//! Shared-buffer N-dimensional arrays.
//!
//! This crate provides:
//! - [`Buffer`] — flat, reference-counted, mutable storage of one dtype.
//! - [`ArrayView`] — a shape + offset window over a buffer; slicing and
//!   reshaping never copy.
//! - [`DType`] — the fourteen element types and their promotion order.
//! - [`Scalar`] and [`Value`] — single elements and scalar-or-array operands.
//! - [`SerializedBuffer`] — the native / portable serialized form.
//!
//! # Design Goals
//! - Views alias: a write through one view is seen by every other view of
//!   the same buffer region.
//! - Storage is always contiguous and row-major; strides are derived.
//! - Clean error types via `thiserror`.

mod buffer;
mod dtype;
mod error;
mod half;
mod scalar;
mod serial;
mod shape;
mod value;
mod view;

pub use buffer::{Buffer, BufferData, Element};
pub use dtype::DType;
pub use error::ArrayError;
pub use half::F16;
pub use num_complex::{Complex32, Complex64};
pub use scalar::Scalar;
pub use serial::{PortableElement, SerialMode, SerializedBuffer};
pub use shape::Shape;
pub use value::Value;
pub use view::ArrayView;
