// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # engine
//!
//! The array engine that ties the numkit crates together.
//!
//! The engine owns:
//! - An [`EngineConfig`] (backend choice, metrics, SVD settings).
//! - A `KernelSet` with one BLAS provider per float type, reference by
//!   default and replaceable by injected accelerators.
//! - An `SvdProvider`.
//! - Per-operation [`EngineMetrics`].
//!
//! and exposes batched products ([`Engine::cross`], [`Engine::transform`]),
//! whole-array reductions, the SVD and the elementwise/fancy-indexing
//! operations from `broadcast`.
//!
//! # Threading
//! Arrays are single-threaded (`!Send`), and so is the engine's metrics
//! cell. Build one engine per thread.

mod config;
mod engine;
mod error;
mod linalg;
mod metrics;
mod reduce;

pub use config::{Backend, EngineConfig, SvdConfig};
pub use engine::{compute_dtype, Engine};
pub use error::EngineError;
pub use metrics::{EngineMetrics, OpMetrics};
