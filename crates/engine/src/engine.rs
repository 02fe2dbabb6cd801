// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`Engine`]: backend selection, metrics and the pass-through
//! operations.
//!
//! ```text
//!            ┌──────────────┐
//!  cross ───►│              │──► KernelProvider<f32> (reference | accelerator)
//!  reduce ──►│    Engine    │──► KernelProvider<f64> (reference | accelerator)
//!  apply ───►│              │──► SvdProvider
//!            └──────────────┘
//! ```
//!
//! Kernels compute in `f32` for `F16`/`F32` inputs and in `f64` for every
//! other real dtype; complex inputs are rejected.

use std::cell::RefCell;
use std::time::Instant;

use array_core::{ArrayError, ArrayView, DType, Value};
use blas_kernels::{KernelProvider, KernelSet};
use broadcast::{AssignOp, Operator};
use decomposition::{ReferenceSvd, Svd, SvdProvider};

use crate::{Backend, EngineConfig, EngineError, EngineMetrics};

/// Front door to the array operations.
///
/// # Example
/// ```
/// use array_core::ArrayView;
/// use engine::Engine;
///
/// let engine = Engine::default();
/// let a = ArrayView::from_vec([2, 2], vec![1.0f64, 2.0, 3.0, 4.0]).unwrap();
/// let x = ArrayView::from_vec([2], vec![1.0f64, 1.0]).unwrap();
/// let y = engine.cross(&a, &x).unwrap();
/// assert_eq!(y.to_vec::<f64>().unwrap(), vec![3.0, 7.0]);
/// assert_eq!(engine.metrics().total_calls(), 1);
/// ```
pub struct Engine {
    config: EngineConfig,
    backend: Backend,
    pub(crate) kernels: KernelSet,
    svd_provider: Box<dyn SvdProvider>,
    metrics: RefCell<EngineMetrics>,
}

impl Engine {
    /// Creates an engine from the given configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let backend = config.resolve_backend()?;
        Ok(Self::build(config, backend))
    }

    fn build(config: EngineConfig, backend: Backend) -> Self {
        tracing::info!(
            "engine created with backend '{}' (svd max_sweeps={}, strict={})",
            backend.as_str(),
            config.svd.max_sweeps,
            config.svd.strict_convergence
        );
        Self {
            config,
            backend,
            kernels: KernelSet::reference(),
            svd_provider: Box::new(ReferenceSvd),
            metrics: RefCell::new(EngineMetrics::new()),
        }
    }

    /// Injects an `f32` kernel provider. Ignored under the `reference`
    /// backend.
    pub fn with_accelerator_f32(mut self, provider: Box<dyn KernelProvider<f32>>) -> Self {
        if self.refuses_accelerator(provider.name()) {
            return self;
        }
        tracing::info!("f32 kernels: {}", provider.name());
        self.kernels = std::mem::take(&mut self.kernels).with_f32(provider);
        self
    }

    /// Injects an `f64` kernel provider. Ignored under the `reference`
    /// backend.
    pub fn with_accelerator_f64(mut self, provider: Box<dyn KernelProvider<f64>>) -> Self {
        if self.refuses_accelerator(provider.name()) {
            return self;
        }
        tracing::info!("f64 kernels: {}", provider.name());
        self.kernels = std::mem::take(&mut self.kernels).with_f64(provider);
        self
    }

    /// Replaces the decomposition provider. Ignored under the `reference`
    /// backend.
    pub fn with_svd_provider(mut self, provider: Box<dyn SvdProvider>) -> Self {
        if self.refuses_accelerator(provider.name()) {
            return self;
        }
        tracing::info!("svd provider: {}", provider.name());
        self.svd_provider = provider;
        self
    }

    fn refuses_accelerator(&self, name: &str) -> bool {
        if self.backend == Backend::Reference {
            tracing::warn!("backend is 'reference'; ignoring provider '{name}'");
            return true;
        }
        false
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The kernels currently serving each float dtype.
    pub fn kernels(&self) -> &KernelSet {
        &self.kernels
    }

    /// A snapshot of the dispatch counters.
    pub fn metrics(&self) -> EngineMetrics {
        self.metrics.borrow().clone()
    }

    pub fn reset_metrics(&self) {
        *self.metrics.borrow_mut() = EngineMetrics::new();
    }

    /// `true` if an accelerated provider serves `dtype`.
    pub fn is_accelerated(&self, dtype: DType) -> bool {
        match dtype {
            DType::F32 => self.kernels.provider::<f32>().is_accelerated(),
            DType::F64 => self.kernels.provider::<f64>().is_accelerated(),
            _ => false,
        }
    }

    /// Runs `f`, recording the call under `op`.
    pub(crate) fn timed<R, E>(
        &self,
        op: &'static str,
        accelerated: bool,
        f: impl FnOnce() -> Result<R, E>,
    ) -> Result<R, E> {
        let start = Instant::now();
        let result = f();
        if self.config.record_metrics {
            self.metrics
                .borrow_mut()
                .record(op, accelerated, result.is_ok(), start.elapsed());
        }
        result
    }

    /// Runs a kernel-backed operation in the compute dtype of `dtype`,
    /// handing each path the provider for its element type.
    pub(crate) fn dispatch<R>(
        &self,
        op: &'static str,
        dtype: DType,
        on_f32: impl FnOnce(&dyn KernelProvider<f32>) -> Result<R, EngineError>,
        on_f64: impl FnOnce(&dyn KernelProvider<f64>) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let compute = compute_dtype(op, dtype);
        let accelerated = compute.as_ref().map_or(false, |d| self.is_accelerated(*d));
        self.timed(op, accelerated, || match compute? {
            DType::F32 => {
                let provider = self.kernels.provider::<f32>();
                tracing::debug!(op, dtype = %dtype, provider = provider.name(), "dispatch f32");
                on_f32(provider)
            }
            _ => {
                let provider = self.kernels.provider::<f64>();
                tracing::debug!(op, dtype = %dtype, provider = provider.name(), "dispatch f64");
                on_f64(provider)
            }
        })
    }

    /// Singular value decomposition with the configured sweep limit.
    pub fn svd(&self, a: &ArrayView) -> Result<Svd, EngineError> {
        let options = self.config.svd_options();
        let provider = self.svd_provider.as_ref();
        tracing::debug!(op = "svd", shape = %a.shape(), provider = provider.name(), "dispatch");
        self.timed("svd", provider.is_accelerated(), || {
            Ok(provider.svd(a, &options)?)
        })
    }

    /// Elementwise `x op y`; see [`broadcast::apply`].
    pub fn apply(
        &self,
        x: &Value,
        op: Operator,
        y: &Value,
        out: Option<&ArrayView>,
    ) -> Result<Value, EngineError> {
        let accelerated = self.is_accelerated(x.dtype().promote(y.dtype()));
        self.timed("apply", accelerated, || {
            Ok(broadcast::apply(&self.kernels, x, op, y, out)?)
        })
    }

    /// In-place `x op= y`; see [`broadcast::apply_assign`].
    pub fn apply_assign(&self, x: &ArrayView, op: AssignOp, y: &Value) -> Result<(), EngineError> {
        self.timed("apply_assign", self.is_accelerated(x.dtype()), || {
            Ok(broadcast::apply_assign(&self.kernels, x, op, y)?)
        })
    }

    /// Fancy-indexed read; see [`broadcast::select`].
    pub fn select(&self, x: &ArrayView, masks: &[ArrayView]) -> Result<Value, EngineError> {
        self.timed("select", false, || Ok(broadcast::select(x, masks)?))
    }

    /// Fancy-indexed write; see [`broadcast::update`].
    pub fn update(
        &self,
        x: &ArrayView,
        op: AssignOp,
        value: &Value,
        masks: &[ArrayView],
    ) -> Result<(), EngineError> {
        self.timed("update", false, || Ok(broadcast::update(x, op, value, masks)?))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), Backend::Auto)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("backend", &self.backend)
            .field("kernels", &self.kernels)
            .field("svd", &self.svd_provider.name())
            .finish()
    }
}

/// The kernel element type for inputs of `dtype`.
pub fn compute_dtype(op: &'static str, dtype: DType) -> Result<DType, ArrayError> {
    match dtype {
        DType::F16 | DType::F32 => Ok(DType::F32),
        d if d.is_complex() => Err(ArrayError::UnsupportedDtype { op, dtype }),
        _ => Ok(DType::F64),
    }
}
