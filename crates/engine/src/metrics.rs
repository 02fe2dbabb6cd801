// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dispatch metrics.
//!
//! [`EngineMetrics`] counts how often each engine operation ran, how many of
//! those calls an accelerated provider served, and the time spent in them.

use std::collections::BTreeMap;
use std::time::Duration;

/// Counters for one engine operation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct OpMetrics {
    pub calls: u64,
    /// Calls served by an accelerated provider.
    pub accelerated: u64,
    /// Calls that returned an error.
    pub failures: u64,
    pub total_duration: Duration,
}

/// Per-operation dispatch counters, keyed by operation name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct EngineMetrics {
    pub ops: BTreeMap<&'static str, OpMetrics>,
}

impl EngineMetrics {
    /// Creates an empty metrics container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one call of `op`.
    pub fn record(&mut self, op: &'static str, accelerated: bool, ok: bool, elapsed: Duration) {
        let entry = self.ops.entry(op).or_default();
        entry.calls += 1;
        entry.total_duration += elapsed;
        if accelerated {
            entry.accelerated += 1;
        }
        if !ok {
            entry.failures += 1;
        }
    }

    /// Counters for `op`, if it ever ran.
    pub fn get(&self, op: &str) -> Option<&OpMetrics> {
        self.ops.get(op)
    }

    /// Number of calls across all operations.
    pub fn total_calls(&self) -> u64 {
        self.ops.values().map(|m| m.calls).sum()
    }

    pub fn total_duration(&self) -> Duration {
        self.ops.values().map(|m| m.total_duration).sum()
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let accelerated: u64 = self.ops.values().map(|m| m.accelerated).sum();
        let failures: u64 = self.ops.values().map(|m| m.failures).sum();
        let per_op = self
            .ops
            .iter()
            .map(|(name, m)| format!("{name}={}", m.calls))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Engine: {} calls over {} operations ({}), {} accelerated, {} failed, {:.2}ms total",
            self.total_calls(),
            self.ops.len(),
            per_op,
            accelerated,
            failures,
            self.total_duration().as_secs_f64() * 1000.0,
        )
    }
}
