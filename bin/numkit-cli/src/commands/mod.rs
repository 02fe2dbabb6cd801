// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and the helpers they share.

pub mod bench;
pub mod cross;
pub mod inspect;
pub mod svd;

use std::path::Path;

use anyhow::Context;
use array_core::{ArrayView, SerialMode, SerializedBuffer};
use engine::{Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the engine from `--config`, or the defaults.
pub fn load_engine(config: Option<&Path>) -> anyhow::Result<Engine> {
    let config = match config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    Ok(Engine::new(config)?)
}

/// Reads a serialized buffer file into a view.
pub fn read_array(path: &Path) -> anyhow::Result<ArrayView> {
    let serialized = SerializedBuffer::from_file(path)
        .with_context(|| format!("failed to read array from '{}'", path.display()))?;
    serialized
        .into_view()
        .with_context(|| format!("'{}' is not a valid array file", path.display()))
}

/// Writes `view` (its whole buffer) as a serialized buffer file.
pub fn write_array(view: &ArrayView, path: &Path, mode: SerialMode) -> anyhow::Result<()> {
    let json = view.to_serialized(mode).to_json_pretty()?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    tracing::info!("wrote {} {} array to '{}'", view.dtype(), view.shape(), path.display());
    Ok(())
}

/// Formats up to `limit` leading elements, with an ellipsis if truncated.
pub fn preview(view: &ArrayView, limit: usize) -> String {
    let values = view.scalars();
    let mut parts: Vec<String> = values.iter().take(limit).map(|s| s.to_string()).collect();
    if values.len() > limit {
        parts.push(format!("... ({} more)", values.len() - limit));
    }
    format!("[{}]", parts.join(", "))
}
