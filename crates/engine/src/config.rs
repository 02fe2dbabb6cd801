// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! backend = "auto"
//! record_metrics = true
//!
//! [svd]
//! max_sweeps = 30
//! strict_convergence = false
//! ```

use std::path::Path;

use decomposition::{SvdOptions, DEFAULT_MAX_SWEEPS};

use crate::EngineError;

/// Which kernels serve engine calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Injected accelerators serve the dtypes they cover; the reference
    /// kernels serve the rest.
    Auto,
    /// Always the reference kernels, even when an accelerator is injected.
    Reference,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Reference => "reference",
        }
    }
}

/// Configuration for the array engine.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Backend name: `"auto"` or `"reference"`.
    pub backend: String,
    /// Whether to count dispatches in the engine's metrics.
    #[serde(default = "default_true")]
    pub record_metrics: bool,
    #[serde(default)]
    pub svd: SvdConfig,
}

/// Settings for the singular value decomposition.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SvdConfig {
    /// QR sweeps allowed per singular value.
    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,
    /// Fail instead of warning when a singular value does not converge.
    #[serde(default)]
    pub strict_convergence: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_sweeps() -> usize {
    DEFAULT_MAX_SWEEPS
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self {
            max_sweeps: DEFAULT_MAX_SWEEPS,
            strict_convergence: false,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, EngineError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| EngineError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the backend name and the SVD sweep limit.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.resolve_backend()?;
        if self.svd.max_sweeps == 0 {
            return Err(EngineError::ConfigError(
                "svd.max_sweeps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses the backend name.
    pub fn resolve_backend(&self) -> Result<Backend, EngineError> {
        match self.backend.to_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "reference" | "ref" => Ok(Backend::Reference),
            other => Err(EngineError::ConfigError(format!(
                "unknown backend '{other}'; expected 'auto' or 'reference'"
            ))),
        }
    }

    /// Options passed to every decomposition.
    pub fn svd_options(&self) -> SvdOptions {
        SvdOptions {
            max_sweeps: self.svd.max_sweeps,
            strict: self.svd.strict_convergence,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_string(),
            record_metrics: true,
            svd: SvdConfig::default(),
        }
    }
}
