// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `numkit svd` command: singular values, rank and convergence of a matrix.

use std::path::PathBuf;

use anyhow::Context;
use array_core::SerialMode;
use engine::Engine;

/// Fractions of the singular value mass reported as truncation points.
const MASS_LEVELS: [f64; 3] = [0.9, 0.99, 0.999];

pub fn execute(engine: &Engine, file: PathBuf, out: Option<PathBuf>) -> anyhow::Result<()> {
    let a = super::read_array(&file)?;
    let f = engine
        .svd(&a)
        .with_context(|| format!("svd of '{}' failed", file.display()))?;

    let s = f.singular_values();
    println!("  Matrix:   {} {}", a.dtype(), a.shape());
    println!(
        "  Status:   {} after {} sweeps",
        if f.converged { "converged" } else { "NOT converged" },
        f.sweeps
    );
    println!("  Rank:     {} (numerical)", f.numerical_rank());
    println!("  Values:   {}", super::preview(&f.s, s.len()));
    for mass in MASS_LEVELS {
        println!(
            "  {:>5.1}% of mass in the first {} values",
            mass * 100.0,
            f.truncation_index(mass)
        );
    }

    if let Some(path) = out {
        super::write_array(&f.s, &path, SerialMode::Native)?;
    }
    Ok(())
}
