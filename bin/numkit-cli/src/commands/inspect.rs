// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `numkit inspect` command: layout, preview and statistics of an array file.

use std::path::PathBuf;

use engine::Engine;

pub fn execute(engine: &Engine, file: PathBuf, preview: usize) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              numkit · Array Inspector                ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let view = super::read_array(&file)?;

    // ── Layout ─────────────────────────────────────────────────
    println!("  File:     {}", file.display());
    println!("  DType:    {} ({} bytes/element)", view.dtype(), view.dtype().size_bytes());
    println!("  Shape:    {} (rank {})", view.shape(), view.rank());
    println!(
        "  Elements: {} ({} bytes)",
        view.size(),
        view.shape().size_bytes(view.dtype())
    );
    println!("  Offset:   {} of {} buffer elements", view.offset(), view.buffer().len());
    println!("  Values:   {}", super::preview(&view, preview));
    println!();

    // ── Statistics ─────────────────────────────────────────────
    if view.dtype().is_complex() {
        println!("  Statistics are not defined for complex arrays.");
        return Ok(());
    }
    if view.size() == 0 {
        println!("  Empty array.");
        return Ok(());
    }
    let argmax = engine.argmax(&view)?;
    let argmin = engine.argmin(&view)?;
    println!("  {:<16} {}", "sum", engine.sum(&view)?);
    println!("  {:<16} {}", "mean", engine.mean(&view)?);
    println!("  {:<16} {}", "norm", engine.norm(&view)?);
    println!("  {:<16} {}", "abs sum", engine.asum(&view)?);
    println!("  {:<16} {} ({})", "max |x| at", argmax, view.flat_get(argmax)?);
    println!("  {:<16} {} ({})", "min |x| at", argmin, view.flat_get(argmin)?);
    println!();
    tracing::debug!("{}", engine.metrics().summary());
    Ok(())
}
