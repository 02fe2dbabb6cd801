// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `numkit bench` command: time square products through the engine.

use std::time::Instant;

use array_core::{ArrayView, DType};
use engine::Engine;

/// One timed configuration.
struct BenchResult {
    size: usize,
    dtype: DType,
    best_ms: f64,
    gflops: f64,
}

pub fn execute(engine: &Engine, sizes: String, repeats: usize) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              numkit · Kernel Benchmark               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let sizes = parse_sizes(&sizes)?;
    let repeats = repeats.max(1);

    println!(
        "  {:<8} {:<6} {:>12} {:>10}",
        "Size", "DType", "Best", "GFLOP/s",
    );
    println!("  {}", "-".repeat(40));

    let mut results = Vec::new();
    for &n in &sizes {
        for dtype in [DType::F32, DType::F64] {
            let r = run_single(engine, n, dtype, repeats)?;
            println!(
                "  {:<8} {:<6} {:>10.3}ms {:>10.2}",
                r.size, r.dtype, r.best_ms, r.gflops,
            );
            results.push(r);
        }
    }
    println!();

    if let Some(peak) = results.iter().max_by(|a, b| a.gflops.total_cmp(&b.gflops)) {
        println!(
            "  Peak: {:.2} GFLOP/s ({} {}x{})",
            peak.gflops, peak.dtype, peak.size, peak.size
        );
    }
    println!("  {}", engine.metrics().summary());
    Ok(())
}

fn run_single(engine: &Engine, n: usize, dtype: DType, repeats: usize) -> anyhow::Result<BenchResult> {
    let values: Vec<f64> = (0..n * n).map(|i| (i % 17) as f64 * 0.125 - 1.0).collect();
    let a = ArrayView::from_vec([n, n], values)?.astype(dtype);
    let mut best = f64::INFINITY;
    for _ in 0..repeats {
        let start = Instant::now();
        engine.cross(&a, &a)?;
        best = best.min(start.elapsed().as_secs_f64());
    }
    let flops = 2.0 * (n as f64).powi(3);
    let gflops = if best > 0.0 { flops / best / 1e9 } else { 0.0 };
    Ok(BenchResult {
        size: n,
        dtype,
        best_ms: best * 1000.0,
        gflops,
    })
}

/// Parses a comma-separated list of positive sizes.
fn parse_sizes(s: &str) -> anyhow::Result<Vec<usize>> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<usize>() {
                Ok(0) | Err(_) => Err(anyhow::anyhow!("invalid size '{part}'")),
                Ok(n) => Ok(n),
            }
        })
        .collect()
}
