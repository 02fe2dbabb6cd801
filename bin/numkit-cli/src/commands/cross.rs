// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `numkit cross` command: batched matrix product of two array files.

use std::path::PathBuf;

use anyhow::Context;
use array_core::SerialMode;
use engine::Engine;

pub fn execute(
    engine: &Engine,
    a: PathBuf,
    b: PathBuf,
    out: Option<PathBuf>,
    portable: bool,
) -> anyhow::Result<()> {
    let lhs = super::read_array(&a)?;
    let rhs = super::read_array(&b)?;
    let product = engine.cross(&lhs, &rhs).with_context(|| {
        format!(
            "cannot multiply {} {} by {} {}",
            lhs.dtype(),
            lhs.shape(),
            rhs.dtype(),
            rhs.shape()
        )
    })?;

    println!(
        "  {} x {} -> {} {}",
        lhs.shape(),
        rhs.shape(),
        product.dtype(),
        product.shape()
    );
    match out {
        Some(path) => {
            let mode = if portable { SerialMode::Portable } else { SerialMode::Native };
            super::write_array(&product, &path, mode)?;
        }
        None => println!("  {}", super::preview(&product, 16)),
    }
    Ok(())
}
