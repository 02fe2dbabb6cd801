// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # numkit
//!
//! Command-line interface for the numkit array engine.
//!
//! Arrays are read from and written to serialized buffer files (JSON, in
//! `native` or `portable` mode).
//!
//! ## Usage
//! ```bash
//! # Describe an array file
//! numkit inspect ./a.json
//!
//! # Singular values of a matrix
//! numkit svd ./a.json --out ./s.json
//!
//! # Batched product, written in portable mode
//! numkit cross ./a.json ./b.json --out ./c.json --portable
//!
//! # Time the product kernels
//! numkit bench --sizes 64,128,256
//! ```

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "numkit",
    about = "N-dimensional arrays, BLAS kernels and SVD from the command line",
    version,
    author
)]
struct Cli {
    /// Path to a TOML engine configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the layout, a preview and summary statistics of an array file.
    Inspect {
        /// Serialized buffer file.
        file: PathBuf,

        /// Number of leading elements to print.
        #[arg(long, default_value_t = 8)]
        preview: usize,
    },

    /// Decompose a rank-2 array and print its singular values.
    Svd {
        /// Serialized buffer file holding the matrix.
        file: PathBuf,

        /// Write the singular values to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generalized (batched) matrix product of two array files.
    Cross {
        /// Left operand.
        a: PathBuf,

        /// Right operand.
        b: PathBuf,

        /// Write the product to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write in portable mode instead of native bytes.
        #[arg(long)]
        portable: bool,
    },

    /// Time square products through the engine.
    Bench {
        /// Comma-separated matrix sizes (e.g., "64,128,256").
        #[arg(long, default_value = "64,128,256")]
        sizes: String,

        /// Repetitions per size.
        #[arg(long, default_value_t = 5)]
        repeats: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let engine = commands::load_engine(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { file, preview } => commands::inspect::execute(&engine, file, preview),
        Commands::Svd { file, out } => commands::svd::execute(&engine, file, out),
        Commands::Cross {
            a,
            b,
            out,
            portable,
        } => commands::cross::execute(&engine, a, b, out, portable),
        Commands::Bench { sizes, repeats } => commands::bench::execute(&engine, sizes, repeats),
    }
}
