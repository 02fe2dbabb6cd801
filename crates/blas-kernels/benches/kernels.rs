// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the reference kernels.

use blas_kernels::{axpy, gemm, gemv, Matrix, MatrixMut, Order, Strided, StridedMut, Transpose};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn filled(len: usize) -> Vec<f64> {
    (0..len).map(|i| (i % 17) as f64 * 0.25 - 2.0).collect()
}

fn bench_axpy(c: &mut Criterion) {
    let mut group = c.benchmark_group("axpy");
    for n in [1_000usize, 100_000] {
        let x = filled(n);
        let mut y = filled(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, &n| {
            bench.iter(|| {
                axpy(n, black_box(0.5), Strided::contiguous(&x), StridedMut::contiguous(&mut y))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_gemv(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemv");
    for n in [64usize, 256] {
        let a = filled(n * n);
        let x = filled(n);
        let mut y = vec![0.0; n];
        for trans in [Transpose::NoTrans, Transpose::Trans] {
            let id = BenchmarkId::new(format!("{trans:?}"), n);
            group.bench_with_input(id, &n, |bench, &n| {
                bench.iter(|| {
                    gemv(
                        Order::RowMajor,
                        trans,
                        n,
                        n,
                        1.0,
                        Matrix::new(&a, 0, n),
                        Strided::contiguous(&x),
                        0.0,
                        StridedMut::contiguous(&mut y),
                    )
                    .unwrap()
                })
            });
        }
    }
    group.finish();
}

fn bench_gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm");
    group.sample_size(20);
    for n in [32usize, 128] {
        let a = filled(n * n);
        let b = filled(n * n);
        let mut out = vec![0.0; n * n];
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, &n| {
            bench.iter(|| {
                gemm(
                    Order::RowMajor,
                    Transpose::NoTrans,
                    Transpose::NoTrans,
                    n,
                    n,
                    n,
                    1.0,
                    Matrix::new(&a, 0, n),
                    Matrix::new(&b, 0, n),
                    0.0,
                    MatrixMut::new(&mut out, 0, n),
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_axpy, bench_gemv, bench_gemm);
criterion_main!(benches);
