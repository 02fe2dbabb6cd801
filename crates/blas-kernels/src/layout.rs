// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operand descriptors, layout flags and argument validation.
//!
//! Kernels never see a shape. Vectors are `(slice, offset, inc)` and matrices
//! are `(slice, offset, ld)`; storage order and transposition only decide
//! which of the two strides walks a row:
//!
//! ```text
//!   RowMajor, NoTrans   (i, j) -> offset + i*ld + j
//!   ColMajor, NoTrans   (i, j) -> offset + i + j*ld
//!   any order, Trans    row and column strides swapped
//! ```

use std::fmt::Debug;
use std::iter::Sum;

use num_traits::Float;

use crate::{KernelError, KernelProvider, KernelSet};

/// Element types the kernels are generic over.
pub trait BlasFloat: Float + Sum + Debug + Send + Sync + 'static {
    /// Picks this element type's provider out of a [`KernelSet`].
    fn provider(set: &KernelSet) -> &dyn KernelProvider<Self>;
}

impl BlasFloat for f32 {
    fn provider(set: &KernelSet) -> &dyn KernelProvider<f32> {
        set.f32.as_ref()
    }
}

impl BlasFloat for f64 {
    fn provider(set: &KernelSet) -> &dyn KernelProvider<f64> {
        set.f64.as_ref()
    }
}

/// Storage order of a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    RowMajor,
    ColMajor,
}

/// Whether a matrix operand is used as stored or transposed.
///
/// `ConjTrans` is accepted for symmetry with complex BLAS and behaves as
/// `Trans` on real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transpose {
    NoTrans,
    Trans,
    ConjTrans,
}

impl Transpose {
    pub fn is_transposed(self) -> bool {
        !matches!(self, Transpose::NoTrans)
    }
}

/// Side a symmetric or triangular operand multiplies from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Which triangle of a symmetric or triangular operand is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uplo {
    Upper,
    Lower,
}

impl Uplo {
    /// `true` if `(i, j)` lies in this triangle (diagonal included).
    pub fn contains(self, i: usize, j: usize) -> bool {
        match self {
            Uplo::Upper => j >= i,
            Uplo::Lower => j <= i,
        }
    }
}

/// Whether a triangular operand has an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diag {
    NonUnit,
    Unit,
}

/// A read-only strided vector operand.
#[derive(Debug, Clone, Copy)]
pub struct Strided<'a, T> {
    pub data: &'a [T],
    pub offset: usize,
    pub inc: usize,
}

impl<'a, T: Copy> Strided<'a, T> {
    pub fn new(data: &'a [T], offset: usize, inc: usize) -> Self {
        Self { data, offset, inc }
    }

    /// The whole slice with unit stride.
    pub fn contiguous(data: &'a [T]) -> Self {
        Self::new(data, 0, 1)
    }

    #[inline]
    pub(crate) fn at(&self, i: usize) -> T {
        self.data[self.offset + i * self.inc]
    }

    pub(crate) fn check(
        &self,
        routine: &'static str,
        operand: &'static str,
        n: usize,
    ) -> Result<(), KernelError> {
        check_vector(routine, operand, self.data.len(), self.offset, self.inc, n)
    }
}

/// A mutable strided vector operand.
#[derive(Debug)]
pub struct StridedMut<'a, T> {
    pub data: &'a mut [T],
    pub offset: usize,
    pub inc: usize,
}

impl<'a, T: Copy> StridedMut<'a, T> {
    pub fn new(data: &'a mut [T], offset: usize, inc: usize) -> Self {
        Self { data, offset, inc }
    }

    pub fn contiguous(data: &'a mut [T]) -> Self {
        Self::new(data, 0, 1)
    }

    #[inline]
    pub(crate) fn at(&self, i: usize) -> T {
        self.data[self.offset + i * self.inc]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[self.offset + i * self.inc]
    }

    pub(crate) fn check(
        &self,
        routine: &'static str,
        operand: &'static str,
        n: usize,
    ) -> Result<(), KernelError> {
        check_vector(routine, operand, self.data.len(), self.offset, self.inc, n)
    }
}

/// A read-only matrix operand.
#[derive(Debug, Clone, Copy)]
pub struct Matrix<'a, T> {
    pub data: &'a [T],
    pub offset: usize,
    pub ld: usize,
}

impl<'a, T: Copy> Matrix<'a, T> {
    pub fn new(data: &'a [T], offset: usize, ld: usize) -> Self {
        Self { data, offset, ld }
    }

    /// Resolves the element mapping of `op(self)`, a `rows × cols` matrix.
    pub(crate) fn access(
        &self,
        routine: &'static str,
        operand: &'static str,
        order: Order,
        trans: Transpose,
        rows: usize,
        cols: usize,
    ) -> Result<Access, KernelError> {
        Access::resolve(
            routine,
            operand,
            self.data.len(),
            self.offset,
            self.ld,
            order,
            trans,
            rows,
            cols,
        )
    }
}

/// A mutable matrix operand.
#[derive(Debug)]
pub struct MatrixMut<'a, T> {
    pub data: &'a mut [T],
    pub offset: usize,
    pub ld: usize,
}

impl<'a, T: Copy> MatrixMut<'a, T> {
    pub fn new(data: &'a mut [T], offset: usize, ld: usize) -> Self {
        Self { data, offset, ld }
    }

    pub(crate) fn access(
        &self,
        routine: &'static str,
        operand: &'static str,
        order: Order,
        rows: usize,
        cols: usize,
    ) -> Result<Access, KernelError> {
        Access::resolve(
            routine,
            operand,
            self.data.len(),
            self.offset,
            self.ld,
            order,
            Transpose::NoTrans,
            rows,
            cols,
        )
    }
}

/// Validated element mapping `(i, j) -> offset + i*rs + j*cs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Access {
    pub offset: usize,
    pub rs: usize,
    pub cs: usize,
}

impl Access {
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        routine: &'static str,
        operand: &'static str,
        len: usize,
        offset: usize,
        ld: usize,
        order: Order,
        trans: Transpose,
        rows: usize,
        cols: usize,
    ) -> Result<Access, KernelError> {
        let (stored_rows, stored_cols) = if trans.is_transposed() {
            (cols, rows)
        } else {
            (rows, cols)
        };
        let (minor, rs, cs) = match order {
            Order::RowMajor => (stored_cols, ld, 1),
            Order::ColMajor => (stored_rows, 1, ld),
        };
        if ld < minor.max(1) {
            return Err(KernelError::InvalidArgument {
                routine,
                detail: format!("leading dimension of {operand} is {ld}, must be >= {}", minor.max(1)),
            });
        }
        let (rs, cs) = if trans.is_transposed() { (cs, rs) } else { (rs, cs) };
        let access = Access { offset, rs, cs };
        if rows > 0 && cols > 0 {
            let required = access.index(rows - 1, cols - 1) + 1;
            if required > len {
                return Err(KernelError::BufferTooSmall {
                    routine,
                    operand,
                    required,
                    len,
                });
            }
        }
        Ok(access)
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        self.offset + i * self.rs + j * self.cs
    }

    /// The same mapping shifted by `delta` elements.
    pub fn shifted(&self, delta: usize) -> Access {
        Access {
            offset: self.offset + delta,
            ..*self
        }
    }
}

fn check_vector(
    routine: &'static str,
    operand: &'static str,
    len: usize,
    offset: usize,
    inc: usize,
    n: usize,
) -> Result<(), KernelError> {
    if inc == 0 {
        return Err(KernelError::InvalidArgument {
            routine,
            detail: format!("increment of {operand} must be >= 1"),
        });
    }
    if n == 0 {
        return Ok(());
    }
    let required = offset + (n - 1) * inc + 1;
    if required > len {
        return Err(KernelError::BufferTooSmall {
            routine,
            operand,
            required,
            len,
        });
    }
    Ok(())
}
