// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scalar arithmetic in a chosen compute dtype.
//!
//! Integers are combined in `i128` and wrapped back into the compute dtype,
//! floats in `f64` and complex values in `Complex<f64>`. `Bool` operands do
//! arithmetic as `I64` and the result is cast back to `Bool`.

use array_core::{ArrayError, DType, Scalar};
use num_complex::Complex64;

use crate::{BroadcastError, Operator};

/// Combines `lhs` and `rhs` with `op` in `dtype`.
///
/// Comparisons return `Scalar::Bool`; everything else returns a scalar of
/// `dtype`.
pub(crate) fn binary(
    op: Operator,
    lhs: Scalar,
    rhs: Scalar,
    dtype: DType,
) -> Result<Scalar, BroadcastError> {
    if dtype.is_complex() {
        return complex(op, lhs.cast(dtype).as_complex(), rhs.cast(dtype).as_complex(), dtype);
    }
    if dtype.is_float() {
        return Ok(float(op, lhs.cast(dtype).as_f64(), rhs.cast(dtype).as_f64(), dtype));
    }
    let work = if dtype.is_bool() { DType::I64 } else { dtype };
    let a = lhs.cast(work).as_i128().unwrap_or_default();
    let b = rhs.cast(work).as_i128().unwrap_or_default();
    integer(op, a, b, dtype)
}

fn compare<T: PartialOrd>(op: Operator, a: T, b: T) -> bool {
    match op {
        Operator::Eq => a == b,
        Operator::Ne => a != b,
        Operator::Gt => a > b,
        Operator::Ge => a >= b,
        Operator::Lt => a < b,
        _ => a <= b,
    }
}

fn integer(op: Operator, a: i128, b: i128, dtype: DType) -> Result<Scalar, BroadcastError> {
    if op.is_comparison() {
        return Ok(Scalar::Bool(compare(op, a, b)));
    }
    let r = match op {
        Operator::Add => a.wrapping_add(b),
        Operator::Sub => a.wrapping_sub(b),
        Operator::Mul => a.wrapping_mul(b),
        Operator::Div | Operator::Rem if b == 0 => {
            return Err(ArrayError::DivisionByZero { op: op.as_str() }.into());
        }
        Operator::Div => a.wrapping_div(b),
        Operator::Rem => a.wrapping_rem(b),
        _ => int_pow(a, b),
    };
    // Every integer dtype is at most 64 bits wide, so wrapping through i64
    // agrees with wrapping straight into the target.
    Ok(Scalar::I64(r as i64).cast(dtype))
}

/// Integer power; negative exponents truncate towards zero.
fn int_pow(base: i128, exp: i128) -> i128 {
    if exp < 0 {
        return match base {
            1 => 1,
            -1 if exp % 2 == 0 => 1,
            -1 => -1,
            _ => 0,
        };
    }
    let mut result: i128 = 1;
    let mut base = base;
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    result
}

fn float(op: Operator, a: f64, b: f64, dtype: DType) -> Scalar {
    if op.is_comparison() {
        return Scalar::Bool(compare(op, a, b));
    }
    let r = match op {
        Operator::Add => a + b,
        Operator::Sub => a - b,
        Operator::Mul => a * b,
        Operator::Div => a / b,
        Operator::Rem => a % b,
        _ => a.powf(b),
    };
    Scalar::F64(r).cast(dtype)
}

fn complex(
    op: Operator,
    a: Complex64,
    b: Complex64,
    dtype: DType,
) -> Result<Scalar, BroadcastError> {
    let r = match op {
        Operator::Eq => return Ok(Scalar::Bool(a == b)),
        Operator::Ne => return Ok(Scalar::Bool(a != b)),
        Operator::Rem | Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => {
            return Err(ArrayError::UnsupportedDtype { op: op.as_str(), dtype }.into());
        }
        Operator::Add => a + b,
        Operator::Sub => a - b,
        Operator::Mul => a * b,
        Operator::Div if b.norm_sqr() == 0.0 => Complex64::new(f64::NAN, f64::NAN),
        Operator::Div => a / b,
        Operator::Pow => a.powc(b),
    };
    Ok(Scalar::C128(r).cast(dtype))
}
