// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dtype-tagged scalar values and casting rules.

use std::fmt;

use num_complex::{Complex32, Complex64};

use crate::{DType, F16};

/// A single element of any supported dtype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F16(F16),
    F32(f32),
    F64(f64),
    C64(Complex32),
    C128(Complex64),
}

/// Intermediate representation every cast goes through.
#[derive(Debug, Clone, Copy)]
enum Repr {
    Int(i128),
    Float(f64),
    Complex(Complex64),
}

impl Scalar {
    /// The additive identity of `dtype`.
    pub fn zero(dtype: DType) -> Scalar {
        Scalar::I64(0).cast(dtype)
    }

    /// The multiplicative identity of `dtype`.
    pub fn one(dtype: DType) -> Scalar {
        Scalar::I64(1).cast(dtype)
    }

    pub fn dtype(&self) -> DType {
        match self {
            Scalar::Bool(_) => DType::Bool,
            Scalar::I8(_) => DType::I8,
            Scalar::U8(_) => DType::U8,
            Scalar::I16(_) => DType::I16,
            Scalar::U16(_) => DType::U16,
            Scalar::I32(_) => DType::I32,
            Scalar::U32(_) => DType::U32,
            Scalar::I64(_) => DType::I64,
            Scalar::U64(_) => DType::U64,
            Scalar::F16(_) => DType::F16,
            Scalar::F32(_) => DType::F32,
            Scalar::F64(_) => DType::F64,
            Scalar::C64(_) => DType::C64,
            Scalar::C128(_) => DType::C128,
        }
    }

    fn repr(&self) -> Repr {
        match *self {
            Scalar::Bool(v) => Repr::Int(v as i128),
            Scalar::I8(v) => Repr::Int(v as i128),
            Scalar::U8(v) => Repr::Int(v as i128),
            Scalar::I16(v) => Repr::Int(v as i128),
            Scalar::U16(v) => Repr::Int(v as i128),
            Scalar::I32(v) => Repr::Int(v as i128),
            Scalar::U32(v) => Repr::Int(v as i128),
            Scalar::I64(v) => Repr::Int(v as i128),
            Scalar::U64(v) => Repr::Int(v as i128),
            Scalar::F16(v) => Repr::Float(v.to_f64()),
            Scalar::F32(v) => Repr::Float(v as f64),
            Scalar::F64(v) => Repr::Float(v),
            Scalar::C64(v) => Repr::Complex(Complex64::new(v.re as f64, v.im as f64)),
            Scalar::C128(v) => Repr::Complex(v),
        }
    }

    /// Converts to `dtype`.
    ///
    /// Integer narrowing wraps, float-to-integer conversion saturates (NaN
    /// becomes 0), complex-to-real keeps the real part and any value cast to
    /// `Bool` becomes `value != 0`.
    pub fn cast(&self, dtype: DType) -> Scalar {
        if self.dtype() == dtype {
            return *self;
        }
        if dtype == DType::Bool {
            return Scalar::Bool(self.is_truthy());
        }
        match self.repr() {
            Repr::Int(i) => from_int(i, dtype),
            Repr::Float(f) => from_float(f, dtype),
            Repr::Complex(c) => match dtype {
                DType::C64 => Scalar::C64(Complex32::new(c.re as f32, c.im as f32)),
                DType::C128 => Scalar::C128(c),
                _ => from_float(c.re, dtype),
            },
        }
    }

    /// Numeric value as `f64` (real part for complex values).
    pub fn as_f64(&self) -> f64 {
        match self.repr() {
            Repr::Int(i) => i as f64,
            Repr::Float(f) => f,
            Repr::Complex(c) => c.re,
        }
    }

    /// Numeric value as `i128`, `None` for non-integral dtypes.
    pub fn as_i128(&self) -> Option<i128> {
        match self.repr() {
            Repr::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Complex64 {
        match self.repr() {
            Repr::Int(i) => Complex64::new(i as f64, 0.0),
            Repr::Float(f) => Complex64::new(f, 0.0),
            Repr::Complex(c) => c,
        }
    }

    /// `true` for any non-zero value.
    pub fn is_truthy(&self) -> bool {
        match self.repr() {
            Repr::Int(i) => i != 0,
            Repr::Float(f) => f != 0.0,
            Repr::Complex(c) => c.re != 0.0 || c.im != 0.0,
        }
    }

    /// `true` when the value compares equal to zero.
    pub fn is_zero(&self) -> bool {
        !self.is_truthy()
    }
}

fn from_int(i: i128, dtype: DType) -> Scalar {
    match dtype {
        DType::Bool => Scalar::Bool(i != 0),
        DType::I8 => Scalar::I8(i as i8),
        DType::U8 => Scalar::U8(i as u8),
        DType::I16 => Scalar::I16(i as i16),
        DType::U16 => Scalar::U16(i as u16),
        DType::I32 => Scalar::I32(i as i32),
        DType::U32 => Scalar::U32(i as u32),
        DType::I64 => Scalar::I64(i as i64),
        DType::U64 => Scalar::U64(i as u64),
        DType::F16 => Scalar::F16(F16::from_f64(i as f64)),
        DType::F32 => Scalar::F32(i as f32),
        DType::F64 => Scalar::F64(i as f64),
        DType::C64 => Scalar::C64(Complex32::new(i as f32, 0.0)),
        DType::C128 => Scalar::C128(Complex64::new(i as f64, 0.0)),
    }
}

fn from_float(f: f64, dtype: DType) -> Scalar {
    match dtype {
        DType::Bool => Scalar::Bool(f != 0.0),
        DType::I8 => Scalar::I8(f as i8),
        DType::U8 => Scalar::U8(f as u8),
        DType::I16 => Scalar::I16(f as i16),
        DType::U16 => Scalar::U16(f as u16),
        DType::I32 => Scalar::I32(f as i32),
        DType::U32 => Scalar::U32(f as u32),
        DType::I64 => Scalar::I64(f as i64),
        DType::U64 => Scalar::U64(f as u64),
        DType::F16 => Scalar::F16(F16::from_f64(f)),
        DType::F32 => Scalar::F32(f as f32),
        DType::F64 => Scalar::F64(f),
        DType::C64 => Scalar::C64(Complex32::new(f as f32, 0.0)),
        DType::C128 => Scalar::C128(Complex64::new(f, 0.0)),
    }
}

macro_rules! scalar_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar::$variant(v)
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    F16 => F16,
    f32 => F32,
    f64 => F64,
    Complex32 => C64,
    Complex64 => C128,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::U8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::U16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::F16(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
            Scalar::C64(v) => write!(f, "{}{:+}i", v.re, v.im),
            Scalar::C128(v) => write!(f, "{}{:+}i", v.re, v.im),
        }
    }
}
