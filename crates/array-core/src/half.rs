// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! IEEE 754 half-precision storage type.
//!
//! Values are stored as raw bits and widened to `f32` for every arithmetic
//! operation. Narrowing rounds to nearest with ties to even; overflow
//! saturates to infinity and underflow flushes to a signed zero.

use std::cmp::Ordering;
use std::fmt;

/// A 16-bit float stored as its bit pattern.
#[derive(Clone, Copy, Default)]
pub struct F16(u16);

impl F16 {
    pub const ZERO: F16 = F16(0);
    pub const ONE: F16 = F16(0x3C00);

    /// Wraps a raw bit pattern.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw bit pattern.
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Narrows an `f32`, rounding to nearest with ties to even.
    pub fn from_f32(x: f32) -> Self {
        Self::from_f64(f64::from(x))
    }

    /// Narrows an `f64` in a single rounding step, to nearest with ties
    /// to even.
    pub fn from_f64(x: f64) -> Self {
        let bits = x.to_bits();
        let sign = ((bits >> 48) & 0x8000) as u16;
        let exp = ((bits >> 52) & 0x7FF) as i32;
        let frac = bits & 0xF_FFFF_FFFF_FFFF;

        if exp == 0x7FF {
            let nan = if frac != 0 { 0x200 } else { 0 };
            return Self(sign | 0x7C00 | nan);
        }
        let new_exp = exp - 1023 + 15;
        if new_exp >= 31 {
            return Self(sign | 0x7C00);
        }
        if new_exp >= 1 {
            // A carry out of the mantissa bumps the exponent, and past the
            // largest finite value lands on infinity.
            let rounded = ((new_exp as u64) << 10) + round_shift(frac, 42);
            return Self(sign | rounded as u16);
        }
        // Subnormal: the implicit leading bit joins the fraction.
        let shift = 42 + (1 - new_exp) as u32;
        if shift > 53 {
            return Self(sign);
        }
        Self(sign | round_shift(frac | (1 << 52), shift) as u16)
    }

    /// Widens to `f32` exactly.
    pub fn to_f32(self) -> f32 {
        let h = self.0;
        let sign = ((h as u32) & 0x8000) << 16;
        let exp = ((h >> 10) & 0x1F) as u32;
        let frac = (h & 0x3FF) as u32;

        if exp == 0 {
            if frac == 0 {
                return f32::from_bits(sign);
            }
            let mut e = 0u32;
            let mut f = frac;
            while f & 0x400 == 0 {
                f <<= 1;
                e += 1;
            }
            let exp32 = 127 - 15 + 1 - e;
            return f32::from_bits(sign | (exp32 << 23) | ((f & 0x3FF) << 13));
        }
        if exp == 31 {
            return f32::from_bits(sign | 0x7F80_0000 | (frac << 13));
        }
        f32::from_bits(sign | ((exp + 127 - 15) << 23) | (frac << 13))
    }

    pub fn to_f64(self) -> f64 {
        self.to_f32() as f64
    }

    pub fn is_finite(self) -> bool {
        (self.0 & 0x7C00) != 0x7C00
    }
}


/// `value >> shift`, rounded to nearest with ties to even. `shift >= 1`.
fn round_shift(value: u64, shift: u32) -> u64 {
    let kept = value >> shift;
    let rest = value & ((1u64 << shift) - 1);
    let half = 1u64 << (shift - 1);
    if rest > half || (rest == half && kept & 1 == 1) {
        kept + 1
    } else {
        kept
    }
}

impl PartialEq for F16 {
    fn eq(&self, other: &Self) -> bool {
        self.to_f32() == other.to_f32()
    }
}

impl PartialOrd for F16 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.to_f32().partial_cmp(&other.to_f32())
    }
}

impl fmt::Debug for F16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}f16", self.to_f32())
    }
}

impl fmt::Display for F16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f32(), f)
    }
}
