// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported array element data types.

use std::fmt;
use std::str::FromStr;

use crate::ArrayError;

/// Enumerates the element types a [`crate::Buffer`] can hold.
///
/// The declaration order is the promotion ranking used by mixed-dtype
/// arithmetic: the result of combining two dtypes is the larger of the two
/// (`Bool < I8 < U8 < I16 < … < F64 < C64 < C128`). Do not reorder variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// Boolean, stored one byte per element.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit signed integer.
    I16,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit signed integer.
    I32,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit signed integer.
    I64,
    /// 64-bit unsigned integer.
    U64,
    /// 16-bit IEEE 754 floating point.
    F16,
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 64-bit IEEE 754 floating point.
    F64,
    /// Complex number made of two `f32`.
    C64,
    /// Complex number made of two `f64`.
    C128,
}

impl DType {
    /// Every dtype, in promotion order.
    pub const ALL: [DType; 14] = [
        DType::Bool,
        DType::I8,
        DType::U8,
        DType::I16,
        DType::U16,
        DType::I32,
        DType::U32,
        DType::I64,
        DType::U64,
        DType::F16,
        DType::F32,
        DType::F64,
        DType::C64,
        DType::C128,
    ];

    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::Bool | DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 | DType::F16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 | DType::C64 => 8,
            DType::C128 => 16,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::I8 => "i8",
            DType::U8 => "u8",
            DType::I16 => "i16",
            DType::U16 => "u16",
            DType::I32 => "i32",
            DType::U32 => "u32",
            DType::I64 => "i64",
            DType::U64 => "u64",
            DType::F16 => "f16",
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::C64 => "c64",
            DType::C128 => "c128",
        }
    }

    /// The dtype two operands are combined in.
    pub fn promote(self, other: DType) -> DType {
        self.max(other)
    }

    pub fn is_bool(self) -> bool {
        self == DType::Bool
    }

    /// Signed or unsigned integer (not bool).
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DType::I8
                | DType::U8
                | DType::I16
                | DType::U16
                | DType::I32
                | DType::U32
                | DType::I64
                | DType::U64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, DType::F16 | DType::F32 | DType::F64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, DType::C64 | DType::C128)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = ArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| ArrayError::Serialization(format!("unknown dtype '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_order() {
        assert_eq!(DType::Bool.promote(DType::I8), DType::I8);
        assert_eq!(DType::U8.promote(DType::I16), DType::I16);
        assert_eq!(DType::I64.promote(DType::F32), DType::F32);
        assert_eq!(DType::F64.promote(DType::F16), DType::F64);
        assert_eq!(DType::F64.promote(DType::C64), DType::C64);
        for pair in DType::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(DType::Bool.size_bytes(), 1);
        assert_eq!(DType::F16.size_bytes(), 2);
        assert_eq!(DType::C64.size_bytes(), 8);
        assert_eq!(DType::C128.size_bytes(), 16);
    }

    #[test]
    fn test_parse_labels() {
        for d in DType::ALL {
            assert_eq!(d.as_str().parse::<DType>().unwrap(), d);
        }
        assert!("f128".parse::<DType>().is_err());
    }

    #[test]
    fn test_serde_label() {
        let json = serde_json::to_string(&DType::C128).unwrap();
        assert_eq!(json, "\"c128\"");
    }
}
