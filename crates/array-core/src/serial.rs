// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Serialized buffer format.
//!
//! A view is stored together with the *whole* buffer it addresses, so the
//! offset survives a round trip.
//!
//! # Format
//! ```json
//! {
//!   "mode": "portable",
//!   "shape": [2, 2],
//!   "offset": 0,
//!   "dtype": "f64",
//!   "length": 4,
//!   "payload": [1.0, 2.0, "0x7ff8000000000000", -0.0]
//! }
//! ```
//!
//! In `native` mode the payload is the little-endian byte image of the
//! buffer instead. Both modes reproduce every element bit for bit.

use num_complex::{Complex32, Complex64};

use crate::{ArrayError, ArrayView, Buffer, BufferData, DType, Scalar, Shape, F16};

/// Which payload encoding to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialMode {
    /// Little-endian byte image.
    Native,
    /// One JSON value per element.
    Portable,
}

/// One element of a portable payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PortableElement {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Non-finite float, as the hex image of its bit pattern.
    Bits(String),
    /// Complex value as `[re, im]`.
    Pair(Box<PortableElement>, Box<PortableElement>),
}

/// A view plus its full backing buffer, ready for serde.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SerializedBuffer {
    Native {
        shape: Shape,
        offset: usize,
        dtype: DType,
        length: usize,
        payload: Vec<u8>,
    },
    Portable {
        shape: Shape,
        offset: usize,
        dtype: DType,
        length: usize,
        payload: Vec<PortableElement>,
    },
}

impl SerializedBuffer {
    pub fn mode(&self) -> SerialMode {
        match self {
            SerializedBuffer::Native { .. } => SerialMode::Native,
            SerializedBuffer::Portable { .. } => SerialMode::Portable,
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            SerializedBuffer::Native { dtype, .. } | SerializedBuffer::Portable { dtype, .. } => {
                *dtype
            }
        }
    }

    pub fn shape(&self) -> &Shape {
        match self {
            SerializedBuffer::Native { shape, .. } | SerializedBuffer::Portable { shape, .. } => {
                shape
            }
        }
    }

    /// Rebuilds the buffer and the view over it.
    pub fn into_view(self) -> Result<ArrayView, ArrayError> {
        let (shape, offset, data) = match self {
            SerializedBuffer::Native {
                shape,
                offset,
                dtype,
                length,
                payload,
            } => {
                let data = BufferData::from_le_bytes(dtype, &payload)?;
                check_length(length, data.len())?;
                (shape, offset, data)
            }
            SerializedBuffer::Portable {
                shape,
                offset,
                dtype,
                length,
                payload,
            } => {
                check_length(length, payload.len())?;
                let mut data = BufferData::zeros(dtype, length);
                for (i, element) in payload.iter().enumerate() {
                    data.set_unchecked(i, decode(element, dtype)?);
                }
                (shape, offset, data)
            }
        };
        ArrayView::new(Buffer::from_data(data), shape, offset)
    }

    pub fn to_json(&self) -> Result<String, ArrayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ArrayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ArrayError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a serialized buffer from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ArrayError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ArrayError::Serialization(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }
}

fn check_length(declared: usize, actual: usize) -> Result<(), ArrayError> {
    if declared != actual {
        return Err(ArrayError::Serialization(format!(
            "declared length {declared} but payload holds {actual} elements"
        )));
    }
    Ok(())
}

impl ArrayView {
    /// Captures this view and its whole buffer in the given mode.
    ///
    /// # Examples
    /// ```
    /// use array_core::{ArrayView, SerialMode, SerializedBuffer};
    /// let a = ArrayView::from_vec([3], vec![1i16, -2, 3]).unwrap();
    /// let json = a.to_serialized(SerialMode::Portable).to_json().unwrap();
    /// let back = SerializedBuffer::from_json(&json).unwrap().into_view().unwrap();
    /// assert_eq!(back.to_vec::<i16>().unwrap(), vec![1, -2, 3]);
    /// ```
    pub fn to_serialized(&self, mode: SerialMode) -> SerializedBuffer {
        let data = self.buffer().data();
        let shape = self.shape().clone();
        let offset = self.offset();
        let dtype = data.dtype();
        let length = data.len();
        match mode {
            SerialMode::Native => SerializedBuffer::Native {
                shape,
                offset,
                dtype,
                length,
                payload: data.to_le_bytes(),
            },
            SerialMode::Portable => SerializedBuffer::Portable {
                shape,
                offset,
                dtype,
                length,
                payload: (0..length).map(|i| encode(data.get_unchecked(i))).collect(),
            },
        }
    }
}

fn encode(value: Scalar) -> PortableElement {
    use PortableElement::*;
    match value {
        Scalar::Bool(v) => Bool(v),
        Scalar::I8(v) => Int(v.into()),
        Scalar::U8(v) => Int(v.into()),
        Scalar::I16(v) => Int(v.into()),
        Scalar::U16(v) => Int(v.into()),
        Scalar::I32(v) => Int(v.into()),
        Scalar::U32(v) => Int(v.into()),
        Scalar::I64(v) => Int(v),
        Scalar::U64(v) => UInt(v),
        Scalar::F16(v) => float(v.to_f64(), v.is_finite(), v.to_bits().into()),
        Scalar::F32(v) => float(v.into(), v.is_finite(), v.to_bits().into()),
        Scalar::F64(v) => float(v, v.is_finite(), v.to_bits()),
        Scalar::C64(c) => Pair(
            Box::new(encode(Scalar::F32(c.re))),
            Box::new(encode(Scalar::F32(c.im))),
        ),
        Scalar::C128(c) => Pair(
            Box::new(encode(Scalar::F64(c.re))),
            Box::new(encode(Scalar::F64(c.im))),
        ),
    }
}

fn float(value: f64, finite: bool, bits: u64) -> PortableElement {
    if finite {
        PortableElement::Float(value)
    } else {
        PortableElement::Bits(format!("{bits:#x}"))
    }
}

fn decode(element: &PortableElement, dtype: DType) -> Result<Scalar, ArrayError> {
    use PortableElement::*;
    let mismatch = || {
        ArrayError::Serialization(format!("element {element:?} is not a valid {dtype} value"))
    };
    match (dtype, element) {
        (DType::Bool, Bool(v)) => Ok(Scalar::Bool(*v)),
        (d, Int(v)) if d.is_integer() => fits_integer(d, i128::from(*v))
            .then(|| Scalar::I64(*v).cast(d))
            .ok_or_else(mismatch),
        (d, UInt(v)) if d.is_integer() => fits_integer(d, i128::from(*v))
            .then(|| Scalar::U64(*v).cast(d))
            .ok_or_else(mismatch),
        (d, Int(v)) if d.is_float() => Ok(Scalar::I64(*v).cast(d)),
        (d, Float(v)) if d.is_float() => Ok(Scalar::F64(*v).cast(d)),
        (d, Bits(hex)) if d.is_float() => {
            let bits = parse_bits(hex).ok_or_else(mismatch)?;
            let value = match d {
                DType::F16 => u16::try_from(bits).map(|b| Scalar::F16(F16::from_bits(b))),
                DType::F32 => u32::try_from(bits).map(|b| Scalar::F32(f32::from_bits(b))),
                _ => Ok(Scalar::F64(f64::from_bits(bits))),
            };
            value.map_err(|_| mismatch())
        }
        (DType::C64, Pair(re, im)) => {
            match (decode(re, DType::F32)?, decode(im, DType::F32)?) {
                (Scalar::F32(re), Scalar::F32(im)) => Ok(Scalar::C64(Complex32::new(re, im))),
                _ => Err(mismatch()),
            }
        }
        (DType::C128, Pair(re, im)) => {
            match (decode(re, DType::F64)?, decode(im, DType::F64)?) {
                (Scalar::F64(re), Scalar::F64(im)) => Ok(Scalar::C128(Complex64::new(re, im))),
                _ => Err(mismatch()),
            }
        }
        _ => Err(mismatch()),
    }
}

/// Whether `v` is representable in the integer dtype `dtype`.
fn fits_integer(dtype: DType, v: i128) -> bool {
    match dtype {
        DType::I8 => i8::try_from(v).is_ok(),
        DType::U8 => u8::try_from(v).is_ok(),
        DType::I16 => i16::try_from(v).is_ok(),
        DType::U16 => u16::try_from(v).is_ok(),
        DType::I32 => i32::try_from(v).is_ok(),
        DType::U32 => u32::try_from(v).is_ok(),
        DType::I64 => i64::try_from(v).is_ok(),
        DType::U64 => u64::try_from(v).is_ok(),
        _ => false,
    }
}

fn parse_bits(hex: &str) -> Option<u64> {
    let digits = hex.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}
