// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Flat, fixed-length, homogeneously-typed storage shared between views.
//!
//! # Ownership Model
//!
//! ```text
//!   ArrayView ──┐
//!   ArrayView ──┼──► Buffer (Rc) ──► RefCell<BufferData> ──► Vec<T>
//!   ArrayView ──┘
//! ```
//!
//! Every view holds an `Rc` handle to the same storage, so slicing and
//! reshaping never copy. A write through one view is immediately visible
//! through every alias of the overlapping region. The storage is released
//! when the last handle drops. `Buffer` is deliberately `!Send`: aliasing is
//! a single-threaded affair.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use num_complex::{Complex32, Complex64};

use crate::{ArrayError, DType, Scalar, F16};

/// Typed backing storage, one variant per [`DType`].
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F16(Vec<F16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    C64(Vec<Complex32>),
    C128(Vec<Complex64>),
}

/// Runs `$body` with `$v` bound to the inner `Vec` of whichever variant
/// `$data` holds.
macro_rules! with_vec {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            BufferData::Bool($v) => $body,
            BufferData::I8($v) => $body,
            BufferData::U8($v) => $body,
            BufferData::I16($v) => $body,
            BufferData::U16($v) => $body,
            BufferData::I32($v) => $body,
            BufferData::U32($v) => $body,
            BufferData::I64($v) => $body,
            BufferData::U64($v) => $body,
            BufferData::F16($v) => $body,
            BufferData::F32($v) => $body,
            BufferData::F64($v) => $body,
            BufferData::C64($v) => $body,
            BufferData::C128($v) => $body,
        }
    };
}

/// A Rust type that can live in a [`Buffer`].
pub trait Element: Copy + fmt::Debug + 'static {
    /// The dtype this element type stores.
    const DTYPE: DType;

    /// Borrows the typed slice if `data` holds this element type.
    fn slice(data: &BufferData) -> Option<&[Self]>;

    /// Mutably borrows the typed slice if `data` holds this element type.
    fn slice_mut(data: &mut BufferData) -> Option<&mut [Self]>;

    /// Adopts a vector as buffer storage without copying.
    fn wrap(values: Vec<Self>) -> BufferData;

    fn to_scalar(self) -> Scalar;

    /// Converts a scalar of any dtype, casting as needed.
    fn from_scalar(value: Scalar) -> Self;

    /// Appends the little-endian byte image of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decodes from exactly [`DType::size_bytes`] little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident, |$w:ident, $out:ident| $write:expr, |$b:ident| $read:expr) => {
        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            fn slice(data: &BufferData) -> Option<&[Self]> {
                match data {
                    BufferData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut BufferData) -> Option<&mut [Self]> {
                match data {
                    BufferData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn wrap(values: Vec<Self>) -> BufferData {
                BufferData::$variant(values)
            }

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: Scalar) -> Self {
                match value.cast(DType::$variant) {
                    Scalar::$variant(v) => v,
                    _ => unreachable!("cast returns the requested dtype"),
                }
            }

            fn write_le(self, $out: &mut Vec<u8>) {
                let $w = self;
                $write
            }

            fn read_le($b: &[u8]) -> Self {
                $read
            }
        }
    };
}

/// Copies the leading `N` bytes of an element chunk into a fixed array.
fn le_chunk<const N: usize>(b: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&b[..N]);
    out
}

macro_rules! impl_int_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl_element!(
                $t,
                $variant,
                |w, out| out.extend_from_slice(&w.to_le_bytes()),
                |b| <$t>::from_le_bytes(le_chunk(b))
            );
        )*
    };
}

impl_int_element! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl_element!(bool, Bool, |w, out| out.push(w as u8), |b| b[0] != 0);

impl_element!(
    F16,
    F16,
    |w, out| out.extend_from_slice(&w.to_bits().to_le_bytes()),
    |b| F16::from_bits(u16::from_le_bytes([b[0], b[1]]))
);

impl_element!(
    Complex32,
    C64,
    |w, out| {
        out.extend_from_slice(&w.re.to_le_bytes());
        out.extend_from_slice(&w.im.to_le_bytes());
    },
    |b| Complex32::new(
        f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        f32::from_le_bytes([b[4], b[5], b[6], b[7]])
    )
);

impl_element!(
    Complex64,
    C128,
    |w, out| {
        out.extend_from_slice(&w.re.to_le_bytes());
        out.extend_from_slice(&w.im.to_le_bytes());
    },
    |b| Complex64::new(
        f64::from_le_bytes(le_chunk(&b[..8])),
        f64::from_le_bytes(le_chunk(&b[8..]))
    )
);

impl BufferData {
    /// Allocates `len` zero elements of `dtype`.
    pub fn zeros(dtype: DType, len: usize) -> Self {
        Self::filled(Scalar::zero(dtype), len)
    }

    /// Allocates `len` copies of `value`, in `value`'s dtype.
    pub fn filled(value: Scalar, len: usize) -> Self {
        match value {
            Scalar::Bool(v) => BufferData::Bool(vec![v; len]),
            Scalar::I8(v) => BufferData::I8(vec![v; len]),
            Scalar::U8(v) => BufferData::U8(vec![v; len]),
            Scalar::I16(v) => BufferData::I16(vec![v; len]),
            Scalar::U16(v) => BufferData::U16(vec![v; len]),
            Scalar::I32(v) => BufferData::I32(vec![v; len]),
            Scalar::U32(v) => BufferData::U32(vec![v; len]),
            Scalar::I64(v) => BufferData::I64(vec![v; len]),
            Scalar::U64(v) => BufferData::U64(vec![v; len]),
            Scalar::F16(v) => BufferData::F16(vec![v; len]),
            Scalar::F32(v) => BufferData::F32(vec![v; len]),
            Scalar::F64(v) => BufferData::F64(vec![v; len]),
            Scalar::C64(v) => BufferData::C64(vec![v; len]),
            Scalar::C128(v) => BufferData::C128(vec![v; len]),
        }
    }

    pub fn len(&self) -> usize {
        with_vec!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        with_vec!(self, v => element_dtype(v.as_slice()))
    }

    /// Reads element `i`. Panics when out of bounds; callers validate.
    pub(crate) fn get_unchecked(&self, i: usize) -> Scalar {
        with_vec!(self, v => v[i].to_scalar())
    }

    /// Writes element `i`, casting `value` to the buffer's dtype.
    pub(crate) fn set_unchecked(&mut self, i: usize, value: Scalar) {
        with_vec!(self, v => v[i] = Element::from_scalar(value))
    }

    /// Fills `len` elements starting at `start` with `value`.
    fn fill_range(&mut self, start: usize, len: usize, value: Scalar) {
        with_vec!(self, v => {
            let value = Element::from_scalar(value);
            v[start..start + len].fill(value);
        })
    }

    fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        with_vec!(self, v => v.copy_within(src..src + len, dst))
    }

    /// Appends the little-endian image of every element.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * self.dtype().size_bytes());
        with_vec!(self, v => v.iter().for_each(|x| x.write_le(&mut out)));
        out
    }

    /// Rebuilds storage from a little-endian image.
    pub fn from_le_bytes(dtype: DType, bytes: &[u8]) -> Result<Self, ArrayError> {
        let width = dtype.size_bytes();
        if bytes.len() % width != 0 {
            return Err(ArrayError::Serialization(format!(
                "{} payload bytes is not a multiple of the {dtype} width {width}",
                bytes.len()
            )));
        }
        let mut data = BufferData::zeros(dtype, bytes.len() / width);
        with_vec!(&mut data, v => {
            for (slot, chunk) in v.iter_mut().zip(bytes.chunks_exact(width)) {
                *slot = Element::read_le(chunk);
            }
        });
        Ok(data)
    }
}

fn element_dtype<T: Element>(_: &[T]) -> DType {
    T::DTYPE
}

/// Shared, reference-counted, mutable storage.
///
/// Cloning a `Buffer` clones the handle, not the data; use
/// [`Buffer::duplicate`] for a deep copy.
#[derive(Clone)]
pub struct Buffer {
    inner: Rc<RefCell<BufferData>>,
}

impl Buffer {
    /// Wraps existing storage.
    pub fn from_data(data: BufferData) -> Self {
        Self {
            inner: Rc::new(RefCell::new(data)),
        }
    }

    /// Allocates `len` zero elements.
    pub fn zeros(dtype: DType, len: usize) -> Self {
        Self::from_data(BufferData::zeros(dtype, len))
    }

    /// Allocates `len` copies of `value`.
    pub fn filled(value: Scalar, len: usize) -> Self {
        Self::from_data(BufferData::filled(value, len))
    }

    /// Adopts `values` as storage without copying.
    ///
    /// # Examples
    /// ```
    /// use array_core::{Buffer, DType};
    /// let b = Buffer::from_vec(vec![1.0f32, 2.0, 3.0]);
    /// assert_eq!(b.len(), 3);
    /// assert_eq!(b.dtype(), DType::F32);
    /// ```
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        Self::from_data(T::wrap(values))
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        self.inner.borrow().dtype()
    }

    /// Borrows the raw storage.
    ///
    /// # Panics
    /// Panics if the buffer is currently mutably borrowed.
    pub fn data(&self) -> Ref<'_, BufferData> {
        self.inner.borrow()
    }

    /// Mutably borrows the raw storage.
    ///
    /// # Panics
    /// Panics if the buffer is currently borrowed.
    pub fn data_mut(&self) -> RefMut<'_, BufferData> {
        self.inner.borrow_mut()
    }

    fn check_index(&self, index: usize) -> Result<(), ArrayError> {
        let len = self.len();
        if index >= len {
            return Err(ArrayError::OutOfRangeIndex { index, len });
        }
        Ok(())
    }

    /// Reads one element.
    pub fn get(&self, index: usize) -> Result<Scalar, ArrayError> {
        self.check_index(index)?;
        Ok(self.inner.borrow().get_unchecked(index))
    }

    /// Writes one element, casting `value` to the buffer dtype.
    pub fn set(&self, index: usize, value: Scalar) -> Result<(), ArrayError> {
        self.check_index(index)?;
        self.inner.borrow_mut().set_unchecked(index, value);
        Ok(())
    }

    /// Fills `len` elements from `start` with `value`.
    pub fn fill_range(&self, start: usize, len: usize, value: Scalar) -> Result<(), ArrayError> {
        if start + len > self.len() {
            return Err(ArrayError::BufferTooSmall {
                required: start + len,
                len: self.len(),
            });
        }
        self.inner.borrow_mut().fill_range(start, len, value);
        Ok(())
    }

    /// Runs `f` over the whole typed slice.
    ///
    /// Returns [`ArrayError::UnsupportedDtype`] if `T` is not this buffer's
    /// element type.
    pub fn read<T: Element, R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R, ArrayError> {
        let data = self.inner.borrow();
        let slice = T::slice(&data).ok_or(ArrayError::UnsupportedDtype {
            op: "buffer read",
            dtype: data.dtype(),
        })?;
        Ok(f(slice))
    }

    /// Runs `f` over the whole typed slice, mutably.
    pub fn write<T: Element, R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, ArrayError> {
        let mut data = self.inner.borrow_mut();
        let dtype = data.dtype();
        let slice = T::slice_mut(&mut data).ok_or(ArrayError::UnsupportedDtype {
            op: "buffer write",
            dtype,
        })?;
        Ok(f(slice))
    }

    /// Copies `len` elements between buffers, casting when dtypes differ.
    ///
    /// Handles the case where `src` and `dst` are the same buffer
    /// (overlapping ranges behave like `memmove`).
    pub fn copy_range(
        src: &Buffer,
        src_offset: usize,
        dst: &Buffer,
        dst_offset: usize,
        len: usize,
    ) -> Result<(), ArrayError> {
        for (buf, off) in [(src, src_offset), (dst, dst_offset)] {
            if off + len > buf.len() {
                return Err(ArrayError::BufferTooSmall {
                    required: off + len,
                    len: buf.len(),
                });
            }
        }
        if src.ptr_eq(dst) {
            dst.inner.borrow_mut().copy_within(src_offset, dst_offset, len);
            return Ok(());
        }
        let from = src.inner.borrow();
        let mut to = dst.inner.borrow_mut();
        if from.dtype() == to.dtype() {
            copy_same_dtype(&from, src_offset, &mut to, dst_offset, len);
        } else {
            for i in 0..len {
                let v = from.get_unchecked(src_offset + i);
                to.set_unchecked(dst_offset + i, v);
            }
        }
        Ok(())
    }

    /// Returns `true` if both handles refer to the same storage.
    pub fn ptr_eq(&self, other: &Buffer) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Deep-copies the storage into a fresh buffer.
    pub fn duplicate(&self) -> Buffer {
        Buffer::from_data(self.inner.borrow().clone())
    }

    /// Number of live handles to this storage.
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

fn copy_same_dtype(
    from: &BufferData,
    src_offset: usize,
    to: &mut BufferData,
    dst_offset: usize,
    len: usize,
) {
    macro_rules! typed {
        ($($variant:ident),*) => {
            match (from, to) {
                $(
                    (BufferData::$variant(s), BufferData::$variant(d)) => {
                        d[dst_offset..dst_offset + len]
                            .copy_from_slice(&s[src_offset..src_offset + len]);
                    }
                )*
                _ => unreachable!("dtypes checked equal by caller"),
            }
        };
    }
    typed!(Bool, I8, U8, I16, U16, I32, U32, I64, U64, F16, F32, F64, C64, C128);
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("dtype", &self.dtype())
            .field("len", &self.len())
            .field("holders", &self.holders())
            .finish()
    }
}

impl<T: Element> From<Vec<T>> for Buffer {
    fn from(values: Vec<T>) -> Self {
        Buffer::from_vec(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let b = Buffer::zeros(DType::I16, 4);
        assert_eq!(b.len(), 4);
        assert_eq!(b.dtype(), DType::I16);
        assert_eq!(b.get(3).unwrap(), Scalar::I16(0));
    }

    #[test]
    fn test_set_casts() {
        let b = Buffer::zeros(DType::U8, 2);
        b.set(0, Scalar::F64(7.9)).unwrap();
        assert_eq!(b.get(0).unwrap(), Scalar::U8(7));
        assert!(b.set(2, Scalar::U8(1)).is_err());
    }

    #[test]
    fn test_shared_handles_alias() {
        let a = Buffer::from_vec(vec![1.0f64, 2.0]);
        let b = a.clone();
        b.set(1, Scalar::F64(5.0)).unwrap();
        assert_eq!(a.get(1).unwrap(), Scalar::F64(5.0));
        assert!(a.ptr_eq(&b));
        assert_eq!(a.holders(), 2);
        drop(b);
        assert_eq!(a.holders(), 1);
    }

    #[test]
    fn test_duplicate_is_deep() {
        let a = Buffer::from_vec(vec![1i32, 2]);
        let b = a.duplicate();
        b.set(0, Scalar::I32(9)).unwrap();
        assert_eq!(a.get(0).unwrap(), Scalar::I32(1));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_typed_read_write() {
        let b = Buffer::from_vec(vec![1.0f32, 2.0, 3.0]);
        let sum = b.read(|s: &[f32]| s.iter().sum::<f32>()).unwrap();
        assert_eq!(sum, 6.0);
        b.write(|s: &mut [f32]| s[0] = 10.0).unwrap();
        assert_eq!(b.get(0).unwrap(), Scalar::F32(10.0));
        assert!(b.read(|_: &[f64]| ()).is_err());
    }

    #[test]
    fn test_copy_range_overlapping() {
        let b = Buffer::from_vec(vec![1u8, 2, 3, 4, 5]);
        Buffer::copy_range(&b, 0, &b, 1, 4).unwrap();
        b.read(|s: &[u8]| assert_eq!(s, &[1, 1, 2, 3, 4])).unwrap();
    }

    #[test]
    fn test_copy_range_casts() {
        let src = Buffer::from_vec(vec![1.5f64, -2.5]);
        let dst = Buffer::zeros(DType::I32, 3);
        Buffer::copy_range(&src, 0, &dst, 1, 2).unwrap();
        dst.read(|s: &[i32]| assert_eq!(s, &[0, 1, -2])).unwrap();
        assert!(Buffer::copy_range(&src, 1, &dst, 0, 2).is_err());
    }

    #[test]
    fn test_le_bytes_roundtrip() {
        let data = BufferData::C64(vec![Complex32::new(1.0, -1.0), Complex32::new(0.5, 2.0)]);
        let bytes = data.to_le_bytes();
        assert_eq!(bytes.len(), 16);
        let back = BufferData::from_le_bytes(DType::C64, &bytes).unwrap();
        assert_eq!(back, data);
        assert!(BufferData::from_le_bytes(DType::F64, &bytes[..7]).is_err());
    }
}
