// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core array view type.

use crate::{ArrayError, Buffer, BufferData, DType, Element, Scalar, Shape, Value};

/// A shape + offset window over a shared [`Buffer`].
///
/// Views are cheap value objects: cloning, slicing and reshaping produce new
/// views over the same storage and never copy element data.
///
/// # Memory Layout
/// Elements are addressed in row-major (C) order starting at `offset`.
/// The invariant `offset + shape.num_elements() <= buffer.len()` is checked
/// when the view is constructed.
#[derive(Debug, Clone)]
pub struct ArrayView {
    buffer: Buffer,
    shape: Shape,
    offset: usize,
}

impl ArrayView {
    /// Creates a view over an existing buffer.
    ///
    /// Returns [`ArrayError::BufferTooSmall`] if the view would run past the
    /// end of the buffer.
    pub fn new(buffer: Buffer, shape: impl Into<Shape>, offset: usize) -> Result<Self, ArrayError> {
        let shape = shape.into();
        let required = offset + shape.num_elements();
        if required > buffer.len() {
            return Err(ArrayError::BufferTooSmall {
                required,
                len: buffer.len(),
            });
        }
        Ok(Self {
            buffer,
            shape,
            offset,
        })
    }

    /// Creates a zero-filled array in a fresh buffer.
    ///
    /// # Examples
    /// ```
    /// use array_core::{ArrayView, DType};
    /// let a = ArrayView::zeros([2, 3], DType::F64);
    /// assert_eq!(a.size(), 6);
    /// ```
    pub fn zeros(shape: impl Into<Shape>, dtype: DType) -> Self {
        let shape = shape.into();
        let buffer = Buffer::zeros(dtype, shape.num_elements());
        Self {
            buffer,
            shape,
            offset: 0,
        }
    }

    /// Creates an array filled with `value`, in `value`'s dtype.
    pub fn full(shape: impl Into<Shape>, value: Scalar) -> Self {
        let shape = shape.into();
        let buffer = Buffer::filled(value, shape.num_elements());
        Self {
            buffer,
            shape,
            offset: 0,
        }
    }

    /// Adopts `values` (row-major) as the storage of a new array.
    ///
    /// # Examples
    /// ```
    /// use array_core::ArrayView;
    /// let a = ArrayView::from_vec([2, 2], vec![1.0f64, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(a.to_vec::<f64>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    /// ```
    pub fn from_vec<T: Element>(shape: impl Into<Shape>, values: Vec<T>) -> Result<Self, ArrayError> {
        Self::from_data(shape, T::wrap(values))
    }

    /// Adopts untyped storage as a new array.
    pub fn from_data(shape: impl Into<Shape>, data: BufferData) -> Result<Self, ArrayError> {
        let shape = shape.into();
        if data.len() != shape.num_elements() {
            return Err(ArrayError::LengthMismatch {
                expected: shape.num_elements(),
                actual: data.len(),
            });
        }
        Ok(Self {
            buffer: Buffer::from_data(data),
            shape,
            offset: 0,
        })
    }

    /// Builds an array of `dtype` from scalars, casting each one.
    pub fn from_scalars(
        shape: impl Into<Shape>,
        dtype: DType,
        values: &[Scalar],
    ) -> Result<Self, ArrayError> {
        let shape = shape.into();
        if values.len() != shape.num_elements() {
            return Err(ArrayError::LengthMismatch {
                expected: shape.num_elements(),
                actual: values.len(),
            });
        }
        let out = Self::zeros(shape, dtype);
        out.set_scalars(values)?;
        Ok(out)
    }

    /// A rank-0 array holding `value`.
    pub fn scalar(value: Scalar) -> Self {
        Self::full(Shape::scalar(), value)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Total number of elements (`Π shape`).
    pub fn size(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns `true` if both views address the same storage.
    pub fn shares_buffer(&self, other: &ArrayView) -> bool {
        self.buffer.ptr_eq(&other.buffer)
    }

    /// Reinterprets the same elements under a new shape.
    ///
    /// Fails with [`ArrayError::ShapeMismatch`] unless both shapes hold the
    /// same number of elements.
    pub fn reshape(&self, shape: impl Into<Shape>) -> Result<ArrayView, ArrayError> {
        let shape = shape.into();
        if shape.num_elements() != self.size() {
            return Err(ArrayError::ShapeMismatch {
                op: "reshape",
                lhs: self.shape.clone(),
                rhs: shape,
            });
        }
        Ok(Self {
            buffer: self.buffer.clone(),
            shape,
            offset: self.offset,
        })
    }

    /// A rank-1 view over all elements.
    pub fn flatten(&self) -> ArrayView {
        Self {
            buffer: self.buffer.clone(),
            shape: Shape::vector(self.size()),
            offset: self.offset,
        }
    }

    fn leading_len(&self) -> usize {
        self.shape.dim(0).unwrap_or(0)
    }

    fn check_leading(&self, index: usize) -> Result<(), ArrayError> {
        let len = self.leading_len();
        if self.rank() == 0 || index >= len {
            return Err(ArrayError::OutOfRangeIndex { index, len });
        }
        Ok(())
    }

    /// Sub-view at `index` along the leading dimension, always as a view
    /// (rank 0 when `self` is rank 1).
    pub fn at(&self, index: usize) -> Result<ArrayView, ArrayError> {
        self.check_leading(index)?;
        Ok(self.sub_view(index))
    }

    fn sub_view(&self, index: usize) -> ArrayView {
        let inner = self.shape.inner();
        let stride = inner.num_elements();
        Self {
            buffer: self.buffer.clone(),
            offset: self.offset + index * stride,
            shape: inner,
        }
    }

    /// Indexed read along the leading dimension.
    ///
    /// A rank-1 view yields [`Value::Scalar`]; higher ranks yield a sub-view
    /// of one less rank sharing this buffer.
    pub fn get(&self, index: usize) -> Result<Value, ArrayError> {
        self.check_leading(index)?;
        Ok(self.entry(index))
    }

    fn entry(&self, index: usize) -> Value {
        if self.rank() == 1 {
            Value::Scalar(self.buffer.data().get_unchecked(self.offset + index))
        } else {
            Value::Array(self.sub_view(index))
        }
    }

    /// Indexed write along the leading dimension.
    ///
    /// A scalar is stored directly (rank 1) or fills the whole sub-view;
    /// an array is copied and must match the sub-view's shape.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<(), ArrayError> {
        let target = self.at(index)?;
        match value.into() {
            Value::Scalar(s) => target.fill(s),
            Value::Array(src) => target.copy_from(&src),
        }
    }

    /// Inclusive range `[start, end]` on the leading dimension.
    ///
    /// Requires `start <= end < shape[0]`; the result shares this buffer.
    pub fn get_range(&self, start: usize, end: usize) -> Result<ArrayView, ArrayError> {
        self.check_leading(end)?;
        if start > end {
            return Err(ArrayError::OutOfRangeIndex {
                index: start,
                len: end + 1,
            });
        }
        let mut dims = self.dims().to_vec();
        dims[0] = end - start + 1;
        Ok(Self {
            buffer: self.buffer.clone(),
            offset: self.offset + start * self.shape.inner_size(),
            shape: Shape::new(dims),
        })
    }

    /// Iterates over the leading dimension, yielding what [`get`](Self::get)
    /// would for each index.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        let len = if self.rank() == 0 { 0 } else { self.leading_len() };
        (0..len).map(move |i| self.entry(i))
    }

    /// Reads the single element of a one-element view.
    pub fn item(&self) -> Result<Scalar, ArrayError> {
        if self.size() != 1 {
            return Err(ArrayError::ShapeMismatch {
                op: "item",
                lhs: self.shape.clone(),
                rhs: Shape::scalar(),
            });
        }
        self.buffer.get(self.offset)
    }

    /// Reads the element at a full multi-index.
    pub fn element(&self, index: &[usize]) -> Result<Scalar, ArrayError> {
        if index.len() != self.rank() {
            return Err(ArrayError::ShapeMismatch {
                op: "element",
                lhs: self.shape.clone(),
                rhs: Shape::from(index),
            });
        }
        let mut flat = 0;
        for ((&i, &d), s) in index.iter().zip(self.dims()).zip(self.shape.strides()) {
            if i >= d {
                return Err(ArrayError::OutOfRangeIndex { index: i, len: d });
            }
            flat += i * s;
        }
        self.buffer.get(self.offset + flat)
    }

    /// Reads element `index` in flat row-major order.
    pub fn flat_get(&self, index: usize) -> Result<Scalar, ArrayError> {
        self.check_flat(index)?;
        self.buffer.get(self.offset + index)
    }

    /// Writes element `index` in flat row-major order, casting `value`.
    pub fn flat_set(&self, index: usize, value: Scalar) -> Result<(), ArrayError> {
        self.check_flat(index)?;
        self.buffer.set(self.offset + index, value)
    }

    fn check_flat(&self, index: usize) -> Result<(), ArrayError> {
        if index >= self.size() {
            return Err(ArrayError::OutOfRangeIndex {
                index,
                len: self.size(),
            });
        }
        Ok(())
    }

    /// Sets every element of the view to `value`.
    pub fn fill(&self, value: Scalar) -> Result<(), ArrayError> {
        self.buffer.fill_range(self.offset, self.size(), value)
    }

    /// Copies `src` into this view element by element, casting dtypes.
    pub fn copy_from(&self, src: &ArrayView) -> Result<(), ArrayError> {
        if src.shape != self.shape {
            return Err(ArrayError::ShapeMismatch {
                op: "copy",
                lhs: self.shape.clone(),
                rhs: src.shape.clone(),
            });
        }
        Buffer::copy_range(&src.buffer, src.offset, &self.buffer, self.offset, self.size())
    }

    /// Runs `f` over the typed slice this view addresses.
    pub fn read<T: Element, R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R, ArrayError> {
        let (start, end) = (self.offset, self.offset + self.size());
        self.buffer.read(|s: &[T]| f(&s[start..end]))
    }

    /// Runs `f` over the typed slice this view addresses, mutably.
    pub fn write<T: Element, R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, ArrayError> {
        let (start, end) = (self.offset, self.offset + self.size());
        self.buffer.write(|s: &mut [T]| f(&mut s[start..end]))
    }

    /// Copies the viewed elements out; `T` must match the dtype.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        self.read(|s: &[T]| s.to_vec())
    }

    /// Copies the viewed elements out as scalars.
    pub fn scalars(&self) -> Vec<Scalar> {
        let data = self.buffer.data();
        (self.offset..self.offset + self.size())
            .map(|i| data.get_unchecked(i))
            .collect()
    }

    /// Overwrites every element from `values`, casting each one.
    pub fn set_scalars(&self, values: &[Scalar]) -> Result<(), ArrayError> {
        if values.len() != self.size() {
            return Err(ArrayError::LengthMismatch {
                expected: self.size(),
                actual: values.len(),
            });
        }
        let mut data = self.buffer.data_mut();
        for (i, v) in values.iter().enumerate() {
            data.set_unchecked(self.offset + i, *v);
        }
        Ok(())
    }

    /// Deep copy converted to `dtype`, in a fresh buffer.
    pub fn astype(&self, dtype: DType) -> ArrayView {
        let out = ArrayView::zeros(self.shape.clone(), dtype);
        {
            let src = self.buffer.data();
            let mut dst = out.buffer.data_mut();
            for i in 0..self.size() {
                dst.set_unchecked(i, src.get_unchecked(self.offset + i));
            }
        }
        out
    }

    /// Deep copy in a fresh buffer, same dtype.
    pub fn duplicate(&self) -> ArrayView {
        self.astype(self.dtype())
    }
}
