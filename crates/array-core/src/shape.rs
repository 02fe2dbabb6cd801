// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Array shape descriptors and dimension utilities.

use std::fmt;

/// Describes the dimensionality of an [`crate::ArrayView`].
///
/// Shapes are immutable once created. Strides are never stored: they are
/// always the row-major (C-order) strides implied by the dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use array_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes the memory footprint in bytes for a given [`crate::DType`].
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Computes row-major (C-order) strides for this shape.
    ///
    /// The stride for dimension `i` is the number of elements to skip
    /// in the flat buffer to advance one step along that dimension.
    pub fn strides(&self) -> Vec<usize> {
        let rank = self.dims.len();
        if rank == 0 {
            return vec![];
        }
        let mut strides = vec![0usize; rank];
        strides[rank - 1] = 1;
        for i in (0..rank - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// The shape with the leading dimension removed.
    pub fn inner(&self) -> Shape {
        Shape::from(self.dims.get(1..).unwrap_or(&[]))
    }

    /// The shape from dimension `start` onwards.
    pub fn tail(&self, start: usize) -> Shape {
        Shape::from(&self.dims[start.min(self.rank())..])
    }

    /// Number of elements of one sub-array below the leading dimension.
    pub fn inner_size(&self) -> usize {
        self.dims.iter().skip(1).product()
    }

    /// Splits off the trailing `keep` dimensions, returning the leading
    /// (batch) dimensions.
    ///
    /// Returns an empty slice when `keep >= rank`.
    pub fn batch_dims(&self, keep: usize) -> &[usize] {
        &self.dims[..self.rank().saturating_sub(keep)]
    }

    /// Product of the batch dimensions left after keeping `keep` trailing ones.
    pub fn batch_count(&self, keep: usize) -> usize {
        self.batch_dims(keep).iter().product()
    }

    /// Concatenates two shapes.
    pub fn concat(&self, other: &Shape) -> Shape {
        let mut dims = self.dims.clone();
        dims.extend_from_slice(&other.dims);
        Shape::new(dims)
    }

    /// Returns `true` if `self` equals the trailing dimensions of `other`.
    ///
    /// This is the only broadcasting relation supported: the lower-rank
    /// operand is repeated along the outer axes of the higher-rank one.
    /// Size-1 dimensions are never stretched.
    pub fn is_suffix_of(&self, other: &Shape) -> bool {
        self.rank() <= other.rank() && other.dims[other.rank() - self.rank()..] == self.dims[..]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

/// Convenience: `Shape::from([2, 3])`.
impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl From<&Shape> for Shape {
    fn from(shape: &Shape) -> Self {
        shape.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
        assert!(s.strides().is_empty());
    }

    #[test]
    fn test_matrix_shape() {
        let s = Shape::matrix(3, 4);
        assert_eq!(s.rank(), 2);
        assert_eq!(s.num_elements(), 12);
        assert_eq!(s.strides(), vec![4, 1]);
        assert_eq!(s.size_bytes(DType::F64), 96);
    }

    #[test]
    fn test_3d_strides() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.strides(), vec![12, 4, 1]);
        assert_eq!(s.inner(), Shape::matrix(3, 4));
        assert_eq!(s.inner_size(), 12);
    }

    #[test]
    fn test_batch_dims() {
        let s = Shape::new(vec![5, 2, 3, 4]);
        assert_eq!(s.batch_dims(2), &[5, 2]);
        assert_eq!(s.batch_count(2), 10);
        assert_eq!(Shape::matrix(3, 4).batch_count(2), 1);
        assert_eq!(s.tail(2), Shape::matrix(3, 4));
    }

    #[test]
    fn test_suffix_relation() {
        let big = Shape::new(vec![4, 2, 3]);
        assert!(Shape::vector(3).is_suffix_of(&big));
        assert!(Shape::matrix(2, 3).is_suffix_of(&big));
        assert!(Shape::scalar().is_suffix_of(&big));
        // No size-1 stretching.
        assert!(!Shape::matrix(1, 3).is_suffix_of(&big));
        assert!(!Shape::vector(2).is_suffix_of(&big));
    }

    #[test]
    fn test_zero_length_dimension() {
        let s = Shape::vector(0);
        assert_eq!(s.num_elements(), 0);
    }

    #[test]
    fn test_display() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(format!("{s}"), "[2, 3, 4]");
    }

    #[test]
    fn test_from_conversions() {
        let s1: Shape = vec![2, 3].into();
        let s2: Shape = (&[2, 3][..]).into();
        let s3: Shape = [2, 3].into();
        assert_eq!(s1, s2);
        assert_eq!(s2, s3);
    }
}
