// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Boolean and integer fancy indexing.
//!
//! [`select`] and [`update`] share one resolver that turns a mask list into
//! a list of contiguous blocks of the target array. A block is a single
//! element when every dimension is indexed, or a whole trailing sub-array
//! otherwise.

use array_core::{ArrayError, ArrayView, Buffer, Shape, Value};

use crate::elementwise::Operand;
use crate::{arith, AssignOp, BroadcastError};

/// The blocks addressed by a mask list, in result order.
#[derive(Debug)]
struct Selection {
    /// Flat start of each block, relative to the view's offset.
    blocks: Vec<usize>,
    block_len: usize,
    shape: Shape,
}

impl Selection {
    fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        let len = self.block_len;
        self.blocks.iter().flat_map(move |&b| b..b + len)
    }
}

fn resolve(x: &ArrayView, masks: &[ArrayView]) -> Result<Selection, BroadcastError> {
    let first = masks
        .first()
        .ok_or_else(|| BroadcastError::InvalidMask("at least one mask is required".into()))?;

    if masks.iter().any(|m| m.dtype().is_bool()) {
        if masks.len() != 1 {
            return Err(BroadcastError::InvalidMask(
                "a boolean mask cannot be combined with other masks".into(),
            ));
        }
        if first.shape() != x.shape() {
            return Err(BroadcastError::InvalidMask(format!(
                "boolean mask shape {} does not match array shape {}",
                first.shape(),
                x.shape()
            )));
        }
        let blocks: Vec<usize> = first
            .scalars()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_truthy())
            .map(|(i, _)| i)
            .collect();
        return Ok(Selection {
            shape: Shape::vector(blocks.len()),
            blocks,
            block_len: 1,
        });
    }

    for m in masks {
        if !m.dtype().is_integer() {
            return Err(BroadcastError::InvalidMask(format!(
                "{} mask; masks must be boolean or integer",
                m.dtype()
            )));
        }
        if m.shape() != first.shape() {
            return Err(BroadcastError::InvalidMask(format!(
                "integer masks must share one shape, got {} and {}",
                first.shape(),
                m.shape()
            )));
        }
    }
    if masks.len() > x.rank() {
        return Err(BroadcastError::InvalidMask(format!(
            "{} masks for a rank-{} array",
            masks.len(),
            x.rank()
        )));
    }

    let trailing = x.shape().tail(masks.len());
    let mut blocks = Vec::with_capacity(first.size());
    gather(masks, x.dims(), &x.shape().strides(), &mut blocks)?;
    Ok(Selection {
        blocks,
        block_len: trailing.num_elements(),
        shape: first.shape().concat(&trailing),
    })
}

/// Walks the masks' outer axes; at rank 0 the k-th mask value indexes
/// dimension k of the target.
fn gather(
    masks: &[ArrayView],
    dims: &[usize],
    strides: &[usize],
    blocks: &mut Vec<usize>,
) -> Result<(), BroadcastError> {
    if masks[0].rank() > 0 {
        for i in 0..masks[0].dims()[0] {
            let inner = masks.iter().map(|m| m.at(i)).collect::<Result<Vec<_>, _>>()?;
            gather(&inner, dims, strides, blocks)?;
        }
        return Ok(());
    }

    let mut start = 0;
    for (k, m) in masks.iter().enumerate() {
        let raw = m.item()?.as_i128().unwrap_or_default();
        let index = usize::try_from(raw)
            .map_err(|_| BroadcastError::InvalidMask(format!("negative index {raw}")))?;
        if index >= dims[k] {
            return Err(ArrayError::OutOfRangeIndex { index, len: dims[k] }.into());
        }
        start += index * strides[k];
    }
    blocks.push(start);
    Ok(())
}

/// Gathers the elements or sub-arrays of `x` addressed by `masks`.
///
/// - A single `Bool` mask of `x`'s exact shape yields a rank-1 array of the
///   elements where the mask is true, in flat order.
/// - One or more integer masks of equal shape index `x`'s leading
///   dimensions, mask `k` indexing dimension `k`; the result shape is the
///   mask shape followed by `x`'s unindexed trailing dimensions.
///
/// A rank-0 result is returned as [`Value::Scalar`]. The result never
/// shares `x`'s buffer.
///
/// # Errors
/// [`BroadcastError::InvalidMask`] for an empty mask list, a mix of boolean
/// and integer masks, float masks, masks of unequal shape or more masks
/// than `x` has dimensions. [`ArrayError::OutOfRangeIndex`] for an index
/// past its dimension.
///
/// # Examples
/// ```
/// use array_core::ArrayView;
/// use broadcast::select;
///
/// let x = ArrayView::from_vec([2, 3], vec![1i32, 2, 3, 4, 5, 6]).unwrap();
/// let rows = ArrayView::from_vec([2], vec![1i64, 0]).unwrap();
/// let picked = select(&x, &[rows]).unwrap().into_array();
/// assert_eq!(picked.dims(), &[2, 3]);
/// assert_eq!(picked.to_vec::<i32>().unwrap(), vec![4, 5, 6, 1, 2, 3]);
/// ```
pub fn select(x: &ArrayView, masks: &[ArrayView]) -> Result<Value, BroadcastError> {
    let sel = resolve(x, masks)?;
    if sel.shape.rank() == 0 {
        return Ok(Value::Scalar(x.flat_get(sel.blocks[0])?));
    }
    let out = ArrayView::zeros(sel.shape.clone(), x.dtype());
    for (i, &b) in sel.blocks.iter().enumerate() {
        Buffer::copy_range(
            x.buffer(),
            x.offset() + b,
            out.buffer(),
            i * sel.block_len,
            sel.block_len,
        )?;
    }
    Ok(Value::Array(out))
}

/// Writes `value` into the elements of `x` addressed by `masks`, combining
/// with the old contents per `op`.
///
/// `value` is a scalar or an array of the selection's shape. Every index is
/// resolved and every new element computed before the first write, so on
/// error `x` is unchanged. With repeated indices the last write wins and
/// compound operators see the original element each time.
pub fn update(
    x: &ArrayView,
    op: AssignOp,
    value: &Value,
    masks: &[ArrayView],
) -> Result<(), BroadcastError> {
    let sel = resolve(x, masks)?;
    if let Value::Array(v) = value {
        if v.shape() != &sel.shape {
            return Err(ArrayError::ShapeMismatch {
                op: "update",
                lhs: sel.shape,
                rhs: v.shape().clone(),
            }
            .into());
        }
    }

    let source = Operand::of(value);
    let mut writes = Vec::with_capacity(sel.blocks.len() * sel.block_len);
    for (i, pos) in sel.positions().enumerate() {
        let v = source.get(i);
        let new = match op.operator() {
            None => v,
            Some(binop) => {
                let old = x.flat_get(pos)?;
                arith::binary(binop, old, v, x.dtype().promote(v.dtype()))?
            }
        };
        writes.push((pos, new));
    }
    for (pos, v) in writes {
        x.flat_set(pos, v)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use array_core::{DType, Scalar};

    fn grid() -> ArrayView {
        ArrayView::from_vec([3, 2], vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    fn ints(v: Vec<i64>) -> ArrayView {
        let n = v.len();
        ArrayView::from_vec([n], v).unwrap()
    }

    #[test]
    fn test_bool_mask_select() {
        let x = grid();
        let mask =
            ArrayView::from_vec([3, 2], vec![true, false, false, true, true, false]).unwrap();
        let r = select(&x, &[mask]).unwrap().into_array();
        assert_eq!(r.dims(), &[3]);
        assert_eq!(r.to_vec::<f64>().unwrap(), vec![1.0, 4.0, 5.0]);
    }

    #[test]
    fn test_empty_bool_selection() {
        let x = grid();
        let mask = ArrayView::zeros([3, 2], DType::Bool);
        let r = select(&x, &[mask]).unwrap().into_array();
        assert_eq!(r.dims(), &[0]);
    }

    #[test]
    fn test_integer_masks_every_dimension() {
        let x = grid();
        let r = select(&x, &[ints(vec![2, 0]), ints(vec![1, 1])]).unwrap().into_array();
        assert_eq!(r.to_vec::<f64>().unwrap(), vec![6.0, 2.0]);
    }

    #[test]
    fn test_rank_two_mask_nests() {
        let x = grid();
        let m = ArrayView::from_vec([2, 2], vec![0i32, 2, 1, 1]).unwrap();
        let r = select(&x, &[m]).unwrap().into_array();
        assert_eq!(r.dims(), &[2, 2, 2]);
        assert_eq!(
            r.to_vec::<f64>().unwrap(),
            vec![1.0, 2.0, 5.0, 6.0, 3.0, 4.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_rank_zero_masks_give_scalar() {
        let x = grid();
        let i = ArrayView::scalar(Scalar::I64(1));
        let j = ArrayView::scalar(Scalar::I64(0));
        let r = select(&x, &[i, j]).unwrap();
        assert!(matches!(r, Value::Scalar(Scalar::F64(v)) if v == 3.0));
    }

    #[test]
    fn test_invalid_masks() {
        let x = grid();
        let bad = [
            vec![],
            vec![ArrayView::zeros([3, 2], DType::Bool), ints(vec![0])],
            vec![ArrayView::zeros([2], DType::F64)],
            vec![ints(vec![0]), ints(vec![0, 1])],
            vec![ints(vec![0]), ints(vec![0]), ints(vec![0])],
            vec![ArrayView::zeros([2, 3], DType::Bool)],
            vec![ints(vec![-1])],
        ];
        for masks in bad {
            assert!(matches!(
                select(&x, &masks),
                Err(BroadcastError::InvalidMask(_))
            ));
        }
        assert!(matches!(
            select(&x, &[ints(vec![3])]),
            Err(BroadcastError::Array(ArrayError::OutOfRangeIndex { index: 3, len: 3 }))
        ));
    }

    #[test]
    fn test_update_rows_with_array() {
        let x = grid();
        let value = ArrayView::from_vec([2, 2], vec![10.0f64, 20.0, 30.0, 40.0]).unwrap();
        update(&x, AssignOp::Assign, &value.into(), &[ints(vec![2, 0])]).unwrap();
        assert_eq!(
            x.to_vec::<f64>().unwrap(),
            vec![30.0, 40.0, 3.0, 4.0, 10.0, 20.0]
        );
    }

    #[test]
    fn test_update_compound_with_scalar() {
        let x = grid();
        let mask = ArrayView::from_vec([3, 2], vec![false, true, false, true, false, true]).unwrap();
        update(&x, AssignOp::Mul, &Scalar::I32(10).into(), &[mask]).unwrap();
        assert_eq!(
            x.to_vec::<f64>().unwrap(),
            vec![1.0, 20.0, 3.0, 40.0, 5.0, 60.0]
        );
    }

    #[test]
    fn test_update_validates_before_writing() {
        let x = ArrayView::from_vec([3], vec![6i32, 8, 10]).unwrap();
        let divisors = ArrayView::from_vec([3], vec![2i32, 2, 0]).unwrap();
        let err = update(&x, AssignOp::Div, &divisors.into(), &[ints(vec![0, 1, 2])]).unwrap_err();
        assert!(matches!(err, BroadcastError::Array(ArrayError::DivisionByZero { .. })));
        assert_eq!(x.to_vec::<i32>().unwrap(), vec![6, 8, 10]);

        let wrong = ArrayView::zeros([2], DType::I32);
        assert!(update(&x, AssignOp::Assign, &wrong.into(), &[ints(vec![0, 1, 2])]).is_err());
        assert_eq!(x.to_vec::<i32>().unwrap(), vec![6, 8, 10]);
    }

    #[test]
    fn test_update_repeated_index() {
        let x = ArrayView::from_vec([2], vec![0i64, 0]).unwrap();
        update(&x, AssignOp::Add, &Scalar::I64(1).into(), &[ints(vec![0, 0, 0])]).unwrap();
        assert_eq!(x.to_vec::<i64>().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_update_from_aliasing_value() {
        let x = ArrayView::from_vec([3], vec![1.0f64, 2.0, 3.0]).unwrap();
        // Reverse x in place, reading from x itself.
        update(&x, AssignOp::Assign, &x.clone().into(), &[ints(vec![2, 1, 0])]).unwrap();
        assert_eq!(x.to_vec::<f64>().unwrap(), vec![3.0, 2.0, 1.0]);
    }
}
