// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Binary and compound-assignment operator enums.

use std::fmt;
use std::str::FromStr;

use crate::BroadcastError;

/// A binary elementwise operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 12] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Rem,
        Operator::Pow,
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
    ];

    /// The operator's token, e.g. `"**"` for [`Operator::Pow`].
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Rem => "%",
            Operator::Pow => "**",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    /// `true` for the six comparison operators, which produce `Bool`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
        )
    }

    /// `true` for comparisons that need a total order (undefined on complex).
    pub fn is_ordered(self) -> bool {
        matches!(self, Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = BroadcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| BroadcastError::InvalidOperator(s.to_string()))
    }
}

/// An in-place assignment operator for [`apply_assign`](crate::apply_assign)
/// and [`update`](crate::update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl AssignOp {
    pub const ALL: [AssignOp; 7] = [
        AssignOp::Assign,
        AssignOp::Add,
        AssignOp::Sub,
        AssignOp::Mul,
        AssignOp::Div,
        AssignOp::Rem,
        AssignOp::Pow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::Pow => "**=",
        }
    }

    /// The binary operator combining old and new values; `None` for plain
    /// assignment.
    pub fn operator(self) -> Option<Operator> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(Operator::Add),
            AssignOp::Sub => Some(Operator::Sub),
            AssignOp::Mul => Some(Operator::Mul),
            AssignOp::Div => Some(Operator::Div),
            AssignOp::Rem => Some(Operator::Rem),
            AssignOp::Pow => Some(Operator::Pow),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignOp {
    type Err = BroadcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssignOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| BroadcastError::InvalidOperator(s.to_string()))
    }
}
