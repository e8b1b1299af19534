// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expression and predicate IR.
//!
//! Expressions are plain data: building one never touches a dataset. Verbs type-check an
//! expression against their input before evaluating it, so a bad column reference fails before
//! any row is read.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops;

use wrangle_core::Value;

use crate::case::CaseWhen;

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` (always produces a numeric result)
    Div,
}

/// Reducers that collapse the current scope to one value.
///
/// Inside a grouped verb the scope is one group; otherwise it is the whole dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// Number of rows in scope.
    Count,
    /// Number of distinct values (a missing value counts as one value).
    CountDistinct(Box<Expr>),
    /// Sum of present values. Integer inputs produce an integer.
    Sum(Box<Expr>),
    /// Mean of present values.
    Mean(Box<Expr>),
    /// Smallest present value, in the input's type.
    Min(Box<Expr>),
    /// Largest present value, in the input's type.
    Max(Box<Expr>),
    /// Sample standard deviation of present values.
    Sd(Box<Expr>),
    /// Median of present values.
    Median(Box<Expr>),
    /// Linear-interpolation quantile of present values.
    Quantile(Box<Expr>, f64),
}

/// Row-preserving functions evaluated over the whole scope and read back per row.
#[derive(Debug, Clone, PartialEq)]
pub enum Window {
    /// Ascending rank with ties averaged; missing values keep a missing rank.
    Rank(Box<Expr>),
    /// Running sum in scope order; a missing value makes the rest of the scope missing.
    CumSum(Box<Expr>),
    /// 1-based position within the scope.
    RowNumber,
}

/// A value-producing expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reads a column.
    Column(String),
    /// A constant, broadcast to every row.
    Literal(Value),
    /// Element-wise arithmetic. Missing operands produce a missing result.
    Arith {
        /// Operator.
        op: ArithOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Element-wise negation.
    Negate(Box<Expr>),
    /// A scope reducer, broadcast to every row of the scope.
    Aggregate(Aggregate),
    /// A scope-wide row-preserving function.
    Window(Window),
    /// First-match guarded values.
    Case(CaseWhen),
    /// A predicate read as a boolean value (unknown reads as missing).
    Condition(Box<Predicate>),
}

impl Expr {
    /// Returns `true` if the expression yields one value per scope regardless of its rows.
    ///
    /// These are the expressions `summarise` accepts.
    pub fn is_scalar(&self) -> bool {
        match self {
            Self::Literal(_) | Self::Aggregate(_) => true,
            Self::Column(_) | Self::Window(_) => false,
            Self::Case(c) => c
                .branches
                .iter()
                .all(|(guard, value)| guard.is_scalar() && value.is_scalar()),
            Self::Arith { lhs, rhs, .. } => lhs.is_scalar() && rhs.is_scalar(),
            Self::Negate(e) => e.is_scalar(),
            Self::Condition(p) => p.is_scalar(),
        }
    }

    fn compare(self, op: CompareOp, rhs: impl Into<Self>) -> Predicate {
        Predicate::Compare {
            lhs: self,
            op,
            rhs: rhs.into(),
        }
    }

    /// `self < rhs`
    pub fn lt(self, rhs: impl Into<Self>) -> Predicate {
        self.compare(CompareOp::Lt, rhs)
    }

    /// `self <= rhs`
    pub fn le(self, rhs: impl Into<Self>) -> Predicate {
        self.compare(CompareOp::Le, rhs)
    }

    /// `self > rhs`
    pub fn gt(self, rhs: impl Into<Self>) -> Predicate {
        self.compare(CompareOp::Gt, rhs)
    }

    /// `self >= rhs`
    pub fn ge(self, rhs: impl Into<Self>) -> Predicate {
        self.compare(CompareOp::Ge, rhs)
    }

    /// `self == rhs`
    pub fn equals(self, rhs: impl Into<Self>) -> Predicate {
        self.compare(CompareOp::Eq, rhs)
    }

    /// `self != rhs`
    pub fn not_equals(self, rhs: impl Into<Self>) -> Predicate {
        self.compare(CompareOp::Ne, rhs)
    }

    /// Set membership against literal values.
    pub fn is_in<I, V>(self, set: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::IsIn {
            expr: self,
            set: set.into_iter().map(Into::into).collect(),
        }
    }

    /// Holds where the value is missing.
    pub fn is_missing(self) -> Predicate {
        Predicate::IsMissing(self)
    }

    /// Treats a boolean expression as a predicate.
    pub fn holds(self) -> Predicate {
        Predicate::Holds(self)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CompareOp {
    /// Evaluates the operator given the ordering of `lhs` relative to `rhs`.
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
        }
    }

    /// Returns `true` for `<`, `<=`, `>` and `>=`.
    pub fn is_ordering(self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }
}

/// A row-level boolean condition.
///
/// Evaluation is three-valued: comparisons against a missing value are unknown, and verbs
/// only act on rows where a predicate definitely holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Compares two expressions.
    Compare {
        /// Left operand.
        lhs: Expr,
        /// Operator.
        op: CompareOp,
        /// Right operand.
        rhs: Expr,
    },
    /// Holds when the value equals one of the literals.
    IsIn {
        /// Tested expression.
        expr: Expr,
        /// Literal set.
        set: Vec<Value>,
    },
    /// Holds when the value is missing. Never unknown.
    IsMissing(Expr),
    /// Holds when a boolean expression is `true`.
    Holds(Expr),
    /// Conjunction, short-circuiting left to right. Empty holds.
    And(Vec<Predicate>),
    /// Disjunction, short-circuiting left to right. Empty never holds.
    Or(Vec<Predicate>),
    /// Negation (unknown stays unknown).
    Not(Box<Predicate>),
    /// Always holds; used as the fallback guard of a case expression.
    Always,
}

impl Predicate {
    /// `self AND other`, flattening nested conjunctions.
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut ps) => {
                ps.push(other);
                Self::And(ps)
            }
            p => Self::And(vec![p, other]),
        }
    }

    /// `self OR other`, flattening nested disjunctions.
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut ps) => {
                ps.push(other);
                Self::Or(ps)
            }
            p => Self::Or(vec![p, other]),
        }
    }

    /// Returns `true` if the predicate only depends on scope-level values.
    pub fn is_scalar(&self) -> bool {
        match self {
            Self::Compare { lhs, rhs, .. } => lhs.is_scalar() && rhs.is_scalar(),
            Self::IsIn { expr, .. } | Self::IsMissing(expr) | Self::Holds(expr) => {
                expr.is_scalar()
            }
            Self::And(ps) | Self::Or(ps) => ps.iter().all(Self::is_scalar),
            Self::Not(p) => p.is_scalar(),
            Self::Always => true,
        }
    }
}

impl ops::Not for Predicate {
    type Output = Self;

    fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Reads a column.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// A literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// The missing marker as an expression.
pub fn missing() -> Expr {
    Expr::Literal(Value::Missing)
}

/// Conjunction of several predicates.
pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::And(predicates.into_iter().collect())
}

/// Disjunction of several predicates.
pub fn any_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::Or(predicates.into_iter().collect())
}

/// A guard that always holds.
pub fn always() -> Predicate {
    Predicate::Always
}

/// Row count of the current scope.
pub fn n() -> Expr {
    Expr::Aggregate(Aggregate::Count)
}

/// Distinct value count within the current scope.
pub fn n_distinct(expr: impl Into<Expr>) -> Expr {
    Expr::Aggregate(Aggregate::CountDistinct(Box::new(expr.into())))
}

/// Scope sum.
pub fn sum(expr: impl Into<Expr>) -> Expr {
    Expr::Aggregate(Aggregate::Sum(Box::new(expr.into())))
}

/// Scope mean.
pub fn mean(expr: impl Into<Expr>) -> Expr {
    Expr::Aggregate(Aggregate::Mean(Box::new(expr.into())))
}

/// Scope minimum.
pub fn min(expr: impl Into<Expr>) -> Expr {
    Expr::Aggregate(Aggregate::Min(Box::new(expr.into())))
}

/// Scope maximum.
pub fn max(expr: impl Into<Expr>) -> Expr {
    Expr::Aggregate(Aggregate::Max(Box::new(expr.into())))
}

/// Scope sample standard deviation.
pub fn sd(expr: impl Into<Expr>) -> Expr {
    Expr::Aggregate(Aggregate::Sd(Box::new(expr.into())))
}

/// Scope median.
pub fn median(expr: impl Into<Expr>) -> Expr {
    Expr::Aggregate(Aggregate::Median(Box::new(expr.into())))
}

/// Scope quantile at probability `p`.
pub fn quantile(expr: impl Into<Expr>, p: f64) -> Expr {
    Expr::Aggregate(Aggregate::Quantile(Box::new(expr.into()), p))
}

/// Ascending average-tie rank within the scope. Use `rank(-x)` for descending ranks.
pub fn rank(expr: impl Into<Expr>) -> Expr {
    Expr::Window(Window::Rank(Box::new(expr.into())))
}

/// Running sum within the scope.
pub fn cumsum(expr: impl Into<Expr>) -> Expr {
    Expr::Window(Window::CumSum(Box::new(expr.into())))
}

/// 1-based row position within the scope.
pub fn row_number() -> Expr {
    Expr::Window(Window::RowNumber)
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        lit(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        lit(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        lit(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        lit(value)
    }
}

/// String literals are values, not column references; use [`col`] for columns.
impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        lit(value)
    }
}

impl From<Predicate> for Expr {
    fn from(value: Predicate) -> Self {
        Self::Condition(Box::new(value))
    }
}

impl From<CaseWhen> for Expr {
    fn from(value: CaseWhen) -> Self {
        Self::Case(value)
    }
}

macro_rules! arith_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl<R: Into<Expr>> ops::$trait<R> for Expr {
            type Output = Self;

            fn $method(self, rhs: R) -> Self {
                Self::Arith {
                    op: ArithOp::$op,
                    lhs: Box::new(self),
                    rhs: Box::new(rhs.into()),
                }
            }
        }
    };
}

arith_op!(Add, add, Add);
arith_op!(Sub, sub, Sub);
arith_op!(Mul, mul, Mul);
arith_op!(Div, div, Div);

impl ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Self::Negate(Box::new(self))
    }
}
