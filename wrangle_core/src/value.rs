// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell values and column type tags.

extern crate alloc;

use alloc::string::String;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// The declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Floating point numbers.
    Numeric,
    /// Signed 64-bit integers.
    Integer,
    /// `true` / `false`.
    Boolean,
    /// A label drawn from an ordered set of levels.
    Categorical,
    /// Free-form text.
    Text,
}

impl DataType {
    /// Returns `true` for types that numeric aggregators accept.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Integer)
    }

    /// Returns the narrowest type both `self` and `other` fit into, if any.
    ///
    /// Integers widen to numeric and categorical labels widen to text; every other pair
    /// must match exactly.
    pub fn common_supertype(self, other: Self) -> Option<Self> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (Self::Integer, Self::Numeric) | (Self::Numeric, Self::Integer) => Some(Self::Numeric),
            (Self::Categorical, Self::Text) | (Self::Text, Self::Categorical) => Some(Self::Text),
            _ => None,
        }
    }

    /// Lowercase name, used in error messages and schema reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Categorical => "categorical",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell.
///
/// Categorical cells are read back as [`Value::Text`] holding their label.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Missing marker.
    #[default]
    Missing,
    /// A floating point number.
    Numeric(f64),
    /// A signed integer.
    Integer(i64),
    /// A boolean.
    Boolean(bool),
    /// A text value or categorical label.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The natural type of this value, or `None` for a missing value.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Missing => None,
            Self::Numeric(_) => Some(DataType::Numeric),
            Self::Integer(_) => Some(DataType::Integer),
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Text(_) => Some(DataType::Text),
        }
    }

    /// Reads the value as `f64` if it is numeric or integer.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Numeric(v) => Some(v),
            Self::Integer(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Reads the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Reads the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two present values of compatible types.
    ///
    /// Returns `None` when either side is missing, the types are incomparable, or a NaN is
    /// involved.
    pub fn partial_compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (a, b) => {
                let (a, b) = (a.as_f64()?, b.as_f64()?);
                a.partial_cmp(&b)
            }
        }
    }
}

fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0_f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Numeric(a), Self::Numeric(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

// Numeric cells compare by canonical bits, which makes equality total.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::Missing => {}
            Self::Numeric(v) => canonical_bits(*v).hash(state),
            Self::Integer(v) => v.hash(state),
            Self::Boolean(v) => v.hash(state),
            Self::Text(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("NA"),
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}
