//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values and numeric constraints are enforced at the
//! boundary.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::text::truncate_to_bytes;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative or not finite.
    #[error("{0} must be a finite number, zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Text kept byte-for-byte as supplied; grouping compares these values
/// exactly, so no trimming or case folding happens here.
macro_rules! exact_text_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a non-empty value without altering its bytes.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let value = value.into();
                if value.is_empty() {
                    Err(TypeConstraintError::EmptyString($field))
                } else {
                    Ok(Self(value))
                }
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Length of the UTF-8 encoding in bytes.
            pub fn byte_len(&self) -> usize {
                self.0.len()
            }

            /// Cut the value to at most `max_bytes` encoded bytes.
            ///
            /// The first character of a non-empty string never exceeds four
            /// bytes, so any limit of four or more keeps the value non-empty.
            pub fn truncate_to_bytes(&mut self, max_bytes: usize) {
                let kept = truncate_to_bytes(&self.0, max_bytes).len();
                if kept > 0 {
                    self.0.truncate(kept);
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

id_newtype!(
    LunchRecordId,
    "Store-assigned identifier of a lunch record.",
    "lunch_record_id"
);

exact_text_newtype!(RestaurantName, "Name of the visited restaurant.", "restaurant");
exact_text_newtype!(MenuName, "Name of the ordered menu item.", "menu");

/// A single rating given on one visit.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f32", into = "f32")]
pub struct Grade(f32);

impl Grade {
    /// Constructs a finite grade that is zero or greater.
    pub fn new(value: f32) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("grade"))
        }
    }

    /// Returns the raw `f32` value.
    pub const fn get(self) -> f32 {
        self.0
    }

    /// Whether the grade is exactly `0.0`.
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f32> for Grade {
    type Error = TypeConstraintError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for f32 {
    fn from(value: Grade) -> Self {
        value.0
    }
}

impl PartialEq<f32> for Grade {
    fn eq(&self, other: &f32) -> bool {
        self.0 == *other
    }
}

/// Mean grade of a (restaurant, menu) group, kept to three decimal places.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f32", into = "f32")]
pub struct AverageGrade(f32);

impl AverageGrade {
    /// Placeholder stored until the first contribution or reconciliation.
    pub const ZERO: Self = Self(0.0);

    /// Accepts a stored average as-is. Values read back from storage are
    /// already rounded.
    pub fn new(value: f32) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("average grade"))
        }
    }

    /// Round to three decimals, half-up on the value scaled by 1000.
    pub fn round(value: f64) -> Self {
        Self(((value * 1000.0 + 0.5).floor() / 1000.0) as f32)
    }

    /// Rounded arithmetic mean of `grades`, or `None` when there are none.
    pub fn mean_of<I>(grades: I) -> Option<Self>
    where
        I: IntoIterator<Item = Grade>,
    {
        let (sum, count) = grades
            .into_iter()
            .fold((0.0_f64, 0_usize), |(sum, count), grade| {
                (sum + f64::from(grade.get()), count + 1)
            });
        if count == 0 {
            None
        } else {
            Some(Self::round(sum / count as f64))
        }
    }

    /// Returns the raw `f32` value.
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl From<Grade> for AverageGrade {
    fn from(grade: Grade) -> Self {
        Self::round(f64::from(grade.get()))
    }
}

impl Display for AverageGrade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl TryFrom<f32> for AverageGrade {
    type Error = TypeConstraintError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AverageGrade> for f32 {
    fn from(value: AverageGrade) -> Self {
        value.0
    }
}

impl PartialEq<f32> for AverageGrade {
    fn eq(&self, other: &f32) -> bool {
        self.0 == *other
    }
}

/// Fixed-point price paid for the meal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct LunchPrice(Decimal);

impl LunchPrice {
    /// Constructs a price that is zero or greater.
    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(TypeConstraintError::NegativeNumber("price"))
        } else {
            Ok(Self(value))
        }
    }

    /// Returns the raw decimal value.
    pub const fn get(self) -> Decimal {
        self.0
    }
}

impl FromStr for LunchPrice {
    type Err = TypeConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(value.trim())
            .map_err(|e| TypeConstraintError::InvalidValue(format!("price {value:?}: {e}")))?;
        Self::new(decimal)
    }
}

impl Display for LunchPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for LunchPrice {
    type Error = TypeConstraintError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LunchPrice> for Decimal {
    fn from(value: LunchPrice) -> Self {
        value.0
    }
}
