//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values and numeric constraints are enforced at the
//! boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A decimal carried more fractional digits than the field allows.
    #[error("{0} must have at most two decimal places")]
    TooPrecise(&'static str),
    /// A decimal was outside the range the store can represent.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Normalizes text for case-insensitive comparison.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Case-insensitive substring test. An empty fragment matches everything.
pub fn contains_ignore_case(haystack: &str, fragment: &str) -> bool {
    fold_case(haystack).contains(&fold_case(fragment))
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

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Compare with `other` ignoring letter case.
            pub fn eq_ignore_case(&self, other: &str) -> bool {
                fold_case(&self.0) == fold_case(other)
            }

            /// Whether `fragment` occurs in the value, ignoring letter case.
            pub fn contains_ignore_case(&self, fragment: &str) -> bool {
                contains_ignore_case(&self.0, fragment)
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

id_newtype!(CategoryId, "Unique identifier of a category.", "category_id");
id_newtype!(ProductId, "Unique identifier of a product.", "product_id");

non_empty_string_newtype!(CategoryName, "Display name of a category.", "category name");
non_empty_string_newtype!(ProductName, "Display name of a product.", "product name");

/// Exact product price with a two-decimal convention.
///
/// Stored as a whole number of cents so that ordering and range comparisons
/// are exact both in memory and in SQL.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ProductPrice(i64);

impl ProductPrice {
    /// Number of fractional digits kept for prices.
    pub const SCALE: u32 = 2;

    /// Constructs a price, rejecting values with more than two decimals.
    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        if value.normalize().scale() > Self::SCALE {
            return Err(TypeConstraintError::TooPrecise("price"));
        }
        value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
            .ok_or(TypeConstraintError::OutOfRange("price"))
    }

    /// Builds a price from its stored representation.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the price in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the price as an exact decimal with two fractional digits.
    pub fn get(self) -> Decimal {
        Decimal::new(self.0, Self::SCALE)
    }

    /// Smallest cent amount that is `>= bound`, saturating at the `i64` range.
    pub fn lower_bound_cents(bound: Decimal) -> i64 {
        Self::bound_cents(bound, Decimal::ceil)
    }

    /// Largest cent amount that is `<= bound`, saturating at the `i64` range.
    pub fn upper_bound_cents(bound: Decimal) -> i64 {
        Self::bound_cents(bound, Decimal::floor)
    }

    fn bound_cents(bound: Decimal, round: fn(&Decimal) -> Decimal) -> i64 {
        bound
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| round(&cents).to_i64())
            .unwrap_or(if bound.is_sign_negative() {
                i64::MIN
            } else {
                i64::MAX
            })
    }
}

impl Display for ProductPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<Decimal> for ProductPrice {
    type Error = TypeConstraintError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductPrice> for Decimal {
    fn from(value: ProductPrice) -> Self {
        value.get()
    }
}

/// Units of a product currently in stock.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct StockQuantity(i32);

impl StockQuantity {
    /// Constructs a stock quantity that is zero or greater.
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("stock quantity"))
        }
    }

    /// Returns the raw `i32` value.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Display for StockQuantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for StockQuantity {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StockQuantity> for i32 {
    fn from(value: StockQuantity) -> Self {
        value.0
    }
}

impl PartialEq<i32> for StockQuantity {
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}
