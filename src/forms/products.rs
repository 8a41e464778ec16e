use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::NewProduct;
use crate::domain::types::{
    CategoryId, ProductName, ProductPrice, StockQuantity, TypeConstraintError,
};

use super::non_blank;

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(range(min = 1))]
    pub category_id: Option<i32>,
}

#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("Product form validation failed: {0}")]
    Validation(String),
    #[error("Product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<ProductForm> for NewProduct {
    type Error = ProductFormError;

    fn try_from(value: ProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        if value.price.is_sign_negative() && !value.price.is_zero() {
            return Err(TypeConstraintError::NegativeNumber("price").into());
        }

        Ok(NewProduct {
            name: ProductName::new(value.name)?,
            description: non_blank(value.description),
            price: ProductPrice::new(value.price)?,
            stock_quantity: value
                .stock_quantity
                .map(StockQuantity::new)
                .transpose()?
                .unwrap_or_default(),
            category_id: value.category_id.map(CategoryId::new).transpose()?,
        })
    }
}

/// Query string of `PATCH /api/products/{id}/stock`.
#[derive(Debug, Deserialize, Validate)]
pub struct StockUpdateQuery {
    #[validate(range(min = 0))]
    pub quantity: i32,
}

#[derive(Debug, Error)]
pub enum StockUpdateError {
    #[error("Stock update validation failed: {0}")]
    Validation(String),
    #[error("Stock update contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for StockUpdateError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for StockUpdateError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<StockUpdateQuery> for StockQuantity {
    type Error = StockUpdateError;

    fn try_from(value: StockUpdateQuery) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(StockQuantity::new(value.quantity)?)
    }
}

/// Threshold used by `GET /api/products/low-stock` when none is given.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

fn default_low_stock_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    #[serde(default = "default_low_stock_threshold")]
    pub threshold: i32,
}

#[derive(Debug, Deserialize)]
pub struct InStockQuery {
    #[serde(default)]
    pub min: i32,
}

/// Query string of `GET /api/products/filter`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilterQuery {
    pub name: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub min_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub max_price: Decimal,
}

/// Price filter selected by the query string.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceFilter {
    /// Everything priced at or below the bound.
    MaxPrice(Decimal),
    /// Name fragment combined with an inclusive price range.
    NameAndRange {
        name: String,
        min_price: Decimal,
        max_price: Decimal,
    },
}

impl From<PriceFilterQuery> for PriceFilter {
    /// A blank name selects the max-price filter and ignores `minPrice`.
    fn from(value: PriceFilterQuery) -> Self {
        match non_blank(value.name) {
            Some(name) => Self::NameAndRange {
                name,
                min_price: value.min_price,
                max_price: value.max_price,
            },
            None => Self::MaxPrice(value.max_price),
        }
    }
}
