use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, ProductId, ProductName, ProductPrice, StockQuantity};

/// Persisted product record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub description: Option<String>,
    pub price: ProductPrice,
    pub stock_quantity: StockQuantity,
    /// Category this product belongs to, if any.
    pub category_id: Option<CategoryId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Whether the product is a member of `category_id`.
    pub fn belongs_to(&self, category_id: CategoryId) -> bool {
        self.category_id == Some(category_id)
    }
}

/// Information required to insert or replace a [`Product`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewProduct {
    pub name: ProductName,
    pub description: Option<String>,
    pub price: ProductPrice,
    #[serde(default)]
    pub stock_quantity: StockQuantity,
    pub category_id: Option<CategoryId>,
}

impl NewProduct {
    pub fn new(name: ProductName, price: ProductPrice, stock_quantity: StockQuantity) -> Self {
        Self {
            name,
            description: None,
            price,
            stock_quantity,
            category_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
}
