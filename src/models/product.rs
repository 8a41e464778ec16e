use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::types::{
    CategoryId, ProductId, ProductName, ProductPrice, StockQuantity, TypeConstraintError,
    fold_case,
};

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i32,
    pub category_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Product`] letting the database assign the id.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct {
    pub name: String,
    /// Lowercased `name` matched by case-insensitive lookups.
    pub name_folded: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i32,
    pub category_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full row with an explicit id, used for insert-or-replace.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductRecord {
    pub id: i32,
    pub name: String,
    pub name_folded: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i32,
    pub category_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    pub fn from_domain(product: &DomainNewProduct, now: NaiveDateTime) -> Self {
        Self {
            name: product.name.as_str().to_string(),
            name_folded: fold_case(product.name.as_str()),
            description: product.description.clone(),
            price_cents: product.price.cents(),
            stock_quantity: product.stock_quantity.get(),
            category_id: product.category_id.map(CategoryId::get),
            created_at: now,
            updated_at: now,
        }
    }
}

impl ProductRecord {
    pub fn from_domain(id: ProductId, product: &DomainNewProduct, now: NaiveDateTime) -> Self {
        Self {
            id: id.get(),
            name: product.name.as_str().to_string(),
            name_folded: fold_case(product.name.as_str()),
            description: product.description.clone(),
            price_cents: product.price.cents(),
            stock_quantity: product.stock_quantity.get(),
            category_id: product.category_id.map(CategoryId::get),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: product.id.try_into()?,
            name: ProductName::new(product.name)?,
            description: product.description,
            price: ProductPrice::from_cents(product.price_cents),
            stock_quantity: StockQuantity::new(product.stock_quantity)?,
            category_id: product.category_id.map(CategoryId::new).transpose()?,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}
