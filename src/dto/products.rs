use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::product::Product;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            description: value.description,
            price: value.price.get(),
            stock_quantity: value.stock_quantity.get(),
            category_id: value.category_id.map(|id| id.get()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::json;

    use super::*;
    use crate::domain::types::{CategoryId, ProductId, ProductName, ProductPrice, StockQuantity};

    fn lamp(cents: i64) -> Product {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc();
        Product {
            id: ProductId::new(7).unwrap(),
            name: ProductName::new("Lamp").unwrap(),
            description: None,
            price: ProductPrice::from_cents(cents),
            stock_quantity: StockQuantity::new(25).unwrap(),
            category_id: Some(CategoryId::new(4).unwrap()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(ProductDto::from(lamp(3_999))).unwrap();

        assert_eq!(value["id"], json!(7));
        assert_eq!(value["stockQuantity"], json!(25));
        assert_eq!(value["categoryId"], json!(4));
        assert_eq!(value["price"], json!(39.99));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn writes_price_as_exact_number() {
        let body = serde_json::to_string(&ProductDto::from(lamp(9_007_199_254_740_993))).unwrap();
        assert!(body.contains(r#""price":90071992547409.93"#));
    }
}
