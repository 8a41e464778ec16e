//! Sample catalog loaded into an empty store on start-up.

use crate::domain::category::NewCategory;
use crate::domain::product::NewProduct;
use crate::domain::types::{CategoryName, ProductName, ProductPrice, StockQuantity};
use crate::repository::{CategoryReader, CategoryWriter, ProductWriter, RepositoryResult};

struct SampleProduct {
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    stock: i32,
}

struct SampleCategory {
    name: &'static str,
    description: &'static str,
    products: &'static [SampleProduct],
}

const fn product(
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    stock: i32,
) -> SampleProduct {
    SampleProduct {
        name,
        description,
        price_cents,
        stock,
    }
}

const SAMPLE_CATALOG: &[SampleCategory] = &[
    SampleCategory {
        name: "Electronics",
        description: "Electronic devices and gadgets",
        products: &[
            product("Smartphone", "Latest model with high-resolution camera", 69_999, 50),
            product("Laptop", "Powerful laptop for work and gaming", 129_999, 30),
            product("Tablet", "Lightweight tablet with long battery life", 39_999, 45),
        ],
    },
    SampleCategory {
        name: "Clothing",
        description: "Apparel and accessories",
        products: &[
            product("T-Shirt", "Comfortable cotton t-shirt", 1_999, 100),
            product("Jeans", "Classic blue jeans", 4_999, 75),
        ],
    },
    SampleCategory {
        name: "Books",
        description: "Books, e-books, and publications",
        products: &[
            product("Novel", "Bestselling fiction novel", 1_499, 60),
            product("Cookbook", "Collection of gourmet recipes", 2_499, 40),
        ],
    },
    SampleCategory {
        name: "Home & Garden",
        description: "Home decor and garden supplies",
        products: &[
            product("Lamp", "Modern design table lamp", 3_999, 25),
            product("Plant", "Indoor plant in decorative pot", 2_999, 35),
        ],
    },
    SampleCategory {
        name: "Sports & Outdoors",
        description: "Sports equipment and outdoor gear",
        products: &[
            product("Tennis Racket", "Professional tennis racket", 8_999, 20),
            product("Basketball", "Official size basketball", 2_499, 30),
        ],
    },
];

/// Insert the sample catalog unless the store already holds a category.
///
/// Returns whether anything was inserted.
pub fn seed_sample_data<R>(repo: &R) -> RepositoryResult<bool>
where
    R: CategoryReader + CategoryWriter + ProductWriter,
{
    if !repo.list_categories()?.is_empty() {
        log::info!("Catalog already populated, skipping sample data");
        return Ok(false);
    }

    let mut product_count = 0;
    for sample in SAMPLE_CATALOG {
        let category = repo.create_category(&NewCategory::new(
            CategoryName::new(sample.name)?,
            Some(sample.description.to_string()),
        ))?;

        for item in sample.products {
            let new_product = NewProduct::new(
                ProductName::new(item.name)?,
                ProductPrice::from_cents(item.price_cents),
                StockQuantity::new(item.stock)?,
            )
            .description(item.description)
            .category(category.id);

            repo.create_product(&new_product)?;
            product_count += 1;
        }
    }

    log::info!(
        "Seeded {} categories and {product_count} products",
        SAMPLE_CATALOG.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::repository::{InMemoryRepository, ProductListQuery, ProductReader};

    #[test]
    fn seeds_empty_store_once() {
        let repo = InMemoryRepository::new();

        assert!(seed_sample_data(&repo).unwrap());
        assert!(!seed_sample_data(&repo).unwrap());

        assert_eq!(repo.list_categories().unwrap().len(), 5);
        assert_eq!(
            repo.list_products(ProductListQuery::default())
                .unwrap()
                .len(),
            11
        );
    }

    #[test]
    fn seeded_products_belong_to_their_category() {
        let repo = InMemoryRepository::new();
        seed_sample_data(&repo).unwrap();

        let electronics = repo.get_category_by_name("electronics").unwrap().unwrap();
        let counts = repo.count_products_by_category().unwrap();
        assert_eq!(counts[&electronics.id], 3);

        let laptop = repo
            .list_products(ProductListQuery::default().search("laptop"))
            .unwrap()
            .remove(0);
        assert!(laptop.belongs_to(electronics.id));
        assert_eq!(laptop.price.get(), Decimal::new(129_999, 2));
        assert_eq!(laptop.stock_quantity, 30);
    }
}
