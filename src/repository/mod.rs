use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{
    CategoryId, ProductId, ProductPrice, StockQuantity, contains_ignore_case, fold_case,
};

pub mod category;
pub mod errors;
pub mod memory;
pub mod product;

pub use errors::{RepositoryError, RepositoryResult};
pub use memory::InMemoryRepository;

/// Escape character used by [`like_pattern`].
const LIKE_ESCAPE: char = '\\';

/// Build a case-folded `LIKE` pattern matching `fragment` anywhere in a value.
///
/// Matched against the `name_folded` columns, which hold names folded with the
/// same [`fold_case`]. Wildcards inside the fragment are escaped so they match
/// literally.
fn like_pattern(fragment: &str) -> String {
    let folded = fold_case(fragment);
    let mut pattern = String::with_capacity(folded.len() + 2);
    pattern.push('%');
    for ch in folded.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing or filtering products.
///
/// Every populated field narrows the result; an empty query lists everything.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// Restrict to products referencing this category.
    pub category_id: Option<CategoryId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Keep products whose stock is strictly below this value.
    pub stock_below: Option<i32>,
    /// Keep products whose stock is strictly above this value.
    pub stock_above: Option<i32>,
}

impl ProductListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn min_price(mut self, min_price: Decimal) -> Self {
        self.min_price = Some(min_price);
        self
    }
    pub fn max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = Some(max_price);
        self
    }
    pub fn stock_below(mut self, threshold: i32) -> Self {
        self.stock_below = Some(threshold);
        self
    }
    pub fn stock_above(mut self, minimum: i32) -> Self {
        self.stock_above = Some(minimum);
        self
    }

    /// Evaluate the query against a single product.
    pub fn matches(&self, product: &Product) -> bool {
        let cents = product.price.cents();
        let stock = product.stock_quantity.get();

        self.search
            .as_deref()
            .is_none_or(|search| contains_ignore_case(product.name.as_str(), search))
            && self
                .category_id
                .is_none_or(|category_id| product.belongs_to(category_id))
            && self
                .min_price
                .is_none_or(|min| cents >= ProductPrice::lower_bound_cents(min))
            && self
                .max_price
                .is_none_or(|max| cents <= ProductPrice::upper_bound_cents(max))
            && self.stock_below.is_none_or(|threshold| stock < threshold)
            && self.stock_above.is_none_or(|minimum| stock > minimum)
    }
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List every category ordered by id.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Retrieve a category by name, ignoring letter case.
    fn get_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>>;
    /// List categories whose name contains `fragment`, ignoring letter case.
    fn search_categories(&self, fragment: &str) -> RepositoryResult<Vec<Category>>;
    /// Whether a category with this name exists, ignoring letter case.
    fn category_name_exists(&self, name: &str) -> RepositoryResult<bool>;
    /// List categories referenced by at least one product.
    fn list_categories_with_products(&self) -> RepositoryResult<Vec<Category>>;
    /// Count products per category, including categories without products.
    fn count_products_by_category(&self) -> RepositoryResult<HashMap<CategoryId, usize>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category with a store-assigned id.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Insert or replace the category stored under `id`.
    fn save_category(&self, id: CategoryId, category: &NewCategory) -> RepositoryResult<Category>;
    /// Delete a category by id, failing while products still reference it.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// List products matching the supplied query parameters, ordered by id.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>>;
    /// Retrieve a product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
}

/// Write operations for product entities and their category membership.
pub trait ProductWriter {
    /// Persist a new product with a store-assigned id.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Insert or replace the product stored under `id`.
    fn save_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<Product>;
    /// Delete a product by id.
    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize>;
    /// Replace the stock quantity of a product, leaving other fields intact.
    fn update_product_stock(
        &self,
        id: ProductId,
        quantity: StockQuantity,
    ) -> RepositoryResult<Option<Product>>;
    /// Make `category_id` the category of a product.
    ///
    /// Returns `None` when either the product or the category is missing; both
    /// are checked in the same write transaction as the update.
    fn assign_product_category(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> RepositoryResult<Option<Product>>;
    /// Clear the category of a product if it currently is `category_id`.
    fn unassign_product_category(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> RepositoryResult<Option<Product>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ProductName;
    use chrono::DateTime;

    fn product(name: &str, cents: i64, stock: i32) -> Product {
        let epoch = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Product {
            id: ProductId::new(1).unwrap(),
            name: ProductName::new(name).unwrap(),
            description: None,
            price: ProductPrice::from_cents(cents),
            stock_quantity: StockQuantity::new(stock).unwrap(),
            category_id: None,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Ab"), "%ab%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(ProductListQuery::default().matches(&product("Lamp", 3999, 25)));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let lamp = product("Lamp", 3999, 25);
        let exact = Decimal::new(3999, 2);
        assert!(ProductListQuery::default().max_price(exact).matches(&lamp));
        assert!(ProductListQuery::default().min_price(exact).matches(&lamp));
        assert!(
            !ProductListQuery::default()
                .max_price(Decimal::new(3998, 2))
                .matches(&lamp)
        );
    }

    #[test]
    fn stock_bounds_are_strict() {
        let lamp = product("Lamp", 3999, 25);
        assert!(!ProductListQuery::default().stock_below(25).matches(&lamp));
        assert!(ProductListQuery::default().stock_below(26).matches(&lamp));
        assert!(!ProductListQuery::default().stock_above(25).matches(&lamp));
        assert!(ProductListQuery::default().stock_above(24).matches(&lamp));
    }

    #[test]
    fn search_ignores_case() {
        let lamp = product("Table Lamp", 3999, 25);
        assert!(ProductListQuery::default().search("LAMP").matches(&lamp));
        assert!(!ProductListQuery::default().search("chair").matches(&lamp));
    }
}
