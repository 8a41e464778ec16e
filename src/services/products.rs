use rust_decimal::Decimal;

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{CategoryId, ProductId, StockQuantity};
use crate::repository::{ProductListQuery, ProductReader, ProductWriter};

use super::{ServiceResult, repository_error};

/// Product CRUD, search, filtering and stock mutation.
pub trait ProductService {
    /// All products, ordered by id.
    fn find_all(&self) -> ServiceResult<Vec<Product>>;
    fn find_by_id(&self, id: ProductId) -> ServiceResult<Option<Product>>;
    /// Insert when `id` is `None`, otherwise replace the record stored under
    /// `id`.
    fn save(&self, id: Option<ProductId>, product: NewProduct) -> ServiceResult<Product>;
    /// Returns `false` when no product has this id.
    fn delete(&self, id: ProductId) -> ServiceResult<bool>;
    /// Substring match on the name ignoring letter case.
    fn search_by_name(&self, fragment: &str) -> ServiceResult<Vec<Product>>;
    /// Products referencing the category; empty for unknown ids.
    fn find_by_category(&self, category_id: CategoryId) -> ServiceResult<Vec<Product>>;
    /// Products priced at or below `max_price`.
    fn find_by_max_price(&self, max_price: Decimal) -> ServiceResult<Vec<Product>>;
    /// Products whose name contains `name` and whose price lies in
    /// `min_price..=max_price`.
    fn find_by_name_and_price_range(
        &self,
        name: &str,
        min_price: Decimal,
        max_price: Decimal,
    ) -> ServiceResult<Vec<Product>>;
    /// Products with fewer than `threshold` units in stock.
    fn find_low_stock(&self, threshold: i32) -> ServiceResult<Vec<Product>>;
    /// Products with more than `minimum` units in stock.
    fn find_in_stock(&self, minimum: i32) -> ServiceResult<Vec<Product>>;
    /// Replace the stock quantity. `None` if the product does not exist.
    fn update_stock(
        &self,
        id: ProductId,
        quantity: StockQuantity,
    ) -> ServiceResult<Option<Product>>;
}

/// [`ProductService`] over any catalog store.
pub struct Products<'a, R> {
    repo: &'a R,
}

impl<'a, R> Products<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }
}

impl<R> Products<'_, R>
where
    R: ProductReader,
{
    fn list(&self, query: ProductListQuery) -> ServiceResult<Vec<Product>> {
        self.repo
            .list_products(query)
            .map_err(repository_error("list products"))
    }
}

impl<R> ProductService for Products<'_, R>
where
    R: ProductReader + ProductWriter,
{
    fn find_all(&self) -> ServiceResult<Vec<Product>> {
        self.list(ProductListQuery::default())
    }

    fn find_by_id(&self, id: ProductId) -> ServiceResult<Option<Product>> {
        self.repo
            .get_product_by_id(id)
            .map_err(repository_error("get product"))
    }

    fn save(&self, id: Option<ProductId>, product: NewProduct) -> ServiceResult<Product> {
        let saved = match id {
            Some(id) => self.repo.save_product(id, &product),
            None => self.repo.create_product(&product),
        }
        .map_err(repository_error("save product"))?;

        log::info!("Saved product {} '{}'", saved.id, saved.name);
        Ok(saved)
    }

    fn delete(&self, id: ProductId) -> ServiceResult<bool> {
        let affected = self
            .repo
            .delete_product(id)
            .map_err(repository_error("delete product"))?;

        if affected > 0 {
            log::info!("Deleted product {id}");
        }
        Ok(affected > 0)
    }

    fn search_by_name(&self, fragment: &str) -> ServiceResult<Vec<Product>> {
        self.list(ProductListQuery::default().search(fragment))
    }

    fn find_by_category(&self, category_id: CategoryId) -> ServiceResult<Vec<Product>> {
        self.list(ProductListQuery::default().category(category_id))
    }

    fn find_by_max_price(&self, max_price: Decimal) -> ServiceResult<Vec<Product>> {
        self.list(ProductListQuery::default().max_price(max_price))
    }

    fn find_by_name_and_price_range(
        &self,
        name: &str,
        min_price: Decimal,
        max_price: Decimal,
    ) -> ServiceResult<Vec<Product>> {
        self.list(
            ProductListQuery::default()
                .search(name)
                .min_price(min_price)
                .max_price(max_price),
        )
    }

    fn find_low_stock(&self, threshold: i32) -> ServiceResult<Vec<Product>> {
        self.list(ProductListQuery::default().stock_below(threshold))
    }

    fn find_in_stock(&self, minimum: i32) -> ServiceResult<Vec<Product>> {
        self.list(ProductListQuery::default().stock_above(minimum))
    }

    fn update_stock(
        &self,
        id: ProductId,
        quantity: StockQuantity,
    ) -> ServiceResult<Option<Product>> {
        let updated = self
            .repo
            .update_product_stock(id, quantity)
            .map_err(repository_error("update product stock"))?;

        match &updated {
            Some(product) => log::info!("Set stock of product {id} to {}", product.stock_quantity),
            None => log::debug!("Stock update skipped, product {id} not found"),
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::NewCategory;
    use crate::domain::types::{CategoryName, ProductName, ProductPrice};
    use crate::repository::{CategoryWriter, InMemoryRepository};
    use crate::services::ServiceError;

    fn new_product(name: &str, cents: i64, stock: i32) -> NewProduct {
        NewProduct::new(
            ProductName::new(name).unwrap(),
            ProductPrice::from_cents(cents),
            StockQuantity::new(stock).unwrap(),
        )
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    fn seeded() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let service = Products::new(&repo);
        for product in [
            new_product("Smartphone", 69_999, 50),
            new_product("Laptop", 129_999, 30),
            new_product("Basketball", 2_499, 9),
            new_product("Cookbook", 2_499, 10),
            new_product("Lamp", 3_999, 0),
        ] {
            service.save(None, product).unwrap();
        }
        repo
    }

    #[test]
    fn save_and_find_by_id() {
        let repo = InMemoryRepository::new();
        let service = Products::new(&repo);

        let saved = service
            .save(None, new_product("Tablet", 39_999, 45).description("Long battery life"))
            .unwrap();

        let found = service.find_by_id(saved.id).unwrap().expect("product exists");
        assert_eq!(found, saved);
        assert_eq!(found.description.as_deref(), Some("Long battery life"));
        assert_eq!(found.price.get(), Decimal::new(39_999, 2));
        assert_eq!(
            service.find_by_id(ProductId::new(99).unwrap()).unwrap(),
            None
        );
    }

    #[test]
    fn save_with_unknown_category_fails() {
        let repo = InMemoryRepository::new();
        let service = Products::new(&repo);

        let err = service
            .save(
                None,
                new_product("Tablet", 39_999, 45).category(CategoryId::new(5).unwrap()),
            )
            .unwrap_err();

        assert!(matches!(err, ServiceError::Integrity(_)));
        assert!(service.find_all().unwrap().is_empty());
    }

    #[test]
    fn delete_reports_absence() {
        let repo = seeded();
        let service = Products::new(&repo);
        let id = ProductId::new(1).unwrap();

        assert!(service.delete(id).unwrap());
        assert!(!service.delete(id).unwrap());
        assert_eq!(service.find_all().unwrap().len(), 4);
    }

    #[test]
    fn search_ignores_case() {
        let repo = seeded();
        let service = Products::new(&repo);

        assert_eq!(names(&service.search_by_name("LAP").unwrap()), ["Laptop"]);
        assert_eq!(service.search_by_name("").unwrap().len(), 5);
    }

    #[test]
    fn max_price_is_inclusive() {
        let repo = seeded();
        let service = Products::new(&repo);

        let at_boundary = service.find_by_max_price(Decimal::new(2_499, 2)).unwrap();
        assert_eq!(names(&at_boundary), ["Basketball", "Cookbook"]);

        let below = service.find_by_max_price(Decimal::new(2_498, 2)).unwrap();
        assert!(below.is_empty());
    }

    #[test]
    fn name_and_price_range_is_a_conjunction() {
        let repo = seeded();
        let service = Products::new(&repo);

        let found = service
            .find_by_name_and_price_range("o", Decimal::new(2_499, 2), Decimal::new(69_999, 2))
            .unwrap();
        assert_eq!(names(&found), ["Smartphone", "Cookbook"]);

        let everything = service
            .find_by_name_and_price_range("", Decimal::ZERO, Decimal::new(1_000_000, 0))
            .unwrap();
        assert_eq!(everything.len(), 5);
    }

    #[test]
    fn low_stock_is_strict() {
        let repo = seeded();
        let service = Products::new(&repo);

        let low = service.find_low_stock(10).unwrap();
        assert_eq!(names(&low), ["Basketball", "Lamp"]);
    }

    #[test]
    fn in_stock_is_strict() {
        let repo = seeded();
        let service = Products::new(&repo);

        let available = service.find_in_stock(0).unwrap();
        assert_eq!(available.len(), 4);
        assert!(available.iter().all(|p| p.stock_quantity.get() > 0));
    }

    #[test]
    fn find_by_category_of_unknown_category_is_empty() {
        let repo = seeded();
        let service = Products::new(&repo);

        let found = service
            .find_by_category(CategoryId::new(42).unwrap())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn find_by_category_lists_members() {
        let repo = seeded();
        let books = repo
            .create_category(&NewCategory::new(CategoryName::new("Books").unwrap(), None))
            .unwrap();
        let service = Products::new(&repo);
        let novel = service
            .save(None, new_product("Novel", 1_499, 60).category(books.id))
            .unwrap();

        assert_eq!(service.find_by_category(books.id).unwrap(), vec![novel]);
    }

    #[test]
    fn update_stock_replaces_quantity_only() {
        let repo = seeded();
        let service = Products::new(&repo);
        let before = service.find_by_id(ProductId::new(2).unwrap()).unwrap().unwrap();

        let after = service
            .update_stock(before.id, StockQuantity::new(3).unwrap())
            .unwrap()
            .expect("product exists");

        assert_eq!(after.stock_quantity, 3);
        assert_eq!(after.name, before.name);
        assert_eq!(after.description, before.description);
        assert_eq!(after.price, before.price);
        assert_eq!(after.category_id, before.category_id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);

        let again = service
            .update_stock(before.id, StockQuantity::new(3).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(again.stock_quantity, 3);
    }

    #[test]
    fn update_stock_of_missing_product_changes_nothing() {
        let repo = seeded();
        let service = Products::new(&repo);
        let before = service.find_all().unwrap();

        let result = service
            .update_stock(ProductId::new(99).unwrap(), StockQuantity::new(1).unwrap())
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(service.find_all().unwrap(), before);
    }
}
