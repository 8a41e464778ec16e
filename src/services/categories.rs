use std::collections::HashMap;

use crate::domain::category::{Category, NewCategory};
use crate::domain::product::Product;
use crate::domain::types::{CategoryId, ProductId};
use crate::repository::{CategoryReader, CategoryWriter, ProductWriter};

use super::{ServiceResult, repository_error};

/// Category CRUD, search and aggregation.
pub trait CategoryService {
    /// All categories, ordered by id.
    fn find_all(&self) -> ServiceResult<Vec<Category>>;
    fn find_by_id(&self, id: CategoryId) -> ServiceResult<Option<Category>>;
    /// Exact name lookup ignoring letter case.
    fn find_by_name(&self, name: &str) -> ServiceResult<Option<Category>>;
    /// Insert when `id` is `None`, otherwise replace the record stored under
    /// `id`. Name uniqueness is the caller's concern, see [`Self::exists`].
    fn save(&self, id: Option<CategoryId>, category: NewCategory) -> ServiceResult<Category>;
    /// Returns `false` when no category has this id. Fails with
    /// [`ServiceError::Integrity`](super::ServiceError::Integrity) while
    /// products still reference the category.
    fn delete(&self, id: CategoryId) -> ServiceResult<bool>;
    /// Substring match ignoring letter case; an empty fragment matches all.
    fn search_by_name(&self, fragment: &str) -> ServiceResult<Vec<Category>>;
    /// Categories owning at least one product.
    fn categories_with_products(&self) -> ServiceResult<Vec<Category>>;
    /// Product count of every category, zero included.
    fn product_counts_by_category(&self) -> ServiceResult<HashMap<CategoryId, usize>>;
    /// Whether a category with this name exists, ignoring letter case.
    fn exists(&self, name: &str) -> ServiceResult<bool>;
    /// Move a product into this category. `None` if either record is missing.
    fn add_product(
        &self,
        category_id: CategoryId,
        product_id: ProductId,
    ) -> ServiceResult<Option<Product>>;
    /// Take a product out of this category. A product that belongs elsewhere
    /// is returned unchanged; `None` if the product is missing.
    fn remove_product(
        &self,
        category_id: CategoryId,
        product_id: ProductId,
    ) -> ServiceResult<Option<Product>>;
}

/// [`CategoryService`] over any catalog store.
pub struct Categories<'a, R> {
    repo: &'a R,
}

impl<'a, R> Categories<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }
}

impl<R> CategoryService for Categories<'_, R>
where
    R: CategoryReader + CategoryWriter + ProductWriter,
{
    fn find_all(&self) -> ServiceResult<Vec<Category>> {
        self.repo
            .list_categories()
            .map_err(repository_error("list categories"))
    }

    fn find_by_id(&self, id: CategoryId) -> ServiceResult<Option<Category>> {
        self.repo
            .get_category_by_id(id)
            .map_err(repository_error("get category"))
    }

    fn find_by_name(&self, name: &str) -> ServiceResult<Option<Category>> {
        self.repo
            .get_category_by_name(name)
            .map_err(repository_error("get category by name"))
    }

    fn save(&self, id: Option<CategoryId>, category: NewCategory) -> ServiceResult<Category> {
        let saved = match id {
            Some(id) => self.repo.save_category(id, &category),
            None => self.repo.create_category(&category),
        }
        .map_err(repository_error("save category"))?;

        log::info!("Saved category {} '{}'", saved.id, saved.name);
        Ok(saved)
    }

    fn delete(&self, id: CategoryId) -> ServiceResult<bool> {
        let affected = self
            .repo
            .delete_category(id)
            .map_err(repository_error("delete category"))?;

        if affected > 0 {
            log::info!("Deleted category {id}");
        }
        Ok(affected > 0)
    }

    fn search_by_name(&self, fragment: &str) -> ServiceResult<Vec<Category>> {
        self.repo
            .search_categories(fragment)
            .map_err(repository_error("search categories"))
    }

    fn categories_with_products(&self) -> ServiceResult<Vec<Category>> {
        self.repo
            .list_categories_with_products()
            .map_err(repository_error("list categories with products"))
    }

    fn product_counts_by_category(&self) -> ServiceResult<HashMap<CategoryId, usize>> {
        self.repo
            .count_products_by_category()
            .map_err(repository_error("count products by category"))
    }

    fn exists(&self, name: &str) -> ServiceResult<bool> {
        self.repo
            .category_name_exists(name)
            .map_err(repository_error("check category name"))
    }

    fn add_product(
        &self,
        category_id: CategoryId,
        product_id: ProductId,
    ) -> ServiceResult<Option<Product>> {
        self.repo
            .assign_product_category(product_id, category_id)
            .map_err(repository_error("add product to category"))
    }

    fn remove_product(
        &self,
        category_id: CategoryId,
        product_id: ProductId,
    ) -> ServiceResult<Option<Product>> {
        self.repo
            .unassign_product_category(product_id, category_id)
            .map_err(repository_error("remove product from category"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::NewProduct;
    use crate::domain::types::{CategoryName, ProductName, ProductPrice, StockQuantity};
    use crate::repository::{InMemoryRepository, ProductListQuery, ProductReader};
    use crate::services::ServiceError;

    fn new_category(name: &str) -> NewCategory {
        NewCategory::new(CategoryName::new(name).unwrap(), None)
    }

    fn new_product(name: &str, cents: i64, category_id: Option<CategoryId>) -> NewProduct {
        NewProduct {
            name: ProductName::new(name).unwrap(),
            description: None,
            price: ProductPrice::from_cents(cents),
            stock_quantity: StockQuantity::new(10).unwrap(),
            category_id,
        }
    }

    /// Electronics {Smartphone, Laptop}, Clothing {T-Shirt}, Books {}.
    fn sample_catalog(repo: &InMemoryRepository) -> (Category, Category, Category) {
        let service = Categories::new(repo);
        let electronics = service.save(None, new_category("Electronics")).unwrap();
        let clothing = service.save(None, new_category("Clothing")).unwrap();
        let books = service.save(None, new_category("Books")).unwrap();

        repo.create_product(&new_product("Smartphone", 69_999, Some(electronics.id)))
            .unwrap();
        repo.create_product(&new_product("Laptop", 129_999, Some(electronics.id)))
            .unwrap();
        repo.create_product(&new_product("T-Shirt", 1_999, Some(clothing.id)))
            .unwrap();

        (electronics, clothing, books)
    }

    #[test]
    fn save_assigns_id_and_timestamps() {
        let repo = InMemoryRepository::new();
        let service = Categories::new(&repo);

        let saved = service
            .save(None, new_category("Electronics"))
            .expect("should save category");

        assert_eq!(saved.name, "Electronics");
        assert_eq!(saved.created_at, saved.updated_at);
        assert_eq!(service.find_by_id(saved.id).unwrap(), Some(saved));
    }

    #[test]
    fn save_with_id_replaces_and_keeps_creation_time() {
        let repo = InMemoryRepository::new();
        let service = Categories::new(&repo);
        let original = service.save(None, new_category("Electronics")).unwrap();

        let replaced = service
            .save(Some(original.id), new_category("Gadgets"))
            .unwrap();

        assert_eq!(replaced.id, original.id);
        assert_eq!(replaced.name, "Gadgets");
        assert_eq!(replaced.created_at, original.created_at);
        assert!(replaced.updated_at >= original.updated_at);
        assert_eq!(service.find_all().unwrap().len(), 1);
    }

    #[test]
    fn exists_ignores_case() {
        let repo = InMemoryRepository::new();
        let service = Categories::new(&repo);
        service.save(None, new_category("Books")).unwrap();

        assert!(service.exists("Books").unwrap());
        assert!(service.exists("books").unwrap());
        assert!(service.exists("BOOKS").unwrap());
        assert!(!service.exists("Furniture").unwrap());
    }

    #[test]
    fn find_by_name_ignores_case() {
        let repo = InMemoryRepository::new();
        let service = Categories::new(&repo);
        let books = service.save(None, new_category("Books")).unwrap();

        assert_eq!(service.find_by_name("bOoKs").unwrap(), Some(books));
        assert_eq!(service.find_by_name("Book").unwrap(), None);
    }

    #[test]
    fn search_matches_substrings_ignoring_case() {
        let repo = InMemoryRepository::new();
        let (electronics, clothing, books) = sample_catalog(&repo);
        let service = Categories::new(&repo);

        let found = service.search_by_name("TRON").unwrap();
        assert_eq!(found, vec![electronics.clone()]);
        assert!(service.search_by_name("furniture").unwrap().is_empty());
        assert_eq!(
            service.search_by_name("").unwrap(),
            vec![electronics, clothing, books]
        );
    }

    #[test]
    fn aggregates_sample_catalog() {
        let repo = InMemoryRepository::new();
        let (electronics, clothing, books) = sample_catalog(&repo);
        let service = Categories::new(&repo);

        let with_products = service.categories_with_products().unwrap();
        assert_eq!(with_products, vec![electronics.clone(), clothing.clone()]);

        let counts = service.product_counts_by_category().unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&electronics.id], 2);
        assert_eq!(counts[&clothing.id], 1);
        assert_eq!(counts[&books.id], 0);

        for (id, count) in counts {
            let listed = repo
                .list_products(ProductListQuery::default().category(id))
                .unwrap();
            assert_eq!(listed.len(), count);
        }
    }

    #[test]
    fn delete_of_referenced_category_fails() {
        let repo = InMemoryRepository::new();
        let (electronics, _, _) = sample_catalog(&repo);
        let service = Categories::new(&repo);

        let err = service.delete(electronics.id).unwrap_err();

        assert!(matches!(err, ServiceError::Integrity(_)));
        assert!(service.find_by_id(electronics.id).unwrap().is_some());
    }

    #[test]
    fn delete_reports_absence() {
        let repo = InMemoryRepository::new();
        let (_, _, books) = sample_catalog(&repo);
        let service = Categories::new(&repo);

        assert!(service.delete(books.id).unwrap());
        assert!(!service.delete(books.id).unwrap());
        assert_eq!(service.find_by_id(books.id).unwrap(), None);
    }

    #[test]
    fn add_and_remove_product_keep_both_sides_consistent() {
        let repo = InMemoryRepository::new();
        let (electronics, _, books) = sample_catalog(&repo);
        let service = Categories::new(&repo);
        let smartphone = repo
            .list_products(ProductListQuery::default().search("smartphone"))
            .unwrap()
            .remove(0);

        let moved = service
            .add_product(books.id, smartphone.id)
            .unwrap()
            .expect("product should exist");
        assert!(moved.belongs_to(books.id));
        let in_books = repo
            .list_products(ProductListQuery::default().category(books.id))
            .unwrap();
        assert_eq!(in_books, vec![moved.clone()]);
        assert_eq!(service.product_counts_by_category().unwrap()[&electronics.id], 1);

        let removed = service
            .remove_product(books.id, smartphone.id)
            .unwrap()
            .expect("product should exist");
        assert_eq!(removed.category_id, None);
        assert!(
            repo.list_products(ProductListQuery::default().category(books.id))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn add_product_to_missing_category_is_absent() {
        let repo = InMemoryRepository::new();
        sample_catalog(&repo);
        let service = Categories::new(&repo);

        let result = service
            .add_product(CategoryId::new(99).unwrap(), ProductId::new(1).unwrap())
            .unwrap();

        assert_eq!(result, None);
        let product = repo.get_product_by_id(ProductId::new(1).unwrap()).unwrap();
        assert!(product.unwrap().category_id.is_some());
    }
}
