use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDateTime, Utc};

use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{CategoryId, ProductId, StockQuantity};
use crate::repository::{
    CategoryReader, CategoryWriter, ProductListQuery, ProductReader, ProductWriter,
    RepositoryError, RepositoryResult,
};

const FOREIGN_KEY_FAILED: &str = "FOREIGN KEY constraint failed";

/// In-process catalog store.
///
/// Category membership is tracked in an adjacency index (category id to the
/// set of product ids referencing it) that every mutation updates under the
/// same lock as the records themselves.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    members: HashMap<CategoryId, BTreeSet<ProductId>>,
    last_category_id: i32,
    last_product_id: i32,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> RepositoryResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| RepositoryError::LockPoisoned)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl State {
    fn next_category_id(&mut self) -> RepositoryResult<CategoryId> {
        let next = self
            .last_category_id
            .checked_add(1)
            .ok_or(RepositoryError::SequenceExhausted("category id"))?;
        let id = CategoryId::new(next)?;
        self.last_category_id = next;
        Ok(id)
    }

    fn next_product_id(&mut self) -> RepositoryResult<ProductId> {
        let next = self
            .last_product_id
            .checked_add(1)
            .ok_or(RepositoryError::SequenceExhausted("product id"))?;
        let id = ProductId::new(next)?;
        self.last_product_id = next;
        Ok(id)
    }

    /// Mirrors the case-sensitive `UNIQUE` constraint on category names.
    fn check_unique_name(&self, id: Option<CategoryId>, name: &str) -> RepositoryResult<()> {
        let taken = self
            .categories
            .values()
            .any(|c| Some(c.id) != id && c.name.as_str() == name);
        if taken {
            return Err(RepositoryError::UniqueViolation(format!(
                "category name '{name}' already exists"
            )));
        }
        Ok(())
    }

    fn check_category_reference(&self, category_id: Option<CategoryId>) -> RepositoryResult<()> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(
                RepositoryError::ReferentialIntegrity(FOREIGN_KEY_FAILED.to_string()),
            ),
            _ => Ok(()),
        }
    }

    fn link(&mut self, product_id: ProductId, category_id: Option<CategoryId>) {
        if let Some(category_id) = category_id {
            self.members
                .entry(category_id)
                .or_default()
                .insert(product_id);
        }
    }

    fn unlink(&mut self, product_id: ProductId, category_id: Option<CategoryId>) {
        let Some(category_id) = category_id else {
            return;
        };
        if let Some(members) = self.members.get_mut(&category_id) {
            members.remove(&product_id);
            if members.is_empty() {
                self.members.remove(&category_id);
            }
        }
    }

    /// Point a stored product at `category_id`, keeping the index in sync.
    fn set_category(
        &mut self,
        product_id: ProductId,
        category_id: Option<CategoryId>,
    ) -> Option<Product> {
        let previous = self.products.get(&product_id)?.category_id;
        self.unlink(product_id, previous);
        self.link(product_id, category_id);

        let product = self.products.get_mut(&product_id)?;
        product.category_id = category_id;
        product.updated_at = now();
        Some(product.clone())
    }

    fn product_count(&self, category_id: CategoryId) -> usize {
        self.members.get(&category_id).map_or(0, BTreeSet::len)
    }
}

impl CategoryReader for InMemoryRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.state()?.categories.values().cloned().collect())
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self.state()?.categories.get(&id).cloned())
    }

    fn get_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>> {
        Ok(self
            .state()?
            .categories
            .values()
            .find(|c| c.name.eq_ignore_case(name))
            .cloned())
    }

    fn search_categories(&self, fragment: &str) -> RepositoryResult<Vec<Category>> {
        Ok(self
            .state()?
            .categories
            .values()
            .filter(|c| c.name.contains_ignore_case(fragment))
            .cloned()
            .collect())
    }

    fn category_name_exists(&self, name: &str) -> RepositoryResult<bool> {
        Ok(self
            .state()?
            .categories
            .values()
            .any(|c| c.name.eq_ignore_case(name)))
    }

    fn list_categories_with_products(&self) -> RepositoryResult<Vec<Category>> {
        let state = self.state()?;
        Ok(state
            .categories
            .values()
            .filter(|c| state.product_count(c.id) > 0)
            .cloned()
            .collect())
    }

    fn count_products_by_category(&self) -> RepositoryResult<HashMap<CategoryId, usize>> {
        let state = self.state()?;
        Ok(state
            .categories
            .keys()
            .map(|id| (*id, state.product_count(*id)))
            .collect())
    }
}

impl CategoryWriter for InMemoryRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let mut state = self.state()?;
        state.check_unique_name(None, category.name.as_str())?;

        let id = state.next_category_id()?;
        let timestamp = now();
        let created = Category {
            id,
            name: category.name.clone(),
            description: category.description.clone(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        state.categories.insert(id, created.clone());
        Ok(created)
    }

    fn save_category(&self, id: CategoryId, category: &NewCategory) -> RepositoryResult<Category> {
        let mut state = self.state()?;
        state.check_unique_name(Some(id), category.name.as_str())?;

        let timestamp = now();
        let created_at = state
            .categories
            .get(&id)
            .map_or(timestamp, |existing| existing.created_at);
        let saved = Category {
            id,
            name: category.name.clone(),
            description: category.description.clone(),
            created_at,
            updated_at: timestamp,
        };
        state.categories.insert(id, saved.clone());
        state.last_category_id = state.last_category_id.max(id.get());
        Ok(saved)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        let mut state = self.state()?;
        if !state.categories.contains_key(&id) {
            return Ok(0);
        }
        if state.product_count(id) > 0 {
            return Err(RepositoryError::ReferentialIntegrity(
                FOREIGN_KEY_FAILED.to_string(),
            ));
        }
        state.categories.remove(&id);
        Ok(1)
    }
}

impl ProductReader for InMemoryRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>> {
        let state = self.state()?;
        let items = match query.category_id {
            Some(category_id) => state
                .members
                .get(&category_id)
                .into_iter()
                .flatten()
                .filter_map(|id| state.products.get(id))
                .filter(|p| query.matches(p))
                .cloned()
                .collect(),
            None => state
                .products
                .values()
                .filter(|p| query.matches(p))
                .cloned()
                .collect(),
        };
        Ok(items)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self.state()?.products.get(&id).cloned())
    }
}

impl ProductWriter for InMemoryRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let mut state = self.state()?;
        state.check_category_reference(product.category_id)?;

        let id = state.next_product_id()?;
        let timestamp = now();
        let created = Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            category_id: product.category_id,
            created_at: timestamp,
            updated_at: timestamp,
        };
        state.products.insert(id, created.clone());
        state.link(id, created.category_id);
        Ok(created)
    }

    fn save_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<Product> {
        let mut state = self.state()?;
        state.check_category_reference(product.category_id)?;

        let timestamp = now();
        let (created_at, previous_category) = state
            .products
            .get(&id)
            .map_or((timestamp, None), |existing| {
                (existing.created_at, existing.category_id)
            });
        let saved = Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            category_id: product.category_id,
            created_at,
            updated_at: timestamp,
        };
        state.unlink(id, previous_category);
        state.link(id, saved.category_id);
        state.products.insert(id, saved.clone());
        state.last_product_id = state.last_product_id.max(id.get());
        Ok(saved)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        let mut state = self.state()?;
        match state.products.remove(&id) {
            Some(removed) => {
                state.unlink(id, removed.category_id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn update_product_stock(
        &self,
        id: ProductId,
        quantity: StockQuantity,
    ) -> RepositoryResult<Option<Product>> {
        let mut state = self.state()?;
        Ok(state.products.get_mut(&id).map(|product| {
            product.stock_quantity = quantity;
            product.updated_at = now();
            product.clone()
        }))
    }

    fn assign_product_category(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> RepositoryResult<Option<Product>> {
        let mut state = self.state()?;
        if !state.categories.contains_key(&category_id) {
            return Ok(None);
        }
        Ok(state.set_category(product_id, Some(category_id)))
    }

    fn unassign_product_category(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> RepositoryResult<Option<Product>> {
        let mut state = self.state()?;
        let Some(product) = state.products.get(&product_id) else {
            return Ok(None);
        };
        if !product.belongs_to(category_id) {
            return Ok(Some(product.clone()));
        }
        Ok(state.set_category(product_id, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CategoryName, ProductName, ProductPrice};

    fn category(name: &str) -> NewCategory {
        NewCategory::new(CategoryName::new(name).unwrap(), None)
    }

    fn product(name: &str, category_id: Option<CategoryId>) -> NewProduct {
        NewProduct {
            name: ProductName::new(name).unwrap(),
            description: None,
            price: ProductPrice::from_cents(1_000),
            stock_quantity: StockQuantity::new(5).unwrap(),
            category_id,
        }
    }

    fn members(repo: &InMemoryRepository, id: CategoryId) -> Vec<ProductId> {
        repo.list_products(ProductListQuery::default().category(id))
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect()
    }

    #[test]
    fn assigns_sequential_ids() {
        let repo = InMemoryRepository::new();
        let first = repo.create_category(&category("Books")).unwrap();
        let second = repo.create_category(&category("Music")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[test]
    fn membership_index_follows_reassignment() {
        let repo = InMemoryRepository::new();
        let books = repo.create_category(&category("Books")).unwrap();
        let music = repo.create_category(&category("Music")).unwrap();
        let novel = repo.create_product(&product("Novel", Some(books.id))).unwrap();

        assert_eq!(members(&repo, books.id), vec![novel.id]);

        let moved = repo
            .assign_product_category(novel.id, music.id)
            .unwrap()
            .unwrap();
        assert!(moved.belongs_to(music.id));
        assert!(members(&repo, books.id).is_empty());
        assert_eq!(members(&repo, music.id), vec![novel.id]);

        repo.save_product(novel.id, &product("Novel", None)).unwrap();
        assert!(members(&repo, music.id).is_empty());
    }

    #[test]
    fn unassign_ignores_other_categories() {
        let repo = InMemoryRepository::new();
        let books = repo.create_category(&category("Books")).unwrap();
        let music = repo.create_category(&category("Music")).unwrap();
        let novel = repo.create_product(&product("Novel", Some(books.id))).unwrap();

        let unchanged = repo
            .unassign_product_category(novel.id, music.id)
            .unwrap()
            .unwrap();
        assert!(unchanged.belongs_to(books.id));
        assert_eq!(members(&repo, books.id), vec![novel.id]);
    }

    #[test]
    fn assign_to_missing_category_is_absent() {
        let repo = InMemoryRepository::new();
        let books = repo.create_category(&category("Books")).unwrap();
        let novel = repo.create_product(&product("Novel", Some(books.id))).unwrap();

        let result = repo
            .assign_product_category(novel.id, CategoryId::new(42).unwrap())
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(members(&repo, books.id), vec![novel.id]);
    }

    #[test]
    fn rejects_dangling_category_reference() {
        let repo = InMemoryRepository::new();
        let missing = CategoryId::new(42).unwrap();
        let err = repo.create_product(&product("Novel", Some(missing))).unwrap_err();
        assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
    }

    #[test]
    fn rejects_exact_duplicate_names_only() {
        let repo = InMemoryRepository::new();
        repo.create_category(&category("Books")).unwrap();
        let err = repo.create_category(&category("Books")).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation(_)));
        assert!(repo.create_category(&category("books")).is_ok());
    }

    #[test]
    fn save_with_explicit_id_advances_sequence() {
        let repo = InMemoryRepository::new();
        repo.save_category(CategoryId::new(7).unwrap(), &category("Books"))
            .unwrap();
        let next = repo.create_category(&category("Music")).unwrap();
        assert_eq!(next.id, 8);
    }

    #[test]
    fn exhausted_sequence_is_an_error() {
        let repo = InMemoryRepository::new();
        repo.save_category(CategoryId::new(i32::MAX).unwrap(), &category("Books"))
            .unwrap();
        let err = repo.create_category(&category("Music")).unwrap_err();
        assert!(matches!(err, RepositoryError::SequenceExhausted(_)));

        repo.save_product(ProductId::new(i32::MAX).unwrap(), &product("Novel", None))
            .unwrap();
        let err = repo.create_product(&product("Atlas", None)).unwrap_err();
        assert!(matches!(err, RepositoryError::SequenceExhausted(_)));
        assert_eq!(repo.list_categories().unwrap().len(), 1);
    }
}
