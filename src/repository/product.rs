use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{CategoryId, ProductId, ProductPrice, StockQuantity};
use crate::models::product::{NewProduct as DbNewProduct, Product as DbProduct, ProductRecord};
use crate::repository::{
    DieselRepository, LIKE_ESCAPE, ProductListQuery, ProductReader, ProductWriter,
    RepositoryError, RepositoryResult, like_pattern,
};

impl ProductReader for DieselRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut items = products::table
            .select(DbProduct::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(search) = &query.search {
            items = items.filter(
                products::name_folded
                    .like(like_pattern(search))
                    .escape(LIKE_ESCAPE),
            );
        }

        if let Some(category_id) = query.category_id {
            items = items.filter(products::category_id.eq(Some(category_id.get())));
        }

        if let Some(min_price) = query.min_price {
            items = items.filter(products::price_cents.ge(ProductPrice::lower_bound_cents(min_price)));
        }

        if let Some(max_price) = query.max_price {
            items = items.filter(products::price_cents.le(ProductPrice::upper_bound_cents(max_price)));
        }

        if let Some(threshold) = query.stock_below {
            items = items.filter(products::stock_quantity.lt(threshold));
        }

        if let Some(minimum) = query.stock_above {
            items = items.filter(products::stock_quantity.gt(minimum));
        }

        let items = items
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .find(id.get())
            .select(DbProduct::as_select())
            .first::<DbProduct>(&mut conn)
            .optional()?;

        let product = product.map(TryInto::try_into).transpose()?;
        Ok(product)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_product = DbNewProduct::from_domain(product, Utc::now().naive_utc());

        let created = conn.transaction(|conn| {
            diesel::insert_into(products::table)
                .values(&db_product)
                .returning(DbProduct::as_returning())
                .get_result::<DbProduct>(conn)
        })?;

        Ok(created.try_into()?)
    }

    fn save_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let record = ProductRecord::from_domain(id, product, now);

        // `created_at` of an existing row is left untouched.
        let saved = conn.transaction(|conn| {
            diesel::insert_into(products::table)
                .values(&record)
                .on_conflict(products::id)
                .do_update()
                .set((
                    products::name.eq(&record.name),
                    products::name_folded.eq(&record.name_folded),
                    products::description.eq(&record.description),
                    products::price_cents.eq(record.price_cents),
                    products::stock_quantity.eq(record.stock_quantity),
                    products::category_id.eq(record.category_id),
                    products::updated_at.eq(now),
                ))
                .returning(DbProduct::as_returning())
                .get_result::<DbProduct>(conn)
        })?;

        Ok(saved.try_into()?)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            diesel::delete(products::table.filter(products::id.eq(id.get()))).execute(conn)
        })?;

        Ok(affected)
    }

    fn update_product_stock(
        &self,
        id: ProductId,
        quantity: StockQuantity,
    ) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = conn.immediate_transaction(|conn| {
            diesel::update(products::table.find(id.get()))
                .set((
                    products::stock_quantity.eq(quantity.get()),
                    products::updated_at.eq(now),
                ))
                .returning(DbProduct::as_returning())
                .get_result::<DbProduct>(conn)
                .optional()
        })?;

        let updated = updated.map(TryInto::try_into).transpose()?;
        Ok(updated)
    }

    fn assign_product_category(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> RepositoryResult<Option<Product>> {
        use crate::schema::{categories, products};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let category_exists = diesel::select(diesel::dsl::exists(
                categories::table.find(category_id.get()),
            ))
            .get_result::<bool>(conn)?;
            if !category_exists {
                return Ok(None);
            }

            let updated = diesel::update(products::table.find(product_id.get()))
                .set((
                    products::category_id.eq(Some(category_id.get())),
                    products::updated_at.eq(now),
                ))
                .returning(DbProduct::as_returning())
                .get_result::<DbProduct>(conn)
                .optional()?;

            Ok(updated)
        })?;

        let updated = updated.map(TryInto::try_into).transpose()?;
        Ok(updated)
    }

    fn unassign_product_category(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let product = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let Some(current) = products::table
                .find(product_id.get())
                .select(DbProduct::as_select())
                .first::<DbProduct>(conn)
                .optional()?
            else {
                return Ok(None);
            };

            if current.category_id != Some(category_id.get()) {
                return Ok(Some(current));
            }

            let updated = diesel::update(products::table.find(current.id))
                .set((
                    products::category_id.eq(None::<i32>),
                    products::updated_at.eq(now),
                ))
                .returning(DbProduct::as_returning())
                .get_result::<DbProduct>(conn)?;

            Ok(Some(updated))
        })?;

        let product = product.map(TryInto::try_into).transpose()?;
        Ok(product)
    }
}
