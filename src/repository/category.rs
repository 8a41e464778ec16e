use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{CategoryId, TypeConstraintError, fold_case};
use crate::models::category::{
    Category as DbCategory, CategoryRecord, NewCategory as DbNewCategory,
};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, LIKE_ESCAPE, RepositoryResult, like_pattern,
};

impl CategoryReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let items = categories::table
            .select(DbCategory::as_select())
            .order(categories::id.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .find(id.get())
            .select(DbCategory::as_select())
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }

    fn get_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::name_folded.eq(fold_case(name)))
            .select(DbCategory::as_select())
            .order(categories::id.asc())
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }

    fn search_categories(&self, fragment: &str) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let items = categories::table
            .filter(
                categories::name_folded
                    .like(like_pattern(fragment))
                    .escape(LIKE_ESCAPE),
            )
            .select(DbCategory::as_select())
            .order(categories::id.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn category_name_exists(&self, name: &str) -> RepositoryResult<bool> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let exists = diesel::select(diesel::dsl::exists(
            categories::table.filter(categories::name_folded.eq(fold_case(name))),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(exists)
    }

    fn list_categories_with_products(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::{categories, products};

        let mut conn = self.conn()?;

        let items = categories::table
            .inner_join(products::table)
            .select(DbCategory::as_select())
            .distinct()
            .order(categories::id.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn count_products_by_category(&self) -> RepositoryResult<HashMap<CategoryId, usize>> {
        use crate::schema::{categories, products};

        let mut conn = self.conn()?;

        let rows = categories::table
            .left_join(products::table)
            .group_by(categories::id)
            .select((categories::id, diesel::dsl::count(products::id.nullable())))
            .load::<(i32, i64)>(&mut conn)?;

        let counts = rows
            .into_iter()
            .map(|(id, count)| Ok((CategoryId::new(id)?, count as usize)))
            .collect::<Result<HashMap<_, _>, TypeConstraintError>>()?;

        Ok(counts)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let db_category = DbNewCategory::from_domain(category, Utc::now().naive_utc());

        let created = conn.transaction(|conn| {
            diesel::insert_into(categories::table)
                .values(&db_category)
                .returning(DbCategory::as_returning())
                .get_result::<DbCategory>(conn)
        })?;

        Ok(created.try_into()?)
    }

    fn save_category(&self, id: CategoryId, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let record = CategoryRecord::from_domain(id, category, now);

        // `created_at` of an existing row is left untouched.
        let saved = conn.transaction(|conn| {
            diesel::insert_into(categories::table)
                .values(&record)
                .on_conflict(categories::id)
                .do_update()
                .set((
                    categories::name.eq(&record.name),
                    categories::name_folded.eq(&record.name_folded),
                    categories::description.eq(&record.description),
                    categories::updated_at.eq(now),
                ))
                .returning(DbCategory::as_returning())
                .get_result::<DbCategory>(conn)
        })?;

        Ok(saved.try_into()?)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            diesel::delete(categories::table.filter(categories::id.eq(id.get()))).execute(conn)
        })?;

        Ok(affected)
    }
}
