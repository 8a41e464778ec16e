use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::{Category as DomainCategory, NewCategory as DomainNewCategory};
use crate::domain::types::{CategoryId, CategoryName, TypeConstraintError, fold_case};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Category`] letting the database assign the id.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub name: String,
    /// Lowercased `name` matched by case-insensitive lookups.
    pub name_folded: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full row with an explicit id, used for insert-or-replace.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct CategoryRecord {
    pub id: i32,
    pub name: String,
    pub name_folded: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewCategory {
    pub fn from_domain(category: &DomainNewCategory, now: NaiveDateTime) -> Self {
        Self {
            name: category.name.as_str().to_string(),
            name_folded: fold_case(category.name.as_str()),
            description: category.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl CategoryRecord {
    pub fn from_domain(id: CategoryId, category: &DomainNewCategory, now: NaiveDateTime) -> Self {
        Self {
            id: id.get(),
            name: category.name.as_str().to_string(),
            name_folded: fold_case(category.name.as_str()),
            description: category.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            name: CategoryName::new(category.name)?,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        })
    }
}
