use std::collections::BTreeMap;

use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{CategoryId, ProductId};
use crate::dto::categories::CategoryDto;
use crate::dto::products::ProductDto;
use crate::forms::SearchQuery;
use crate::forms::categories::CategoryForm;
use crate::repository::DieselRepository;
use crate::services::{Categories, CategoryService, ServiceError};

use super::{error_response, not_found};

const CATEGORY_NOT_FOUND: &str = "Category not found";
const MEMBERSHIP_NOT_FOUND: &str = "Category or product not found";

fn category_list(categories: Vec<Category>) -> HttpResponse {
    HttpResponse::Ok().json(
        categories
            .into_iter()
            .map(CategoryDto::from)
            .collect::<Vec<_>>(),
    )
}

fn name_taken(name: &str) -> HttpResponse {
    error_response(ServiceError::Conflict(format!(
        "Category with name '{name}' already exists"
    )))
}

#[get("")]
pub async fn list_categories(repo: web::Data<DieselRepository>) -> impl Responder {
    match Categories::new(repo.get_ref()).find_all() {
        Ok(categories) => category_list(categories),
        Err(err) => error_response(err),
    }
}

#[get("/search")]
pub async fn search_categories(
    params: web::Query<SearchQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match Categories::new(repo.get_ref()).search_by_name(&params.name) {
        Ok(categories) => category_list(categories),
        Err(err) => error_response(err),
    }
}

#[get("/with-products")]
pub async fn categories_with_products(repo: web::Data<DieselRepository>) -> impl Responder {
    match Categories::new(repo.get_ref()).categories_with_products() {
        Ok(categories) => category_list(categories),
        Err(err) => error_response(err),
    }
}

#[get("/product-counts")]
pub async fn product_counts(repo: web::Data<DieselRepository>) -> impl Responder {
    match Categories::new(repo.get_ref()).product_counts_by_category() {
        Ok(counts) => HttpResponse::Ok().json(
            counts
                .into_iter()
                .map(|(id, count)| (id.get(), count))
                .collect::<BTreeMap<_, _>>(),
        ),
        Err(err) => error_response(err),
    }
}

#[get("/{category_id}")]
pub async fn get_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(category_id) = CategoryId::new(category_id.into_inner()) else {
        return not_found(CATEGORY_NOT_FOUND);
    };

    match Categories::new(repo.get_ref()).find_by_id(category_id) {
        Ok(Some(category)) => HttpResponse::Ok().json(CategoryDto::from(category)),
        Ok(None) => not_found(CATEGORY_NOT_FOUND),
        Err(err) => error_response(err),
    }
}

#[post("")]
pub async fn create_category(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CategoryForm>,
) -> impl Responder {
    let category: NewCategory = match form.try_into() {
        Ok(category) => category,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    let service = Categories::new(repo.get_ref());
    match service.exists(category.name.as_str()) {
        Ok(true) => return name_taken(category.name.as_str()),
        Ok(false) => {}
        Err(err) => return error_response(err),
    }

    match service.save(None, category) {
        Ok(saved) => HttpResponse::Created().json(CategoryDto::from(saved)),
        Err(err) => error_response(err),
    }
}

#[put("/{category_id}")]
pub async fn update_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CategoryForm>,
) -> impl Responder {
    let Ok(category_id) = CategoryId::new(category_id.into_inner()) else {
        return not_found(CATEGORY_NOT_FOUND);
    };
    let category: NewCategory = match form.try_into() {
        Ok(category) => category,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    let service = Categories::new(repo.get_ref());
    let existing = match service.find_by_id(category_id) {
        Ok(Some(existing)) => existing,
        Ok(None) => return not_found(CATEGORY_NOT_FOUND),
        Err(err) => return error_response(err),
    };

    // Changing only the letter case of the current name is not a collision.
    if !existing.name.eq_ignore_case(category.name.as_str()) {
        match service.exists(category.name.as_str()) {
            Ok(true) => return name_taken(category.name.as_str()),
            Ok(false) => {}
            Err(err) => return error_response(err),
        }
    }

    match service.save(Some(category_id), category) {
        Ok(saved) => HttpResponse::Ok().json(CategoryDto::from(saved)),
        Err(err) => error_response(err),
    }
}

#[delete("/{category_id}")]
pub async fn delete_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(category_id) = CategoryId::new(category_id.into_inner()) else {
        return not_found(CATEGORY_NOT_FOUND);
    };

    match Categories::new(repo.get_ref()).delete(category_id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(CATEGORY_NOT_FOUND),
        Err(err) => error_response(err),
    }
}

#[post("/{category_id}/products/{product_id}")]
pub async fn add_product(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (category_id, product_id) = path.into_inner();
    let (Ok(category_id), Ok(product_id)) =
        (CategoryId::new(category_id), ProductId::new(product_id))
    else {
        return not_found(MEMBERSHIP_NOT_FOUND);
    };

    match Categories::new(repo.get_ref()).add_product(category_id, product_id) {
        Ok(Some(product)) => HttpResponse::Ok().json(ProductDto::from(product)),
        Ok(None) => not_found(MEMBERSHIP_NOT_FOUND),
        Err(err) => error_response(err),
    }
}

#[delete("/{category_id}/products/{product_id}")]
pub async fn remove_product(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (category_id, product_id) = path.into_inner();
    let (Ok(category_id), Ok(product_id)) =
        (CategoryId::new(category_id), ProductId::new(product_id))
    else {
        return not_found(MEMBERSHIP_NOT_FOUND);
    };

    match Categories::new(repo.get_ref()).remove_product(category_id, product_id) {
        Ok(Some(product)) => HttpResponse::Ok().json(ProductDto::from(product)),
        Ok(None) => not_found(MEMBERSHIP_NOT_FOUND),
        Err(err) => error_response(err),
    }
}
