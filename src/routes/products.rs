use actix_web::{HttpResponse, Responder, delete, get, patch, post, put, web};

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{CategoryId, ProductId, StockQuantity};
use crate::dto::products::ProductDto;
use crate::forms::SearchQuery;
use crate::forms::products::{
    InStockQuery, LowStockQuery, PriceFilter, PriceFilterQuery, ProductForm, StockUpdateQuery,
};
use crate::repository::DieselRepository;
use crate::services::{ProductService, Products, ServiceError, ServiceResult};

use super::{error_response, not_found};

const PRODUCT_NOT_FOUND: &str = "Product not found";

fn product_list(result: ServiceResult<Vec<Product>>) -> HttpResponse {
    match result {
        Ok(products) => HttpResponse::Ok().json(
            products
                .into_iter()
                .map(ProductDto::from)
                .collect::<Vec<_>>(),
        ),
        Err(err) => error_response(err),
    }
}

#[get("")]
pub async fn list_products(repo: web::Data<DieselRepository>) -> impl Responder {
    product_list(Products::new(repo.get_ref()).find_all())
}

#[get("/search")]
pub async fn search_products(
    params: web::Query<SearchQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    product_list(Products::new(repo.get_ref()).search_by_name(&params.name))
}

#[get("/category/{category_id}")]
pub async fn products_by_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    // No category has a non-positive id, so nothing references one.
    let Ok(category_id) = CategoryId::new(category_id.into_inner()) else {
        return product_list(Ok(Vec::new()));
    };

    product_list(Products::new(repo.get_ref()).find_by_category(category_id))
}

#[get("/filter")]
pub async fn filter_products(
    params: web::Query<PriceFilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let service = Products::new(repo.get_ref());

    let result = match PriceFilter::from(params.into_inner()) {
        PriceFilter::MaxPrice(max_price) => service.find_by_max_price(max_price),
        PriceFilter::NameAndRange {
            name,
            min_price,
            max_price,
        } => service.find_by_name_and_price_range(&name, min_price, max_price),
    };

    product_list(result)
}

#[get("/low-stock")]
pub async fn low_stock_products(
    params: web::Query<LowStockQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    product_list(Products::new(repo.get_ref()).find_low_stock(params.threshold))
}

#[get("/in-stock")]
pub async fn in_stock_products(
    params: web::Query<InStockQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    product_list(Products::new(repo.get_ref()).find_in_stock(params.min))
}

#[get("/{product_id}")]
pub async fn get_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(product_id) = ProductId::new(product_id.into_inner()) else {
        return not_found(PRODUCT_NOT_FOUND);
    };

    match Products::new(repo.get_ref()).find_by_id(product_id) {
        Ok(Some(product)) => HttpResponse::Ok().json(ProductDto::from(product)),
        Ok(None) => not_found(PRODUCT_NOT_FOUND),
        Err(err) => error_response(err),
    }
}

#[post("")]
pub async fn create_product(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ProductForm>,
) -> impl Responder {
    let product: NewProduct = match form.try_into() {
        Ok(product) => product,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    match Products::new(repo.get_ref()).save(None, product) {
        Ok(saved) => HttpResponse::Created().json(ProductDto::from(saved)),
        Err(err) => error_response(err),
    }
}

#[put("/{product_id}")]
pub async fn update_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ProductForm>,
) -> impl Responder {
    let Ok(product_id) = ProductId::new(product_id.into_inner()) else {
        return not_found(PRODUCT_NOT_FOUND);
    };
    let product: NewProduct = match form.try_into() {
        Ok(product) => product,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    let service = Products::new(repo.get_ref());
    match service.find_by_id(product_id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(PRODUCT_NOT_FOUND),
        Err(err) => return error_response(err),
    }

    match service.save(Some(product_id), product) {
        Ok(saved) => HttpResponse::Ok().json(ProductDto::from(saved)),
        Err(err) => error_response(err),
    }
}

#[delete("/{product_id}")]
pub async fn delete_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(product_id) = ProductId::new(product_id.into_inner()) else {
        return not_found(PRODUCT_NOT_FOUND);
    };

    match Products::new(repo.get_ref()).delete(product_id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(PRODUCT_NOT_FOUND),
        Err(err) => error_response(err),
    }
}

#[patch("/{product_id}/stock")]
pub async fn update_product_stock(
    product_id: web::Path<i32>,
    params: web::Query<StockUpdateQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(product_id) = ProductId::new(product_id.into_inner()) else {
        return not_found(PRODUCT_NOT_FOUND);
    };
    let quantity: StockQuantity = match params.into_inner().try_into() {
        Ok(quantity) => quantity,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    match Products::new(repo.get_ref()).update_stock(product_id, quantity) {
        Ok(Some(product)) => HttpResponse::Ok().json(ProductDto::from(product)),
        Ok(None) => not_found(PRODUCT_NOT_FOUND),
        Err(err) => error_response(err),
    }
}
