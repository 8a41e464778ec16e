//! Actix-web handlers of the JSON API.

use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::dto::ErrorDto;
use crate::services::ServiceError;

pub mod categories;
pub mod products;

/// Register every API route together with extractor error handlers that
/// answer with an [`ErrorDto`] body.
///
/// Fixed paths such as `/search` are registered ahead of `/{id}` so that they
/// are never captured by the id pattern.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api/categories")
                .service(categories::list_categories)
                .service(categories::create_category)
                .service(categories::search_categories)
                .service(categories::categories_with_products)
                .service(categories::product_counts)
                .service(categories::get_category)
                .service(categories::update_category)
                .service(categories::delete_category)
                .service(categories::add_product)
                .service(categories::remove_product),
        )
        .service(
            web::scope("/api/products")
                .service(products::list_products)
                .service(products::create_product)
                .service(products::search_products)
                .service(products::products_by_category)
                .service(products::filter_products)
                .service(products::low_stock_products)
                .service(products::in_stock_products)
                .service(products::get_product)
                .service(products::update_product)
                .service(products::delete_product)
                .service(products::update_product_stock),
        );
}

/// Translate a service failure into a JSON error response.
pub fn error_response(err: ServiceError) -> HttpResponse {
    let status = match &err {
        ServiceError::Conflict(_) | ServiceError::Integrity(_) => StatusCode::CONFLICT,
        ServiceError::TypeConstraint(_) | ServiceError::Form(_) => StatusCode::BAD_REQUEST,
        ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    HttpResponse::build(status).json(ErrorDto::new(err.to_string()))
}

pub fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorDto::new(message))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorDto::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorDto::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

// Unparseable ids cannot name an existing record.
fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::NotFound().json(ErrorDto::new(err.to_string()));
    InternalError::from_response(err, response).into()
}
