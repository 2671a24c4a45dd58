use actix_web::error::InternalError;
use actix_web::web::{JsonConfig, PathConfig};
use actix_web::HttpResponse;
use paperclip::actix::web;

use crate::api::ErrorResponse;
use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(web::resource("/Books").route(web::get().to(handlers::get_all_books)))
        .service(web::resource("/Book").route(web::post().to(handlers::add_book)))
        .service(
            web::resource("/Book/{book_id}")
                .route(web::get().to(handlers::get_book))
                .route(web::put().to(handlers::update_book))
                .route(web::delete().to(handlers::delete_book)),
        );
}

/// Request bodies that are not a JSON object with every book field are answered with 400
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

/// An id that is not an integer cannot name any book, so it is reported as not found
pub fn path_config() -> PathConfig {
    PathConfig::default().error_handler(|err, req| {
        let response = HttpResponse::NotFound().json(ErrorResponse::new(format!(
            "Book {} not found",
            req.match_info().query("book_id")
        )));
        InternalError::from_response(err, response).into()
    })
}
