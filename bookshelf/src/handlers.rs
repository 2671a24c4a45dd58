use std::sync::Arc;

use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{BookDetails, BookId, ErrorResponse};
use crate::auth::BasicAuth;
use crate::books_repository::{BookRepository, BookRepositoryError};

/// Maps a repository failure to the response sent back to the caller
fn repository_error_response(operation: &str, err: BookRepositoryError) -> HttpResponse {
    match err {
        BookRepositoryError::NotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse::new(err.to_string()))
        }
        err => {
            tracing::error!("{} failed {}", operation, err);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Internal server error"))
        }
    }
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_books(
    books_repository: Data<Arc<dyn BookRepository + Send + Sync>>,
    auth: BasicAuth,
) -> Result<HttpResponse, Error> {
    tracing::debug!("Listing books for {}", auth.username);
    Ok(match books_repository.list_books().await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => repository_error_response("Get all books", err),
    })
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: Data<Arc<dyn BookRepository + Send + Sync>>,
    details: web::Json<BookDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.add_book(details.into_inner()).await {
            Ok(book) => HttpResponse::Ok().json(book),
            Err(err) => repository_error_response("Add book", err),
        },
    )
}

#[api_v2_operation]
pub async fn update_book(
    books_repository: Data<Arc<dyn BookRepository + Send + Sync>>,
    book_id: web::Path<BookId>,
    details: web::Json<BookDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository
            .update_book(book_id.into_inner(), details.into_inner())
            .await
        {
            Ok(book) => HttpResponse::Ok().json(book),
            Err(err) => repository_error_response("Update book", err),
        },
    )
}

#[api_v2_operation]
pub async fn get_book(
    books_repository: Data<Arc<dyn BookRepository + Send + Sync>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.get_book(book_id.into_inner()).await {
            Ok(book) => HttpResponse::Ok().json(book),
            Err(err) => repository_error_response("Get book", err),
        },
    )
}

#[api_v2_operation]
pub async fn delete_book(
    books_repository: Data<Arc<dyn BookRepository + Send + Sync>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.delete_book(book_id.into_inner()).await {
            Ok(book) => HttpResponse::Ok().json(book),
            Err(err) => repository_error_response("Delete book", err),
        },
    )
}
