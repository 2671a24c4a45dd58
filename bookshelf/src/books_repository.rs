pub use in_memory_books_repository::InMemoryBookRepository;
pub use postgres_books_repository::{PostgresBooksRepository, PostgresBooksRepositoryConfig};
pub use sqlite_books_repository::{SqliteBooksRepository, SqliteBooksRepositoryConfig};

use crate::api::{Book, BookDetails, BookId};

mod in_memory_books_repository;
mod postgres_books_repository;
mod sqlite_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("Book {0} not found")]
    NotFound(BookId),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Sqlite failure {0}")]
    SqliteFailure(#[from] rusqlite::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait BookRepository {
    /// Adds book to repository, returns the stored book with its newly assigned id
    async fn add_book(&self, details: BookDetails) -> Result<Book, BookRepositoryError>;
    /// Replaces all details of the book, the id is left untouched
    async fn update_book(
        &self,
        book_id: BookId,
        details: BookDetails,
    ) -> Result<Book, BookRepositoryError>;
    /// Retrieves the book from repository
    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError>;
    /// Lists all books in the repository
    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError>;
    /// Removes the book, returns its last state
    async fn delete_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError>;
}
