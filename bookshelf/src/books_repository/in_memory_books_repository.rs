use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::{Book, BookDetails, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

pub struct InMemoryBookRepository {
    book_sequence_generator: AtomicI32,
    books: parking_lot::RwLock<HashMap<BookId, BookDetails>>,
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self {
            book_sequence_generator: AtomicI32::new(1),
            books: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn add_book(&self, details: BookDetails) -> Result<Book, BookRepositoryError> {
        // ids are handed out once and never recycled, even after delete
        let id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed);
        self.books.write().insert(id, details.clone());
        Ok(Book::new(id, details))
    }

    async fn update_book(
        &self,
        book_id: BookId,
        details: BookDetails,
    ) -> Result<Book, BookRepositoryError> {
        let mut locked_books = self.books.write();
        let book = locked_books
            .get_mut(&book_id)
            .ok_or(BookRepositoryError::NotFound(book_id))?;
        *book = details.clone();
        Ok(Book::new(book_id, details))
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        self.books
            .read()
            .get(&book_id)
            .cloned()
            .map(|details| Book::new(book_id, details))
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self
            .books
            .read()
            .iter()
            .map(|(&book_id, details)| Book::new(book_id, details.clone()))
            .collect())
    }

    async fn delete_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        self.books
            .write()
            .remove(&book_id)
            .map(|details| Book::new(book_id, details))
            .ok_or(BookRepositoryError::NotFound(book_id))
    }
}
