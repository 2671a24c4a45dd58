use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::api::{Book, BookDetails, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

const BOOK_COLUMNS: &str = "id, title, author, pages, price";

/// Repository persisted to a local SQLite file.
///
/// The connection is shared behind a mutex and used from the blocking pool.
/// Every operation runs inside a transaction that is committed on success and
/// rolled back when dropped on any error path.
pub struct SqliteBooksRepository {
    connection: Arc<parking_lot::Mutex<Connection>>,
}

pub struct SqliteBooksRepositoryConfig {
    /// Path of the database file, `:memory:` opens a private in-memory database
    pub path: PathBuf,
}

impl SqliteBooksRepository {
    pub fn init(config: SqliteBooksRepositoryConfig) -> anyhow::Result<Self> {
        tracing::info!("Sqlite database file: {}", config.path.display());
        let connection = Connection::open(&config.path)
            .with_context(|| format!("Failed to open {}", config.path.display()))?;

        // AUTOINCREMENT keeps ids of deleted books from being handed out again
        connection
            .execute_batch(
                "
        CREATE TABLE IF NOT EXISTS books (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            title           TEXT NOT NULL,
            author          TEXT NOT NULL,
            pages           INTEGER NOT NULL,
            price           REAL NOT NULL
            )
        ",
            )
            .context("Failed to setup table")?;

        Ok(Self {
            connection: Arc::new(parking_lot::Mutex::new(connection)),
        })
    }

    async fn in_transaction<T, F>(&self, operation: F) -> Result<T, BookRepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Transaction<'_>) -> Result<T, BookRepositoryError> + Send + 'static,
    {
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || -> Result<T, BookRepositoryError> {
            let mut connection = connection.lock();
            let transaction = connection.transaction()?;
            let result = operation(&transaction)?;
            transaction.commit()?;
            Ok(result)
        })
        .await
        .map_err(|err| BookRepositoryError::Other(format!("Sqlite worker failed: {}", err)))?
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        pages: row.get(3)?,
        price: row.get(4)?,
    })
}

#[async_trait::async_trait]
impl BookRepository for SqliteBooksRepository {
    async fn add_book(&self, details: BookDetails) -> Result<Book, BookRepositoryError> {
        self.in_transaction(move |transaction| {
            Ok(transaction.query_row(
                &format!(
                    "INSERT INTO books (title, author, pages, price) VALUES (?1, ?2, ?3, ?4) \
                     RETURNING {BOOK_COLUMNS}"
                ),
                params![details.title, details.author, details.pages, details.price],
                book_from_row,
            )?)
        })
        .await
    }

    async fn update_book(
        &self,
        book_id: BookId,
        details: BookDetails,
    ) -> Result<Book, BookRepositoryError> {
        self.in_transaction(move |transaction| {
            transaction
                .query_row(
                    &format!(
                        "UPDATE books SET title = ?1, author = ?2, pages = ?3, price = ?4 \
                         WHERE id = ?5 RETURNING {BOOK_COLUMNS}"
                    ),
                    params![
                        details.title,
                        details.author,
                        details.pages,
                        details.price,
                        book_id
                    ],
                    book_from_row,
                )
                .optional()?
                .ok_or(BookRepositoryError::NotFound(book_id))
        })
        .await
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        self.in_transaction(move |transaction| {
            transaction
                .query_row(
                    &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
                    params![book_id],
                    book_from_row,
                )
                .optional()?
                .ok_or(BookRepositoryError::NotFound(book_id))
        })
        .await
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        self.in_transaction(|transaction| {
            let mut statement =
                transaction.prepare(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))?;
            let books = statement
                .query_map([], book_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(books)
        })
        .await
    }

    async fn delete_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        self.in_transaction(move |transaction| {
            transaction
                .query_row(
                    &format!("DELETE FROM books WHERE id = ?1 RETURNING {BOOK_COLUMNS}"),
                    params![book_id],
                    book_from_row,
                )
                .optional()?
                .ok_or(BookRepositoryError::NotFound(book_id))
        })
        .await
    }
}

#[cfg(test)]
mod sqlite_book_repository_tests {
    use std::path::PathBuf;

    use crate::api::{Book, BookDetails};
    use crate::books_repository::{
        BookRepository, BookRepositoryError, SqliteBooksRepository, SqliteBooksRepositoryConfig,
    };

    fn in_memory_repo() -> SqliteBooksRepository {
        SqliteBooksRepository::init(SqliteBooksRepositoryConfig {
            path: PathBuf::from(":memory:"),
        })
        .expect("Failed to open sqlite")
    }

    fn dune() -> BookDetails {
        BookDetails {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            pages: 412,
            price: 9.99,
        }
    }

    #[tokio::test]
    async fn test_add_book_and_get_it() {
        let repo = in_memory_repo();

        assert!(matches!(
            repo.get_book(20000).await,
            Err(BookRepositoryError::NotFound(20000))
        ));

        let added = repo.add_book(dune()).await.expect("Failed to add book");
        assert_eq!(added, Book::new(1, dune()));

        let book = repo.get_book(added.id).await.expect("Failed to get book");
        assert_eq!(book, added);
    }

    #[tokio::test]
    async fn test_add_books_and_list_them() {
        let repo = in_memory_repo();
        assert!(repo.list_books().await.expect("Failed to list").is_empty());

        let book1 = repo.add_book(dune()).await.expect("Failed to add book");
        let book2 = repo
            .add_book(BookDetails {
                title: "Dune Messiah".to_string(),
                pages: 256,
                ..dune()
            })
            .await
            .expect("Failed to add book");

        let list = repo.list_books().await.expect("Failed to list books");
        assert_eq!(list, vec![book1, book2]);
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let repo = in_memory_repo();
        assert!(matches!(
            repo.update_book(3, dune()).await,
            Err(BookRepositoryError::NotFound(3))
        ));

        let added = repo.add_book(dune()).await.expect("Failed to add book");
        let new_edition = BookDetails {
            title: "Dune (new ed.)".to_string(),
            author: "Herbert".to_string(),
            pages: 420,
            price: 12.5,
        };

        let updated = repo
            .update_book(added.id, new_edition.clone())
            .await
            .expect("Failed to update");
        assert_eq!(updated, Book::new(added.id, new_edition));
        assert_eq!(repo.get_book(added.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_delete_does_not_recycle_ids() {
        let repo = in_memory_repo();
        let first = repo.add_book(dune()).await.expect("Failed to add book");
        let second = repo.add_book(dune()).await.expect("Failed to add book");

        let deleted = repo.delete_book(second.id).await.expect("Failed to delete");
        assert_eq!(deleted, second);
        assert!(matches!(
            repo.delete_book(second.id).await,
            Err(BookRepositoryError::NotFound(..))
        ));

        let third = repo.add_book(dune()).await.expect("Failed to add book");
        assert!(third.id > second.id);
        assert_eq!(repo.list_books().await.unwrap(), vec![first, third]);
    }
}
