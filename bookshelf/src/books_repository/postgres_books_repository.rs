use anyhow::Context;
use tokio_postgres::{Client, NoTls, Row};

use crate::api::{Book, BookDetails, BookId};
use crate::books_repository::BookRepositoryError::Other;
use crate::books_repository::{BookRepository, BookRepositoryError};

/// Postgres backed repository. Every operation runs in its own transaction,
/// which is rolled back when dropped without commit.
pub struct PostgresBooksRepository {
    client: tokio::sync::Mutex<Client>,
}

pub struct PostgresBooksRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresBooksRepository {
    pub async fn init(config: PostgresBooksRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!(
            "Postgres connection to {} as {}",
            config.hostname,
            config.username
        );
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS books (
            id              SERIAL PRIMARY KEY,
            title           TEXT NOT NULL,
            author          TEXT NOT NULL,
            pages           INTEGER NOT NULL,
            price           DOUBLE PRECISION NOT NULL
            )
        ",
            )
            .await
            .context("Failed to setup table")?;
        Ok(Self {
            client: tokio::sync::Mutex::new(client),
        })
    }
}

fn book_from_row(row: &Row) -> Result<Book, BookRepositoryError> {
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        pages: row.try_get("pages")?,
        price: row.try_get("price")?,
    })
}

#[async_trait::async_trait]
impl BookRepository for PostgresBooksRepository {
    async fn add_book(&self, details: BookDetails) -> Result<Book, BookRepositoryError> {
        let mut client = self.client.lock().await;
        let transaction = client.transaction().await?;

        let rows = transaction
            .query(
                "INSERT INTO books (title, author, pages, price) VALUES ($1, $2, $3, $4) \
                 RETURNING id, title, author, pages, price",
                &[
                    &details.title,
                    &details.author,
                    &details.pages,
                    &details.price,
                ],
            )
            .await?;

        let book = book_from_row(
            rows.first()
                .ok_or_else(|| Other("Id not returned".to_string()))?,
        )?;

        transaction.commit().await?;
        Ok(book)
    }

    async fn update_book(
        &self,
        book_id: BookId,
        details: BookDetails,
    ) -> Result<Book, BookRepositoryError> {
        let mut client = self.client.lock().await;
        let transaction = client.transaction().await?;

        let rows = transaction
            .query(
                "UPDATE books SET title = $1, author = $2, pages = $3, price = $4 WHERE id = $5 \
                 RETURNING id, title, author, pages, price",
                &[
                    &details.title,
                    &details.author,
                    &details.pages,
                    &details.price,
                    &book_id,
                ],
            )
            .await?;

        let book = book_from_row(
            rows.first()
                .ok_or(BookRepositoryError::NotFound(book_id))?,
        )?;

        transaction.commit().await?;
        Ok(book)
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        let mut client = self.client.lock().await;
        let transaction = client.transaction().await?;

        let rows = transaction
            .query(
                "SELECT id, title, author, pages, price FROM books WHERE id = $1",
                &[&book_id],
            )
            .await?;

        let book = book_from_row(
            rows.first()
                .ok_or(BookRepositoryError::NotFound(book_id))?,
        )?;

        transaction.commit().await?;
        Ok(book)
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let mut client = self.client.lock().await;
        let transaction = client.transaction().await?;

        let rows = transaction
            .query(
                "SELECT id, title, author, pages, price FROM books ORDER BY id",
                &[],
            )
            .await?;

        let books = rows.iter().map(book_from_row).collect::<Result<_, _>>()?;

        transaction.commit().await?;
        Ok(books)
    }

    async fn delete_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        let mut client = self.client.lock().await;
        let transaction = client.transaction().await?;

        let rows = transaction
            .query(
                "DELETE FROM books WHERE id = $1 RETURNING id, title, author, pages, price",
                &[&book_id],
            )
            .await?;

        let book = book_from_row(
            rows.first()
                .ok_or(BookRepositoryError::NotFound(book_id))?,
        )?;

        transaction.commit().await?;
        Ok(book)
    }
}
