use anyhow::{bail, Context};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{Book, BookDetails, BookId, ErrorResponse};

pub struct BookshelfClient {
    url: String,
    client: ClientWithMiddleware,
}

/// Reads the error message from a failed response, falling back to the status
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string())
}

impl BookshelfClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /Book endpoint
    /// Returns the created book with its assigned id
    pub async fn add_book(&self, book_details: &BookDetails) -> anyhow::Result<Book> {
        let response = self
            .client
            .post(format!("{}/Book", self.url))
            .json(book_details)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to add book {}", error_message(response).await)
        }
        Ok(response.json().await?)
    }

    /// Calls GET /Book/{book_id} endpoint
    /// Returns None if book was not in the repository
    pub async fn get_book(&self, book_id: BookId) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .get(format!("{}/Book/{}", self.url, book_id))
            .send()
            .await?;
        Self::optional_book(response, "get").await
    }

    /// Calls PUT /Book/{book_id} endpoint
    /// Returns the updated book, None if book was not in the repository
    pub async fn update_book(
        &self,
        book_id: BookId,
        book_details: &BookDetails,
    ) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .put(format!("{}/Book/{}", self.url, book_id))
            .json(book_details)
            .send()
            .await?;
        Self::optional_book(response, "update").await
    }

    /// Calls DELETE /Book/{book_id} endpoint
    /// Returns the last state of deleted book, None if book was not in the repository
    pub async fn delete_book(&self, book_id: BookId) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .delete(format!("{}/Book/{}", self.url, book_id))
            .send()
            .await?;
        Self::optional_book(response, "delete").await
    }

    /// Calls GET /Books endpoint with basic credentials
    pub async fn list_books(&self, username: &str, password: &str) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/Books", self.url))
            .basic_auth(username, Some(password))
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            bail!("Not authorized to list books: {}", error_message(response).await)
        } else if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list books {}", error_message(response).await)
        }
    }

    async fn optional_book(
        response: reqwest::Response,
        operation: &str,
    ) -> anyhow::Result<Option<Book>> {
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to {} book {}", operation, error_message(response).await)
        }
    }
}
