use anyhow::{bail, Context};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{Book, BookDetails, BookDetailsPatch, BookId, GetAllBooksResponse};

pub struct LuminalibRepositoryClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LuminalibRepositoryClient {
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

    /// Calls POST /api/book endpoint
    /// Returns id of the added book taken from the location header
    pub async fn add_book(&self, book_details: BookDetails) -> anyhow::Result<BookId> {
        let response = self
            .client
            .post(format!("{}/api/book", self.url))
            .json(&book_details)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to add book, status {}", response.status())
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/book/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse book id")
    }

    /// Calls GET /api/book/{book_id} endpoint
    /// Returns None if the book is not in the repository
    pub async fn get_book(&self, book_id: BookId) -> anyhow::Result<Option<BookDetails>> {
        let response = self
            .client
            .get(format!("{}/api/book/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get book, status {}", response.status())
        }
    }

    /// Calls GET /api/books endpoint
    pub async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/api/books", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            let all_books: GetAllBooksResponse = response.json().await?;
            Ok(all_books.books)
        } else {
            bail!("Failed to list books, status {}", response.status())
        }
    }

    /// Calls PATCH /api/book/{book_id} endpoint
    /// Returns false if the book was not found
    pub async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> anyhow::Result<bool> {
        let response = self
            .client
            .patch(format!("{}/api/book/{}", self.url, book_id))
            .json(&patch)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to update book, status {}", response.status())
        }
    }

    /// Calls DELETE /api/book/{book_id} endpoint
    /// Returns false if the book was not found
    pub async fn delete_book(&self, book_id: BookId) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/api/book/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to delete book, status {}", response.status())
        }
    }
}
