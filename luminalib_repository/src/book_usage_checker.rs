use anyhow::{bail, Context};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::BookId;

#[async_trait::async_trait]
pub trait BookUsageChecker: Send + Sync {
    /// True if the book has related borrows or reviews
    async fn is_book_in_use(&self, book_id: BookId) -> anyhow::Result<bool>;
}

/// Asks the borrows service whether the book was ever borrowed or reviewed
pub struct BorrowsBookUsageChecker {
    borrows_url: String,
    client: ClientWithMiddleware,
}

impl BorrowsBookUsageChecker {
    pub fn new(borrows_url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            borrows_url: borrows_url.to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl BookUsageChecker for BorrowsBookUsageChecker {
    async fn is_book_in_use(&self, book_id: BookId) -> anyhow::Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/book/{}/in_use", self.borrows_url, book_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to check book usage, status {}", response.status())
        }
    }
}
