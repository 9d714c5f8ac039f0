use anyhow::Context;

use luminalib_borrows::api::{Review, UserId};
use luminalib_borrows::client::LuminalibBorrowsClient;
use luminalib_repository::api::Book;
use luminalib_repository::client::LuminalibRepositoryClient;

/// Source of the books and reviews the recommendations are computed from
#[async_trait::async_trait]
pub trait LibraryData: Send + Sync {
    /// All books ordered by id
    async fn list_books(&self) -> anyhow::Result<Vec<Book>>;

    async fn list_user_reviews(&self, user_id: UserId) -> anyhow::Result<Vec<Review>>;
}

/// Reads books from the repository service and reviews from the borrows service
pub struct RemoteLibraryData {
    repository_client: LuminalibRepositoryClient,
    borrows_client: LuminalibBorrowsClient,
}

impl RemoteLibraryData {
    pub fn new(repository_url: &str, borrows_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            repository_client: LuminalibRepositoryClient::new(repository_url)?,
            borrows_client: LuminalibBorrowsClient::new(borrows_url)?,
        })
    }
}

#[async_trait::async_trait]
impl LibraryData for RemoteLibraryData {
    async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        self.repository_client
            .list_books()
            .await
            .context("Failed to list books")
    }

    async fn list_user_reviews(&self, user_id: UserId) -> anyhow::Result<Vec<Review>> {
        self.borrows_client
            .list_reviews(user_id)
            .await
            .with_context(|| format!("Failed to list reviews of user {user_id}"))
    }
}
