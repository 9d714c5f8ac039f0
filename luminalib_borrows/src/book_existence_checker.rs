use luminalib_repository::client::LuminalibRepositoryClient;

use crate::api::BookId;

#[async_trait::async_trait]
pub trait BookExistenceChecker: Send + Sync {
    async fn book_exists(&self, book_id: BookId) -> anyhow::Result<bool>;
}

/// Asks the repository service whether the book is in the catalogue
pub struct RepositoryBookExistenceChecker {
    repository_client: LuminalibRepositoryClient,
}

impl RepositoryBookExistenceChecker {
    pub fn new(repository_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            repository_client: LuminalibRepositoryClient::new(repository_url)?,
        })
    }
}

#[async_trait::async_trait]
impl BookExistenceChecker for RepositoryBookExistenceChecker {
    async fn book_exists(&self, book_id: BookId) -> anyhow::Result<bool> {
        Ok(self.repository_client.get_book(book_id).await?.is_some())
    }
}
