use anyhow::{bail, Context};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{BookId, BorrowRecord, Review, ReviewDetails, UserDetails, UserId};

pub struct LuminalibBorrowsClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LuminalibBorrowsClient {
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

    /// Calls POST /api/user endpoint
    /// Returns user_id of added user in response
    pub async fn add_user(&self, user_details: UserDetails) -> anyhow::Result<UserId> {
        let response = self
            .client
            .post(format!("{}/api/user", self.url))
            .json(&user_details)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add user {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/user/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse user id")
    }

    /// Calls GET /api/user/{user_id} endpoint
    /// Returns user details if user was present
    /// None if user was not in the repository
    /// and error in case of any other failure
    pub async fn get_user(&self, user_id: UserId) -> anyhow::Result<Option<UserDetails>> {
        let response = self
            .client
            .get(format!("{}/api/user/{}", self.url, user_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get user, status {}", response.status())
        }
    }

    /// Calls GET /api/users endpoint
    pub async fn list_users(&self) -> anyhow::Result<Vec<UserId>> {
        let response = self
            .client
            .get(format!("{}/api/users", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list users, status {}", response.status())
        }
    }

    /// Calls POST /api/user/{user_id}/borrow/{book_id} endpoint
    /// Returns true if successful and false if the book is already borrowed
    pub async fn borrow_book(&self, book_id: BookId, user_id: UserId) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(format!(
                "{}/api/user/{}/borrow/{}",
                self.url, user_id, book_id
            ))
            .send()
            .await?;

        if response.status() == StatusCode::FORBIDDEN {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to borrow book {}", error)
        }
    }

    /// Calls DELETE /api/user/{user_id}/borrow/{book_id} endpoint
    /// Returns true if successful and false if the user had no active borrow of the book
    pub async fn return_book(&self, book_id: BookId, user_id: UserId) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!(
                "{}/api/user/{}/borrow/{}",
                self.url, user_id, book_id
            ))
            .send()
            .await?;

        if response.status() == StatusCode::FORBIDDEN {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to return book {}", error)
        }
    }

    /// Calls GET /api/user/{user_id}/borrows endpoint
    pub async fn list_active_borrows(&self, user_id: UserId) -> anyhow::Result<Vec<BookId>> {
        let response = self
            .client
            .get(format!("{}/api/user/{}/borrows", self.url, user_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list borrows, status {}", response.status())
        }
    }

    /// Calls GET /api/user/{user_id}/history endpoint
    pub async fn history(&self, user_id: UserId) -> anyhow::Result<Vec<BorrowRecord>> {
        let response = self
            .client
            .get(format!("{}/api/user/{}/history", self.url, user_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to get history, status {}", response.status())
        }
    }

    /// Calls POST /api/user/{user_id}/review endpoint
    pub async fn add_review(
        &self,
        user_id: UserId,
        review_details: ReviewDetails,
    ) -> anyhow::Result<Review> {
        let response = self
            .client
            .post(format!("{}/api/user/{}/review", self.url, user_id))
            .json(&review_details)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add review {}", error)
        }
    }

    /// Calls GET /api/user/{user_id}/reviews endpoint
    pub async fn list_reviews(&self, user_id: UserId) -> anyhow::Result<Vec<Review>> {
        let response = self
            .client
            .get(format!("{}/api/user/{}/reviews", self.url, user_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list reviews, status {}", response.status())
        }
    }

    /// Calls GET /api/book/{book_id}/in_use endpoint
    /// Returns true if the book was ever borrowed or reviewed
    pub async fn is_book_in_use(&self, book_id: BookId) -> anyhow::Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/book/{}/in_use", self.url, book_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to check book usage, status {}", response.status())
        }
    }
}
