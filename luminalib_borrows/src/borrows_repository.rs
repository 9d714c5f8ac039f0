pub use in_memory_borrows_repository::InMemoryBorrowsRepository;
pub use postgres_borrows_repository::{
    PostgresBorrowsRepository, PostgresBorrowsRepositoryConfig,
};

use crate::api::{BookId, BorrowRecord, Review, ReviewDetails, UserDetails, UserId};

mod in_memory_borrows_repository;
mod postgres_borrows_repository;

#[derive(Debug, thiserror::Error)]
pub enum BorrowsRepositoryError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("User with email {0} already exists")]
    UserAlreadyExists(String),

    #[error("Book {0} already borrowed")]
    BookAlreadyBorrowed(BookId),

    #[error("Book {0} not borrowed or borrowed by different user")]
    BookNotBorrowedByUser(BookId),

    #[error("Book {0} was never borrowed by user")]
    ReviewedBookNotBorrowed(BookId),

    #[error("Rating {0} is out of range")]
    InvalidRating(u8),

    #[error("Failed to deserialize user: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait BorrowsRepository: Send + Sync {
    async fn add_user(&self, details: UserDetails) -> Result<UserId, BorrowsRepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<UserDetails, BorrowsRepositoryError>;

    async fn get_all_user_ids(&self) -> Result<Vec<UserId>, BorrowsRepositoryError>;

    /// Fails if the book is currently borrowed by anyone
    async fn borrow_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), BorrowsRepositoryError>;

    /// Closes the active borrow of the book by this user
    async fn return_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), BorrowsRepositoryError>;

    /// Books currently borrowed by the user
    async fn get_active_borrows(&self, user_id: UserId)
        -> Result<Vec<BookId>, BorrowsRepositoryError>;

    /// All borrows of the user, returned and active, oldest first
    async fn get_borrow_history(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BorrowRecord>, BorrowsRepositoryError>;

    /// Stores a review, only books the user has borrowed at some point can be reviewed
    async fn add_review(
        &self,
        user_id: UserId,
        details: ReviewDetails,
    ) -> Result<Review, BorrowsRepositoryError>;

    /// Reviews written by the user, oldest first
    async fn get_reviews(&self, user_id: UserId) -> Result<Vec<Review>, BorrowsRepositoryError>;

    /// True if anyone has ever borrowed or reviewed the book
    async fn is_book_in_use(&self, book_id: BookId) -> Result<bool, BorrowsRepositoryError>;
}

fn validate_rating(rating: u8) -> Result<(), BorrowsRepositoryError> {
    if (crate::api::MIN_RATING..=crate::api::MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(BorrowsRepositoryError::InvalidRating(rating))
    }
}

fn now_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or_default()
}
