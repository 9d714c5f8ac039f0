use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub use luminalib_repository::api::BookId;

pub type UserId = i32;
pub type ReviewId = i32;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct UserDetails {
    pub name: String,
    /// Unique among all users
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Single borrow of a book, returned_at is empty while the book is still borrowed
pub struct BorrowRecord {
    pub book_id: BookId,
    pub borrowed_at: i64,
    pub returned_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Review submitted by a user for a book they borrowed
pub struct ReviewDetails {
    pub book_id: BookId,
    /// Star rating from 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct Review {
    pub review_id: ReviewId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub rating: u8,
    pub comment: Option<String>,
}
