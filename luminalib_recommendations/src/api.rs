use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

use luminalib_borrows::api::UserId;
use luminalib_repository::api::BookId;

pub const DEFAULT_NO_OF_RECOMMENDATIONS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Book recommended to the user together with its score and a human readable reason
pub struct Recommendation {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub summary: Option<String>,
    /// Match score in [0, 1] rounded to 3 decimal places
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct RecommendationsQuery {
    /// Maximal number of recommendations, 5 when not given
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Apiv2Schema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Number of user reviews per sentiment label
pub struct SentimentBreakdown {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ReviewedBook {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub rating: u8,
    pub sentiment: SentimentLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Summary of all reviews written by a user
pub struct ReviewsSummary {
    pub user_id: UserId,
    pub total_reviews: u32,
    /// Average star rating rounded to 2 decimal places, 0 when there are no reviews
    pub average_rating: f64,
    pub summary: String,
    pub sentiment_breakdown: SentimentBreakdown,
    /// Reviewed books that are still in the catalogue, in review order
    pub reviewed_books: Vec<ReviewedBook>,
}
