use std::collections::HashMap;

use itertools::Itertools;

use luminalib_borrows::api::{Review, UserId};
use luminalib_repository::api::{Book, BookId};

use crate::api::{ReviewedBook, ReviewsSummary, SentimentBreakdown, SentimentLabel};
use crate::recommendations::round_to;
use crate::sentiment::SentimentScorer;
use crate::summarizer::TextSummarizer;

const NO_REVIEWS_SUMMARY: &str = "You have not reviewed any books yet.";
const TOP_AUTHORS: usize = 3;

/// Statistics of a user's reviews before the summary text is written
#[derive(Debug, Clone, PartialEq)]
struct ReviewsStatistics {
    total_reviews: u32,
    average_rating: f64,
    sentiment_breakdown: SentimentBreakdown,
    reviewed_books: Vec<ReviewedBook>,
}

impl ReviewsStatistics {
    fn collect(scorer: &SentimentScorer, reviews: &[Review], books: &[Book]) -> Self {
        let books_by_id: HashMap<BookId, &Book> =
            books.iter().map(|book| (book.book_id, book)).collect();

        let mut sentiment_breakdown = SentimentBreakdown::default();
        let mut reviewed_books = Vec::new();
        for review in reviews {
            let sentiment = scorer.analyze(review.comment.as_deref());
            match sentiment.label {
                SentimentLabel::Positive => sentiment_breakdown.positive += 1,
                SentimentLabel::Negative => sentiment_breakdown.negative += 1,
                SentimentLabel::Neutral => sentiment_breakdown.neutral += 1,
            }
            if let Some(book) = books_by_id.get(&review.book_id) {
                reviewed_books.push(ReviewedBook {
                    book_id: book.book_id,
                    title: book.details.title.clone(),
                    author: book.details.author.clone(),
                    rating: review.rating,
                    sentiment: sentiment.label,
                });
            }
        }

        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            let total: f64 = reviews.iter().map(|r| r.rating as f64).sum();
            round_to(total / reviews.len() as f64, 2)
        };

        Self {
            total_reviews: reviews.len() as u32,
            average_rating,
            sentiment_breakdown,
            reviewed_books,
        }
    }

    /// Authors with the most reviewed books, ties in order of first review
    fn top_authors(&self) -> Vec<&str> {
        self.reviewed_books
            .iter()
            .map(|book| book.author.as_str())
            .counts()
            .into_iter()
            .sorted_by_key(|(author, count)| {
                let first_seen = self
                    .reviewed_books
                    .iter()
                    .position(|book| book.author == *author)
                    .unwrap_or_default();
                (std::cmp::Reverse(*count), first_seen)
            })
            .take(TOP_AUTHORS)
            .map(|(author, _)| author)
            .collect()
    }

    fn positive_percentage(&self) -> u32 {
        if self.total_reviews == 0 {
            return 0;
        }
        (self.sentiment_breakdown.positive as f64 * 100.0 / self.total_reviews as f64)
            .round_ties_even() as u32
    }

    fn prompt(&self, reviews: &[Review]) -> String {
        let books_by_id: HashMap<BookId, &ReviewedBook> = self
            .reviewed_books
            .iter()
            .map(|book| (book.book_id, book))
            .collect();

        let lines = reviews
            .iter()
            .filter_map(|review| {
                let book = books_by_id.get(&review.book_id)?;
                Some(format!(
                    "- \"{}\" by {}: {}/5. {}",
                    book.title,
                    book.author,
                    review.rating,
                    review.comment.as_deref().unwrap_or("No comment.")
                ))
            })
            .join("\n");

        format!(
            "Summarize the reading taste of a library user in two or three sentences, \
             addressing them directly. They wrote {} reviews with an average rating of {:.2}.\n{}",
            self.total_reviews, self.average_rating, lines
        )
    }

    fn fallback_summary(&self) -> String {
        let mut summary = format!(
            "You have written {} reviews with an average rating of {:.2}. {}% of your reviews are positive.",
            self.total_reviews,
            self.average_rating,
            self.positive_percentage()
        );
        let top_authors = self.top_authors();
        if !top_authors.is_empty() {
            summary.push_str(&format!(
                " Your most reviewed authors: {}.",
                top_authors.join(", ")
            ));
        }
        summary
    }

    fn into_summary(self, user_id: UserId, summary: String) -> ReviewsSummary {
        ReviewsSummary {
            user_id,
            total_reviews: self.total_reviews,
            average_rating: self.average_rating,
            summary,
            sentiment_breakdown: self.sentiment_breakdown,
            reviewed_books: self.reviewed_books,
        }
    }
}

/// Aggregates the reviews of a user and asks the summarizer for a natural language summary.
/// Summarizer failures and empty answers end up as a templated summary.
pub async fn reviews_summary(
    user_id: UserId,
    reviews: &[Review],
    books: &[Book],
    scorer: &SentimentScorer,
    summarizer: &dyn TextSummarizer,
) -> ReviewsSummary {
    let statistics = ReviewsStatistics::collect(scorer, reviews, books);
    if reviews.is_empty() {
        return statistics.into_summary(user_id, NO_REVIEWS_SUMMARY.to_string());
    }

    let summary = match summarizer.summarize(&statistics.prompt(reviews)).await {
        Ok(Some(summary)) if !summary.trim().is_empty() => summary,
        Ok(_) => {
            tracing::warn!("Empty reviews summary for user {}, using template", user_id);
            statistics.fallback_summary()
        }
        Err(err) => {
            tracing::error!("Failed to summarize reviews of user {}: {}", user_id, err);
            statistics.fallback_summary()
        }
    };

    statistics.into_summary(user_id, summary)
}
