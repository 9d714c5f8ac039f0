use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use luminalib_borrows::api::Review;
use luminalib_repository::api::{Book, BookId};

use crate::api::Recommendation;
use crate::sentiment::{SentimentScorer, NEUTRAL_SCORE};
use crate::tfidf::{cosine_similarity, TfidfError, TfidfVectorizer};

const SENTIMENT_WEIGHT: f64 = 0.6;
const RATING_WEIGHT: f64 = 0.4;
const MAX_RATING: f64 = 5.0;
/// Combined score a review must exceed for its book to count as liked
const LIKED_THRESHOLD: f64 = 0.6;

const EXPLORE_REASON: &str = "Explore our collection";
const TRY_SOMETHING_NEW_REASON: &str = "Try something new";

/// Book the user enjoyed together with the combined score of the review
#[derive(Debug, Clone, PartialEq)]
pub struct LikedBook<'a> {
    pub book: &'a Book,
    pub score: f64,
}

/// Candidate book with its similarity to the liked books
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBook<'a> {
    pub book: &'a Book,
    pub score: f64,
}

/// Blend of review sentiment in [0, 1] and star rating
pub fn combined_score(sentiment_score: f64, rating: u8) -> f64 {
    sentiment_score * SENTIMENT_WEIGHT + (rating as f64 / MAX_RATING) * RATING_WEIGHT
}

/// Text compared between books
pub fn book_features(book: &Book) -> String {
    format!(
        "{} {} {} {}",
        book.details.title,
        book.details.author,
        book.details.description,
        book.details.summary.as_deref().unwrap_or_default()
    )
}

#[derive(Default)]
pub struct RecommendationsEngine {
    sentiment_scorer: SentimentScorer,
    vectorizer: TfidfVectorizer,
}

impl RecommendationsEngine {
    pub fn new(sentiment_scorer: SentimentScorer) -> Self {
        Self {
            sentiment_scorer,
            vectorizer: TfidfVectorizer::default(),
        }
    }

    pub fn sentiment_scorer(&self) -> &SentimentScorer {
        &self.sentiment_scorer
    }

    /// Books from reviews whose comment and rating together exceed the liked threshold.
    /// Reviews without a comment and reviews of books no longer in the catalogue are skipped.
    pub fn books_with_positive_sentiment<'a>(
        &self,
        reviews: &[Review],
        books: &'a [Book],
    ) -> Vec<LikedBook<'a>> {
        let books_by_id: HashMap<BookId, &Book> =
            books.iter().map(|book| (book.book_id, book)).collect();

        reviews
            .iter()
            .filter_map(|review| {
                let Some(book) = books_by_id.get(&review.book_id).copied() else {
                    tracing::debug!(
                        "Skipping review {} of missing book {}",
                        review.review_id,
                        review.book_id
                    );
                    return None;
                };
                let comment = review.comment.as_deref().filter(|c| !c.is_empty())?;
                let sentiment = self.sentiment_scorer.analyze(Some(comment));
                let score = combined_score(sentiment.score, review.rating);
                (score > LIKED_THRESHOLD).then_some(LikedBook { book, score })
            })
            .collect()
    }

    /// Every book that is not liked, scored by its best cosine similarity to a liked book.
    /// Candidates keep catalogue order. When vectorization fails all candidates get a neutral score.
    pub fn similar_books<'a>(
        &self,
        liked_books: &[LikedBook<'_>],
        books: &'a [Book],
    ) -> Vec<ScoredBook<'a>> {
        let liked_ids: HashSet<BookId> = liked_books.iter().map(|l| l.book.book_id).collect();
        let candidates = books
            .iter()
            .filter(|book| !liked_ids.contains(&book.book_id))
            .collect_vec();

        if liked_books.is_empty() || candidates.is_empty() {
            return vec![];
        }

        match self.best_similarities(liked_books, &candidates) {
            Ok(similarities) => candidates
                .into_iter()
                .zip(similarities)
                .map(|(book, score)| ScoredBook { book, score })
                .collect(),
            Err(err) => {
                tracing::error!("Similarity calculation error: {}", err);
                candidates
                    .into_iter()
                    .map(|book| ScoredBook {
                        book,
                        score: NEUTRAL_SCORE,
                    })
                    .collect()
            }
        }
    }

    fn best_similarities(
        &self,
        liked_books: &[LikedBook<'_>],
        candidates: &[&Book],
    ) -> Result<Vec<f64>, TfidfError> {
        let texts = liked_books
            .iter()
            .map(|liked| book_features(liked.book))
            .chain(candidates.iter().map(|book| book_features(book)))
            .collect_vec();

        let rows = self.vectorizer.fit_transform(&texts)?;
        let (liked_rows, candidate_rows) = rows.split_at(liked_books.len());

        candidate_rows
            .iter()
            .map(|candidate| {
                liked_rows
                    .iter()
                    .map(|liked| cosine_similarity(candidate, liked))
                    .fold_ok(f64::MIN, f64::max)
            })
            .collect()
    }

    /// Up to `limit` recommendations for a user with the given reviews
    pub fn recommendations_for_user(
        &self,
        books: &[Book],
        reviews: &[Review],
        limit: usize,
    ) -> Vec<Recommendation> {
        if reviews.is_empty() {
            return fallback_recommendations(books, limit, EXPLORE_REASON);
        }

        let liked_books = self.books_with_positive_sentiment(reviews, books);
        if liked_books.is_empty() {
            return fallback_recommendations(books, limit, TRY_SOMETHING_NEW_REASON);
        }

        let similar_books = self.similar_books(&liked_books, books);
        let mut recommendations = rank_by_score(similar_books);
        recommendations.truncate(limit);
        recommendations
    }
}

/// Descending by score, equal scores keep their order
pub fn rank_by_score(scored_books: Vec<ScoredBook<'_>>) -> Vec<Recommendation> {
    scored_books
        .into_iter()
        .sorted_by(|a, b| b.score.total_cmp(&a.score))
        .map(|scored| {
            let reason = format!(
                "Similar to books you enjoyed (match: {}%)",
                (scored.score * 100.0).round_ties_even()
            );
            recommendation(scored.book, round_to(scored.score, 3), reason)
        })
        .collect()
}

fn fallback_recommendations(books: &[Book], limit: usize, reason: &str) -> Vec<Recommendation> {
    books
        .iter()
        .take(limit)
        .map(|book| recommendation(book, NEUTRAL_SCORE, reason.to_string()))
        .collect()
}

fn recommendation(book: &Book, score: f64, reason: String) -> Recommendation {
    Recommendation {
        id: book.book_id,
        title: book.details.title.clone(),
        author: book.details.author.clone(),
        description: book.details.description.clone(),
        summary: book.details.summary.clone(),
        score,
        reason,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
