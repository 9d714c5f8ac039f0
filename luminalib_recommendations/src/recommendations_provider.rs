use std::sync::Arc;

use luminalib_borrows::api::UserId;

use crate::api::{Recommendation, ReviewsSummary};
use crate::library_data::LibraryData;
use crate::recommendations::RecommendationsEngine;
use crate::reviews_summary::reviews_summary;
use crate::summarizer::TextSummarizer;

/// Fetches the user's library data and runs the engine on it for each request
pub struct RecommendationsProvider {
    library_data: Arc<dyn LibraryData>,
    summarizer: Arc<dyn TextSummarizer>,
    engine: RecommendationsEngine,
}

impl RecommendationsProvider {
    pub fn new(
        library_data: Arc<dyn LibraryData>,
        summarizer: Arc<dyn TextSummarizer>,
        engine: RecommendationsEngine,
    ) -> Self {
        Self {
            library_data,
            summarizer,
            engine,
        }
    }

    pub async fn get_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> anyhow::Result<Vec<Recommendation>> {
        let books = self.library_data.list_books().await?;
        let reviews = self.library_data.list_user_reviews(user_id).await?;

        let recommendations = self
            .engine
            .recommendations_for_user(&books, &reviews, limit);
        tracing::info!(
            "Computed {} recommendations for user {} from {} reviews",
            recommendations.len(),
            user_id,
            reviews.len()
        );
        Ok(recommendations)
    }

    pub async fn get_reviews_summary(&self, user_id: UserId) -> anyhow::Result<ReviewsSummary> {
        let books = self.library_data.list_books().await?;
        let reviews = self.library_data.list_user_reviews(user_id).await?;

        Ok(reviews_summary(
            user_id,
            &reviews,
            &books,
            self.engine.sentiment_scorer(),
            self.summarizer.as_ref(),
        )
        .await)
    }
}
