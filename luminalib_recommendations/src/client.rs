use anyhow::{bail, Context};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use luminalib_borrows::api::UserId;

use crate::api::{Recommendation, ReviewsSummary};

pub struct LuminalibRecommendationsClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LuminalibRecommendationsClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls GET /api/recommendations/{user_id} endpoint
    /// The service decides the number of recommendations when limit is None
    pub async fn get_recommendations(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> anyhow::Result<Vec<Recommendation>> {
        let mut request = self
            .client
            .get(format!("{}/api/recommendations/{}", self.url, user_id));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to get recommendations, status {}", response.status())
        }
    }

    /// Calls GET /api/recommendations/{user_id}/reviews_summary endpoint
    pub async fn get_reviews_summary(&self, user_id: UserId) -> anyhow::Result<ReviewsSummary> {
        let response = self
            .client
            .get(format!(
                "{}/api/recommendations/{}/reviews_summary",
                self.url, user_id
            ))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to get reviews summary, status {}", response.status())
        }
    }
}
