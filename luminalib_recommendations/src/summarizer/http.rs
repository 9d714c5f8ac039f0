use anyhow::Context;
use reqwest::header::AUTHORIZATION;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;
use serde::{Deserialize, Serialize};

use super::{SummarizerError, TextSummarizer};

const SYSTEM_PROMPT: &str = "You are an expert summarization assistant. \
Return only the summary of the user's text. \
Do not add titles, labels, bullet points, explanations, or extra commentary.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
}

pub struct HttpTextSummarizer {
    url: String,
    api_key: Option<String>,
    client: ClientWithMiddleware,
}

impl HttpTextSummarizer {
    pub fn new(url: &str, api_key: Option<String>, max_retries: u32) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            url: url.to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait::async_trait]
impl TextSummarizer for HttpTextSummarizer {
    async fn summarize(&self, text: &str) -> Result<Option<String>, SummarizerError> {
        let mut request = self.client.post(&self.url).json(&ChatRequest {
            message: format!("{SYSTEM_PROMPT}\n\n{text}"),
        });
        if let Some(api_key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|err| SummarizerError::RequestFailed(err.to_string()))?;
        if !response.status().is_success() {
            return Err(SummarizerError::UnexpectedStatus(response.status().as_u16()));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|err| SummarizerError::InvalidResponse(err.to_string()))?;
        Ok(chat_response
            .response
            .map(|summary| summary.trim().to_string())
            .filter(|summary| !summary.is_empty()))
    }
}

#[cfg(test)]
mod http_summarizer_tests {
    use super::*;

    #[test]
    fn chat_response_with_null_is_empty() {
        let response: ChatResponse = serde_json::from_str(r#"{"response": null}"#).unwrap();
        assert_eq!(response.response, None);
        let response: ChatResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(response.response, None);
        let response: ChatResponse =
            serde_json::from_str(r#"{"response": "A reader of fantasy."}"#).unwrap();
        assert_eq!(response.response.as_deref(), Some("A reader of fantasy."));
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let summarizer = HttpTextSummarizer::new("http://127.0.0.1:9/chat", None, 0).unwrap();
        assert!(summarizer.summarize("text").await.is_err());
    }
}
