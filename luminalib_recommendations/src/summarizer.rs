#[cfg(any(feature = "client", test))]
mod http;

#[cfg(any(feature = "client", test))]
pub use http::HttpTextSummarizer;

#[derive(thiserror::Error, Debug)]
pub enum SummarizerError {
    #[error("Summarizer is not configured")]
    NotConfigured,

    #[error("Request failed {0}")]
    RequestFailed(String),

    #[error("Unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid response {0}")]
    InvalidResponse(String),
}

/// Natural language summaries from an external text generation service
#[async_trait::async_trait]
pub trait TextSummarizer: Send + Sync {
    /// Summary of the text, None when the service had nothing to say
    async fn summarize(&self, text: &str) -> Result<Option<String>, SummarizerError>;
}

/// Used when no text generation service is configured
pub struct DisabledSummarizer;

#[async_trait::async_trait]
impl TextSummarizer for DisabledSummarizer {
    async fn summarize(&self, _text: &str) -> Result<Option<String>, SummarizerError> {
        Err(SummarizerError::NotConfigured)
    }
}
