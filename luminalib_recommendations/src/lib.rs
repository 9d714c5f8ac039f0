pub mod api;

pub mod recommendations;
pub mod reviews_summary;
pub mod sentiment;
pub mod summarizer;
pub mod tfidf;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "client", test))]
pub mod library_data;

#[cfg(any(feature = "client", test))]
pub mod recommendations_provider;

#[cfg(any(feature = "server", test))]
pub mod app_config;

#[cfg(any(feature = "server", test))]
mod handlers;

#[cfg(any(feature = "server", test))]
pub mod settings;
