//! News headlines via NewsAPI
//!
//! Fetches English-language headlines mentioning the configured city.

use async_trait::async_trait;

use crate::config::{LocationConfig, NewsConfig};
use crate::handlers::{Handler, Reply};
use crate::{Error, Result};

/// NewsAPI search endpoint
const NEWS_URL: &str = "https://newsapi.org/v2/everything";

/// Response from the NewsAPI `everything` endpoint
#[derive(Debug, serde::Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
}

/// One article; only the title is spoken
#[derive(Debug, serde::Deserialize)]
pub struct NewsArticle {
    pub title: String,
}

/// Announces news headlines about the configured city
pub struct NewsHandler {
    client: reqwest::Client,
    api_key: String,
    city: String,
    max_headlines: u32,
}

impl NewsHandler {
    /// Create a news handler
    ///
    /// # Errors
    ///
    /// Returns error if the API key or city is missing
    pub fn new(api_key: String, location: &LocationConfig, news: &NewsConfig) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("NewsAPI key required for news".to_string()));
        }
        if location.city.is_empty() {
            return Err(Error::Config("location.city required for news".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            city: location.city.clone(),
            max_headlines: news.max_headlines,
        })
    }
}

#[async_trait]
impl Handler for NewsHandler {
    fn name(&self) -> &'static str {
        "news"
    }

    fn keywords(&self) -> &[&'static str] {
        &["news", "headlines"]
    }

    async fn handle(&self, _utterance: &str) -> Result<Reply> {
        let url = format!(
            "{NEWS_URL}?q={}&language=en&pageSize={}&apiKey={}",
            urlencoding::encode(&self.city),
            self.max_headlines,
            self.api_key
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "NewsAPI error");
            return Err(Error::News(format!("NewsAPI error {status}: {body}")));
        }

        let news: NewsResponse = response.json().await?;
        tracing::info!(count = news.articles.len(), city = %self.city, "headlines fetched");

        Ok(Reply::lines(format_headlines(&news.articles, &self.city)))
    }
}

/// Format the spoken headline list
#[must_use]
pub fn format_headlines(articles: &[NewsArticle], city: &str) -> Vec<String> {
    if articles.is_empty() {
        return vec!["No headlines found.".to_string()];
    }

    let mut lines = vec![format!("Latest news headlines related to {city}.")];
    lines.extend(articles.iter().map(|a| a.title.clone()));
    lines
}
