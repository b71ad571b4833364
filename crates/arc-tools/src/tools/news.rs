//! Headline news via NewsData.io with a NewsAPI.org fallback.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Maximum number of headlines returned.
pub const MAX_HEADLINES: usize = 12;

const NEWSDATA_URL: &str = "https://newsdata.io/api/1/news";
const NEWSAPI_URL: &str = "https://newsapi.org/v2/top-headlines";

const NO_HEADLINES: &str = "No headlines right now";
const UNAVAILABLE: &str = "News unavailable";
const NOT_CONFIGURED: &str = "News unavailable (missing NEWSDATA_API_KEY / NEWSAPI_KEY)";

/// Credentials and endpoints for the news chain.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub newsdata_key: Option<String>,
    pub newsapi_key: Option<String>,
    pub newsdata_url: String,
    pub newsapi_url: String,
    pub country: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            newsdata_key: None,
            newsapi_key: None,
            newsdata_url: NEWSDATA_URL.to_string(),
            newsapi_url: NEWSAPI_URL.to_string(),
            country: "us".to_string(),
        }
    }
}

impl NewsConfig {
    /// Read keys from the environment.
    ///
    /// - `NEWSDATA_API_KEY` (or `NEWSDATAIO_KEY`) - NewsData.io key, tried first
    /// - `NEWSAPI_KEY` - NewsAPI.org key, tried when no NewsData key is set
    pub fn from_env() -> Self {
        let read = |name: &str| {
            env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            newsdata_key: read("NEWSDATA_API_KEY").or_else(|| read("NEWSDATAIO_KEY")),
            newsapi_key: read("NEWSAPI_KEY"),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    #[serde(default)]
    results: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
}

/// Collect up to [`MAX_HEADLINES`] non-empty titles, or a placeholder.
fn headlines_from(articles: Option<Vec<Article>>) -> Vec<String> {
    let headlines: Vec<String> = articles
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_HEADLINES)
        .collect();

    if headlines.is_empty() {
        vec![NO_HEADLINES.to_string()]
    } else {
        headlines
    }
}

/// News tool returning top headlines.
///
/// The provider chain stops at the first configured provider. A provider
/// error degrades to a placeholder headline, so the output is always ok.
pub struct News {
    client: reqwest::Client,
    config: NewsConfig,
}

impl News {
    pub fn new(config: NewsConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(12))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ToolError> {
        Self::new(NewsConfig::from_env())
    }

    async fn fetch_newsdata(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let size = MAX_HEADLINES.to_string();
        let response: NewsDataResponse = self
            .client
            .get(&self.config.newsdata_url)
            .query(&[
                ("apikey", key),
                ("country", self.config.country.as_str()),
                ("language", "en"),
                ("size", size.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(headlines_from(response.results))
    }

    async fn fetch_newsapi(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let page_size = MAX_HEADLINES.to_string();
        let response: NewsApiResponse = self
            .client
            .get(&self.config.newsapi_url)
            .header("X-Api-Key", key)
            .query(&[
                ("country", self.config.country.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(headlines_from(response.articles))
    }

    /// Headlines plus the name of the provider that produced them.
    pub async fn headlines(&self) -> (Vec<String>, Option<&'static str>) {
        if let Some(ref key) = self.config.newsdata_key {
            debug!("Fetching headlines from NewsData.io");
            return match self.fetch_newsdata(key).await {
                Ok(headlines) => (headlines, Some("newsdata")),
                Err(e) => {
                    warn!("NewsData.io request failed: {}", e);
                    (vec![UNAVAILABLE.to_string()], Some("newsdata"))
                }
            };
        }

        if let Some(ref key) = self.config.newsapi_key {
            debug!("Fetching headlines from NewsAPI.org");
            return match self.fetch_newsapi(key).await {
                Ok(headlines) => (headlines, Some("newsapi")),
                Err(e) => {
                    warn!("NewsAPI.org request failed: {}", e);
                    (vec![UNAVAILABLE.to_string()], Some("newsapi"))
                }
            };
        }

        (vec![NOT_CONFIGURED.to_string()], None)
    }
}

#[async_trait]
impl Tool for News {
    fn name(&self) -> &str {
        "news"
    }

    fn description(&self) -> &str {
        "Returns up to 12 current top headlines."
    }

    async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let (headlines, source) = self.headlines().await;
        Ok(ToolOutput::success(json!({
            "headlines": headlines,
            "source": source,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: Option<&str>) -> Article {
        Article {
            title: title.map(String::from),
        }
    }

    #[test]
    fn test_headlines_filter_and_cap() {
        let mut articles = vec![article(Some("  ")), article(None)];
        for i in 0..20 {
            articles.push(article(Some(&format!(" Story {} ", i))));
        }

        let headlines = headlines_from(Some(articles));
        assert_eq!(headlines.len(), MAX_HEADLINES);
        assert_eq!(headlines[0], "Story 0");
    }

    #[test]
    fn test_headlines_placeholder_when_empty() {
        assert_eq!(headlines_from(None), vec![NO_HEADLINES]);
        assert_eq!(headlines_from(Some(vec![article(Some(""))])), vec![NO_HEADLINES]);
    }

    #[tokio::test]
    async fn test_no_keys_is_ok_with_placeholder() {
        let news = News::new(NewsConfig::default()).unwrap();
        let output = news.execute(ToolArgs::default()).await.unwrap();

        assert!(output.ok);
        assert_eq!(output.data["headlines"][0], NOT_CONFIGURED);
        assert!(output.data["source"].is_null());
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_unavailable() {
        let config = NewsConfig {
            newsapi_key: Some("key".to_string()),
            newsapi_url: "http://127.0.0.1:9/v2/top-headlines".to_string(),
            ..NewsConfig::default()
        };
        let news = News::new(config).unwrap();
        let output = news.execute(ToolArgs::default()).await.unwrap();

        assert!(output.ok);
        assert_eq!(output.data["headlines"][0], UNAVAILABLE);
        assert_eq!(output.data["source"], "newsapi");
    }

    #[tokio::test]
    async fn test_newsdata_takes_precedence() {
        let config = NewsConfig {
            newsdata_key: Some("nd".to_string()),
            newsdata_url: "http://127.0.0.1:9/api/1/news".to_string(),
            newsapi_key: Some("na".to_string()),
            ..NewsConfig::default()
        };
        let news = News::new(config).unwrap();
        let (_, source) = news.headlines().await;
        assert_eq!(source, Some("newsdata"));
    }
}
