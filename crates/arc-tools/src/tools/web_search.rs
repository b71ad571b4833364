//! Web search via the DuckDuckGo Instant Answer API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// Related topics kept in the output.
const MAX_RELATED: usize = 6;

/// Longest query sent upstream.
const MAX_QUERY_CHARS: usize = 300;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    abstract_source: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

/// DuckDuckGo nests grouped topics under `Topics`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(default)]
    topics: Vec<RelatedTopic>,
}

fn flatten_topics(topics: Vec<RelatedTopic>, out: &mut Vec<serde_json::Value>) {
    for topic in topics {
        if out.len() >= MAX_RELATED {
            return;
        }
        match (topic.text, topic.first_url) {
            (Some(text), Some(url)) if !text.trim().is_empty() => {
                out.push(json!({ "text": text.trim(), "url": url }));
            }
            _ => flatten_topics(topic.topics, out),
        }
    }
}

/// Web search tool.
///
/// # Parameters
///
/// - `query` (optional): Search query. Defaults to the triggering message.
pub struct WebSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl WebSearch {
    pub fn new() -> Result<Self, ToolError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .user_agent("arc-council/0.1")
            .timeout(Duration::from_secs(12))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn search(&self, query: &str) -> Result<InstantAnswer, ToolError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Search API returned status {}",
                response.status()
            )));
        }

        // The endpoint answers with `application/x-javascript`.
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web"
    }

    fn description(&self) -> &str {
        "Searches the web for a short answer, abstract and related links."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let query: String = args
            .get_string_opt("query")
            .unwrap_or_else(|| args.message.trim().to_string())
            .chars()
            .take(MAX_QUERY_CHARS)
            .collect();

        if query.is_empty() {
            return Err(ToolError::MissingParameter("query".to_string()));
        }

        debug!("Searching the web for '{}'", query);

        let answer = match self.search(&query).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Web search failed: {}", e);
                return Ok(ToolOutput::failure_with_data(
                    e.to_string(),
                    json!({ "query": query }),
                ));
            }
        };

        let mut related = Vec::new();
        flatten_topics(answer.related_topics, &mut related);

        Ok(ToolOutput::success(json!({
            "query": query,
            "heading": answer.heading,
            "answer": answer.answer,
            "abstract": answer.abstract_text,
            "source": answer.abstract_source,
            "url": answer.abstract_url,
            "related": related,
        })))
    }
}
