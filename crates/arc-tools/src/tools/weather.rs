//! Weather tool using wttr.in API.

use std::env;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Location used when the message does not name one.
pub const DEFAULT_LOCATION: &str = "Jacksonville, NC";

const DEFAULT_BASE_URL: &str = "https://wttr.in";

/// One-liner: condition emoji, condition, temperature, wind, humidity.
const SHORT_FORMAT: &str = "%c %C %t, wind %w, humidity %h";

/// Trailing time words that are not part of a place name.
const TIME_SUFFIXES: [&str; 6] = [
    " right now",
    " this week",
    " tomorrow",
    " tonight",
    " today",
    " now",
];

/// Longest place name accepted from free text.
const MAX_LOCATION_CHARS: usize = 60;

/// Weather tool that fetches current conditions from wttr.in.
///
/// The wttr.in service is free and requires no API key.
///
/// # Parameters
///
/// - `location` (optional): City name, airport code, or coordinates.
///   When absent, the place after the last "in" of the message is used,
///   falling back to the configured default location.
pub struct Weather {
    client: reqwest::Client,
    base_url: String,
    default_location: String,
}

impl Weather {
    /// Create a weather tool with the built-in defaults.
    pub fn new() -> Result<Self, ToolError> {
        Self::with_settings(DEFAULT_BASE_URL, DEFAULT_LOCATION)
    }

    /// Create a weather tool from environment variables.
    ///
    /// - `ARC_WEATHER_DEFAULT_LOCATION` - Fallback location (default: "Jacksonville, NC")
    /// - `ARC_WEATHER_URL` - Service base URL (default: https://wttr.in)
    pub fn from_env() -> Result<Self, ToolError> {
        let default_location = env::var("ARC_WEATHER_DEFAULT_LOCATION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let base_url = env::var("ARC_WEATHER_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::with_settings(&base_url, &default_location)
    }

    /// Create a weather tool against a specific service and fallback location.
    pub fn with_settings(base_url: &str, default_location: &str) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .user_agent("curl/8.0.0") // wttr.in serves different content based on user agent
            .timeout(std::time::Duration::from_secs(12))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_location: default_location.trim().to_string(),
        })
    }

    /// The location a request resolves to.
    pub fn resolve_location(&self, args: &ToolArgs) -> String {
        args.get_string_opt("location")
            .or_else(|| extract_location(&args.message))
            .unwrap_or_else(|| self.default_location.clone())
    }

    fn build_url(&self, location: &str) -> Result<Url, ToolError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ToolError::InvalidParameter {
            name: "base_url".to_string(),
            reason: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| ToolError::InvalidParameter {
                name: "base_url".to_string(),
                reason: "URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .push(location);
        url.query_pairs_mut().append_pair("format", SHORT_FORMAT);

        Ok(url)
    }

    /// Fetch the one-line summary for a location.
    async fn fetch_weather(&self, location: &str) -> Result<String, ToolError> {
        let url = self.build_url(location)?;

        debug!("Fetching weather from: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Weather API returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;

        // Check for error responses from wttr.in
        if body.contains("Unknown location") || body.contains("Sorry") {
            return Err(ToolError::ExecutionFailed(format!(
                "Location not found: {}",
                location
            )));
        }

        Ok(body.trim().to_string())
    }
}

/// Extract a place name following the last " in " of a message.
///
/// "what's the weather in Boston today?" yields "Boston".
pub fn extract_location(message: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lower = message.to_ascii_lowercase();
    let start = if let Some(pos) = lower.rfind(" in ") {
        pos + 4
    } else if lower.starts_with("in ") {
        3
    } else {
        return None;
    };

    let rest = &message[start..];
    let end = rest
        .find(|c: char| matches!(c, '?' | '!' | '\n' | ';'))
        .unwrap_or(rest.len());
    let mut place = rest[..end].trim().trim_end_matches('.').trim();

    for suffix in TIME_SUFFIXES {
        let lower_place = place.to_ascii_lowercase();
        if lower_place.ends_with(suffix) {
            place = place[..place.len() - suffix.len()].trim_end();
        }
    }

    if place.is_empty() || place.chars().count() > MAX_LOCATION_CHARS {
        return None;
    }
    Some(place.to_string())
}

#[async_trait]
impl Tool for Weather {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Fetches current weather for a location using wttr.in. \
         Supports city names, airport codes, and coordinates."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let location = self.resolve_location(&args);

        debug!("Getting weather for '{}'", location);

        match self.fetch_weather(&location).await {
            Ok(summary) => Ok(ToolOutput::success(json!({
                "location": location,
                "summary": summary,
                "source": "wttr.in",
            }))),
            Err(e) => {
                warn!("Weather fetch failed: {}", e);
                Ok(ToolOutput::failure_with_data(
                    e.to_string(),
                    json!({ "location": location }),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_location() {
        assert_eq!(
            extract_location("What's the weather in Boston today?").as_deref(),
            Some("Boston")
        );
        assert_eq!(
            extract_location("forecast in Jacksonville, NC").as_deref(),
            Some("Jacksonville, NC")
        );
        assert_eq!(
            extract_location("Is it raining in São Paulo right now?").as_deref(),
            Some("São Paulo")
        );
        assert_eq!(extract_location("weather please"), None);
        assert_eq!(extract_location("weather in ?"), None);
    }

    #[test]
    fn test_resolve_location_precedence() {
        let weather = Weather::with_settings("https://wttr.in", "Camp Lejeune").unwrap();

        let explicit = ToolArgs::from_message("weather in Boston").with_param("location", "Denver");
        assert_eq!(weather.resolve_location(&explicit), "Denver");

        let from_text = ToolArgs::from_message("weather in Boston");
        assert_eq!(weather.resolve_location(&from_text), "Boston");

        let fallback = ToolArgs::from_message("what's the weather");
        assert_eq!(weather.resolve_location(&fallback), "Camp Lejeune");
    }

    #[test]
    fn test_build_url_encodes_location() {
        let weather = Weather::new().unwrap();
        let url = weather.build_url("New York").unwrap();

        assert_eq!(url.host_str(), Some("wttr.in"));
        assert_eq!(url.path(), "/New%20York");
        assert!(url.query().unwrap().starts_with("format="));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_failed_output() {
        let weather = Weather::with_settings("http://127.0.0.1:9", DEFAULT_LOCATION).unwrap();
        let output = weather
            .execute(ToolArgs::from_message("weather in Boston"))
            .await
            .unwrap();

        assert!(!output.ok);
        assert_eq!(output.data["location"], "Boston");
    }

    // Integration tests that require network access
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_weather_fetch() {
        let weather = Weather::new().unwrap();
        let output = weather
            .execute(ToolArgs::from_message("weather in London"))
            .await
            .unwrap();
        assert!(output.ok);
        assert_eq!(output.data["location"], "London");
    }
}
