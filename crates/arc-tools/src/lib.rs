//! Tool registry and implementations for the ARC council.
//!
//! This crate provides a `ToolRegistry` for registering and executing the
//! tools the council's tool router dispatches to. Each tool takes the
//! triggering message (plus optional explicit parameters) and returns a
//! JSON payload that is handed to the deliberation roles verbatim.
//!
//! # Built-in Tools
//!
//! - [`Weather`] - Current conditions via wttr.in (no API key needed).
//! - [`News`] - Top headlines via NewsData.io, falling back to NewsAPI.org.
//! - [`WebSearch`] - Instant answers via DuckDuckGo (no API key needed).
//! - [`Vision`] - Analysis of the latest uploaded image through an
//!   OpenAI-compatible vision model. Uploads are read through [`ImageSource`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use arc_tools::{default_registry, InMemoryImageSource, ToolArgs};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = default_registry(Arc::new(InMemoryImageSource::new()))?;
//!
//!     let output = registry
//!         .execute("weather", ToolArgs::from_message("weather in Boston"))
//!         .await?;
//!     println!("{}", output.data);
//!     Ok(())
//! }
//! ```

mod error;
mod registry;
mod tool;
pub mod tools;

use std::sync::Arc;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolOutput};
pub use tools::{
    extract_location, ImageSource, InMemoryImageSource, News, NewsConfig, StoredImage, Vision,
    VisionConfig, Weather, WebSearch, DEFAULT_LOCATION, MAX_HEADLINES, NO_IMAGE,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Create a registry with all built-in tools configured from the environment.
pub fn default_registry(images: Arc<dyn ImageSource>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();

    registry.register(Weather::from_env()?);
    registry.register(News::from_env()?);
    registry.register(WebSearch::new()?);
    registry.register(Vision::from_env(images)?);

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry(Arc::new(InMemoryImageSource::new())).unwrap();
        assert_eq!(registry.list_tools(), vec!["news", "vision", "weather", "web"]);
    }
}
