//! Image analysis over the most recently uploaded image.
//!
//! The upload store is reached through the [`ImageSource`] seam; the
//! analysis itself is a single OpenAI-compatible chat call with the image
//! inlined as a base64 data URL.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Error text when no image has been uploaded.
pub const NO_IMAGE: &str = "No recent image found (upload an image first).";

const DEFAULT_PROMPT: &str = "Describe this image.";
const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// An uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StoredImage {
    /// Whether the upload looks like an image by content type or extension.
    pub fn is_image(&self) -> bool {
        let content_type = self.content_type.trim().to_lowercase();
        let filename = self.filename.to_lowercase();
        content_type.starts_with("image/")
            || IMAGE_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
    }

    /// Content type to declare in the data URL.
    fn mime(&self) -> &str {
        let content_type = self.content_type.trim();
        if content_type.is_empty() {
            "application/octet-stream"
        } else {
            content_type
        }
    }

    /// The image as a `data:` URL.
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime(), encoded)
    }
}

/// Access to uploaded files.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// The most recently uploaded image, skipping non-image uploads.
    async fn latest_image(&self) -> Result<Option<StoredImage>, ToolError>;
}

/// In-process upload store, newest last.
#[derive(Debug, Default)]
pub struct InMemoryImageSource {
    uploads: RwLock<Vec<StoredImage>>,
}

impl InMemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an upload.
    pub async fn push(&self, upload: StoredImage) {
        self.uploads.write().await.push(upload);
    }
}

#[async_trait]
impl ImageSource for InMemoryImageSource {
    async fn latest_image(&self) -> Result<Option<StoredImage>, ToolError> {
        let uploads = self.uploads.read().await;
        Ok(uploads.iter().rev().find(|u| u.is_image()).cloned())
    }
}

/// Vision model endpoint settings.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Name reported as the analysing provider.
    pub provider: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            provider: "openai".to_string(),
            max_tokens: 700,
            timeout: Duration::from_secs(60),
        }
    }
}

impl VisionConfig {
    /// Create configuration from environment variables.
    ///
    /// - `ARC_VISION_API_URL` - OpenAI-compatible base URL
    /// - `ARC_VISION_API_KEY` - Key (falls back to `OPENAI_API_KEY`)
    /// - `ARC_VISION_MODEL` - Vision model (default: gpt-4o-mini)
    /// - `ARC_VISION_PROVIDER` - Provider label (default: openai)
    pub fn from_env() -> Self {
        let read = |name: &str| {
            env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            api_url: read("ARC_VISION_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_key: read("ARC_VISION_API_KEY").or_else(|| read("OPENAI_API_KEY")),
            model: read("ARC_VISION_MODEL").unwrap_or(defaults.model),
            provider: read("ARC_VISION_PROVIDER").unwrap_or(defaults.provider),
            ..defaults
        }
    }
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    #[serde(default)]
    choices: Vec<VisionChoice>,
}

#[derive(Debug, Deserialize)]
struct VisionChoice {
    message: VisionMessage,
}

#[derive(Debug, Deserialize)]
struct VisionMessage {
    content: Option<String>,
}

/// Vision tool analysing the latest uploaded image.
pub struct Vision {
    client: reqwest::Client,
    config: VisionConfig,
    images: Arc<dyn ImageSource>,
}

impl Vision {
    pub fn new(config: VisionConfig, images: Arc<dyn ImageSource>) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            images,
        })
    }

    pub fn from_env(images: Arc<dyn ImageSource>) -> Result<Self, ToolError> {
        Self::new(VisionConfig::from_env(), images)
    }

    fn build_request(&self, image: &StoredImage, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image.data_url() } }
                ]
            }]
        })
    }

    /// Analyse an image. Failures are reported in the returned JSON.
    pub async fn analyze(&self, image: &StoredImage, prompt: &str) -> Value {
        let Some(ref api_key) = self.config.api_key else {
            return json!({ "ok": false, "error": "vision key missing (ARC_VISION_API_KEY / OPENAI_API_KEY)" });
        };

        let url = format!("{}/chat/completions", self.config.api_url);
        debug!(
            "Sending {} byte image to {} ({})",
            image.bytes.len(),
            self.config.provider,
            self.config.model
        );

        let response = match self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&self.build_request(image, prompt))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Vision request failed: {}", e);
                return json!({ "ok": false, "error": format!("vision request failed: {}", e) });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Vision API error ({}): {}", status.as_u16(), body);
            return json!({
                "ok": false,
                "error": format!("vision API error ({})", status.as_u16()),
                "upstream": body,
            });
        }

        let parsed: VisionResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                return json!({ "ok": false, "error": format!("Failed to parse response: {}", e) })
            }
        };

        let text = parsed
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty());

        match text {
            Some(text) => json!({
                "ok": true,
                "text": text,
                "provider": self.config.provider,
                "model": self.config.model,
            }),
            None => json!({ "ok": false, "error": "empty completion" }),
        }
    }
}

#[async_trait]
impl Tool for Vision {
    fn name(&self) -> &str {
        "vision"
    }

    fn description(&self) -> &str {
        "Analyses the most recently uploaded image."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let Some(image) = self.images.latest_image().await? else {
            return Ok(ToolOutput::failure(NO_IMAGE));
        };

        let prompt = args
            .get_string_opt("prompt")
            .or_else(|| Some(args.message.trim().to_string()).filter(|m| !m.is_empty()))
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        let result = self.analyze(&image, &prompt).await;
        let ok = result["ok"].as_bool().unwrap_or(false);

        let data = json!({
            "file_id": image.id,
            "filename": image.filename,
            "content_type": image.content_type,
            "result": result,
        });

        if ok {
            Ok(ToolOutput::success(data))
        } else {
            let error = data["result"]["error"]
                .as_str()
                .unwrap_or("image analysis failed")
                .to_string();
            Ok(ToolOutput::failure_with_data(error, data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(id: &str) -> StoredImage {
        StoredImage {
            id: id.to_string(),
            filename: format!("{}.png", id),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
        }
    }

    #[test]
    fn test_is_image() {
        let mut upload = png("a");
        assert!(upload.is_image());

        upload.content_type = "application/octet-stream".to_string();
        assert!(upload.is_image(), "extension alone is enough");

        upload.filename = "notes.txt".to_string();
        assert!(!upload.is_image());
    }

    #[test]
    fn test_data_url() {
        let image = png("a");
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn test_latest_image_skips_non_images() {
        let source = InMemoryImageSource::new();
        source.push(png("first")).await;
        source.push(png("second")).await;
        source
            .push(StoredImage {
                id: "doc".to_string(),
                filename: "report.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: vec![1, 2, 3],
            })
            .await;

        let latest = source.latest_image().await.unwrap().unwrap();
        assert_eq!(latest.id, "second");
    }

    #[tokio::test]
    async fn test_no_image_is_failed_output() {
        let vision = Vision::new(VisionConfig::default(), Arc::new(InMemoryImageSource::new())).unwrap();
        let output = vision
            .execute(ToolArgs::from_message("describe this image"))
            .await
            .unwrap();

        assert!(!output.ok);
        assert_eq!(output.error.as_deref(), Some(NO_IMAGE));
    }

    #[tokio::test]
    async fn test_missing_key_reports_failed_result() {
        let source = Arc::new(InMemoryImageSource::new());
        source.push(png("photo")).await;

        let vision = Vision::new(VisionConfig::default(), source).unwrap();
        let output = vision
            .execute(ToolArgs::from_message("what is in the photo?"))
            .await
            .unwrap();

        assert!(!output.ok);
        assert_eq!(output.data["file_id"], "photo");
        assert_eq!(output.data["result"]["ok"], false);
    }

    #[test]
    fn test_request_inlines_image() {
        let vision = Vision::new(VisionConfig::default(), Arc::new(InMemoryImageSource::new())).unwrap();
        let request = vision.build_request(&png("a"), "Describe this image.");

        assert_eq!(request["model"], DEFAULT_MODEL);
        let parts = &request["messages"][0]["content"];
        assert_eq!(parts[0]["text"], "Describe this image.");
        assert!(parts[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }
}
