//! Keyword tool router.
//!
//! Picks tools from four independent keyword sets and runs the selected
//! ones concurrently. Results are collected into a JSON object keyed by
//! tool name, in selection order.

use std::fmt;
use std::sync::Arc;

use arc_tools::{ToolArgs, ToolError, ToolRegistry};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// A tool the router knows how to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Weather,
    News,
    Web,
    Vision,
}

impl ToolKind {
    /// Selection (and output) order.
    pub const ALL: [ToolKind; 4] = [ToolKind::Weather, ToolKind::News, ToolKind::Web, ToolKind::Vision];

    /// Registry name and output key.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Weather => "weather",
            ToolKind::News => "news",
            ToolKind::Web => "web",
            ToolKind::Vision => "vision",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Weather => &["weather", "forecast"],
            ToolKind::News => &["news", "headlines"],
            ToolKind::Web => &[
                "search",
                "look up",
                "latest",
                "right now",
                "current",
                "sources",
                "web",
                "internet",
                "permit",
                "zoning",
                "ordinance",
                "code",
                "inspection",
                "legal",
            ],
            ToolKind::Vision => &[
                "image",
                "photo",
                "picture",
                "uploaded",
                "tell me about the picture",
                "describe the picture",
            ],
        }
    }

    fn matches(&self, lower: &str) -> bool {
        self.keywords().iter().any(|k| lower.contains(k))
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tools a message asks for, in [`ToolKind::ALL`] order.
pub fn select_tools(message: &str) -> Vec<ToolKind> {
    let lower = message.to_lowercase();
    ToolKind::ALL
        .into_iter()
        .filter(|kind| kind.matches(&lower))
        .collect()
}

/// Outcome of the routing step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolRouting {
    /// Tool outputs keyed by tool name. A tool that returned an error has
    /// `{"ok": false, "error": ...}`.
    pub outputs: Map<String, Value>,
    /// Set when a tool task aborted; `outputs` then holds what completed.
    pub failure: Option<String>,
}

impl ToolRouting {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Whether the vision tool ran and did not produce an analysis.
    pub fn vision_failed(&self) -> bool {
        self.outputs
            .get(ToolKind::Vision.name())
            .map(|v| v.get("ok") == Some(&Value::Bool(false)))
            .unwrap_or(false)
    }

    /// Outputs as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.outputs.clone())
    }
}

fn error_entry(error: &ToolError) -> Value {
    json!({ "ok": false, "error": error.to_string() })
}

/// Runs selected tools against a registry.
#[derive(Debug, Clone, Default)]
pub struct ToolRouter {
    registry: Arc<ToolRegistry>,
}

impl ToolRouter {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Select and run the tools for a message.
    pub async fn route(&self, message: &str) -> ToolRouting {
        let selected = select_tools(message);
        if selected.is_empty() {
            return ToolRouting::default();
        }

        debug!(
            "Routing to tools: {}",
            selected.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
        );

        let handles: Vec<_> = selected
            .iter()
            .map(|kind| {
                let registry = Arc::clone(&self.registry);
                let args = ToolArgs::from_message(message);
                let name = kind.name();
                tokio::spawn(async move { registry.execute(name, args).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;

        let mut routing = ToolRouting::default();
        for (kind, joined) in selected.iter().zip(results) {
            match joined {
                Ok(Ok(output)) => {
                    let value = serde_json::to_value(&output)
                        .unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }));
                    routing.outputs.insert(kind.name().to_string(), value);
                }
                Ok(Err(e)) => {
                    warn!("Tool '{}' failed: {}", kind, e);
                    routing.outputs.insert(kind.name().to_string(), error_entry(&e));
                }
                Err(e) => {
                    warn!("Tool '{}' aborted: {}", kind, e);
                    if routing.failure.is_none() {
                        routing.failure = Some(format!("{} tool aborted: {}", kind, e));
                    }
                }
            }
        }

        routing
    }
}
