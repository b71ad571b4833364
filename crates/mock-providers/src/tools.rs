//! Tool stubs for exercising the tool router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use arc_tools::{async_trait, Tool, ToolArgs, ToolError, ToolOutput};
use serde_json::Value;
use tokio::time::sleep;

/// A tool returning a fixed output, optionally after a delay.
pub struct StaticTool {
    name: String,
    output: ToolOutput,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticTool {
    /// A tool named `name` that succeeds with `data`.
    pub fn ok(name: impl Into<String>, data: Value) -> Self {
        Self::with_output(name, ToolOutput::success(data))
    }

    /// A tool named `name` that returns a failed output.
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::with_output(name, ToolOutput::failure(error))
    }

    pub fn with_output(name: impl Into<String>, output: ToolOutput) -> Self {
        Self {
            name: name.into(),
            output,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of executions so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a fixed output"
    }

    async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        Ok(self.output.clone())
    }
}

/// A tool that always returns `Err`.
pub struct ErrorTool {
    name: String,
    message: String,
}

impl ErrorTool {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Tool for ErrorTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
        Err(ToolError::ExecutionFailed(self.message.clone()))
    }
}

/// A tool that panics when executed.
pub struct PanickingTool {
    name: String,
}

impl PanickingTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Panics"
    }

    async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
        panic!("tool {} panicked", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_tool_counts_calls() {
        let tool = StaticTool::ok("weather", json!({"summary": "sunny"}));
        let output = tool.execute(ToolArgs::default()).await.unwrap();

        assert!(output.ok);
        assert_eq!(output.data["summary"], "sunny");
        assert_eq!(tool.call_count(), 1);
    }

    #[tokio::test]
    async fn test_error_tool() {
        let tool = ErrorTool::new("news", "upstream down");
        assert!(tool.execute(ToolArgs::default()).await.is_err());
    }
}
