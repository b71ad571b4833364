//! Prompt context shared by every council role.

use arc_core::{CouncilRole, SessionMessage};

use crate::tool_router::ToolRouting;

/// Default assistant name in the context header.
pub const DEFAULT_SYSTEM_NAME: &str = "ARC-OMEGA Council";

const GUIDANCE: &str =
    "Be accurate, practical, and structured. If tools are available, incorporate them clearly.";

const VISION_NOTE: &str = "VISION NOTE:\n\
If image analysis failed due to quotas/credits, do NOT stop. Provide best-effort help by asking \
the user for a short description of what the image shows and what they want extracted, then \
propose next steps.";

/// Base context for one council run.
///
/// Built once per run and reused verbatim by every role; role outputs are
/// not folded back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouncilContext {
    base: String,
}

impl CouncilContext {
    /// Assemble the base context.
    ///
    /// Sections are separated by blank lines and omitted when empty.
    pub fn build(
        system_name: &str,
        history: &[SessionMessage],
        tools: &ToolRouting,
        message: &str,
    ) -> Self {
        let mut sections = vec![
            format!("You are {}. Do NOT mention internal roles.", system_name),
            GUIDANCE.to_string(),
        ];

        if !history.is_empty() {
            let lines: Vec<String> = history
                .iter()
                .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.text))
                .collect();
            sections.push(format!("SESSION MEMORY (recent):\n{}", lines.join("\n")));
        }

        if !tools.is_empty() {
            let json = serde_json::to_string_pretty(&tools.outputs).unwrap_or_default();
            sections.push(format!("TOOLS OUTPUTS (JSON):\n{}", json));
        }

        if tools.vision_failed() {
            sections.push(VISION_NOTE.to_string());
        }

        sections.push(format!("USER REQUEST:\n{}", message));

        Self {
            base: sections.join("\n\n"),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Prompt for one role.
    pub fn role_prompt(&self, role: CouncilRole, instruction: &str) -> String {
        format!("{}\n\nROLE: {}\nTASK: {}\n", self.base, role, instruction)
    }
}
