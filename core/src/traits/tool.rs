use crate::agent::ReplySink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    RollDice,
    GetCharacterSheet,
}

impl ToolName {
    pub const ALL: [ToolName; 2] = [ToolName::RollDice, ToolName::GetCharacterSheet];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::RollDice => "roll_dice",
            ToolName::GetCharacterSheet => "get_character_sheet",
        }
    }

    pub fn parse(name: &str) -> Option<ToolName> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub success: bool,
    pub payload: String,
}

impl ToolResult {
    pub fn ok(tool_call_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            payload: payload.into(),
        }
    }

    pub fn error(tool_call_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;

    fn description(&self) -> &str;

    fn input_schema(&self) -> serde_json::Value;

    async fn execute(&self, args: serde_json::Value, sink: &ReplySink) -> anyhow::Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_name_round_trips() {
        for name in ToolName::ALL {
            assert_eq!(ToolName::parse(name.as_str()), Some(name));
        }
    }

    #[test]
    fn tool_name_rejects_unknown() {
        assert_eq!(ToolName::parse("fireball"), None);
        assert_eq!(ToolName::parse(""), None);
    }
}
