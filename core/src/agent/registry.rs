use crate::agent::ReplySink;
use crate::traits::{Tool, ToolCall, ToolName, ToolResult, ToolSpec};
use tracing::warn;

pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name();
        if self.tools.iter().any(|t| t.name() == name) {
            panic!("tool '{name}' registered twice");
        }
        self.tools.push(tool);
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: ToolName) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    // Always answers with a ToolResult so the conversation can continue.
    pub async fn dispatch(&self, call: &ToolCall, sink: &ReplySink) -> ToolResult {
        let Some(name) = ToolName::parse(&call.name) else {
            warn!(tool = %call.name, "model requested an unknown tool");
            return ToolResult::error(
                call.id.clone(),
                format!("Tool '{}' not found", call.name),
            );
        };

        let Some(tool) = self.get(name) else {
            warn!(tool = %name, "tool is not registered");
            return ToolResult::error(call.id.clone(), format!("Tool '{name}' not found"));
        };

        let args = match &call.arguments {
            serde_json::Value::String(raw) => match serde_json::from_str(raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(tool = %name, error = %e, "tool arguments were not valid JSON");
                    return ToolResult::error(
                        call.id.clone(),
                        format!("Tool arguments were not valid JSON: {e}"),
                    );
                }
            },
            other => other.clone(),
        };

        match tool.execute(args, sink).await {
            Ok(payload) => ToolResult::ok(call.id.clone(), payload),
            Err(e) => {
                warn!(tool = %name, error = %e, "tool execution failed");
                ToolResult::error(call.id.clone(), format!("Execution failed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::PartyStore;
    use crate::tools::{CharacterSheetTool, DiceRollTool};
    use serde_json::json;
    use std::sync::Arc;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    fn dice_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(DiceRollTool));
        registry
    }

    #[tokio::test]
    async fn dispatch_runs_a_registered_tool() {
        let (sink, _rx) = ReplySink::channel(8);
        // A one-sided die makes the payload deterministic.
        let result = dice_registry()
            .dispatch(&call("roll_dice", json!({"sides": 1})), &sink)
            .await;

        assert!(result.success);
        assert_eq!(result.tool_call_id, "call_1");
        assert_eq!(result.payload, r#"{"rolls":[1]}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failure_result() {
        let (sink, _rx) = ReplySink::channel(8);
        let result = dice_registry()
            .dispatch(&call("fireball", json!({})), &sink)
            .await;

        assert!(!result.success);
        assert_eq!(result.tool_call_id, "call_1");
        assert!(result.payload.contains("'fireball' not found"));
    }

    #[tokio::test]
    async fn known_but_unregistered_tool_is_a_failure_result() {
        let (sink, _rx) = ReplySink::channel(8);
        let result = dice_registry()
            .dispatch(
                &call("get_character_sheet", json!({"character_name": "x"})),
                &sink,
            )
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("not found"));
    }

    #[tokio::test]
    async fn json_string_arguments_are_parsed() {
        let (sink, _rx) = ReplySink::channel(8);
        let result = dice_registry()
            .dispatch(&call("roll_dice", json!(r#"{"sides": 1}"#)), &sink)
            .await;

        assert!(result.success);
        assert_eq!(result.payload, r#"{"rolls":[1]}"#);
    }

    #[tokio::test]
    async fn malformed_string_arguments_are_a_failure_result() {
        let (sink, _rx) = ReplySink::channel(8);
        let result = dice_registry()
            .dispatch(&call("roll_dice", json!("sides: 1")), &sink)
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("not valid JSON"));
    }

    #[tokio::test]
    async fn mistyped_arguments_are_a_failure_result() {
        let (sink, _rx) = ReplySink::channel(8);
        let registry = dice_registry();
        let shapes = [
            json!(null),
            json!(42),
            json!(6.5),
            json!(true),
            json!([1, 2]),
            json!(r#""a bare string""#),
            json!(r#"{"sides": -5}"#),
            json!({"sides": -5}),
            json!({"sides": 6.5}),
        ];

        for args in shapes {
            let result = registry
                .dispatch(&call("roll_dice", args.clone()), &sink)
                .await;
            assert!(!result.success, "arguments {args} should fail");
            assert_eq!(result.tool_call_id, "call_1");
        }
    }

    #[tokio::test]
    async fn handler_error_becomes_a_failure_result() {
        let (sink, _rx) = ReplySink::channel(8);
        let result = dice_registry()
            .dispatch(&call("roll_dice", json!({"sides": 0})), &sink)
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("Execution failed"));
    }

    #[tokio::test]
    async fn tool_replies_pass_through_the_sink() {
        let (sink, mut rx) = ReplySink::channel(8);
        let result = dice_registry()
            .dispatch(&call("roll_dice", json!({"sides": 1, "times": 2})), &sink)
            .await;
        drop(sink);

        assert!(result.success);
        assert_eq!(rx.recv().await.unwrap(), "2d1 -> 1 1");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let mut registry = dice_registry();
        registry.register(Box::new(DiceRollTool));
    }

    #[test]
    fn specs_cover_registered_tools() {
        let mut registry = dice_registry();
        registry.register(Box::new(CharacterSheetTool::new(Arc::new(
            PartyStore::demo(),
        ))));

        let specs = registry.specs();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["roll_dice", "get_character_sheet"]);
        assert!(specs.iter().all(|s| s.input_schema.is_object()));
    }
}
