use crate::agent::ReplySink;
use crate::traits::{CharacterStore, Tool, ToolName};
use anyhow::bail;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SheetLookupInput {
    character_name: String,
}

pub struct CharacterSheetTool {
    store: Arc<dyn CharacterStore>,
}

impl CharacterSheetTool {
    pub fn new(store: Arc<dyn CharacterStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CharacterSheetTool {
    fn name(&self) -> ToolName {
        ToolName::GetCharacterSheet
    }

    fn description(&self) -> &str {
        "Get the full character sheet for a member of the party."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "character_name": {
                    "type": "string",
                    "enum": self.store.roster(),
                    "description": "Name of the character to get the character sheet for."
                }
            },
            "required": ["character_name"]
        })
    }

    async fn execute(&self, args: serde_json::Value, _sink: &ReplySink) -> anyhow::Result<String> {
        let input: SheetLookupInput = serde_json::from_value(args)?;
        match self.store.lookup(&input.character_name) {
            Some(sheet) => Ok(serde_json::to_string_pretty(&sheet)?),
            None => bail!("character '{}' not found in the party", input.character_name),
        }
    }
}
