use crate::traits::{CharacterStore, SystemBlock};
use serde_json::json;
use std::sync::Arc;

const DEFAULT_PERSONA: &str = "You are the goddess Tymora, lady of good fortune. You help run \
    a D&D 5e campaign by reading character sheets and rolling dice.\n\n\
    Before rolling dice, explain the relevant character stat and what dice you will roll, \
    but don't describe the outcomes.";

pub struct PromptBuilder {
    store: Arc<dyn CharacterStore>,
    persona: String,
}

impl PromptBuilder {
    pub fn new(store: Arc<dyn CharacterStore>) -> Self {
        Self {
            store,
            persona: DEFAULT_PERSONA.to_string(),
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    // The party block is marked cacheable, so newer blocks go after it.
    pub fn build_system_blocks(&self, character_name: Option<&str>) -> Vec<SystemBlock> {
        vec![
            SystemBlock::plain(&self.persona),
            SystemBlock::cached(self.party_context(character_name)),
            SystemBlock::plain(format!(
                "The current date is {}.",
                chrono::Local::now().format("%Y-%m-%d (%A)")
            )),
        ]
    }

    fn party_context(&self, character_name: Option<&str>) -> String {
        let party_members = json!(self.store.roster());
        let sheet = character_name.and_then(|name| self.store.lookup(name));
        match sheet {
            Some(sheet) => format!(
                "The party members are: {party_members}\n\n\
                 Here is the player's character sheet:\n{:#}",
                json!(sheet)
            ),
            None => format!("The party members are: {party_members}"),
        }
    }
}
