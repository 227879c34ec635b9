pub mod agent;
pub mod config;
pub mod party;
pub mod providers;
pub mod tools;
pub mod traits;

pub use agent::{AgentLoop, PromptBuilder, ReplySink, ToolRegistry};
pub use config::*;
pub use party::{AbilityScore, CharacterClass, CharacterSheet, PartyStore, demo_party, save_party};
pub use providers::*;
pub use tools::*;
pub use traits::*;
