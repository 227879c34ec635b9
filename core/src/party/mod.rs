pub mod sheet;
pub mod store;

pub use sheet::{AbilityScore, CharacterClass, CharacterSheet};
pub use store::{PartyStore, demo_party, save_party};
