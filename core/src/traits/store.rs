use crate::party::CharacterSheet;

pub trait CharacterStore: Send + Sync {
    fn lookup(&self, name: &str) -> Option<CharacterSheet>;

    fn roster(&self) -> Vec<String>;
}
