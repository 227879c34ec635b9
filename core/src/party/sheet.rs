use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScore {
    pub score: u8,
    pub proficient: bool,
}

impl Default for AbilityScore {
    fn default() -> Self {
        Self {
            score: 10,
            proficient: false,
        }
    }
}

impl AbilityScore {
    pub fn new(score: u8) -> Self {
        Self {
            score,
            proficient: false,
        }
    }

    pub fn proficient(score: u8) -> Self {
        Self {
            score,
            proficient: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub class_name: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub name: String,
    pub race: String,
    pub gender: String,
    #[serde(default = "default_level")]
    pub total_character_level: u8,
    pub classes: Vec<CharacterClass>,
    pub strength: AbilityScore,
    pub dexterity: AbilityScore,
    pub constitution: AbilityScore,
    pub intelligence: AbilityScore,
    pub wisdom: AbilityScore,
    pub charisma: AbilityScore,
    #[serde(default)]
    pub skill_proficiencies: Vec<String>,
    #[serde(default)]
    pub weapon_proficiencies: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

fn default_level() -> u8 {
    1
}

impl CharacterSheet {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("character name must not be empty");
        }
        if self.race.trim().is_empty() {
            bail!("race must not be empty");
        }
        if !(1..=30).contains(&self.total_character_level) {
            bail!(
                "total character level {} out of range 1..=30",
                self.total_character_level
            );
        }
        for class in &self.classes {
            if class.class_name.trim().is_empty() {
                bail!("class name must not be empty");
            }
            if !(1..=20).contains(&class.level) {
                bail!(
                    "{} level {} out of range 1..=20",
                    class.class_name,
                    class.level
                );
            }
        }
        for (ability, value) in self.abilities() {
            if !(1..=30).contains(&value.score) {
                bail!("{} score {} out of range 1..=30", ability, value.score);
            }
        }
        Ok(())
    }

    pub fn abilities(&self) -> [(&'static str, AbilityScore); 6] {
        [
            ("strength", self.strength),
            ("dexterity", self.dexterity),
            ("constitution", self.constitution),
            ("intelligence", self.intelligence),
            ("wisdom", self.wisdom),
            ("charisma", self.charisma),
        ]
    }

    pub fn class_summary(&self) -> String {
        let classes: Vec<String> = self
            .classes
            .iter()
            .map(|c| format!("{} {}", c.class_name, c.level))
            .collect();
        classes.join(" / ")
    }
}
