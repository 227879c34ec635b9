use crate::party::{AbilityScore, CharacterClass, CharacterSheet};
use crate::traits::CharacterStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
struct PartyFile {
    #[serde(default)]
    characters: Vec<CharacterSheet>,
}

#[derive(Debug)]
pub struct PartyStore {
    sheets: Vec<CharacterSheet>,
}

impl PartyStore {
    pub fn new(sheets: Vec<CharacterSheet>) -> Self {
        Self { sheets }
    }

    pub fn demo() -> Self {
        Self::new(demo_party())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read party file at {}", path.display()))?;

        let party: PartyFile = toml::from_str(&content)
            .with_context(|| format!("failed to parse party file at {}", path.display()))?;

        for sheet in &party.characters {
            sheet
                .validate()
                .with_context(|| format!("invalid character sheet for '{}'", sheet.name))?;
        }

        info!(
            count = party.characters.len(),
            path = %path.display(),
            "party loaded"
        );

        Ok(Self::new(party.characters))
    }

    pub fn load_or_demo(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "no party file found, seating the demo party");
            Ok(Self::demo())
        }
    }

    pub fn sheets(&self) -> &[CharacterSheet] {
        &self.sheets
    }
}

impl CharacterStore for PartyStore {
    fn lookup(&self, name: &str) -> Option<CharacterSheet> {
        self.sheets.iter().find(|s| s.name == name).cloned()
    }

    fn roster(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

pub fn save_party(path: &Path, sheets: &[CharacterSheet]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let party = PartyFile {
        characters: sheets.to_vec(),
    };
    let content =
        toml::to_string_pretty(&party).context("failed to serialize the party to TOML")?;

    std::fs::write(path, content)
        .with_context(|| format!("failed to write party file to {}", path.display()))?;

    Ok(())
}

pub fn demo_party() -> Vec<CharacterSheet> {
    vec![
        CharacterSheet {
            name: "Maera Thistledown".to_string(),
            race: "Lightfoot Halfling".to_string(),
            gender: "Female".to_string(),
            total_character_level: 3,
            classes: vec![CharacterClass {
                class_name: "Bard".to_string(),
                level: 3,
            }],
            strength: AbilityScore::new(8),
            dexterity: AbilityScore::proficient(16),
            constitution: AbilityScore::new(12),
            intelligence: AbilityScore::new(13),
            wisdom: AbilityScore::new(10),
            charisma: AbilityScore::proficient(16),
            skill_proficiencies: vec![
                "Acrobatics".to_string(),
                "Deception".to_string(),
                "Performance (Expertise)".to_string(),
                "Persuasion (Expertise)".to_string(),
                "Sleight of Hand".to_string(),
            ],
            weapon_proficiencies: vec![
                "Dagger".to_string(),
                "Longsword".to_string(),
                "Rapier".to_string(),
                "Shortsword".to_string(),
                "Simple Weapons".to_string(),
            ],
            other: vec![
                "Advantage on saving throws against being frightened".to_string(),
                "May reroll a 1 on an attack roll, ability check, or saving throw".to_string(),
                "Jack of All Trades".to_string(),
            ],
        },
        CharacterSheet {
            name: "Korrin Ashvale".to_string(),
            race: "Half-Orc".to_string(),
            gender: "Male".to_string(),
            total_character_level: 3,
            classes: vec![CharacterClass {
                class_name: "Fighter".to_string(),
                level: 3,
            }],
            strength: AbilityScore::proficient(17),
            dexterity: AbilityScore::new(13),
            constitution: AbilityScore::proficient(15),
            intelligence: AbilityScore::new(9),
            wisdom: AbilityScore::new(12),
            charisma: AbilityScore::new(10),
            skill_proficiencies: vec![
                "Athletics".to_string(),
                "Intimidation".to_string(),
                "Perception".to_string(),
                "Survival".to_string(),
            ],
            weapon_proficiencies: vec![
                "Martial Weapons".to_string(),
                "Simple Weapons".to_string(),
            ],
            other: vec![
                "Darkvision 60 ft.".to_string(),
                "Drops to 1 hit point instead of 0 once per long rest".to_string(),
            ],
        },
        CharacterSheet {
            name: "Elowen Hartley".to_string(),
            race: "Human".to_string(),
            gender: "Female".to_string(),
            total_character_level: 3,
            classes: vec![CharacterClass {
                class_name: "Wizard".to_string(),
                level: 3,
            }],
            strength: AbilityScore::new(9),
            dexterity: AbilityScore::new(13),
            constitution: AbilityScore::new(12),
            intelligence: AbilityScore::proficient(16),
            wisdom: AbilityScore::proficient(14),
            charisma: AbilityScore::new(11),
            skill_proficiencies: vec![
                "Arcana".to_string(),
                "History".to_string(),
                "Insight".to_string(),
                "Investigation".to_string(),
            ],
            weapon_proficiencies: vec![
                "Dagger".to_string(),
                "Light Crossbow".to_string(),
                "Quarterstaff".to_string(),
                "Sling".to_string(),
            ],
            other: vec![
                "Ritual casting".to_string(),
                "Arcane Recovery".to_string(),
            ],
        },
        CharacterSheet {
            name: "Brother Aldous".to_string(),
            race: "Hill Dwarf".to_string(),
            gender: "Male".to_string(),
            total_character_level: 3,
            classes: vec![CharacterClass {
                class_name: "Cleric".to_string(),
                level: 3,
            }],
            strength: AbilityScore::proficient(14),
            dexterity: AbilityScore::new(10),
            constitution: AbilityScore::new(15),
            intelligence: AbilityScore::new(10),
            wisdom: AbilityScore::proficient(16),
            charisma: AbilityScore::new(12),
            skill_proficiencies: vec![
                "Insight".to_string(),
                "Medicine".to_string(),
                "Persuasion".to_string(),
                "Religion".to_string(),
            ],
            weapon_proficiencies: vec![
                "Mace".to_string(),
                "Simple Weapons".to_string(),
                "Warhammer".to_string(),
            ],
            other: vec![
                "Darkvision 60 ft.".to_string(),
                "Advantage on saving throws against poison".to_string(),
                "+1 hit point per level".to_string(),
            ],
        },
    ]
}
