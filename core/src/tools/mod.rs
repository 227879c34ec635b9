pub mod character_sheet;
pub mod roll_dice;

pub use character_sheet::CharacterSheetTool;
pub use roll_dice::DiceRollTool;
