pub mod settings;
pub mod skills;

pub use settings::{DodgeSettings, GameSettings};
pub use skills::{SkillBook, SkillData};
