use std::fmt;

use crate::door::Point;

/// Global id of any scriptable object (actor, door, container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ScriptableId(pub u32);

impl fmt::Display for ScriptableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Lockpicking,
    Traps,
    Strength,
    StrengthExtra,
    Luck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    Strength,
    Dexterity,
    Intelligence,
}

pub trait ActorView {
    fn global_id(&self) -> ScriptableId;

    /// Modified stat value.
    fn stat(&self, stat: Stat) -> i32;

    /// Trained skill value. Zero means untrained.
    fn skill(&self, stat: Stat) -> i32;

    fn ability_bonus(&self, ability: Ability) -> i32;

    /// Level used for experience awards.
    fn xp_level(&self) -> u32;

    fn face(&mut self, target: Point);

    fn has_item(&self, resref: &str) -> bool;

    fn remove_item(&mut self, resref: &str);
}
