use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::sim::{Ability, ActorView, Dice, RollReport, Stat};
use crate::tables::{Table, TableError, TableStore};

/// Lock difficulty that no pick or bash attempt can beat.
pub const UNPICKABLE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSystem {
    /// Flat percentile skills.
    #[default]
    Classic,
    /// Trained skills, d20 checks and ability modifiers.
    ThirdEdition,
}

impl FromStr for RuleSystem {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" | "2e" | "adnd" => Ok(RuleSystem::Classic),
            "3e" | "3ed" | "third" | "thirdedition" => Ok(RuleSystem::ThirdEdition),
            other => Err(format!("unknown rule system \"{other}\"")),
        }
    }
}

impl fmt::Display for RuleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSystem::Classic => write!(f, "classic"),
            RuleSystem::ThirdEdition => write!(f, "3e"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpAward {
    Lockpick,
    Disarm,
}

impl XpAward {
    fn row(self) -> usize {
        match self {
            XpAward::Lockpick => 0,
            XpAward::Disarm => 1,
        }
    }
}

/// `xpbonus.2da`: one row per award kind, one column per level.
#[derive(Debug, Clone, Default)]
pub struct XpBonusTable {
    table: Option<Rc<Table>>,
}

impl XpBonusTable {
    pub fn new(table: Rc<Table>) -> Self {
        Self { table: Some(table) }
    }

    /// Levels past the last column use the last column.
    pub fn bonus(&self, award: XpAward, level: u32) -> i64 {
        let Some(table) = &self.table else {
            return 0;
        };
        let levels = table.column_names_count();
        if levels == 0 {
            return 0;
        }
        let column = (level.max(1) as usize).min(levels) - 1;
        table.query_field_signed(award.row(), column)
    }
}

/// `strmod.2da` and `strmodex.2da`, indexed by strength score and by
/// exceptional strength percentile.
#[derive(Debug, Clone, Default)]
pub struct StrengthTable {
    base: Option<Rc<Table>>,
    exceptional: Option<Rc<Table>>,
}

impl StrengthTable {
    const BEND_BARS: usize = 2;
    const MAX_SCORE: i32 = 25;

    pub fn new(base: Rc<Table>, exceptional: Option<Rc<Table>>) -> Self {
        Self {
            base: Some(base),
            exceptional,
        }
    }

    fn bonus(&self, column: usize, score: i32, exceptional: i32) -> i32 {
        let score = score.clamp(0, Self::MAX_SCORE) as usize;
        let exceptional = exceptional.clamp(0, 100) as usize;
        let base = self
            .base
            .as_ref()
            .map_or(0, |table| table.query_field_signed(score, column));
        let extra = self
            .exceptional
            .as_ref()
            .map_or(0, |table| table.query_field_signed(exceptional, column));
        (base + extra) as i32
    }

    /// Bend bars / lift gates bonus, used to bash locks.
    pub fn bend_bars(&self, score: i32, exceptional: i32) -> i32 {
        self.bonus(Self::BEND_BARS, score, exceptional)
    }
}

/// Session-wide rule selection. Chosen once from the game profile and
/// passed to every lock and trap resolution.
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    pub system: RuleSystem,
    /// Planescape-style doors: the OPEN bit means closed, opening does not
    /// unlock and keys are never consumed.
    pub reverse_doors: bool,
    pub xp_bonus: XpBonusTable,
    pub strength: StrengthTable,
}

impl Ruleset {
    pub fn new(system: RuleSystem, reverse_doors: bool) -> Self {
        Self {
            system,
            reverse_doors,
            ..Self::default()
        }
    }

    /// Loads the bonus tables. Missing tables leave their bonuses at zero.
    pub fn load(
        store: &TableStore,
        system: RuleSystem,
        reverse_doors: bool,
    ) -> Result<Self, TableError> {
        let xp_bonus = store
            .load_optional("xpbonus")?
            .map(XpBonusTable::new)
            .unwrap_or_default();
        let strength = match store.load_optional("strmod")? {
            Some(base) => StrengthTable::new(base, store.load_optional("strmodex")?),
            None => StrengthTable::default(),
        };
        Ok(Self {
            system,
            reverse_doors,
            xp_bonus,
            strength,
        })
    }

    pub fn is_third_edition(&self) -> bool {
        self.system == RuleSystem::ThirdEdition
    }
}

/// Rolls `count` dice one at a time, shifting each by `luck` and clamping
/// it to the die's faces, then adds `bonus`.
pub fn lucky_roll(dice: &mut dyn Dice, count: u32, sides: u32, bonus: i32, luck: i32) -> i32 {
    if count == 0 || sides == 0 {
        return (bonus + luck).max(1);
    }
    if luck == 0 {
        return dice.roll(count, sides, bonus);
    }
    let mut total = bonus;
    for _ in 0..count {
        let roll = dice.roll(1, sides, 0) + luck;
        total += roll.clamp(1, sides as i32);
    }
    total
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickLockCheck {
    pub score: i32,
    pub report: Option<RollReport>,
}

impl PickLockCheck {
    pub fn succeeds(&self, difficulty: u32) -> bool {
        difficulty != UNPICKABLE && i64::from(self.score) >= i64::from(difficulty)
    }
}

pub fn pick_lock_check(system: RuleSystem, actor: &dyn ActorView, difficulty: u32) -> PickLockCheck {
    let stat = actor.stat(Stat::Lockpicking);
    match system {
        RuleSystem::Classic => PickLockCheck {
            score: stat,
            report: None,
        },
        RuleSystem::ThirdEdition if actor.skill(Stat::Lockpicking) == 0 => PickLockCheck {
            score: 0,
            report: None,
        },
        RuleSystem::ThirdEdition => {
            let percent = stat * 7;
            let dexterity_bonus = actor.ability_bonus(Ability::Dexterity);
            PickLockCheck {
                score: percent + dexterity_bonus,
                report: Some(RollReport::PickLock {
                    skill: percent,
                    difficulty,
                    dexterity_bonus,
                }),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BashCheck {
    pub roll: i32,
    pub bonus: i32,
}

impl BashCheck {
    pub fn succeeds(&self, difficulty: u32) -> bool {
        difficulty != UNPICKABLE && i64::from(self.roll) >= i64::from(difficulty)
    }

    pub fn report(&self, difficulty: u32) -> RollReport {
        RollReport::Bash {
            roll: self.roll,
            strength_bonus: self.bonus,
            difficulty,
        }
    }
}

pub fn bash_check(ruleset: &Ruleset, actor: &dyn ActorView, dice: &mut dyn Dice) -> BashCheck {
    let luck = actor.stat(Stat::Luck);
    match ruleset.system {
        RuleSystem::ThirdEdition => {
            let bonus = actor.ability_bonus(Ability::Strength);
            BashCheck {
                roll: lucky_roll(dice, 1, 100, bonus, luck),
                bonus,
            }
        }
        RuleSystem::Classic => {
            let bonus = ruleset.strength.bend_bars(
                actor.stat(Stat::Strength),
                actor.stat(Stat::StrengthExtra),
            );
            BashCheck {
                roll: lucky_roll(dice, 1, 10, bonus, luck),
                bonus,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisarmCheck {
    pub skill: i32,
    pub roll: i32,
    pub bonus: i32,
    pub dc: i32,
}

impl DisarmCheck {
    pub fn succeeds(&self) -> bool {
        self.skill + self.roll + self.bonus > self.dc
    }

    pub fn report(&self) -> RollReport {
        RollReport::Disarm {
            roll: self.roll,
            skill: self.skill - self.bonus,
            intelligence_bonus: self.bonus,
            dc: self.dc,
        }
    }
}

pub fn disarm_check(
    system: RuleSystem,
    actor: &dyn ActorView,
    dice: &mut dyn Dice,
    removal_difficulty: u32,
) -> DisarmCheck {
    let removal = i32::try_from(removal_difficulty).unwrap_or(i32::MAX);
    match system {
        RuleSystem::Classic => {
            let half = actor.stat(Stat::Traps) / 2;
            DisarmCheck {
                skill: half,
                roll: dice.roll(1, half.max(0) as u32, 0),
                bonus: 0,
                dc: removal,
            }
        }
        RuleSystem::ThirdEdition => {
            let skill = actor.skill(Stat::Traps);
            let roll = dice.roll(1, 20, 0);
            let bonus = actor.ability_bonus(Ability::Intelligence);
            // Untrained characters can never disarm.
            let dc = if skill == 0 { 100 } else { removal / 7 + 10 };
            DisarmCheck {
                skill,
                roll,
                bonus,
                dc,
            }
        }
    }
}
