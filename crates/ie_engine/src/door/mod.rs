mod area;
mod cursor;
mod flags;
mod geometry;
mod pathmap;
mod rules;
mod state;
mod trap;

pub use area::{DoorArea, DoorContext};
pub use cursor::{Cursor, TargetMode};
pub use flags::DoorFlags;
pub use geometry::{DoorTrigger, Point, Polygon, Region, WallGroup, WallPolygon};
pub use pathmap::{cell_origin, PathMapFlags, SearchMap, CELL_HEIGHT, CELL_WIDTH};
pub use rules::{
    bash_check, disarm_check, lucky_roll, pick_lock_check, BashCheck, DisarmCheck,
    PickLockCheck, RuleSystem, Ruleset, StrengthTable, XpAward, XpBonusTable, UNPICKABLE,
};
pub use state::{Door, DoorSounds};
pub use trap::TrapState;
