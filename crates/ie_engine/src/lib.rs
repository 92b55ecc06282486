//! Doors, traps and save slots for an Infinity Engine style game, plus the
//! 2DA tables they read their rules from.

pub mod config;
pub mod door;
mod fs_util;
pub mod save;
pub mod sim;
pub mod tables;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{locate_config, CfgFile, ConfigError, EngineConfig, GameProfile, CONFIG_ENV_VAR};
pub use door::{Door, DoorArea, DoorContext, DoorFlags, RuleSystem, Ruleset, TrapState};
pub use save::{
    SaveConfig, SaveContext, SaveError, SaveGame, SaveSlotManager, SaveStatus, SlotNameTable,
};
pub use sim::{GameText, MessageKey, StringRefs};
pub use tables::{Table, TableError, TableStore};
