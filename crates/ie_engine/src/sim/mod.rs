//! Narrow views of the live simulation consumed by doors and the save
//! manager. The engine proper implements these; tests use recorders.

mod actor;
mod audio;
mod dice;
mod feedback;
mod hooks;
mod script;
mod strings;

pub use actor::{Ability, ActorView, ScriptableId, Stat};
pub use audio::{Audio, DefaultSound};
pub use dice::{Dice, RandDice};
pub use feedback::{Feedback, GuiColor, MessageKey, RollReport, OVERLAY_TICKS};
pub use hooks::{AutopauseReason, EventFlag, GameHooks};
pub use script::{TriggerEntry, TriggerKind, TriggerSink};
pub(crate) use strings::compile_pattern;
pub use strings::{substitute_tokens, GameText, NoStrings, StrRef, StringRefs, StringTable, Tokens};
