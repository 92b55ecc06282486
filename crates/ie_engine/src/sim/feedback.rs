use super::actor::ScriptableId;
use super::strings::StrRef;

/// How long overlay text stays on screen, in game ticks.
pub const OVERLAY_TICKS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiColor {
    LightGrey,
    XpChange,
}

/// Stock messages. Each maps to a row of the `strings` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    DoorNoPick,
    LockpickFailed,
    LockpickDone,
    DoorBashFail,
    DoorBashDone,
    DisarmDone,
    DisarmFail,
    CantSave,
    CantSaveStore,
    CantSaveDialog,
    CantSaveCombat,
    CantSaveNoControl,
    CantSaveMonsters,
    CantSaveDialog2,
    SaveSucceed,
    QuickSaveSucceed,
    Day,
    Days,
    Hour,
    Hours,
}

impl MessageKey {
    pub const ALL: [MessageKey; 20] = [
        MessageKey::DoorNoPick,
        MessageKey::LockpickFailed,
        MessageKey::LockpickDone,
        MessageKey::DoorBashFail,
        MessageKey::DoorBashDone,
        MessageKey::DisarmDone,
        MessageKey::DisarmFail,
        MessageKey::CantSave,
        MessageKey::CantSaveStore,
        MessageKey::CantSaveDialog,
        MessageKey::CantSaveCombat,
        MessageKey::CantSaveNoControl,
        MessageKey::CantSaveMonsters,
        MessageKey::CantSaveDialog2,
        MessageKey::SaveSucceed,
        MessageKey::QuickSaveSucceed,
        MessageKey::Day,
        MessageKey::Days,
        MessageKey::Hour,
        MessageKey::Hours,
    ];

    pub fn row_name(self) -> &'static str {
        match self {
            MessageKey::DoorNoPick => "DOOR_NOPICK",
            MessageKey::LockpickFailed => "LOCKPICK_FAILED",
            MessageKey::LockpickDone => "LOCKPICK_DONE",
            MessageKey::DoorBashFail => "DOORBASH_FAIL",
            MessageKey::DoorBashDone => "DOORBASH_DONE",
            MessageKey::DisarmDone => "DISARM_DONE",
            MessageKey::DisarmFail => "DISARM_FAIL",
            MessageKey::CantSave => "CANTSAVE",
            MessageKey::CantSaveStore => "CANTSAVESTORE",
            MessageKey::CantSaveDialog => "CANTSAVEDIALOG",
            MessageKey::CantSaveCombat => "CANTSAVECOMBAT",
            MessageKey::CantSaveNoControl => "CANTSAVENOCTRL",
            MessageKey::CantSaveMonsters => "CANTSAVEMONS",
            MessageKey::CantSaveDialog2 => "CANTSAVEDIALOG2",
            MessageKey::SaveSucceed => "SAVESUCCEED",
            MessageKey::QuickSaveSucceed => "QSAVESUCCEED",
            MessageKey::Day => "DAY",
            MessageKey::Days => "DAYS",
            MessageKey::Hour => "HOUR",
            MessageKey::Hours => "HOURS",
        }
    }

    /// English text used when no string table entry is available.
    pub fn fallback_text(self) -> &'static str {
        match self {
            MessageKey::DoorNoPick => "This lock cannot be picked.",
            MessageKey::LockpickFailed => "Lock pick failed.",
            MessageKey::LockpickDone => "Lock picked.",
            MessageKey::DoorBashFail => "Bash failed.",
            MessageKey::DoorBashDone => "Lock bashed open.",
            MessageKey::DisarmDone => "Trap disarmed.",
            MessageKey::DisarmFail => "Disarm failed.",
            MessageKey::CantSave => "You cannot save at this time.",
            MessageKey::CantSaveStore => "You cannot save while trading.",
            MessageKey::CantSaveDialog => "You cannot save during a conversation.",
            MessageKey::CantSaveCombat => "You cannot save during combat.",
            MessageKey::CantSaveNoControl => "You cannot save while a party member is helpless.",
            MessageKey::CantSaveMonsters => "You cannot save with enemies nearby.",
            MessageKey::CantSaveDialog2 => "You cannot save, someone wants to talk to you.",
            MessageKey::SaveSucceed => "Game saved.",
            MessageKey::QuickSaveSucceed => "Quick save complete.",
            MessageKey::Day => "<GAMEDAYS> day",
            MessageKey::Days => "<GAMEDAYS> days",
            MessageKey::Hour => "<HOUR> hour",
            MessageKey::Hours => "<HOUR> hours",
        }
    }
}

/// Arguments of a displayed dice check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollReport {
    /// Skill percentage against the lock difficulty.
    PickLock {
        skill: i32,
        difficulty: u32,
        dexterity_bonus: i32,
    },
    Bash {
        roll: i32,
        strength_bonus: i32,
        difficulty: u32,
    },
    Disarm {
        roll: i32,
        skill: i32,
        intelligence_bonus: i32,
        dc: i32,
    },
}

/// The message log and overlay text surface.
pub trait Feedback {
    fn display_constant_string(&mut self, key: MessageKey, color: GuiColor);

    /// Message attributed to a speaker.
    fn display_constant_string_name(
        &mut self,
        key: MessageKey,
        color: GuiColor,
        speaker: ScriptableId,
    );

    fn display_string_name(&mut self, strref: StrRef, color: GuiColor, speaker: ScriptableId);

    fn display_roll(&mut self, report: RollReport, color: GuiColor, speaker: ScriptableId);

    fn set_overlay_text(&mut self, key: MessageKey, ticks: u32);
}
