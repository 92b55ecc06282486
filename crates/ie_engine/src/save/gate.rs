use tracing::info;

use crate::door::Point;
use crate::sim::{Feedback, GuiColor, MessageKey, OVERLAY_TICKS};

/// Radius around the party leader checked for actors about to interrupt.
pub const NO_INTERRUPT_RADIUS: u32 = 15;

/// What the gate needs to know about one party member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyMemberState {
    pub position: Point,
    /// In a no-save or mindless state.
    pub helpless: bool,
    pub in_current_area: bool,
    pub enemy_near: bool,
}

/// Snapshot queries against the running game.
pub trait SaveGateView {
    fn in_cutscene(&self) -> bool;
    fn store_open(&self) -> bool;
    fn has_game_control(&self) -> bool;
    fn in_dialog(&self) -> bool;
    fn has_game(&self) -> bool;
    fn in_combat(&self) -> bool;
    fn has_current_area(&self) -> bool;
    fn projectile_count(&self) -> usize;
    fn area_no_save(&self) -> bool;
    fn party(&self) -> Vec<PartyMemberState>;
    /// Any live actor flagged no-interrupt within `radius` of `point`.
    fn no_interrupt_actor_near(&self, point: Point, radius: u32) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveBlocker {
    Cutscene,
    StoreOpen,
    NoGameControl,
    Dialog,
    NoGame,
    Combat,
    NoArea,
    AreaNoSave,
    PartyHelpless,
    PartyScattered,
    EnemiesNearby,
    InterruptPending,
}

impl SaveBlocker {
    pub fn code(self) -> i32 {
        match self {
            SaveBlocker::Cutscene | SaveBlocker::StoreOpen => 1,
            SaveBlocker::NoGameControl | SaveBlocker::NoGame | SaveBlocker::NoArea => -1,
            SaveBlocker::Dialog => 2,
            SaveBlocker::Combat => 3,
            SaveBlocker::AreaNoSave => 4,
            SaveBlocker::PartyHelpless => 5,
            SaveBlocker::PartyScattered => 6,
            SaveBlocker::EnemiesNearby => 7,
            SaveBlocker::InterruptPending => 8,
        }
    }

    pub fn message(self) -> MessageKey {
        match self {
            SaveBlocker::StoreOpen => MessageKey::CantSaveStore,
            SaveBlocker::Dialog => MessageKey::CantSaveDialog,
            SaveBlocker::Combat => MessageKey::CantSaveCombat,
            SaveBlocker::PartyHelpless => MessageKey::CantSaveNoControl,
            SaveBlocker::EnemiesNearby => MessageKey::CantSaveMonsters,
            SaveBlocker::InterruptPending => MessageKey::CantSaveDialog2,
            SaveBlocker::Cutscene
            | SaveBlocker::NoGameControl
            | SaveBlocker::NoGame
            | SaveBlocker::NoArea
            | SaveBlocker::AreaNoSave
            | SaveBlocker::PartyScattered => MessageKey::CantSave,
        }
    }
}

/// The first condition that forbids saving, checked in a fixed order.
pub fn save_blocker(view: &dyn SaveGateView, feedback: &mut dyn Feedback) -> Option<SaveBlocker> {
    if view.in_cutscene() {
        return Some(SaveBlocker::Cutscene);
    }
    if view.store_open() {
        return Some(SaveBlocker::StoreOpen);
    }
    if !view.has_game_control() {
        return Some(SaveBlocker::NoGameControl);
    }
    if view.in_dialog() {
        return Some(SaveBlocker::Dialog);
    }
    if !view.has_game() {
        return Some(SaveBlocker::NoGame);
    }
    if view.in_combat() {
        return Some(SaveBlocker::Combat);
    }
    if !view.has_current_area() {
        return Some(SaveBlocker::NoArea);
    }

    // Lingering area effects get a warning but do not block the save.
    if view.projectile_count() > 0 {
        feedback.display_constant_string(MessageKey::CantSave, GuiColor::XpChange);
    }

    if view.area_no_save() {
        return Some(SaveBlocker::AreaNoSave);
    }

    let party = view.party();
    for member in party.iter().rev() {
        if member.helpless {
            return Some(SaveBlocker::PartyHelpless);
        }
        if !member.in_current_area {
            return Some(SaveBlocker::PartyScattered);
        }
        if member.enemy_near {
            return Some(SaveBlocker::EnemiesNearby);
        }
    }

    if let Some(leader) = party.first() {
        if view.no_interrupt_actor_near(leader.position, NO_INTERRUPT_RADIUS) {
            return Some(SaveBlocker::InterruptPending);
        }
    }
    None
}

/// Runs the gate and reports a blocker through the message log and the
/// overlay. Returns the blocker so callers can stop before touching disk.
pub fn can_save(view: &dyn SaveGateView, feedback: &mut dyn Feedback) -> Option<SaveBlocker> {
    let blocker = save_blocker(view, feedback)?;
    let message = blocker.message();
    feedback.display_constant_string(message, GuiColor::XpChange);
    feedback.set_overlay_text(message, OVERLAY_TICKS);
    info!(blocker = ?blocker, code = blocker.code(), "save_blocked");
    Some(blocker)
}
