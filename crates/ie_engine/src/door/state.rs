use std::fmt::Write as _;
use std::rc::Rc;

use tracing::debug;

use super::area::{DoorArea, DoorContext};
use super::cursor::{Cursor, TargetMode};
use super::flags::DoorFlags;
use super::geometry::{DoorTrigger, Point, Polygon, Region};
use super::pathmap::{cell_origin, PathMapFlags, SearchMap, CELL_HEIGHT, CELL_WIDTH};
use super::rules::{bash_check, disarm_check, pick_lock_check, Ruleset, XpAward, UNPICKABLE};
use super::trap::TrapState;
use crate::sim::{
    ActorView, AutopauseReason, DefaultSound, EventFlag, GuiColor, MessageKey, ScriptableId,
    StrRef, TriggerEntry, TriggerKind,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoorSounds {
    pub open: Option<String>,
    pub close: Option<String>,
    pub lock: Option<String>,
    pub unlock: Option<String>,
}

#[derive(Debug)]
pub struct Door {
    /// Short resource name, not the scripting name.
    pub id: String,
    pub script_name: String,
    pub global_id: ScriptableId,
    pub flags: DoorFlags,
    pub lock_difficulty: u32,
    pub trap: TrapState,
    pub discovery_difficulty: u32,
    pub sounds: DoorSounds,
    pub linked_info: Option<String>,
    pub key: Option<String>,
    pub dialog: Option<String>,
    /// Shown instead of the stock message when the lock is unpickable.
    pub cannot_pick_text: Option<StrRef>,
    pub cursor: Cursor,
    pub open_bbox: Region,
    pub closed_bbox: Region,
    /// Search map cells covered by the open leaf.
    pub open_impeded: Vec<Point>,
    /// Search map cells covered by the closed leaf.
    pub closed_impeded: Vec<Point>,
    tiles: Vec<u16>,
    closed_index: u8,
    trigger: DoorTrigger,
    position: Point,
}

impl Door {
    pub fn new(id: impl Into<String>, global_id: ScriptableId, trigger: DoorTrigger) -> Self {
        let id = id.into();
        Self {
            script_name: id.clone(),
            id,
            global_id,
            flags: DoorFlags::empty(),
            lock_difficulty: 0,
            trap: TrapState::default(),
            discovery_difficulty: 0,
            sounds: DoorSounds::default(),
            linked_info: None,
            key: None,
            dialog: None,
            cannot_pick_text: None,
            cursor: Cursor::DOOR,
            open_bbox: Region::default(),
            closed_bbox: Region::default(),
            open_impeded: Vec::new(),
            closed_impeded: Vec::new(),
            tiles: Vec::new(),
            closed_index: 0,
            trigger,
            position: Point::default(),
        }
    }

    /// Overlay tiles this door swaps, and the tile index used while closed.
    pub fn set_tiles(&mut self, tiles: Vec<u16>, closed_index: u8) {
        self.tiles = tiles;
        self.closed_index = closed_index;
    }

    pub fn tiles(&self) -> &[u16] {
        &self.tiles
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn trigger(&self) -> &DoorTrigger {
        &self.trigger
    }

    pub fn open_trigger_area(&self) -> Option<&Rc<Polygon>> {
        self.trigger.polygon_for(true)
    }

    pub fn closed_trigger_area(&self) -> Option<&Rc<Polygon>> {
        self.trigger.polygon_for(false)
    }

    /// Brings tiles, geometry and the search map in line with the stored
    /// flags. Called once the door is placed in its area.
    pub fn attach(&mut self, rules: &Ruleset, area: &mut dyn DoorArea) {
        let open = self.is_open(rules);
        self.apply_tiles(open, rules, area);
        self.update_door(area);
    }

    pub fn is_open(&self, rules: &Ruleset) -> bool {
        self.flags.contains(DoorFlags::OPEN) != rules.reverse_doors
    }

    pub fn is_locked(&self) -> bool {
        self.flags.contains(DoorFlags::LOCKED)
    }

    /// Not secret, or secret and already found, and not hidden.
    pub fn visible(&self) -> bool {
        (!self.flags.contains(DoorFlags::SECRET) || self.flags.contains(DoorFlags::FOUND))
            && !self.flags.contains(DoorFlags::HIDDEN)
    }

    pub fn can_detect_trap(&self) -> bool {
        self.flags.contains(DoorFlags::DETECTABLE) && self.trap.trapped
    }

    pub fn visible_trap(&self) -> bool {
        self.can_detect_trap() && self.trap.detected
    }

    pub fn hit_test(&self, point: Point) -> bool {
        if self.flags.contains(DoorFlags::HIDDEN) {
            return false;
        }
        match self.trigger.state_polygon() {
            Some(polygon) => polygon.point_in(point),
            None if self.flags.contains(DoorFlags::OPEN) => self.open_bbox.point_inside(point),
            None => self.closed_bbox.point_inside(point),
        }
    }

    /// Flags actors standing on the target state's cells for displacement.
    /// Returns whether any of them blocks the transition.
    pub fn blocked_open(&self, open: bool, force: bool, area: &mut dyn DoorArea) -> bool {
        let cells = if open {
            &self.open_impeded
        } else {
            &self.closed_impeded
        };

        let mut blocked = false;
        for &cell in cells {
            if !area.search_map().query(cell).intersects(PathMapFlags::ACTOR) {
                continue;
            }
            let origin = cell_origin(cell);
            let region = Region::new(origin.x, origin.y, CELL_WIDTH, CELL_HEIGHT);
            for actor in area.actors_in_rect(region) {
                if area.do_not_jump(actor) {
                    continue;
                }
                area.mark_for_jump(actor);
                blocked = true;
            }
        }

        if self.flags.contains(DoorFlags::SLIDE) || force {
            return false;
        }
        blocked
    }

    pub fn set_door_open(
        &mut self,
        open: bool,
        play_sound: bool,
        opener: ScriptableId,
        emit_trigger: bool,
        ctx: &mut DoorContext<'_>,
    ) {
        if play_sound {
            // Actors are pushed out of the way when opening, but they keep
            // a door from closing on them.
            if self.blocked_open(open, false, ctx.area) && !open {
                ctx.area.jump_actors(false);
                debug!(door = %self.id, "door_close_blocked");
                return;
            }
            ctx.area.jump_actors(true);
        }

        let kind = match (open, self.trap.trapped) {
            (true, true) => TriggerKind::Opened,
            (true, false) => TriggerKind::HarmlessOpened,
            (false, true) => TriggerKind::Closed,
            (false, false) => TriggerKind::HarmlessClosed,
        };
        if emit_trigger {
            ctx.triggers
                .add_trigger(self.global_id, TriggerEntry::new(kind, opener));
        }
        if open && !ctx.rules.reverse_doors {
            self.set_door_locked(false, play_sound, ctx);
        }

        self.toggle_tiles(open, play_sound, ctx);
        self.update_door(ctx.area);
        ctx.hooks.set_event_flag(EventFlag::TargetMode);
    }

    pub fn set_door_locked(&mut self, locked: bool, play_sound: bool, ctx: &mut DoorContext<'_>) {
        if locked == self.is_locked() {
            return;
        }
        self.flags.set(DoorFlags::LOCKED, locked);

        let sound = if locked {
            if ctx.rules.reverse_doors {
                self.set_door_open(false, play_sound, ScriptableId::default(), true, ctx);
            }
            &self.sounds.lock
        } else {
            &self.sounds.unlock
        };
        if play_sound {
            if let Some(sound) = sound {
                ctx.audio.play_relative(sound);
            }
        }
    }

    fn toggle_tiles(&mut self, open: bool, play_sound: bool, ctx: &mut DoorContext<'_>) {
        if play_sound {
            let sound = if open {
                &self.sounds.open
            } else {
                &self.sounds.close
            };
            if let Some(sound) = sound {
                ctx.audio.play_relative(sound);
            }
        }
        self.apply_tiles(open, ctx.rules, ctx.area);
    }

    fn apply_tiles(&mut self, open: bool, rules: &Ruleset, area: &mut dyn DoorArea) {
        let index = if open {
            u8::from(self.closed_index == 0)
        } else {
            self.closed_index
        };
        for &tile in &self.tiles {
            area.set_overlay_tile(tile, index);
        }
        self.flags.set(DoorFlags::OPEN, open != rules.reverse_doors);
    }

    /// Syncs geometry, position, search map and the linked info point with
    /// the OPEN bit.
    fn update_door(&mut self, area: &mut dyn DoorArea) {
        let open_bit = self.flags.contains(DoorFlags::OPEN);
        self.trigger.set_state(open_bit);
        if let Some(polygon) = self.trigger.state_polygon() {
            self.position = polygon.bbox().center();
        }

        let door_bits = if self.flags.contains(DoorFlags::TRANSPARENT) {
            PathMapFlags::DOOR_IMPASSABLE
        } else {
            PathMapFlags::DOOR_OPAQUE | PathMapFlags::DOOR_IMPASSABLE
        };
        let (active, inactive) = if open_bit {
            (&self.open_impeded, &self.closed_impeded)
        } else {
            (&self.closed_impeded, &self.open_impeded)
        };
        let map = area.search_map_mut();
        impede_cells(map, inactive, PathMapFlags::IMPASSABLE);
        impede_cells(map, active, door_bits);

        if let Some(info_point) = &self.linked_info {
            area.set_info_point_door(info_point, !open_bit);
        }
    }

    pub fn set_trap_detected(&mut self, detected: bool, ctx: &mut DoorContext<'_>) {
        if self.trap.detected == detected {
            return;
        }
        self.trap.detected = detected;
        if detected {
            ctx.audio.play_default(DefaultSound::FoundSecret);
            ctx.hooks.autopause(AutopauseReason::Trap);
        }
    }

    /// Unlocks with a key from the actor's inventory. A KEY door consumes
    /// the key unless the ruleset uses reversed doors.
    pub fn try_unlock(&self, actor: &mut dyn ActorView, rules: &Ruleset) -> bool {
        if !self.is_locked() {
            return true;
        }
        let Some(key) = self.key.as_deref().filter(|key| !key.is_empty()) else {
            return false;
        };
        if !actor.has_item(key) {
            return false;
        }
        if !rules.reverse_doors && self.flags.contains(DoorFlags::KEY) {
            actor.remove_item(key);
        }
        true
    }

    pub fn try_pick_lock(&mut self, actor: &dyn ActorView, ctx: &mut DoorContext<'_>) {
        let actor_id = actor.global_id();
        if self.lock_difficulty == UNPICKABLE {
            match self.cannot_pick_text {
                Some(strref) => {
                    ctx.feedback
                        .display_string_name(strref, GuiColor::XpChange, actor_id)
                }
                None => ctx.feedback.display_constant_string_name(
                    MessageKey::DoorNoPick,
                    GuiColor::XpChange,
                    actor_id,
                ),
            }
            return;
        }

        let check = pick_lock_check(ctx.rules.system, actor, self.lock_difficulty);
        if let Some(report) = check.report {
            ctx.feedback
                .display_roll(report, GuiColor::LightGrey, actor_id);
        }
        if !check.succeeds(self.lock_difficulty) {
            ctx.feedback.display_constant_string_name(
                MessageKey::LockpickFailed,
                GuiColor::XpChange,
                actor_id,
            );
            ctx.triggers.add_trigger(
                self.global_id,
                TriggerEntry::new(TriggerKind::PickLockFailed, actor_id),
            );
            ctx.audio.play_default(DefaultSound::PickFail);
            return;
        }

        self.set_door_locked(false, true, ctx);
        ctx.hooks.reset_target_mode();
        ctx.feedback.display_constant_string_name(
            MessageKey::LockpickDone,
            GuiColor::LightGrey,
            actor_id,
        );
        ctx.triggers.add_trigger(
            self.global_id,
            TriggerEntry::new(TriggerKind::Unlocked, actor_id),
        );
        ctx.audio.play_default(DefaultSound::PickLock);
        ctx.triggers.immediate_event(self.global_id);
        let xp = ctx
            .rules
            .xp_bonus
            .bonus(XpAward::Lockpick, actor.xp_level());
        ctx.hooks.share_xp(xp);
    }

    pub fn try_bash_lock(&mut self, actor: &mut dyn ActorView, ctx: &mut DoorContext<'_>) {
        let actor_id = actor.global_id();
        let check = bash_check(ctx.rules, &*actor, ctx.dice);

        actor.face(self.position);
        if ctx.rules.is_third_edition() {
            ctx.feedback.display_roll(
                check.report(self.lock_difficulty),
                GuiColor::LightGrey,
                actor_id,
            );
        }

        if !check.succeeds(self.lock_difficulty) {
            ctx.feedback.display_constant_string_name(
                MessageKey::DoorBashFail,
                GuiColor::XpChange,
                actor_id,
            );
            return;
        }

        ctx.feedback.display_constant_string_name(
            MessageKey::DoorBashDone,
            GuiColor::LightGrey,
            actor_id,
        );
        self.set_door_locked(false, true, ctx);
        ctx.hooks.reset_target_mode();
        self.flags.insert(DoorFlags::BROKEN);
        // Bashing reports the same trigger as picking.
        ctx.triggers.add_trigger(
            self.global_id,
            TriggerEntry::new(TriggerKind::Unlocked, actor_id),
        );
        ctx.triggers.immediate_event(self.global_id);
    }

    pub fn try_disarm(&mut self, actor: &dyn ActorView, ctx: &mut DoorContext<'_>) {
        if !self.trap.trapped || !self.trap.detected {
            return;
        }

        let actor_id = actor.global_id();
        let check = disarm_check(
            ctx.rules.system,
            actor,
            ctx.dice,
            self.trap.removal_difficulty,
        );
        if check.succeeds() {
            ctx.triggers.add_trigger(
                self.global_id,
                TriggerEntry::new(TriggerKind::Disarmed, actor_id),
            );
            self.trap.disarm();
            if ctx.rules.is_third_edition() {
                ctx.feedback
                    .display_roll(check.report(), GuiColor::LightGrey, actor_id);
            }
            ctx.feedback.display_constant_string_name(
                MessageKey::DisarmDone,
                GuiColor::LightGrey,
                actor_id,
            );
            let xp = ctx.rules.xp_bonus.bonus(XpAward::Disarm, actor.xp_level());
            ctx.hooks.share_xp(xp);
            ctx.hooks.reset_target_mode();
            ctx.audio.play_default(DefaultSound::Disarmed);
        } else {
            ctx.triggers.add_trigger(
                self.global_id,
                TriggerEntry::new(TriggerKind::DisarmFailed, actor_id),
            );
            if ctx.rules.is_third_edition() {
                ctx.feedback
                    .display_roll(check.report(), GuiColor::LightGrey, actor_id);
            }
            ctx.feedback.display_constant_string_name(
                MessageKey::DisarmFail,
                GuiColor::LightGrey,
                actor_id,
            );
            self.trigger_trap(actor_id, ctx);
        }
        ctx.triggers.immediate_event(self.global_id);
    }

    /// Sets off the trap. Traps without a script have nothing to run.
    fn trigger_trap(&mut self, actor_id: ScriptableId, ctx: &mut DoorContext<'_>) -> bool {
        if !self.trap.trapped || self.trap.script.is_none() {
            return false;
        }
        ctx.triggers.add_trigger(
            self.global_id,
            TriggerEntry::new(TriggerKind::Entered, actor_id),
        );
        ctx.triggers.add_trigger(
            self.global_id,
            TriggerEntry::new(TriggerKind::TrapTriggered, actor_id),
        );
        self.trap.fire(self.flags.contains(DoorFlags::RESET))
    }

    pub fn try_detect_secret(&mut self, skill: i32, actor: ScriptableId, ctx: &mut DoorContext<'_>) {
        if self.visible() {
            return;
        }
        if i64::from(skill) > i64::from(self.discovery_difficulty) {
            self.flags.insert(DoorFlags::FOUND);
            ctx.audio.play_default(DefaultSound::FoundSecret);
            ctx.triggers.add_trigger(
                self.global_id,
                TriggerEntry::new(TriggerKind::Detected, actor),
            );
        }
    }

    /// Passive search for the trap. Beating the detection difficulty marks
    /// the trap found.
    pub fn try_detect_trap(
        &mut self,
        skill: i32,
        actor: ScriptableId,
        ctx: &mut DoorContext<'_>,
    ) -> bool {
        if !self.can_detect_trap() || self.trap.detected {
            return false;
        }
        if i64::from(skill) < i64::from(self.trap.detection_difficulty) {
            return false;
        }
        self.set_trap_detected(true, ctx);
        ctx.triggers.add_trigger(
            self.global_id,
            TriggerEntry::new(TriggerKind::TrapDetected, actor),
        );
        true
    }

    pub fn cursor(&self, target_mode: TargetMode, last_cursor: Cursor, area: &dyn DoorArea) -> Cursor {
        if !self.visible() {
            // Secret doors sit in walls, so show whatever the wall shows.
            return match target_mode {
                TargetMode::None => area.cursor_at(self.position),
                _ => last_cursor | Cursor::GRAY,
            };
        }

        if target_mode == TargetMode::Pick {
            if self.visible_trap() {
                return Cursor::TRAP;
            }
            if self.is_locked() {
                return Cursor::LOCK;
            }
            return Cursor::STEALTH | Cursor::GRAY;
        }

        self.cursor
    }

    pub fn dump(&self, rules: &Ruleset) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Debugdump of Door {}:", self.script_name);
        let _ = writeln!(out, "Door Global ID: {}", self.global_id);
        let _ = writeln!(out, "Position: {}", self.position);
        let _ = writeln!(out, "Door Open: {}", yes_no(self.is_open(rules)));
        let _ = writeln!(
            out,
            "Door Locked: {}\tDifficulty: {}",
            yes_no(self.is_locked()),
            self.lock_difficulty
        );
        let _ = writeln!(
            out,
            "Door Trapped: {}\tDifficulty: {}",
            yes_no(self.trap.trapped),
            self.trap.removal_difficulty
        );
        if self.trap.trapped {
            let _ = writeln!(
                out,
                "Trap Permanent: {} Detectable: {} (Detection difficulty: {})",
                yes_no(self.flags.contains(DoorFlags::RESET)),
                yes_no(self.flags.contains(DoorFlags::DETECTABLE)),
                self.trap.detection_difficulty
            );
        }
        let _ = writeln!(
            out,
            "Secret door: {} (Found: {})",
            yes_no(self.flags.contains(DoorFlags::SECRET)),
            yes_no(self.flags.contains(DoorFlags::FOUND))
        );
        let _ = writeln!(
            out,
            "Script: {}, Key ({}) removed: {}, Dialog: {}",
            self.trap.script.as_deref().unwrap_or("NONE"),
            self.key.as_deref().unwrap_or(""),
            yes_no(self.flags.contains(DoorFlags::KEY)),
            self.dialog.as_deref().unwrap_or("")
        );
        debug!(door = %self.id, dump = %out, "door_dump");
        out
    }
}

fn impede_cells(map: &mut SearchMap, cells: &[Point], value: PathMapFlags) {
    for &cell in cells {
        let kept = map.query(cell) & PathMapFlags::NOTDOOR;
        map.set(cell, kept | value);
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
