//! Deterministic collaborators shared by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use crate::door::{
    cell_origin, Cursor, DoorArea, DoorContext, PathMapFlags, Point, Region, RuleSystem, Ruleset,
    SearchMap, XpBonusTable,
};
use crate::save::{AreaExtractor, PartyMemberState, SaveError, SaveGame, SaveGateView, SaveWriter};
use crate::sim::{
    Ability, ActorView, Audio, AutopauseReason, DefaultSound, Dice, EventFlag, Feedback, GameHooks,
    GuiColor, MessageKey, RollReport, ScriptableId, Stat, StrRef, TriggerEntry, TriggerSink,
};
use crate::tables::Table;

const XP_TABLE: &str = "2DA V1.0\n0\n            L1 L2 L3\nXP_LOCKPICK 10 20 30\nXP_DISARM   15 30 45\n";

/// Dice that return queued values, then 1 once the queue runs dry.
#[derive(Debug, Default)]
pub(crate) struct FixedDice {
    values: VecDeque<i32>,
    calls: Vec<(u32, u32, i32)>,
}

impl FixedDice {
    pub(crate) fn new(values: Vec<i32>) -> Self {
        Self {
            values: values.into(),
            calls: Vec::new(),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(u32, u32, i32)> {
        self.calls.clone()
    }
}

impl Dice for FixedDice {
    fn roll(&mut self, count: u32, sides: u32, modifier: i32) -> i32 {
        self.calls.push((count, sides, modifier));
        self.values.pop_front().unwrap_or(1) + modifier
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StubActor {
    id: ScriptableId,
    stats: HashMap<Stat, i32>,
    skills: HashMap<Stat, i32>,
    abilities: HashMap<Ability, i32>,
    level: u32,
    items: Vec<String>,
    pub(crate) facing: Option<Point>,
}

impl Default for StubActor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl StubActor {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id: ScriptableId(id),
            stats: HashMap::new(),
            skills: HashMap::new(),
            abilities: HashMap::new(),
            level: 1,
            items: Vec::new(),
            facing: None,
        }
    }

    pub(crate) fn with_stat(mut self, stat: Stat, value: i32) -> Self {
        self.stats.insert(stat, value);
        self
    }

    pub(crate) fn with_skill(mut self, stat: Stat, value: i32) -> Self {
        self.skills.insert(stat, value);
        self
    }

    pub(crate) fn with_ability(mut self, ability: Ability, bonus: i32) -> Self {
        self.abilities.insert(ability, bonus);
        self
    }

    pub(crate) fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub(crate) fn with_item(mut self, resref: &str) -> Self {
        self.items.push(resref.to_string());
        self
    }
}

impl ActorView for StubActor {
    fn global_id(&self) -> ScriptableId {
        self.id
    }

    fn stat(&self, stat: Stat) -> i32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    fn skill(&self, stat: Stat) -> i32 {
        self.skills.get(&stat).copied().unwrap_or(0)
    }

    fn ability_bonus(&self, ability: Ability) -> i32 {
        self.abilities.get(&ability).copied().unwrap_or(0)
    }

    fn xp_level(&self) -> u32 {
        self.level
    }

    fn face(&mut self, target: Point) {
        self.facing = Some(target);
    }

    fn has_item(&self, resref: &str) -> bool {
        self.items.iter().any(|item| item.eq_ignore_ascii_case(resref))
    }

    fn remove_item(&mut self, resref: &str) {
        if let Some(index) = self
            .items
            .iter()
            .position(|item| item.eq_ignore_ascii_case(resref))
        {
            self.items.remove(index);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingFeedback {
    pub(crate) messages: Vec<MessageKey>,
    pub(crate) named: Vec<(MessageKey, ScriptableId)>,
    pub(crate) strrefs: Vec<StrRef>,
    pub(crate) rolls: Vec<RollReport>,
    pub(crate) overlays: Vec<(MessageKey, u32)>,
}

impl RecordingFeedback {
    pub(crate) fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.named.is_empty()
            && self.strrefs.is_empty()
            && self.rolls.is_empty()
            && self.overlays.is_empty()
    }
}

impl Feedback for RecordingFeedback {
    fn display_constant_string(&mut self, key: MessageKey, _color: GuiColor) {
        self.messages.push(key);
    }

    fn display_constant_string_name(
        &mut self,
        key: MessageKey,
        _color: GuiColor,
        speaker: ScriptableId,
    ) {
        self.named.push((key, speaker));
    }

    fn display_string_name(&mut self, strref: StrRef, _color: GuiColor, _speaker: ScriptableId) {
        self.strrefs.push(strref);
    }

    fn display_roll(&mut self, report: RollReport, _color: GuiColor, _speaker: ScriptableId) {
        self.rolls.push(report);
    }

    fn set_overlay_text(&mut self, key: MessageKey, ticks: u32) {
        self.overlays.push((key, ticks));
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingTriggers {
    pub(crate) entries: Vec<(ScriptableId, TriggerEntry)>,
    pub(crate) immediate: Vec<ScriptableId>,
}

impl TriggerSink for RecordingTriggers {
    fn add_trigger(&mut self, object: ScriptableId, entry: TriggerEntry) {
        self.entries.push((object, entry));
    }

    fn immediate_event(&mut self, object: ScriptableId) {
        self.immediate.push(object);
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingAudio {
    pub(crate) played: Vec<String>,
    pub(crate) defaults: Vec<DefaultSound>,
}

impl Audio for RecordingAudio {
    fn play_relative(&mut self, resref: &str) {
        self.played.push(resref.to_string());
    }

    fn play_default(&mut self, sound: DefaultSound) {
        self.defaults.push(sound);
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingHooks {
    pub(crate) xp: Vec<i64>,
    pub(crate) target_resets: usize,
    pub(crate) event_flags: Vec<EventFlag>,
    pub(crate) autopauses: Vec<AutopauseReason>,
}

impl GameHooks for RecordingHooks {
    fn share_xp(&mut self, xp: i64) {
        self.xp.push(xp);
    }

    fn reset_target_mode(&mut self) {
        self.target_resets += 1;
    }

    fn set_event_flag(&mut self, flag: EventFlag) {
        self.event_flags.push(flag);
    }

    fn autopause(&mut self, reason: AutopauseReason) {
        self.autopauses.push(reason);
    }
}

/// An 8x4 cell area, passable everywhere, that records what doors ask of it.
#[derive(Debug)]
pub(crate) struct MockArea {
    pub(crate) map: SearchMap,
    pub(crate) actors: Vec<(ScriptableId, Point)>,
    pub(crate) already_jumping: HashSet<ScriptableId>,
    pub(crate) marked: Vec<ScriptableId>,
    pub(crate) jumps: Vec<bool>,
    pub(crate) tiles: HashMap<u16, u8>,
    pub(crate) info_door: HashMap<String, bool>,
}

impl Default for MockArea {
    fn default() -> Self {
        Self {
            map: SearchMap::new(8, 4, PathMapFlags::PASSABLE),
            actors: Vec::new(),
            already_jumping: HashSet::new(),
            marked: Vec::new(),
            jumps: Vec::new(),
            tiles: HashMap::new(),
            info_door: HashMap::new(),
        }
    }
}

impl MockArea {
    /// Puts an actor in the middle of `cell` and flags the cell as occupied.
    pub(crate) fn place_actor(&mut self, id: ScriptableId, cell: Point) {
        let origin = cell_origin(cell);
        self.actors.push((id, Point::new(origin.x + 8, origin.y + 6)));
        let occupied = self.map.query(cell) | PathMapFlags::PC;
        self.map.set(cell, occupied);
    }
}

impl DoorArea for MockArea {
    fn search_map(&self) -> &SearchMap {
        &self.map
    }

    fn search_map_mut(&mut self) -> &mut SearchMap {
        &mut self.map
    }

    fn actors_in_rect(&self, region: Region) -> Vec<ScriptableId> {
        self.actors
            .iter()
            .filter(|(_, position)| region.point_inside(*position))
            .map(|(id, _)| *id)
            .collect()
    }

    fn do_not_jump(&self, actor: ScriptableId) -> bool {
        self.already_jumping.contains(&actor)
    }

    fn mark_for_jump(&mut self, actor: ScriptableId) {
        self.marked.push(actor);
    }

    fn jump_actors(&mut self, jump: bool) {
        self.jumps.push(jump);
    }

    fn set_overlay_tile(&mut self, tile: u16, index: u8) {
        self.tiles.insert(tile, index);
    }

    fn set_info_point_door(&mut self, info_point: &str, door_closed: bool) {
        self.info_door.insert(info_point.to_string(), door_closed);
    }

    fn cursor_at(&self, _point: Point) -> Cursor {
        Cursor::BLOCKED
    }
}

/// Every door collaborator, owned together so a test can build a
/// `DoorContext` and inspect the recordings afterwards.
#[derive(Debug, Default)]
pub(crate) struct DoorWorld {
    pub(crate) area: MockArea,
    pub(crate) feedback: RecordingFeedback,
    pub(crate) triggers: RecordingTriggers,
    pub(crate) audio: RecordingAudio,
    pub(crate) hooks: RecordingHooks,
    pub(crate) dice: FixedDice,
}

impl DoorWorld {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rolls(rolls: Vec<i32>) -> Self {
        Self {
            dice: FixedDice::new(rolls),
            ..Self::default()
        }
    }

    /// Ruleset whose XP table awards 10/20/30 for locks and 15/30/45 for
    /// traps at levels 1 to 3.
    pub(crate) fn rules_with_xp(&self, system: RuleSystem) -> Ruleset {
        let mut rules = Ruleset::new(system, false);
        rules.xp_bonus = XpBonusTable::new(Rc::new(Table::parse("xpbonus", XP_TABLE)));
        rules
    }

    pub(crate) fn ctx<'a>(&'a mut self, rules: &'a Ruleset) -> DoorContext<'a> {
        DoorContext {
            rules,
            area: &mut self.area,
            feedback: &mut self.feedback,
            triggers: &mut self.triggers,
            audio: &mut self.audio,
            hooks: &mut self.hooks,
            dice: &mut self.dice,
        }
    }
}

/// Game state as the save gate sees it.
#[derive(Debug, Clone)]
pub(crate) struct GateState {
    pub(crate) cutscene: bool,
    pub(crate) store_open: bool,
    pub(crate) game_control: bool,
    pub(crate) dialog: bool,
    pub(crate) game: bool,
    pub(crate) combat: bool,
    pub(crate) area: bool,
    pub(crate) projectiles: usize,
    pub(crate) no_save_area: bool,
    pub(crate) party: Vec<PartyMemberState>,
    pub(crate) interrupt_near: bool,
}

impl GateState {
    /// An idle game with one party member where saving is allowed.
    pub(crate) fn ready() -> Self {
        Self {
            cutscene: false,
            store_open: false,
            game_control: true,
            dialog: false,
            game: true,
            combat: false,
            area: true,
            projectiles: 0,
            no_save_area: false,
            party: vec![PartyMemberState {
                position: Point::new(100, 100),
                helpless: false,
                in_current_area: true,
                enemy_near: false,
            }],
            interrupt_near: false,
        }
    }

    pub(crate) fn with_member(mut self, edit: impl FnOnce(&mut PartyMemberState)) -> Self {
        if let Some(member) = self.party.first_mut() {
            edit(member);
        }
        self
    }
}

impl SaveGateView for GateState {
    fn in_cutscene(&self) -> bool {
        self.cutscene
    }

    fn store_open(&self) -> bool {
        self.store_open
    }

    fn has_game_control(&self) -> bool {
        self.game_control
    }

    fn in_dialog(&self) -> bool {
        self.dialog
    }

    fn has_game(&self) -> bool {
        self.game
    }

    fn in_combat(&self) -> bool {
        self.combat
    }

    fn has_current_area(&self) -> bool {
        self.area
    }

    fn projectile_count(&self) -> usize {
        self.projectiles
    }

    fn area_no_save(&self) -> bool {
        self.no_save_area
    }

    fn party(&self) -> Vec<PartyMemberState> {
        self.party.clone()
    }

    fn no_interrupt_actor_near(&self, _point: Point, _radius: u32) -> bool {
        self.interrupt_near
    }
}

/// Writer that records each step and writes just enough files for the slot
/// to pass validation.
#[derive(Debug)]
pub(crate) struct MockWriter {
    pub(crate) steps: Vec<String>,
    pub(crate) fail_at: Option<&'static str>,
    pub(crate) prefix: &'static str,
    pub(crate) world_maps: Vec<&'static str>,
    pub(crate) portraits: Vec<Option<RgbaImage>>,
    pub(crate) screenshot: Option<RgbaImage>,
}

impl Default for MockWriter {
    fn default() -> Self {
        let portrait = RgbaImage::from_pixel(2, 2, Rgba([200, 150, 100, 255]));
        Self {
            steps: Vec::new(),
            fail_at: None,
            prefix: "BALDUR",
            world_maps: vec!["worldmap"],
            portraits: vec![Some(portrait.clone()), None, Some(portrait)],
            screenshot: Some(RgbaImage::from_pixel(100, 60, Rgba([0, 64, 128, 255]))),
        }
    }
}

impl MockWriter {
    fn step(&mut self, name: &'static str, recorded: String) -> Result<(), SaveError> {
        self.steps.push(recorded);
        if self.fail_at == Some(name) {
            return Err(SaveError::writer(name, "injected failure"));
        }
        Ok(())
    }

    fn write(path: &Path, bytes: &[u8]) -> Result<(), SaveError> {
        std::fs::write(path, bytes).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SaveWriter for MockWriter {
    fn swap_out_areas(&mut self) -> Result<(), SaveError> {
        self.step("swap_out_areas", "swap_out_areas".to_string())
    }

    fn save_stores(&mut self) -> Result<(), SaveError> {
        self.step("save_stores", "save_stores".to_string())
    }

    fn compress_save(&mut self, _slot_dir: &Path, override_running: bool) -> Result<(), SaveError> {
        let recorded = if override_running {
            "compress_save:override"
        } else {
            "compress_save"
        };
        self.step("compress_save", recorded.to_string())
    }

    fn write_game(&mut self, slot_dir: &Path) -> Result<(), SaveError> {
        self.step("write_game", "write_game".to_string())?;
        let mut header = b"GAMEV2.0".to_vec();
        header.extend_from_slice(&0u32.to_le_bytes());
        Self::write(&slot_dir.join(format!("{}.gam", self.prefix)), &header)
    }

    fn write_world_map(&mut self, slot_dir: &Path) -> Result<(), SaveError> {
        self.step("write_world_map", "write_world_map".to_string())?;
        for name in &self.world_maps {
            Self::write(&slot_dir.join(format!("{name}.wmp")), b"WMAPV1.0")?;
        }
        Ok(())
    }

    fn portraits(&self) -> Vec<Option<RgbaImage>> {
        self.portraits.clone()
    }

    fn screenshot(&self) -> Option<RgbaImage> {
        self.screenshot.clone()
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockExtractor {
    pub(crate) running: bool,
    pub(crate) fail: bool,
    pub(crate) flushes: usize,
}

impl AreaExtractor for MockExtractor {
    fn is_running_save_game(&self, _save: &SaveGame) -> bool {
        self.running
    }

    fn create_cache_blob(&mut self) -> Result<(), SaveError> {
        self.flushes += 1;
        if self.fail {
            return Err(SaveError::ExtractorFlush("injected failure".to_string()));
        }
        Ok(())
    }
}
