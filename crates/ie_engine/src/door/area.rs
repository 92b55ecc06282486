use super::cursor::Cursor;
use super::geometry::{Point, Region};
use super::pathmap::SearchMap;
use super::rules::Ruleset;
use crate::sim::{Audio, Dice, Feedback, GameHooks, ScriptableId, TriggerSink};

/// The parts of an area a door reads and edits.
pub trait DoorArea {
    fn search_map(&self) -> &SearchMap;

    fn search_map_mut(&mut self) -> &mut SearchMap;

    /// Living, scheduled actors whose position lies inside `region`.
    fn actors_in_rect(&self, region: Region) -> Vec<ScriptableId>;

    /// Whether the actor's do-not-jump stat is already set.
    fn do_not_jump(&self, actor: ScriptableId) -> bool;

    /// Marks the actor to be displaced on the next jump pass.
    fn mark_for_jump(&mut self, actor: ScriptableId);

    fn jump_actors(&mut self, jump: bool);

    fn set_overlay_tile(&mut self, tile: u16, index: u8);

    /// Sets or clears INFO_DOOR on the named info point, if it exists.
    fn set_info_point_door(&mut self, info_point: &str, door_closed: bool);

    /// Cursor the area would show at `point` without any door there.
    fn cursor_at(&self, point: Point) -> Cursor;
}

/// Everything a door transition or lock attempt touches besides the door.
pub struct DoorContext<'a> {
    pub rules: &'a Ruleset,
    pub area: &'a mut dyn DoorArea,
    pub feedback: &'a mut dyn Feedback,
    pub triggers: &'a mut dyn TriggerSink,
    pub audio: &'a mut dyn Audio,
    pub hooks: &'a mut dyn GameHooks,
    pub dice: &'a mut dyn Dice,
}
