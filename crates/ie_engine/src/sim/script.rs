use super::actor::ScriptableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Opened,
    HarmlessOpened,
    Closed,
    HarmlessClosed,
    Unlocked,
    PickLockFailed,
    Disarmed,
    DisarmFailed,
    Detected,
    TrapDetected,
    Entered,
    TrapTriggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEntry {
    pub kind: TriggerKind,
    /// Who caused the event.
    pub source: ScriptableId,
}

impl TriggerEntry {
    pub fn new(kind: TriggerKind, source: ScriptableId) -> Self {
        Self { kind, source }
    }
}

pub trait TriggerSink {
    fn add_trigger(&mut self, object: ScriptableId, entry: TriggerEntry);

    /// Asks the script runner to evaluate `object` on this tick instead of
    /// waiting for its next scheduled run.
    fn immediate_event(&mut self, object: ScriptableId);
}
