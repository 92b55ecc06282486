#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlag {
    TargetMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopauseReason {
    Trap,
}

/// Game-wide side effects reachable from a door or trap.
pub trait GameHooks {
    /// Splits `xp` evenly across the party.
    fn share_xp(&mut self, xp: i64);

    fn reset_target_mode(&mut self);

    fn set_event_flag(&mut self, flag: EventFlag);

    fn autopause(&mut self, reason: AutopauseReason);
}
