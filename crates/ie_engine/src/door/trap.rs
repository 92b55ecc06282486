#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrapState {
    pub trapped: bool,
    pub detected: bool,
    pub removal_difficulty: u32,
    pub detection_difficulty: u32,
    /// Script run when the trap fires.
    pub script: Option<String>,
}

impl TrapState {
    pub fn armed(removal_difficulty: u32, detection_difficulty: u32) -> Self {
        Self {
            trapped: true,
            detected: false,
            removal_difficulty,
            detection_difficulty,
            script: None,
        }
    }

    pub fn disarm(&mut self) {
        self.trapped = false;
    }

    /// Fires the trap. Returns false when the trap was not armed. A trap
    /// without `rearms` disarms itself afterwards.
    pub fn fire(&mut self, rearms: bool) -> bool {
        if !self.trapped {
            return false;
        }
        if !rearms {
            self.trapped = false;
        }
        true
    }
}
