use std::ops::BitOr;

/// Index into the cursor sprite sheet. `GRAY` is or-ed onto a base cursor
/// to show its disabled variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor(pub u8);

impl Cursor {
    pub const NORMAL: Self = Self(0);
    pub const GRAY: Self = Self(1);
    pub const BLOCKED: Self = Self(6);
    pub const USE: Self = Self(8);
    pub const LOCK: Self = Self(24);
    pub const DOOR: Self = Self(30);
    pub const STEALTH: Self = Self(36);
    pub const TRAP: Self = Self(38);
}

impl BitOr for Cursor {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    #[default]
    None,
    Talk,
    Attack,
    Cast,
    Defend,
    Pick,
}
