use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Door flag word as stored in area files.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DoorFlags(pub u32);

impl DoorFlags {
    pub const OPEN: Self = Self(1 << 0);
    pub const LOCKED: Self = Self(1 << 1);
    /// Trap rearms after firing.
    pub const RESET: Self = Self(1 << 2);
    pub const DETECTABLE: Self = Self(1 << 3);
    pub const BROKEN: Self = Self(1 << 4);
    pub const CANTCLOSE: Self = Self(1 << 5);
    pub const LINKED: Self = Self(1 << 6);
    pub const SECRET: Self = Self(1 << 7);
    pub const FOUND: Self = Self(1 << 8);
    pub const TRANSPARENT: Self = Self(1 << 9);
    pub const KEY: Self = Self(1 << 10);
    pub const SLIDE: Self = Self(1 << 11);
    pub const WARNINGTEXTDISPLAYED: Self = Self(1 << 12);
    pub const HIDDEN: Self = Self(1 << 13);
    pub const USEUPKEY: Self = Self(1 << 14);
    pub const LOCKEDINFOTEXT: Self = Self(1 << 15);
    pub const WARNINGINFOTEXT: Self = Self(1 << 16);

    const NAMES: [(Self, &'static str); 17] = [
        (Self::OPEN, "OPEN"),
        (Self::LOCKED, "LOCKED"),
        (Self::RESET, "RESET"),
        (Self::DETECTABLE, "DETECTABLE"),
        (Self::BROKEN, "BROKEN"),
        (Self::CANTCLOSE, "CANTCLOSE"),
        (Self::LINKED, "LINKED"),
        (Self::SECRET, "SECRET"),
        (Self::FOUND, "FOUND"),
        (Self::TRANSPARENT, "TRANSPARENT"),
        (Self::KEY, "KEY"),
        (Self::SLIDE, "SLIDE"),
        (Self::WARNINGTEXTDISPLAYED, "WARNINGTEXTDISPLAYED"),
        (Self::HIDDEN, "HIDDEN"),
        (Self::USEUPKEY, "USEUPKEY"),
        (Self::LOCKEDINFOTEXT, "LOCKEDINFOTEXT"),
        (Self::WARNINGINFOTEXT, "WARNINGINFOTEXT"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for DoorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DoorFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for DoorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "DoorFlags({:#x}: {})", self.0, names.join("|"))
    }
}
