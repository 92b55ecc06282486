use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use super::geometry::Point;

/// Search map cell size in pixels.
pub const CELL_WIDTH: i32 = 16;
pub const CELL_HEIGHT: i32 = 12;

/// Per-cell passability bits. The values are the ones stored in area
/// search maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PathMapFlags(pub u8);

impl PathMapFlags {
    pub const IMPASSABLE: Self = Self(0);
    pub const PASSABLE: Self = Self(1);
    pub const TRAVEL: Self = Self(2);
    pub const NO_SEE: Self = Self(4);
    pub const SIDEWALL: Self = Self(8);
    pub const DOOR_OPAQUE: Self = Self(16);
    pub const DOOR_IMPASSABLE: Self = Self(32);
    pub const PC: Self = Self(64);
    pub const NPC: Self = Self(128);
    pub const ACTOR: Self = Self(64 | 128);
    pub const NOTDOOR: Self = Self(!(16 | 32));

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for PathMapFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PathMapFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PathMapFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for PathMapFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

/// Top-left pixel of a search map cell.
pub fn cell_origin(cell: Point) -> Point {
    Point::new(cell.x * CELL_WIDTH, cell.y * CELL_HEIGHT)
}

/// Grid of passability cells addressed by cell coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMap {
    width: i32,
    height: i32,
    cells: Vec<PathMapFlags>,
}

impl SearchMap {
    pub fn new(width: i32, height: i32, fill: PathMapFlags) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![fill; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, cell: Point) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return None;
        }
        Some((cell.y * self.width + cell.x) as usize)
    }

    /// Cells outside the map read as impassable.
    pub fn query(&self, cell: Point) -> PathMapFlags {
        self.index(cell)
            .map_or(PathMapFlags::IMPASSABLE, |index| self.cells[index])
    }

    /// Writes outside the map are ignored.
    pub fn set(&mut self, cell: Point, value: PathMapFlags) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = value;
        }
    }
}
