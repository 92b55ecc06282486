use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Edges are inclusive on both sides.
    pub fn point_inside(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn intersects(&self, other: &Region) -> bool {
        self.x <= other.x + other.w
            && other.x <= self.x + self.w
            && self.y <= other.y + other.h
            && other.y <= self.y + self.h
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point>,
    bbox: Region,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        let bbox = bounding_box(&points);
        Self { points, bbox }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bbox(&self) -> Region {
        self.bbox
    }

    /// Even-odd rule.
    pub fn point_in(&self, p: Point) -> bool {
        if self.points.len() < 3 || !self.bbox.point_inside(p) {
            return false;
        }

        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let cross_x = (b.x - a.x) as i64 * (p.y - a.y) as i64;
                let span = (b.y - a.y) as i64;
                let edge_x = a.x as i64 + cross_x / span;
                if (p.x as i64) < edge_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn bounding_box(points: &[Point]) -> Region {
    let Some(first) = points.first() else {
        return Region::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Region::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// A wall segment used for sprite occlusion. The area and the door state
/// that owns it share the same handle.
#[derive(Debug)]
pub struct WallPolygon {
    polygon: Polygon,
    disabled: Cell<bool>,
}

impl WallPolygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            polygon: Polygon::new(points),
            disabled: Cell::new(false),
        }
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }
}

pub type WallGroup = Vec<Rc<WallPolygon>>;

/// Open and closed outlines of a door, each with its wall segments.
#[derive(Debug, Default)]
pub struct DoorTrigger {
    open_polygon: Option<Rc<Polygon>>,
    closed_polygon: Option<Rc<Polygon>>,
    open_walls: WallGroup,
    closed_walls: WallGroup,
    is_open: bool,
}

impl DoorTrigger {
    pub fn new(
        open_polygon: Option<Rc<Polygon>>,
        open_walls: WallGroup,
        closed_polygon: Option<Rc<Polygon>>,
        closed_walls: WallGroup,
    ) -> Self {
        Self {
            open_polygon,
            closed_polygon,
            open_walls,
            closed_walls,
            is_open: false,
        }
    }

    /// Enables the walls of the chosen state and disables the other set.
    pub fn set_state(&mut self, open: bool) {
        self.is_open = open;
        for wall in &self.open_walls {
            wall.set_disabled(!open);
        }
        for wall in &self.closed_walls {
            wall.set_disabled(open);
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn state_polygon(&self) -> Option<&Rc<Polygon>> {
        self.polygon_for(self.is_open)
    }

    pub fn polygon_for(&self, open: bool) -> Option<&Rc<Polygon>> {
        if open {
            self.open_polygon.as_ref()
        } else {
            self.closed_polygon.as_ref()
        }
    }

    pub fn walls_for(&self, open: bool) -> &[Rc<WallPolygon>] {
        if open {
            &self.open_walls
        } else {
            &self.closed_walls
        }
    }
}
