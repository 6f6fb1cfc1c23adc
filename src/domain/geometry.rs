/// Cell-space geometry shared by items and the layout engine.
///
/// Coordinates are signed so that off-screen intermediate values are
/// representable; the layout engine never produces negative positions.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }
}

/// Axis-aligned box: top-left corner plus extent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Rect { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Standard separating-axis test. Shared edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// Anything that can report the current playable area.
///
/// Layout operations query this on every call; nothing caches the result.
pub trait BoundsProvider {
    fn container_size(&self) -> Size;
}

impl BoundsProvider for Size {
    fn container_size(&self) -> Size {
        *self
    }
}
