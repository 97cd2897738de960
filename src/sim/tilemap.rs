//! Tile collision shapes and the tilemap grid
//!
//! Each [`CollisionType`] has a static boundary template in tile-local
//! coordinates. When a tile's geometry is emitted, axis-aligned edges that
//! sit flush against a neighbor which is solid on the facing side are
//! dropped, so rows and columns of solid tiles present one continuous
//! surface instead of a seam at every tile boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Aabb, LineSegment};
use crate::consts::TILE_SIZE;
use crate::settings::OutOfBoundsPolicy;

/// Collision shape of a single tile. Wedges are named after the corner
/// holding their right angle; the hypotenuse faces the opposite corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionType {
    #[default]
    Empty = 0,
    SolidBox = 1,
    AngleBottomRight = 2,
    AngleBottomLeft = 3,
    AngleTopLeft = 4,
    AngleTopRight = 5,
}

impl CollisionType {
    pub const ALL: [CollisionType; 6] = [
        CollisionType::Empty,
        CollisionType::SolidBox,
        CollisionType::AngleBottomRight,
        CollisionType::AngleBottomLeft,
        CollisionType::AngleTopLeft,
        CollisionType::AngleTopRight,
    ];

    /// Look up by ordinal
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Decode a level character (`'0'..='5'`)
    pub fn from_digit(ch: char) -> Option<Self> {
        ch.to_digit(10).and_then(|d| Self::from_index(d as usize))
    }

    /// Level character for this type
    pub fn to_digit(self) -> char {
        char::from(b'0' + self as u8)
    }

    /// Static boundary template for this type
    #[inline]
    pub fn geometry(self) -> &'static CollisionTypeGeometry {
        &GEOMETRY[self as usize]
    }

    pub fn is_empty(self) -> bool {
        self == CollisionType::Empty
    }
}

/// Axis-aligned side of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileDirection {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl TileDirection {
    pub fn opposite(self) -> Self {
        match self {
            TileDirection::Up => TileDirection::Down,
            TileDirection::Down => TileDirection::Up,
            TileDirection::Left => TileDirection::Right,
            TileDirection::Right => TileDirection::Left,
        }
    }

    /// Tile index step toward the neighbor on this side (y grows upward)
    pub fn offset(self) -> (i32, i32) {
        match self {
            TileDirection::Up => (0, 1),
            TileDirection::Down => (0, -1),
            TileDirection::Left => (-1, 0),
            TileDirection::Right => (1, 0),
        }
    }
}

/// One boundary segment of a tile template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileEdge {
    pub segment: LineSegment,
    /// Side this edge lies flush against; `None` for wedge hypotenuses
    pub side: Option<TileDirection>,
}

impl TileEdge {
    const fn new(start: Vec2, end: Vec2, side: Option<TileDirection>) -> Self {
        Self {
            segment: LineSegment::new(start, end),
            side,
        }
    }
}

/// Boundary template for one collision type, in tile-local coordinates
#[derive(Debug)]
pub struct CollisionTypeGeometry {
    /// Edges wound clockwise so every left-hand normal faces out of the tile
    pub edges: &'static [TileEdge],
    /// Whether the tile presents a full face on each side, indexed by [`TileDirection`]
    solid: [bool; 4],
}

impl CollisionTypeGeometry {
    /// Whether a neighbor approaching from `direction` meets a full face
    #[inline]
    pub fn solid_in_direction(&self, direction: TileDirection) -> bool {
        self.solid[direction as usize]
    }

    pub fn segments(&self) -> impl Iterator<Item = LineSegment> + '_ {
        self.edges.iter().map(|edge| edge.segment)
    }
}

const BOTTOM_LEFT: Vec2 = Vec2::new(0.0, 0.0);
const TOP_LEFT: Vec2 = Vec2::new(0.0, TILE_SIZE);
const BOTTOM_RIGHT: Vec2 = Vec2::new(TILE_SIZE, 0.0);
const TOP_RIGHT: Vec2 = Vec2::new(TILE_SIZE, TILE_SIZE);

const TOP_EDGE: TileEdge = TileEdge::new(TOP_LEFT, TOP_RIGHT, Some(TileDirection::Up));
const RIGHT_EDGE: TileEdge = TileEdge::new(TOP_RIGHT, BOTTOM_RIGHT, Some(TileDirection::Right));
const BOTTOM_EDGE: TileEdge = TileEdge::new(BOTTOM_RIGHT, BOTTOM_LEFT, Some(TileDirection::Down));
const LEFT_EDGE: TileEdge = TileEdge::new(BOTTOM_LEFT, TOP_LEFT, Some(TileDirection::Left));

//                         Up     Down   Left   Right
const SOLID_NONE: [bool; 4] = [false, false, false, false];
const SOLID_ALL: [bool; 4] = [true, true, true, true];

/// Indexed by `CollisionType as usize`
static GEOMETRY: [CollisionTypeGeometry; 6] = [
    CollisionTypeGeometry {
        edges: &[],
        solid: SOLID_NONE,
    },
    CollisionTypeGeometry {
        edges: &[TOP_EDGE, RIGHT_EDGE, BOTTOM_EDGE, LEFT_EDGE],
        solid: SOLID_ALL,
    },
    // AngleBottomRight: hypotenuse faces up-left
    CollisionTypeGeometry {
        edges: &[
            TileEdge::new(BOTTOM_LEFT, TOP_RIGHT, None),
            RIGHT_EDGE,
            BOTTOM_EDGE,
        ],
        solid: [false, true, false, true],
    },
    // AngleBottomLeft: hypotenuse faces up-right
    CollisionTypeGeometry {
        edges: &[
            TileEdge::new(TOP_LEFT, BOTTOM_RIGHT, None),
            BOTTOM_EDGE,
            LEFT_EDGE,
        ],
        solid: [false, true, true, false],
    },
    // AngleTopLeft: hypotenuse faces down-right
    CollisionTypeGeometry {
        edges: &[
            TileEdge::new(TOP_RIGHT, BOTTOM_LEFT, None),
            LEFT_EDGE,
            TOP_EDGE,
        ],
        solid: [true, false, true, false],
    },
    // AngleTopRight: hypotenuse faces down-left
    CollisionTypeGeometry {
        edges: &[
            TileEdge::new(BOTTOM_RIGHT, TOP_LEFT, None),
            TOP_EDGE,
            RIGHT_EDGE,
        ],
        solid: [true, false, false, true],
    },
];

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub collision: CollisionType,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        collision: CollisionType::Empty,
    };

    pub fn new(collision: CollisionType) -> Self {
        Self { collision }
    }
}

/// Integer tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub x: i32,
    pub y: i32,
}

/// Inclusive rectangle of tile indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl TileRange {
    pub fn new(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.bottom > self.top
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let w = (self.right - self.left + 1) as usize;
        let h = (self.top - self.bottom + 1) as usize;
        w * h
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// Row-major walk from the bottom row up. Each call starts over.
    pub fn iter(&self) -> TileRangeIter {
        TileRangeIter {
            range: *self,
            x: self.left,
            y: self.bottom,
        }
    }
}

impl IntoIterator for TileRange {
    type Item = TileIndex;
    type IntoIter = TileRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`TileRange`]
#[derive(Debug, Clone)]
pub struct TileRangeIter {
    range: TileRange,
    x: i32,
    y: i32,
}

impl Iterator for TileRangeIter {
    type Item = TileIndex;

    fn next(&mut self) -> Option<TileIndex> {
        if self.range.is_empty() || self.y > self.range.top {
            return None;
        }
        let index = TileIndex {
            x: self.x,
            y: self.y,
        };
        self.x += 1;
        if self.x > self.range.right {
            self.x = self.range.left;
            self.y += 1;
        }
        Some(index)
    }
}

/// Rectangular grid of tiles; `(0, 0)` is the bottom-left tile and y grows upward.
///
/// Immutable during play: both players' collision queries read it concurrently
/// through shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    out_of_bounds: OutOfBoundsPolicy,
}

impl TileMap {
    /// All-empty map
    pub fn new(width: u32, height: u32, out_of_bounds: OutOfBoundsPolicy) -> Self {
        let width = width.min(i32::MAX as u32) as i32;
        let height = height.min(i32::MAX as u32) as i32;
        Self {
            width,
            height,
            tiles: vec![Tile::EMPTY; (width as usize) * (height as usize)],
            out_of_bounds,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn out_of_bounds(&self) -> OutOfBoundsPolicy {
        self.out_of_bounds
    }

    #[inline]
    pub fn in_range(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Tile at `(x, y)`; outside the grid, the policy's sentinel tile
    pub fn tile(&self, x: i32, y: i32) -> Tile {
        if self.in_range(x, y) {
            self.tiles[self.index(x, y)]
        } else {
            Tile::new(self.out_of_bounds.sentinel())
        }
    }

    /// Overwrite a tile. Returns false (and changes nothing) when out of range.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        if !self.in_range(x, y) {
            return false;
        }
        let i = self.index(x, y);
        self.tiles[i] = tile;
        true
    }

    /// Number of non-empty tiles inside the grid
    pub fn solid_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.collision.is_empty()).count()
    }

    /// World-space bottom-left corner of a tile
    #[inline]
    pub fn tile_offset(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE)
    }

    /// World-space box covered by a tile
    pub fn tile_box(&self, x: i32, y: i32) -> Aabb {
        let offset = self.tile_offset(x, y);
        Aabb::new(offset, offset + Vec2::splat(TILE_SIZE))
    }

    /// Conservative range of tiles touched by a world-space box.
    ///
    /// Floors the min corner and ceils the max corner, so a box edge lying
    /// exactly on a tile boundary also includes the next tile over.
    pub fn tile_range(&self, bounds: &Aabb) -> TileRange {
        let min = bounds.min() / TILE_SIZE;
        let max = bounds.max() / TILE_SIZE;
        TileRange::new(
            min.x.floor() as i32,
            min.y.floor() as i32,
            max.x.ceil() as i32,
            max.y.ceil() as i32,
        )
    }

    /// World-space boundary segments of a tile, with interior seams removed.
    ///
    /// Lazy and allocation-free; safe to call per tile per tick.
    pub fn tile_geometry(&self, x: i32, y: i32) -> TileGeometry<'_> {
        let template = self.tile(x, y).collision.geometry();
        TileGeometry {
            map: self,
            edges: template.edges.iter(),
            x,
            y,
            offset: self.tile_offset(x, y),
        }
    }

    /// Whether the tile on `side` of `(x, y)` hides the edge of `(x, y)` facing it
    fn neighbor_covers(&self, x: i32, y: i32, side: TileDirection) -> bool {
        let (dx, dy) = side.offset();
        self.tile(x + dx, y + dy)
            .collision
            .geometry()
            .solid_in_direction(side.opposite())
    }
}

/// Iterator returned by [`TileMap::tile_geometry`]
#[derive(Debug, Clone)]
pub struct TileGeometry<'a> {
    map: &'a TileMap,
    edges: std::slice::Iter<'static, TileEdge>,
    x: i32,
    y: i32,
    offset: Vec2,
}

impl Iterator for TileGeometry<'_> {
    type Item = LineSegment;

    fn next(&mut self) -> Option<LineSegment> {
        for edge in self.edges.by_ref() {
            if let Some(side) = edge.side {
                if self.map.neighbor_covers(self.x, self.y, side) {
                    continue;
                }
            }
            return Some(edge.segment.translated(self.offset));
        }
        None
    }
}
