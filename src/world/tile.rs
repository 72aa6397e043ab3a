//! Tile types, type sets and the tile cell itself.

use std::fmt;
use std::ops::BitOr;

/// Type of a single tile.
///
/// `Default` is the background type every grid starts with. `A` is the
/// "land" type produced by seed conversion and smoothing; `B`..`F` are handed
/// out to regions. `Invalid` is never stored in a grid: it only comes back
/// from out-of-bounds lookups with wrapping disabled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TileType {
    Default,
    A,
    B,
    C,
    D,
    E,
    F,
    Invalid,
}

impl TileType {
    /// Every storable type, in declaration order.
    pub const ALL: [TileType; 7] = [
        TileType::Default,
        TileType::A,
        TileType::B,
        TileType::C,
        TileType::D,
        TileType::E,
        TileType::F,
    ];

    /// Single-character glyph used by the text rendering of a grid.
    pub fn glyph(self) -> char {
        match self {
            TileType::Default => '.',
            TileType::A => '#',
            TileType::B => 'b',
            TileType::C => 'c',
            TileType::D => 'd',
            TileType::E => 'e',
            TileType::F => 'f',
            TileType::Invalid => '?',
        }
    }

    /// Inverse of [`TileType::glyph`] for storable types.
    pub fn from_glyph(c: char) -> Option<TileType> {
        TileType::ALL.into_iter().find(|ty| ty.glyph() == c)
    }

    /// Bit for this type inside a [`TileTypes`] set. `Invalid` has none.
    fn bit(self) -> u8 {
        match self {
            TileType::Default => 1 << 0,
            TileType::A => 1 << 1,
            TileType::B => 1 << 2,
            TileType::C => 1 << 3,
            TileType::D => 1 << 4,
            TileType::E => 1 << 5,
            TileType::F => 1 << 6,
            TileType::Invalid => 0,
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileType::Default => "default",
            TileType::A => "A",
            TileType::B => "B",
            TileType::C => "C",
            TileType::D => "D",
            TileType::E => "E",
            TileType::F => "F",
            TileType::Invalid => "invalid",
        };
        f.pad(name)
    }
}

/// A set of tile types.
///
/// A tile matches a set when its type is a member. `Invalid` is never a
/// member of any set, so out-of-bounds sentinels never match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct TileTypes(u8);

impl TileTypes {
    /// The empty set.
    pub const NONE: TileTypes = TileTypes(0);

    /// Set holding a single type.
    pub fn only(ty: TileType) -> Self {
        TileTypes(ty.bit())
    }

    /// Build a set from any number of types.
    pub fn of(types: &[TileType]) -> Self {
        types.iter().fold(TileTypes::NONE, |set, &ty| set.with(ty))
    }

    /// This set plus `ty`.
    pub fn with(self, ty: TileType) -> Self {
        TileTypes(self.0 | ty.bit())
    }

    /// Membership test.
    pub fn contains(self, ty: TileType) -> bool {
        ty != TileType::Invalid && self.0 & ty.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = TileType> {
        TileType::ALL.into_iter().filter(move |&ty| self.contains(ty))
    }
}

impl From<TileType> for TileTypes {
    fn from(ty: TileType) -> Self {
        TileTypes::only(ty)
    }
}

impl BitOr for TileTypes {
    type Output = TileTypes;

    fn bitor(self, rhs: TileTypes) -> TileTypes {
        TileTypes(self.0 | rhs.0)
    }
}

impl BitOr<TileType> for TileTypes {
    type Output = TileTypes;

    fn bitor(self, rhs: TileType) -> TileTypes {
        self.with(rhs)
    }
}

impl BitOr for TileType {
    type Output = TileTypes;

    fn bitor(self, rhs: TileType) -> TileTypes {
        TileTypes::only(self).with(rhs)
    }
}

/// Integer grid coordinate. May lie outside the grid before normalization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four axis-aligned neighbors: up, down, left, right.
    pub fn orthogonal_neighbors(self) -> [TilePos; 4] {
        [
            TilePos::new(self.x, self.y - 1),
            TilePos::new(self.x, self.y + 1),
            TilePos::new(self.x - 1, self.y),
            TilePos::new(self.x + 1, self.y),
        ]
    }
}

/// A single grid cell.
///
/// Equality compares position and type only.
#[derive(Clone, Copy, Debug)]
pub struct Tile {
    pos: TilePos,
    pub ty: TileType,
    /// Scratch flag for graph traversals; meaningless between traversals.
    pub(crate) visited: bool,
}

impl Tile {
    pub fn new(pos: TilePos, ty: TileType) -> Self {
        Self {
            pos,
            ty,
            visited: false,
        }
    }

    pub fn pos(&self) -> TilePos {
        self.pos
    }

    pub fn x(&self) -> i32 {
        self.pos.x
    }

    pub fn y(&self) -> i32 {
        self.pos.y
    }

    pub fn is_invalid(&self) -> bool {
        self.ty == TileType::Invalid
    }

    /// True if this tile's type is a member of `types`.
    pub fn matches(&self, types: impl Into<TileTypes>) -> bool {
        types.into().contains(self.ty)
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos && self.ty == other.ty
    }
}

impl Eq for Tile {}
