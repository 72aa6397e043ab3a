//! Fixed-size tile grid with wrap-aware addressing.

use std::fmt;

use rand::Rng;

use super::error::GenError;
use super::tile::{Tile, TilePos, TileType, TileTypes};

/// Parameters of one cellular-automata step.
///
/// A `base` tile with fewer than `death_limit` neighbors of the `check` type
/// turns into `check`. A `check` tile with more than `birth_limit` such
/// neighbors turns into `base`. Out-of-bounds neighbors (only possible with
/// `allow_wrap == false`) count when `count_invalid` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutomataRule {
    pub base: TileType,
    pub check: TileType,
    pub death_limit: u32,
    pub birth_limit: u32,
    pub allow_wrap: bool,
    pub count_invalid: bool,
}

/// A `width x height` grid of tiles stored row-major.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid with every tile set to [`TileType::Default`].
    pub fn new(width: usize, height: usize) -> Result<Self, GenError> {
        Self::filled(width, height, TileType::Default)
    }

    /// Create a grid with every tile set to `ty`.
    pub fn filled(width: usize, height: usize, ty: TileType) -> Result<Self, GenError> {
        check_dimensions(width, height)?;

        let mut tiles = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::new(TilePos::new(x as i32, y as i32), ty));
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Build a grid from rows of glyphs (see [`TileType::glyph`]).
    ///
    /// Rows must be non-empty and equally long. Unknown glyphs become
    /// `Default`.
    pub fn from_rows(rows: &[&str]) -> Result<Self, GenError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if rows.iter().any(|r| r.chars().count() != width) {
            return Err(GenError::InvalidDimensions { width, height });
        }

        let mut grid = Self::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let ty = TileType::from_glyph(c).unwrap_or(TileType::Default);
                grid.tiles[y * width + x].ty = ty;
            }
        }
        Ok(grid)
    }

    /// A fresh all-default grid with the same dimensions.
    pub fn cleared(&self) -> Grid {
        let tiles = self
            .tiles
            .iter()
            .map(|t| Tile::new(t.pos(), TileType::Default))
            .collect();

        Grid {
            width: self.width,
            height: self.height,
            tiles,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All tiles, row-major.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Type of every tile, row-major.
    pub fn types(&self) -> Vec<TileType> {
        self.tiles.iter().map(|t| t.ty).collect()
    }

    /// Map a coordinate onto the grid.
    ///
    /// With `allow_wrap` both axes are reduced modulo the grid size, so every
    /// coordinate lands somewhere. Without it, out-of-bounds coordinates give
    /// `None`.
    pub fn normalize(&self, pos: TilePos, allow_wrap: bool) -> Option<TilePos> {
        let (w, h) = (self.width as i32, self.height as i32);
        let pos = if allow_wrap {
            TilePos::new(pos.x.rem_euclid(w), pos.y.rem_euclid(h))
        } else {
            pos
        };

        let in_bounds = (0..w).contains(&pos.x) && (0..h).contains(&pos.y);
        in_bounds.then_some(pos)
    }

    fn index(&self, pos: TilePos) -> usize {
        pos.y as usize * self.width + pos.x as usize
    }

    /// Tile at `(x, y)`, or an `Invalid` sentinel when the coordinate is off
    /// the grid and wrapping is disabled. The sentinel is never stored.
    pub fn tile_at(&self, x: i32, y: i32, allow_wrap: bool) -> Tile {
        let pos = TilePos::new(x, y);
        match self.normalize(pos, allow_wrap) {
            Some(p) => self.tiles[self.index(p)],
            None => Tile::new(pos, TileType::Invalid),
        }
    }

    /// In-bounds tile at `pos`, without wrapping.
    pub fn get(&self, pos: TilePos) -> Option<&Tile> {
        self.normalize(pos, false).map(|p| &self.tiles[self.index(p)])
    }

    /// Type at `pos` after normalization, `Invalid` if off the grid.
    pub fn type_at(&self, pos: TilePos, allow_wrap: bool) -> TileType {
        self.tile_at(pos.x, pos.y, allow_wrap).ty
    }

    /// Set the type of the tile at `pos`. Returns false if `pos` is off the
    /// grid, in which case nothing changes.
    pub fn set_type(&mut self, pos: TilePos, ty: TileType) -> bool {
        debug_assert!(ty != TileType::Invalid, "Invalid is never stored");
        match self.normalize(pos, false) {
            Some(p) => {
                let idx = self.index(p);
                self.tiles[idx].ty = ty;
                true
            }
            None => false,
        }
    }

    /// Independently convert each tile matching `from` into `to` with the
    /// given probability, drawing one value from `rng` per matching tile in
    /// row-major order.
    pub fn randomly_convert<R: Rng>(
        &mut self,
        from: impl Into<TileTypes>,
        to: TileType,
        probability: f64,
        rng: &mut R,
    ) {
        let from = from.into();
        let probability = probability.clamp(0.0, 1.0);

        for tile in self.tiles.iter_mut() {
            if tile.matches(from) && rng.gen::<f64>() < probability {
                tile.ty = to;
            }
        }
    }

    /// Count the 8-connected neighbors of `pos` whose type is `check`.
    fn neighbor_count(
        &self,
        pos: TilePos,
        check: TileType,
        allow_wrap: bool,
        count_invalid: bool,
    ) -> u32 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let ty = self.type_at(TilePos::new(pos.x + dx, pos.y + dy), allow_wrap);
                if ty == TileType::Invalid {
                    if count_invalid {
                        count += 1;
                    }
                } else if TileTypes::only(check).contains(ty) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Compute the grid one automata step ahead without touching `self`.
    pub fn next_generation(&self, rule: &AutomataRule) -> Grid {
        let base = TileTypes::only(rule.base);
        let check = TileTypes::only(rule.check);

        let tiles = self
            .tiles
            .iter()
            .map(|tile| {
                let ty = if tile.matches(base) {
                    let count = self.neighbor_count(
                        tile.pos(),
                        rule.check,
                        rule.allow_wrap,
                        rule.count_invalid,
                    );
                    if count < rule.death_limit {
                        rule.check
                    } else {
                        rule.base
                    }
                } else if tile.matches(check) {
                    let count = self.neighbor_count(
                        tile.pos(),
                        rule.check,
                        rule.allow_wrap,
                        rule.count_invalid,
                    );
                    if count > rule.birth_limit {
                        rule.base
                    } else {
                        rule.check
                    }
                } else {
                    tile.ty
                };
                Tile::new(tile.pos(), ty)
            })
            .collect();

        Grid {
            width: self.width,
            height: self.height,
            tiles,
        }
    }

    /// Replace this grid with its next automata generation.
    pub fn automata_step(&mut self, rule: &AutomataRule) {
        *self = self.next_generation(rule);
    }

    /// Snapshot of the tiles matching `types`, row-major.
    pub fn all_tiles_matching(&self, types: impl Into<TileTypes>) -> Vec<Tile> {
        let types = types.into();
        self.tiles.iter().filter(|t| t.matches(types)).copied().collect()
    }

    /// Number of tiles matching `types`.
    pub fn count_matching(&self, types: impl Into<TileTypes>) -> usize {
        let types = types.into();
        self.tiles.iter().filter(|t| t.matches(types)).count()
    }

    /// Per-type tile counts, in [`TileType::ALL`] order, omitting zeros.
    pub fn type_counts(&self) -> Vec<(TileType, usize)> {
        let mut counts = [0usize; TileType::ALL.len()];
        for tile in &self.tiles {
            if let Some(i) = TileType::ALL.iter().position(|&ty| ty == tile.ty) {
                counts[i] += 1;
            }
        }

        TileType::ALL
            .into_iter()
            .zip(counts)
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    /// Reset every tile's traversal flag. Call before starting a traversal.
    pub fn clear_visited_flags(&mut self) {
        for tile in self.tiles.iter_mut() {
            tile.visited = false;
        }
    }

    pub(crate) fn is_visited(&self, pos: TilePos) -> bool {
        self.tiles[self.index(pos)].visited
    }

    pub(crate) fn mark_visited(&mut self, pos: TilePos) {
        let idx = self.index(pos);
        self.tiles[idx].visited = true;
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), GenError> {
    let fits = |n: usize| n > 0 && i32::try_from(n).is_ok();
    if fits(width) && fits(height) && width.checked_mul(height).is_some() {
        Ok(())
    } else {
        Err(GenError::InvalidDimensions { width, height })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.tiles.chunks(self.width).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for tile in row {
                write!(f, "{}", tile.ty.glyph())?;
            }
        }
        Ok(())
    }
}
