//! Region carving via flood fill, and boundary growth of the carved regions.
//!
//! Carving picks random land tiles, flood fills the connected land around
//! each one and retypes the component with the next free region type. Growth
//! then lets every region claim neighboring default tiles round by round,
//! one coin flip per candidate, until no region can claim anything more.

use rand::Rng;
use rustc_hash::FxHashSet;

use super::constants::EXPANSION_CLAIM_CHANCE;
use super::grid::Grid;
use super::tile::{TilePos, TileType};

/// Types handed out to regions, in carving order.
pub const REGION_TYPES: [TileType; 6] = [
    TileType::F,
    TileType::E,
    TileType::D,
    TileType::C,
    TileType::B,
    TileType::A,
];

/// Collect the 4-connected component of tiles whose type equals the root's.
///
/// Uses the grid's visited flags as scratch space; they are cleared first.
/// Returns an empty list if `root` lies off the grid.
pub fn flood_fill(grid: &mut Grid, root: TilePos, allow_wrap: bool) -> Vec<TilePos> {
    grid.clear_visited_flags();

    let Some(root) = grid.normalize(root, false) else {
        return Vec::new();
    };
    let target = grid.type_at(root, false);

    let mut reached = Vec::new();
    let mut stack = vec![root];
    grid.mark_visited(root);

    while let Some(pos) = stack.pop() {
        if grid.type_at(pos, false) != target {
            continue;
        }
        reached.push(pos);

        for neighbor in pos.orthogonal_neighbors() {
            let Some(neighbor) = grid.normalize(neighbor, allow_wrap) else {
                continue;
            };
            if !grid.is_visited(neighbor) {
                grid.mark_visited(neighbor);
                stack.push(neighbor);
            }
        }
    }

    reached
}

/// A connected group of tiles carved out by one flood fill.
///
/// The member list is fixed at carve time; growth claims are tracked by the
/// expansion frontiers, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    ty: TileType,
    tiles: Vec<TilePos>,
}

impl Region {
    pub fn ty(&self) -> TileType {
        self.ty
    }

    pub fn tiles(&self) -> &[TilePos] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Progress of the region-assignment stage.
pub struct RegionAssignment {
    /// Land tiles not yet absorbed into a region.
    pool: Vec<TilePos>,
    target: usize,
    allow_wrap: bool,
}

impl RegionAssignment {
    /// Snapshot every tile of `land` type as a carving candidate.
    pub fn new(grid: &Grid, land: TileType, target: usize, allow_wrap: bool) -> Self {
        let pool = grid
            .all_tiles_matching(land)
            .into_iter()
            .map(|t| t.pos())
            .collect();

        Self {
            pool,
            target,
            allow_wrap,
        }
    }

    /// Candidates left in the pool.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    fn is_done(&self, regions: &[Region]) -> bool {
        regions.len() >= self.target || regions.len() >= REGION_TYPES.len() || self.pool.is_empty()
    }

    /// Carve up to `frames` regions. Returns true once carving is finished,
    /// at which point every unclaimed candidate has been reset to default.
    pub fn run<R: Rng>(
        &mut self,
        grid: &mut Grid,
        regions: &mut Vec<Region>,
        frames: u32,
        rng: &mut R,
    ) -> bool {
        let mut done = self.is_done(regions);

        for _ in 0..frames {
            if done {
                break;
            }

            let ty = REGION_TYPES[regions.len()];
            let root = self.pool[rng.gen_range(0..self.pool.len())];
            let tiles = flood_fill(grid, root, self.allow_wrap);

            let carved: FxHashSet<TilePos> = tiles.iter().copied().collect();
            self.pool.retain(|p| !carved.contains(p));
            for &pos in &tiles {
                grid.set_type(pos, ty);
            }

            log::debug!(
                "Carved region {} ({}) with {} tiles, {} candidates left",
                regions.len(),
                ty,
                tiles.len(),
                self.pool.len()
            );
            regions.push(Region { ty, tiles });
            done = self.is_done(regions);
        }

        if done {
            for pos in self.pool.drain(..) {
                grid.set_type(pos, TileType::Default);
            }
        }
        done
    }
}

/// Tiles of one region that may still claim default neighbors.
#[derive(Clone, Debug)]
struct Frontier {
    ty: TileType,
    tiles: Vec<TilePos>,
}

/// Progress of the region-expansion stage.
pub struct RegionExpansion {
    frontiers: Vec<Frontier>,
    allow_wrap: bool,
    rounds: u32,
}

impl RegionExpansion {
    /// Start one frontier per region, seeded with all of its members.
    pub fn new(regions: &[Region], allow_wrap: bool) -> Self {
        let frontiers = regions
            .iter()
            .map(|r| Frontier {
                ty: r.ty,
                tiles: r.tiles.clone(),
            })
            .collect();

        Self {
            frontiers,
            allow_wrap,
            rounds: 0,
        }
    }

    /// Growth rounds run so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Total frontier tiles across all regions.
    pub fn frontier_len(&self) -> usize {
        self.frontiers.iter().map(|f| f.tiles.len()).sum()
    }

    /// Frontier tiles of region `idx`.
    pub fn frontier(&self, idx: usize) -> Option<&[TilePos]> {
        self.frontiers.get(idx).map(|f| f.tiles.as_slice())
    }

    /// Run up to `frames` growth rounds. Returns true once a round ends with
    /// every frontier empty.
    pub fn run<R: Rng>(&mut self, grid: &mut Grid, frames: u32, rng: &mut R) -> bool {
        for _ in 0..frames {
            if !self.grow_round(grid, rng) {
                return true;
            }
        }
        false
    }

    /// One growth round over every region. Returns true if any frontier is
    /// still non-empty afterwards.
    pub fn grow_round<R: Rng>(&mut self, grid: &mut Grid, rng: &mut R) -> bool {
        let mut any_left = false;
        let mut retired = FxHashSet::default();
        self.rounds += 1;

        for frontier in self.frontiers.iter_mut() {
            retired.clear();
            let snapshot = frontier.tiles.clone();
            for pos in snapshot {
                if expand_tile(grid, pos, frontier, self.allow_wrap, rng) {
                    retired.insert(pos);
                }
            }
            // Survivors and claims keep their order, so later rounds draw
            // in the same sequence.
            if !retired.is_empty() {
                frontier.tiles.retain(|pos| !retired.contains(pos));
            }
            any_left |= !frontier.tiles.is_empty();
        }

        any_left
    }
}

/// Try to claim each default neighbor of `pos` for the frontier's region.
///
/// Returns true when the tile should leave the frontier: no neighbor was
/// left unclaimed by a failed coin flip this round.
fn expand_tile<R: Rng>(
    grid: &mut Grid,
    pos: TilePos,
    frontier: &mut Frontier,
    allow_wrap: bool,
    rng: &mut R,
) -> bool {
    let mut deferred = false;

    for neighbor in pos.orthogonal_neighbors() {
        let Some(neighbor) = grid.normalize(neighbor, allow_wrap) else {
            continue;
        };
        if grid.type_at(neighbor, false) != TileType::Default {
            continue;
        }

        if rng.gen_bool(EXPANSION_CLAIM_CHANCE) {
            grid.set_type(neighbor, frontier.ty);
            frontier.tiles.push(neighbor);
        } else {
            deferred = true;
        }
    }

    !deferred
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn as_set(tiles: &[TilePos]) -> HashSet<TilePos> {
        tiles.iter().copied().collect()
    }

    #[test]
    fn flood_fill_collects_exact_component() {
        let mut grid = Grid::from_rows(&["##..#", "#...#", "..#..", "c.#.."]).unwrap();

        let filled = flood_fill(&mut grid, TilePos::new(0, 0), false);
        assert_eq!(
            as_set(&filled),
            as_set(&[TilePos::new(0, 0), TilePos::new(1, 0), TilePos::new(0, 1)])
        );

        let filled = flood_fill(&mut grid, TilePos::new(2, 2), false);
        assert_eq!(as_set(&filled), as_set(&[TilePos::new(2, 2), TilePos::new(2, 3)]));
    }

    #[test]
    fn flood_fill_ignores_diagonals() {
        let mut grid = Grid::from_rows(&["#.", ".#"]).unwrap();
        assert_eq!(flood_fill(&mut grid, TilePos::new(0, 0), false).len(), 1);
    }

    #[test]
    fn flood_fill_crosses_edges_only_when_wrapping() {
        let mut grid = Grid::from_rows(&["#..#", "....", "#..#"]).unwrap();
        assert_eq!(flood_fill(&mut grid, TilePos::new(0, 0), false).len(), 1);
        assert_eq!(flood_fill(&mut grid, TilePos::new(0, 0), true).len(), 4);
    }

    #[test]
    fn flood_fill_is_repeatable_and_leaves_types_alone() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut grid = Grid::new(16, 16).unwrap();
        grid.randomly_convert(TileType::Default, TileType::A, 0.55, &mut rng);
        let before = grid.types();

        let root = TilePos::new(5, 5);
        let first = flood_fill(&mut grid, root, true);
        let second = flood_fill(&mut grid, root, true);

        assert_eq!(first, second);
        assert_eq!(grid.types(), before);
        let unique = as_set(&first);
        assert_eq!(unique.len(), first.len(), "no tile collected twice");
    }

    #[test]
    fn flood_fill_off_grid_root_is_empty() {
        let mut grid = Grid::new(3, 3).unwrap();
        assert!(flood_fill(&mut grid, TilePos::new(3, 0), true).is_empty());
    }

    #[test]
    fn carving_stops_when_pool_is_exhausted() {
        let mut grid = Grid::from_rows(&["....", ".##.", "....", "...."]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut regions = Vec::new();
        let mut carving = RegionAssignment::new(&grid, TileType::A, 5, true);

        assert!(carving.run(&mut grid, &mut regions, 10, &mut rng));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].ty(), TileType::F);
        assert_eq!(regions[0].len(), 2);
        assert_eq!(grid.count_matching(TileType::F), 2);
        assert_eq!(carving.pool_len(), 0);
    }

    #[test]
    fn carving_respects_target_and_resets_leftovers() {
        let mut grid = Grid::from_rows(&["#.#.#", ".....", "#.#.#"]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut regions = Vec::new();
        let mut carving = RegionAssignment::new(&grid, TileType::A, 2, false);

        assert!(!carving.run(&mut grid, &mut regions, 1, &mut rng));
        assert_eq!(regions.len(), 1);
        assert_eq!(carving.pool_len(), 5);

        assert!(carving.run(&mut grid, &mut regions, 1, &mut rng));
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].ty(), TileType::E);
        assert_eq!(grid.count_matching(TileType::A), 0);
        assert_eq!(grid.count_matching(TileType::Default), 13);
    }

    #[test]
    fn carving_never_exceeds_available_types() {
        let mut grid = Grid::from_rows(&["#.#.#.#.#.#.#.#.#"]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut regions = Vec::new();
        let mut carving = RegionAssignment::new(&grid, TileType::A, 50, false);

        assert!(carving.run(&mut grid, &mut regions, 100, &mut rng));
        assert_eq!(regions.len(), REGION_TYPES.len());
        let types: Vec<_> = regions.iter().map(Region::ty).collect();
        assert_eq!(types, REGION_TYPES.to_vec());
    }

    #[test]
    fn growth_claims_every_reachable_default_tile() {
        let mut grid = Grid::from_rows(&["......", "..#...", "......", "...c.."]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut regions = Vec::new();
        let mut carving = RegionAssignment::new(&grid, TileType::A, 1, true);
        assert!(carving.run(&mut grid, &mut regions, 1, &mut rng));

        let mut growth = RegionExpansion::new(&regions, true);
        assert_eq!(growth.frontier_len(), 1);
        assert!(growth.run(&mut grid, 10_000, &mut rng));
        assert_eq!(growth.frontier_len(), 0);

        assert_eq!(grid.count_matching(TileType::Default), 0);
        assert_eq!(grid.count_matching(TileType::C), 1);
        assert_eq!(grid.count_matching(TileType::F), 23);
    }

    #[test]
    fn growth_without_regions_finishes_in_one_round() {
        let mut grid = Grid::new(4, 4).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut growth = RegionExpansion::new(&[], true);
        assert!(growth.run(&mut grid, 1, &mut rng));
    }

    #[test]
    fn enclosed_tiles_retire_without_drawing() {
        // The region tile is boxed in by another type; it retires at once.
        let mut grid = Grid::from_rows(&["ccc", "c#c", "ccc"]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut regions = Vec::new();
        RegionAssignment::new(&grid, TileType::A, 1, true)
            .run(&mut grid, &mut regions, 1, &mut rng);

        let mut growth = RegionExpansion::new(&regions, true);
        assert!(!growth.grow_round(&mut grid, &mut rng));
        assert_eq!(growth.frontier(0), Some(&[][..]));
    }

    #[test]
    fn tile_with_a_lost_flip_stays_on_the_frontier() {
        let mut grid = Grid::from_rows(&["...", ".f.", "..."]).unwrap();
        let regions = [Region {
            ty: TileType::F,
            tiles: vec![TilePos::new(1, 1)],
        }];
        let mut growth = RegionExpansion::new(&regions, false);

        // Every flip fails: nothing is claimed and the tile waits.
        let mut always_fail = StepRng::new(u64::MAX, 0);
        assert!(growth.grow_round(&mut grid, &mut always_fail));
        assert_eq!(growth.frontier(0), Some(&[TilePos::new(1, 1)][..]));
        assert_eq!(grid.count_matching(TileType::Default), 8);

        // Every flip succeeds: all four neighbors join and the tile retires.
        let mut always_claim = StepRng::new(0, 0);
        assert!(growth.grow_round(&mut grid, &mut always_claim));
        let frontier = growth.frontier(0).unwrap();
        assert_eq!(
            frontier,
            &[
                TilePos::new(1, 0),
                TilePos::new(1, 2),
                TilePos::new(0, 1),
                TilePos::new(2, 1)
            ][..]
        );
        assert_eq!(grid.count_matching(TileType::Default), 4);
        assert_eq!(grid.count_matching(TileType::F), 5);
    }

    #[test]
    fn retiring_keeps_frontier_order() {
        // Interior tiles retire in the first round; the edge tiles that lost
        // a flip must stay in their original relative order.
        let mut grid = Grid::from_rows(&["fff.", "fff.", "fff."]).unwrap();
        let tiles: Vec<TilePos> = (0..3)
            .flat_map(|y| (0..3).map(move |x| TilePos::new(x, y)))
            .collect();
        let regions = [Region {
            ty: TileType::F,
            tiles,
        }];
        let mut growth = RegionExpansion::new(&regions, false);

        let mut always_fail = StepRng::new(u64::MAX, 0);
        assert!(growth.grow_round(&mut grid, &mut always_fail));
        assert_eq!(
            growth.frontier(0),
            Some(&[TilePos::new(2, 0), TilePos::new(2, 1), TilePos::new(2, 2)][..])
        );
    }
}
