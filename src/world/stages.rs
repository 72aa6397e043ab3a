//! Pipeline stages and the work done by the land-pass stages.

use std::fmt;

use rand::Rng;

use super::config::AreaParams;
use super::grid::{AutomataRule, Grid};
use super::tile::TileType;

/// One phase of the generation pipeline.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StageKind {
    /// Randomly turn default tiles into land. Always finishes in one call.
    SeedConversion,
    /// Run cellular-automata smoothing up to the configured iteration count.
    AutomataSmoothing,
    /// Carve connected land into typed regions, one region per budget unit.
    RegionAssignment,
    /// Grow regions into neighboring default tiles, one round per budget unit.
    RegionExpansion,
    /// Reserved slot; completes immediately.
    Overlay,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::SeedConversion,
        StageKind::AutomataSmoothing,
        StageKind::RegionAssignment,
        StageKind::RegionExpansion,
        StageKind::Overlay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::SeedConversion => "seed conversion",
            StageKind::AutomataSmoothing => "automata smoothing",
            StageKind::RegionAssignment => "region assignment",
            StageKind::RegionExpansion => "region expansion",
            StageKind::Overlay => "overlay",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Convert default tiles to land. Leftover budget is not carried over.
pub(crate) fn seed_conversion<R: Rng>(grid: &mut Grid, area: &AreaParams, rng: &mut R) -> bool {
    grid.randomly_convert(TileType::Default, TileType::A, area.initial_conversion_rate, rng);
    true
}

/// Run up to `frames` smoothing iterations without passing `target` in total.
pub(crate) fn automata_smoothing(
    grid: &mut Grid,
    rule: &AutomataRule,
    target: u32,
    iterations_run: &mut u32,
    frames: u32,
) -> bool {
    let iterations = frames.min(target.saturating_sub(*iterations_run));
    for _ in 0..iterations {
        grid.automata_step(rule);
    }
    *iterations_run += iterations;

    *iterations_run >= target
}

/// Overlay slot. Does nothing yet.
pub(crate) fn overlay() -> bool {
    true
}
