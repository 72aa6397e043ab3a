//! Constants for world generation.

/// Default grid width in tiles.
pub const DEFAULT_WIDTH: usize = 50;

/// Default grid height in tiles.
pub const DEFAULT_HEIGHT: usize = 50;

// Area (land) pass

/// Probability that a default tile becomes land during seed conversion.
pub const AREA_INITIAL_CONVERSION_RATE: f64 = 0.65;

/// Smoothing iterations for the simple generator.
pub const SIMPLE_STEP_ITERATIONS: u32 = 20;

/// Smoothing iterations for the multi-stage generator.
pub const AREA_STEP_ITERATIONS: u32 = 30;

/// A default tile with fewer land neighbors than this turns into land.
pub const AREA_DEATH_LIMIT: u32 = 7;

/// A land tile with more land neighbors than this turns back to default.
pub const AREA_BIRTH_LIMIT: u32 = 4;

// Regions

/// Number of regions the multi-stage generator tries to carve.
pub const REGION_COUNT: usize = 5;

/// Probability that a frontier tile claims a default neighbor in one round.
pub const EXPANSION_CLAIM_CHANCE: f64 = 0.5;

// Overlay pass (carried in configuration, not consumed by any stage)

pub const OVERLAY_TYPES: usize = 1;
pub const OVERLAY_INITIAL_CONVERSION_RATE: f64 = 0.5;
pub const OVERLAY_STEP_ITERATIONS: u32 = 20;
pub const OVERLAY_DEATH_LIMIT: u32 = 7;
pub const OVERLAY_BIRTH_LIMIT: u32 = 4;

// Driving the generator

/// Budget handed to each `step` by `run_to_completion`.
pub const RUN_TO_COMPLETION_BUDGET: u32 = 4096;

/// Maximum number of `step` calls `run_to_completion` makes before failing.
pub const MAX_RUN_ITERATIONS: usize = 10_000;
