//! Generator configuration.

use std::fmt;

use super::constants::*;
use super::grid::AutomataRule;
use super::tile::TileType;
use super::StageKind;

/// Parameters of the land pass: seed conversion followed by smoothing.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaParams {
    /// Chance that a default tile becomes land during seed conversion.
    pub initial_conversion_rate: f64,
    /// Smoothing iterations to run in total.
    pub step_iterations: u32,
    pub death_limit: u32,
    pub birth_limit: u32,
}

impl Default for AreaParams {
    fn default() -> Self {
        Self {
            initial_conversion_rate: AREA_INITIAL_CONVERSION_RATE,
            step_iterations: AREA_STEP_ITERATIONS,
            death_limit: AREA_DEATH_LIMIT,
            birth_limit: AREA_BIRTH_LIMIT,
        }
    }
}

/// Parameters reserved for the overlay pass.
///
/// The overlay stage currently completes without doing any work, so none of
/// these are read during generation.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayParams {
    pub types: usize,
    pub initial_conversion_rate: f64,
    pub step_iterations: u32,
    pub death_limit: u32,
    pub birth_limit: u32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            types: OVERLAY_TYPES,
            initial_conversion_rate: OVERLAY_INITIAL_CONVERSION_RATE,
            step_iterations: OVERLAY_STEP_ITERATIONS,
            death_limit: OVERLAY_DEATH_LIMIT,
            birth_limit: OVERLAY_BIRTH_LIMIT,
        }
    }
}

/// Preset pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Seed conversion and smoothing only.
    Simple,
    /// Land pass, region carving, region growth and the overlay slot.
    MultiStage,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Simple => write!(f, "simple"),
            Variant::MultiStage => write!(f, "multi-stage"),
        }
    }
}

/// Everything a [`Generator`](super::Generator) needs to know up front.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    /// Seed for the default `ChaCha8Rng` random stream.
    pub seed: u64,
    /// Wrap coordinates at the grid edges for smoothing, flood fill and
    /// growth.
    pub wrap: bool,
    pub area: AreaParams,
    /// Regions to carve. Clamped by the number of region types and by the
    /// land available.
    pub region_count: usize,
    pub overlay: OverlayParams,
    /// Stages to run, in order.
    pub stages: Vec<StageKind>,
}

impl GeneratorConfig {
    /// Configuration for a preset pipeline.
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Simple => Self::simple(),
            Variant::MultiStage => Self::multi_stage(),
        }
    }

    /// Seed conversion followed by smoothing.
    pub fn simple() -> Self {
        Self {
            area: AreaParams {
                step_iterations: SIMPLE_STEP_ITERATIONS,
                ..AreaParams::default()
            },
            stages: vec![StageKind::SeedConversion, StageKind::AutomataSmoothing],
            ..Self::multi_stage()
        }
    }

    /// The full five-stage pipeline.
    pub fn multi_stage() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: 0,
            wrap: true,
            area: AreaParams::default(),
            region_count: REGION_COUNT,
            overlay: OverlayParams::default(),
            stages: StageKind::ALL.to_vec(),
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_region_count(mut self, region_count: usize) -> Self {
        self.region_count = region_count;
        self
    }

    pub fn with_initial_conversion_rate(mut self, rate: f64) -> Self {
        self.area.initial_conversion_rate = rate;
        self
    }

    pub fn with_step_iterations(mut self, iterations: u32) -> Self {
        self.area.step_iterations = iterations;
        self
    }

    pub fn with_limits(mut self, death_limit: u32, birth_limit: u32) -> Self {
        self.area.death_limit = death_limit;
        self.area.birth_limit = birth_limit;
        self
    }

    pub fn with_stages(mut self, stages: Vec<StageKind>) -> Self {
        self.stages = stages;
        self
    }

    /// Smoothing rule of the land pass: default tiles against land.
    pub fn area_rule(&self) -> AutomataRule {
        AutomataRule {
            base: TileType::Default,
            check: TileType::A,
            death_limit: self.area.death_limit,
            birth_limit: self.area.birth_limit,
            allow_wrap: self.wrap,
            count_invalid: false,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::multi_stage()
    }
}
