//! Tile-map generation.
//!
//! This module contains the data model and the staged pipeline that turns a
//! blank grid into a map of typed regions:
//!
//! **Land pass**
//! - Seed conversion - Randomly turn default tiles into land
//! - Automata smoothing - Birth/death neighbor rules over the whole grid
//!
//! **Regions**
//! - Region assignment - Flood fill connected land into typed regions
//! - Region expansion - Regions grow into neighboring default tiles
//!
//! **Overlay** - Reserved, currently a no-op
//!
//! The [`Generator`] runs these stages a budget at a time so a host can
//! spread the work over many frames.

mod config;
mod constants;
mod error;
mod grid;
mod regions;
mod stages;
mod tile;

pub mod gen;

pub use config::{AreaParams, GeneratorConfig, OverlayParams, Variant};
pub use constants::*;
pub use error::GenError;
pub use gen::{Generator, ObserverId, StepEvent};
pub use grid::{AutomataRule, Grid};
pub use regions::{flood_fill, Region, RegionAssignment, RegionExpansion, REGION_TYPES};
pub use stages::StageKind;
pub use tile::{Tile, TilePos, TileType, TileTypes};
