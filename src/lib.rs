//! Staged, resumable procedural generation of 2D tile maps.
//!
//! See [`world`] for the data model and the generation pipeline.

pub mod util;
pub mod world;
