//! The staged generator.
//!
//! A [`Generator`] owns a grid and walks it through an ordered list of
//! stages. The host drives it by calling [`Generator::step`] with a work
//! budget whenever it wants progress (once per frame, say); each call works
//! on exactly one stage and then notifies the registered observers. Stages
//! that need several calls keep their progress inside the generator, so the
//! final grid does not depend on how the budget was split up.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::GeneratorConfig;
use super::constants::{MAX_RUN_ITERATIONS, RUN_TO_COMPLETION_BUDGET};
use super::error::GenError;
use super::grid::Grid;
use super::regions::{Region, RegionAssignment, RegionExpansion};
use super::stages::{self, StageKind};
use super::tile::TileType;
use crate::util::Timed;

/// Handle returned by [`Generator::on_updated`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObserverId(usize);

/// What observers see after each `step`.
///
/// The grid may or may not have changed; a stage was given a chance to run.
pub struct StepEvent<'a> {
    pub grid: &'a Grid,
    /// Stage index after the call.
    pub stage_index: usize,
    /// Stage whose work function ran during the call, if any.
    pub ran: Option<StageKind>,
    pub complete: bool,
}

type Observer = Box<dyn FnMut(&StepEvent<'_>)>;

/// Budgeted, resumable generation pipeline.
pub struct Generator<R = ChaCha8Rng> {
    config: GeneratorConfig,
    grid: Grid,
    rng: R,

    current: usize,
    stage_completed: Vec<bool>,
    /// Per-stage work counter: iterations, regions or growth rounds.
    stage_progress: Vec<u32>,
    complete: bool,

    regions: Vec<Region>,
    assignment: Option<RegionAssignment>,
    expansion: Option<RegionExpansion>,

    observers: Vec<(ObserverId, Observer)>,
    next_observer: usize,
}

impl Generator<ChaCha8Rng> {
    /// Create a generator whose random stream is seeded from `config.seed`.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Generator<R> {
    /// Create a generator drawing from the given random source.
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Result<Self, GenError> {
        let grid = Grid::new(config.width, config.height)?;
        let num_stages = config.stages.len();

        Ok(Self {
            config,
            grid,
            rng,
            current: 0,
            stage_completed: vec![false; num_stages],
            stage_progress: vec![0; num_stages],
            complete: false,
            regions: Vec::new(),
            assignment: None,
            expansion: None,
            observers: Vec::new(),
            next_observer: 0,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The grid as it stands.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn stages(&self) -> &[StageKind] {
        &self.config.stages
    }

    /// Index of the stage the next `step` works on. Equals the stage count
    /// once generation is complete.
    pub fn stage_index(&self) -> usize {
        self.current
    }

    /// Stage the next `step` works on, `None` once complete.
    pub fn current_stage(&self) -> Option<StageKind> {
        self.config.stages.get(self.current).copied()
    }

    pub fn is_stage_complete(&self, idx: usize) -> bool {
        self.stage_completed.get(idx).copied().unwrap_or(false)
    }

    /// Work done so far by stage `idx`.
    pub fn stage_progress(&self, idx: usize) -> u32 {
        self.stage_progress.get(idx).copied().unwrap_or(0)
    }

    /// Regions carved so far.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Carving candidates left, while region assignment is in progress.
    pub fn candidate_pool_len(&self) -> Option<usize> {
        self.assignment.as_ref().map(RegionAssignment::pool_len)
    }

    /// Frontier tiles left, while region expansion is in progress.
    pub fn frontier_len(&self) -> Option<usize> {
        self.expansion.as_ref().map(RegionExpansion::frontier_len)
    }

    /// Register a callback run after every `step`, in registration order.
    pub fn on_updated(&mut self, observer: impl FnMut(&StepEvent<'_>) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Unregister a callback. Returns false if it was not registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    /// Spend up to `frames` units of work on the current stage.
    ///
    /// Never works on more than one stage per call; budget left over when a
    /// stage finishes is dropped. Observers are notified even when
    /// generation was already complete.
    pub fn step(&mut self, frames: u32) {
        let mut ran = None;

        if !self.complete {
            if self.is_stage_complete(self.current) {
                self.current += 1;
            }

            if let Some(stage) = self.current_stage() {
                self.run_stage(self.current, stage, frames);
                ran = Some(stage);

                if self.stage_completed[self.current] {
                    log::debug!(
                        "Stage {} ({}) complete after {} units",
                        self.current,
                        stage,
                        self.stage_progress[self.current]
                    );
                    self.current += 1;
                }
            }

            if self.current >= self.config.stages.len() {
                log::debug!("Generation complete");
                self.complete = true;
            }
        }

        log::trace!("step({}) ran {:?}, now at stage {}", frames, ran, self.current);
        self.notify(ran);
    }

    /// Step with a large budget until complete.
    ///
    /// Returns the number of steps taken, or an error if the pipeline has
    /// not finished after [`MAX_RUN_ITERATIONS`] steps.
    pub fn run_to_completion(&mut self) -> Result<usize, GenError> {
        self.run_to_completion_with(RUN_TO_COMPLETION_BUDGET, MAX_RUN_ITERATIONS)
    }

    /// [`Self::run_to_completion`] with an explicit budget and step cap.
    pub fn run_to_completion_with(
        &mut self,
        frames: u32,
        max_steps: usize,
    ) -> Result<usize, GenError> {
        let _t = Timed::info("Generation");

        let mut steps = 0;
        while !self.complete {
            if steps >= max_steps {
                return Err(GenError::IterationLimit {
                    iterations: steps,
                    stage: self.current_stage(),
                });
            }
            self.step(frames);
            steps += 1;
        }
        Ok(steps)
    }

    /// Start over on a fresh grid of the same size.
    ///
    /// The random stream continues, so the next run produces a different
    /// map. Observers stay registered.
    pub fn reset(&mut self) {
        self.grid = self.grid.cleared();
        self.current = 0;
        self.stage_completed.fill(false);
        self.stage_progress.fill(0);
        self.complete = false;
        self.regions.clear();
        self.assignment = None;
        self.expansion = None;
    }

    fn run_stage(&mut self, idx: usize, stage: StageKind, frames: u32) {
        let done = match stage {
            StageKind::SeedConversion => {
                self.stage_progress[idx] += 1;
                stages::seed_conversion(&mut self.grid, &self.config.area, &mut self.rng)
            }
            StageKind::AutomataSmoothing => {
                let rule = self.config.area_rule();
                stages::automata_smoothing(
                    &mut self.grid,
                    &rule,
                    self.config.area.step_iterations,
                    &mut self.stage_progress[idx],
                    frames,
                )
            }
            StageKind::RegionAssignment => {
                let assignment = self.assignment.get_or_insert_with(|| {
                    RegionAssignment::new(
                        &self.grid,
                        TileType::A,
                        self.config.region_count,
                        self.config.wrap,
                    )
                });
                let done = assignment.run(&mut self.grid, &mut self.regions, frames, &mut self.rng);
                self.stage_progress[idx] = self.regions.len() as u32;
                if done {
                    self.assignment = None;
                }
                done
            }
            StageKind::RegionExpansion => {
                let expansion = self
                    .expansion
                    .get_or_insert_with(|| RegionExpansion::new(&self.regions, self.config.wrap));
                let done = expansion.run(&mut self.grid, frames, &mut self.rng);
                self.stage_progress[idx] = expansion.rounds();
                if done {
                    self.expansion = None;
                }
                done
            }
            StageKind::Overlay => stages::overlay(),
        };

        if done {
            self.stage_completed[idx] = true;
        }
    }

    fn notify(&mut self, ran: Option<StageKind>) {
        let event = StepEvent {
            grid: &self.grid,
            stage_index: self.current,
            ran,
            complete: self.complete,
        };
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn small(config: GeneratorConfig) -> Generator {
        Generator::new(config.with_size(16, 12).with_seed(99)).unwrap()
    }

    #[test]
    fn starts_at_first_stage() {
        let gen = small(GeneratorConfig::default());
        assert_eq!(gen.stage_index(), 0);
        assert_eq!(gen.current_stage(), Some(StageKind::SeedConversion));
        assert!(!gen.is_complete());
        assert!((0..5).all(|i| !gen.is_stage_complete(i)));
        assert_eq!(gen.grid().count_matching(TileType::Default), 16 * 12);
    }

    #[test]
    fn rejects_empty_grid() {
        let config = GeneratorConfig::default().with_size(0, 10);
        assert!(matches!(
            Generator::new(config),
            Err(GenError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn one_stage_per_step() {
        let mut gen = small(GeneratorConfig::default().with_step_iterations(3));

        gen.step(100);
        assert_eq!(gen.stage_index(), 1, "seed conversion ignores extra budget");
        assert!(gen.is_stage_complete(0));
        assert_eq!(gen.stage_progress(1), 0);

        gen.step(2);
        assert_eq!(gen.stage_index(), 1);
        assert_eq!(gen.stage_progress(1), 2);

        gen.step(2);
        assert_eq!(gen.stage_index(), 2);
        assert_eq!(gen.stage_progress(1), 3);
        assert_eq!(gen.current_stage(), Some(StageKind::RegionAssignment));
    }

    #[test]
    fn empty_pipeline_completes_on_first_step() {
        let mut gen = small(GeneratorConfig::default().with_stages(Vec::new()));
        gen.step(1);
        assert!(gen.is_complete());
        assert_eq!(gen.current_stage(), None);
    }

    #[test]
    fn overlay_only_pipeline_leaves_grid_alone() {
        let mut gen = small(GeneratorConfig::default().with_stages(vec![StageKind::Overlay]));
        gen.step(1);
        assert!(gen.is_complete());
        assert!(gen.is_stage_complete(0));
        assert_eq!(gen.grid().count_matching(TileType::Default), 16 * 12);
    }

    #[test]
    fn completion_is_sticky() {
        let mut gen = small(GeneratorConfig::simple());
        gen.run_to_completion().unwrap();
        let grid = gen.grid().clone();

        for _ in 0..3 {
            gen.step(10);
            assert!(gen.is_complete());
            assert_eq!(gen.stage_index(), 2);
        }
        assert_eq!(gen.grid(), &grid);
    }

    #[test]
    fn observers_run_in_order_every_step() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut gen = small(GeneratorConfig::simple().with_step_iterations(2));

        let first = Rc::clone(&log);
        gen.on_updated(move |e| first.borrow_mut().push(("first", e.ran, e.complete)));
        let second = Rc::clone(&log);
        let id = gen.on_updated(move |e| second.borrow_mut().push(("second", e.ran, e.complete)));

        gen.step(1);
        gen.step(5);
        assert!(gen.remove_observer(id));
        assert!(!gen.remove_observer(id));
        gen.step(5);

        let seed = Some(StageKind::SeedConversion);
        let smooth = Some(StageKind::AutomataSmoothing);
        assert_eq!(
            *log.borrow(),
            vec![
                ("first", seed, false),
                ("second", seed, false),
                ("first", smooth, true),
                ("second", smooth, true),
                ("first", None, true),
            ]
        );
    }

    #[test]
    fn iteration_limit_is_reported() {
        let mut gen = small(GeneratorConfig::simple().with_step_iterations(100));
        let err = gen.run_to_completion_with(1, 10).unwrap_err();
        assert_eq!(
            err,
            GenError::IterationLimit {
                iterations: 10,
                stage: Some(StageKind::AutomataSmoothing),
            }
        );
        assert!(!gen.is_complete());
    }

    #[test]
    fn reset_restarts_pipeline_with_fresh_randomness() {
        let mut gen = small(GeneratorConfig::default());
        gen.step(1);
        let first_seeding = gen.grid().clone();
        gen.run_to_completion().unwrap();

        gen.reset();
        assert!(!gen.is_complete());
        assert_eq!(gen.stage_index(), 0);
        assert!(gen.regions().is_empty());
        assert!((0..5).all(|i| gen.stage_progress(i) == 0));
        assert_eq!(gen.grid().count_matching(TileType::Default), 16 * 12);

        gen.step(1);
        assert_ne!(gen.grid(), &first_seeding);
        gen.run_to_completion().unwrap();
        assert!(gen.is_complete());
    }

    #[test]
    fn carried_state_is_dropped_after_its_stage() {
        let mut gen = small(GeneratorConfig::default());
        gen.step(1);
        gen.step(1000);
        assert_eq!(gen.current_stage(), Some(StageKind::RegionAssignment));
        assert_eq!(gen.candidate_pool_len(), None);

        gen.step(1);
        if gen.current_stage() == Some(StageKind::RegionAssignment) {
            assert!(gen.candidate_pool_len().is_some());
        }

        gen.run_to_completion().unwrap();
        assert_eq!(gen.candidate_pool_len(), None);
        assert_eq!(gen.frontier_len(), None);
    }
}
