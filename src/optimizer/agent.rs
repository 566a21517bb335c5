//! Overlap reduction agent.
//!
//! The agent walks the zones of its [`ZoneStrategy`] and, in each zone, runs a
//! fixed number of trials. A trial picks a random structure of the zone, applies
//! a random action, steps the backend and compares the new overlap against the
//! current baseline:
//!
//! - not worse (`new <= baseline`): the action is kept and `new` becomes the
//!   baseline;
//! - worse: the action is undone, the backend is stepped again and that
//!   measurement becomes the baseline.
//!
//! This is plain hill-climbing with single-level undo. Every trial costs one
//! backend step, two when rolled back.

use bevy_ecs::prelude::Entity;
use fastrand::Rng;
use log::{debug, trace};

use crate::components::structure::{ACTION_MOVE, ACTION_ROTATE, ActionKind, ActionParams};
use crate::error::SimError;
use crate::optimizer::zonestrategy::ZoneStrategy;
use crate::resources::optimizerconfig::OptimizerConfig;
use crate::space::Space;

/// Number of measurements averaged at each end of a run.
pub const TREND_WINDOW: usize = 10;

/// Outcome of one act/measure/decide cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub entity: Entity,
    pub code: u8,
    /// Applied action, `None` when nothing was changed.
    pub action: Option<ActionKind>,
    /// Baseline overlap before the action.
    pub before: f32,
    /// Overlap after the accept/rollback decision.
    pub after: f32,
    pub accepted: bool,
}

/// Result of one pass through every zone.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Members of the last zone processed.
    pub last_zone: Vec<Entity>,
    /// Mean of the first [`TREND_WINDOW`] post-decision measurements.
    pub overlap_begin: f32,
    /// Mean of the last [`TREND_WINDOW`] post-decision measurements.
    pub overlap_end: f32,
    pub trials: Vec<Trial>,
}

impl RunSummary {
    pub fn accepted_count(&self) -> usize {
        self.trials.iter().filter(|t| t.accepted).count()
    }
}

pub struct OverlapAgent {
    strategy: ZoneStrategy,
    params: ActionParams,
    step_dt: f32,
    rng: Rng,
    overlap: f32,
}

impl OverlapAgent {
    pub fn new(strategy: ZoneStrategy, params: ActionParams, step_dt: f32, rng: Rng) -> Self {
        Self {
            strategy,
            params,
            step_dt,
            rng,
            overlap: 0.0,
        }
    }

    /// Agent over every structure in `space`, set up from `config`.
    pub fn from_config(config: &OptimizerConfig, space: &mut Space, rng: Rng) -> Self {
        let population = space.structures();
        let strategy = ZoneStrategy::new(config.strategy, config.origin, population, space);
        Self::new(strategy, config.action, config.step_dt, rng)
    }

    /// Settle the backend with one short step and take its overlap as the
    /// starting baseline.
    pub fn initialize(&mut self, space: &mut Space, init_dt: f32) -> f32 {
        space.reset_accumulator();
        self.overlap = space.measure(init_dt);
        debug!("Initial overlap baseline {:.4}", self.overlap);
        self.overlap
    }

    /// Current baseline overlap.
    pub fn overlap(&self) -> f32 {
        self.overlap
    }

    pub fn strategy(&self) -> &ZoneStrategy {
        &self.strategy
    }

    /// Trials executed by one call to [`OverlapAgent::run`].
    pub fn total_actions(&self, num_actions_per_zone: usize) -> usize {
        num_actions_per_zone * self.strategy.total_zones()
    }

    /// One pass through every zone with `num_actions_per_zone` trials each.
    ///
    /// Fails with [`SimError::EmptyZone`] before touching anything when a zone
    /// has no members. After the pass the strategy is reset, so the next call
    /// starts from the first zone with membership recomputed.
    pub fn run(&mut self, space: &mut Space, num_actions_per_zone: usize) -> Result<RunSummary, SimError> {
        if let Some(zone) = self.strategy.first_empty_zone() {
            return Err(SimError::EmptyZone { zone });
        }

        let mut trials = Vec::with_capacity(self.total_actions(num_actions_per_zone));
        let mut last_zone = Vec::new();
        while let Some(zone) = self.strategy.next_zone() {
            for _ in 0..num_actions_per_zone {
                let entity = zone[self.rng.usize(..zone.len())];
                trials.push(self.call_structure(space, entity));
            }
            last_zone = zone;
        }

        self.strategy.reset(space);

        let measurements: Vec<f32> = trials.iter().map(|t| t.after).collect();
        let window = TREND_WINDOW.min(measurements.len());
        let summary = RunSummary {
            last_zone,
            overlap_begin: round2(mean(&measurements[..window])),
            overlap_end: round2(mean(&measurements[measurements.len() - window..])),
            trials,
        };
        debug!(
            "Pass done: {} trials, {} accepted, overlap {:.2} -> {:.2}",
            summary.trials.len(),
            summary.accepted_count(),
            summary.overlap_begin,
            summary.overlap_end
        );
        Ok(summary)
    }

    fn call_structure(&mut self, space: &mut Space, entity: Entity) -> Trial {
        let before = self.overlap;
        let code = self.rng.u8(ACTION_MOVE..=ACTION_ROTATE);
        let action = space.act(entity, code, &self.params, &mut self.rng);

        let mut after = space.measure(self.step_dt);
        let accepted = after <= before;
        if !accepted {
            space.undo(entity);
            after = space.measure(self.step_dt);
        }
        self.overlap = after;

        trace!(
            "{:?} code={} {:?}: {:.4} -> {:.4} ({})",
            entity,
            code,
            action,
            before,
            after,
            if accepted { "kept" } else { "undone" }
        );

        Trial {
            entity,
            code,
            action,
            before,
            after,
            accepted,
        }
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
