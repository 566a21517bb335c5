//! Movable structure component.
//!
//! A [`Structure`] is one packed object of the layout. It remembers where it
//! was spawned (its tether anchor) and the single most recent action applied to
//! it, which is all [`Structure::undo`] can reverse.
//!
//! # Actions
//!
//! | code | action |
//! |------|--------|
//! | 1    | move: local random step that must stay inside the tether circle |
//! | 2    | rotate: symmetric random turn within `rotate_degrees` |
//!
//! Any other code is ignored.
//!
//! The component only mutates pose data. The caller must step the backend
//! before a new overlap measurement reflects the change.

use bevy_ecs::prelude::Component;
use fastrand::Rng;
use glam::Vec2;

use crate::components::mapposition::MapPosition;
use crate::components::rotation::Rotation;

/// Candidate positions drawn before a move gives up and stays put.
pub const MAX_MOVE_ATTEMPTS: usize = 32;

pub const ACTION_MOVE: u8 = 1;
pub const ACTION_ROTATE: u8 = 2;

/// Kind of action applied by [`Structure::act`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Move,
    Rotate,
}

impl ActionKind {
    /// Map an action code to its action, `None` for unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            ACTION_MOVE => Some(ActionKind::Move),
            ACTION_ROTATE => Some(ActionKind::Rotate),
            _ => None,
        }
    }
}

/// Record of the most recent action, overwritten by every action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LastAction {
    Move { old: Vec2, new: Vec2 },
    Rotate { old: f32, new: f32 },
}

/// Tunables for structure actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionParams {
    /// Maximum distance from the spawn anchor (exclusive).
    pub tether_radius: f32,
    /// Radius of the local step disc sampled around the current position.
    pub move_step: f32,
    /// Full width of the rotation range in degrees, centred on zero.
    pub rotate_degrees: f32,
}

impl Default for ActionParams {
    fn default() -> Self {
        Self {
            tether_radius: 1.0,
            move_step: 0.25,
            rotate_degrees: 30.0,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Structure {
    /// Classification tag from the input data.
    pub kind: String,
    origin: Vec2,
    last_action: LastAction,
}

impl Structure {
    /// Create a structure anchored at `origin` with the given spawn angle.
    pub fn new(kind: impl Into<String>, origin: Vec2, angle: f32) -> Self {
        Self {
            kind: kind.into(),
            origin,
            last_action: LastAction::Rotate {
                old: angle,
                new: angle,
            },
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn last_action(&self) -> LastAction {
        self.last_action
    }

    /// Apply the action for `code`. Returns the applied kind, `None` if the
    /// code is not recognized (nothing changes).
    pub fn act(
        &mut self,
        code: u8,
        position: &mut MapPosition,
        rotation: &mut Rotation,
        params: &ActionParams,
        rng: &mut Rng,
    ) -> Option<ActionKind> {
        let kind = ActionKind::from_code(code)?;
        match kind {
            ActionKind::Move => self.step_within_tether(position, params, rng),
            ActionKind::Rotate => self.rotate(rotation, params.rotate_degrees, rng),
        }
        Some(kind)
    }

    /// Restore the value recorded by the last action.
    ///
    /// Only one level deep: calling it twice restores the same value again.
    pub fn undo(&self, position: &mut MapPosition, rotation: &mut Rotation) {
        match self.last_action {
            LastAction::Move { old, .. } => position.pos = old,
            LastAction::Rotate { old, .. } => rotation.radians = old,
        }
    }

    fn step_within_tether(&mut self, position: &mut MapPosition, params: &ActionParams, rng: &mut Rng) {
        let start = position.pos;
        let candidate = (0..MAX_MOVE_ATTEMPTS)
            .map(|_| start + offset_in_disc(params.move_step, rng))
            .find(|p| p.distance(self.origin) < params.tether_radius);
        if let Some(p) = candidate {
            position.pos = p;
        }
        self.last_action = LastAction::Move {
            old: start,
            new: position.pos,
        };
    }

    fn rotate(&mut self, rotation: &mut Rotation, degree_range: f32, rng: &mut Rng) {
        let old = rotation.radians;
        rotation.radians = old + rand_angle(degree_range, rng);
        self.last_action = LastAction::Rotate {
            old,
            new: rotation.radians,
        };
    }
}

/// Uniform point in the disc of `radius` around zero, by rejection from the
/// enclosing square.
pub fn offset_in_disc(radius: f32, rng: &mut Rng) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }
    loop {
        let p = Vec2::new(rng.f32() * 2.0 - 1.0, rng.f32() * 2.0 - 1.0);
        if p.length_squared() < 1.0 {
            return p * radius;
        }
    }
}

/// Random angle in radians within +/- half of `degree_range` degrees.
pub fn rand_angle(degree_range: f32, rng: &mut Rng) -> f32 {
    ((rng.f32() * 2.0 - 1.0) * 0.5 * degree_range).to_radians()
}
