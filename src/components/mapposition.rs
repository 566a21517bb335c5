use bevy_ecs::prelude::Component;
use glam::Vec2;

/// World-space position of a structure's body.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }

    /// Euclidean distance from this position to `point`.
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.pos.distance(point)
    }
}
