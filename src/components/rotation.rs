use bevy_ecs::prelude::Component;

/// Body angle in radians, counter-clockwise.
#[derive(Component, Clone, Debug, Copy, Default, PartialEq)]
pub struct Rotation {
    pub radians: f32,
}

impl Rotation {
    pub fn new(radians: f32) -> Self {
        Self { radians }
    }
}
