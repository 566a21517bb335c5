//! Contact events and the overlap observer.
//!
//! The contact detector triggers one [`ContactEvent`] per pair of intersecting
//! shapes found during a backend step. [`observe_contact`] is the hook the
//! backend registers at construction time; it feeds every contact into the
//! [`OverlapAccumulator`].
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

use crate::resources::overlapaccumulator::OverlapAccumulator;

/// Event fired for each intersecting shape pair during a step.
///
/// `a` and `b` are the two bodies, in no particular order. `distance` is the
/// signed contact distance: negative means penetration.
#[derive(Event, Debug, Clone, Copy)]
pub struct ContactEvent {
    pub a: Entity,
    pub b: Entity,
    pub distance: f32,
}

/// Global observer that accumulates contact distances.
pub fn observe_contact(trigger: On<ContactEvent>, mut accumulator: ResMut<OverlapAccumulator>) {
    accumulator.on_contact(trigger.event().distance);
}
