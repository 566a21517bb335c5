//! Overlap accumulator resource.
//!
//! Collects the contact events reported by the collision backend during a step
//! and sums their penetration. Values are only meaningful for the steps run
//! since the last [`OverlapAccumulator::reset`]; read them before resetting.

use bevy_ecs::prelude::*;

use crate::components::polygoncollider::PolygonCollider;

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct OverlapAccumulator {
    /// Penetrating contacts since the last reset.
    pub event_count: u64,
    /// Sum of penetration magnitudes since the last reset, always >= 0.
    pub overlap_depth: f32,
    /// Penetrating contacts over the accumulator's lifetime.
    pub lifetime_event_count: u64,
    /// Penetration summed over the accumulator's lifetime.
    pub lifetime_overlap_depth: f64,
}

impl OverlapAccumulator {
    /// Record one contact. Only true penetrations (negative distance) count.
    pub fn on_contact(&mut self, distance: f32) {
        if distance < 0.0 {
            self.overlap_depth += -distance;
            self.event_count += 1;
        }
    }

    /// Fold the current counters into the lifetime totals and zero them.
    pub fn reset(&mut self) {
        self.lifetime_event_count += self.event_count;
        self.lifetime_overlap_depth += self.overlap_depth as f64;
        self.event_count = 0;
        self.overlap_depth = 0.0;
    }

    /// Read the current depth and reset in one go.
    pub fn take(&mut self) -> f32 {
        let depth = self.overlap_depth;
        self.reset();
        depth
    }

    /// Sum of the areas of every live shape in the world. Diagnostic only.
    pub fn total_area(world: &mut World) -> f32 {
        let mut query = world.query::<&PolygonCollider>();
        query.iter(world).map(PolygonCollider::area).sum()
    }
}
