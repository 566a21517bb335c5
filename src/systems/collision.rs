//! Contact detection system.
//!
//! Every structure collider is placed in world space once per step, then each
//! unordered pair is checked: bounding boxes first, separating axes second.
//! One [`ContactEvent`] is triggered per intersecting shape pair.
use bevy_ecs::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::polygoncollider::{PlacedCollider, PolygonCollider};
use crate::components::rotation::Rotation;
use crate::events::contact::ContactEvent;

pub fn contact_detector(
    query: Query<(Entity, &MapPosition, &Rotation, &PolygonCollider)>,
    mut commands: Commands,
) {
    // first we place every collider in world space
    let placed: Vec<(Entity, PlacedCollider)> = query
        .iter()
        .map(|(entity, position, rotation, collider)| {
            (entity, collider.place(position.pos, rotation.radians))
        })
        .collect();

    for (i, (entity_a, collider_a)) in placed.iter().enumerate() {
        for (entity_b, collider_b) in &placed[i + 1..] {
            for distance in collider_a.contacts(collider_b) {
                commands.trigger(ContactEvent {
                    a: *entity_a,
                    b: *entity_b,
                    distance,
                });
            }
        }
    }
}
