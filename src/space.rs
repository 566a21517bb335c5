//! Collision backend.
//!
//! [`Space`] owns the ECS [`World`] holding every structure and the step
//! [`Schedule`] that runs contact detection. It is the explicit context handed
//! to the optimizer: nothing in the crate reaches for a global world.
//!
//! A step advances [`WorldTime`], runs the contact detector and lets the
//! [`observe_contact`] observer fold every contact into the
//! [`OverlapAccumulator`]. Bodies are kinematic: a step never moves anything,
//! so the pose after a step is exactly the pose set by the last action.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use fastrand::Rng;
use glam::Vec2;

use crate::components::mapposition::MapPosition;
use crate::components::polygoncollider::PolygonCollider;
use crate::components::rotation::Rotation;
use crate::components::structure::{ActionKind, ActionParams, Structure};
use crate::events::contact::observe_contact;
use crate::resources::overlapaccumulator::OverlapAccumulator;
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::contact_detector;
use crate::systems::time::update_world_time;

pub struct Space {
    world: World,
    schedule: Schedule,
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(OverlapAccumulator::default());
        world.add_observer(observe_contact);
        world.flush();

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(contact_detector);

        Self { world, schedule }
    }

    /// Add a structure at its anchor with the given angle and geometry.
    pub fn spawn_structure(
        &mut self,
        structure: Structure,
        angle: f32,
        collider: PolygonCollider,
    ) -> Entity {
        let origin = structure.origin();
        self.world
            .spawn((
                MapPosition { pos: origin },
                Rotation::new(angle),
                collider,
                structure,
            ))
            .id()
    }

    /// Advance the backend by `dt`. Contacts found are added to the accumulator.
    pub fn step(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
    }

    /// Step once, read the overlap of that step and reset the accumulator.
    pub fn measure(&mut self, dt: f32) -> f32 {
        self.step(dt);
        self.world.resource_mut::<OverlapAccumulator>().take()
    }

    pub fn accumulator(&self) -> &OverlapAccumulator {
        self.world.resource::<OverlapAccumulator>()
    }

    pub fn reset_accumulator(&mut self) {
        self.world.resource_mut::<OverlapAccumulator>().reset();
    }

    pub fn time(&self) -> WorldTime {
        *self.world.resource::<WorldTime>()
    }

    /// Apply action `code` to a structure. `None` when the entity is not a
    /// structure or the code is unknown.
    pub fn act(
        &mut self,
        entity: Entity,
        code: u8,
        params: &ActionParams,
        rng: &mut Rng,
    ) -> Option<ActionKind> {
        let mut query = self
            .world
            .query::<(&mut Structure, &mut MapPosition, &mut Rotation)>();
        let (mut structure, mut position, mut rotation) = query.get_mut(&mut self.world, entity).ok()?;
        structure.act(code, &mut position, &mut rotation, params, rng)
    }

    /// Reverse the last action of a structure. `false` if it is not one.
    pub fn undo(&mut self, entity: Entity) -> bool {
        let mut query = self
            .world
            .query::<(&Structure, &mut MapPosition, &mut Rotation)>();
        match query.get_mut(&mut self.world, entity) {
            Ok((structure, mut position, mut rotation)) => {
                structure.undo(&mut position, &mut rotation);
                true
            }
            Err(_) => false,
        }
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<MapPosition>(entity).map(|p| p.pos)
    }

    pub fn angle(&self, entity: Entity) -> Option<f32> {
        self.world.get::<Rotation>(entity).map(|r| r.radians)
    }

    pub fn structure(&self, entity: Entity) -> Option<&Structure> {
        self.world.get::<Structure>(entity)
    }

    /// All structures, in spawn order.
    pub fn structures(&mut self) -> Vec<Entity> {
        let mut query = self.world.query_filtered::<Entity, With<Structure>>();
        query.iter(&self.world).collect()
    }

    pub fn total_area(&mut self) -> f32 {
        OverlapAccumulator::total_area(&mut self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
